//! Pin Pad Protocol
//!
//! This example checks door-lock transcripts against a recursive protocol,
//! then drives a small code-checking machine and checks its own transcript.
//!
//! Key concepts:
//! - Recursive protocols built with `looped`
//! - Choices and single-tag receives
//! - Structured mismatch reasons
//! - Session history as a transcript
//!
//! Run with: cargo run --example pin_pad

use chanalg::combinators::{pipeline, sequence};
use chanalg::primitives::{brk, func, yield_on};
use chanalg::protocol::{Grammar, GrammarError, NodeId};
use chanalg::session::Session;
use serde_json::json;

fn pin_pad(g: &mut Grammar) -> Result<NodeId, GrammarError> {
    g.looped(|g, retry| {
        let done = g.done();
        let mut parts: Vec<NodeId> = (0..4).map(|_| g.receive("enterDigit", done)).collect();
        let door_open = g.emit("doorOpen");
        let correct = g.receive("pull", door_open);
        parts.push(g.choice([("correct", correct), ("incorrect", retry)])?);
        Ok(g.sequence(parts))
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Pin Pad Protocol ===\n");

    let mut g = Grammar::new();
    let pad = pin_pad(&mut g)?;
    println!("Protocol: {}\n", g.describe(pad));

    let transcripts: [&[&str]; 4] = [
        &["enterDigit", "enterDigit", "enterDigit", "enterDigit", "correct", "pull", "doorOpen"],
        &["enterDigit", "enterDigit", "enterDigit", "correct", "pull", "doorOpen"],
        &["enterDigit", "enterDigit", "enterDigit", "enterDigit", "correct", "doorOpen", "pull"],
        &[
            "enterDigit", "enterDigit", "enterDigit", "enterDigit", "incorrect",
            "enterDigit", "enterDigit", "enterDigit", "enterDigit", "correct", "pull", "doorOpen",
        ],
    ];
    for tokens in transcripts {
        match g.check(pad, tokens) {
            Ok(()) => println!("  accepted: {}", tokens.join(" ")),
            Err(mismatch) => println!("  rejected: {}\n    reason: {}", tokens.join(" "), mismatch),
        }
    }

    println!("\nDriving a code checker:");
    let checker = pipeline(sequence(
        yield_on("enterCode"),
        sequence(
            func(|code| {
                if code == json!("1234") {
                    json!("doorOpen")
                } else {
                    json!("locked")
                }
            }),
            brk(),
        ),
    ));
    let mut session = Session::new(checker);
    let asked = session.send("result", json!(null))?;
    println!("  machine asks on {}", asked.channel);
    let done = session.send("enterCode", json!("1234"))?;
    println!("  machine answers {} {}", done.channel, done.data);

    let mut expected = Grammar::new();
    let ask = expected.emit("continue/enterCode");
    let answer = expected.emit("break/result");
    let protocol = expected.sequence([ask, answer]);
    let transcript = session.history().transcript();
    println!(
        "  transcript {:?} conforms: {}",
        transcript,
        expected.check(protocol, &transcript).is_ok()
    );

    println!("\n=== Example Complete ===");
    Ok(())
}
