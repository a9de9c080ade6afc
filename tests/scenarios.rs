//! End-to-end scenarios: literal protocol transcripts and composite machines
//! driven through a session.

use chanalg::combinators::{looped, name_bind_primitive, pipeline, product, sequence};
use chanalg::core::{Control, Fault, Message, Value};
use chanalg::primitives::{array, brk, func, primitive, yield_on};
use chanalg::protocol::{Grammar, Mismatch, NodeId};
use chanalg::session::Session;
use chanalg::{assert_transcript, refute_transcript};
use serde_json::json;

fn pin_pad(g: &mut Grammar) -> NodeId {
    g.looped(|g, retry| {
        let done = g.done();
        let mut parts: Vec<NodeId> = (0..4).map(|_| g.receive("enterDigit", done)).collect();
        let door_open = g.emit("doorOpen");
        let correct = g.receive("pull", door_open);
        let outcome = g.choice([("correct", correct), ("incorrect", retry)])?;
        parts.push(outcome);
        Ok(g.sequence(parts))
    })
    .unwrap()
}

fn comparator(g: &mut Grammar) -> NodeId {
    let reference = g
        .looped(|g, this| {
            let done = g.done();
            let result = g.emit("result");
            let again = g.sequence([result, this]);
            g.choice([("end", done), ("get", again)])
        })
        .unwrap();
    g.looped(|g, this| {
        let both = g.product([("left", reference), ("right", reference)])?;
        let result = g.emit("result");
        let compare = g.sequence([both, result, this]);
        let done = g.done();
        g.choice([("cmp", compare), ("end", done)])
    })
    .unwrap()
}

#[test]
fn pin_pad_accepts_four_digits_then_door() {
    let mut g = Grammar::new();
    let pad = pin_pad(&mut g);
    assert_transcript!(
        g,
        pad,
        ["enterDigit", "enterDigit", "enterDigit", "enterDigit", "correct", "pull", "doorOpen"]
    );
}

#[test]
fn pin_pad_retries_after_incorrect_code() {
    let mut g = Grammar::new();
    let pad = pin_pad(&mut g);
    let mut tokens = vec!["enterDigit"; 4];
    tokens.push("incorrect");
    tokens.extend(["enterDigit"; 4]);
    tokens.extend(["correct", "pull", "doorOpen"]);
    assert!(g.check(pad, &tokens).is_ok());
}

#[test]
fn pin_pad_rejects_three_digits() {
    let mut g = Grammar::new();
    let pad = pin_pad(&mut g);
    let mismatch = refute_transcript!(
        g,
        pad,
        ["enterDigit", "enterDigit", "enterDigit", "correct", "pull", "doorOpen"]
    );
    assert!(matches!(mismatch.root(), Mismatch::Choice { .. }));
}

#[test]
fn pin_pad_rejects_door_before_pull() {
    let mut g = Grammar::new();
    let pad = pin_pad(&mut g);
    refute_transcript!(
        g,
        pad,
        ["enterDigit", "enterDigit", "enterDigit", "enterDigit", "correct", "doorOpen", "pull"]
    );
}

#[test]
fn comparator_accepts_interleaved_references() {
    let mut g = Grammar::new();
    let cmp = comparator(&mut g);
    assert_transcript!(
        g,
        cmp,
        [
            "cmp",
            "left/get",
            "right/get",
            "left/result",
            "right/result",
            "left/end",
            "right/end",
            "result",
            "end"
        ]
    );
}

#[test]
fn comparator_rejects_bare_cmp() {
    let mut g = Grammar::new();
    let cmp = comparator(&mut g);
    refute_transcript!(g, cmp, ["cmp"]);
}

#[test]
fn comparator_prefix_stops_before_trailing_tokens() {
    let mut g = Grammar::new();
    let cmp = comparator(&mut g);
    let tokens = ["cmp", "left/end", "right/end", "result", "end", "extra"];
    assert_eq!(g.matches_prefix(cmp, &tokens), Ok(5));
    assert_eq!(
        g.check(cmp, &tokens),
        Err(Mismatch::Trailing {
            leftover: vec!["extra".to_string()]
        })
    );
}

fn add(n: i64) -> impl Fn(Value) -> Value {
    move |v| json!(v.as_i64().unwrap_or(0) + n)
}

/// Add one, ask on `c`, add ten to the answer, finish.
fn ask_and_adjust() -> impl chanalg::Machine {
    sequence(func(add(1)), sequence(yield_on("c"), sequence(func(add(10)), brk())))
}

fn answer(asked: &Message) -> Message {
    match asked.channel.control() {
        Control::Continue(rest) if rest.is("result") => Message::new(rest, asked.data.clone()),
        Control::Continue(rest) => Message::new(rest, json!(5)),
        _ => unreachable!("drive only answers continuations"),
    }
}

#[test]
fn pipeline_collapses_result_continuations() {
    let mut stepwise = Session::new(ask_and_adjust());
    let slow = stepwise.drive(Message::result(json!(1)), answer).unwrap();

    let mut piped = Session::new(pipeline(ask_and_adjust()));
    let fast = piped.drive(Message::result(json!(1)), answer).unwrap();

    assert_eq!(slow, Message::new("break/result", json!(15)));
    assert_eq!(slow, fast);
    assert_eq!(stepwise.steps(), 5);
    assert_eq!(piped.steps(), 2);
    assert_eq!(piped.history().transcript(), vec!["continue/c", "break/result"]);
}

#[test]
fn loop_answers_its_own_yields() {
    let mut session = Session::new(looped(ask_and_adjust()));
    let out = session.send("result", json!(1)).unwrap();
    // the yield is fed its own question (2) back
    assert_eq!(out, Message::result(json!(12)));
    assert_eq!(session.steps(), 1);
}

#[test]
fn session_transcript_satisfies_protocol() {
    let mut session = Session::new(pipeline(ask_and_adjust()));
    session.drive(Message::result(json!(1)), answer).unwrap();

    let mut g = Grammar::new();
    let ask = g.emit("continue/c");
    let finish = g.emit("break/result");
    let protocol = g.sequence([ask, finish]);
    assert!(g.check(protocol, &session.history().transcript()).is_ok());
}

#[test]
fn shared_cell_and_array_through_facets() {
    let mut session = Session::new(name_bind_primitive(product(primitive(), array(3))));

    let out = session.send("first/set", json!({"owner": "alice"})).unwrap();
    assert_eq!(out, Message::new("first/result", json!(null)));

    let out = session.send("second/set", json!([0, "token"])).unwrap();
    assert_eq!(out, Message::new("second/result", json!(null)));

    let out = session.send("second/take", json!(0)).unwrap();
    assert_eq!(out, Message::new("second/result", json!("token")));

    let out = session.send("second/take", json!(1)).unwrap();
    assert_eq!(out.channel, "second/err");

    let out = session.send("second/set", json!([0, "token"])).unwrap();
    assert_eq!(out, Message::new("second/result", json!(null)));

    let out = session.send("first/copy", json!(null)).unwrap();
    assert_eq!(out, Message::new("first/result", json!({"owner": "alice"})));
    assert!(!session.is_halted());
}

#[test]
fn facets_seed_both_cells_from_one_result() {
    let mut session = Session::new(name_bind_primitive(product(primitive(), primitive())));
    let out = session.send("result", json!([1, [2, 3]])).unwrap();
    assert_eq!(out, Message::result(json!(null)));

    let out = session.send("second/element/1/copy", json!(null)).unwrap();
    assert_eq!(out, Message::new("second/result", json!(3)));
}

#[test]
fn unknown_facet_halts_session() {
    let mut session = Session::new(name_bind_primitive(product(primitive(), primitive())));
    let fault = session.send("third/copy", json!(null)).unwrap_err();
    assert!(matches!(fault, Fault::InvalidChannel { .. }));
    assert_eq!(session.send("first/copy", json!(null)), Err(Fault::Halted));
}
