//! Shared Memory Facets
//!
//! This example binds a cell and a slot array behind one router and talks
//! to them as two named facets, `first` and `second`.
//!
//! Key concepts:
//! - `product` runs two machines side by side
//! - `name_bind_primitive` exposes them as facets
//! - Borrow/return discipline on array slots
//! - Recoverable errors arrive on `err`, faults halt the session
//!
//! Run with: cargo run --example shared_memory

use chanalg::combinators::{name_bind_primitive, product};
use chanalg::primitives::{array, primitive};
use chanalg::session::Session;
use chanalg::SessionConfig;
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Shared Memory Facets ===\n");

    let config = SessionConfig::from_json(r#"{"record_history": true, "step_limit": 32}"#)?;
    let machine = name_bind_primitive(product(primitive(), array(3)));
    let mut session = Session::with_config(machine, config);
    println!("Session {}\n", session.id());

    let requests = [
        ("first/set", json!(["alice", [10, 20, 30]])),
        ("first/element/1/element/2/copy", json!(null)),
        ("second/set", json!([0, "token"])),
        ("second/take", json!(0)),
        ("second/take", json!(1)),
        ("second/set", json!([0, "token"])),
        ("second/set", json!([7, "nowhere"])),
        ("first/copy", json!(null)),
    ];
    for (channel, data) in requests {
        let reply = session.send(channel, data.clone())?;
        println!("  {channel} {data}\n    -> {} {}", reply.channel, reply.data);
    }

    println!("\nStates visited: {}", session.history().path().join(" -> "));

    match session.send("third/copy", json!(null)) {
        Ok(reply) => println!("unexpected reply {}", reply.channel),
        Err(fault) => println!("Fault: {fault}"),
    }
    println!("Halted: {}", session.is_halted());

    println!("\n=== Example Complete ===");
    Ok(())
}
