//! Door State Machine
//!
//! This example demonstrates guarded targets and named actions.
//!
//! Key concepts:
//! - Guards that inspect transition arguments
//! - Actions resolved against the current state
//! - Enter and exit subscribers for a single state
//! - A terminal state that absorbs further transitions
//!
//! Run with: cargo run --example door

use serde_json::json;
use std::sync::Arc;
use waypoint::builder::{MachineBuilder, RulesBuilder};
use waypoint::graph::GuardContext;
use waypoint::{transition_callback, ActionTransition, LogReporter};

fn main() {
    println!("=== Door State Machine ===\n");

    let machine = MachineBuilder::new()
        .state("open", ["closed", "broken"])
        .state("closed", ["open", "locked", "broken"])
        .state(
            "locked",
            RulesBuilder::new()
                .when("closed", |ctx: &GuardContext| ctx.arg(0) == Some(&json!("key")))
                .always("broken"),
        )
        .state("broken", "broken")
        .initial("closed")
        .action("push", ActionTransition::new("closed", "open"))
        .action("pull", ActionTransition::new("open", "closed"))
        .action("kick", ActionTransition::new(["open", "closed", "locked"], "broken"))
        .reporter(Arc::new(LogReporter))
        .build()
        .unwrap();

    println!("Door state machine created");
    println!("States: {:?}", machine.states());
    println!("Actions: {:?}\n", machine.actions());

    machine
        .on_enter(
            "locked",
            transition_callback(|_, _, _| println!("  click: door locked")),
        )
        .unwrap();
    machine
        .on_exit(
            "locked",
            transition_callback(|_, _, _| println!("  clack: door unlocked")),
        )
        .unwrap();
    machine.on_terminate(transition_callback(|from, _, _| {
        println!("  door broke while {from}");
    }));

    println!("Open and close:");
    machine.trigger("push").unwrap();
    machine.trigger("pull").unwrap();
    println!("  now {}", machine.state());

    println!("\nLock, then try to unlock:");
    machine.transition("locked").unwrap();
    let outcome = machine.transition("closed").unwrap();
    println!("  without a key: {outcome:?}");
    let outcome = machine.transition_with("closed", &[json!("key")]).unwrap();
    println!("  with a key: {outcome:?}");

    println!("\nBreak it:");
    machine.trigger("kick").unwrap();
    let outcome = machine.trigger("push").unwrap();
    println!("  pushing a broken door: {outcome:?}");
    println!("  final: {}", machine.is_final());

    println!("\n=== Example Complete ===");
}
