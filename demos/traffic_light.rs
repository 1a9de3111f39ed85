//! Traffic Light State Machine
//!
//! This example demonstrates a simple cyclic state machine.
//!
//! Key concepts:
//! - Cyclic state transitions (states repeat)
//! - Single-target handlers
//! - Change and fail subscribers
//! - Denied transitions leave the state untouched
//!
//! Run with: cargo run --example traffic_light

use waypoint::{fail_callback, state_graph, transition_callback, Machine};

fn main() {
    println!("=== Traffic Light State Machine ===\n");

    let states = state_graph! {
        "red" => "green",
        "green" => "yellow",
        "yellow" => "red",
    };
    let machine = Machine::from_states(states, "red").unwrap();

    println!("Traffic light state machine created");
    println!("Initial state: {}\n", machine.state());

    machine.on_change(transition_callback(|from, to, _| {
        println!("  {from} -> {to}");
    }));
    machine.on_fail(fail_callback(|state, _| {
        println!("  denied while {state}");
    }));

    println!("Transition sequence:");
    for target in ["green", "yellow", "red", "green"] {
        machine.transition(target).unwrap();
    }

    println!("\nSkipping yellow is not allowed:");
    machine.transition("red").unwrap();
    println!("  still {}", machine.state());

    println!("\nPath taken: {:?}", machine.history().get_path());

    println!("\nKey Characteristics:");
    println!("- Every state has exactly one legal target");
    println!("- No terminal state (cycles indefinitely)");
    println!("- Denials are reported to subscribers, not returned as errors");

    println!("\n=== Example Complete ===");
}
