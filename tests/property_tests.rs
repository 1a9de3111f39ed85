//! Property-based tests for construction and transitions.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated graphs.

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use waypoint::{
    fail_callback, transition_callback, ConfigError, Machine, MachineSpec, Outcome, StateGraph,
};

const NAMES: [&str; 6] = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot"];

/// A ring over the first `len` names: each state points at the next.
fn ring(len: usize) -> StateGraph {
    (0..len)
        .map(|i| (NAMES[i], NAMES[(i + 1) % len]))
        .collect()
}

prop_compose! {
    fn arbitrary_ring()(len in 2..=NAMES.len()) -> (StateGraph, usize) {
        (ring(len), len)
    }
}

prop_compose! {
    /// A ring plus, per state, an extra set of targets drawn from the ring.
    fn arbitrary_graph()(len in 2..=NAMES.len())
        (extra in prop::collection::vec(prop::collection::vec(0..len, 0..3), len), len in Just(len))
        -> StateGraph
    {
        (0..len)
            .map(|i| {
                let mut targets = vec![NAMES[(i + 1) % len].to_string()];
                for &j in &extra[i] {
                    if j != i && !targets.contains(&NAMES[j].to_string()) {
                        targets.push(NAMES[j].to_string());
                    }
                }
                (NAMES[i], targets)
            })
            .collect()
    }
}

proptest! {
    #[test]
    fn initial_state_is_current_after_construction(
        (states, len) in arbitrary_ring(),
        pick in 0..NAMES.len()
    ) {
        let initial = NAMES[pick % len];
        let machine = Machine::from_states(states, initial).unwrap();
        prop_assert_eq!(machine.state(), initial);
    }

    #[test]
    fn single_state_graphs_always_fail(name in prop::sample::select(NAMES.to_vec()), target in prop::sample::select(NAMES.to_vec())) {
        let states = StateGraph::new().with(name, target);
        let result = Machine::from_states(states, name);
        prop_assert!(result.is_err());
    }

    #[test]
    fn unknown_initial_always_fails((states, len) in arbitrary_ring()) {
        let missing = if len < NAMES.len() { NAMES[len] } else { "zulu" };
        let result = Machine::from_states(states, missing);
        prop_assert_eq!(
            result.unwrap_err(),
            ConfigError::UnknownInitial { initial: missing.to_string() }
        );
    }

    #[test]
    fn unreachable_state_is_named(
        (states, len) in arbitrary_ring(),
        orphan in "[a-z]{3,8}"
    ) {
        prop_assume!(!NAMES.contains(&orphan.as_str()));
        let states = states.with(orphan.clone(), NAMES[0]);

        let err = Machine::from_states(states, NAMES[len - 1]).unwrap_err();
        prop_assert_eq!(err, ConfigError::UnreachableStates { states: vec![orphan] });
    }

    #[test]
    fn denial_leaves_state_and_fires_only_fail(
        states in arbitrary_graph(),
        target in prop::sample::select(NAMES.to_vec())
    ) {
        let machine = Machine::from_states(states.clone(), NAMES[0]).unwrap();
        prop_assume!(states.contains(target));

        let allowed: BTreeSet<&str> = states
            .handler(NAMES[0])
            .map(|h| h.targets().into_iter().collect())
            .unwrap_or_default();
        prop_assume!(!allowed.contains(target));

        let fails = Arc::new(Mutex::new(0));
        let changes = Arc::new(Mutex::new(0));
        {
            let fails = Arc::clone(&fails);
            machine.on_fail(fail_callback(move |_, _| *fails.lock().unwrap() += 1));
            let changes = Arc::clone(&changes);
            machine.on_change(transition_callback(move |_, _, _| *changes.lock().unwrap() += 1));
        }

        for _ in 0..3 {
            let outcome = machine.transition(target).unwrap();
            prop_assert_eq!(outcome, Outcome::Denied { state: NAMES[0].to_string() });
        }

        prop_assert_eq!(machine.state(), NAMES[0]);
        prop_assert_eq!(*fails.lock().unwrap(), 3);
        prop_assert_eq!(*changes.lock().unwrap(), 0);
    }

    #[test]
    fn ring_walk_returns_to_start((states, len) in arbitrary_ring()) {
        let machine = Machine::from_states(states, NAMES[0]).unwrap();

        for i in 1..=len {
            let outcome = machine.transition(NAMES[i % len]).unwrap();
            prop_assert!(outcome.is_changed());
        }

        prop_assert_eq!(machine.state(), NAMES[0]);
        prop_assert_eq!(machine.history().len(), len);
    }

    #[test]
    fn validation_and_audit_agree(states in arbitrary_graph(), pick in 0..NAMES.len()) {
        let spec = MachineSpec::new(states, NAMES[pick]);
        let fail_fast = waypoint::spec::validate_construction(&spec);
        let audited = waypoint::spec::audit(&spec);
        prop_assert_eq!(fail_fast.is_ok(), audited.is_success());
    }
}
