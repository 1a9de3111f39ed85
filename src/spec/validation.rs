//! Structural validation of specs, subscription keys and targets.
//!
//! [`validate_construction`] stops at the first problem. [`audit`] runs the
//! same checks but accumulates every problem with `Validation`, so tooling
//! can report a broken spec in one pass.

use super::{ActionSpec, ConfigError, MachineSpec};
use crate::graph::StateGraph;
use crate::machine::FsmError;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Check a spec before a machine is built from it.
///
/// Checks, in order: the initial state is declared, there are at least
/// two states, every state except the initial one is some handler's
/// target, every target is declared, and every action refers to declared
/// states.
pub fn validate_construction(spec: &MachineSpec) -> Result<(), ConfigError> {
    match problems(spec).next() {
        Some(problem) => Err(problem),
        None => Ok(()),
    }
}

/// Check that every action transition names declared states.
///
/// `to` is only checked when it is a literal; computed targets are
/// validated when the action fires.
pub fn validate_actions(actions: &ActionSpec, states: &StateGraph) -> Result<(), ConfigError> {
    match action_problems(actions, states).into_iter().next() {
        Some(problem) => Err(problem),
        None => Ok(()),
    }
}

/// Check the state key of an enter or exit subscription.
pub fn validate_subscription(state: &str, states: &StateGraph) -> Result<(), FsmError> {
    if states.contains(state) {
        Ok(())
    } else {
        Err(FsmError::InvalidSubscriptionKey {
            state: state.to_string(),
        })
    }
}

/// Check the target of a transition.
pub fn validate_target_state(target: &str, states: &StateGraph) -> Result<(), FsmError> {
    if states.contains(target) {
        Ok(())
    } else {
        Err(FsmError::InvalidTarget {
            target: target.to_string(),
        })
    }
}

/// Run every construction check and collect ALL problems.
///
/// ```rust
/// use waypoint::graph::StateGraph;
/// use waypoint::spec::{audit, MachineSpec};
///
/// let states = StateGraph::new().with("foo", "qux").with("bar", "foo");
/// let result = audit(&MachineSpec::new(states, "foo"));
///
/// // "bar" is unreachable and "qux" is not declared
/// assert!(result.is_failure());
/// ```
pub fn audit(spec: &MachineSpec) -> Validation<(), NonEmptyVec<ConfigError>> {
    let mut checks: Vec<Validation<(), NonEmptyVec<ConfigError>>> = vec![Validation::success(())];

    for problem in problems(spec) {
        checks.push(Validation::fail(problem));
    }

    Validation::all_vec(checks).map(|_| ())
}

/// Every construction problem, in check order.
fn problems(spec: &MachineSpec) -> impl Iterator<Item = ConfigError> {
    initial_problems(spec)
        .into_iter()
        .chain(size_problems(&spec.states))
        .chain(closure_problems(&spec.states, &spec.initial))
        .chain(action_problems(&spec.actions, &spec.states))
}

fn initial_problems(spec: &MachineSpec) -> Option<ConfigError> {
    (!spec.states.contains(&spec.initial)).then(|| ConfigError::UnknownInitial {
        initial: spec.initial.clone(),
    })
}

fn size_problems(states: &StateGraph) -> Option<ConfigError> {
    (states.len() < 2).then(|| ConfigError::TooFewStates {
        count: states.len(),
    })
}

fn closure_problems(states: &StateGraph, initial: &str) -> Vec<ConfigError> {
    let targets = states.targets();
    let mut problems = Vec::new();

    // The initial state is the entry point and need not be a target.
    let unreachable: Vec<String> = states
        .names()
        .filter(|name| *name != initial && !targets.contains(name))
        .map(str::to_string)
        .collect();
    if !unreachable.is_empty() {
        problems.push(ConfigError::UnreachableStates {
            states: unreachable,
        });
    }

    let unknown: Vec<String> = targets
        .iter()
        .filter(|target| !states.contains(target))
        .map(|target| target.to_string())
        .collect();
    if !unknown.is_empty() {
        problems.push(ConfigError::UnknownTargets { states: unknown });
    }

    problems
}

fn action_problems(actions: &ActionSpec, states: &StateGraph) -> Vec<ConfigError> {
    actions
        .iter()
        .flat_map(|(action, transitions)| {
            transitions.iter().flat_map(move |transition| {
                transition
                    .from
                    .iter()
                    .chain(transition.to.literal())
                    .filter(|state| !states.contains(state))
                    .map(move |state| ConfigError::UnknownActionState {
                        action: action.clone(),
                        state: state.to_string(),
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect()
}
