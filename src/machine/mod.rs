//! The machine: current state, transitions and notifications.
//!
//! A [`Machine`] is a cheap cloneable handle. Every public operation runs
//! to completion before returning, including the synchronous invocation of
//! all matching subscribers.
//!
//! # Re-entrancy
//!
//! Subscribers, guards and action resolvers run with no lock held, so they
//! may call back into the machine. A subscriber that calls `transition`
//! runs the nested transition to completion inline; the remaining
//! subscribers of the outer transition still receive the outer
//! `(old, new, args)`. A guard that moves the machine while it is being
//! evaluated makes the outer request resolve again from the new state.

mod error;
mod history;
mod subscriptions;

pub use error::FsmError;
pub use history::{StateHistory, StateTransition};
pub use subscriptions::{fail_callback, transition_callback, FailCallback, TransitionCallback};

use crate::graph::{Resolution, StateGraph};
use crate::report::{Raise, Reporter};
use crate::spec::{
    select, validate_construction, validate_subscription, validate_target_state, ActionSpec,
    ActionTarget, ConfigError, MachineSpec,
};
use chrono::Utc;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use subscriptions::SubscriptionRegistry;
use tracing::{debug, trace};

/// What a `transition` or `trigger` call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The machine moved; exit, enter, change (and terminate) fired.
    Changed { from: String, to: String },

    /// The request was well formed but not allowed; fail fired.
    Denied { state: String },

    /// The machine is in a terminal state; nothing fired.
    Absorbed { state: String },

    /// `trigger` found no transition for the current state; nothing fired.
    Unmatched { state: String },
}

impl Outcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, Outcome::Changed { .. })
    }

    /// The machine's state once the call returned (ignoring any nested
    /// transitions made by subscribers).
    pub fn state(&self) -> &str {
        match self {
            Outcome::Changed { to, .. } => to.as_str(),
            Outcome::Denied { state }
            | Outcome::Absorbed { state }
            | Outcome::Unmatched { state } => state.as_str(),
        }
    }
}

/// Options fixed at construction.
#[derive(Clone)]
pub struct MachineOptions {
    /// Strategy for diagnostics found while resolving transitions.
    pub reporter: Arc<dyn Reporter>,
    /// Whether accepted transitions are appended to the history.
    pub record_history: bool,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            reporter: Arc::new(Raise),
            record_history: true,
        }
    }
}

impl fmt::Debug for MachineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineOptions")
            .field("record_history", &self.record_history)
            .finish_non_exhaustive()
    }
}

struct Runtime {
    current: String,
    subscriptions: SubscriptionRegistry,
    history: StateHistory,
}

struct Inner {
    states: StateGraph,
    initial: String,
    actions: ActionSpec,
    options: MachineOptions,
    runtime: Mutex<Runtime>,
}

/// A validated finite state machine.
///
/// # Example
///
/// ```rust
/// use waypoint::{Machine, Outcome, StateGraph};
///
/// let states = StateGraph::new()
///     .with("foo", "bar")
///     .with("bar", "baz")
///     .with("baz", "foo");
/// let machine = Machine::from_states(states, "foo").unwrap();
///
/// assert!(machine.transition("bar").unwrap().is_changed());
/// assert_eq!(machine.state(), "bar");
///
/// // "foo" is not a target of "bar": denied, state unchanged
/// assert_eq!(
///     machine.transition("foo").unwrap(),
///     Outcome::Denied { state: "bar".to_string() }
/// );
/// ```
#[derive(Clone)]
pub struct Machine {
    inner: Arc<Inner>,
}

impl Machine {
    /// Build a machine from a spec with default options.
    pub fn new(spec: MachineSpec) -> Result<Self, ConfigError> {
        Self::with_options(spec, MachineOptions::default())
    }

    /// Build a machine from a graph and initial state, without actions.
    pub fn from_states(
        states: StateGraph,
        initial: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Self::new(MachineSpec::new(states, initial))
    }

    /// Build a machine from a spec.
    ///
    /// The spec is validated first; no machine exists if it is invalid.
    pub fn with_options(spec: MachineSpec, options: MachineOptions) -> Result<Self, ConfigError> {
        validate_construction(&spec)?;

        let MachineSpec {
            states,
            initial,
            actions,
        } = spec;

        debug!(
            initial = %initial,
            states = states.len(),
            actions = actions.len(),
            "machine constructed"
        );

        let runtime = Runtime {
            current: initial.clone(),
            subscriptions: SubscriptionRegistry::new(states.names()),
            history: StateHistory::new(),
        };

        Ok(Self {
            inner: Arc::new(Inner {
                states,
                initial,
                actions,
                options,
                runtime: Mutex::new(runtime),
            }),
        })
    }

    fn runtime(&self) -> MutexGuard<'_, Runtime> {
        self.inner
            .runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The current state.
    pub fn state(&self) -> String {
        self.runtime().current.clone()
    }

    /// The state the machine was constructed in.
    pub fn initial(&self) -> &str {
        &self.inner.initial
    }

    /// Declared state names, sorted.
    pub fn states(&self) -> Vec<&str> {
        self.inner.states.names().collect()
    }

    /// Declared action names, sorted.
    pub fn actions(&self) -> Vec<&str> {
        self.inner.actions.keys().map(String::as_str).collect()
    }

    pub fn graph(&self) -> &StateGraph {
        &self.inner.states
    }

    pub fn is_terminal(&self, state: &str) -> bool {
        self.inner.states.is_terminal(state)
    }

    /// Whether the current state is terminal.
    pub fn is_final(&self) -> bool {
        self.is_terminal(&self.state())
    }

    /// Snapshot of the accepted transitions so far.
    pub fn history(&self) -> StateHistory {
        self.runtime().history.clone()
    }

    /// Whether `transition(target, args)` would change state right now.
    ///
    /// Runs guards but never mutates or notifies. Unknown targets and
    /// unsupported rules answer `false`.
    pub fn can_transition(&self, target: &str, args: &[Value]) -> bool {
        let current = self.state();
        if !self.inner.states.contains(target) || self.is_terminal(&current) {
            return false;
        }
        self.inner
            .states
            .resolve_from(&current, target, args)
            .next_state(&current, target)
            != current
    }

    /// Move to `target` if the current state's handler allows it.
    pub fn transition(&self, target: &str) -> Result<Outcome, FsmError> {
        self.transition_with(target, &[])
    }

    /// Move to `target`, passing `args` to guards and subscribers.
    ///
    /// Fails with [`FsmError::InvalidTarget`] if `target` is not declared,
    /// and with whatever the reporter returns for a diagnostic. Otherwise
    /// exactly one of these happens:
    ///
    /// - the current state is terminal: nothing ([`Outcome::Absorbed`])
    /// - the handler allows it: state changes, then exit, enter, change and
    ///   (for a terminal target) terminate subscribers fire
    /// - the handler denies it: fail subscribers fire
    pub fn transition_with(&self, target: &str, args: &[Value]) -> Result<Outcome, FsmError> {
        self.apply(target, args, None)
    }

    /// Fire the named action.
    pub fn trigger(&self, action: &str) -> Result<Outcome, FsmError> {
        self.trigger_with(action, &[])
    }

    /// Fire the named action with extra arguments.
    ///
    /// An unknown action is a denied transition. Among the action's
    /// transitions, the last one whose `from` covers the current state is
    /// used; if none does, the call is a no-op. The chosen target then goes
    /// through [`Machine::transition_with`].
    pub fn trigger_with(&self, action: &str, args: &[Value]) -> Result<Outcome, FsmError> {
        let current = self.state();

        let Some(transitions) = self.inner.actions.get(action) else {
            trace!(action, state = %current, "unknown action");
            self.notify_fail(&current, args);
            return Ok(Outcome::Denied { state: current });
        };

        let Some(chosen) = select(transitions, &current) else {
            trace!(action, state = %current, "no action transition for state");
            return Ok(Outcome::Unmatched { state: current });
        };

        let target = match &chosen.to {
            ActionTarget::State(state) => state.clone(),
            ActionTarget::Resolve(resolver) => resolver.resolve(&current, args),
        };

        self.apply(&target, args, Some(action))
    }

    fn apply(
        &self,
        target: &str,
        args: &[Value],
        action: Option<&str>,
    ) -> Result<Outcome, FsmError> {
        validate_target_state(target, &self.inner.states)?;

        // Guards run unlocked and may move the machine; the commit only
        // happens against the state the handler was resolved from.
        loop {
            let current = self.state();
            if self.is_terminal(&current) {
                trace!(state = %current, target, "terminal state absorbed transition");
                return Ok(Outcome::Absorbed { state: current });
            }

            let resolution = self.inner.states.resolve_from(&current, target, args);
            if let Resolution::Violation(diagnostic) = &resolution {
                self.inner.options.reporter.report(diagnostic)?;
            }

            if resolution.next_state(&current, target) == current {
                trace!(state = %current, target, "transition denied");
                self.notify_fail(&current, args);
                return Ok(Outcome::Denied { state: current });
            }

            let next = target.to_string();
            let dispatch = {
                let mut runtime = self.runtime();
                if runtime.current != current {
                    trace!(
                        resolved_from = %current,
                        state = %runtime.current,
                        target,
                        "state moved while resolving, retrying"
                    );
                    continue;
                }
                runtime.current = next.clone();
                if self.inner.options.record_history {
                    runtime.history.record(StateTransition {
                        from: current.clone(),
                        to: next.clone(),
                        action: action.map(str::to_string),
                        timestamp: Utc::now(),
                    });
                }
                runtime
                    .subscriptions
                    .dispatch(&current, &next, self.is_terminal(&next))
            };

            debug!(from = %current, to = %next, action, "state changed");
            dispatch.fire(&current, &next, args);

            return Ok(Outcome::Changed {
                from: current,
                to: next,
            });
        }
    }

    fn notify_fail(&self, current: &str, args: &[Value]) {
        let listeners = self.runtime().subscriptions.fail_listeners();
        for callback in listeners {
            callback(current, args);
        }
    }

    /// Subscribe to entering `state`.
    pub fn on_enter(&self, state: &str, callback: TransitionCallback) -> Result<(), FsmError> {
        validate_subscription(state, &self.inner.states)?;
        self.runtime().subscriptions.add_enter(state, callback);
        Ok(())
    }

    /// Remove every registration of `callback` for entering `state`.
    pub fn off_enter(&self, state: &str, callback: &TransitionCallback) -> Result<(), FsmError> {
        validate_subscription(state, &self.inner.states)?;
        self.runtime().subscriptions.remove_enter(state, callback);
        Ok(())
    }

    /// Subscribe to leaving `state`.
    pub fn on_exit(&self, state: &str, callback: TransitionCallback) -> Result<(), FsmError> {
        validate_subscription(state, &self.inner.states)?;
        self.runtime().subscriptions.add_exit(state, callback);
        Ok(())
    }

    /// Remove every registration of `callback` for leaving `state`.
    pub fn off_exit(&self, state: &str, callback: &TransitionCallback) -> Result<(), FsmError> {
        validate_subscription(state, &self.inner.states)?;
        self.runtime().subscriptions.remove_exit(state, callback);
        Ok(())
    }

    /// Subscribe to every state change.
    pub fn on_change(&self, callback: TransitionCallback) {
        self.runtime().subscriptions.add_change(callback);
    }

    pub fn off_change(&self, callback: &TransitionCallback) {
        self.runtime().subscriptions.remove_change(callback);
    }

    /// Subscribe to denied transitions.
    pub fn on_fail(&self, callback: FailCallback) {
        self.runtime().subscriptions.add_fail(callback);
    }

    pub fn off_fail(&self, callback: &FailCallback) {
        self.runtime().subscriptions.remove_fail(callback);
    }

    /// Subscribe to entering a terminal state.
    pub fn on_terminate(&self, callback: TransitionCallback) {
        self.runtime().subscriptions.add_terminate(callback);
    }

    pub fn off_terminate(&self, callback: &TransitionCallback) {
        self.runtime().subscriptions.remove_terminate(callback);
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.state())
            .field("states", &self.states())
            .field("actions", &self.actions())
            .finish()
    }
}
