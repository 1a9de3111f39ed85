//! Subscriber lists for lifecycle notifications.
//!
//! Registrations are identified by their `Arc` handle. Registering the
//! same handle twice means it is invoked twice per event; removing it
//! drops every registration of that handle.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Callback for enter, exit, change and terminate events.
///
/// Receives `(old_state, new_state, args)`.
pub type TransitionCallback = Arc<dyn Fn(&str, &str, &[Value]) + Send + Sync>;

/// Callback for fail events.
///
/// Receives `(current_state, args)`.
pub type FailCallback = Arc<dyn Fn(&str, &[Value]) + Send + Sync>;

/// Wrap a closure as a [`TransitionCallback`].
///
/// Keep the returned handle to unsubscribe later.
pub fn transition_callback<F>(callback: F) -> TransitionCallback
where
    F: Fn(&str, &str, &[Value]) + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Wrap a closure as a [`FailCallback`].
pub fn fail_callback<F>(callback: F) -> FailCallback
where
    F: Fn(&str, &[Value]) + Send + Sync + 'static,
{
    Arc::new(callback)
}

/// Callbacks to fire for one accepted transition, in firing order.
pub(crate) struct Dispatch {
    exit: Vec<TransitionCallback>,
    enter: Vec<TransitionCallback>,
    change: Vec<TransitionCallback>,
    terminate: Vec<TransitionCallback>,
}

impl Dispatch {
    pub(crate) fn fire(&self, from: &str, to: &str, args: &[Value]) {
        let ordered = self
            .exit
            .iter()
            .chain(&self.enter)
            .chain(&self.change)
            .chain(&self.terminate);
        for callback in ordered {
            callback(from, to, args);
        }
    }
}

/// Per-event ordered subscriber lists.
///
/// Built once with an empty enter and exit list per declared state and
/// only ever appended to or filtered afterwards.
#[derive(Default)]
pub(crate) struct SubscriptionRegistry {
    enter: BTreeMap<String, Vec<TransitionCallback>>,
    exit: BTreeMap<String, Vec<TransitionCallback>>,
    change: Vec<TransitionCallback>,
    fail: Vec<FailCallback>,
    terminate: Vec<TransitionCallback>,
}

impl SubscriptionRegistry {
    pub(crate) fn new<'a>(states: impl IntoIterator<Item = &'a str>) -> Self {
        let mut registry = Self::default();
        for state in states {
            registry.enter.insert(state.to_string(), Vec::new());
            registry.exit.insert(state.to_string(), Vec::new());
        }
        registry
    }

    pub(crate) fn add_enter(&mut self, state: &str, callback: TransitionCallback) {
        self.enter.entry(state.to_string()).or_default().push(callback);
    }

    pub(crate) fn remove_enter(&mut self, state: &str, callback: &TransitionCallback) {
        if let Some(list) = self.enter.get_mut(state) {
            remove_all(list, callback);
        }
    }

    pub(crate) fn add_exit(&mut self, state: &str, callback: TransitionCallback) {
        self.exit.entry(state.to_string()).or_default().push(callback);
    }

    pub(crate) fn remove_exit(&mut self, state: &str, callback: &TransitionCallback) {
        if let Some(list) = self.exit.get_mut(state) {
            remove_all(list, callback);
        }
    }

    pub(crate) fn add_change(&mut self, callback: TransitionCallback) {
        self.change.push(callback);
    }

    pub(crate) fn remove_change(&mut self, callback: &TransitionCallback) {
        remove_all(&mut self.change, callback);
    }

    pub(crate) fn add_fail(&mut self, callback: FailCallback) {
        self.fail.push(callback);
    }

    pub(crate) fn remove_fail(&mut self, callback: &FailCallback) {
        remove_all(&mut self.fail, callback);
    }

    pub(crate) fn add_terminate(&mut self, callback: TransitionCallback) {
        self.terminate.push(callback);
    }

    pub(crate) fn remove_terminate(&mut self, callback: &TransitionCallback) {
        remove_all(&mut self.terminate, callback);
    }

    /// Snapshot the callbacks for a transition from `from` to `to`.
    pub(crate) fn dispatch(&self, from: &str, to: &str, terminal: bool) -> Dispatch {
        Dispatch {
            exit: self.exit.get(from).cloned().unwrap_or_default(),
            enter: self.enter.get(to).cloned().unwrap_or_default(),
            change: self.change.clone(),
            terminate: if terminal {
                self.terminate.clone()
            } else {
                Vec::new()
            },
        }
    }

    /// Snapshot the fail callbacks.
    pub(crate) fn fail_listeners(&self) -> Vec<FailCallback> {
        self.fail.clone()
    }
}

fn remove_all<T: ?Sized>(list: &mut Vec<Arc<T>>, callback: &Arc<T>) {
    list.retain(|registered| !Arc::ptr_eq(registered, callback));
}
