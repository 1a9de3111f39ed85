//! Guard predicates for conditional targets.
//!
//! A guard decides whether a transition along one edge of a guarded
//! handler may proceed. Guards see the edge being attempted and the
//! extra arguments passed to `transition`.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// The edge being attempted, handed to a guard when it is evaluated.
#[derive(Clone, Copy, Debug)]
pub struct GuardContext<'a> {
    /// The current state.
    pub from: &'a str,
    /// The candidate target state.
    pub to: &'a str,
    /// Extra arguments supplied to `transition` or `trigger`.
    pub args: &'a [Value],
}

impl<'a> GuardContext<'a> {
    pub fn new(from: &'a str, to: &'a str, args: &'a [Value]) -> Self {
        Self { from, to, args }
    }

    /// The extra argument at `index`, if supplied.
    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }
}

/// Predicate that determines whether a guarded edge can be taken.
///
/// Guards are cheap to clone; clones share the same predicate.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use waypoint::graph::{Guard, GuardContext};
///
/// let confirmed = Guard::new(|ctx: &GuardContext| ctx.arg(0) == Some(&json!(true)));
///
/// let args = [json!(true)];
/// assert!(confirmed.check(&GuardContext::new("baz", "foo", &args)));
/// assert!(!confirmed.check(&GuardContext::new("baz", "foo", &[])));
/// ```
#[derive(Clone)]
pub struct Guard {
    predicate: Arc<dyn Fn(&GuardContext<'_>) -> bool + Send + Sync>,
}

impl Guard {
    /// Create a guard from a predicate.
    ///
    /// The predicate runs while no machine lock is held, so it may query
    /// the machine that evaluates it.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&GuardContext<'_>) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate the guard for one attempted edge.
    pub fn check(&self, ctx: &GuardContext<'_>) -> bool {
        (self.predicate)(ctx)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}
