//! Record of the transitions a machine has taken.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One accepted transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: String,
    pub to: String,
    /// Set when the transition was fired through `trigger`.
    pub action: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of accepted transitions.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use waypoint::{StateHistory, StateTransition};
///
/// let mut history = StateHistory::new();
/// history.record(StateTransition {
///     from: "foo".into(),
///     to: "bar".into(),
///     action: None,
///     timestamp: Utc::now(),
/// });
/// history.record(StateTransition {
///     from: "bar".into(),
///     to: "baz".into(),
///     action: Some("next".into()),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.get_path(), vec!["foo", "bar", "baz"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transition.
    pub fn record(&mut self, transition: StateTransition) {
        self.transitions.push(transition);
    }

    /// States traversed: the first source, then every target in order.
    pub fn get_path(&self) -> Vec<&str> {
        self.transitions
            .first()
            .map(|first| first.from.as_str())
            .into_iter()
            .chain(self.transitions.iter().map(|t| t.to.as_str()))
            .collect()
    }

    /// The most recent transition.
    pub fn last(&self) -> Option<&StateTransition> {
        self.transitions.last()
    }

    /// Transitions fired by the named action.
    pub fn by_action<'a>(&'a self, action: &'a str) -> impl Iterator<Item = &'a StateTransition> {
        self.transitions
            .iter()
            .filter(move |t| t.action.as_deref() == Some(action))
    }

    /// Time between the first and last recorded transitions.
    ///
    /// Returns `None` if nothing has been recorded.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.transitions.first()?;
        let last = self.transitions.last()?;
        (last.timestamp - first.timestamp).to_std().ok()
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
