//! State graph types and transition resolution.
//!
//! A state graph maps every declared state to the handler that describes
//! where the machine may go next. Handlers come in three shapes:
//!
//! - **Target**: exactly one legal target, always allowed
//! - **AnyOf**: several targets, each always allowed
//! - **Guarded**: per-target rules, either unconditional or guarded
//!
//! Everything in this module is pure. The machine owns state and
//! notifications; the graph only answers "where would this go?".

mod guard;
mod resolve;

pub use guard::{Guard, GuardContext};
pub use resolve::{resolve, Resolution};

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Rule attached to one target of a guarded handler.
#[derive(Clone, Debug)]
pub enum Rule {
    /// The target can always be reached.
    Always,

    /// The target is listed but never allowed.
    Never,

    /// The target can be reached when the guard passes.
    When(Guard),

    /// A declarative value that is not a boolean.
    ///
    /// Resolving an unsupported rule denies the transition and reports a
    /// diagnostic. Holds the offending value rendered as JSON.
    Unsupported(String),
}

impl Rule {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(true) => Rule::Always,
            Value::Bool(false) => Rule::Never,
            other => Rule::Unsupported(other.to_string()),
        }
    }
}

/// The transition rule attached to one state.
#[derive(Clone, Debug)]
pub enum StateHandler {
    /// Exactly one legal target.
    Target(String),

    /// Any of these targets is always allowed.
    AnyOf(Vec<String>),

    /// Targets keyed by name, each with its own rule.
    Guarded(BTreeMap<String, Rule>),
}

impl StateHandler {
    /// Every state name this handler refers to, in declaration order.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            StateHandler::Target(target) => vec![target.as_str()],
            StateHandler::AnyOf(targets) => targets.iter().map(String::as_str).collect(),
            StateHandler::Guarded(rules) => rules.keys().map(String::as_str).collect(),
        }
    }

    pub(crate) fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(target) => Ok(StateHandler::Target(target.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(target) => Ok(target.clone()),
                    other => Err(format!("target list contains a non-string element: {other}")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(StateHandler::AnyOf),
            Value::Object(map) => Ok(StateHandler::Guarded(
                map.iter()
                    .map(|(target, rule)| (target.clone(), Rule::from_value(rule)))
                    .collect(),
            )),
            other => Err(format!(
                "handler must be a string, an array of strings or an object, got {other}"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for StateHandler {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        StateHandler::from_value(&value).map_err(de::Error::custom)
    }
}

impl From<&str> for StateHandler {
    fn from(target: &str) -> Self {
        StateHandler::Target(target.to_string())
    }
}

impl From<String> for StateHandler {
    fn from(target: String) -> Self {
        StateHandler::Target(target)
    }
}

impl<const N: usize> From<[&str; N]> for StateHandler {
    fn from(targets: [&str; N]) -> Self {
        StateHandler::AnyOf(targets.iter().map(|t| t.to_string()).collect())
    }
}

impl From<Vec<String>> for StateHandler {
    fn from(targets: Vec<String>) -> Self {
        StateHandler::AnyOf(targets)
    }
}

impl From<BTreeMap<String, Rule>> for StateHandler {
    fn from(rules: BTreeMap<String, Rule>) -> Self {
        StateHandler::Guarded(rules)
    }
}

/// Mapping from state name to its handler.
///
/// Names are kept sorted so that anything listing states (errors,
/// introspection) is deterministic.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct StateGraph {
    states: BTreeMap<String, StateHandler>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a state, replacing any previous handler for it.
    pub fn insert(&mut self, name: impl Into<String>, handler: impl Into<StateHandler>) {
        self.states.insert(name.into(), handler.into());
    }

    /// Chaining form of [`StateGraph::insert`].
    pub fn with(mut self, name: impl Into<String>, handler: impl Into<StateHandler>) -> Self {
        self.insert(name, handler);
        self
    }

    pub fn handler(&self, name: &str) -> Option<&StateHandler> {
        self.states.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Declared state names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StateHandler)> {
        self.states.iter().map(|(name, handler)| (name.as_str(), handler))
    }

    /// Every state name referenced as a target anywhere in the graph.
    pub fn targets(&self) -> BTreeSet<&str> {
        self.states
            .values()
            .flat_map(StateHandler::targets)
            .collect()
    }

    /// Resolve a transition from `current` using its handler.
    ///
    /// An undeclared `current` has no handler and denies everything.
    pub fn resolve_from(&self, current: &str, target: &str, args: &[Value]) -> Resolution {
        match self.states.get(current) {
            Some(handler) => resolve(target, current, handler, args),
            None => Resolution::Deny,
        }
    }

    /// A state is terminal when its handler maps only to itself.
    pub fn is_terminal(&self, name: &str) -> bool {
        matches!(self.states.get(name), Some(StateHandler::Target(target)) if target == name)
    }
}

impl<N, H> FromIterator<(N, H)> for StateGraph
where
    N: Into<String>,
    H: Into<StateHandler>,
{
    fn from_iter<I: IntoIterator<Item = (N, H)>>(iter: I) -> Self {
        let mut graph = StateGraph::new();
        for (name, handler) in iter {
            graph.insert(name, handler);
        }
        graph
    }
}
