//! Named actions: transition shortcuts resolved from the current state.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Mapping from action name to its transitions, in declaration order.
pub type ActionSpec = BTreeMap<String, Vec<ActionTransition>>;

/// Source state(s) an action transition applies to.
#[derive(Clone, Debug, PartialEq)]
pub enum Sources {
    One(String),
    Many(Vec<String>),
}

impl Sources {
    pub fn contains(&self, state: &str) -> bool {
        match self {
            Sources::One(source) => source == state,
            Sources::Many(sources) => sources.iter().any(|s| s == state),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice = match self {
            Sources::One(source) => std::slice::from_ref(source),
            Sources::Many(sources) => sources.as_slice(),
        };
        slice.iter().map(String::as_str)
    }
}

impl From<&str> for Sources {
    fn from(source: &str) -> Self {
        Sources::One(source.to_string())
    }
}

impl From<String> for Sources {
    fn from(source: String) -> Self {
        Sources::One(source)
    }
}

impl<const N: usize> From<[&str; N]> for Sources {
    fn from(sources: [&str; N]) -> Self {
        Sources::Many(sources.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<String>> for Sources {
    fn from(sources: Vec<String>) -> Self {
        Sources::Many(sources)
    }
}

/// Computes an action's target from the current state and the
/// arguments passed to `trigger`.
#[derive(Clone)]
pub struct TargetResolver {
    resolve: Arc<dyn Fn(&str, &[Value]) -> String + Send + Sync>,
}

impl TargetResolver {
    pub fn new<F>(resolve: F) -> Self
    where
        F: Fn(&str, &[Value]) -> String + Send + Sync + 'static,
    {
        Self {
            resolve: Arc::new(resolve),
        }
    }

    pub fn resolve(&self, current: &str, args: &[Value]) -> String {
        (self.resolve)(current, args)
    }
}

impl fmt::Debug for TargetResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TargetResolver(..)")
    }
}

/// Where an action transition leads.
#[derive(Clone, Debug)]
pub enum ActionTarget {
    State(String),
    Resolve(TargetResolver),
}

impl ActionTarget {
    /// The declared state name, if the target is not computed.
    pub fn literal(&self) -> Option<&str> {
        match self {
            ActionTarget::State(state) => Some(state.as_str()),
            ActionTarget::Resolve(_) => None,
        }
    }
}

/// One `{from, to}` entry of an action.
#[derive(Clone, Debug)]
pub struct ActionTransition {
    pub from: Sources,
    pub to: ActionTarget,
}

impl ActionTransition {
    /// Transition to a fixed state.
    pub fn new(from: impl Into<Sources>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: ActionTarget::State(to.into()),
        }
    }

    /// Transition whose target is computed when the action fires.
    pub fn resolved<F>(from: impl Into<Sources>, resolve: F) -> Self
    where
        F: Fn(&str, &[Value]) -> String + Send + Sync + 'static,
    {
        Self {
            from: from.into(),
            to: ActionTarget::Resolve(TargetResolver::new(resolve)),
        }
    }
}

/// Select the transition of `transitions` that applies to `current`.
///
/// Later entries override earlier ones for the same source state, so
/// the last match wins.
pub fn select<'a>(
    transitions: &'a [ActionTransition],
    current: &str,
) -> Option<&'a ActionTransition> {
    transitions.iter().rev().find(|t| t.from.contains(current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sources_membership() {
        assert!(Sources::from("foo").contains("foo"));
        assert!(!Sources::from("foo").contains("bar"));

        let many = Sources::from(["foo", "bar"]);
        assert!(many.contains("bar"));
        assert!(!many.contains("baz"));
        assert_eq!(many.iter().collect::<Vec<_>>(), vec!["foo", "bar"]);
    }

    #[test]
    fn select_prefers_last_match() {
        let transitions = vec![
            ActionTransition::new("foo", "bar"),
            ActionTransition::new(["foo", "baz"], "baz"),
            ActionTransition::new("bar", "foo"),
        ];

        let chosen = select(&transitions, "foo").unwrap();
        assert_eq!(chosen.to.literal(), Some("baz"));

        let chosen = select(&transitions, "bar").unwrap();
        assert_eq!(chosen.to.literal(), Some("foo"));

        assert!(select(&transitions, "qux").is_none());
    }

    #[test]
    fn resolver_receives_state_and_args() {
        let transition = ActionTransition::resolved("bar", |current, args| {
            if args.first() == Some(&json!(1)) {
                "foo".to_string()
            } else {
                format!("{current}-next")
            }
        });

        let ActionTarget::Resolve(resolver) = &transition.to else {
            panic!("expected resolver");
        };
        assert_eq!(resolver.resolve("bar", &[json!(1)]), "foo");
        assert_eq!(resolver.resolve("bar", &[]), "bar-next");
        assert!(transition.to.literal().is_none());
    }
}
