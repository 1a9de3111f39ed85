//! Machine specifications: the declarative input to a machine.
//!
//! A [`MachineSpec`] bundles the state graph, the initial state and the
//! optional named actions. Specs are built in code (directly or through
//! [`MachineBuilder`](crate::builder::MachineBuilder)) or loaded from JSON.
//! Either way they pass through [`validate_construction`] before a machine
//! exists.

mod action;
pub mod error;
mod validation;

pub use action::{select, ActionSpec, ActionTarget, ActionTransition, Sources, TargetResolver};
pub use error::ConfigError;
pub use validation::{
    audit, validate_actions, validate_construction, validate_subscription, validate_target_state,
};

use crate::graph::{StateGraph, StateHandler};
use serde_json::{Map, Value};

/// Everything needed to construct a machine.
#[derive(Clone, Debug)]
pub struct MachineSpec {
    pub states: StateGraph,
    pub initial: String,
    pub actions: ActionSpec,
}

impl MachineSpec {
    /// A spec without actions.
    pub fn new(states: StateGraph, initial: impl Into<String>) -> Self {
        Self {
            states,
            initial: initial.into(),
            actions: ActionSpec::new(),
        }
    }

    pub fn with_actions(mut self, actions: ActionSpec) -> Self {
        self.actions = actions;
        self
    }

    /// Parse a spec from JSON text.
    ///
    /// Only shape is checked here; graph closure and state references
    /// are checked when the machine is built.
    ///
    /// ```rust
    /// use waypoint::spec::MachineSpec;
    ///
    /// let spec = MachineSpec::from_json(r#"{
    ///     "initial": "foo",
    ///     "states": { "foo": "bar", "bar": ["foo", "baz"], "baz": { "foo": true } },
    ///     "actions": { "next": [{ "from": "foo", "to": "bar" }] }
    /// }"#).unwrap();
    ///
    /// assert_eq!(spec.initial, "foo");
    /// assert_eq!(spec.states.len(), 3);
    /// assert_eq!(spec.actions["next"].len(), 1);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    /// Build a spec from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let Value::Object(mut root) = value else {
            return Err(ConfigError::NotAnObject);
        };

        let states = root.remove("states").ok_or(ConfigError::MissingStates)?;
        let initial = root.remove("initial").ok_or(ConfigError::MissingInitial)?;

        let Value::Object(states) = states else {
            return Err(ConfigError::StatesNotObject);
        };
        let Value::String(initial) = initial else {
            return Err(ConfigError::InitialNotString);
        };

        let mut graph = StateGraph::new();
        for (name, handler) in &states {
            let handler = StateHandler::from_value(handler).map_err(|reason| {
                ConfigError::InvalidHandler {
                    state: name.clone(),
                    reason,
                }
            })?;
            graph.insert(name.clone(), handler);
        }

        let actions = match root.remove("actions") {
            None | Some(Value::Null) => ActionSpec::new(),
            Some(Value::Object(actions)) => parse_actions(&actions)?,
            Some(_) => return Err(ConfigError::ActionsNotObject),
        };

        Ok(Self {
            states: graph,
            initial,
            actions,
        })
    }
}

fn parse_actions(actions: &Map<String, Value>) -> Result<ActionSpec, ConfigError> {
    actions
        .iter()
        .map(|(name, transitions)| {
            let Value::Array(transitions) = transitions else {
                return Err(ConfigError::ActionNotList {
                    action: name.clone(),
                });
            };
            let parsed = transitions
                .iter()
                .map(|t| parse_transition(name, t))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((name.clone(), parsed))
        })
        .collect()
}

fn parse_transition(action: &str, value: &Value) -> Result<ActionTransition, ConfigError> {
    let Value::Object(transition) = value else {
        return Err(ConfigError::TransitionNotObject {
            action: action.to_string(),
        });
    };

    let from = match transition.get("from") {
        None => {
            return Err(ConfigError::MissingFrom {
                action: action.to_string(),
            })
        }
        Some(Value::String(source)) => Sources::One(source.clone()),
        Some(Value::Array(sources)) => sources
            .iter()
            .map(|s| s.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(Sources::Many)
            .ok_or_else(|| ConfigError::InvalidFrom {
                action: action.to_string(),
            })?,
        Some(_) => {
            return Err(ConfigError::InvalidFrom {
                action: action.to_string(),
            })
        }
    };

    let to = match transition.get("to") {
        None => {
            return Err(ConfigError::MissingTo {
                action: action.to_string(),
            })
        }
        Some(Value::String(target)) => ActionTarget::State(target.clone()),
        Some(_) => {
            return Err(ConfigError::InvalidTo {
                action: action.to_string(),
            })
        }
    };

    Ok(ActionTransition { from, to })
}
