//! Configuration errors raised while building a machine.

use thiserror::Error;

/// Structural problems with a machine specification.
///
/// Construction stops at the first one; [`audit`](crate::spec::audit)
/// reports all of them.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("specification is not valid JSON: {0}")]
    Malformed(String),

    #[error("state graph is not an object")]
    NotAnObject,

    #[error("'states' were not defined")]
    MissingStates,

    #[error("'initial' was not defined")]
    MissingInitial,

    #[error("'states' is not an object")]
    StatesNotObject,

    #[error("'initial' is not a string")]
    InitialNotString,

    #[error("handler for state '{state}' is invalid: {reason}")]
    InvalidHandler { state: String, reason: String },

    #[error("initial state '{initial}' cannot be found in state graph")]
    UnknownInitial { initial: String },

    #[error("there is only one state in the state graph (found {count})")]
    TooFewStates { count: usize },

    #[error("these states are unreachable: {}", .states.join(","))]
    UnreachableStates { states: Vec<String> },

    #[error("these target states do not exist in the graph: {}", .states.join(","))]
    UnknownTargets { states: Vec<String> },

    #[error("'actions' should be an object (if defined)")]
    ActionsNotObject,

    #[error("action '{action}' should be an array of transitions")]
    ActionNotList { action: String },

    #[error("transitions defined in action '{action}' should be objects")]
    TransitionNotObject { action: String },

    #[error("transitions defined in action '{action}' should contain a 'from' property")]
    MissingFrom { action: String },

    #[error("'from' in action '{action}' should be a string or an array of strings")]
    InvalidFrom { action: String },

    #[error("transitions defined in action '{action}' should contain a 'to' property")]
    MissingTo { action: String },

    #[error("'to' in action '{action}' should be a state name")]
    InvalidTo { action: String },

    #[error("action '{action}' refers to unknown state '{state}'")]
    UnknownActionState { action: String, state: String },
}
