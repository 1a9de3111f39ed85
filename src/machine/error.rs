//! Errors returned by machine operations.

use crate::report::Diagnostic;
use crate::spec::ConfigError;
use thiserror::Error;

/// Errors that can occur while operating a machine.
///
/// A denied transition is not an error: it is reported through the
/// `fail` subscribers and as [`Outcome::Denied`](crate::Outcome::Denied).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FsmError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("state key '{target}' could not be found in the state graph")]
    InvalidTarget { target: String },

    #[error("no state matches subscription key '{state}'")]
    InvalidSubscriptionKey { state: String },

    #[error(transparent)]
    Diagnostic(#[from] Diagnostic),
}
