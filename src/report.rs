//! Diagnostics and the strategies that handle them.
//!
//! A diagnostic is a contract violation found while resolving a
//! transition, such as a declarative rule that is neither a boolean nor a
//! guard. It is not a configuration error: the graph was accepted at
//! construction. The machine hands each diagnostic to its [`Reporter`],
//! which decides whether the call fails or carries on as a denial.

use crate::machine::FsmError;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::warn;

/// Contract violations found during resolution.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Diagnostic {
    #[error("rule for '{from}' -> '{to}' is neither a boolean nor a guard: {rule}")]
    UnsupportedRule {
        from: String,
        to: String,
        rule: String,
    },
}

/// Strategy for handling diagnostics.
///
/// Returning `Err` fails the call before any notification fires.
/// Returning `Ok` lets the machine treat the transition as denied.
pub trait Reporter: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic) -> Result<(), FsmError>;
}

/// Fail the call with [`FsmError::Diagnostic`]. The default strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Raise;

impl Reporter for Raise {
    fn report(&self, diagnostic: &Diagnostic) -> Result<(), FsmError> {
        Err(FsmError::Diagnostic(diagnostic.clone()))
    }
}

/// Log a warning through `tracing` and continue.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, diagnostic: &Diagnostic) -> Result<(), FsmError> {
        warn!(%diagnostic, "transition denied by diagnostic");
        Ok(())
    }
}

/// Keep every diagnostic for later inspection and continue.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics reported so far, oldest first.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the collected diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, diagnostic: &Diagnostic) -> Result<(), FsmError> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic.clone());
        Ok(())
    }
}
