//! Builder API for ergonomic machine construction.
//!
//! This module provides a fluent builder and a macro for declaring state
//! graphs, guarded handlers and actions in code.

pub mod machine;
pub mod macros;
pub mod rules;

pub use machine::MachineBuilder;
pub use rules::RulesBuilder;
