//! Waypoint: a declarative finite state machine.
//!
//! A machine is described by a state graph, an initial state and optional
//! named actions. The graph is validated once at construction; afterwards
//! the machine tracks a single current state, performs validated
//! transitions and notifies subscribers synchronously.
//!
//! # Core Concepts
//!
//! - **State graph**: maps each state to a handler naming its legal targets
//! - **Handler**: a single target, a set of targets, or per-target rules
//!   that may be guarded by predicates
//! - **Action**: a named shortcut resolved against the current state
//! - **Subscribers**: enter, exit, change, fail and terminate callbacks
//!
//! A denied transition is not an error. It is reported to `fail`
//! subscribers; errors are reserved for malformed requests.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use waypoint::builder::{MachineBuilder, RulesBuilder};
//! use waypoint::graph::GuardContext;
//! use waypoint::{transition_callback, ActionTransition};
//! use std::sync::{Arc, Mutex};
//!
//! let machine = MachineBuilder::new()
//!     .state("closed", ["open", "locked"])
//!     .state("open", "closed")
//!     .state(
//!         "locked",
//!         RulesBuilder::new().when("closed", |ctx: &GuardContext| {
//!             ctx.arg(0) == Some(&json!("key"))
//!         }),
//!     )
//!     .initial("closed")
//!     .action("toggle", ActionTransition::new("closed", "open"))
//!     .action("toggle", ActionTransition::new("open", "closed"))
//!     .build()
//!     .unwrap();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let log = Arc::clone(&seen);
//! machine.on_change(transition_callback(move |from, to, _| {
//!     log.lock().unwrap().push(format!("{from}->{to}"));
//! }));
//!
//! machine.trigger("toggle").unwrap();
//! machine.trigger("toggle").unwrap();
//! machine.transition("locked").unwrap();
//! machine.transition_with("closed", &[json!("key")]).unwrap();
//!
//! assert_eq!(machine.state(), "closed");
//! assert_eq!(seen.lock().unwrap().len(), 4);
//! ```

pub mod builder;
pub mod graph;
pub mod machine;
pub mod report;
pub mod spec;

// Re-export commonly used types
pub use graph::{Guard, GuardContext, Rule, StateGraph, StateHandler};
pub use machine::{
    fail_callback, transition_callback, FailCallback, FsmError, Machine, MachineOptions, Outcome,
    StateHistory, StateTransition, TransitionCallback,
};
pub use report::{CollectingReporter, Diagnostic, LogReporter, Raise, Reporter};
pub use spec::{ActionSpec, ActionTransition, ConfigError, MachineSpec};
