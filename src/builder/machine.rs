//! Builder for constructing machines.

use crate::graph::{StateGraph, StateHandler};
use crate::machine::{Machine, MachineOptions};
use crate::report::Reporter;
use crate::spec::{ActionSpec, ActionTransition, ConfigError, MachineSpec};
use std::sync::Arc;

/// Builder for constructing machines with a fluent API.
#[derive(Debug, Default)]
pub struct MachineBuilder {
    states: StateGraph,
    initial: Option<String>,
    actions: ActionSpec,
    options: MachineOptions,
}

impl MachineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a state and its handler.
    pub fn state(mut self, name: impl Into<String>, handler: impl Into<StateHandler>) -> Self {
        self.states.insert(name, handler);
        self
    }

    /// Declare every state of an existing graph.
    pub fn states(mut self, states: StateGraph) -> Self {
        for (name, handler) in states.iter() {
            self.states.insert(name, handler.clone());
        }
        self
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: impl Into<String>) -> Self {
        self.initial = Some(state.into());
        self
    }

    /// Append a transition to the named action.
    pub fn action(mut self, name: impl Into<String>, transition: ActionTransition) -> Self {
        self.actions.entry(name.into()).or_default().push(transition);
        self
    }

    /// Set the diagnostic strategy.
    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.options.reporter = reporter;
        self
    }

    /// Turn transition history on or off.
    pub fn record_history(mut self, enabled: bool) -> Self {
        self.options.record_history = enabled;
        self
    }

    /// The spec this builder would build, without validating it.
    pub fn spec(self) -> Result<MachineSpec, ConfigError> {
        let initial = self.initial.ok_or(ConfigError::MissingInitial)?;
        Ok(MachineSpec::new(self.states, initial).with_actions(self.actions))
    }

    /// Validate and build the machine.
    pub fn build(self) -> Result<Machine, ConfigError> {
        let options = self.options.clone();
        Machine::with_options(self.spec()?, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RulesBuilder;
    use crate::graph::GuardContext;
    use crate::report::CollectingReporter;
    use serde_json::json;

    #[test]
    fn builder_requires_initial_state() {
        let result = MachineBuilder::new()
            .state("foo", "bar")
            .state("bar", "foo")
            .build();

        assert!(matches!(result, Err(ConfigError::MissingInitial)));
    }

    #[test]
    fn builder_validates_graph() {
        let result = MachineBuilder::new().state("foo", "foo").initial("foo").build();

        assert!(matches!(result, Err(ConfigError::TooFewStates { count: 1 })));
    }

    #[test]
    fn fluent_api_builds_machine() {
        let machine = MachineBuilder::new()
            .state("foo", ["bar", "baz"])
            .state("bar", "foo")
            .state(
                "baz",
                RulesBuilder::new()
                    .when("foo", |ctx: &GuardContext| ctx.arg(0) == Some(&json!(true))),
            )
            .initial("foo")
            .action("next", ActionTransition::new("foo", "bar"))
            .action("next", ActionTransition::new("bar", "foo"))
            .build()
            .unwrap();

        assert_eq!(machine.state(), "foo");
        assert_eq!(machine.actions(), vec!["next"]);

        machine.trigger("next").unwrap();
        assert_eq!(machine.state(), "bar");
        machine.trigger("next").unwrap();
        assert_eq!(machine.state(), "foo");
    }

    #[test]
    fn options_reach_the_machine() {
        let reporter = Arc::new(CollectingReporter::new());
        let unsupported: StateHandler = serde_json::from_value(json!({ "foo": 0 })).unwrap();
        let machine = MachineBuilder::new()
            .states(StateGraph::new().with("foo", "bar").with("bar", unsupported))
            .initial("foo")
            .reporter(reporter.clone())
            .record_history(false)
            .build()
            .unwrap();

        machine.transition("bar").unwrap();
        assert!(!machine.transition("foo").unwrap().is_changed());

        assert_eq!(reporter.diagnostics().len(), 1);
        assert!(machine.history().is_empty());
    }
}
