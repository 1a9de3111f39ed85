//! Builder for guarded handlers.

use crate::graph::{Guard, GuardContext, Rule, StateHandler};
use std::collections::BTreeMap;

/// Builds a [`StateHandler::Guarded`] one target at a time.
///
/// ```rust
/// use serde_json::json;
/// use waypoint::builder::RulesBuilder;
/// use waypoint::graph::{GuardContext, StateHandler};
///
/// let handler: StateHandler = RulesBuilder::new()
///     .always("bar")
///     .when("foo", |ctx: &GuardContext| ctx.arg(0) == Some(&json!(1)))
///     .into();
///
/// assert_eq!(handler.targets(), vec!["bar", "foo"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RulesBuilder {
    rules: BTreeMap<String, Rule>,
}

impl RulesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `target` unconditionally.
    pub fn always(mut self, target: impl Into<String>) -> Self {
        self.rules.insert(target.into(), Rule::Always);
        self
    }

    /// List `target` without ever allowing it.
    pub fn never(mut self, target: impl Into<String>) -> Self {
        self.rules.insert(target.into(), Rule::Never);
        self
    }

    /// Allow `target` when the predicate passes.
    pub fn when<F>(self, target: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&GuardContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.guard(target, Guard::new(predicate))
    }

    /// Allow `target` when an existing guard passes.
    pub fn guard(mut self, target: impl Into<String>, guard: Guard) -> Self {
        self.rules.insert(target.into(), Rule::When(guard));
        self
    }

    pub fn build(self) -> StateHandler {
        StateHandler::Guarded(self.rules)
    }
}

impl From<RulesBuilder> for StateHandler {
    fn from(builder: RulesBuilder) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{resolve, Resolution};
    use serde_json::json;

    #[test]
    fn later_rule_replaces_earlier_for_same_target() {
        let handler = RulesBuilder::new()
            .always("foo")
            .when("foo", |_: &GuardContext| false)
            .build();

        assert_eq!(resolve("foo", "baz", &handler, &[]), Resolution::Deny);
    }

    #[test]
    fn builds_mixed_rules() {
        let handler = RulesBuilder::new()
            .always("bar")
            .when("foo", |ctx: &GuardContext| ctx.arg(0) == Some(&json!("go")))
            .build();

        assert!(resolve("bar", "baz", &handler, &[]).is_accept());
        assert!(resolve("foo", "baz", &handler, &[json!("go")]).is_accept());
        assert_eq!(resolve("foo", "baz", &handler, &[]), Resolution::Deny);
    }

    #[test]
    fn never_keeps_target_listed_but_denied() {
        let handler = RulesBuilder::new().always("bar").never("foo").build();

        assert_eq!(handler.targets(), vec!["bar", "foo"]);
        assert_eq!(resolve("foo", "baz", &handler, &[]), Resolution::Deny);
    }

    #[test]
    fn shared_guard_can_back_several_targets() {
        let ready = Guard::new(|ctx: &GuardContext| ctx.arg(0) == Some(&json!(true)));
        let handler = RulesBuilder::new()
            .guard("foo", ready.clone())
            .guard("bar", ready)
            .build();

        let args = [json!(true)];
        assert!(resolve("foo", "baz", &handler, &args).is_accept());
        assert!(resolve("bar", "baz", &handler, &args).is_accept());
    }
}
