//! Per-state transition resolution.

use super::{GuardContext, Rule, StateHandler};
use crate::report::Diagnostic;
use serde_json::Value;

/// Verdict of resolving one attempted transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// The handler allows the target.
    Accept,

    /// The handler does not allow the target.
    Deny,

    /// The handler holds a rule that cannot be evaluated. Counts as a
    /// denial once the diagnostic has been reported.
    Violation(Diagnostic),
}

impl Resolution {
    /// The state the machine would be in after this verdict.
    pub fn next_state<'a>(&self, current: &'a str, target: &'a str) -> &'a str {
        match self {
            Resolution::Accept => target,
            Resolution::Deny | Resolution::Violation(_) => current,
        }
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, Resolution::Accept)
    }
}

/// Decide whether `handler` (the handler of `current`) allows moving to
/// `target`.
///
/// Guards are invoked with the attempted edge and `args`. This function
/// never touches machine state or fires callbacks.
pub fn resolve(target: &str, current: &str, handler: &StateHandler, args: &[Value]) -> Resolution {
    let allowed = match handler {
        StateHandler::Target(only) => only == target,
        StateHandler::AnyOf(targets) => targets.iter().any(|t| t == target),
        StateHandler::Guarded(rules) => match rules.get(target) {
            Some(Rule::Always) => true,
            Some(Rule::Never) => false,
            Some(Rule::When(guard)) => guard.check(&GuardContext::new(current, target, args)),
            Some(Rule::Unsupported(rule)) => {
                return Resolution::Violation(Diagnostic::UnsupportedRule {
                    from: current.to_string(),
                    to: target.to_string(),
                    rule: rule.clone(),
                })
            }
            None => false,
        },
    };

    if allowed {
        Resolution::Accept
    } else {
        Resolution::Deny
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Guard;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn guarded() -> StateHandler {
        let mut rules = BTreeMap::new();
        rules.insert(
            "foo".to_string(),
            Rule::When(Guard::new(|ctx: &GuardContext| ctx.arg(0) == Some(&json!(true)))),
        );
        rules.insert("bar".to_string(), Rule::Always);
        rules.insert("quux".to_string(), Rule::Never);
        rules.insert("qux".to_string(), Rule::Unsupported("1".to_string()));
        StateHandler::Guarded(rules)
    }

    #[test]
    fn single_target_accepts_only_that_target() {
        let handler = StateHandler::from("bar");

        assert_eq!(resolve("bar", "foo", &handler, &[]), Resolution::Accept);
        assert_eq!(resolve("baz", "foo", &handler, &[]), Resolution::Deny);
    }

    #[test]
    fn target_set_accepts_members() {
        let handler = StateHandler::from(["bar", "baz"]);

        assert!(resolve("bar", "foo", &handler, &[]).is_accept());
        assert!(resolve("baz", "foo", &handler, &[]).is_accept());
        assert_eq!(resolve("foo", "foo", &handler, &[]), Resolution::Deny);
    }

    #[test]
    fn guarded_rules_consult_predicate() {
        let handler = guarded();

        assert!(resolve("foo", "baz", &handler, &[json!(true)]).is_accept());
        assert_eq!(resolve("foo", "baz", &handler, &[json!(false)]), Resolution::Deny);
        assert_eq!(resolve("foo", "baz", &handler, &[]), Resolution::Deny);
        assert!(resolve("bar", "baz", &handler, &[]).is_accept());
    }

    #[test]
    fn absent_guarded_target_is_denied() {
        assert_eq!(resolve("nope", "baz", &guarded(), &[]), Resolution::Deny);
    }

    #[test]
    fn never_rule_is_a_plain_denial() {
        assert_eq!(resolve("quux", "baz", &guarded(), &[]), Resolution::Deny);
    }

    #[test]
    fn unsupported_rule_yields_diagnostic() {
        match resolve("qux", "baz", &guarded(), &[]) {
            Resolution::Violation(Diagnostic::UnsupportedRule { from, to, rule }) => {
                assert_eq!(from, "baz");
                assert_eq!(to, "qux");
                assert_eq!(rule, "1");
            }
            other => panic!("expected violation, got {other:?}"),
        }
    }

    #[test]
    fn next_state_follows_verdict() {
        assert_eq!(Resolution::Accept.next_state("foo", "bar"), "bar");
        assert_eq!(Resolution::Deny.next_state("foo", "bar"), "foo");
        let violation = Resolution::Violation(Diagnostic::UnsupportedRule {
            from: "foo".into(),
            to: "bar".into(),
            rule: "null".into(),
        });
        assert_eq!(violation.next_state("foo", "bar"), "foo");
    }
}
