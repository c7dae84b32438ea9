//! Sequential rule evaluation for a single value
//!
//! Both variants run the rule list strictly in declaration order and stop at
//! the first rule that produces a message. The sync variant refuses async
//! rules outright: awaiting is impossible there, and skipping the rule would
//! silently weaken the chain, so the mix is reported as a configuration
//! error pointing at the async validators.

use serde_json::Value;

use crate::error::ConfigError;
use crate::rule::{Rule, RuleContext, RuleOutcome};

/// Run a rule list synchronously against one value.
///
/// Returns the first message produced, or `Ok(None)` when every rule passes.
/// Encountering an async rule is a [`ConfigError::AsyncRuleInSyncValidator`].
///
/// # Examples
///
/// ```
/// use formcheck::{validate_value, Catalog, RuleContext};
/// use formcheck::rules::{is_numeric, required};
/// use serde_json::json;
///
/// let catalog = Catalog::new();
/// let ctx = RuleContext { locale: "en", catalog: &catalog, field: None, values: None };
/// let rules = vec![required(), is_numeric()];
///
/// let message = validate_value(&json!("abc"), &rules, &ctx).unwrap();
/// assert_eq!(message.as_deref(), Some("Must be a number."));
///
/// assert_eq!(validate_value(&json!("12"), &rules, &ctx).unwrap(), None);
/// ```
pub fn validate_value(
    value: &Value,
    rules: &[Rule],
    ctx: &RuleContext<'_>,
) -> Result<Option<String>, ConfigError> {
    for rule in rules {
        match rule {
            Rule::Sync(check) => {
                if let Some(message) = check(value, ctx) {
                    return Ok(Some(message));
                }
            }
            Rule::Async(_) => {
                return Err(ConfigError::AsyncRuleInSyncValidator {
                    field: ctx.field.unwrap_or("<value>").to_string(),
                })
            }
        }
    }
    Ok(None)
}

/// Run a rule list against one value, awaiting each rule in order.
///
/// Short-circuits on the first message. A failing rule (as opposed to an
/// invalid value) propagates as `Err`; whether that aborts the validation
/// call or becomes the field's error depends on the form validator variant.
pub async fn validate_value_async<'a>(
    value: &'a Value,
    rules: &'a [Rule],
    ctx: &'a RuleContext<'a>,
) -> RuleOutcome {
    for rule in rules {
        if let Some(message) = rule.evaluate(value, ctx).await? {
            return Ok(Some(message));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::error::RuleFailure;
    use crate::rules::{min_length, required};
    use futures::future::BoxFuture;
    use serde_json::json;

    fn ctx(catalog: &Catalog) -> RuleContext<'_> {
        RuleContext {
            locale: "en",
            catalog,
            field: Some("name"),
            values: None,
        }
    }

    fn failing_async() -> Rule {
        Rule::asynchronous(|_value, _ctx| {
            let outcome: BoxFuture<'_, RuleOutcome> =
                Box::pin(async { Err(RuleFailure("lookup unavailable".to_string())) });
            outcome
        })
    }

    #[test]
    fn sync_validator_short_circuits_in_order() {
        let catalog = Catalog::new();
        let rules = vec![required(), min_length(3)];
        let message = validate_value(&json!(""), &rules, &ctx(&catalog)).unwrap();
        assert_eq!(message.as_deref(), Some("This field is required."));
    }

    #[test]
    fn sync_validator_rejects_async_rules() {
        let catalog = Catalog::new();
        let rules = vec![required(), failing_async()];
        let err = validate_value(&json!("ok"), &rules, &ctx(&catalog)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::AsyncRuleInSyncValidator {
                field: "name".to_string()
            }
        );
    }

    #[tokio::test]
    async fn async_validator_awaits_rules_in_order() {
        let catalog = Catalog::new();
        let rules = vec![required(), min_length(5)];
        let context = ctx(&catalog);
        let message = validate_value_async(&json!("abc"), &rules, &context)
            .await
            .unwrap();
        assert_eq!(message.as_deref(), Some("Must be at least 5 characters."));
    }

    #[tokio::test]
    async fn async_validator_propagates_rule_failure() {
        let catalog = Catalog::new();
        let rules = vec![failing_async()];
        let context = ctx(&catalog);
        let err = validate_value_async(&json!("x"), &rules, &context)
            .await
            .unwrap_err();
        assert_eq!(err, RuleFailure("lookup unavailable".to_string()));
    }

    #[tokio::test]
    async fn async_validator_short_circuits_before_failing_rule() {
        let catalog = Catalog::new();
        let rules = vec![required(), failing_async()];
        let context = ctx(&catalog);
        // The required failure wins before the failing rule ever runs.
        let message = validate_value_async(&json!(""), &rules, &context)
            .await
            .unwrap();
        assert_eq!(message.as_deref(), Some("This field is required."));
    }
}
