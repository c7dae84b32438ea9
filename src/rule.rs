//! The `Rule` type and the first-error-wins combinator
//!
//! A rule is a pure predicate over one field's value: it returns `None` when
//! the value passes and `Some(message)` when it does not. Rules come in two
//! flavours, and the split is visible in the type so a caller composing
//! all-sync rules can keep using them in sync-only contexts:
//!
//! - [`Rule::Sync`]: plain function, infallible;
//! - [`Rule::Async`]: returns a future, and may *fail* (as opposed to the
//!   value being invalid) with a [`RuleFailure`].
//!
//! Rules receive a [`RuleContext`] carrying the locale, the message
//! [`Catalog`], the dotted field path, and the root values object for
//! cross-field checks such as confirm-password.
//!
//! # Examples
//!
//! ```
//! use formcheck::{combine_rules, Rule};
//! use formcheck::rules::{is_numeric, required};
//!
//! // All-sync input stays sync, visible in the variant tag.
//! let combined = combine_rules(vec![required(), is_numeric()]);
//! assert!(!combined.is_async());
//! ```

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::catalog::Catalog;
use crate::error::RuleFailure;

/// Outcome of evaluating one async rule: `Ok(None)` passes, `Ok(Some(msg))`
/// records a validation message, `Err` means the rule itself failed to run.
pub type RuleOutcome = Result<Option<String>, RuleFailure>;

/// Boxed synchronous rule function.
pub type SyncRuleFn =
    Arc<dyn for<'a> Fn(&'a Value, &'a RuleContext<'a>) -> Option<String> + Send + Sync>;

/// Boxed asynchronous rule function.
pub type AsyncRuleFn = Arc<
    dyn for<'a> Fn(&'a Value, &'a RuleContext<'a>) -> BoxFuture<'a, RuleOutcome> + Send + Sync,
>;

/// Per-evaluation context handed to every rule.
///
/// Everything in here is borrowed from the validation call; rules never
/// outlive it.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Locale used for message resolution.
    pub locale: &'a str,
    /// The message catalog in effect for this call.
    pub catalog: &'a Catalog,
    /// Dotted path of the field under validation, when known.
    pub field: Option<&'a str>,
    /// The root values object, for cross-field rules.
    pub values: Option<&'a Value>,
}

impl<'a> RuleContext<'a> {
    /// Resolve a catalog message in this context's locale.
    pub fn message(&self, key: &str, replacements: &[(&str, String)]) -> String {
        self.catalog
            .message(key, replacements, Some(self.locale), None)
    }
}

/// A single validation predicate over one field's value.
#[derive(Clone)]
pub enum Rule {
    /// A synchronous rule.
    Sync(SyncRuleFn),
    /// An asynchronous rule.
    Async(AsyncRuleFn),
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Sync(_) => f.write_str("Rule::Sync(..)"),
            Rule::Async(_) => f.write_str("Rule::Async(..)"),
        }
    }
}

impl Rule {
    /// Wrap a synchronous rule function.
    ///
    /// # Examples
    ///
    /// ```
    /// use formcheck::Rule;
    ///
    /// let no_spaces = Rule::sync(|value, _ctx| match value.as_str() {
    ///     Some(s) if s.contains(' ') => Some("Must not contain spaces.".to_string()),
    ///     _ => None,
    /// });
    /// assert!(!no_spaces.is_async());
    /// ```
    pub fn sync<F>(check: F) -> Self
    where
        F: for<'a> Fn(&'a Value, &'a RuleContext<'a>) -> Option<String> + Send + Sync + 'static,
    {
        Rule::Sync(Arc::new(check))
    }

    /// Wrap an asynchronous rule function.
    ///
    /// The function returns a [`BoxFuture`]; inside it, `Err` signals the
    /// rule failed to run, not that the value is invalid.
    pub fn asynchronous<F>(check: F) -> Self
    where
        F: for<'a> Fn(&'a Value, &'a RuleContext<'a>) -> BoxFuture<'a, RuleOutcome>
            + Send
            + Sync
            + 'static,
    {
        Rule::Async(Arc::new(check))
    }

    /// Whether this rule must be awaited.
    pub fn is_async(&self) -> bool {
        matches!(self, Rule::Async(_))
    }

    /// Evaluate this rule, awaiting if necessary.
    ///
    /// Sync rules cannot fail, so their message is lifted into `Ok`.
    pub async fn evaluate<'a>(
        &'a self,
        value: &'a Value,
        ctx: &'a RuleContext<'a>,
    ) -> RuleOutcome {
        match self {
            Rule::Sync(check) => Ok(check(value, ctx)),
            Rule::Async(check) => check(value, ctx).await,
        }
    }
}

/// Compose an ordered rule list into a single rule.
///
/// Evaluation is strictly in order and stops at the first rule that returns a
/// message; later rules never run. If every input rule is sync the combined
/// rule is sync, otherwise it is async and each rule is awaited in sequence,
/// so the sync/async distinction stays visible to the caller through the
/// [`Rule`] variant.
///
/// # Examples
///
/// ```
/// use formcheck::{combine_rules, Catalog, Rule, RuleContext};
/// use formcheck::rules::{is_numeric, required};
/// use serde_json::json;
///
/// let catalog = Catalog::new();
/// let ctx = RuleContext { locale: "en", catalog: &catalog, field: None, values: None };
///
/// let combined = combine_rules(vec![required(), is_numeric()]);
/// let Rule::Sync(check) = combined else { panic!("all-sync input stays sync") };
///
/// assert_eq!(check(&json!(""), &ctx), Some("This field is required.".to_string()));
/// assert_eq!(check(&json!("abc"), &ctx), Some("Must be a number.".to_string()));
/// assert_eq!(check(&json!("42"), &ctx), None);
/// ```
pub fn combine_rules(rules: Vec<Rule>) -> Rule {
    if rules.iter().any(Rule::is_async) {
        Rule::Async(Arc::new(move |value, ctx| {
            let rules = rules.clone();
            let outcome: BoxFuture<'_, RuleOutcome> = Box::pin(async move {
                for rule in &rules {
                    if let Some(message) = rule.evaluate(value, ctx).await? {
                        return Ok(Some(message));
                    }
                }
                Ok(None)
            });
            outcome
        }))
    } else {
        let checks: Vec<SyncRuleFn> = rules
            .into_iter()
            .map(|rule| match rule {
                Rule::Sync(check) => check,
                // Guarded by the is_async scan above.
                Rule::Async(_) => unreachable!("combine_rules saw only sync rules"),
            })
            .collect();
        Rule::Sync(Arc::new(move |value, ctx| {
            checks.iter().find_map(|check| check(value, ctx))
        }))
    }
}
