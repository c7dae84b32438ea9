//! Built-in rule constructors
//!
//! Every constructor returns a [`Rule`] with messages resolved through the
//! catalog in the rule's [`RuleContext`], so one rule set works across
//! locales.
//!
//! Except for [`required`] (and [`required_if`]), every rule treats `null`
//! and the empty string as "not provided" and passes them through. Presence
//! checking belongs to `required` alone; this keeps optional fields optional
//! without each rule re-deciding what "missing" means.
//!
//! # Examples
//!
//! ```
//! use formcheck::rules::{email, min_length, required};
//! use formcheck::RuleSet;
//!
//! let rules = RuleSet::new()
//!     .field("email", vec![required(), email()])
//!     .field("username", vec![required(), min_length(3)]);
//! ```

use std::sync::{Arc, OnceLock};

use chrono::{NaiveDate, NaiveDateTime};
use futures::future::BoxFuture;
use regex::Regex;
use serde_json::Value;

use crate::rule::{Rule, RuleOutcome};

/// Format accepted by [`date`]: `2024-01-31`.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format accepted by [`datetime`]: `2024-01-31T18:45`.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

static NULL_VALUE: Value = Value::Null;

/// `null` or the empty string: the value was not provided.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// JavaScript-style falsiness, used by [`required_if`] to decide "missing".
fn is_falsy_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Numeric reading of a value: numbers as-is, strings parsed after trimming.
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The value must be present: not `null` and not the empty string.
///
/// # Examples
///
/// ```
/// use formcheck::rules::required;
/// use formcheck::{Catalog, Rule, RuleContext};
/// use serde_json::json;
///
/// let catalog = Catalog::new();
/// let ctx = RuleContext { locale: "en", catalog: &catalog, field: None, values: None };
/// let Rule::Sync(check) = required() else { unreachable!() };
///
/// assert_eq!(check(&json!(""), &ctx), Some("This field is required.".to_string()));
/// assert_eq!(check(&json!("hi"), &ctx), None);
/// ```
pub fn required() -> Rule {
    Rule::sync(|value, ctx| {
        if is_empty_value(value) {
            Some(ctx.message("required", &[]))
        } else {
            None
        }
    })
}

/// The value must be present when `condition` holds over the root values.
///
/// The condition receives the whole values object, enabling cross-field
/// requirements ("company name is required when account type is business").
/// `message` overrides the default English text; unlike the catalog-backed
/// rules this one is not localized unless a message is supplied.
pub fn required_if<F>(condition: F, message: Option<String>) -> Rule
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Rule::sync(move |value, ctx| {
        let values = ctx.values.unwrap_or(&NULL_VALUE);
        if condition(values) && is_falsy_value(value) {
            Some(
                message
                    .clone()
                    .unwrap_or_else(|| "This field is required".to_string()),
            )
        } else {
            None
        }
    })
}

/// Async variant of [`required_if`] for conditions that need I/O.
pub fn required_if_async<F>(condition: F, message: Option<String>) -> Rule
where
    F: for<'a> Fn(&'a Value) -> BoxFuture<'a, bool> + Send + Sync + 'static,
{
    let condition = Arc::new(condition);
    Rule::asynchronous(move |value, ctx| {
        let condition = condition.clone();
        let message = message.clone();
        let outcome: BoxFuture<'_, RuleOutcome> = Box::pin(async move {
            let values = ctx.values.unwrap_or(&NULL_VALUE);
            if condition(values).await && is_falsy_value(value) {
                Ok(Some(
                    message.unwrap_or_else(|| "This field is required".to_string()),
                ))
            } else {
                Ok(None)
            }
        });
        outcome
    })
}

/// Strings must have at least `length` characters. Non-strings fail.
pub fn min_length(length: usize) -> Rule {
    Rule::sync(move |value, ctx| {
        if is_empty_value(value) || value.is_boolean() {
            return None;
        }
        match value.as_str() {
            Some(s) if s.chars().count() >= length => None,
            _ => Some(ctx.message("min_length", &[("min", length.to_string())])),
        }
    })
}

/// Strings must have at most `length` characters. Non-strings fail.
pub fn max_length(length: usize) -> Rule {
    Rule::sync(move |value, ctx| {
        if is_empty_value(value) || value.is_boolean() {
            return None;
        }
        match value.as_str() {
            Some(s) if s.chars().count() <= length => None,
            _ => Some(ctx.message("max_length", &[("max", length.to_string())])),
        }
    })
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("email pattern is valid")
    })
}

/// The value must look like an email address.
pub fn email() -> Rule {
    Rule::sync(|value, ctx| {
        if is_empty_value(value) || value.is_boolean() {
            return None;
        }
        match value.as_str() {
            Some(s) if email_pattern().is_match(s) => None,
            _ => Some(ctx.message("email", &[])),
        }
    })
}

/// The value must be a number or a numeric string.
///
/// Strings are trimmed before parsing, so whitespace-only input is rejected
/// rather than coerced to zero.
pub fn is_numeric() -> Rule {
    Rule::sync(|value, ctx| {
        if is_empty_value(value) {
            return None;
        }
        if value.is_boolean() || numeric_value(value).is_none() {
            Some(ctx.message("is_numeric", &[]))
        } else {
            None
        }
    })
}

/// The numeric value must be at least `min_value`. Non-numeric input fails.
pub fn min(min_value: f64) -> Rule {
    Rule::sync(move |value, ctx| {
        if is_empty_value(value) || value.is_boolean() {
            return None;
        }
        match numeric_value(value) {
            Some(n) if n >= min_value => None,
            _ => Some(ctx.message("min", &[("min", min_value.to_string())])),
        }
    })
}

/// The numeric value must be at most `max_value`. Non-numeric input fails.
pub fn max(max_value: f64) -> Rule {
    Rule::sync(move |value, ctx| {
        if is_empty_value(value) || value.is_boolean() {
            return None;
        }
        match numeric_value(value) {
            Some(n) if n <= max_value => None,
            _ => Some(ctx.message("max", &[("max", max_value.to_string())])),
        }
    })
}

/// The numeric value must be an exact multiple of `step_value`.
///
/// Whitespace-only and non-numeric input get the numeric message rather than
/// the step message, mirroring HTML number-input behaviour.
///
/// # Examples
///
/// ```
/// use formcheck::rules::step;
/// use formcheck::{Catalog, Rule, RuleContext};
/// use serde_json::json;
///
/// let catalog = Catalog::new();
/// let ctx = RuleContext { locale: "en", catalog: &catalog, field: None, values: None };
/// let Rule::Sync(check) = step(3.0) else { unreachable!() };
///
/// assert_eq!(check(&json!("9.1"), &ctx), Some("Must be a multiple of 3.".to_string()));
/// assert_eq!(check(&json!("6.0"), &ctx), None);
/// ```
pub fn step(step_value: f64) -> Rule {
    Rule::sync(move |value, ctx| {
        if is_empty_value(value) {
            return None;
        }
        if let Value::String(s) = value {
            if s.trim().is_empty() {
                return Some(ctx.message("is_numeric", &[]));
            }
        }
        if value.is_boolean() {
            return Some(ctx.message("is_numeric", &[]));
        }
        match numeric_value(value) {
            None => Some(ctx.message("is_numeric", &[])),
            Some(n) if n % step_value == 0.0 => None,
            Some(_) => Some(ctx.message("step", &[("step", step_value.to_string())])),
        }
    })
}

/// The string value must match `pattern`.
pub fn pattern(pattern: Regex) -> Rule {
    Rule::sync(move |value, ctx| {
        if is_empty_value(value) {
            return None;
        }
        match value.as_str() {
            Some(s) if pattern.is_match(s) => None,
            _ => Some(ctx.message("pattern", &[])),
        }
    })
}

fn url_pattern(require_https: bool) -> &'static Regex {
    static HTTPS_ONLY: OnceLock<Regex> = OnceLock::new();
    static ANY_SCHEME: OnceLock<Regex> = OnceLock::new();
    if require_https {
        HTTPS_ONLY.get_or_init(|| {
            Regex::new(r"^https://([\w-]+(\.[\w-]+)+)(/[\w.-]*)*(\?.*)?$")
                .expect("https url pattern is valid")
        })
    } else {
        ANY_SCHEME.get_or_init(|| {
            Regex::new(r"^(https?://)?([\w-]+(\.[\w-]+)+)(/[\w.-]*)*(\?.*)?$")
                .expect("url pattern is valid")
        })
    }
}

/// The string value must be a URL; `require_https` restricts the scheme.
pub fn url(require_https: bool) -> Rule {
    Rule::sync(move |value, ctx| {
        if is_empty_value(value) {
            return None;
        }
        match value.as_str() {
            Some(s) if url_pattern(require_https).is_match(s) => None,
            _ => Some(ctx.message("url", &[])),
        }
    })
}

/// The string value must parse as a date in [`DEFAULT_DATE_FORMAT`].
pub fn date() -> Rule {
    date_format(DEFAULT_DATE_FORMAT)
}

/// The string value must parse as a date in the given chrono format.
pub fn date_format(format: impl Into<String>) -> Rule {
    let format = format.into();
    Rule::sync(move |value, ctx| {
        if is_empty_value(value) {
            return None;
        }
        match value.as_str() {
            Some(s) if NaiveDate::parse_from_str(s, &format).is_ok() => None,
            _ => Some(ctx.message("date", &[])),
        }
    })
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([01]?[0-9]|2[0-3]):([0-5]?[0-9])$").expect("time pattern is valid")
    })
}

/// The string value must be a wall-clock time `HH:mm` (24-hour).
pub fn time() -> Rule {
    Rule::sync(|value, ctx| {
        if is_empty_value(value) {
            return None;
        }
        match value.as_str() {
            Some(s) if time_pattern().is_match(s) => None,
            _ => Some(ctx.message("time", &[])),
        }
    })
}

/// The string value must parse as a date-time in [`DEFAULT_DATETIME_FORMAT`].
pub fn datetime() -> Rule {
    datetime_format(DEFAULT_DATETIME_FORMAT)
}

/// The string value must parse as a date-time in the given chrono format.
pub fn datetime_format(format: impl Into<String>) -> Rule {
    let format = format.into();
    Rule::sync(move |value, ctx| {
        if is_empty_value(value) {
            return None;
        }
        match value.as_str() {
            Some(s) if NaiveDateTime::parse_from_str(s, &format).is_ok() => None,
            _ => Some(ctx.message("datetime", &[])),
        }
    })
}

/// The string value must be one of the allowed file types.
pub fn file(allowed_types: Vec<String>) -> Rule {
    Rule::sync(move |value, ctx| {
        if is_empty_value(value) {
            return None;
        }
        match value.as_str() {
            Some(s) if allowed_types.iter().any(|allowed| allowed == s) => None,
            _ => Some(ctx.message("file", &[])),
        }
    })
}
