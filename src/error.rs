//! Error types for configuration mistakes and failed rule executions
//!
//! Two taxonomies live side by side and must not be conflated:
//!
//! - **Validation failures** are expected, data-driven outcomes. A rule decides
//!   a value is invalid and the engine records a [`FieldError`] leaf in the
//!   error tree. They are never surfaced through these types.
//! - **Configuration errors** ([`ConfigError`]) are programmer mistakes: the
//!   rule set references a field the values object does not have, a flat rule
//!   list is attached to an object-shaped value, an async rule is handed to a
//!   synchronous validator. These abort the validation call immediately; a
//!   partial error tree would hide the drift between rules and values.
//! - **Rule failures** ([`RuleFailure`]) are async rules that could not run to
//!   completion (a lookup service was down, say). Sequential validators
//!   propagate them; batch validators convert them into a leaf for the owning
//!   field so sibling fields are unaffected.
//!
//! [`FieldError`]: crate::tree::FieldError

use thiserror::Error;

/// A configuration mistake detected while resolving rules against values.
///
/// Configuration errors are always fatal: they are raised instead of an error
/// tree, never folded into one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The values handed to a form validator were not a JSON object.
    #[error("form values must be a JSON object, got a flat value")]
    ValuesNotObject,

    /// The rule set names fields the values object does not contain.
    ///
    /// Raised before any rule runs, so no partial error tree is produced.
    #[error("fields defined in rules but missing from form values: {}", .fields.join(", "))]
    MissingFields {
        /// The offending field names, in rule-set order.
        fields: Vec<String>,
    },

    /// A flat rule list is attached to a field whose value is an object.
    #[error(
        "mismatch: field `{field}` holds a nested object but has flat rules; \
         give it a nested rule set and validate with `{suggestion}`"
    )]
    FlatRulesOnNestedValue {
        /// Dotted path of the offending field.
        field: String,
        /// The correctly-shaped entry point to use instead.
        suggestion: &'static str,
    },

    /// A nested rule set is attached to a field whose value is flat.
    #[error(
        "mismatch: field `{field}` has a nested rule set but holds a flat value; \
         expected an object"
    )]
    NestedRulesOnFlatValue {
        /// Dotted path of the offending field.
        field: String,
    },

    /// A nested rule set was handed to a flat-only validator.
    #[error("field `{field}` has a nested rule set; validate it with `{suggestion}`")]
    NestedRulesInFlatValidator {
        /// Name of the offending field.
        field: String,
        /// The nested entry point to use instead.
        suggestion: &'static str,
    },

    /// An async rule reached a synchronous validator.
    ///
    /// The synchronous validators cannot await, and skipping the rule would
    /// silently weaken the rule chain, so this is treated as a configuration
    /// error rather than a diagnostic.
    #[error(
        "field `{field}` has an async rule; use an async validator such as \
         `validate_form_async`"
    )]
    AsyncRuleInSyncValidator {
        /// Dotted path of the offending field.
        field: String,
    },
}

/// An async rule that failed to run to completion.
///
/// Distinct from the value being invalid: a failure means the rule itself
/// could not produce a verdict. The payload is the failure message; batch
/// validators reuse it as the field's error message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RuleFailure(pub String);

/// Errors surfaced by the sequential async form validators.
///
/// Batch validators convert rule failures into per-field leaves instead, so
/// they only ever return [`ConfigError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidateError {
    /// The rules and values have drifted out of sync.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An async rule failed while validating `field`.
    #[error("rule failed for field `{field}`: {failure}")]
    Rule {
        /// Dotted path of the field whose rule failed.
        field: String,
        /// The underlying failure.
        failure: RuleFailure,
    },
}

impl ValidateError {
    /// The configuration error, if that is what this is.
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            ValidateError::Config(err) => Some(err),
            ValidateError::Rule { .. } => None,
        }
    }
}
