//! Normalization layer over external schema validators
//!
//! Schema libraries disagree on how they report problems: some return a
//! success/failure parse result, some collect every issue and return them as
//! an error, some do that asynchronously, some hand back a plain details
//! list. Rather than probing an opaque object for capabilities, the supported
//! conventions form a closed set: a [`Schema`] is constructed as exactly one
//! of four variants, each backed by a small trait, and every variant
//! normalizes into the same error-tree shape keyed by dotted field path.
//!
//! The core never interprets the schema itself; it only consumes issues.
//!
//! # Examples
//!
//! ```
//! use formcheck::schema::{DetailsSchema, Schema, SchemaIssue};
//! use serde_json::{json, Value};
//!
//! struct AgeSchema;
//!
//! impl DetailsSchema for AgeSchema {
//!     fn details(&self, values: &Value) -> Vec<SchemaIssue> {
//!         match values["age"].as_u64() {
//!             Some(_) => Vec::new(),
//!             None => vec![SchemaIssue::new("age", "Expected a non-negative integer.")],
//!         }
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let schema = Schema::details_based(AgeSchema);
//! let errors = schema.validate(&json!({"age": "abc"})).await.unwrap();
//! assert_eq!(errors.at_path("age").unwrap().message, "Expected a non-negative integer.");
//! assert!(schema.validate(&json!({"age": 30})).await.is_none());
//! # });
//! ```

use std::fmt;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::tree::{ErrorTree, FieldError};

/// One problem reported by a schema validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// Dotted path of the offending field (`"address.city"`).
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl SchemaIssue {
    /// Build an issue for a dotted field path.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaIssue {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of an all-at-once parse attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Whether the values conformed to the schema.
    pub success: bool,
    /// The issues found when they did not.
    pub issues: Vec<SchemaIssue>,
}

impl ParseOutcome {
    /// A conforming parse.
    pub fn success() -> Self {
        ParseOutcome {
            success: true,
            issues: Vec::new(),
        }
    }

    /// A failed parse with its issues.
    pub fn failure(issues: Vec<SchemaIssue>) -> Self {
        ParseOutcome {
            success: false,
            issues,
        }
    }
}

/// Safe-parse convention: parse everything, report success or structured
/// field errors.
pub trait ResultSchema: Send + Sync {
    /// Parse the values, never failing the call itself.
    fn safe_parse(&self, values: &Value) -> ParseOutcome;
}

/// Collect-and-fail convention, synchronous: `Err` carries every issue
/// ("abort early" disabled).
pub trait ThrowingSchema: Send + Sync {
    /// Validate the values, collecting all issues before failing.
    fn check_all(&self, values: &Value) -> Result<(), Vec<SchemaIssue>>;
}

/// Collect-and-fail convention, asynchronous.
pub trait AsyncThrowingSchema: Send + Sync {
    /// Validate the values, collecting all issues before failing.
    fn check_all<'a>(&'a self, values: &'a Value) -> BoxFuture<'a, Result<(), Vec<SchemaIssue>>>;
}

/// Details-list convention: an empty list means the values conform.
pub trait DetailsSchema: Send + Sync {
    /// Validate the values and return every issue found.
    fn details(&self, values: &Value) -> Vec<SchemaIssue>;
}

/// An external schema validator, normalized behind one of four supported
/// calling conventions.
///
/// The set is closed: a validator that fits none of the conventions cannot
/// be constructed, so the "unsupported schema" failure mode of duck-typed
/// detection cannot occur.
pub enum Schema {
    /// Safe-parse validator.
    ResultBased(Box<dyn ResultSchema>),
    /// Synchronous collect-and-fail validator.
    ThrowingSync(Box<dyn ThrowingSchema>),
    /// Asynchronous collect-and-fail validator.
    ThrowingAsync(Box<dyn AsyncThrowingSchema>),
    /// Details-list validator.
    DetailsBased(Box<dyn DetailsSchema>),
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Schema::ResultBased(_) => "ResultBased",
            Schema::ThrowingSync(_) => "ThrowingSync",
            Schema::ThrowingAsync(_) => "ThrowingAsync",
            Schema::DetailsBased(_) => "DetailsBased",
        };
        f.debug_tuple(variant).finish()
    }
}

impl Schema {
    /// Wrap a safe-parse validator.
    pub fn result_based(schema: impl ResultSchema + 'static) -> Self {
        Schema::ResultBased(Box::new(schema))
    }

    /// Wrap a synchronous collect-and-fail validator.
    pub fn throwing_sync(schema: impl ThrowingSchema + 'static) -> Self {
        Schema::ThrowingSync(Box::new(schema))
    }

    /// Wrap an asynchronous collect-and-fail validator.
    pub fn throwing_async(schema: impl AsyncThrowingSchema + 'static) -> Self {
        Schema::ThrowingAsync(Box::new(schema))
    }

    /// Wrap a details-list validator.
    pub fn details_based(schema: impl DetailsSchema + 'static) -> Self {
        Schema::DetailsBased(Box::new(schema))
    }

    /// Validate values against this schema and normalize the outcome.
    ///
    /// Returns `None` when the values conform, otherwise an error tree keyed
    /// by dotted field path. Multiple issues for the same path are joined
    /// with `", "` into one message.
    pub async fn validate(&self, values: &Value) -> Option<ErrorTree> {
        let issues = match self {
            Schema::ResultBased(schema) => {
                let outcome = schema.safe_parse(values);
                if outcome.success {
                    Vec::new()
                } else {
                    outcome.issues
                }
            }
            Schema::ThrowingSync(schema) => schema.check_all(values).err().unwrap_or_default(),
            Schema::ThrowingAsync(schema) => {
                schema.check_all(values).await.err().unwrap_or_default()
            }
            Schema::DetailsBased(schema) => schema.details(values),
        };
        normalize_issues(issues)
    }
}

/// Validate values against an external schema.
///
/// Thin named wrapper over [`Schema::validate`], matching the shape of the
/// form-validator entry points.
pub async fn validate_with_schema(schema: &Schema, values: &Value) -> Option<ErrorTree> {
    schema.validate(values).await
}

/// Fold issues into a flat tree keyed by dotted path.
fn normalize_issues(issues: Vec<SchemaIssue>) -> Option<ErrorTree> {
    if issues.is_empty() {
        return None;
    }
    let mut tree = ErrorTree::new();
    for issue in issues {
        let message = match tree.get(&issue.path).and_then(|node| node.as_leaf()) {
            Some(existing) => format!("{}, {}", existing.message, issue.message),
            None => issue.message,
        };
        tree.insert_leaf(issue.path, FieldError::new(message));
    }
    Some(tree)
}
