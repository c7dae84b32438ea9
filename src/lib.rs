//! # Formcheck
//!
//! Declarative field and nested-form validation with sync/async rule chains
//! and shape-preserving error trees.
//!
//! ## Philosophy
//!
//! A form's rules are data, not control flow: you describe *what* must hold
//! per field, the engine decides *how* to run it: synchronously, one field
//! at a time, or with every field's async chain overlapped. Whatever the
//! strategy, the result has the same shape as your values, and invalid data
//! is never confused with invalid configuration: the former comes back as an
//! error tree, the latter aborts the call loudly.
//!
//! ## Quick example
//!
//! ```rust
//! use formcheck::rules::{email, is_numeric, required};
//! use formcheck::{validate_form, RuleSet, ValidationContext};
//! use serde_json::json;
//!
//! let rules = RuleSet::new()
//!     .field("email", vec![required(), email()])
//!     .field("age", vec![required(), is_numeric()]);
//!
//! let values = json!({"email": "user@example.com", "age": "abc"});
//! let ctx = ValidationContext::new();
//!
//! let errors = validate_form(&values, &rules, &ctx).unwrap().unwrap();
//! assert_eq!(errors.at_path("age").unwrap().message, "Must be a number.");
//! assert!(errors.at_path("email").is_none());
//! ```
//!
//! For nested values, build a nested rule set mirroring their shape and use
//! the `nested` entry points; for async rules, the `async` and batch ones.
//! See the [`form`] module for the full matrix.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod context;
pub mod error;
pub mod form;
pub mod rule;
pub mod rules;
pub mod ruleset;
pub mod schema;
pub mod sequential;
pub mod tree;

// Re-exports
pub use catalog::Catalog;
pub use context::ValidationContext;
pub use error::{ConfigError, RuleFailure, ValidateError};
pub use form::{
    validate_form, validate_form_async, validate_form_async_batch, validate_form_with_schema,
    validate_nested_form, validate_nested_form_async, validate_nested_form_async_batch,
    FormStrategy,
};
pub use rule::{combine_rules, Rule, RuleContext, RuleOutcome};
pub use ruleset::{FieldRules, RuleSet, RuleSpec, ValidateOn};
pub use schema::{validate_with_schema, Schema, SchemaIssue};
pub use sequential::{validate_value, validate_value_async};
pub use tree::{clean_errors_deep, merge_errors, ErrorNode, ErrorTree, FieldError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catalog::Catalog;
    pub use crate::context::ValidationContext;
    pub use crate::error::{ConfigError, RuleFailure, ValidateError};
    pub use crate::form::{
        validate_form, validate_form_async, validate_form_async_batch, validate_form_with_schema,
        validate_nested_form, validate_nested_form_async, validate_nested_form_async_batch,
        FormStrategy,
    };
    pub use crate::rule::{combine_rules, Rule, RuleContext};
    pub use crate::ruleset::{FieldRules, RuleSet, RuleSpec, ValidateOn};
    pub use crate::schema::{validate_with_schema, Schema, SchemaIssue};
    pub use crate::sequential::{validate_value, validate_value_async};
    pub use crate::tree::{clean_errors_deep, merge_errors, ErrorNode, ErrorTree, FieldError};
}
