//! The context object threaded through every validation entry point
//!
//! There is no process-global state in this crate: locale, message catalog
//! and error formatting all travel inside a [`ValidationContext`] passed by
//! the caller. Two concurrent validation calls with different contexts are
//! fully isolated from each other.
//!
//! # Examples
//!
//! ```
//! use formcheck::{Catalog, ValidationContext};
//!
//! let mut catalog = Catalog::new();
//! catalog.set_locale("es");
//!
//! let ctx = ValidationContext::new().with_catalog(catalog);
//! assert_eq!(ctx.locale(), "es");
//!
//! // A per-call locale overrides the catalog default.
//! let ctx = ctx.with_locale("tr");
//! assert_eq!(ctx.locale(), "tr");
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::catalog::Catalog;
use crate::rule::RuleContext;
use crate::tree::FieldError;

type ErrorFormatter = Arc<dyn Fn(&str) -> FieldError + Send + Sync>;

/// Caller-supplied configuration for one or more validation calls.
#[derive(Clone)]
pub struct ValidationContext {
    locale: Option<String>,
    catalog: Catalog,
    format_error: ErrorFormatter,
}

impl fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("locale", &self.locale)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        ValidationContext {
            locale: None,
            catalog: Catalog::new(),
            format_error: Arc::new(|message| FieldError::new(message)),
        }
    }
}

impl ValidationContext {
    /// A context with the built-in catalog, English locale and plain-message
    /// error formatting.
    pub fn new() -> Self {
        ValidationContext::default()
    }

    /// Override the locale for calls made with this context.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Replace the message catalog.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the error formatter used to turn raw rule messages into
    /// [`FieldError`] leaves, e.g. to attach error codes.
    pub fn with_formatter<F>(mut self, format: F) -> Self
    where
        F: Fn(&str) -> FieldError + Send + Sync + 'static,
    {
        self.format_error = Arc::new(format);
        self
    }

    /// The locale in effect: the per-context override if set, otherwise the
    /// catalog's default.
    pub fn locale(&self) -> &str {
        self.locale
            .as_deref()
            .unwrap_or_else(|| self.catalog.default_locale())
    }

    /// The message catalog in effect.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Mutable access to the catalog, for installing custom translations.
    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Format a raw rule message into an error leaf.
    pub fn format_error(&self, message: &str) -> FieldError {
        (self.format_error)(message)
    }

    /// Build the per-rule context for one field evaluation.
    pub fn rule_context<'a>(
        &'a self,
        field: Option<&'a str>,
        values: Option<&'a Value>,
    ) -> RuleContext<'a> {
        RuleContext {
            locale: self.locale(),
            catalog: &self.catalog,
            field,
            values,
        }
    }
}
