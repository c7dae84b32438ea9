//! Form-level validation: walking a rule set across a values object
//!
//! Six entry points share the same resolution logic and differ only in
//! traversal and concurrency strategy:
//!
//! | entry point                        | rules   | nesting | concurrency            |
//! |------------------------------------|---------|---------|------------------------|
//! | [`validate_form`]                  | sync    | flat    | none                   |
//! | [`validate_nested_form`]           | sync    | deep    | none                   |
//! | [`validate_form_async`]            | any     | flat    | one field at a time    |
//! | [`validate_nested_form_async`]     | any     | deep    | one field at a time    |
//! | [`validate_form_async_batch`]      | any     | flat    | all fields overlapped  |
//! | [`validate_nested_form_async_batch`]| any    | deep    | overlapped per level   |
//!
//! Shared semantics:
//!
//! - fields named by rules but absent from values abort the call before any
//!   rule runs ([`ConfigError::MissingFields`]);
//! - fields present in values but not covered by rules produce a `tracing`
//!   warning and nothing else;
//! - a shape mismatch between a field's rules and its value is fatal in
//!   every variant, since a partial tree would mask the configuration drift;
//! - within one field, rules run in declaration order and stop at the first
//!   message, identically in every variant;
//! - the return value is `None` when no field produced an error message.
//!
//! "Batch" concurrency is cooperative: every field's rule chain is driven as
//! an overlapped future on the calling task (`join_all`), never on extra
//! threads, and results are folded in deterministic field order once all
//! have settled.

use futures::future::{join_all, BoxFuture};
use serde_json::{Map, Value};

use crate::context::ValidationContext;
use crate::error::{ConfigError, RuleFailure, ValidateError};
use crate::ruleset::{RuleSet, RuleSpec};
use crate::schema::Schema;
use crate::sequential::{validate_value, validate_value_async};
use crate::tree::{merge_errors, ErrorNode, ErrorTree};

fn object_entries(values: &Value) -> Result<&Map<String, Value>, ConfigError> {
    values.as_object().ok_or(ConfigError::ValuesNotObject)
}

fn check_missing_fields(
    entries: &Map<String, Value>,
    rules: &RuleSet,
) -> Result<(), ConfigError> {
    let fields: Vec<String> = rules
        .iter()
        .filter(|(name, _)| !entries.contains_key(*name))
        .map(|(name, _)| name.clone())
        .collect();
    if fields.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingFields { fields })
    }
}

/// Advisory pass: values carrying fields no rule covers are worth a warning,
/// but never an error entry.
fn warn_extra_fields(entries: &Map<String, Value>, rules: &RuleSet, path: &str) {
    for (name, value) in entries {
        let full = join_path(path, name);
        match rules.get(name) {
            None => tracing::warn!(field = %full, "field has no validation rules"),
            Some(RuleSpec::Nested(nested)) => {
                if let Some(object) = value.as_object() {
                    warn_extra_fields(object, nested, &full);
                }
            }
            Some(RuleSpec::Field(_)) => {}
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Validate a flat form with synchronous rules.
///
/// Async rules and nested rule sets are configuration errors here; use the
/// async or nested entry points for those.
///
/// # Examples
///
/// ```
/// use formcheck::{validate_form, RuleSet, ValidationContext};
/// use formcheck::rules::{is_numeric, required};
/// use serde_json::json;
///
/// let rules = RuleSet::new()
///     .field("email", vec![required()])
///     .field("age", vec![required(), is_numeric()]);
/// let ctx = ValidationContext::new();
///
/// let errors = validate_form(&json!({"email": "", "age": "abc"}), &rules, &ctx)
///     .unwrap()
///     .unwrap();
/// assert_eq!(errors.at_path("email").unwrap().message, "This field is required.");
/// assert_eq!(errors.at_path("age").unwrap().message, "Must be a number.");
///
/// let valid = validate_form(&json!({"email": "a@b.com", "age": "30"}), &rules, &ctx).unwrap();
/// assert!(valid.is_none());
/// ```
pub fn validate_form(
    values: &Value,
    rules: &RuleSet,
    ctx: &ValidationContext,
) -> Result<Option<ErrorTree>, ConfigError> {
    let entries = object_entries(values)?;
    check_missing_fields(entries, rules)?;

    let mut errors = ErrorTree::new();
    for (name, spec) in rules.iter() {
        let Some(value) = entries.get(name) else {
            continue;
        };
        match spec {
            RuleSpec::Field(field_rules) => {
                if value.is_object() {
                    return Err(ConfigError::FlatRulesOnNestedValue {
                        field: name.clone(),
                        suggestion: "validate_nested_form",
                    });
                }
                let rule_ctx = ctx.rule_context(Some(name.as_str()), Some(values));
                if let Some(message) = validate_value(value, field_rules.rules(), &rule_ctx)? {
                    errors.insert_leaf(name.clone(), ctx.format_error(&message));
                }
            }
            RuleSpec::Nested(_) => {
                return Err(ConfigError::NestedRulesInFlatValidator {
                    field: name.clone(),
                    suggestion: "validate_nested_form",
                })
            }
        }
    }

    warn_extra_fields(entries, rules, "");
    Ok(errors.into_option())
}

/// Validate a nested form with synchronous rules, recursing into nested rule
/// sets and producing a tree that mirrors the values shape.
pub fn validate_nested_form(
    values: &Value,
    rules: &RuleSet,
    ctx: &ValidationContext,
) -> Result<Option<ErrorTree>, ConfigError> {
    let entries = object_entries(values)?;
    let tree = validate_nested_level(entries, rules, ctx, values, String::new())?;
    warn_extra_fields(entries, rules, "");
    Ok(tree.into_option())
}

fn validate_nested_level(
    entries: &Map<String, Value>,
    rules: &RuleSet,
    ctx: &ValidationContext,
    root: &Value,
    path: String,
) -> Result<ErrorTree, ConfigError> {
    check_missing_fields(entries, rules)?;

    let mut errors = ErrorTree::new();
    for (name, spec) in rules.iter() {
        let Some(value) = entries.get(name) else {
            continue;
        };
        let full = join_path(&path, name);
        match spec {
            RuleSpec::Field(field_rules) => {
                if value.is_object() {
                    return Err(ConfigError::FlatRulesOnNestedValue {
                        field: full,
                        suggestion: "validate_nested_form",
                    });
                }
                let rule_ctx = ctx.rule_context(Some(full.as_str()), Some(root));
                if let Some(message) = validate_value(value, field_rules.rules(), &rule_ctx)? {
                    errors.insert_leaf(name.clone(), ctx.format_error(&message));
                }
            }
            RuleSpec::Nested(nested) => {
                let Some(object) = value.as_object() else {
                    return Err(ConfigError::NestedRulesOnFlatValue { field: full });
                };
                let subtree = validate_nested_level(object, nested, ctx, root, full)?;
                // Kept even when empty so dotted paths into the branch stay
                // addressable; `clean_errors_deep` strips the markers.
                errors.insert_tree(name.clone(), subtree);
            }
        }
    }
    Ok(errors)
}

/// Validate a flat form, awaiting each field's rule chain fully before the
/// next field starts.
///
/// A failing async rule aborts the call with [`ValidateError::Rule`]; use
/// [`validate_form_async_batch`] to convert failures into field errors
/// instead.
pub async fn validate_form_async(
    values: &Value,
    rules: &RuleSet,
    ctx: &ValidationContext,
) -> Result<Option<ErrorTree>, ValidateError> {
    let entries = object_entries(values)?;
    check_missing_fields(entries, rules)?;

    let mut errors = ErrorTree::new();
    for (name, spec) in rules.iter() {
        let Some(value) = entries.get(name) else {
            continue;
        };
        match spec {
            RuleSpec::Field(field_rules) => {
                if value.is_object() {
                    return Err(ConfigError::FlatRulesOnNestedValue {
                        field: name.clone(),
                        suggestion: "validate_nested_form_async",
                    }
                    .into());
                }
                let rule_ctx = ctx.rule_context(Some(name.as_str()), Some(values));
                match validate_value_async(value, field_rules.rules(), &rule_ctx).await {
                    Ok(Some(message)) => errors.insert_leaf(name.clone(), ctx.format_error(&message)),
                    Ok(None) => {}
                    Err(failure) => {
                        return Err(ValidateError::Rule {
                            field: name.clone(),
                            failure,
                        })
                    }
                }
            }
            RuleSpec::Nested(_) => {
                return Err(ConfigError::NestedRulesInFlatValidator {
                    field: name.clone(),
                    suggestion: "validate_nested_form_async",
                }
                .into())
            }
        }
    }

    warn_extra_fields(entries, rules, "");
    Ok(errors.into_option())
}

/// Validate a nested form, one field at a time, recursing into nested rule
/// sets.
pub async fn validate_nested_form_async(
    values: &Value,
    rules: &RuleSet,
    ctx: &ValidationContext,
) -> Result<Option<ErrorTree>, ValidateError> {
    let entries = object_entries(values)?;
    let tree = nested_async_level(entries, rules, ctx, values, String::new()).await?;
    warn_extra_fields(entries, rules, "");
    Ok(tree.into_option())
}

fn nested_async_level<'a>(
    entries: &'a Map<String, Value>,
    rules: &'a RuleSet,
    ctx: &'a ValidationContext,
    root: &'a Value,
    path: String,
) -> BoxFuture<'a, Result<ErrorTree, ValidateError>> {
    Box::pin(async move {
        check_missing_fields(entries, rules)?;

        let mut errors = ErrorTree::new();
        for (name, spec) in rules.iter() {
            let Some(value) = entries.get(name) else {
                continue;
            };
            let full = join_path(&path, name);
            match spec {
                RuleSpec::Field(field_rules) => {
                    if value.is_object() {
                        return Err(ConfigError::FlatRulesOnNestedValue {
                            field: full,
                            suggestion: "validate_nested_form_async",
                        }
                        .into());
                    }
                    let rule_ctx = ctx.rule_context(Some(full.as_str()), Some(root));
                    match validate_value_async(value, field_rules.rules(), &rule_ctx).await {
                        Ok(Some(message)) => {
                            errors.insert_leaf(name.clone(), ctx.format_error(&message))
                        }
                        Ok(None) => {}
                        Err(failure) => {
                            return Err(ValidateError::Rule {
                                field: full,
                                failure,
                            })
                        }
                    }
                }
                RuleSpec::Nested(nested) => {
                    let Some(object) = value.as_object() else {
                        return Err(ConfigError::NestedRulesOnFlatValue { field: full }.into());
                    };
                    let subtree = nested_async_level(object, nested, ctx, root, full).await?;
                    errors.insert_tree(name.clone(), subtree);
                }
            }
        }
        Ok(errors)
    })
}

/// Validate a flat form with every field's rule chain running concurrently.
///
/// All fields start together; within a field, rules still run in order with
/// first-error-wins. A failing rule becomes that field's error message and
/// leaves sibling fields untouched. Results are folded in field order after
/// everything settles, so the output is deterministic regardless of
/// completion timing.
pub async fn validate_form_async_batch(
    values: &Value,
    rules: &RuleSet,
    ctx: &ValidationContext,
) -> Result<Option<ErrorTree>, ConfigError> {
    let entries = object_entries(values)?;
    check_missing_fields(entries, rules)?;

    // Shape pass up front: a mismatch aborts before any rule launches.
    for (name, spec) in rules.iter() {
        match spec {
            RuleSpec::Field(_) => {
                if entries.get(name).is_some_and(Value::is_object) {
                    return Err(ConfigError::FlatRulesOnNestedValue {
                        field: name.clone(),
                        suggestion: "validate_nested_form_async_batch",
                    });
                }
            }
            RuleSpec::Nested(_) => {
                return Err(ConfigError::NestedRulesInFlatValidator {
                    field: name.clone(),
                    suggestion: "validate_nested_form_async_batch",
                })
            }
        }
    }

    let checks = rules.iter().map(|(name, spec)| async move {
        let RuleSpec::Field(field_rules) = spec else {
            return (name, None);
        };
        let Some(value) = entries.get(name) else {
            return (name, None);
        };
        let rule_ctx = ctx.rule_context(Some(name.as_str()), Some(values));
        match validate_value_async(value, field_rules.rules(), &rule_ctx).await {
            Ok(message) => (name, message),
            // Isolation: the failure is this field's problem only.
            Err(RuleFailure(message)) => (name, Some(message)),
        }
    });

    let mut errors = ErrorTree::new();
    for (name, message) in join_all(checks).await {
        if let Some(message) = message {
            errors.insert_leaf(name.clone(), ctx.format_error(&message));
        }
    }

    warn_extra_fields(entries, rules, "");
    Ok(errors.into_option())
}

/// Validate a nested form with batch concurrency at every nesting level.
///
/// Nested branches that produce no errors stay in the tree as empty
/// subtrees so dotted paths remain addressable; strip them with
/// [`clean_errors_deep`](crate::tree::clean_errors_deep) before display.
pub async fn validate_nested_form_async_batch(
    values: &Value,
    rules: &RuleSet,
    ctx: &ValidationContext,
) -> Result<Option<ErrorTree>, ConfigError> {
    let entries = object_entries(values)?;
    let tree = nested_batch_level(entries, rules, ctx, values, String::new()).await?;
    warn_extra_fields(entries, rules, "");
    Ok(tree.into_option())
}

fn nested_batch_level<'a>(
    entries: &'a Map<String, Value>,
    rules: &'a RuleSet,
    ctx: &'a ValidationContext,
    root: &'a Value,
    path: String,
) -> BoxFuture<'a, Result<ErrorTree, ConfigError>> {
    Box::pin(async move {
        check_missing_fields(entries, rules)?;

        // Shape pass for this level before launching anything.
        for (name, spec) in rules.iter() {
            let Some(value) = entries.get(name) else {
                continue;
            };
            match spec {
                RuleSpec::Field(_) if value.is_object() => {
                    return Err(ConfigError::FlatRulesOnNestedValue {
                        field: join_path(&path, name),
                        suggestion: "validate_nested_form_async_batch",
                    })
                }
                RuleSpec::Nested(_) if !value.is_object() => {
                    return Err(ConfigError::NestedRulesOnFlatValue {
                        field: join_path(&path, name),
                    })
                }
                _ => {}
            }
        }

        let checks = rules.iter().map(|(name, spec)| {
            let full = join_path(&path, name);
            async move {
                let Some(value) = entries.get(name) else {
                    return Ok((name, None));
                };
                match spec {
                    RuleSpec::Field(field_rules) => {
                        let rule_ctx = ctx.rule_context(Some(full.as_str()), Some(root));
                        let node =
                            match validate_value_async(value, field_rules.rules(), &rule_ctx).await
                            {
                                Ok(Some(message)) => {
                                    Some(ErrorNode::Leaf(ctx.format_error(&message)))
                                }
                                Ok(None) => None,
                                Err(RuleFailure(message)) => {
                                    Some(ErrorNode::Leaf(ctx.format_error(&message)))
                                }
                            };
                        Ok((name, node))
                    }
                    RuleSpec::Nested(nested) => {
                        let object = value.as_object().ok_or_else(|| {
                            ConfigError::NestedRulesOnFlatValue { field: full.clone() }
                        })?;
                        let subtree = nested_batch_level(object, nested, ctx, root, full).await?;
                        Ok((name, Some(ErrorNode::Tree(subtree))))
                    }
                }
            }
        });

        let mut errors = ErrorTree::new();
        for outcome in join_all(checks).await {
            let (name, node): (&String, Option<ErrorNode>) = outcome?;
            if let Some(node) = node {
                errors.insert(name.clone(), node);
            }
        }
        Ok(errors)
    })
}

/// Which form validator drives the rule side of a combined rule+schema call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStrategy {
    /// [`validate_form`].
    Sync,
    /// [`validate_nested_form`].
    NestedSync,
    /// [`validate_form_async`].
    Sequential,
    /// [`validate_nested_form_async`].
    NestedSequential,
    /// [`validate_form_async_batch`].
    Batch,
    /// [`validate_nested_form_async_batch`].
    NestedBatch,
}

/// Hybrid validation: inline rules and an external schema, independently
/// evaluated and merged with [`merge_errors`].
///
/// Either source may be absent; with both absent the result is `None`.
/// Neither subsystem knows about the other; a schema error supersedes a
/// rule error for the same field only when their messages differ.
pub async fn validate_form_with_schema(
    values: &Value,
    rules: Option<&RuleSet>,
    schema: Option<&Schema>,
    strategy: FormStrategy,
    ctx: &ValidationContext,
) -> Result<Option<ErrorTree>, ValidateError> {
    let rule_errors = match rules {
        None => None,
        Some(rules) => match strategy {
            FormStrategy::Sync => validate_form(values, rules, ctx)?,
            FormStrategy::NestedSync => validate_nested_form(values, rules, ctx)?,
            FormStrategy::Sequential => validate_form_async(values, rules, ctx).await?,
            FormStrategy::NestedSequential => {
                validate_nested_form_async(values, rules, ctx).await?
            }
            FormStrategy::Batch => validate_form_async_batch(values, rules, ctx).await?,
            FormStrategy::NestedBatch => {
                validate_nested_form_async_batch(values, rules, ctx).await?
            }
        },
    };

    let schema_errors = match schema {
        None => None,
        Some(schema) => schema.validate(values).await,
    };

    Ok(merge_errors(rule_errors, schema_errors))
}
