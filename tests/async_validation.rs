//! Integration tests for the async sequential and batch form validators

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use formcheck::rules::{is_numeric, required};
use formcheck::{
    clean_errors_deep, validate_form_async, validate_form_async_batch, validate_nested_form_async,
    validate_nested_form_async_batch, ConfigError, Rule, RuleFailure, RuleOutcome, RuleSet,
    ValidateError, ValidationContext,
};
use futures::future::BoxFuture;
use serde_json::json;

fn ctx() -> ValidationContext {
    ValidationContext::new()
}

/// An async rule that sleeps, then fails validation with `message`.
fn slow_failure(delay: Duration, message: &'static str) -> Rule {
    Rule::asynchronous(move |_value, _ctx| {
        let outcome: BoxFuture<'_, RuleOutcome> = Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(Some(message.to_string()))
        });
        outcome
    })
}

/// An async rule that sleeps, then passes.
fn slow_pass(delay: Duration) -> Rule {
    Rule::asynchronous(move |_value, _ctx| {
        let outcome: BoxFuture<'_, RuleOutcome> = Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(None)
        });
        outcome
    })
}

/// An async rule whose execution itself fails.
fn broken_rule(message: &'static str) -> Rule {
    Rule::asynchronous(move |_value, _ctx| {
        let outcome: BoxFuture<'_, RuleOutcome> =
            Box::pin(async move { Err(RuleFailure(message.to_string())) });
        outcome
    })
}

/// A sync rule that counts how often it ran.
fn counting_pass(calls: Arc<AtomicUsize>) -> Rule {
    Rule::sync(move |_value, _ctx| {
        calls.fetch_add(1, Ordering::SeqCst);
        None
    })
}

#[tokio::test]
async fn sequential_async_mixes_sync_and_async_rules() {
    let rules = RuleSet::new()
        .field("email", vec![required(), slow_pass(Duration::from_millis(5))])
        .field("age", vec![required(), is_numeric()]);
    let values = json!({"email": "a@b.com", "age": "abc"});

    let errors = validate_form_async(&values, &rules, &ctx())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.at_path("age").unwrap().message, "Must be a number.");
}

#[tokio::test]
async fn sequential_async_propagates_rule_failures() {
    let rules = RuleSet::new().field("username", vec![broken_rule("directory offline")]);
    let values = json!({"username": "ada"});

    let err = validate_form_async(&values, &rules, &ctx()).await.unwrap_err();
    assert_eq!(
        err,
        ValidateError::Rule {
            field: "username".to_string(),
            failure: RuleFailure("directory offline".to_string()),
        }
    );
}

#[tokio::test]
async fn sequential_async_rejects_nested_rule_sets() {
    let rules = RuleSet::new().nested("user", RuleSet::new().field("name", vec![required()]));
    let values = json!({"user": {"name": "x"}});

    let err = validate_form_async(&values, &rules, &ctx()).await.unwrap_err();
    assert_eq!(
        err.as_config(),
        Some(&ConfigError::NestedRulesInFlatValidator {
            field: "user".to_string(),
            suggestion: "validate_nested_form_async",
        })
    );
}

#[tokio::test]
async fn batch_isolates_a_failing_field_from_its_siblings() {
    let calls = Arc::new(AtomicUsize::new(0));
    let rules = RuleSet::new()
        .field("a", vec![broken_rule("rule blew up")])
        .field("b", vec![counting_pass(calls.clone())]);
    let values = json!({"a": "x", "b": "y"});

    let errors = validate_form_async_batch(&values, &rules, &ctx())
        .await
        .unwrap()
        .unwrap();
    // The failure became field `a`'s error message...
    assert_eq!(errors.at_path("a").unwrap().message, "rule blew up");
    // ...while `b` ran normally and stayed clean.
    assert!(errors.get("b").is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn batch_overlaps_fields_instead_of_summing_their_latencies() {
    let rules = RuleSet::new()
        .field("a", vec![slow_failure(Duration::from_millis(300), "a failed")])
        .field("b", vec![slow_failure(Duration::from_millis(500), "b failed")])
        .field("c", vec![slow_failure(Duration::from_millis(800), "c failed")]);
    let values = json!({"a": 1, "b": 2, "c": 3});

    let started = tokio::time::Instant::now();
    let errors = validate_form_async_batch(&values, &rules, &ctx())
        .await
        .unwrap()
        .unwrap();
    let elapsed = started.elapsed();

    // Wall time tracks the slowest field, not the sum.
    assert!(elapsed >= Duration::from_millis(800), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1600), "elapsed {elapsed:?}");

    assert_eq!(errors.len(), 3);
    assert_eq!(errors.at_path("a").unwrap().message, "a failed");
    assert_eq!(errors.at_path("b").unwrap().message, "b failed");
    assert_eq!(errors.at_path("c").unwrap().message, "c failed");
}

#[tokio::test(start_paused = true)]
async fn sequential_async_runs_fields_one_after_another() {
    let rules = RuleSet::new()
        .field("a", vec![slow_pass(Duration::from_millis(300))])
        .field("b", vec![slow_pass(Duration::from_millis(500))]);
    let values = json!({"a": 1, "b": 2});

    let started = tokio::time::Instant::now();
    assert!(validate_form_async(&values, &rules, &ctx())
        .await
        .unwrap()
        .is_none());
    assert!(started.elapsed() >= Duration::from_millis(800));
}

#[tokio::test]
async fn batch_shape_mismatch_aborts_before_any_rule_runs() {
    let calls = Arc::new(AtomicUsize::new(0));
    let rules = RuleSet::new()
        .field("clean", vec![counting_pass(calls.clone())])
        .field("broken", vec![required()]);
    let values = json!({"clean": "x", "broken": {"oops": true}});

    let err = validate_form_async_batch(&values, &rules, &ctx())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::FlatRulesOnNestedValue { ref field, .. } if field == "broken"
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn nested_sequential_builds_a_mirrored_tree() {
    let address = RuleSet::new()
        .field("city", vec![required()])
        .field("zip", vec![required(), slow_pass(Duration::from_millis(1))]);
    let rules = RuleSet::new()
        .field("name", vec![required()])
        .nested("address", address);
    let values = json!({"name": "", "address": {"city": "", "zip": "12345"}});

    let errors = validate_nested_form_async(&values, &rules, &ctx())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        errors.at_path("name").unwrap().message,
        "This field is required."
    );
    assert_eq!(
        errors.at_path("address.city").unwrap().message,
        "This field is required."
    );
    assert!(errors.at_path("address.zip").is_none());
}

#[tokio::test]
async fn nested_sequential_names_the_full_path_on_failure() {
    let rules = RuleSet::new().nested(
        "account",
        RuleSet::new().field("email", vec![broken_rule("smtp probe failed")]),
    );
    let values = json!({"account": {"email": "a@b.com"}});

    let err = validate_nested_form_async(&values, &rules, &ctx())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ValidateError::Rule {
            field: "account.email".to_string(),
            failure: RuleFailure("smtp probe failed".to_string()),
        }
    );
}

#[tokio::test]
async fn nested_batch_preserves_clean_branch_markers() {
    let rules = RuleSet::new()
        .nested("billing", RuleSet::new().field("iban", vec![required()]))
        .nested("shipping", RuleSet::new().field("city", vec![required()]));
    let values = json!({
        "billing": {"iban": ""},
        "shipping": {"city": "Porto"}
    });

    let errors = validate_nested_form_async_batch(&values, &rules, &ctx())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        errors.at_path("billing.iban").unwrap().message,
        "This field is required."
    );
    // The clean branch is structurally present for path lookups...
    assert!(errors.get("shipping").is_some());
    // ...until a display-side clean.
    let cleaned = clean_errors_deep(&errors).unwrap();
    assert!(cleaned.get("shipping").is_none());
}

#[tokio::test]
async fn nested_batch_returns_none_when_everything_passes() {
    let rules = RuleSet::new().nested(
        "user",
        RuleSet::new().field("email", vec![required(), slow_pass(Duration::from_millis(1))]),
    );
    let values = json!({"user": {"email": "a@b.com"}});

    assert!(validate_nested_form_async_batch(&values, &rules, &ctx())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn nested_batch_isolates_failures_per_branch() {
    let rules = RuleSet::new().nested(
        "user",
        RuleSet::new()
            .field("email", vec![broken_rule("mx lookup failed")])
            .field("name", vec![required()]),
    );
    let values = json!({"user": {"email": "a@b.com", "name": "Ada"}});

    let errors = validate_nested_form_async_batch(&values, &rules, &ctx())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        errors.at_path("user.email").unwrap().message,
        "mx lookup failed"
    );
    assert!(errors.at_path("user.name").is_none());
}

#[tokio::test]
async fn nested_batch_shape_mismatch_is_fatal() {
    let rules = RuleSet::new().nested(
        "user",
        RuleSet::new().nested("address", RuleSet::new().field("city", vec![required()])),
    );
    let values = json!({"user": {"address": "not an object"}});

    let err = validate_nested_form_async_batch(&values, &rules, &ctx())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::NestedRulesOnFlatValue {
            field: "user.address".to_string()
        }
    );
}
