//! Declarative rule sets mirroring the shape of the values object
//!
//! The shape of a field's specification is decided once, when the rule set is
//! authored, as a tagged [`RuleSpec`]: either flat rules for a scalar field
//! or a nested [`RuleSet`] for an object-shaped field. Validators match on
//! the tag instead of probing shapes at runtime.
//!
//! # Examples
//!
//! ```
//! use formcheck::{FieldRules, RuleSet, ValidateOn};
//! use formcheck::rules::{email, required};
//!
//! let address = RuleSet::new().field("city", vec![required()]);
//!
//! let rules = RuleSet::new()
//!     .field_with(
//!         "email",
//!         FieldRules::new(vec![required(), email()]).with_validate_on(ValidateOn::Blur),
//!     )
//!     .nested("address", address);
//!
//! assert_eq!(rules.len(), 2);
//! ```

use std::collections::BTreeMap;

use crate::rule::Rule;

/// When external callers should trigger validation for a field.
///
/// Carried through for form-state integrations; the validation core itself
/// never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateOn {
    /// Validate on every change of the field.
    Change,
    /// Validate when the field loses focus.
    Blur,
    /// Validate only on submit.
    Submit,
}

/// The ordered rule list for one flat field, plus its trigger hint.
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    rules: Vec<Rule>,
    validate_on: Option<ValidateOn>,
}

impl FieldRules {
    /// Rules for a flat field, evaluated in order with first-error-wins.
    pub fn new(rules: Vec<Rule>) -> Self {
        FieldRules {
            rules,
            validate_on: None,
        }
    }

    /// Attach a trigger hint for external callers.
    pub fn with_validate_on(mut self, validate_on: ValidateOn) -> Self {
        self.validate_on = Some(validate_on);
        self
    }

    /// The ordered rule list.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The trigger hint, if any.
    pub fn validate_on(&self) -> Option<ValidateOn> {
        self.validate_on
    }

    /// Whether any rule in the list is async.
    pub fn has_async_rules(&self) -> bool {
        self.rules.iter().any(Rule::is_async)
    }
}

/// How one field is validated: flat rules or a nested rule set.
#[derive(Debug, Clone)]
pub enum RuleSpec {
    /// A flat field with an ordered rule list.
    Field(FieldRules),
    /// An object-shaped field with a rule set mirroring its subfields.
    Nested(RuleSet),
}

/// A mapping from field name to [`RuleSpec`].
///
/// Field names are unique; iteration order is deterministic (sorted by
/// name), which fixes the field order of the sequential validators and the
/// fold order of the batch validators.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: BTreeMap<String, RuleSpec>,
}

impl RuleSet {
    /// An empty rule set.
    pub fn new() -> Self {
        RuleSet::default()
    }

    /// Add a flat field with the given rule list.
    pub fn field(self, name: impl Into<String>, rules: Vec<Rule>) -> Self {
        self.field_with(name, FieldRules::new(rules))
    }

    /// Add a flat field with explicit [`FieldRules`].
    pub fn field_with(mut self, name: impl Into<String>, rules: FieldRules) -> Self {
        self.fields.insert(name.into(), RuleSpec::Field(rules));
        self
    }

    /// Add an object-shaped field with a nested rule set.
    pub fn nested(mut self, name: impl Into<String>, rules: RuleSet) -> Self {
        self.fields.insert(name.into(), RuleSpec::Nested(rules));
        self
    }

    /// The specification for a field, if present.
    pub fn get(&self, name: &str) -> Option<&RuleSpec> {
        self.fields.get(name)
    }

    /// Whether a field is covered by this rule set.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate field specifications in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &RuleSpec)> {
        self.fields.iter()
    }

    /// Number of fields covered.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are covered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::required;

    #[test]
    fn builder_distinguishes_flat_and_nested_fields() {
        let rules = RuleSet::new()
            .field("name", vec![required()])
            .nested("address", RuleSet::new().field("city", vec![required()]));

        assert!(matches!(rules.get("name"), Some(RuleSpec::Field(_))));
        assert!(matches!(rules.get("address"), Some(RuleSpec::Nested(_))));
        assert!(rules.get("missing").is_none());
    }

    #[test]
    fn validate_on_is_carried_for_external_callers() {
        let rules = RuleSet::new().field_with(
            "email",
            FieldRules::new(vec![required()]).with_validate_on(ValidateOn::Blur),
        );
        let Some(RuleSpec::Field(field)) = rules.get("email") else {
            panic!("expected flat field");
        };
        assert_eq!(field.validate_on(), Some(ValidateOn::Blur));
    }

    #[test]
    fn later_spec_for_same_name_replaces_earlier() {
        let rules = RuleSet::new()
            .field("x", vec![required()])
            .nested("x", RuleSet::new());
        assert_eq!(rules.len(), 1);
        assert!(matches!(rules.get("x"), Some(RuleSpec::Nested(_))));
    }
}
