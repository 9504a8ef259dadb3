//! Partial updates: the identifier plus exactly one other field.
//!
//! The RuleSet is derived from the payload: payload keys are intersected with
//! the registry, the cardinality of the result is checked, and only then are
//! the individual field rules applied.

use serde_json::{Map, Value};

use super::error::ValidationError;
use super::rules::{FieldRule, RuleRegistry, ID_FIELD};
use super::schema::{RuleSet, ValidationOutcome};
use crate::types::Operation;

/// Number of keys an accepted update carries: the identifier and one field
const UPDATE_FIELD_COUNT: usize = 2;

/// Registry rules for the payload's keys, identifier first. Keys without a
/// rule are left out and so never reach the accepted payload.
pub fn update_rule_set(registry: &RuleRegistry, payload: &Map<String, Value>) -> RuleSet {
    let mut rules: Vec<FieldRule> = vec![registry.identifier().clone()];
    rules.extend(
        payload
            .keys()
            .filter(|key| key.as_str() != ID_FIELD)
            .filter_map(|key| registry.lookup(key))
            .cloned(),
    );
    RuleSet::from_rules(Operation::UpdateUser, rules)
}

pub fn validate_update(registry: &RuleRegistry, payload: &Map<String, Value>) -> ValidationOutcome {
    let identifier_missing = match payload.get(ID_FIELD) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    };
    if identifier_missing {
        return ValidationOutcome::rejected(ValidationError::missing(ID_FIELD));
    }

    let rule_set = update_rule_set(registry, payload);
    if rule_set.len() != UPDATE_FIELD_COUNT {
        return ValidationOutcome::rejected(ValidationError::InvalidUpdateShape);
    }

    rule_set.validate(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &str = "9d2c4a8e-1b3f-4e6a-8c7d-5f0e1a2b3c4d";

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn missing_identifier_is_a_field_error() {
        let registry = RuleRegistry::default();
        for body in [
            json!({"name": "A"}),
            json!({}),
            json!({"id": null, "name": "A"}),
            json!({"id": "", "name": "A"}),
        ] {
            let outcome = validate_update(&registry, &payload(body));
            assert_eq!(outcome, ValidationOutcome::rejected(ValidationError::missing("id")));
        }
    }

    #[test]
    fn identifier_plus_one_field_is_accepted() {
        let registry = RuleRegistry::default();
        let outcome = validate_update(&registry, &payload(json!({"id": ID, "name": "Alice"})));
        let accepted = outcome.into_result().unwrap();
        assert_eq!(accepted.len(), 2);
        assert_eq!(accepted["id"], json!(ID));
        assert_eq!(accepted["name"], json!("Alice"));
    }

    #[test]
    fn unknown_keys_are_dropped_before_counting() {
        let registry = RuleRegistry::default();
        let outcome = validate_update(
            &registry,
            &payload(json!({"id": ID, "email": "a@b.com", "role": "admin", "age": 3})),
        );
        let accepted = outcome.into_result().unwrap();
        assert_eq!(accepted.len(), 2);
        assert!(accepted.contains_key("id"));
        assert!(accepted.contains_key("email"));
    }

    #[test]
    fn two_recognized_fields_fail_the_shape_check() {
        let registry = RuleRegistry::default();
        let outcome = validate_update(
            &registry,
            &payload(json!({"id": ID, "name": "Alice", "email": "a@b.com"})),
        );
        assert_eq!(outcome, ValidationOutcome::rejected(ValidationError::InvalidUpdateShape));
    }

    #[test]
    fn shape_check_runs_before_field_rules() {
        let registry = RuleRegistry::default();
        let outcome = validate_update(
            &registry,
            &payload(json!({"id": "not-a-uuid", "name": "", "email": "bad"})),
        );
        assert_eq!(outcome, ValidationOutcome::rejected(ValidationError::InvalidUpdateShape));
    }

    #[test]
    fn only_unknown_keys_fail_the_shape_check() {
        let registry = RuleRegistry::default();
        let outcome = validate_update(&registry, &payload(json!({"id": ID, "role": "admin"})));
        assert_eq!(outcome, ValidationOutcome::rejected(ValidationError::InvalidUpdateShape));

        let outcome = validate_update(&registry, &payload(json!({"id": ID})));
        assert_eq!(outcome, ValidationOutcome::rejected(ValidationError::InvalidUpdateShape));
    }

    #[test]
    fn field_rules_apply_after_shape_check() {
        let registry = RuleRegistry::default();
        let outcome = validate_update(&registry, &payload(json!({"id": "123", "password": "short"})));
        let errors = outcome.into_result().unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::invalid("id", "must be a valid UUID"),
                ValidationError::invalid("password", "must be at least 8 characters"),
            ]
        );
    }

    #[test]
    fn rule_set_only_covers_present_fields() {
        let registry = RuleRegistry::default();
        let rule_set = update_rule_set(&registry, &payload(json!({"id": ID, "name": "A", "role": "x"})));
        assert_eq!(rule_set.fields().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(rule_set.operation(), Operation::UpdateUser);
    }

    #[test]
    fn registry_extension_widens_updatable_fields() {
        use super::super::rules::RuleKind;

        let registry = RuleRegistry::default().with_rule(FieldRule::new("nickname", RuleKind::Name));
        let outcome = validate_update(&registry, &payload(json!({"id": ID, "nickname": "Al"})));
        assert!(outcome.is_accepted());
    }
}
