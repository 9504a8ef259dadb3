use serde_json::{Map, Value};

use super::error::{RegistryError, ValidationError};
use super::rules::{FieldRule, RuleRegistry};
use crate::types::Operation;

/// Ordered field rules for one operation. Declaration order is the order
/// errors are reported in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    operation: Operation,
    rules: Vec<FieldRule>,
}

impl RuleSet {
    pub fn from_rules(operation: Operation, rules: Vec<FieldRule>) -> Self {
        Self { operation, rules }
    }

    /// Fixed RuleSet for create, lookup, remove and sign-in
    pub fn for_operation(operation: Operation, registry: &RuleRegistry) -> Result<Self, RegistryError> {
        let fields = operation
            .static_fields()
            .ok_or(RegistryError::DynamicOperation(operation))?;

        let rules = fields
            .iter()
            .map(|field| {
                registry
                    .lookup(field)
                    .cloned()
                    .ok_or_else(|| RegistryError::NotFound(field.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_rules(operation, rules))
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.field())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.rules.iter().any(|rule| rule.field() == field)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every declared field is required. All field errors are collected; keys
    /// outside the RuleSet are dropped from the accepted payload.
    pub fn validate(&self, payload: &Map<String, Value>) -> ValidationOutcome {
        let errors: Vec<ValidationError> = self
            .rules
            .iter()
            .filter_map(|rule| rule.check(payload.get(rule.field())).err())
            .collect();

        if !errors.is_empty() {
            return ValidationOutcome::Rejected { errors };
        }

        let payload = payload
            .iter()
            .filter(|(key, _)| self.contains(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        ValidationOutcome::Accepted { payload }
    }
}

/// Untyped payload taken from a request body or query string
#[derive(Debug, Clone)]
pub struct ValidationRequest {
    pub operation: Operation,
    pub payload: Map<String, Value>,
}

impl ValidationRequest {
    pub fn new(operation: Operation, payload: Map<String, Value>) -> Self {
        Self { operation, payload }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Accepted { payload: Map<String, Value> },
    Rejected { errors: Vec<ValidationError> },
}

impl ValidationOutcome {
    pub fn rejected(error: ValidationError) -> Self {
        ValidationOutcome::Rejected { errors: vec![error] }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted { .. })
    }

    pub fn into_result(self) -> Result<Map<String, Value>, Vec<ValidationError>> {
        match self {
            ValidationOutcome::Accepted { payload } => Ok(payload),
            ValidationOutcome::Rejected { errors } => Err(errors),
        }
    }
}

/// Static validation of a request against a fixed RuleSet
pub fn validate(rule_set: &RuleSet, request: &ValidationRequest) -> ValidationOutcome {
    debug_assert_eq!(rule_set.operation(), request.operation);
    rule_set.validate(&request.payload)
}
