//! Field rules shared by every gated operation.
//!
//! The registry is built once from configuration and never mutated afterwards,
//! so validators hold plain references to it and need no synchronization.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::error::ValidationError;
use crate::config;

pub const ID_FIELD: &str = "id";

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Length bounds applied to the `password` field, counted in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
        }
    }
}

/// Constraint applied to a field's value once it is known to be present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Email,
    Name,
    Password(PasswordPolicy),
    Id,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    field: &'static str,
    kind: RuleKind,
}

impl FieldRule {
    pub const fn new(field: &'static str, kind: RuleKind) -> Self {
        Self { field, kind }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Check a field as a required member of a payload. `None`, `null` and the
    /// empty string all count as missing.
    pub fn check(&self, value: Option<&Value>) -> Result<(), ValidationError> {
        let value = match value {
            None | Some(Value::Null) => return Err(ValidationError::missing(self.field)),
            Some(Value::String(s)) if s.is_empty() => {
                return Err(ValidationError::missing(self.field))
            }
            Some(Value::String(s)) => s,
            Some(_) => {
                return Err(ValidationError::invalid(self.field, "must be a `string` type"))
            }
        };

        self.check_format(value)
            .map_err(|reason| ValidationError::invalid(self.field, reason))
    }

    fn check_format(&self, value: &str) -> Result<(), String> {
        match self.kind {
            RuleKind::Email => {
                if EMAIL_REGEX.is_match(value) {
                    Ok(())
                } else {
                    Err("must be a valid email".to_string())
                }
            }
            RuleKind::Name => {
                if value.trim().is_empty() {
                    Err("must not be blank".to_string())
                } else {
                    Ok(())
                }
            }
            RuleKind::Password(policy) => {
                let len = value.chars().count();
                if len < policy.min_length {
                    Err(format!("must be at least {} characters", policy.min_length))
                } else if len > policy.max_length {
                    Err(format!("must be at most {} characters", policy.max_length))
                } else {
                    Ok(())
                }
            }
            RuleKind::Id => uuid::Uuid::try_parse(value)
                .map(|_| ())
                .map_err(|_| "must be a valid UUID".to_string()),
        }
    }
}

/// Field name to rule mapping. The identifier rule is always present.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    identifier: FieldRule,
    rules: Vec<FieldRule>,
}

impl RuleRegistry {
    /// Registry with only the identifier rule
    pub fn new() -> Self {
        Self {
            identifier: FieldRule::new(ID_FIELD, RuleKind::Id),
            rules: Vec::new(),
        }
    }

    /// The user rules: email, name, password and id
    pub fn standard(policy: PasswordPolicy) -> Self {
        Self::new()
            .with_rule(FieldRule::new("email", RuleKind::Email))
            .with_rule(FieldRule::new("name", RuleKind::Name))
            .with_rule(FieldRule::new("password", RuleKind::Password(policy)))
    }

    /// Add a rule during construction. A later rule for the same field replaces the earlier one.
    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        if rule.field == ID_FIELD {
            self.identifier = rule;
            return self;
        }
        self.rules.retain(|existing| existing.field != rule.field);
        self.rules.push(rule);
        self
    }

    pub fn lookup(&self, field: &str) -> Option<&FieldRule> {
        if field == ID_FIELD {
            return Some(&self.identifier);
        }
        self.rules.iter().find(|rule| rule.field == field)
    }

    pub fn identifier(&self) -> &FieldRule {
        &self.identifier
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.identifier.field).chain(self.rules.iter().map(|rule| rule.field))
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::standard(PasswordPolicy::default())
    }
}

// Process-wide registry - built from configuration on first use
pub static REGISTRY: Lazy<RuleRegistry> = Lazy::new(|| {
    let validation = &config::config().validation;
    RuleRegistry::standard(PasswordPolicy {
        min_length: validation.password_min_length,
        max_length: validation.password_max_length,
    })
});

pub fn registry() -> &'static RuleRegistry {
    &REGISTRY
}
