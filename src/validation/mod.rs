pub mod error;
pub mod rules;
pub mod schema;
pub mod update;

pub use error::{RegistryError, ValidationError};
pub use rules::{registry, FieldRule, PasswordPolicy, RuleKind, RuleRegistry, ID_FIELD};
pub use schema::{validate, RuleSet, ValidationOutcome, ValidationRequest};
pub use update::{update_rule_set, validate_update};
