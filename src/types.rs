/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Request kinds fronted by the validation gate
/// Each kind selects the RuleSet its payload is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    CreateUser,
    FindUserById,
    RemoveUser,
    UpdateUser,
    SignIn,
}

impl Operation {
    /// Field names checked for this operation, in report order.
    /// `UpdateUser` has no fixed shape; its RuleSet is assembled per request.
    pub fn static_fields(&self) -> Option<&'static [&'static str]> {
        match self {
            Operation::CreateUser => Some(&["email", "name", "password"]),
            Operation::FindUserById | Operation::RemoveUser => Some(&["id"]),
            Operation::SignIn => Some(&["email", "password"]),
            Operation::UpdateUser => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateUser => "create_user",
            Operation::FindUserById => "find_user_by_id",
            Operation::RemoveUser => "remove_user",
            Operation::UpdateUser => "update_user",
            Operation::SignIn => "sign_in",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
