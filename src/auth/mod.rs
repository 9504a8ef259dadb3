pub mod credential;
pub mod identity;

pub use credential::{authorization_header, extract, Credential, CredentialError, BASIC_SCHEME};
pub use identity::{require_caller_identity, CallerIdentity};
