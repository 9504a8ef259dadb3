use axum::http::{header::AUTHORIZATION, HeaderMap};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use thiserror::Error;

/// Scheme literal accepted on the sign-in `Authorization` header
pub const BASIC_SCHEME: &str = "Basic";

/// Identity and secret decoded from a Basic authorization header
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub identity: String,
    pub secret: String,
}

// Keep secrets out of logs
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Missing Authorization header")]
    MissingCredentials,

    #[error("Unsupported authorization scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("Malformed credentials: {0}")]
    MalformedCredentials(String),
}

impl CredentialError {
    /// Missing and wrong-scheme headers are authentication failures; a
    /// correctly announced but undecodable payload is a bad request.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            CredentialError::MissingCredentials | CredentialError::UnsupportedScheme(_)
        )
    }
}

/// Read the raw `Authorization` header. A header that is not visible ASCII
/// cannot carry a Basic credential.
pub fn authorization_header(headers: &HeaderMap) -> Result<Option<&str>, CredentialError> {
    headers
        .get(AUTHORIZATION)
        .map(|value| {
            value.to_str().map_err(|_| {
                CredentialError::MalformedCredentials("Authorization header is not valid ASCII".to_string())
            })
        })
        .transpose()
}

/// Decode `Basic base64(identity:secret)`.
///
/// The decoded text is split on the first colon. Without a colon the whole
/// text becomes both identity and secret; the sign-in field rules decide
/// whether that is acceptable.
pub fn extract(header: Option<&str>) -> Result<Credential, CredentialError> {
    let header = match header {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Err(CredentialError::MissingCredentials),
    };

    let (scheme, payload) = match header.split_once(' ') {
        Some((scheme, payload)) => (scheme, Some(payload)),
        None => (header, None),
    };

    if scheme != BASIC_SCHEME {
        return Err(CredentialError::UnsupportedScheme(scheme.to_string()));
    }

    let payload = payload
        .map(str::trim)
        .filter(|payload| !payload.is_empty())
        .ok_or_else(|| CredentialError::MalformedCredentials("missing credential payload".to_string()))?;

    let bytes = BASE64
        .decode(payload)
        .map_err(|e| CredentialError::MalformedCredentials(format!("invalid base64: {}", e)))?;

    let decoded = String::from_utf8(bytes)
        .map_err(|_| CredentialError::MalformedCredentials("credentials are not valid UTF-8".to_string()))?;

    let (identity, secret) = match decoded.split_once(':') {
        Some((identity, secret)) => (identity.to_string(), secret.to_string()),
        None => (decoded.clone(), decoded),
    };

    Ok(Credential { identity, secret })
}
