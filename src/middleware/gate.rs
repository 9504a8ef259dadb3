//! Validation gate in front of the user endpoints.
//!
//! Every gated operation runs through [`run_gate`]: the payload is read from
//! its source, handed to a [`RequestValidator`], and either forwarded with
//! unknown keys stripped or answered with an [`ApiError`] without touching
//! the downstream handler.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{Query, Request},
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING},
        HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use crate::auth::credential::{self, Credential};
use crate::config;
use crate::error::ApiError;
use crate::types::Operation;
use crate::validation::{registry, validate, validate_update, RegistryError, RuleRegistry, RuleSet, ValidationRequest};

/// Where a gated operation takes its payload from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    Body,
    Query,
    AuthorizationHeader,
}

/// Raw material handed to a validator
#[derive(Debug, Clone, Default)]
pub struct GateInput {
    pub payload: Map<String, Value>,
    pub authorization: Option<String>,
}

/// Result of a successful gate pass
#[derive(Debug, Clone)]
pub struct Admission {
    pub payload: Map<String, Value>,
    pub credential: Option<Credential>,
}

impl Admission {
    fn payload(payload: Map<String, Value>) -> Self {
        Self {
            payload,
            credential: None,
        }
    }
}

/// Stripped payload made available to downstream handlers
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayload(pub Map<String, Value>);

#[async_trait]
pub trait RequestValidator: Send + Sync {
    fn operation(&self) -> Operation;

    fn source(&self) -> PayloadSource;

    async fn admit(&self, input: GateInput) -> Result<Admission, ApiError>;
}

/// Fixed-shape operations: create, find by id, remove
#[derive(Debug, Clone)]
pub struct StaticValidator {
    rule_set: RuleSet,
    source: PayloadSource,
}

impl StaticValidator {
    pub fn new(operation: Operation, source: PayloadSource, registry: &RuleRegistry) -> Result<Self, RegistryError> {
        Ok(Self {
            rule_set: RuleSet::for_operation(operation, registry)?,
            source,
        })
    }
}

#[async_trait]
impl RequestValidator for StaticValidator {
    fn operation(&self) -> Operation {
        self.rule_set.operation()
    }

    fn source(&self) -> PayloadSource {
        self.source
    }

    async fn admit(&self, input: GateInput) -> Result<Admission, ApiError> {
        let request = ValidationRequest::new(self.operation(), input.payload);
        let payload = validate(&self.rule_set, &request).into_result()?;
        Ok(Admission::payload(payload))
    }
}

/// Single-field partial updates; the RuleSet is rebuilt for every request
#[derive(Debug, Clone, Copy)]
pub struct UpdateValidator<'r> {
    registry: &'r RuleRegistry,
}

impl<'r> UpdateValidator<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl RequestValidator for UpdateValidator<'_> {
    fn operation(&self) -> Operation {
        Operation::UpdateUser
    }

    fn source(&self) -> PayloadSource {
        PayloadSource::Body
    }

    async fn admit(&self, input: GateInput) -> Result<Admission, ApiError> {
        let payload = validate_update(self.registry, &input.payload).into_result()?;
        Ok(Admission::payload(payload))
    }
}

/// Sign-in: credentials come from the `Authorization` header, not the body
#[derive(Debug, Clone)]
pub struct SignInValidator {
    rule_set: RuleSet,
}

impl SignInValidator {
    pub fn new(registry: &RuleRegistry) -> Result<Self, RegistryError> {
        Ok(Self {
            rule_set: RuleSet::for_operation(Operation::SignIn, registry)?,
        })
    }
}

#[async_trait]
impl RequestValidator for SignInValidator {
    fn operation(&self) -> Operation {
        Operation::SignIn
    }

    fn source(&self) -> PayloadSource {
        PayloadSource::AuthorizationHeader
    }

    async fn admit(&self, input: GateInput) -> Result<Admission, ApiError> {
        let credential = credential::extract(input.authorization.as_deref())?;

        let mut payload = Map::new();
        payload.insert("email".to_string(), Value::String(credential.identity.clone()));
        payload.insert("password".to_string(), Value::String(credential.secret.clone()));

        let request = ValidationRequest::new(Operation::SignIn, payload);
        let payload = validate(&self.rule_set, &request).into_result()?;

        Ok(Admission {
            payload,
            credential: Some(credential),
        })
    }
}

static CREATE_USER: Lazy<Result<StaticValidator, RegistryError>> =
    Lazy::new(|| StaticValidator::new(Operation::CreateUser, PayloadSource::Body, registry()));

static FIND_USER: Lazy<Result<StaticValidator, RegistryError>> =
    Lazy::new(|| StaticValidator::new(Operation::FindUserById, PayloadSource::Query, registry()));

static REMOVE_USER: Lazy<Result<StaticValidator, RegistryError>> =
    Lazy::new(|| StaticValidator::new(Operation::RemoveUser, PayloadSource::Query, registry()));

static SIGN_IN: Lazy<Result<SignInValidator, RegistryError>> = Lazy::new(|| SignInValidator::new(registry()));

pub async fn create_user_gate(request: Request, next: Next) -> Response {
    run_prebuilt(&CREATE_USER, request, next).await
}

pub async fn find_user_gate(request: Request, next: Next) -> Response {
    run_prebuilt(&FIND_USER, request, next).await
}

pub async fn remove_user_gate(request: Request, next: Next) -> Response {
    run_prebuilt(&REMOVE_USER, request, next).await
}

pub async fn update_user_gate(request: Request, next: Next) -> Response {
    run_gate(&UpdateValidator::new(registry()), request, next).await
}

pub async fn sign_in_gate(request: Request, next: Next) -> Response {
    run_prebuilt(&SIGN_IN, request, next).await
}

async fn run_prebuilt<V: RequestValidator>(
    validator: &Lazy<Result<V, RegistryError>>,
    request: Request,
    next: Next,
) -> Response {
    match &**validator {
        Ok(validator) => run_gate(validator, request, next).await,
        Err(err) => ApiError::from(err.clone()).into_response(),
    }
}

/// Admit the request through `validator`, then hand it to `next`. A rejected
/// request never reaches `next`.
pub async fn run_gate<V: RequestValidator + ?Sized>(validator: &V, request: Request, next: Next) -> Response {
    let operation = validator.operation();
    let path = request.uri().path().to_string();

    match admit_request(validator, request).await {
        Ok(request) => {
            tracing::debug!("Admitted {} request on {}", operation, path);
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!(
                "Rejected {} request on {}: {} ({} error(s))",
                operation,
                path,
                err.message(),
                err.errors().len().max(1)
            );
            if config::config().security.enable_audit_logging {
                tracing::info!(
                    target: "audit",
                    operation = %operation,
                    path = %path,
                    status = %err.status_code(),
                    "request rejected by validation gate"
                );
            }
            err.into_response()
        }
    }
}

async fn admit_request<V: RequestValidator + ?Sized>(validator: &V, request: Request) -> Result<Request, ApiError> {
    let (mut parts, body) = request.into_parts();
    let source = validator.source();

    // `body` stays `None` once it has been consumed as the payload
    let (input, body) = match source {
        PayloadSource::Body => {
            let payload = read_json_body(body).await?;
            (GateInput { payload, authorization: None }, None)
        }
        PayloadSource::Query => {
            let payload = query_payload(&parts.uri)?;
            (GateInput { payload, authorization: None }, Some(body))
        }
        PayloadSource::AuthorizationHeader => {
            let authorization = credential::authorization_header(&parts.headers)?.map(str::to_string);
            (GateInput { payload: Map::new(), authorization }, Some(body))
        }
    };

    let admission = validator.admit(input).await?;

    let body = match body {
        Some(body) => body,
        None => {
            let bytes = serde_json::to_vec(&admission.payload).map_err(|e| {
                tracing::error!("Failed to serialize admitted payload: {}", e);
                ApiError::internal_server_error("Failed to forward request")
            })?;
            parts.headers.remove(TRANSFER_ENCODING);
            parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
            parts.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Body::from(bytes)
        }
    };

    if let Some(credential) = admission.credential {
        parts.extensions.insert(credential);
    }
    parts.extensions.insert(ValidatedPayload(admission.payload));

    Ok(Request::from_parts(parts, body))
}

/// An empty body reads as an empty object so that every required field is reported
async fn read_json_body(body: Body) -> Result<Map<String, Value>, ApiError> {
    let limit = config::config().api.max_request_size_bytes;
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|_| ApiError::bad_request(format!("request body must not exceed {} bytes", limit)))?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ApiError::bad_request("request body must be a JSON object")),
    }
}

fn query_payload(uri: &axum::http::Uri) -> Result<Map<String, Value>, ApiError> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri)
        .map_err(|_| ApiError::bad_request("query string is malformed"))?;

    Ok(params
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect())
}
