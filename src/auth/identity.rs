use axum::{extract::Request, middleware::Next, response::Response};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Caller resolved by an earlier authentication step.
///
/// Carried as a typed request extension so downstream handlers take it as an
/// explicit `Extension<CallerIdentity>` argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub user_id: String,
}

impl CallerIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Reject requests that reach a protected route without a caller identity.
/// Only presence is checked; there is no role policy here.
pub async fn require_caller_identity(request: Request, next: Next) -> Result<Response, ApiError> {
    if request.extensions().get::<CallerIdentity>().is_none() {
        tracing::warn!("Rejected {} {}: no caller identity", request.method(), request.uri().path());
        return Err(ApiError::unauthorized("authentication required"));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    async fn whoami(Extension(caller): Extension<CallerIdentity>) -> String {
        caller.user_id
    }

    fn router() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn(require_caller_identity))
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let response = router()
            .oneshot(axum::http::Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn present_identity_passes_through() {
        let mut request = axum::http::Request::builder().uri("/whoami").body(Body::empty()).unwrap();
        request.extensions_mut().insert(CallerIdentity::new("user-1"));

        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"user-1");
    }
}
