// handlers/mod.rs - downstream stand-ins
//
// Persistence lives outside this service. These handlers only report what the
// gate admitted so the forwarding contract can be observed end to end.

use axum::{http::StatusCode, response::Json, Extension};
use serde_json::{json, Value};

use crate::auth::{CallerIdentity, Credential};
use crate::middleware::ValidatedPayload;

/// Echo the admitted payload, tagged with the caller when one was resolved
pub async fn forward(
    Extension(ValidatedPayload(payload)): Extension<ValidatedPayload>,
    caller: Option<Extension<CallerIdentity>>,
) -> Json<Value> {
    let caller = caller.map(|Extension(caller)| caller.user_id);
    Json(json!({
        "success": true,
        "data": payload,
        "caller": caller
    }))
}

/// Report the identity a sign-in would be checked for. The secret is never echoed.
pub async fn sign_in(Extension(credential): Extension<Credential>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": { "identity": credential.identity }
    }))
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION")
            }
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::Request,
        handler::Handler,
        http::{header::CONTENT_TYPE, Method},
        middleware::{self, Next},
        response::Response,
        routing::patch,
        Router,
    };
    use tower::ServiceExt;

    use crate::middleware::update_user_gate;

    const ID: &str = "0c9a4e1d-6b2f-4a8e-93d5-7f1e2a3b4c5d";

    async fn as_caller(mut request: Request, next: Next) -> Response {
        request.extensions_mut().insert(CallerIdentity::new("u-1"));
        next.run(request).await
    }

    fn users(with_caller: bool) -> Router {
        let router = Router::new().route(
            "/users",
            patch(forward.layer(middleware::from_fn(update_user_gate))),
        );
        if with_caller {
            router.layer(middleware::from_fn(as_caller))
        } else {
            router
        }
    }

    async fn patch_name(router: Router) -> (StatusCode, Value) {
        let request = axum::http::Request::builder()
            .method(Method::PATCH)
            .uri("/users")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"id": ID, "name": "Ada"}).to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn forward_reports_caller_installed_before_gate() {
        let (status, body) = patch_name(users(true)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["caller"], "u-1");
        assert_eq!(body["data"], json!({"id": ID, "name": "Ada"}));
    }

    #[tokio::test]
    async fn forward_without_caller_reports_null() {
        let (status, body) = patch_name(users(false)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["caller"].is_null());
    }
}
