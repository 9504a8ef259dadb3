pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod types;
pub mod validation;

use axum::{
    handler::Handler,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Router with every mutating user endpoint behind its validation gate
pub fn app() -> Router {
    let config = config::config();

    let router = Router::new()
        // Public
        .route("/health", get(handlers::health))
        .merge(user_routes())
        .merge(auth_routes());

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    if config.security.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

fn user_routes() -> Router {
    use middleware::{create_user_gate, find_user_gate, remove_user_gate, update_user_gate};

    Router::new().route(
        "/users",
        post(handlers::forward.layer(from_fn(create_user_gate)))
            .get(handlers::forward.layer(from_fn(find_user_gate)))
            .patch(handlers::forward.layer(from_fn(update_user_gate)))
            .delete(handlers::forward.layer(from_fn(remove_user_gate))),
    )
}

fn auth_routes() -> Router {
    Router::new().route(
        "/auth/signin",
        post(handlers::sign_in.layer(from_fn(middleware::sign_in_gate))),
    )
}
