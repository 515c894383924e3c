//! Router assembly.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{self, admin, auth, speak, voices};
use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Routes that require a session token.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/voices", get(voices::list_voices))
        .route("/speak", post(speak::speak_handler))
}

/// Routes open without a session: health, login, and the admin reset
/// (which authenticates via its own credential in the body).
pub fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::health_check))
        .route("/auth/login", post(auth::login))
        .route("/admin/reset-usage", post(admin::reset_usage))
}

/// The complete application router with auth middleware and request
/// tracing wired in. Used by `main` and by integration tests.
pub fn create_app(state: Arc<AppState>) -> Router {
    let protected = create_api_router().layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    create_public_router()
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
