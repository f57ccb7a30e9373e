//! Route definitions for the Dialtone API

mod auth;
mod health;
mod users;

pub use auth::auth_routes;
pub use health::health_routes;
pub use users::user_routes;

use axum::Router;

use crate::middleware;
use crate::state::AppState;

/// Assemble the full API router with its middleware stack.
///
/// CORS and the request timeout are layered by the binary; everything the
/// API's semantics depend on (auth, rate limits, headers, tracing) lives
/// here so tests exercise the same stack the server runs.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(auth_routes(state.clone()))
        .merge(user_routes())
        .merge(health_routes())
        .with_state(state.clone())
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::global_rate_limit,
        ))
}
