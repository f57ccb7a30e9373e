//! Health check route

use axum::{routing::get, Router};

use crate::handlers::health::health_check;
use crate::state::AppState;

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
