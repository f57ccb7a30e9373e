//! User directory routes

use axum::{routing::get, Router};

use crate::handlers::users::{get_user, list_users};
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/:id", get(get_user))
}
