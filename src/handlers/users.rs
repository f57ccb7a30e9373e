//! User directory HTTP handlers
//!
//! Both endpoints require a valid bearer session token.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::AuthenticatedUser;
use crate::error::ApiResult;
use crate::models::{ListUsersParams, User, UserPage};
use crate::state::AppState;
use crate::users::DEFAULT_PAGE_LIMIT;

/// GET /api/users - Paginated user directory
pub async fn list_users(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(params): Query<ListUsersParams>,
) -> ApiResult<Json<UserPage>> {
    let page = state
        .user_service
        .list_users(
            params.phone.as_deref().unwrap_or(""),
            params.page.unwrap_or(1),
            params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        )
        .await?;

    Ok(Json(page))
}

/// GET /api/users/:id - Fetch a single user by id
pub async fn get_user(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let user = state.user_service.get_user(&id).await?;
    Ok(Json(user))
}
