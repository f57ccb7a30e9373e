//! User directory models for Dialtone

use serde::{Deserialize, Serialize};

use super::User;

/// Query parameters for the user directory listing
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersParams {
    /// Exact-match phone filter; absent or empty matches everyone
    pub phone: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// One page of the user directory
#[derive(Debug, Serialize, Deserialize)]
pub struct UserPage {
    pub items: Vec<User>,
    /// Size of the full matching set, independent of the page window
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}
