//! Application state shared across handlers

mod app_state;

pub use app_state::{AppState, RateLimitSettings};
