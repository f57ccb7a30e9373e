//! Dialtone library
//!
//! Phone-number OTP authentication with JWT sessions and a paginated user
//! directory. Users live in Postgres; OTP codes and rate-limit counters
//! live in the cache store (Redis in production, in-memory in tests).

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod ratelimit;
pub mod repository;
pub mod routes;
pub mod state;
pub mod users;
