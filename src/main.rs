//! Dialtone server
//!
//! Phone-number OTP authentication with JWT sessions and a paginated user
//! directory. Startup wires Postgres (users), Redis (OTP codes and
//! rate-limit counters), the services, and the router, then serves until
//! SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use dialtone::auth::AuthService;
use dialtone::cache::{CacheStore, RedisStore};
use dialtone::config::Config;
use dialtone::db::{self, Database};
use dialtone::ratelimit::RateLimiter;
use dialtone::repository::{PostgresUserRepository, UserRepository};
use dialtone::routes;
use dialtone::state::{AppState, RateLimitSettings};
use dialtone::users::UserService;

/// Hard ceiling on request handling time.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    tracing::info!("Starting dialtone");

    let pool = db::create_pool(&config)
        .await
        .context("database connection failed")?;
    db::run_migrations(&pool)
        .await
        .context("database migration failed")?;

    tracing::info!("Connecting to Redis");
    let cache: Arc<dyn CacheStore> = Arc::new(
        RedisStore::connect(&config.redis_url)
            .await
            .context("redis connection failed")?,
    );
    tracing::info!("Redis connection established");

    let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool.clone()));

    let auth_service = Arc::new(AuthService::new(
        cache.clone(),
        users.clone(),
        config.jwt_secret.clone(),
        Duration::from_secs(config.otp_ttl_seconds),
        config.jwt_ttl_hours,
    ));
    let user_service = Arc::new(UserService::new(users));
    let limiter = RateLimiter::new(cache);

    let state = AppState::new(
        auth_service,
        user_service,
        limiter,
        RateLimitSettings::from_config(&config),
        Database::new(pool),
    );

    let app = routes::create_router(state)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(configure_cors(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn configure_cors(config: &Config) -> CorsLayer {
    let allowed_origins = config.cors_allowed_origins.clone().unwrap_or_default();

    if allowed_origins.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
