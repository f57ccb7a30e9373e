//! HTTP API Tests
//!
//! Full-router tests over tower's `oneshot`: routing, extraction, error
//! mapping, bearer auth, and the rate-limiting middleware, all running on
//! the in-memory fakes.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use dialtone::auth::AuthService;
use dialtone::cache::{otp_key, CacheStore, MemoryStore};
use dialtone::db::Database;
use dialtone::ratelimit::RateLimiter;
use dialtone::repository::{MemoryUserRepository, UserRepository};
use dialtone::routes::create_router;
use dialtone::state::{AppState, RateLimitSettings};
use dialtone::users::UserService;

const PHONE: &str = "+14155552671";
const SECRET: &str = "test-secret-at-least-32-chars-long!!";

/// Router under test plus handles to the fakes behind it.
struct TestApp {
    router: Router,
    cache: Arc<MemoryStore>,
    users: Arc<MemoryUserRepository>,
}

fn test_app() -> TestApp {
    let cache = Arc::new(MemoryStore::new());
    let users = Arc::new(MemoryUserRepository::new());

    let auth_service = Arc::new(AuthService::new(
        cache.clone(),
        users.clone(),
        SECRET.to_string(),
        Duration::from_secs(120),
        24,
    ));
    let user_service = Arc::new(UserService::new(users.clone()));
    let limiter = RateLimiter::new(cache.clone());

    let settings = RateLimitSettings {
        otp_max: 3,
        otp_window: Duration::from_secs(600),
        global_max: 10_000,
        global_window: Duration::from_secs(60),
    };

    // Nothing in these tests reaches Postgres; the pool stays lazy.
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(1))
        .connect_lazy("postgres://localhost/dialtone_test")
        .unwrap();

    let state = AppState::new(
        auth_service,
        user_service,
        limiter,
        settings,
        Database::new(pool),
    );

    TestApp {
        router: create_router(state),
        cache,
        users,
    }
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn assert_error(response: Response, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], code);
}

/// Drive the full login flow and return the token and user id.
async fn login(app: &TestApp, phone: &str) -> (String, String) {
    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/auth/request-otp", json!({ "phone": phone })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let code = app
        .cache
        .get(&otp_key(phone))
        .await
        .unwrap()
        .expect("a code should be pending after request-otp");

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/auth/verify-otp",
            json!({ "phone": phone, "code": code }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_str().unwrap().to_string(),
    )
}

// ============================================================================
// OTP Request Tests
// ============================================================================

#[tokio::test]
async fn test_request_otp_confirms_without_leaking_the_code() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/auth/request-otp", json!({ "phone": PHONE })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "otp_sent");
    assert!(
        body.get("code").is_none(),
        "the code must never appear in the response"
    );

    // It lands in the store instead.
    let code = app.cache.get(&otp_key(PHONE)).await.unwrap().unwrap();
    assert_eq!(code.len(), 6);
}

#[tokio::test]
async fn test_request_otp_rejects_malformed_phone() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/auth/request-otp",
            json!({ "phone": "12345" }),
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_INPUT").await;
}

#[tokio::test]
async fn test_request_otp_rejects_missing_or_blank_phone() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/auth/request-otp", json!({})))
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_INPUT").await;

    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/auth/request-otp", json!({ "phone": "  " })))
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_INPUT").await;
}

// ============================================================================
// Login Flow Tests
// ============================================================================

#[tokio::test]
async fn test_login_flow_end_to_end() {
    let app = test_app();

    let (token, user_id) = login(&app, PHONE).await;
    assert!(!token.is_empty());

    // The token opens the directory, which now holds the new user.
    let response = app
        .router
        .clone()
        .oneshot(get_with_bearer("/api/users", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 20);
    assert_eq!(body["items"][0]["phone"], PHONE);
    assert_eq!(body["items"][0]["id"], user_id.as_str());

    // Single lookup by the id minted during login.
    let response = app
        .router
        .clone()
        .oneshot(get_with_bearer(&format!("/api/users/{user_id}"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], user_id.as_str());
    assert_eq!(body["phone"], PHONE);
}

#[tokio::test]
async fn test_verify_without_pending_code_is_unauthorized() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/auth/verify-otp",
            json!({ "phone": PHONE, "code": "123456" }),
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_OR_EXPIRED_OTP").await;
}

#[tokio::test]
async fn test_consumed_code_cannot_be_replayed() {
    let app = test_app();

    app.router
        .clone()
        .oneshot(post_json("/api/auth/request-otp", json!({ "phone": PHONE })))
        .await
        .unwrap();
    let code = app.cache.get(&otp_key(PHONE)).await.unwrap().unwrap();

    let first = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/auth/verify-otp",
            json!({ "phone": PHONE, "code": code.as_str() }),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let replay = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/auth/verify-otp",
            json!({ "phone": PHONE, "code": code.as_str() }),
        ))
        .await
        .unwrap();
    assert_error(replay, StatusCode::UNAUTHORIZED, "INVALID_OR_EXPIRED_OTP").await;
}

#[tokio::test]
async fn test_wrong_code_leaves_pending_code_usable() {
    let app = test_app();

    app.router
        .clone()
        .oneshot(post_json("/api/auth/request-otp", json!({ "phone": PHONE })))
        .await
        .unwrap();
    let code = app.cache.get(&otp_key(PHONE)).await.unwrap().unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/auth/verify-otp",
            json!({ "phone": PHONE, "code": wrong }),
        ))
        .await
        .unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_OR_EXPIRED_OTP").await;

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/auth/verify-otp",
            json!({ "phone": PHONE, "code": code.as_str() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Bearer Auth Tests
// ============================================================================

#[tokio::test]
async fn test_directory_requires_bearer_token() {
    let app = test_app();

    let response = app.router.clone().oneshot(get("/api/users")).await.unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "MISSING_TOKEN").await;

    let response = app
        .router
        .clone()
        .oneshot(get_with_bearer("/api/users", "not-a-jwt"))
        .await
        .unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_TOKEN").await;
}

#[tokio::test]
async fn test_forged_alg_none_token_rejected() {
    let app = test_app();
    let (_, user_id) = login(&app, PHONE).await;

    // An unsigned token with otherwise plausible claims. The verifier only
    // accepts HMAC algorithms, so the declared `none` must fail outright.
    let now = chrono::Utc::now().timestamp();
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(
        json!({
            "sub": user_id,
            "phone": PHONE,
            "iat": now,
            "exp": now + 3600,
        })
        .to_string(),
    );
    let forged = format!("{header}.{claims}.");

    let response = app
        .router
        .clone()
        .oneshot(get_with_bearer("/api/users", &forged))
        .await
        .unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_TOKEN").await;
}

// ============================================================================
// Rate Limiting Tests
// ============================================================================

#[tokio::test]
async fn test_otp_requests_rate_limited_per_phone() {
    let app = test_app();

    for attempt in 1..=3 {
        let response = app
            .router
            .clone()
            .oneshot(post_json("/api/auth/request-otp", json!({ "phone": PHONE })))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::OK,
            "request {attempt} should be within the limit"
        );
    }

    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/auth/request-otp", json!({ "phone": PHONE })))
        .await
        .unwrap();
    assert_error(response, StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED").await;

    // The budget is per phone; another number is unaffected.
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/auth/request-otp",
            json!({ "phone": "+14155550002" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_counts_attempts_before_validation() {
    let app = test_app();

    // Malformed-but-present phones spend budget too: the limiter runs on
    // the raw value before the format check rejects it.
    for _ in 0..3 {
        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/api/auth/request-otp",
                json!({ "phone": "12345" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/auth/request-otp",
            json!({ "phone": "12345" }),
        ))
        .await
        .unwrap();
    assert_error(response, StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED").await;
}

// ============================================================================
// Directory Tests
// ============================================================================

#[tokio::test]
async fn test_directory_pagination_and_filter_over_http() {
    let app = test_app();

    // Seed the table directly; only the listing is under test here.
    for i in 0..3 {
        app.users
            .create(&format!("+1415555000{i}"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    let (token, _) = login(&app, PHONE).await;

    // Page 2 of size 1 is the second-newest user, which is the last of the
    // seeded three because the login created a newer one.
    let response = app
        .router
        .clone()
        .oneshot(get_with_bearer("/api/users?page=2&limit=1", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 4);
    assert_eq!(body["page"], 2);
    assert_eq!(body["limit"], 1);
    assert_eq!(body["items"][0]["phone"], "+14155550002");

    // An out-of-range limit resets to the default.
    let response = app
        .router
        .clone()
        .oneshot(get_with_bearer("/api/users?limit=150", &token))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["limit"], 20);
    assert_eq!(body["total"], 4);

    // Exact phone filter; the plus sign must be percent-encoded.
    let response = app
        .router
        .clone()
        .oneshot(get_with_bearer("/api/users?phone=%2B14155550001", &token))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["phone"], "+14155550001");
}

#[tokio::test]
async fn test_get_user_error_paths() {
    let app = test_app();
    let (token, _) = login(&app, PHONE).await;

    let response = app
        .router
        .clone()
        .oneshot(get_with_bearer("/api/users/not-a-uuid", &token))
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_INPUT").await;

    let response = app
        .router
        .clone()
        .oneshot(get_with_bearer(
            &format!("/api/users/{}", Uuid::new_v4()),
            &token,
        ))
        .await
        .unwrap();
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

// ============================================================================
// Cross-cutting Middleware Tests
// ============================================================================

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let app = test_app();

    // Even a rejected request carries the security headers.
    let response = app.router.clone().oneshot(get("/api/users")).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("content-security-policy").is_some());
}

#[tokio::test]
async fn test_health_endpoint_reports_database_state() {
    let app = test_app();

    let response = app.router.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    // No live Postgres behind the lazy test pool, so the report is
    // "unhealthy" here; the shape is what matters.
    assert!(body.get("status").is_some());
    assert!(body.get("database").is_some());
    assert!(body.get("version").is_some());
}
