//! API integration tests.
//!
//! These tests drive the router end to end with a mock database,
//! exercising the session, gate and webhook surfaces.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use hmac::{Hmac, Mac};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use sha2::Sha256;
use std::sync::Arc;
use tower::ServiceExt;

use admarket_api::{auth_middleware, middleware::AppState, router as api_router};
use admarket_common::config::{
    AuthConfig, Config, DatabaseConfig, ServerConfig, StripeConfig,
};
use admarket_core::{
    AccountService, AdminUserService, AppealService, BookingService, MessagingService,
    ModerationService, NotificationService, PaymentService, RoleGateService, SessionService,
    hash_password,
};
use admarket_db::entities::user::{self, Role};
use admarket_db::repositories::{
    AppealRepository, BookingRepository, MessagingRepository, NotificationRepository,
    PermissionRepository, UserRepository,
};

const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Create a test configuration.
fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            url: "https://example.com".to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "test-jwt-secret-0123456789abcdef".to_string(),
            session_days: 7,
            secure_cookies: false,
        },
        stripe: StripeConfig {
            webhook_secret: WEBHOOK_SECRET.to_string(),
            webhook_tolerance_secs: 300,
        },
    }
}

/// Create a mock database connection with no seeded results.
fn create_mock_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

/// Create test app state over the given database.
fn create_test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);
    let config = create_test_config();

    let user_repo = UserRepository::new(Arc::clone(&db));
    let appeal_repo = AppealRepository::new(Arc::clone(&db));
    let booking_repo = BookingRepository::new(Arc::clone(&db));
    let messaging_repo = MessagingRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let permission_repo = PermissionRepository::new(Arc::clone(&db));

    AppState {
        account_service: AccountService::new(user_repo.clone()),
        session_service: SessionService::new(&config),
        gate_service: RoleGateService::new(user_repo.clone()),
        moderation_service: ModerationService::new(user_repo.clone()),
        appeal_service: AppealService::new(user_repo.clone(), appeal_repo),
        admin_service: AdminUserService::new(user_repo.clone(), permission_repo),
        messaging_service: MessagingService::new(messaging_repo, user_repo.clone()),
        notification_service: NotificationService::new(notification_repo),
        booking_service: BookingService::new(booking_repo.clone(), user_repo),
        payment_service: PaymentService::new(booking_repo, &config),
        secure_cookies: config.auth.secure_cookies,
        session_days: config.auth.session_days,
    }
}

/// Create the test router over the given database, with the session
/// middleware applied as the server does.
fn create_test_router(db: DatabaseConnection) -> Router {
    let state = create_test_state(db);
    api_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

fn test_user(id: &str, role: Role) -> user::Model {
    user::Model {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        email_lower: format!("{id}@example.com"),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        role,
        password_hash: hash_password("password123").unwrap(),
        is_email_verified: true,
        is_activated: true,
        is_suspended: false,
        suspension_reason: None,
        suspended_at: None,
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}

fn session_token(user: &user::Model) -> String {
    SessionService::new(&create_test_config())
        .issue(user)
        .unwrap()
}

fn sign_payload(timestamp: i64, body: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.{body}").as_bytes());
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(create_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_with_blank_credentials_returns_400() {
    let app = create_test_router(create_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"email":"","password":""}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_unknown_email_returns_401() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"email":"ghost@example.com","password":"password123"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_success_sets_session_cookie() {
    let advertiser = test_user("adv1", Role::Advertiser);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![advertiser]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"email":"adv1@example.com","password":"password123"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("auth_token="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_login_suspended_user_still_authenticates() {
    let mut advertiser = test_user("adv1", Role::Advertiser);
    advertiser.is_suspended = true;
    advertiser.suspension_reason = Some("Policy violation".to_string());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![advertiser]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"email":"adv1@example.com","password":"password123"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    // Suspension gates routes, not authentication
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_dashboard_without_session_redirects_to_login() {
    let app = create_test_router(create_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/advertiser/dashboard")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login"
    );
}

#[tokio::test]
async fn test_dashboard_suspended_user_redirects_to_suspended() {
    let mut advertiser = test_user("adv1", Role::Advertiser);
    let token = session_token(&advertiser);
    advertiser.is_suspended = true;
    advertiser.suspension_reason = Some("Policy violation".to_string());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![advertiser]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/advertiser/dashboard")
                .method("GET")
                .header(header::COOKIE, format!("auth_token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/suspended"
    );
}

#[tokio::test]
async fn test_messaging_suspended_user_redirects_to_suspended() {
    let mut advertiser = test_user("adv1", Role::Advertiser);
    let token = session_token(&advertiser);
    advertiser.is_suspended = true;
    advertiser.suspension_reason = Some("Policy violation".to_string());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![advertiser]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/messaging")
                .method("GET")
                .header(header::COOKIE, format!("auth_token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/suspended"
    );
}

#[tokio::test]
async fn test_send_message_suspended_user_redirects_to_suspended() {
    let mut publisher = test_user("pub1", Role::Publisher);
    let token = session_token(&publisher);
    publisher.is_suspended = true;
    publisher.suspension_reason = Some("Policy violation".to_string());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![publisher]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/messaging/conv1")
                .method("POST")
                .header("Content-Type", "application/json")
                .header(header::COOKIE, format!("auth_token={token}"))
                .body(Body::from(r#"{"body":"hello"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/suspended"
    );
}

#[tokio::test]
async fn test_notifications_suspended_user_redirects_to_suspended() {
    let mut advertiser = test_user("adv1", Role::Advertiser);
    let token = session_token(&advertiser);
    advertiser.is_suspended = true;
    advertiser.suspension_reason = Some("Policy violation".to_string());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![advertiser]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notifications")
                .method("GET")
                .header(header::COOKIE, format!("auth_token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/suspended"
    );
}

#[tokio::test]
async fn test_dashboard_wrong_role_redirects_to_login() {
    // Token claims advertiser, the current row says publisher
    let advertiser = test_user("u1", Role::Advertiser);
    let token = session_token(&advertiser);
    let row = test_user("u1", Role::Publisher);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/advertiser/dashboard")
                .method("GET")
                .header(header::COOKIE, format!("auth_token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login"
    );
}

#[tokio::test]
async fn test_tampered_token_is_anonymous() {
    let advertiser = test_user("adv1", Role::Advertiser);
    let mut token = session_token(&advertiser);
    token.push('x');

    let app = create_test_router(create_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/advertiser/dashboard")
                .method("GET")
                .header(header::COOKIE, format!("auth_token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Verification failure leaves the request anonymous
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login"
    );
}

#[tokio::test]
async fn test_appeal_without_session_returns_401() {
    let app = create_test_router(create_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/appeals")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"message":"Please reconsider"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_appeal_not_suspended_returns_400() {
    let advertiser = test_user("adv1", Role::Advertiser);
    let token = session_token(&advertiser);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![advertiser]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/appeals")
                .method("POST")
                .header("Content-Type", "application/json")
                .header(header::COOKIE, format!("auth_token={token}"))
                .body(Body::from(r#"{"message":"Please reconsider"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "NOT_SUSPENDED");
}

#[tokio::test]
async fn test_appeal_while_suspended_succeeds() {
    let mut advertiser = test_user("adv1", Role::Advertiser);
    let token = session_token(&advertiser);
    advertiser.is_suspended = true;
    advertiser.suspension_reason = Some("Policy violation".to_string());

    let appeal = admarket_db::entities::appeal::Model {
        id: "ap1".to_string(),
        user_id: "adv1".to_string(),
        user_role: Role::Advertiser,
        suspension_reason: "Policy violation".to_string(),
        message: "Please reconsider".to_string(),
        created_at: chrono::Utc::now().into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![advertiser]])
        .append_query_results([vec![appeal]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/appeals")
                .method("POST")
                .header("Content-Type", "application/json")
                .header(header::COOKIE, format!("auth_token={token}"))
                .body(Body::from(r#"{"message":"Please reconsider"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["ok"], true);
}

#[tokio::test]
async fn test_suspension_check_for_other_user_returns_403() {
    let advertiser = test_user("adv1", Role::Advertiser);
    let token = session_token(&advertiser);

    let app = create_test_router(create_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/account/suspension?userId=someone-else")
                .method("GET")
                .header(header::COOKIE, format!("auth_token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_suspension_check_while_suspended_returns_state() {
    let mut advertiser = test_user("adv1", Role::Advertiser);
    let token = session_token(&advertiser);
    advertiser.is_suspended = true;
    advertiser.suspension_reason = Some("Policy violation".to_string());

    // One read for the gate, one for the state itself
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![advertiser.clone()], vec![advertiser]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/account/suspension?userId=adv1")
                .method("GET")
                .header(header::COOKIE, format!("auth_token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["isSuspended"], true);
    assert_eq!(json["data"]["suspensionReason"], "Policy violation");
}

#[tokio::test]
async fn test_suspension_check_not_suspended_redirects_to_dashboard() {
    let advertiser = test_user("adv1", Role::Advertiser);
    let token = session_token(&advertiser);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![advertiser]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/account/suspension?userId=adv1")
                .method("GET")
                .header(header::COOKIE, format!("auth_token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/advertiser/dashboard"
    );
}

#[tokio::test]
async fn test_webhook_missing_signature_returns_400() {
    let app = create_test_router(create_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/webhooks/stripe")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"type":"checkout.session.completed"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_bad_signature_returns_400() {
    let app = create_test_router(create_mock_db());

    let body = r#"{"type":"checkout.session.completed"}"#;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/webhooks/stripe")
                .method("POST")
                .header("Content-Type", "application/json")
                .header("Stripe-Signature", "t=0,v1=deadbeef")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_valid_signature_unknown_event_returns_200() {
    let app = create_test_router(create_mock_db());

    let body = r#"{"type":"customer.created","data":{"object":{}}}"#;
    let signature = sign_payload(chrono::Utc::now().timestamp(), body);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/webhooks/stripe")
                .method("POST")
                .header("Content-Type", "application/json")
                .header("Stripe-Signature", signature)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_notifications_without_session_returns_401() {
    let app = create_test_router(create_mock_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/notifications")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
