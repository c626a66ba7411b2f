mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;
use uuid::Uuid;

use common::{read_json, TestApp};
use dairychain_api::auth::hash_password;
use dairychain_api::entities::{otp_code, password_reset_token};

#[tokio::test]
async fn phone_login_issues_a_usable_token() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({"phone": "+250788000101", "password": "diary-pass-123"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["user"]["role"], "diary");
    let token = body["data"]["token"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    // The token works against a protected endpoint
    let response = app
        .request_as(&token, Method::GET, "/api/v1/auth/me", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = read_json(response).await;
    assert_eq!(me["data"]["phone"], "+250788000101");

    // The password hash never appears in responses
    assert!(me["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn bad_credentials_and_missing_tokens_are_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({"phone": "+250788000101", "password": "wrong"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.request(Method::GET, "/api/v1/auth/me", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request_as("not-a-jwt", Method::GET, "/api/v1/auth/me", None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn management_routes_reject_field_roles() {
    let app = TestApp::new().await;

    // Management login only works for management accounts
    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login/management",
            Some(json!({"email": "manager@test.local", "password": "management-pass"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // A diary operator cannot create users
    let token = app.diary_token.clone();
    let response = app
        .request_as(
            &token,
            Method::POST,
            "/api/v1/users",
            Some(json!({
                "name": "Sneaky",
                "phone": "+250788999999",
                "password": "long-enough-pass",
                "role": "diary"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Management can
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/users",
            Some(json!({
                "name": "New Collector",
                "phone": "+250788999998",
                "password": "long-enough-pass",
                "role": "collector"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Duplicate phone conflicts
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/users",
            Some(json!({
                "name": "Clone",
                "phone": "+250788999998",
                "password": "long-enough-pass",
                "role": "collector"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn otp_codes_are_single_use_and_expire() {
    let app = TestApp::new().await;
    let phone = "+250788000101";

    // Seed a code with a known value, the way the service stores it
    let model = otp_code::ActiveModel {
        id: Set(Uuid::new_v4()),
        phone: Set(phone.to_string()),
        code_hash: Set(hash_password("493021").unwrap()),
        purpose: Set("login".to_string()),
        expires_at: Set(Utc::now() + Duration::minutes(5)),
        consumed: Set(false),
        created_at: Set(Utc::now()),
    };
    model.insert(&*app.state.db).await.unwrap();

    let verify = |code: &str| json!({"phone": phone, "code": code});

    let response = app
        .request(Method::POST, "/api/v1/auth/otp/verify", Some(verify("111111")))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(Method::POST, "/api/v1/auth/otp/verify", Some(verify("493021")))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Consumed: the same code does not verify twice
    let response = app
        .request(Method::POST, "/api/v1/auth/otp/verify", Some(verify("493021")))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Expired codes never verify
    let expired = otp_code::ActiveModel {
        id: Set(Uuid::new_v4()),
        phone: Set(phone.to_string()),
        code_hash: Set(hash_password("770011").unwrap()),
        purpose: Set("login".to_string()),
        expires_at: Set(Utc::now() - Duration::minutes(1)),
        consumed: Set(false),
        created_at: Set(Utc::now() - Duration::minutes(6)),
    };
    expired.insert(&*app.state.db).await.unwrap();

    let response = app
        .request(Method::POST, "/api/v1/auth/otp/verify", Some(verify("770011")))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn password_reset_consumes_the_token() {
    let app = TestApp::new().await;

    // Seed a reset token for the manager with a known secret
    let token_id = Uuid::new_v4();
    let manager_id = {
        let (users, _) = app
            .state
            .services
            .users
            .list_users(1, 10, Some(dairychain_api::models::Role::Management))
            .await
            .unwrap();
        users[0].id
    };
    let model = password_reset_token::ActiveModel {
        id: Set(token_id),
        user_id: Set(manager_id),
        token_hash: Set(hash_password("s3cr3t-reset-value").unwrap()),
        expires_at: Set(Utc::now() + Duration::minutes(30)),
        used: Set(false),
        created_at: Set(Utc::now()),
    };
    model.insert(&*app.state.db).await.unwrap();

    let token = format!("{}.s3cr3t-reset-value", token_id);

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/password-reset/confirm",
            Some(json!({"token": token, "new_password": "brand-new-pass"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Old password no longer works, the new one does
    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login/management",
            Some(json!({"email": "manager@test.local", "password": "management-pass"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login/management",
            Some(json!({"email": "manager@test.local", "password": "brand-new-pass"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The token is single use
    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/password-reset/confirm",
            Some(json!({"token": token, "new_password": "another-new-pass"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn otp_and_reset_requests_do_not_reveal_account_existence() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/otp/request",
            Some(json!({"phone": "+250788424242"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/password-reset/request",
            Some(json!({"email": "ghost@test.local"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}
