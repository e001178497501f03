// SPDX-License-Identifier: Apache-2.0

use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use taskreel_api::{ApiErrorCode, RegisterRequest};
use taskreel_server::notify::{MemorySink, NotificationSink};
use taskreel_server::service;
use taskreel_server::{build_router, ApiConfig, AppState};
use taskreel_store::Store;
use tower::ServiceExt;

fn test_state(dir: &tempfile::TempDir) -> (AppState, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let config = ApiConfig {
        media_dir: dir.path().join("media"),
        ..ApiConfig::default()
    };
    let store = Store::open_in_memory().expect("in-memory store");
    let state = AppState::new(config, store, sink.clone() as Arc<dyn NotificationSink>)
        .expect("app state");
    (state, sink)
}

fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        user_name: "alice".to_string(),
        email: email.to_string(),
        password: "Str0ng!Pass".to_string(),
    }
}

#[tokio::test]
async fn register_starts_unverified_and_sends_verification_mail() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, sink) = test_state(&dir);

    let user = service::users::register(&state, register_request("alice@example.com"))
        .await
        .expect("register");
    assert!(!user.verified);
    assert_eq!(user.verification_token.len(), 40);

    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "alice@example.com");
    assert_eq!(sent[0].subject, "Verify Your Email");
    assert!(sent[0].body.contains(&user.verification_token));
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _sink) = test_state(&dir);

    service::users::register(&state, register_request("alice@example.com"))
        .await
        .expect("first register");
    let err = service::users::register(&state, register_request("alice@example.com"))
        .await
        .expect_err("duplicate email");
    assert_eq!(err.code, ApiErrorCode::Conflict);
}

#[tokio::test]
async fn weak_and_medium_passwords_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _sink) = test_state(&dir);

    for password in ["short", "abc123", "longbutlowercase"] {
        let err = service::users::register(
            &state,
            RegisterRequest {
                user_name: "bob".to_string(),
                email: "bob@example.com".to_string(),
                password: password.to_string(),
            },
        )
        .await
        .expect_err("weak password");
        assert_eq!(err.code, ApiErrorCode::ValidationFailed);
    }
}

#[tokio::test]
async fn verification_token_is_single_use() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _sink) = test_state(&dir);

    let user = service::users::register(&state, register_request("alice@example.com"))
        .await
        .expect("register");
    let token = user.verification_token.clone();

    service::users::verify_email(&state, &token)
        .await
        .expect("first redemption");
    let err = service::users::verify_email(&state, &token)
        .await
        .expect_err("replayed token");
    assert_eq!(err.code, ApiErrorCode::NotFound);

    // The empty string must never match a redeemed row.
    let err = service::users::verify_email(&state, "")
        .await
        .expect_err("empty token");
    assert_eq!(err.code, ApiErrorCode::NotFound);
}

#[tokio::test]
async fn login_is_gated_on_verification() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _sink) = test_state(&dir);

    let user = service::users::register(&state, register_request("alice@example.com"))
        .await
        .expect("register");

    let err = service::users::login(&state, "alice@example.com", "Str0ng!Pass")
        .await
        .expect_err("unverified login");
    assert_eq!(err.code, ApiErrorCode::Forbidden);

    service::users::verify_email(&state, &user.verification_token)
        .await
        .expect("verify");
    let login = service::users::login(&state, "alice@example.com", "Str0ng!Pass")
        .await
        .expect("verified login");
    assert_eq!(login.email, "alice@example.com");
    assert_eq!(login.id, user.id.as_str());

    let ctx = state.signer.verify(&login.token).expect("issued token");
    assert_eq!(ctx.user_id, user.id);
    assert_eq!(ctx.email, "alice@example.com");
}

#[tokio::test]
async fn protected_routes_reject_anything_but_a_valid_bearer_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _sink) = test_state(&dir);

    let user = service::users::register(&state, register_request("alice@example.com"))
        .await
        .expect("register");
    service::users::verify_email(&state, &user.verification_token)
        .await
        .expect("verify");
    let login = service::users::login(&state, "alice@example.com", "Str0ng!Pass")
        .await
        .expect("login");
    let app = build_router(state);

    let get_user = |auth: Option<String>| {
        let mut builder = Request::builder().uri("/user/get-user");
        if let Some(value) = auth {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).expect("request")
    };

    // Missing header, wrong scheme, empty and garbage tokens all get 401.
    for auth in [
        None,
        Some("Token abc".to_string()),
        Some("Bearer ".to_string()),
        Some("Bearer not-a-token".to_string()),
    ] {
        let resp = app.clone().oneshot(get_user(auth)).await.expect("response");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    let resp = app
        .clone()
        .oneshot(get_user(Some(format!("Bearer {}", login.token))))
        .await
        .expect("response");
    assert_eq!(resp.status(), StatusCode::OK);

    // Public routes stay reachable without a token.
    let health = Request::builder()
        .uri("/healthz")
        .body(Body::empty())
        .expect("request");
    let resp = app.oneshot(health).await.expect("response");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_email() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _sink) = test_state(&dir);

    let user = service::users::register(&state, register_request("alice@example.com"))
        .await
        .expect("register");
    service::users::verify_email(&state, &user.verification_token)
        .await
        .expect("verify");

    let err = service::users::login(&state, "alice@example.com", "Wr0ng!Pass")
        .await
        .expect_err("wrong password");
    assert_eq!(err.code, ApiErrorCode::AuthenticationFailed);

    let err = service::users::login(&state, "nobody@example.com", "Str0ng!Pass")
        .await
        .expect_err("unknown email");
    assert_eq!(err.code, ApiErrorCode::AuthenticationFailed);
}
