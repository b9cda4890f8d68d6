mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{
    cookie_for, delete, get, post_json, profile, seed_user, send, send_full, set_cookie,
    test_app, test_app_with_provider, ScriptedProvider,
};

#[tokio::test]
async fn missing_session_cookie_is_unauthorized() {
    let (app, _stores) = test_app();

    let (status, body) = send(&app, get("/todos", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_session_cookie_is_unauthorized() {
    let (app, _stores) = test_app();

    let (status, body) = send(&app, get("/todos", Some("token=not-a-real-token"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn valid_session_for_deleted_account_is_identity_not_found() {
    let (app, _stores) = test_app();

    // Signed cookie for a user id that was never persisted
    let cookie = cookie_for(Uuid::new_v4());
    let (status, body) = send(&app, get("/todos", Some(&cookie))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "IDENTITY_NOT_FOUND");
}

#[tokio::test]
async fn sign_in_sets_session_cookie_and_creates_user() {
    let provider =
        ScriptedProvider::default().with_profile("good-token", profile("sub-1", "ada@example.com"));
    let (app, stores) = test_app_with_provider(provider);

    let (status, headers, body) = send_full(
        &app,
        post_json("/auth/session", None, &json!({ "credential": "good-token" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], "ada@example.com");

    let cookie = set_cookie(&headers).expect("session cookie set");
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    assert_eq!(stores.users.user_count(), 1);
}

#[tokio::test]
async fn session_cookie_from_sign_in_unlocks_protected_routes() {
    let provider =
        ScriptedProvider::default().with_profile("good-token", profile("sub-1", "ada@example.com"));
    let (app, _stores) = test_app_with_provider(provider);

    let (_, headers, _) = send_full(
        &app,
        post_json("/auth/session", None, &json!({ "credential": "good-token" })),
    )
    .await;
    let cookie = set_cookie(&headers).unwrap().split(';').next().unwrap();

    let (status, body) = send(&app, get("/api/auth/whoami", Some(cookie))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ada@example.com");
}

#[tokio::test]
async fn repeated_sign_in_never_duplicates_the_user() {
    let provider =
        ScriptedProvider::default().with_profile("good-token", profile("sub-1", "ada@example.com"));
    let (app, stores) = test_app_with_provider(provider);

    for _ in 0..3 {
        let (status, _) = send(
            &app,
            post_json("/auth/session", None, &json!({ "credential": "good-token" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(stores.users.user_count(), 1);
    assert_eq!(stores.users.identity_count(), 1);
}

#[tokio::test]
async fn sign_in_by_matching_email_links_instead_of_duplicating() {
    let provider =
        ScriptedProvider::default().with_profile("new-token", profile("sub-2", "ada@example.com"));
    let (app, stores) = test_app_with_provider(provider);

    // Existing account under a different provider subject
    seed_user(&stores.users, "ada@example.com", "sub-1").await;

    let (status, _) = send(
        &app,
        post_json("/auth/session", None, &json!({ "credential": "new-token" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stores.users.user_count(), 1);
    assert_eq!(stores.users.identity_count(), 2);
}

#[tokio::test]
async fn sign_in_with_profile_missing_email_fails_and_persists_nothing() {
    let provider = ScriptedProvider::default().with_profile("no-email", profile("sub-1", ""));
    let (app, stores) = test_app_with_provider(provider);

    let (status, body) = send(
        &app,
        post_json("/auth/session", None, &json!({ "credential": "no-email" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(stores.users.user_count(), 0);
}

#[tokio::test]
async fn sign_in_with_rejected_credential_is_unauthorized() {
    let (app, stores) = test_app();

    let (status, body) = send(
        &app,
        post_json("/auth/session", None, &json!({ "credential": "bogus" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(stores.users.user_count(), 0);
}

#[tokio::test]
async fn sign_out_clears_the_session_cookie() {
    let (app, _stores) = test_app();

    let (status, headers, _) = send_full(&app, delete("/auth/session", None)).await;

    assert_eq!(status, StatusCode::OK);
    let cookie = set_cookie(&headers).expect("clearing cookie set");
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn whoami_reflects_the_resolved_identity() {
    let (app, stores) = test_app();
    let user = seed_user(&stores.users, "ada@example.com", "sub-1").await;
    let cookie = cookie_for(user.id);

    let (status, body) = send(&app, get("/api/auth/whoami", Some(&cookie))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], user.id.to_string());
    assert_eq!(body["data"]["email"], "ada@example.com");
}

#[tokio::test]
async fn health_endpoint_responds() {
    let (app, _stores) = test_app();

    let (status, body) = send(&app, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}
