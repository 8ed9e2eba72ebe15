mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = common::test_app().await?;
    let (status, body) = common::request(&app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
    Ok(())
}

#[tokio::test]
async fn signup_returns_token_and_user_id() -> Result<()> {
    let app = common::test_app().await?;
    let (status, body) = common::request(
        &app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({ "email": "Pat@Example.com", "password": "hunter2", "full_name": "Pat" })),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert!(body["userId"].is_i64());
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively() -> Result<()> {
    let app = common::test_app().await?;
    common::signup(&app, "pat@example.com", Some("Pat")).await?;

    let (status, body) = common::request(
        &app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({ "email": "PAT@EXAMPLE.COM", "password": "other" })),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already in use");
    assert_eq!(body["error"], true);
    Ok(())
}

#[tokio::test]
async fn malformed_email_is_rejected() -> Result<()> {
    let app = common::test_app().await?;
    let (status, _) = common::request(
        &app,
        "POST",
        "/auth/signup",
        None,
        Some(json!({ "email": "not-an-email", "password": "hunter2" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn login_issues_token_and_rejects_bad_password() -> Result<()> {
    let app = common::test_app().await?;
    common::signup(&app, "pat@example.com", None).await?;

    let (status, body) = common::request(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "pat@example.com", "password": "hunter2" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, body) = common::request(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "pat@example.com", "password": "wrong" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
    Ok(())
}

#[tokio::test]
async fn login_accepts_mixed_case_email() -> Result<()> {
    let app = common::test_app().await?;
    common::signup(&app, "pat@example.com", None).await?;

    let (status, _) = common::request(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "Pat@Example.Com", "password": "hunter2" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn token_form_endpoint_speaks_oauth_shape() -> Result<()> {
    let app = common::test_app().await?;
    common::signup(&app, "pat@example.com", None).await?;

    let (status, body) = common::form_request(
        &app,
        "/auth/token",
        &[("username", "pat@example.com"), ("password", "hunter2")],
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());
    assert_eq!(body["token_type"], "bearer");
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_bearer_token() -> Result<()> {
    let app = common::test_app().await?;

    let (status, _) = common::request(&app, "GET", "/jobs", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = common::request(&app, "GET", "/jobs", Some("garbage"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = common::signup(&app, "pat@example.com", None).await?;
    let (status, body) = common::request(&app, "GET", "/jobs", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    Ok(())
}

#[tokio::test]
async fn token_for_deleted_user_stops_working() -> Result<()> {
    let app = common::test_app().await?;
    let token = common::signup(&app, "pat@example.com", None).await?;

    let (status, body) = common::request(&app, "DELETE", "/users/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (status, _) = common::request(&app, "GET", "/jobs", Some(&token), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
