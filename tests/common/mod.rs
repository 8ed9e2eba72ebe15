#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

/// Fresh application over a private in-memory database.
pub async fn test_app() -> Result<Router> {
    let pool = jobflow_api::db::connect("sqlite::memory:").await?;
    Ok(jobflow_api::routes::app(pool))
}

/// Drive one request through the router and decode the JSON response.
pub async fn request(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).context("response was not JSON")?
    };
    Ok((status, json))
}

/// Like [`request`], but with a URL-encoded form body.
pub async fn form_request(
    app: &Router,
    path: &str,
    form: &[(&str, &str)],
) -> Result<(StatusCode, Value)> {
    let body = form
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))?;

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = serde_json::from_slice(&bytes).context("response was not JSON")?;
    Ok((status, json))
}

/// Register a user and return their session token.
pub async fn signup(app: &Router, email: &str, full_name: Option<&str>) -> Result<String> {
    let (status, body) = request(
        app,
        "POST",
        "/auth/signup",
        None,
        Some(serde_json::json!({
            "email": email,
            "password": "hunter2",
            "full_name": full_name,
        })),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::OK, "signup failed: {} {}", status, body);

    body["token"]
        .as_str()
        .map(str::to_string)
        .context("signup response missing token")
}
