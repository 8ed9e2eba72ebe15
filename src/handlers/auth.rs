use axum::extract::State;
use axum::response::Json;
use axum::Form;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::auth;
use crate::error::ApiError;
use crate::store;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// OAuth2-style password form, for clients that speak that shape.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

/// POST /auth/signup
pub async fn signup(
    State(pool): State<SqlitePool>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = payload.email.trim().to_lowercase();
    auth::validate_email_format(&email).map_err(ApiError::bad_request)?;

    if store::users::find_by_email(&pool, &email).await?.is_some() {
        return Err(ApiError::bad_request("Email already in use"));
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let user = store::users::create(&pool, &email, &password_hash, payload.full_name.as_deref())
        .await?;
    store::tenant::ensure_profile_and_business(&pool, user.id, user.full_name.as_deref()).await?;

    let token = auth::generate_token(user.id)?;
    tracing::info!(user_id = user.id, "new signup");

    Ok(Json(json!({ "token": token, "userId": user.id })))
}

/// POST /auth/login
pub async fn login(
    State(pool): State<SqlitePool>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let (token, user_id) = authenticate(&pool, &payload.email, &payload.password).await?;
    Ok(Json(json!({ "token": token, "userId": user_id })))
}

/// POST /auth/token
pub async fn token(
    State(pool): State<SqlitePool>,
    Form(form): Form<TokenForm>,
) -> Result<Json<Value>, ApiError> {
    let (token, _) = authenticate(&pool, &form.username, &form.password).await?;
    Ok(Json(json!({ "access_token": token, "token_type": "bearer" })))
}

async fn authenticate(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<(String, i64), ApiError> {
    let email = email.trim().to_lowercase();

    let user = store::users::find_by_email(pool, &email)
        .await?
        .ok_or(auth::AuthError::InvalidCredentials)?;

    if !auth::verify_password(password, &user.password_hash)? {
        return Err(auth::AuthError::InvalidCredentials.into());
    }

    store::tenant::ensure_profile_and_business(pool, user.id, user.full_name.as_deref()).await?;
    Ok((auth::generate_token(user.id)?, user.id))
}
