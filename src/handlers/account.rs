use axum::extract::State;
use axum::response::Json;
use axum::Extension;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::db::models::{Business, UserProfile};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::store::tenant::{self, BusinessPatch, ProfilePatch};
use crate::store::users;

/// GET /me/profile
pub async fn get_profile(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>, ApiError> {
    let (profile, _) =
        tenant::ensure_profile_and_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(profile))
}

/// PUT /me/profile
pub async fn update_profile(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile =
        tenant::update_profile(&pool, user.id, user.full_name.as_deref(), patch).await?;
    Ok(Json(profile))
}

/// GET /business
pub async fn get_business(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Business>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(business))
}

/// PUT /business
pub async fn update_business(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Json(patch): Json<BusinessPatch>,
) -> Result<Json<Business>, ApiError> {
    let business =
        tenant::update_business(&pool, user.id, user.full_name.as_deref(), patch).await?;
    Ok(Json(business))
}

/// DELETE /users/me
pub async fn delete_me(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    users::delete_cascade(&pool, user.id).await?;
    tracing::info!(user_id = user.id, "account deleted");
    Ok(Json(json!({ "ok": true })))
}
