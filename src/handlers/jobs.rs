use axum::extract::{Path, State};
use axum::response::Json;
use axum::Extension;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::db::models::Job;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::store::jobs::{self, JobCreate, JobPatch};
use crate::store::tenant;

pub async fn list(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Job>>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(jobs::list(&pool, user.id, business.id).await?))
}

pub async fn create(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<JobCreate>,
) -> Result<Json<Job>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(jobs::create(&pool, user.id, business.id, payload).await?))
}

pub async fn update(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(patch): Json<JobPatch>,
) -> Result<Json<Job>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(jobs::update(&pool, user.id, business.id, id, patch).await?))
}

pub async fn delete(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    jobs::delete(&pool, user.id, business.id, id).await?;
    Ok(Json(json!({ "ok": true })))
}
