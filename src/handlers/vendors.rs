use axum::extract::{Path, State};
use axum::response::Json;
use axum::Extension;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::db::models::Vendor;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::store::tenant;
use crate::store::vendors::{self, VendorCreate, VendorPatch};

pub async fn list(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Vendor>>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(vendors::list(&pool, business.id).await?))
}

pub async fn create(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<VendorCreate>,
) -> Result<Json<Vendor>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(vendors::create(&pool, business.id, payload).await?))
}

pub async fn update(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(patch): Json<VendorPatch>,
) -> Result<Json<Vendor>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(vendors::update(&pool, business.id, id, patch).await?))
}

pub async fn delete(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    vendors::delete(&pool, business.id, id).await?;
    Ok(Json(json!({ "ok": true })))
}
