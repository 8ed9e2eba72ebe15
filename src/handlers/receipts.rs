use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::db::models::Receipt;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::storage::{self, Storage};
use crate::store::receipts::{self, ReceiptCreate};
use crate::store::tenant;

#[derive(Debug, Default, Deserialize)]
pub struct ReceiptListQuery {
    pub job_id: Option<i64>,
    pub expense_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PresignRequest {
    pub filename: String,
    pub content_type: Option<String>,
}

pub async fn list(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ReceiptListQuery>,
) -> Result<Json<Vec<Receipt>>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(receipts::list(&pool, business.id, query.job_id, query.expense_id).await?))
}

/// POST /receipts/presign
///
/// Hands the client a short-lived PUT URL for direct upload; the client
/// then registers the uploaded object with POST /receipts.
pub async fn presign(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<PresignRequest>,
) -> Result<Json<Value>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;

    let storage = Storage::from_config()?;
    let key = storage::receipt_key(business.id, &payload.filename);
    let upload_url =
        storage.presign_put(&key, payload.content_type.as_deref(), chrono::Utc::now())?;
    let file_url = storage.public_url(&key);

    Ok(Json(json!({
        "key": key,
        "upload_url": upload_url,
        "file_url": file_url,
        "expires_in": storage.presign_expires_secs(),
    })))
}

pub async fn create(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ReceiptCreate>,
) -> Result<Json<Receipt>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(receipts::create(&pool, user.id, business.id, payload).await?))
}

pub async fn delete(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    receipts::delete(&pool, business.id, id).await?;
    Ok(Json(json!({ "ok": true })))
}
