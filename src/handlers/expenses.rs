use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::db::models::Expense;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::store::expenses::{self, ExpenseCreate, ExpensePatch};
use crate::store::tenant;

#[derive(Debug, Default, Deserialize)]
pub struct ExpenseListQuery {
    pub job_id: Option<i64>,
}

pub async fn list(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(expenses::list(&pool, user.id, business.id, query.job_id).await?))
}

pub async fn create(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ExpenseCreate>,
) -> Result<Json<Expense>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(expenses::create(&pool, user.id, business.id, payload).await?))
}

pub async fn update(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(patch): Json<ExpensePatch>,
) -> Result<Json<Expense>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(expenses::update(&pool, user.id, business.id, id, patch).await?))
}

pub async fn delete(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    expenses::delete(&pool, user.id, business.id, id).await?;
    Ok(Json(json!({ "ok": true })))
}
