use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::db::models::Invoice;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::pdf;
use crate::storage::{self, Storage};
use crate::store::invoices::{self, InvoiceCreate, InvoicePatch};
use crate::store::tenant;

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceListQuery {
    pub job_id: Option<i64>,
}

pub async fn list(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<InvoiceListQuery>,
) -> Result<Json<Vec<Invoice>>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(invoices::list(&pool, user.id, business.id, query.job_id).await?))
}

pub async fn create(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<InvoiceCreate>,
) -> Result<Json<Invoice>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(invoices::create(&pool, user.id, business.id, payload).await?))
}

pub async fn update(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(patch): Json<InvoicePatch>,
) -> Result<Json<Invoice>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    Ok(Json(invoices::update(&pool, user.id, business.id, id, patch).await?))
}

pub async fn delete(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    invoices::delete(&pool, user.id, business.id, id).await?;
    Ok(Json(json!({ "ok": true })))
}

/// POST /invoices/{id}/pdf
///
/// Renders the invoice, uploads it to object storage, and persists the
/// resulting URL on the invoice row.
pub async fn generate_pdf(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Invoice>, ApiError> {
    let business = tenant::current_business(&pool, user.id, user.full_name.as_deref()).await?;
    let invoice = invoices::get(&pool, user.id, business.id, id).await?;

    let bytes = pdf::render_invoice_pdf(&business, &invoice)?;

    let storage = Storage::from_config()?;
    let label = invoice
        .invoice_number
        .clone()
        .unwrap_or_else(|| invoice.id.to_string());
    let key = storage::invoice_pdf_key(business.id, &label);
    let pdf_url = storage.put_object(&key, "application/pdf", bytes).await?;

    let invoice = invoices::set_pdf_url(&pool, user.id, business.id, id, &pdf_url).await?;
    tracing::info!(invoice_id = id, "invoice PDF generated");
    Ok(Json(invoice))
}
