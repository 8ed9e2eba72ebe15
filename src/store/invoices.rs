use chrono::Utc;
use serde::Deserialize;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::db::models::Invoice;

use super::{job_in_scope, StoreError};

#[derive(Debug, Deserialize)]
pub struct InvoiceCreate {
    pub job_id: Option<i64>,
    pub amount: f64,
    pub status: Option<String>,
    pub note: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InvoicePatch {
    #[serde(deserialize_with = "super::double_option")]
    pub job_id: Option<Option<i64>>,
    pub amount: Option<f64>,
    pub status: Option<String>,
    #[serde(deserialize_with = "super::double_option")]
    pub note: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub due_date: Option<Option<String>>,
}

pub async fn list(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    job_id: Option<i64>,
) -> Result<Vec<Invoice>, StoreError> {
    let rows = match job_id {
        Some(job_id) => {
            sqlx::query_as::<_, Invoice>(
                "SELECT * FROM invoices
                 WHERE user_id = ? AND business_id = ? AND job_id = ?
                 ORDER BY id DESC",
            )
            .bind(user_id)
            .bind(business_id)
            .bind(job_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Invoice>(
                "SELECT * FROM invoices WHERE user_id = ? AND business_id = ? ORDER BY id DESC",
            )
            .bind(user_id)
            .bind(business_id)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}

pub async fn get(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    id: i64,
) -> Result<Invoice, StoreError> {
    sqlx::query_as::<_, Invoice>(
        "SELECT * FROM invoices WHERE id = ? AND user_id = ? AND business_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .bind(business_id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound("Invoice"))
}

/// Atomic read-modify-write of the business counter. Runs inside the same
/// transaction that inserts the invoice row, so concurrent creations for
/// one business can never hand out the same number.
async fn allocate_invoice_number(
    tx: &mut Transaction<'_, Sqlite>,
    business_id: i64,
) -> Result<String, StoreError> {
    let (prefix, next): (Option<String>, i64) = sqlx::query_as(
        "UPDATE businesses
         SET next_invoice_number = next_invoice_number + 1, updated_at = ?
         WHERE id = ?
         RETURNING invoice_prefix, next_invoice_number",
    )
    .bind(Utc::now())
    .bind(business_id)
    .fetch_one(&mut **tx)
    .await?;

    let prefix = prefix.unwrap_or_else(|| "INV-".to_string());
    Ok(format!("{}{:04}", prefix, next - 1))
}

pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    input: InvoiceCreate,
) -> Result<Invoice, StoreError> {
    if let Some(job_id) = input.job_id {
        if !job_in_scope(pool, job_id, user_id, business_id).await? {
            return Err(StoreError::ReferenceNotFound("Job"));
        }
    }

    let mut tx = pool.begin().await?;
    let invoice_number = allocate_invoice_number(&mut tx, business_id).await?;

    let result = sqlx::query(
        "INSERT INTO invoices
             (user_id, business_id, job_id, amount, note, status, invoice_number, due_date, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(business_id)
    .bind(input.job_id)
    .bind(input.amount)
    .bind(&input.note)
    .bind(input.status.as_deref().unwrap_or("unpaid"))
    .bind(&invoice_number)
    .bind(&input.due_date)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    let id = result.last_insert_rowid();
    tx.commit().await?;

    get(pool, user_id, business_id, id).await
}

/// Partial update; the invoice number is assigned at creation and never
/// touched here.
pub async fn update(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    id: i64,
    patch: InvoicePatch,
) -> Result<Invoice, StoreError> {
    let mut invoice = get(pool, user_id, business_id, id).await?;

    if let Some(job_id) = patch.job_id {
        if let Some(job_id) = job_id {
            if !job_in_scope(pool, job_id, user_id, business_id).await? {
                return Err(StoreError::ReferenceNotFound("Job"));
            }
        }
        invoice.job_id = job_id;
    }
    if let Some(amount) = patch.amount {
        invoice.amount = amount;
    }
    if let Some(status) = patch.status {
        invoice.status = Some(status);
    }
    if let Some(note) = patch.note {
        invoice.note = note;
    }
    if let Some(due_date) = patch.due_date {
        invoice.due_date = due_date;
    }

    sqlx::query(
        "UPDATE invoices SET job_id = ?, amount = ?, status = ?, note = ?, due_date = ?
         WHERE id = ? AND user_id = ? AND business_id = ?",
    )
    .bind(invoice.job_id)
    .bind(invoice.amount)
    .bind(&invoice.status)
    .bind(&invoice.note)
    .bind(&invoice.due_date)
    .bind(id)
    .bind(user_id)
    .bind(business_id)
    .execute(pool)
    .await?;

    get(pool, user_id, business_id, id).await
}

pub async fn delete(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    id: i64,
) -> Result<(), StoreError> {
    get(pool, user_id, business_id, id).await?;

    sqlx::query("DELETE FROM invoices WHERE id = ? AND user_id = ? AND business_id = ?")
        .bind(id)
        .bind(user_id)
        .bind(business_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Persist the generated document URL, overwriting any prior one.
pub async fn set_pdf_url(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    id: i64,
    pdf_url: &str,
) -> Result<Invoice, StoreError> {
    sqlx::query("UPDATE invoices SET pdf_url = ? WHERE id = ? AND user_id = ? AND business_id = ?")
        .bind(pdf_url)
        .bind(id)
        .bind(user_id)
        .bind(business_id)
        .execute(pool)
        .await?;

    get(pool, user_id, business_id, id).await
}
