use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::models::Receipt;

use super::{expense_in_scope, job_in_scope, vendor_in_scope, StoreError};

#[derive(Debug, Deserialize)]
pub struct ReceiptCreate {
    pub key: Option<String>,
    pub file_url: String,
    pub content_type: Option<String>,
    pub original_filename: Option<String>,
    pub size_bytes: Option<i64>,
    pub job_id: Option<i64>,
    pub expense_id: Option<i64>,
    pub vendor_id: Option<i64>,
}

pub async fn list(
    pool: &SqlitePool,
    business_id: i64,
    job_id: Option<i64>,
    expense_id: Option<i64>,
) -> Result<Vec<Receipt>, StoreError> {
    let mut sql = String::from("SELECT * FROM receipts WHERE business_id = ?");
    if job_id.is_some() {
        sql.push_str(" AND job_id = ?");
    }
    if expense_id.is_some() {
        sql.push_str(" AND expense_id = ?");
    }
    sql.push_str(" ORDER BY id DESC");

    let mut query = sqlx::query_as::<_, Receipt>(&sql).bind(business_id);
    if let Some(job_id) = job_id {
        query = query.bind(job_id);
    }
    if let Some(expense_id) = expense_id {
        query = query.bind(expense_id);
    }

    Ok(query.fetch_all(pool).await?)
}

pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    input: ReceiptCreate,
) -> Result<Receipt, StoreError> {
    if let Some(job_id) = input.job_id {
        if !job_in_scope(pool, job_id, user_id, business_id).await? {
            return Err(StoreError::ReferenceNotFound("Job"));
        }
    }
    if let Some(expense_id) = input.expense_id {
        if !expense_in_scope(pool, expense_id, user_id, business_id).await? {
            return Err(StoreError::ReferenceNotFound("Expense"));
        }
    }
    if let Some(vendor_id) = input.vendor_id {
        if !vendor_in_scope(pool, vendor_id, business_id).await? {
            return Err(StoreError::ReferenceNotFound("Vendor"));
        }
    }

    let result = sqlx::query(
        "INSERT INTO receipts
             (business_id, job_id, expense_id, vendor_id, key, file_url,
              content_type, original_filename, size_bytes, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(business_id)
    .bind(input.job_id)
    .bind(input.expense_id)
    .bind(input.vendor_id)
    .bind(&input.key)
    .bind(&input.file_url)
    .bind(&input.content_type)
    .bind(&input.original_filename)
    .bind(input.size_bytes)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    fetch(pool, business_id, result.last_insert_rowid()).await
}

pub async fn delete(pool: &SqlitePool, business_id: i64, id: i64) -> Result<(), StoreError> {
    fetch(pool, business_id, id).await?;

    sqlx::query("DELETE FROM receipts WHERE id = ? AND business_id = ?")
        .bind(id)
        .bind(business_id)
        .execute(pool)
        .await?;
    Ok(())
}

async fn fetch(pool: &SqlitePool, business_id: i64, id: i64) -> Result<Receipt, StoreError> {
    sqlx::query_as::<_, Receipt>("SELECT * FROM receipts WHERE id = ? AND business_id = ?")
        .bind(id)
        .bind(business_id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound("Receipt"))
}
