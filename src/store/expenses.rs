use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::models::Expense;

use super::{job_in_scope, vendor_in_scope, StoreError};

#[derive(Debug, Deserialize)]
pub struct ExpenseCreate {
    pub job_id: Option<i64>,
    pub vendor_id: Option<i64>,
    pub amount: f64,
    pub category: String,
    pub category_code: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExpensePatch {
    #[serde(deserialize_with = "super::double_option")]
    pub job_id: Option<Option<i64>>,
    #[serde(deserialize_with = "super::double_option")]
    pub vendor_id: Option<Option<i64>>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    #[serde(deserialize_with = "super::double_option")]
    pub category_code: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub note: Option<Option<String>>,
}

pub async fn list(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    job_id: Option<i64>,
) -> Result<Vec<Expense>, StoreError> {
    let rows = match job_id {
        Some(job_id) => {
            sqlx::query_as::<_, Expense>(
                "SELECT * FROM expenses
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
            sqlx::query_as::<_, Expense>(
                "SELECT * FROM expenses WHERE user_id = ? AND business_id = ? ORDER BY id DESC",
            )
            .bind(user_id)
            .bind(business_id)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}

pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    input: ExpenseCreate,
) -> Result<Expense, StoreError> {
    if let Some(job_id) = input.job_id {
        if !job_in_scope(pool, job_id, user_id, business_id).await? {
            return Err(StoreError::ReferenceNotFound("Job"));
        }
    }
    if let Some(vendor_id) = input.vendor_id {
        if !vendor_in_scope(pool, vendor_id, business_id).await? {
            return Err(StoreError::ReferenceNotFound("Vendor"));
        }
    }

    let result = sqlx::query(
        "INSERT INTO expenses
             (user_id, business_id, job_id, vendor_id, amount, category, category_code, note, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(business_id)
    .bind(input.job_id)
    .bind(input.vendor_id)
    .bind(input.amount)
    .bind(&input.category)
    .bind(&input.category_code)
    .bind(&input.note)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    fetch(pool, user_id, business_id, result.last_insert_rowid()).await
}

pub async fn update(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    id: i64,
    patch: ExpensePatch,
) -> Result<Expense, StoreError> {
    let mut expense = fetch(pool, user_id, business_id, id).await?;

    if let Some(job_id) = patch.job_id {
        if let Some(job_id) = job_id {
            if !job_in_scope(pool, job_id, user_id, business_id).await? {
                return Err(StoreError::ReferenceNotFound("Job"));
            }
        }
        expense.job_id = job_id;
    }
    if let Some(vendor_id) = patch.vendor_id {
        if let Some(vendor_id) = vendor_id {
            if !vendor_in_scope(pool, vendor_id, business_id).await? {
                return Err(StoreError::ReferenceNotFound("Vendor"));
            }
        }
        expense.vendor_id = vendor_id;
    }
    if let Some(amount) = patch.amount {
        expense.amount = amount;
    }
    if let Some(category) = patch.category {
        expense.category = category;
    }
    if let Some(category_code) = patch.category_code {
        expense.category_code = category_code;
    }
    if let Some(note) = patch.note {
        expense.note = note;
    }

    sqlx::query(
        "UPDATE expenses
         SET job_id = ?, vendor_id = ?, amount = ?, category = ?, category_code = ?, note = ?
         WHERE id = ? AND user_id = ? AND business_id = ?",
    )
    .bind(expense.job_id)
    .bind(expense.vendor_id)
    .bind(expense.amount)
    .bind(&expense.category)
    .bind(&expense.category_code)
    .bind(&expense.note)
    .bind(id)
    .bind(user_id)
    .bind(business_id)
    .execute(pool)
    .await?;

    fetch(pool, user_id, business_id, id).await
}

/// Receipts attached to the expense go with it.
pub async fn delete(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    id: i64,
) -> Result<(), StoreError> {
    fetch(pool, user_id, business_id, id).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM receipts WHERE expense_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM expenses WHERE id = ? AND user_id = ? AND business_id = ?")
        .bind(id)
        .bind(user_id)
        .bind(business_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

async fn fetch(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    id: i64,
) -> Result<Expense, StoreError> {
    sqlx::query_as::<_, Expense>(
        "SELECT * FROM expenses WHERE id = ? AND user_id = ? AND business_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .bind(business_id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound("Expense"))
}
