use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::models::Job;

use super::{client_in_scope, StoreError};

#[derive(Debug, Deserialize)]
pub struct JobCreate {
    pub title: String,
    pub client_name: Option<String>,
    pub client_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobPatch {
    pub title: Option<String>,
    #[serde(deserialize_with = "super::double_option")]
    pub client_name: Option<Option<String>>,
    pub status: Option<String>,
    #[serde(deserialize_with = "super::double_option")]
    pub client_id: Option<Option<i64>>,
    #[serde(deserialize_with = "super::double_option")]
    pub start_date: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub end_date: Option<Option<String>>,
}

pub async fn list(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
) -> Result<Vec<Job>, StoreError> {
    let rows = sqlx::query_as::<_, Job>(
        "SELECT * FROM jobs WHERE user_id = ? AND business_id = ? ORDER BY id DESC",
    )
    .bind(user_id)
    .bind(business_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    input: JobCreate,
) -> Result<Job, StoreError> {
    if let Some(client_id) = input.client_id {
        if !client_in_scope(pool, client_id, business_id).await? {
            return Err(StoreError::ReferenceNotFound("Client"));
        }
    }

    let result = sqlx::query(
        "INSERT INTO jobs (user_id, business_id, client_id, title, client_name, status, created_at)
         VALUES (?, ?, ?, ?, ?, 'open', ?)",
    )
    .bind(user_id)
    .bind(business_id)
    .bind(input.client_id)
    .bind(&input.title)
    .bind(&input.client_name)
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
    patch: JobPatch,
) -> Result<Job, StoreError> {
    let mut job = fetch(pool, user_id, business_id, id).await?;

    if let Some(client_id) = patch.client_id {
        if let Some(client_id) = client_id {
            if !client_in_scope(pool, client_id, business_id).await? {
                return Err(StoreError::ReferenceNotFound("Client"));
            }
        }
        job.client_id = client_id;
    }
    if let Some(title) = patch.title {
        job.title = title;
    }
    if let Some(client_name) = patch.client_name {
        job.client_name = client_name;
    }
    if let Some(status) = patch.status {
        job.status = Some(status);
    }
    if let Some(start_date) = patch.start_date {
        job.start_date = start_date;
    }
    if let Some(end_date) = patch.end_date {
        job.end_date = end_date;
    }

    sqlx::query(
        "UPDATE jobs SET client_id = ?, title = ?, client_name = ?, status = ?,
             start_date = ?, end_date = ?
         WHERE id = ? AND user_id = ? AND business_id = ?",
    )
    .bind(job.client_id)
    .bind(&job.title)
    .bind(&job.client_name)
    .bind(&job.status)
    .bind(&job.start_date)
    .bind(&job.end_date)
    .bind(id)
    .bind(user_id)
    .bind(business_id)
    .execute(pool)
    .await?;

    fetch(pool, user_id, business_id, id).await
}

/// A job takes its invoices, expenses (and their receipts), mileage
/// entries, and receipts with it.
pub async fn delete(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    id: i64,
) -> Result<(), StoreError> {
    fetch(pool, user_id, business_id, id).await?;

    let mut tx = pool.begin().await?;
    sqlx::query(
        "DELETE FROM receipts
         WHERE job_id = ?1 OR expense_id IN (SELECT id FROM expenses WHERE job_id = ?1)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM mileage WHERE job_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM expenses WHERE job_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM invoices WHERE job_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM jobs WHERE id = ? AND user_id = ? AND business_id = ?")
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
) -> Result<Job, StoreError> {
    sqlx::query_as::<_, Job>(
        "SELECT * FROM jobs WHERE id = ? AND user_id = ? AND business_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .bind(business_id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound("Job"))
}
