use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::models::Mileage;

use super::{job_in_scope, StoreError};

#[derive(Debug, Deserialize)]
pub struct MileageCreate {
    pub job_id: Option<i64>,
    pub miles: f64,
    pub note: Option<String>,
}

pub async fn list(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    job_id: Option<i64>,
) -> Result<Vec<Mileage>, StoreError> {
    let rows = match job_id {
        Some(job_id) => {
            sqlx::query_as::<_, Mileage>(
                "SELECT * FROM mileage
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
            sqlx::query_as::<_, Mileage>(
                "SELECT * FROM mileage WHERE user_id = ? AND business_id = ? ORDER BY id DESC",
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
    input: MileageCreate,
) -> Result<Mileage, StoreError> {
    if let Some(job_id) = input.job_id {
        if !job_in_scope(pool, job_id, user_id, business_id).await? {
            return Err(StoreError::ReferenceNotFound("Job"));
        }
    }

    let result = sqlx::query(
        "INSERT INTO mileage (user_id, business_id, job_id, miles, note, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(business_id)
    .bind(input.job_id)
    .bind(input.miles)
    .bind(&input.note)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    fetch(pool, user_id, business_id, result.last_insert_rowid()).await
}

pub async fn delete(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    id: i64,
) -> Result<(), StoreError> {
    fetch(pool, user_id, business_id, id).await?;

    sqlx::query("DELETE FROM mileage WHERE id = ? AND user_id = ? AND business_id = ?")
        .bind(id)
        .bind(user_id)
        .bind(business_id)
        .execute(pool)
        .await?;
    Ok(())
}

async fn fetch(
    pool: &SqlitePool,
    user_id: i64,
    business_id: i64,
    id: i64,
) -> Result<Mileage, StoreError> {
    sqlx::query_as::<_, Mileage>(
        "SELECT * FROM mileage WHERE id = ? AND user_id = ? AND business_id = ?",
    )
    .bind(id)
    .bind(user_id)
    .bind(business_id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound("Mileage entry"))
}
