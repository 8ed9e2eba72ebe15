use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::models::User;

use super::StoreError;

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Insert a user row; the email must already be normalized to lowercase.
pub async fn create(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    full_name: Option<&str>,
) -> Result<User, StoreError> {
    let result = sqlx::query(
        "INSERT INTO users (email, password_hash, full_name, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(email)
    .bind(password_hash)
    .bind(full_name)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await?;
    Ok(user)
}

/// Delete a user and everything owned through it, in one transaction.
///
/// Ordering matters: children before parents, so the foreign key
/// constraints hold at every step.
pub async fn delete_cascade(pool: &SqlitePool, user_id: i64) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;

    let business_id: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM businesses WHERE owner_user_id = ?")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

    if let Some((business_id,)) = business_id {
        sqlx::query("DELETE FROM receipts WHERE business_id = ?")
            .bind(business_id)
            .execute(&mut *tx)
            .await?;
    }

    for table in ["mileage", "expenses", "invoices", "jobs"] {
        sqlx::query(&format!("DELETE FROM {} WHERE user_id = ?", table))
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some((business_id,)) = business_id {
        sqlx::query("DELETE FROM clients WHERE business_id = ?")
            .bind(business_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM vendors WHERE business_id = ?")
            .bind(business_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM businesses WHERE id = ?")
            .bind(business_id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("DELETE FROM user_profiles WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}
