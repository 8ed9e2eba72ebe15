//! Tenant-scoped entity store.
//!
//! Every read, write, and delete here is constrained to the caller's
//! business (and, for user-owned rows, the caller's user id). Rows outside
//! that scope surface as `NotFound`; whether they exist at all is never
//! revealed. Cross-entity references are checked against the same scope
//! before a write is persisted.

use serde::{Deserialize, Deserializer};
use sqlx::SqlitePool;
use thiserror::Error;

pub mod clients;
pub mod expenses;
pub mod invoices;
pub mod jobs;
pub mod mileage;
pub mod receipts;
pub mod tenant;
pub mod users;
pub mod vendors;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Row absent or outside the caller's scope; the two are
    /// indistinguishable on purpose.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A foreign reference in a write payload does not resolve within the
    /// caller's scope.
    #[error("{0} not found")]
    ReferenceNotFound(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Deserializer for clearable patch fields: an absent key keeps the
/// stored value, an explicit `null` clears it. Serde's stock `Option`
/// folds both cases into `None`, so present keys get wrapped one level
/// here and absence falls through to the struct default.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) async fn client_in_scope(
    pool: &SqlitePool,
    client_id: i64,
    business_id: i64,
) -> Result<bool, sqlx::Error> {
    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM clients WHERE id = ? AND business_id = ?")
            .bind(client_id)
            .bind(business_id)
            .fetch_one(pool)
            .await?;
    Ok(count.0 > 0)
}

pub(crate) async fn vendor_in_scope(
    pool: &SqlitePool,
    vendor_id: i64,
    business_id: i64,
) -> Result<bool, sqlx::Error> {
    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM vendors WHERE id = ? AND business_id = ?")
            .bind(vendor_id)
            .bind(business_id)
            .fetch_one(pool)
            .await?;
    Ok(count.0 > 0)
}

pub(crate) async fn job_in_scope(
    pool: &SqlitePool,
    job_id: i64,
    user_id: i64,
    business_id: i64,
) -> Result<bool, sqlx::Error> {
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM jobs WHERE id = ? AND user_id = ? AND business_id = ?",
    )
    .bind(job_id)
    .bind(user_id)
    .bind(business_id)
    .fetch_one(pool)
    .await?;
    Ok(count.0 > 0)
}

pub(crate) async fn expense_in_scope(
    pool: &SqlitePool,
    expense_id: i64,
    user_id: i64,
    business_id: i64,
) -> Result<bool, sqlx::Error> {
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM expenses WHERE id = ? AND user_id = ? AND business_id = ?",
    )
    .bind(expense_id)
    .bind(user_id)
    .bind(business_id)
    .fetch_one(pool)
    .await?;
    Ok(count.0 > 0)
}
