use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::models::Vendor;

use super::StoreError;

#[derive(Debug, Deserialize)]
pub struct VendorCreate {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub default_category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VendorPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "super::double_option")]
    pub email: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub phone: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub notes: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub default_category: Option<Option<String>>,
}

pub async fn list(pool: &SqlitePool, business_id: i64) -> Result<Vec<Vendor>, StoreError> {
    let rows = sqlx::query_as::<_, Vendor>(
        "SELECT * FROM vendors WHERE business_id = ? ORDER BY id DESC",
    )
    .bind(business_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create(
    pool: &SqlitePool,
    business_id: i64,
    input: VendorCreate,
) -> Result<Vendor, StoreError> {
    let result = sqlx::query(
        "INSERT INTO vendors (business_id, name, email, phone, notes, default_category, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(business_id)
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.notes)
    .bind(&input.default_category)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    fetch(pool, business_id, result.last_insert_rowid()).await
}

pub async fn update(
    pool: &SqlitePool,
    business_id: i64,
    id: i64,
    patch: VendorPatch,
) -> Result<Vendor, StoreError> {
    let mut vendor = fetch(pool, business_id, id).await?;

    if let Some(name) = patch.name {
        vendor.name = name;
    }
    if let Some(email) = patch.email {
        vendor.email = email;
    }
    if let Some(phone) = patch.phone {
        vendor.phone = phone;
    }
    if let Some(notes) = patch.notes {
        vendor.notes = notes;
    }
    if let Some(category) = patch.default_category {
        vendor.default_category = category;
    }

    sqlx::query(
        "UPDATE vendors SET name = ?, email = ?, phone = ?, notes = ?, default_category = ?
         WHERE id = ? AND business_id = ?",
    )
    .bind(&vendor.name)
    .bind(&vendor.email)
    .bind(&vendor.phone)
    .bind(&vendor.notes)
    .bind(&vendor.default_category)
    .bind(id)
    .bind(business_id)
    .execute(pool)
    .await?;

    fetch(pool, business_id, id).await
}

/// Dependent expenses and receipts survive with their vendor reference
/// cleared; nothing is cascade-deleted.
pub async fn delete(pool: &SqlitePool, business_id: i64, id: i64) -> Result<(), StoreError> {
    fetch(pool, business_id, id).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE expenses SET vendor_id = NULL WHERE vendor_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE receipts SET vendor_id = NULL WHERE vendor_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM vendors WHERE id = ? AND business_id = ?")
        .bind(id)
        .bind(business_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

async fn fetch(pool: &SqlitePool, business_id: i64, id: i64) -> Result<Vendor, StoreError> {
    sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = ? AND business_id = ?")
        .bind(id)
        .bind(business_id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound("Vendor"))
}
