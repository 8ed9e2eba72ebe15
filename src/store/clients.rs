use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::models::Client;

use super::StoreError;

#[derive(Debug, Deserialize)]
pub struct ClientCreate {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClientPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "super::double_option")]
    pub email: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub phone: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub address: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub notes: Option<Option<String>>,
}

pub async fn list(pool: &SqlitePool, business_id: i64) -> Result<Vec<Client>, StoreError> {
    let rows = sqlx::query_as::<_, Client>(
        "SELECT * FROM clients WHERE business_id = ? ORDER BY id DESC",
    )
    .bind(business_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create(
    pool: &SqlitePool,
    business_id: i64,
    input: ClientCreate,
) -> Result<Client, StoreError> {
    let result = sqlx::query(
        "INSERT INTO clients (business_id, name, email, phone, address, notes, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(business_id)
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.address)
    .bind(&input.notes)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    fetch(pool, business_id, result.last_insert_rowid()).await
}

pub async fn update(
    pool: &SqlitePool,
    business_id: i64,
    id: i64,
    patch: ClientPatch,
) -> Result<Client, StoreError> {
    let mut client = fetch(pool, business_id, id).await?;

    if let Some(name) = patch.name {
        client.name = name;
    }
    if let Some(email) = patch.email {
        client.email = email;
    }
    if let Some(phone) = patch.phone {
        client.phone = phone;
    }
    if let Some(address) = patch.address {
        client.address = address;
    }
    if let Some(notes) = patch.notes {
        client.notes = notes;
    }

    sqlx::query(
        "UPDATE clients SET name = ?, email = ?, phone = ?, address = ?, notes = ?
         WHERE id = ? AND business_id = ?",
    )
    .bind(&client.name)
    .bind(&client.email)
    .bind(&client.phone)
    .bind(&client.address)
    .bind(&client.notes)
    .bind(id)
    .bind(business_id)
    .execute(pool)
    .await?;

    fetch(pool, business_id, id).await
}

/// Dependent jobs keep existing with their client reference cleared.
pub async fn delete(pool: &SqlitePool, business_id: i64, id: i64) -> Result<(), StoreError> {
    fetch(pool, business_id, id).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE jobs SET client_id = NULL WHERE client_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM clients WHERE id = ? AND business_id = ?")
        .bind(id)
        .bind(business_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

async fn fetch(pool: &SqlitePool, business_id: i64, id: i64) -> Result<Client, StoreError> {
    sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ? AND business_id = ?")
        .bind(id)
        .bind(business_id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound("Client"))
}
