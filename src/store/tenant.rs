//! Ensure-or-create of the caller's profile and business.
//!
//! Every authenticated request resolves its tenant through here. The
//! UNIQUE constraints on `user_profiles.user_id` and
//! `businesses.owner_user_id` serialize concurrent first accesses, so the
//! `INSERT .. ON CONFLICT DO NOTHING` pair can never duplicate rows.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::config;
use crate::db::models::{Business, UserProfile};

use super::StoreError;

pub async fn ensure_profile_and_business(
    pool: &SqlitePool,
    user_id: i64,
    full_name: Option<&str>,
) -> Result<(UserProfile, Business), StoreError> {
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO user_profiles (user_id, timezone, default_mileage_rate, created_at, updated_at)
         VALUES (?, ?, 0.0, ?, ?)
         ON CONFLICT(user_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(&config::config().default_timezone)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let business_name = match full_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "My Business".to_string(),
    };

    sqlx::query(
        "INSERT INTO businesses (owner_user_id, name, created_at, updated_at)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(owner_user_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(&business_name)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let profile = sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    let business = sqlx::query_as::<_, Business>("SELECT * FROM businesses WHERE owner_user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok((profile, business))
}

pub async fn current_business(
    pool: &SqlitePool,
    user_id: i64,
    full_name: Option<&str>,
) -> Result<Business, StoreError> {
    let (_, business) = ensure_profile_and_business(pool, user_id, full_name).await?;
    Ok(business)
}

/// Sparse profile update; absent fields stay untouched, explicit nulls
/// clear the nullable ones.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfilePatch {
    #[serde(deserialize_with = "super::double_option")]
    pub phone: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub timezone: Option<Option<String>>,
    pub default_mileage_rate: Option<f64>,
}

pub async fn update_profile(
    pool: &SqlitePool,
    user_id: i64,
    full_name: Option<&str>,
    patch: ProfilePatch,
) -> Result<UserProfile, StoreError> {
    let (mut profile, _) = ensure_profile_and_business(pool, user_id, full_name).await?;

    if let Some(phone) = patch.phone {
        profile.phone = phone;
    }
    if let Some(timezone) = patch.timezone {
        profile.timezone = timezone;
    }
    if let Some(rate) = patch.default_mileage_rate {
        profile.default_mileage_rate = Some(rate);
    }

    sqlx::query(
        "UPDATE user_profiles
         SET phone = ?, timezone = ?, default_mileage_rate = ?, updated_at = ?
         WHERE user_id = ?",
    )
    .bind(&profile.phone)
    .bind(&profile.timezone)
    .bind(profile.default_mileage_rate)
    .bind(Utc::now())
    .bind(user_id)
    .execute(pool)
    .await?;

    let profile = sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(profile)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BusinessPatch {
    pub name: Option<String>,
    #[serde(deserialize_with = "super::double_option")]
    pub email: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub phone: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub address_line1: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub address_line2: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub city: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub state: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub postal_code: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub country: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub ein: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub logo_url: Option<Option<String>>,
    #[serde(deserialize_with = "super::double_option")]
    pub invoice_prefix: Option<Option<String>>,
    pub next_invoice_number: Option<i64>,
    #[serde(deserialize_with = "super::double_option")]
    pub default_terms: Option<Option<String>>,
}

pub async fn update_business(
    pool: &SqlitePool,
    user_id: i64,
    full_name: Option<&str>,
    patch: BusinessPatch,
) -> Result<Business, StoreError> {
    let mut business = current_business(pool, user_id, full_name).await?;

    if let Some(name) = patch.name {
        business.name = name;
    }
    if let Some(email) = patch.email {
        business.email = email;
    }
    if let Some(phone) = patch.phone {
        business.phone = phone;
    }
    if let Some(v) = patch.address_line1 {
        business.address_line1 = v;
    }
    if let Some(v) = patch.address_line2 {
        business.address_line2 = v;
    }
    if let Some(v) = patch.city {
        business.city = v;
    }
    if let Some(v) = patch.state {
        business.state = v;
    }
    if let Some(v) = patch.postal_code {
        business.postal_code = v;
    }
    if let Some(v) = patch.country {
        business.country = v;
    }
    if let Some(v) = patch.ein {
        business.ein = v;
    }
    if let Some(v) = patch.logo_url {
        business.logo_url = v;
    }
    if let Some(v) = patch.invoice_prefix {
        business.invoice_prefix = v;
    }
    if let Some(v) = patch.next_invoice_number {
        business.next_invoice_number = v;
    }
    if let Some(v) = patch.default_terms {
        business.default_terms = v;
    }

    sqlx::query(
        "UPDATE businesses
         SET name = ?, email = ?, phone = ?, address_line1 = ?, address_line2 = ?,
             city = ?, state = ?, postal_code = ?, country = ?, ein = ?, logo_url = ?,
             invoice_prefix = ?, next_invoice_number = ?, default_terms = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&business.name)
    .bind(&business.email)
    .bind(&business.phone)
    .bind(&business.address_line1)
    .bind(&business.address_line2)
    .bind(&business.city)
    .bind(&business.state)
    .bind(&business.postal_code)
    .bind(&business.country)
    .bind(&business.ein)
    .bind(&business.logo_url)
    .bind(&business.invoice_prefix)
    .bind(business.next_invoice_number)
    .bind(&business.default_terms)
    .bind(Utc::now())
    .bind(business.id)
    .execute(pool)
    .await?;

    let business = sqlx::query_as::<_, Business>("SELECT * FROM businesses WHERE id = ?")
        .bind(business.id)
        .fetch_one(pool)
        .await?;
    Ok(business)
}
