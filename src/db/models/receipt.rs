use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Receipt {
    pub id: i64,
    pub business_id: i64,
    pub job_id: Option<i64>,
    pub expense_id: Option<i64>,
    pub vendor_id: Option<i64>,
    pub file_url: String,
    pub key: Option<String>,
    pub content_type: Option<String>,
    pub original_filename: Option<String>,
    pub size_bytes: Option<i64>,
    pub created_at: DateTime<Utc>,
}
