use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub business_id: i64,
    pub job_id: Option<i64>,
    pub vendor_id: Option<i64>,
    pub amount: f64,
    pub category: String,
    pub category_code: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
