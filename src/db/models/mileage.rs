use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mileage {
    pub id: i64,
    pub user_id: i64,
    pub business_id: i64,
    pub job_id: Option<i64>,
    pub miles: f64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
