use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: i64,
    pub user_id: i64,
    pub business_id: i64,
    pub job_id: Option<i64>,
    pub amount: f64,
    pub note: Option<String>,
    pub status: Option<String>,
    /// Assigned once at creation from the business counter, never reassigned.
    pub invoice_number: Option<String>,
    pub due_date: Option<String>,
    pub pdf_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
