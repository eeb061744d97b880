use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeadRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub website: Option<String>,
    pub message: Option<String>,
    pub source: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlacklistRow {
    pub id: Uuid,
    pub kind: String,
    pub value: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
