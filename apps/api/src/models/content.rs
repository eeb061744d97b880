use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentItemRow {
    pub id: Uuid,
    pub category: String,
    pub title: String,
    pub slug: String,
    pub meta_description: String,
    pub body: String,
    pub keywords: Vec<String>,
    pub status: String,
    pub max_similarity: f64,
    pub published_key: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
