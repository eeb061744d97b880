//! Lead storage.
//!
//! Leads live in an append-mostly, sheet-like table: rows are appended by the public
//! form and only their status changes afterwards. `LeadStore` keeps handlers
//! independent of where that table lives.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::leads::{BlacklistKind, LeadStatus};
use crate::models::lead::{BlacklistRow, LeadRow};
use crate::pagination::PageParams;

/// A validated, normalized lead ready to be appended.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub website: Option<String>,
    pub message: Option<String>,
    pub source: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub page: PageParams,
}

#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn append(&self, lead: NewLead) -> Result<LeadRow, AppError>;
    /// Newest first.
    async fn list(&self, filter: LeadFilter) -> Result<Vec<LeadRow>, AppError>;
    async fn get(&self, id: Uuid) -> Result<Option<LeadRow>, AppError>;
    async fn set_status(&self, id: Uuid, status: LeadStatus) -> Result<Option<LeadRow>, AppError>;
    /// Atomically moves a lead to `converted`. `None` when the lead is missing or
    /// was already converted, so at most one caller wins.
    async fn claim_conversion(&self, id: Uuid) -> Result<Option<LeadRow>, AppError>;
    /// Returns false when no lead had that id.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// True when any `(kind, normalized value)` pair is blacklisted.
    async fn is_blacklisted(&self, keys: &[(BlacklistKind, String)]) -> Result<bool, AppError>;
    async fn list_blacklist(&self) -> Result<Vec<BlacklistRow>, AppError>;
    /// Fails with `Conflict` when the value is already listed for that kind.
    async fn add_blacklist(
        &self,
        kind: BlacklistKind,
        value: String,
        reason: Option<String>,
    ) -> Result<BlacklistRow, AppError>;
    async fn remove_blacklist(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Postgres-backed lead table.
#[derive(Clone)]
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn append(&self, lead: NewLead) -> Result<LeadRow, AppError> {
        let row = sqlx::query_as::<_, LeadRow>(
            r#"
            INSERT INTO leads (id, name, email, phone, business_name, website, message, source, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'new')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.business_name)
        .bind(&lead.website)
        .bind(&lead.message)
        .bind(&lead.source)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list(&self, filter: LeadFilter) -> Result<Vec<LeadRow>, AppError> {
        let rows = sqlx::query_as::<_, LeadRow>(
            r#"
            SELECT * FROM leads
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.page.limit())
        .bind(filter.page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<LeadRow>, AppError> {
        let row = sqlx::query_as::<_, LeadRow>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn set_status(&self, id: Uuid, status: LeadStatus) -> Result<Option<LeadRow>, AppError> {
        let row = sqlx::query_as::<_, LeadRow>(
            "UPDATE leads SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn claim_conversion(&self, id: Uuid) -> Result<Option<LeadRow>, AppError> {
        let row = sqlx::query_as::<_, LeadRow>(
            r#"
            UPDATE leads SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status <> $1
            RETURNING *
            "#,
        )
        .bind(LeadStatus::Converted.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn is_blacklisted(&self, keys: &[(BlacklistKind, String)]) -> Result<bool, AppError> {
        if keys.is_empty() {
            return Ok(false);
        }
        let kinds: Vec<&str> = keys.iter().map(|(k, _)| k.as_str()).collect();
        let values: Vec<&str> = keys.iter().map(|(_, v)| v.as_str()).collect();
        let hit: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM blacklist b
                JOIN UNNEST($1::text[], $2::text[]) AS k(kind, value)
                  ON b.kind = k.kind AND b.value = k.value
            )
            "#,
        )
        .bind(kinds)
        .bind(values)
        .fetch_one(&self.pool)
        .await?;
        Ok(hit)
    }

    async fn list_blacklist(&self) -> Result<Vec<BlacklistRow>, AppError> {
        let rows =
            sqlx::query_as::<_, BlacklistRow>("SELECT * FROM blacklist ORDER BY kind, value")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    async fn add_blacklist(
        &self,
        kind: BlacklistKind,
        value: String,
        reason: Option<String>,
    ) -> Result<BlacklistRow, AppError> {
        let row = sqlx::query_as::<_, BlacklistRow>(
            "INSERT INTO blacklist (id, kind, value, reason) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(kind.as_str())
        .bind(&value)
        .bind(&reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn remove_blacklist(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM blacklist WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// In-process lead table for local development and tests.
#[derive(Default, Clone)]
pub struct MemoryLeadStore {
    leads: Arc<RwLock<Vec<LeadRow>>>,
    blacklist: Arc<RwLock<Vec<BlacklistRow>>>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn append(&self, lead: NewLead) -> Result<LeadRow, AppError> {
        let now = Utc::now();
        let row = LeadRow {
            id: Uuid::new_v4(),
            name: lead.name,
            email: lead.email,
            phone: lead.phone,
            business_name: lead.business_name,
            website: lead.website,
            message: lead.message,
            source: lead.source,
            status: LeadStatus::New.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.leads.write().await.push(row.clone());
        Ok(row)
    }

    async fn list(&self, filter: LeadFilter) -> Result<Vec<LeadRow>, AppError> {
        let leads = self.leads.read().await;
        Ok(leads
            .iter()
            .rev()
            .filter(|l| filter.status.map_or(true, |s| l.status == s.as_str()))
            .skip(filter.page.offset() as usize)
            .take(filter.page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<LeadRow>, AppError> {
        Ok(self.leads.read().await.iter().find(|l| l.id == id).cloned())
    }

    async fn set_status(&self, id: Uuid, status: LeadStatus) -> Result<Option<LeadRow>, AppError> {
        let mut leads = self.leads.write().await;
        Ok(leads.iter_mut().find(|l| l.id == id).map(|l| {
            l.status = status.as_str().to_string();
            l.updated_at = Utc::now();
            l.clone()
        }))
    }

    async fn claim_conversion(&self, id: Uuid) -> Result<Option<LeadRow>, AppError> {
        let converted = LeadStatus::Converted.as_str();
        let mut leads = self.leads.write().await;
        Ok(leads
            .iter_mut()
            .find(|l| l.id == id && l.status != converted)
            .map(|l| {
                l.status = converted.to_string();
                l.updated_at = Utc::now();
                l.clone()
            }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut leads = self.leads.write().await;
        let before = leads.len();
        leads.retain(|l| l.id != id);
        Ok(leads.len() != before)
    }

    async fn is_blacklisted(&self, keys: &[(BlacklistKind, String)]) -> Result<bool, AppError> {
        let blacklist = self.blacklist.read().await;
        Ok(keys.iter().any(|(kind, value)| {
            blacklist
                .iter()
                .any(|b| b.kind == kind.as_str() && &b.value == value)
        }))
    }

    async fn list_blacklist(&self) -> Result<Vec<BlacklistRow>, AppError> {
        let mut rows = self.blacklist.read().await.clone();
        rows.sort_by(|a, b| (&a.kind, &a.value).cmp(&(&b.kind, &b.value)));
        Ok(rows)
    }

    async fn add_blacklist(
        &self,
        kind: BlacklistKind,
        value: String,
        reason: Option<String>,
    ) -> Result<BlacklistRow, AppError> {
        let mut blacklist = self.blacklist.write().await;
        if blacklist
            .iter()
            .any(|b| b.kind == kind.as_str() && b.value == value)
        {
            return Err(AppError::Conflict(format!(
                "{} '{value}' is already blacklisted",
                kind.as_str()
            )));
        }
        let row = BlacklistRow {
            id: Uuid::new_v4(),
            kind: kind.as_str().to_string(),
            value,
            reason,
            created_at: Utc::now(),
        };
        blacklist.push(row.clone());
        Ok(row)
    }

    async fn remove_blacklist(&self, id: Uuid) -> Result<bool, AppError> {
        let mut blacklist = self.blacklist.write().await;
        let before = blacklist.len();
        blacklist.retain(|b| b.id != id);
        Ok(blacklist.len() != before)
    }
}
