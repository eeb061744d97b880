//! Contracts between a user and a service package.
//!
//! Status moves forward only: draft → sent → signed → active. Any contract that is
//! not already cancelled may be cancelled.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::crm::{ContractRow, PackageRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    Sent,
    Signed,
    Active,
    Cancelled,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Sent => "sent",
            ContractStatus::Signed => "signed",
            ContractStatus::Active => "active",
            ContractStatus::Cancelled => "cancelled",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ContractStatus::Draft => 0,
            ContractStatus::Sent => 1,
            ContractStatus::Signed => 2,
            ContractStatus::Active => 3,
            ContractStatus::Cancelled => u8::MAX,
        }
    }

    pub fn can_transition_to(&self, next: ContractStatus) -> bool {
        match (self, next) {
            (ContractStatus::Cancelled, _) => false,
            (_, ContractStatus::Cancelled) => true,
            (current, next) => next.rank() == current.rank() + 1,
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ContractStatus::Draft),
            "sent" => Ok(ContractStatus::Sent),
            "signed" => Ok(ContractStatus::Signed),
            "active" => Ok(ContractStatus::Active),
            "cancelled" => Ok(ContractStatus::Cancelled),
            other => Err(AppError::Validation(format!(
                "Unknown contract status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContract {
    pub user_id: Uuid,
    pub package_id: Uuid,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Defaults to the package's monthly price.
    pub monthly_price_cents: Option<i64>,
    pub notes: Option<String>,
}

impl NewContract {
    pub fn validate(&self) -> Result<(), AppError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(AppError::Validation(
                    "end_date cannot be before start_date".to_string(),
                ));
            }
        }
        if self.monthly_price_cents.is_some_and(|p| p < 0) {
            return Err(AppError::Validation(
                "monthly_price_cents cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

pub async fn create_contract(pool: &PgPool, req: &NewContract) -> Result<ContractRow, AppError> {
    req.validate()?;

    let user_exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(req.user_id)
        .fetch_one(pool)
        .await?;
    if !user_exists {
        return Err(AppError::NotFound(format!("User {} not found", req.user_id)));
    }

    let package = sqlx::query_as::<_, PackageRow>("SELECT * FROM packages WHERE id = $1")
        .bind(req.package_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Package {} not found", req.package_id)))?;

    let row = sqlx::query_as::<_, ContractRow>(
        r#"
        INSERT INTO contracts
            (id, user_id, package_id, status, start_date, end_date, monthly_price_cents, notes)
        VALUES ($1, $2, $3, 'draft', $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.user_id)
    .bind(package.id)
    .bind(req.start_date)
    .bind(req.end_date)
    .bind(req.monthly_price_cents.unwrap_or(package.monthly_price_cents))
    .bind(&req.notes)
    .fetch_one(pool)
    .await?;

    info!(
        "Created contract {} for user {} on package '{}'",
        row.id, row.user_id, package.slug
    );
    Ok(row)
}

pub async fn list_contracts(
    pool: &PgPool,
    user_id: Option<Uuid>,
    status: Option<ContractStatus>,
) -> Result<Vec<ContractRow>, AppError> {
    let rows = sqlx::query_as::<_, ContractRow>(
        r#"
        SELECT * FROM contracts
        WHERE ($1::uuid IS NULL OR user_id = $1)
          AND ($2::text IS NULL OR status = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_contract(pool: &PgPool, id: Uuid) -> Result<Option<ContractRow>, AppError> {
    let row = sqlx::query_as::<_, ContractRow>("SELECT * FROM contracts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Applies a status transition. `signed_at` is stamped when the contract becomes signed.
pub async fn transition_contract(
    pool: &PgPool,
    id: Uuid,
    next: ContractStatus,
) -> Result<ContractRow, AppError> {
    let current = get_contract(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contract {id} not found")))?;
    let current_status: ContractStatus = current.status.parse()?;

    if !current_status.can_transition_to(next) {
        return Err(AppError::UnprocessableEntity(format!(
            "Contract cannot move from {current_status} to {next}"
        )));
    }

    let row = sqlx::query_as::<_, ContractRow>(
        r#"
        UPDATE contracts SET
            status = $2,
            signed_at = CASE WHEN $2 = 'signed' THEN NOW() ELSE signed_at END,
            updated_at = NOW()
        WHERE id = $1 AND status = $3
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(next.as_str())
    .bind(current_status.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        AppError::Conflict(format!("Contract {id} was modified concurrently; retry"))
    })?;

    info!("Contract {id} moved from {current_status} to {next}");
    Ok(row)
}

pub async fn delete_contract(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM contracts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ContractStatus::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(Draft.can_transition_to(Sent));
        assert!(Sent.can_transition_to(Signed));
        assert!(Signed.can_transition_to(Active));
    }

    #[test]
    fn test_skipping_and_backwards_rejected() {
        assert!(!Draft.can_transition_to(Signed));
        assert!(!Draft.can_transition_to(Active));
        assert!(!Active.can_transition_to(Draft));
        assert!(!Signed.can_transition_to(Sent));
        assert!(!Sent.can_transition_to(Sent));
    }

    #[test]
    fn test_cancellation() {
        for status in [Draft, Sent, Signed, Active] {
            assert!(status.can_transition_to(Cancelled));
        }
        for status in [Draft, Sent, Signed, Active, Cancelled] {
            assert!(!Cancelled.can_transition_to(status));
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("signed".parse::<ContractStatus>().unwrap(), Signed);
        assert!("expired".parse::<ContractStatus>().is_err());
    }

    #[test]
    fn test_new_contract_date_order() {
        let req = NewContract {
            user_id: Uuid::new_v4(),
            package_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            monthly_price_cents: None,
            notes: None,
        };
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_new_contract_negative_price() {
        let req = NewContract {
            user_id: Uuid::new_v4(),
            package_id: Uuid::new_v4(),
            start_date: None,
            end_date: None,
            monthly_price_cents: Some(-1),
            notes: None,
        };
        assert!(req.validate().is_err());
    }
}
