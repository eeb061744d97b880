use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::crm::ClientStatus;
use crate::errors::AppError;
use crate::models::crm::ClientRow;
use crate::pagination::PageParams;

/// Writable client fields, shared by create and full update.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInput {
    pub business_name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub city: Option<String>,
    pub status: Option<ClientStatus>,
    pub notes: Option<String>,
}

impl ClientInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.business_name.trim().is_empty() {
            return Err(AppError::Validation(
                "business_name cannot be empty".to_string(),
            ));
        }
        if let Some(email) = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            if !crate::leads::normalize::is_valid_email(&email.to_lowercase()) {
                return Err(AppError::Validation("email is invalid".to_string()));
            }
        }
        Ok(())
    }

    fn status_str(&self) -> &'static str {
        self.status.unwrap_or(ClientStatus::Prospect).as_str()
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub async fn insert_client(
    pool: &PgPool,
    input: &ClientInput,
    lead_id: Option<Uuid>,
) -> Result<ClientRow, AppError> {
    input.validate()?;
    let row = sqlx::query_as::<_, ClientRow>(
        r#"
        INSERT INTO clients
            (id, business_name, contact_name, email, phone, website, industry, city, status, notes, lead_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.business_name.trim())
    .bind(trimmed(&input.contact_name))
    .bind(trimmed(&input.email).map(|e| e.to_lowercase()))
    .bind(trimmed(&input.phone))
    .bind(trimmed(&input.website))
    .bind(trimmed(&input.industry))
    .bind(trimmed(&input.city))
    .bind(input.status_str())
    .bind(trimmed(&input.notes))
    .bind(lead_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_client(
    pool: &PgPool,
    id: Uuid,
    input: &ClientInput,
) -> Result<Option<ClientRow>, AppError> {
    input.validate()?;
    let row = sqlx::query_as::<_, ClientRow>(
        r#"
        UPDATE clients SET
            business_name = $2, contact_name = $3, email = $4, phone = $5, website = $6,
            industry = $7, city = $8, status = $9, notes = $10, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.business_name.trim())
    .bind(trimmed(&input.contact_name))
    .bind(trimmed(&input.email).map(|e| e.to_lowercase()))
    .bind(trimmed(&input.phone))
    .bind(trimmed(&input.website))
    .bind(trimmed(&input.industry))
    .bind(trimmed(&input.city))
    .bind(input.status_str())
    .bind(trimmed(&input.notes))
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_clients(
    pool: &PgPool,
    status: Option<ClientStatus>,
    page: PageParams,
) -> Result<Vec<ClientRow>, AppError> {
    let rows = sqlx::query_as::<_, ClientRow>(
        r#"
        SELECT * FROM clients
        WHERE ($1::text IS NULL OR status = $1)
        ORDER BY business_name
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(status.map(|s| s.as_str()))
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_client(pool: &PgPool, id: Uuid) -> Result<Option<ClientRow>, AppError> {
    let row = sqlx::query_as::<_, ClientRow>("SELECT * FROM clients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn delete_client(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ClientInput {
        ClientInput {
            business_name: "Lone Star Roofing".to_string(),
            contact_name: Some("  ".to_string()),
            email: Some("Owner@LoneStar.com".to_string()),
            phone: None,
            website: None,
            industry: Some("roofing".to_string()),
            city: Some("Austin".to_string()),
            status: None,
            notes: None,
        }
    }

    #[test]
    fn test_validate_accepts_mixed_case_email() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_business_name() {
        let mut i = input();
        i.business_name = " ".to_string();
        assert!(matches!(i.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let mut i = input();
        i.email = Some("owner-at-lonestar".to_string());
        assert!(i.validate().is_err());
    }

    #[test]
    fn test_status_defaults_to_prospect() {
        assert_eq!(input().status_str(), "prospect");
    }

    #[test]
    fn test_trimmed_drops_blank() {
        assert_eq!(trimmed(&Some("  ".to_string())), None);
        assert_eq!(trimmed(&Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(trimmed(&None), None);
    }
}
