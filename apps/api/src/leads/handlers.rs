//! Axum route handlers for lead intake, the lead admin, and the blacklist.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::extract::AuthAdmin;
use crate::crm::clients::{insert_client, ClientInput};
use crate::errors::AppError;
use crate::leads::normalize::{
    email_domain, is_valid_email, normalize_blacklist_value, normalize_email, normalize_phone,
};
use crate::leads::store::{LeadFilter, NewLead};
use crate::leads::{BlacklistKind, LeadStatus};
use crate::models::crm::ClientRow;
use crate::models::lead::{BlacklistRow, LeadRow};
use crate::pagination::PageParams;
use crate::state::AppState;

const MAX_NAME_LEN: usize = 200;
const MAX_MESSAGE_LEN: usize = 5000;
const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 7..=15;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LeadIntakeRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub website: Option<String>,
    pub message: Option<String>,
    /// Landing page or campaign that produced the lead.
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeadIntakeResponse {
    pub accepted: bool,
}

#[derive(Debug, Deserialize)]
pub struct LeadListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LeadStatusUpdate {
    pub status: LeadStatus,
}

#[derive(Debug, Serialize)]
pub struct LeadConvertResponse {
    pub lead: LeadRow,
    pub client: ClientRow,
}

#[derive(Debug, Deserialize)]
pub struct BlacklistRequest {
    pub kind: BlacklistKind,
    pub value: String,
    pub reason: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validates and normalizes a public form submission.
pub fn validate_intake(req: LeadIntakeRequest) -> Result<NewLead, AppError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }

    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        return Err(AppError::Validation("email is invalid".to_string()));
    }

    let phone = non_empty(req.phone);
    if let Some(p) = &phone {
        if !PHONE_DIGITS.contains(&normalize_phone(p).len()) {
            return Err(AppError::Validation("phone number is invalid".to_string()));
        }
    }

    let message = non_empty(req.message);
    if message
        .as_ref()
        .is_some_and(|m| m.chars().count() > MAX_MESSAGE_LEN)
    {
        return Err(AppError::Validation(format!(
            "message must be at most {MAX_MESSAGE_LEN} characters"
        )));
    }

    Ok(NewLead {
        name,
        email,
        phone,
        business_name: non_empty(req.business_name),
        website: non_empty(req.website),
        message,
        source: non_empty(req.source).unwrap_or_else(|| "website".to_string()),
    })
}

/// Blacklist keys a submission is checked against.
pub fn blacklist_keys(lead: &NewLead) -> Vec<(BlacklistKind, String)> {
    let mut keys = vec![(BlacklistKind::Email, lead.email.clone())];
    if let Some(domain) = email_domain(&lead.email) {
        keys.push((BlacklistKind::Domain, domain.to_string()));
    }
    if let Some(phone) = lead.phone.as_deref().map(normalize_phone) {
        keys.push((BlacklistKind::Phone, phone));
    }
    keys
}

// ────────────────────────────────────────────────────────────────────────────
// Public intake
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/leads
///
/// Blacklisted submissions receive the same response but are dropped.
pub async fn handle_submit_lead(
    State(state): State<AppState>,
    Json(req): Json<LeadIntakeRequest>,
) -> Result<(StatusCode, Json<LeadIntakeResponse>), AppError> {
    let lead = validate_intake(req)?;

    if state.leads.is_blacklisted(&blacklist_keys(&lead)).await? {
        info!("Dropped blacklisted lead submission from {}", lead.email);
    } else {
        let row = state.leads.append(lead).await?;
        info!("Captured lead {} from source '{}'", row.id, row.source);
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(LeadIntakeResponse { accepted: true }),
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Lead admin
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/admin/leads
pub async fn handle_list_leads(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Query(params): Query<LeadListQuery>,
) -> Result<Json<Vec<LeadRow>>, AppError> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<LeadStatus>)
        .transpose()?;
    let leads = state
        .leads
        .list(LeadFilter {
            status,
            page: PageParams {
                limit: params.limit,
                offset: params.offset,
            },
        })
        .await?;
    Ok(Json(leads))
}

/// GET /api/v1/admin/leads/:id
pub async fn handle_get_lead(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<LeadRow>, AppError> {
    state
        .leads
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Lead {id} not found")))
}

/// PATCH /api/v1/admin/leads/:id
pub async fn handle_update_lead_status(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Path(id): Path<Uuid>,
    Json(req): Json<LeadStatusUpdate>,
) -> Result<Json<LeadRow>, AppError> {
    if req.status == LeadStatus::Converted {
        return Err(AppError::UnprocessableEntity(
            "Use the convert endpoint to mark a lead converted".to_string(),
        ));
    }
    let lead = state
        .leads
        .set_status(id, req.status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead {id} not found")))?;
    info!("Lead {id} set to {} by {}", req.status, auth.admin.email);
    Ok(Json(lead))
}

/// DELETE /api/v1/admin/leads/:id
pub async fn handle_delete_lead(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.leads.delete(id).await? {
        return Err(AppError::NotFound(format!("Lead {id} not found")));
    }
    info!("Lead {id} deleted by {}", auth.admin.email);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/leads/:id/convert
///
/// Creates a prospect client from the lead and marks the lead converted.
pub async fn handle_convert_lead(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<LeadConvertResponse>), AppError> {
    let previous = state
        .leads
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead {id} not found")))?;

    // At most one concurrent request wins the claim.
    let lead = state.leads.claim_conversion(id).await?.ok_or_else(|| {
        AppError::UnprocessableEntity(format!("Lead {id} is already converted"))
    })?;

    let input = ClientInput {
        business_name: lead
            .business_name
            .clone()
            .unwrap_or_else(|| lead.name.clone()),
        contact_name: Some(lead.name.clone()),
        email: Some(lead.email.clone()),
        phone: lead.phone.clone(),
        website: lead.website.clone(),
        industry: None,
        city: None,
        status: None,
        notes: lead.message.clone(),
    };
    let client = match insert_client(&state.db, &input, Some(lead.id)).await {
        Ok(client) => client,
        Err(err) => {
            let status = previous.status.parse().unwrap_or(LeadStatus::New);
            warn!("Converting lead {id} failed ({err}); restoring status '{status}'");
            state.leads.set_status(id, status).await?;
            return Err(err);
        }
    };

    info!(
        "Lead {id} converted to client {} by {}",
        client.id, auth.admin.email
    );
    Ok((
        StatusCode::CREATED,
        Json(LeadConvertResponse { lead, client }),
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Blacklist admin
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/admin/blacklist
pub async fn handle_list_blacklist(
    State(state): State<AppState>,
    _auth: AuthAdmin,
) -> Result<Json<Vec<BlacklistRow>>, AppError> {
    Ok(Json(state.leads.list_blacklist().await?))
}

/// POST /api/v1/admin/blacklist
pub async fn handle_add_blacklist(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Json(req): Json<BlacklistRequest>,
) -> Result<(StatusCode, Json<BlacklistRow>), AppError> {
    let value = normalize_blacklist_value(req.kind, &req.value)?;
    let row = state
        .leads
        .add_blacklist(req.kind, value, non_empty(req.reason))
        .await?;
    info!(
        "Blacklisted {} '{}' by {}",
        row.kind, row.value, auth.admin.email
    );
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /api/v1/admin/blacklist/:id
pub async fn handle_remove_blacklist(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !state.leads.remove_blacklist(id).await? {
        return Err(AppError::NotFound(format!("Blacklist entry {id} not found")));
    }
    Ok(Json(json!({ "removed": id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> LeadIntakeRequest {
        LeadIntakeRequest {
            name: "  Joe Smith ".to_string(),
            email: " Joe@JoesPlumbing.com ".to_string(),
            phone: Some("(555) 010-0100".to_string()),
            business_name: Some("Joe's Plumbing".to_string()),
            website: Some("  ".to_string()),
            message: None,
            source: None,
        }
    }

    #[test]
    fn test_validate_intake_normalizes() {
        let lead = validate_intake(request()).unwrap();
        assert_eq!(lead.name, "Joe Smith");
        assert_eq!(lead.email, "joe@joesplumbing.com");
        assert_eq!(lead.website, None);
        assert_eq!(lead.source, "website");
    }

    #[test]
    fn test_validate_intake_rejects_bad_email() {
        let mut req = request();
        req.email = "joe at example".to_string();
        assert!(matches!(validate_intake(req), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_intake_rejects_empty_name() {
        let mut req = request();
        req.name = "   ".to_string();
        assert!(matches!(validate_intake(req), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_intake_rejects_short_phone() {
        let mut req = request();
        req.phone = Some("12-34".to_string());
        assert!(matches!(validate_intake(req), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_blacklist_keys_cover_email_domain_and_phone() {
        let lead = validate_intake(request()).unwrap();
        let keys = blacklist_keys(&lead);
        assert!(keys.contains(&(BlacklistKind::Email, "joe@joesplumbing.com".to_string())));
        assert!(keys.contains(&(BlacklistKind::Domain, "joesplumbing.com".to_string())));
        assert!(keys.contains(&(BlacklistKind::Phone, "5550100100".to_string())));
    }
}
