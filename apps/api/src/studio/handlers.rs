//! Axum route handlers for the content studio.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::extract::AuthAdmin;
use crate::errors::AppError;
use crate::models::content::ContentItemRow;
use crate::pagination::PageParams;
use crate::state::AppState;
use crate::studio::generator::{generate_content, GenerateRequest, GenerateResponse};
use crate::studio::prompts::{CategoryRules, ContentCategory, GenerationPrompt};
use crate::studio::publish::publish_content;
use crate::studio::repository::{content_in_category, delete_content, get_content, list_content};
use crate::studio::similarity::{ContentSample, DuplicatePair, DuplicateReport};
use crate::studio::validation::{validate_content, ContentValidation, GeneratedContent};

// ────────────────────────────────────────────────────────────────────────────
// Request / response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub category: ContentCategory,
    pub label: &'static str,
    pub rules: CategoryRules,
}

#[derive(Debug, Deserialize)]
pub struct CheckDuplicatesRequest {
    pub category: ContentCategory,
    pub title: String,
    pub body: String,
    /// Stored item to skip, when re-checking an existing draft.
    pub exclude_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct DuplicateScanQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub category: ContentCategory,
    pub content: GeneratedContent,
    pub primary_keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentListQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ────────────────────────────────────────────────────────────────────────────
// Prompting & checks
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/studio/categories
pub async fn handle_list_categories(_auth: AuthAdmin) -> Json<Vec<CategoryInfo>> {
    Json(
        ContentCategory::ALL
            .into_iter()
            .map(|category| CategoryInfo {
                category,
                label: category.label(),
                rules: category.rules(),
            })
            .collect(),
    )
}

/// POST /api/v1/studio/prompt-preview
/// Returns the exact prompt a generate call with this body would send first.
pub async fn handle_prompt_preview(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerationPrompt>, AppError> {
    let existing = content_in_category(&state.db, req.category).await?;
    Ok(Json(req.prompt_builder(&existing).build()?))
}

/// POST /api/v1/studio/check-duplicates
pub async fn handle_check_duplicates(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Json(req): Json<CheckDuplicatesRequest>,
) -> Result<Json<DuplicateReport>, AppError> {
    if req.body.trim().is_empty() {
        return Err(AppError::Validation("body cannot be empty".to_string()));
    }
    let existing: Vec<ContentSample> = content_in_category(&state.db, req.category)
        .await?
        .iter()
        .map(ContentSample::from)
        .collect();
    let candidate = ContentSample {
        id: req.exclude_id,
        category: req.category.as_str().to_string(),
        title: req.title,
        body: req.body,
    };
    Ok(Json(state.detector.check(&candidate, &existing)))
}

/// GET /api/v1/studio/duplicates?category=
/// Pairwise scan of stored content, grouped by category.
pub async fn handle_scan_duplicates(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Query(params): Query<DuplicateScanQuery>,
) -> Result<Json<Vec<DuplicatePair>>, AppError> {
    let categories = match params.category.as_deref() {
        Some(c) => vec![c.parse::<ContentCategory>()?],
        None => ContentCategory::ALL.to_vec(),
    };

    let mut samples = Vec::new();
    for category in categories {
        let rows = content_in_category(&state.db, category).await?;
        samples.extend(rows.iter().map(ContentSample::from));
    }

    let pairs = state.detector.find_duplicates(&samples);
    info!(
        "Duplicate scan over {} item(s) found {} pair(s)",
        samples.len(),
        pairs.len()
    );
    Ok(Json(pairs))
}

/// POST /api/v1/studio/validate
pub async fn handle_validate(
    _auth: AuthAdmin,
    Json(req): Json<ValidateRequest>,
) -> Json<ContentValidation> {
    Json(validate_content(
        req.category,
        &req.content,
        req.primary_keyword.as_deref(),
    ))
}

/// POST /api/v1/studio/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Json(req): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<GenerateResponse>), AppError> {
    info!(
        "{} requested {} on '{}'",
        auth.admin.email, req.category, req.topic
    );
    let response = generate_content(
        &state.db,
        &state.llm,
        &state.detector,
        &req,
        auth.admin.id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// ────────────────────────────────────────────────────────────────────────────
// Stored content
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/studio/content
pub async fn handle_list_content(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Query(params): Query<ContentListQuery>,
) -> Result<Json<Vec<ContentItemRow>>, AppError> {
    let category = params
        .category
        .as_deref()
        .map(str::parse::<ContentCategory>)
        .transpose()?;
    if let Some(status) = params.status.as_deref() {
        if !matches!(status, "draft" | "published") {
            return Err(AppError::Validation(format!(
                "Unknown content status '{status}'"
            )));
        }
    }
    let page = PageParams {
        limit: params.limit,
        offset: params.offset,
    };
    Ok(Json(
        list_content(&state.db, category, params.status.as_deref(), page).await?,
    ))
}

/// GET /api/v1/studio/content/:id
pub async fn handle_get_content(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ContentItemRow>, AppError> {
    get_content(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Content {id} not found")))
}

/// DELETE /api/v1/studio/content/:id
pub async fn handle_delete_content(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !delete_content(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Content {id} not found")));
    }
    info!("Content {id} deleted by {}", auth.admin.email);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/studio/content/:id/publish
pub async fn handle_publish_content(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ContentItemRow>, AppError> {
    let item = publish_content(&state.db, &state.s3, &state.config.s3_bucket, id).await?;
    info!("Content {id} published by {}", auth.admin.email);
    Ok(Json(item))
}
