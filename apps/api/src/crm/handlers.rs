//! Axum route handlers for the client/contract admin.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::extract::AuthAdmin;
use crate::crm::clients::{
    delete_client, get_client, insert_client, list_clients, update_client, ClientInput,
};
use crate::crm::contracts::{
    create_contract, delete_contract, get_contract, list_contracts, transition_contract,
    ContractStatus, NewContract,
};
use crate::crm::ClientStatus;
use crate::errors::AppError;
use crate::leads::normalize::{is_valid_email, normalize_email};
use crate::models::crm::{ClientRow, ContractRow, PackageRow, UserRow};
use crate::pagination::PageParams;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ClientListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePackageRequest {
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub monthly_price_cents: i64,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContractListQuery {
    pub user_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContractStatusUpdate {
    pub status: ContractStatus,
}

// ────────────────────────────────────────────────────────────────────────────
// Clients
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/admin/clients
pub async fn handle_list_clients(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Query(params): Query<ClientListQuery>,
) -> Result<Json<Vec<ClientRow>>, AppError> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<ClientStatus>)
        .transpose()?;
    let page = PageParams {
        limit: params.limit,
        offset: params.offset,
    };
    Ok(Json(list_clients(&state.db, status, page).await?))
}

/// POST /api/v1/admin/clients
pub async fn handle_create_client(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Json(req): Json<ClientInput>,
) -> Result<(StatusCode, Json<ClientRow>), AppError> {
    let client = insert_client(&state.db, &req, None).await?;
    info!("Client {} created by {}", client.id, auth.admin.email);
    Ok((StatusCode::CREATED, Json(client)))
}

/// GET /api/v1/admin/clients/:id
pub async fn handle_get_client(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientRow>, AppError> {
    get_client(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Client {id} not found")))
}

/// PUT /api/v1/admin/clients/:id
pub async fn handle_update_client(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Path(id): Path<Uuid>,
    Json(req): Json<ClientInput>,
) -> Result<Json<ClientRow>, AppError> {
    let client = update_client(&state.db, id, &req)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Client {id} not found")))?;
    info!("Client {id} updated by {}", auth.admin.email);
    Ok(Json(client))
}

/// DELETE /api/v1/admin/clients/:id
pub async fn handle_delete_client(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !delete_client(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Client {id} not found")));
    }
    info!("Client {id} deleted by {}", auth.admin.email);
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Users
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/admin/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<UserRow>>, AppError> {
    let users = sqlx::query_as::<_, UserRow>(
        "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&state.db)
    .await?;
    Ok(Json(users))
}

/// POST /api/v1/admin/users
pub async fn handle_create_user(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserRow>), AppError> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        return Err(AppError::Validation("email is invalid".to_string()));
    }
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let user = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (id, email, name, company, phone) VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(req.name.trim())
    .bind(req.company.as_deref().map(str::trim))
    .bind(req.phone.as_deref().map(str::trim))
    .fetch_one(&state.db)
    .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/admin/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<UserRow>, AppError> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Packages
// ────────────────────────────────────────────────────────────────────────────

pub async fn active_packages(pool: &sqlx::PgPool) -> Result<Vec<PackageRow>, AppError> {
    let packages = sqlx::query_as::<_, PackageRow>(
        "SELECT * FROM packages WHERE active ORDER BY monthly_price_cents",
    )
    .fetch_all(pool)
    .await?;
    Ok(packages)
}

/// GET /api/v1/packages
pub async fn handle_public_packages(
    State(state): State<AppState>,
) -> Result<Json<Vec<PackageRow>>, AppError> {
    Ok(Json(active_packages(&state.db).await?))
}

/// GET /api/v1/admin/packages
pub async fn handle_list_packages(
    State(state): State<AppState>,
    _auth: AuthAdmin,
) -> Result<Json<Vec<PackageRow>>, AppError> {
    let packages =
        sqlx::query_as::<_, PackageRow>("SELECT * FROM packages ORDER BY monthly_price_cents")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(packages))
}

/// POST /api/v1/admin/packages
pub async fn handle_create_package(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Json(req): Json<CreatePackageRequest>,
) -> Result<(StatusCode, Json<PackageRow>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if req.monthly_price_cents < 0 {
        return Err(AppError::Validation(
            "monthly_price_cents cannot be negative".to_string(),
        ));
    }
    let slug = crate::slug::slugify(req.slug.as_deref().unwrap_or(&req.name));
    if slug.is_empty() {
        return Err(AppError::Validation(
            "slug must contain letters or digits".to_string(),
        ));
    }

    let package = sqlx::query_as::<_, PackageRow>(
        r#"
        INSERT INTO packages (id, name, slug, description, monthly_price_cents, features)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.name.trim())
    .bind(&slug)
    .bind(req.description.trim())
    .bind(req.monthly_price_cents)
    .bind(&req.features)
    .fetch_one(&state.db)
    .await?;

    info!("Package '{}' created by {}", package.slug, auth.admin.email);
    Ok((StatusCode::CREATED, Json(package)))
}

// ────────────────────────────────────────────────────────────────────────────
// Contracts
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/admin/contracts
pub async fn handle_list_contracts(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Query(params): Query<ContractListQuery>,
) -> Result<Json<Vec<ContractRow>>, AppError> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<ContractStatus>)
        .transpose()?;
    Ok(Json(list_contracts(&state.db, params.user_id, status).await?))
}

/// POST /api/v1/admin/contracts
pub async fn handle_create_contract(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Json(req): Json<NewContract>,
) -> Result<(StatusCode, Json<ContractRow>), AppError> {
    let contract = create_contract(&state.db, &req).await?;
    Ok((StatusCode::CREATED, Json(contract)))
}

/// GET /api/v1/admin/contracts/:id
pub async fn handle_get_contract(
    State(state): State<AppState>,
    _auth: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractRow>, AppError> {
    get_contract(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Contract {id} not found")))
}

/// PATCH /api/v1/admin/contracts/:id
pub async fn handle_update_contract_status(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Path(id): Path<Uuid>,
    Json(req): Json<ContractStatusUpdate>,
) -> Result<Json<ContractRow>, AppError> {
    let contract = transition_contract(&state.db, id, req.status).await?;
    info!("Contract {id} set to {} by {}", req.status, auth.admin.email);
    Ok(Json(contract))
}

/// DELETE /api/v1/admin/contracts/:id
pub async fn handle_delete_contract(
    State(state): State<AppState>,
    auth: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !delete_contract(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Contract {id} not found")));
    }
    info!("Contract {id} deleted by {}", auth.admin.email);
    Ok(StatusCode::NO_CONTENT)
}
