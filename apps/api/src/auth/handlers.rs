//! Axum route handlers for admin sessions and admin accounts.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::extract::{AuthAdmin, RequireSuperadmin};
use crate::auth::password::{hash_password, verify_password, MIN_PASSWORD_LEN};
use crate::auth::session::{AdminRole, SessionAdmin, SESSION_COOKIE};
use crate::errors::AppError;
use crate::models::admin::AdminRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub admin: SessionAdmin,
    /// Also set as an HttpOnly cookie; returned for non-browser clients.
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: AdminRole,
}

fn session_cookie(token: &str, max_age: u64, secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn set_cookie_headers(cookie: &str) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid cookie header: {e}")))?;
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "email and password are required".to_string(),
        ));
    }

    let admin = sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    let admin = match admin {
        Some(a) if verify_password(&req.password, &a.password_hash) => a,
        _ => {
            warn!("Failed login attempt for {email}");
            return Err(AppError::Unauthorized);
        }
    };

    let session = SessionAdmin {
        id: admin.id,
        email: admin.email,
        name: admin.name,
        role: admin.role.parse()?,
    };
    let ttl = state.config.session_ttl_secs;
    let token = state.sessions.create(&session, ttl).await?;
    info!("Admin {} signed in", session.email);

    let headers = set_cookie_headers(&session_cookie(&token, ttl, state.config.cookie_secure))?;
    Ok((
        headers,
        Json(LoginResponse {
            admin: session,
            token,
        }),
    )
        .into_response())
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    auth: AuthAdmin,
) -> Result<Response, AppError> {
    state.sessions.destroy(&auth.token).await?;
    info!("Admin {} signed out", auth.admin.email);
    let headers = set_cookie_headers(&session_cookie("", 0, state.config.cookie_secure))?;
    Ok((headers, StatusCode::NO_CONTENT).into_response())
}

/// GET /api/v1/auth/me
pub async fn handle_me(auth: AuthAdmin) -> Json<SessionAdmin> {
    Json(auth.admin)
}

/// GET /api/v1/admin/admins
pub async fn handle_list_admins(
    State(state): State<AppState>,
    _auth: RequireSuperadmin,
) -> Result<Json<Vec<AdminRow>>, AppError> {
    let admins = sqlx::query_as::<_, AdminRow>("SELECT * FROM admins ORDER BY created_at")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(admins))
}

/// POST /api/v1/admin/admins
pub async fn handle_create_admin(
    State(state): State<AppState>,
    RequireSuperadmin(auth): RequireSuperadmin,
    Json(req): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<AdminRow>), AppError> {
    let email = req.email.trim().to_lowercase();
    if !crate::leads::normalize::is_valid_email(&email) {
        return Err(AppError::Validation("email is invalid".to_string()));
    }
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let admin = sqlx::query_as::<_, AdminRow>(
        r#"
        INSERT INTO admins (id, email, name, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(req.name.trim())
    .bind(hash_password(&req.password))
    .bind(req.role.as_str())
    .fetch_one(&state.db)
    .await?;

    info!("Admin {} created by {}", admin.email, auth.admin.email);
    Ok((StatusCode::CREATED, Json(admin)))
}
