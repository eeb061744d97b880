//! Request extractors that gate admin routes.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::auth::session::{AdminRole, SessionAdmin, SESSION_COOKIE};
use crate::errors::AppError;
use crate::state::AppState;

/// Pulls the session token from the `agency_session` cookie, falling back to a bearer token.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string());

    from_cookie
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| t.trim().to_string())
        })
        .filter(|t| !t.is_empty())
}

/// An authenticated admin. Rejects with 401 when the session is missing or unknown.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub token: String,
    pub admin: SessionAdmin,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let admin = state
            .sessions
            .get(&token)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(AuthAdmin { token, admin })
    }
}

/// A superadmin. 401 without a session, 403 for any other role.
#[derive(Debug, Clone)]
pub struct RequireSuperadmin(pub AuthAdmin);

#[async_trait]
impl FromRequestParts<AppState> for RequireSuperadmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthAdmin::from_request_parts(parts, state).await?;
        if auth.admin.role != AdminRole::Superadmin {
            tracing::warn!(
                "Admin {} attempted a superadmin-only action",
                auth.admin.email
            );
            return Err(AppError::Forbidden);
        }
        Ok(RequireSuperadmin(auth))
    }
}
