use std::collections::HashMap;
use std::str::FromStr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::Client as RedisClient;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;

pub const SESSION_COOKIE: &str = "agency_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    Superadmin,
    Admin,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Superadmin => "superadmin",
            AdminRole::Admin => "admin",
        }
    }
}

impl FromStr for AdminRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(AdminRole::Superadmin),
            "admin" => Ok(AdminRole::Admin),
            other => Err(AppError::Validation(format!("Unknown admin role '{other}'"))),
        }
    }
}

/// What a session remembers about the signed-in admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAdmin {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: AdminRole,
}

/// Storage for admin sessions keyed by opaque token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, admin: &SessionAdmin, ttl_secs: u64) -> Result<String, AppError>;
    async fn get(&self, token: &str) -> Result<Option<SessionAdmin>, AppError>;
    async fn destroy(&self, token: &str) -> Result<(), AppError>;
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

fn session_key(token: &str) -> String {
    format!("session:{token}")
}

/// Redis-backed sessions with server-side expiry.
#[derive(Clone)]
pub struct RedisSessionStore {
    client: RedisClient,
}

impl RedisSessionStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, admin: &SessionAdmin, ttl_secs: u64) -> Result<String, AppError> {
        let token = new_token();
        let payload = serde_json::to_string(admin)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize session: {e}")))?;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(session_key(&token))
            .arg(payload)
            .arg("EX")
            .arg(ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;

        debug!("Created session for admin {}", admin.id);
        Ok(token)
    }

    async fn get(&self, token: &str) -> Result<Option<SessionAdmin>, AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = redis::cmd("GET")
            .arg(session_key(token))
            .query_async(&mut conn)
            .await?;

        // A payload that no longer deserializes is treated as signed out.
        Ok(payload.and_then(|p| serde_json::from_str(&p).ok()))
    }

    async fn destroy(&self, token: &str) -> Result<(), AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("DEL")
            .arg(session_key(token))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}

/// Single-process session store for local development and tests.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, (SessionAdmin, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, admin: &SessionAdmin, ttl_secs: u64) -> Result<String, AppError> {
        let token = new_token();
        let expires = Instant::now() + Duration::from_secs(ttl_secs);
        self.sessions
            .write()
            .await
            .insert(token.clone(), (admin.clone(), expires));
        Ok(token)
    }

    async fn get(&self, token: &str) -> Result<Option<SessionAdmin>, AppError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(token)
            .filter(|(_, expires)| *expires > Instant::now())
            .map(|(admin, _)| admin.clone()))
    }

    async fn destroy(&self, token: &str) -> Result<(), AppError> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> SessionAdmin {
        SessionAdmin {
            id: Uuid::new_v4(),
            email: "ops@example-agency.com".to_string(),
            name: "Ops".to_string(),
            role: AdminRole::Admin,
        }
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("superadmin".parse::<AdminRole>().unwrap(), AdminRole::Superadmin);
        assert_eq!("admin".parse::<AdminRole>().unwrap(), AdminRole::Admin);
        assert!("owner".parse::<AdminRole>().is_err());
    }

    #[test]
    fn test_session_key_prefix() {
        assert_eq!(session_key("abc"), "session:abc");
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        let a = admin();
        let token = store.create(&a, 60).await.unwrap();
        assert_eq!(store.get(&token).await.unwrap(), Some(a));
        store.destroy(&token).await.unwrap();
        assert_eq!(store.get(&token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_expires() {
        let store = MemorySessionStore::new();
        let token = store.create(&admin(), 0).await.unwrap();
        assert_eq!(store.get(&token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_token_is_none() {
        let store = MemorySessionStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }
}
