use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::auth::session::SessionStore;
use crate::config::Config;
use crate::leads::store::LeadStore;
use crate::llm_client::LlmClient;
use crate::studio::similarity::DuplicateDetector;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Admin sessions. Redis in production.
    pub sessions: Arc<dyn SessionStore>,
    /// Lead sheet and blacklist.
    pub leads: Arc<dyn LeadStore>,
    pub s3: S3Client,
    pub llm: LlmClient,
    pub config: Config,
    pub detector: DuplicateDetector,
}
