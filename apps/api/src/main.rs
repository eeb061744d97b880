use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agency_api::auth::session::RedisSessionStore;
use agency_api::config::Config;
use agency_api::db::create_pool;
use agency_api::leads::store::PgLeadStore;
use agency_api::llm_client::{self, LlmClient};
use agency_api::routes::build_router;
use agency_api::state::AppState;
use agency_api::studio::similarity::DuplicateDetector;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "agency_api={},tower_http={}",
                &config.rust_log, &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Agency API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis-backed sessions
    let redis = redis::Client::open(config.redis_url.clone()).context("Invalid REDIS_URL")?;
    let sessions = Arc::new(RedisSessionStore::new(redis));
    info!("Session store initialized");

    // Leads live in Postgres alongside the CRM tables
    let leads = Arc::new(PgLeadStore::new(db.clone()));

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())
        .context("Failed to build LLM HTTP client")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let detector = DuplicateDetector::default();
    info!(
        "Duplicate detector: duplicate>={:.2} near>={:.2} title>={:.2}",
        detector.duplicate_threshold, detector.near_duplicate_threshold, detector.title_threshold
    );

    let state = AppState {
        db,
        sessions,
        leads,
        s3,
        llm,
        config: config.clone(),
        detector,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: restrict origins to SITE_URL once the admin UI is served from it
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "agency-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
