mod analysis;
mod auth;
mod config;
mod db;
mod errors;
mod jobs;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::documents::PgDocumentStore;
use crate::analysis::fetch::HttpDocumentFetcher;
use crate::config::{Config, S3Config};
use crate::db::create_pool;
use crate::jobs::cache::{NoopRecordCache, RecordCache, RedisRecordCache};
use crate::jobs::repository::PgJobRepository;
use crate::jobs::store::JobRecordStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobtrack API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // List cache: Redis when configured, otherwise every read hits Postgres
    let cache: Arc<dyn RecordCache> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!(
                "Redis list cache enabled (ttl {}s)",
                config.list_cache_ttl_secs
            );
            Arc::new(RedisRecordCache::new(client, config.list_cache_ttl_secs))
        }
        None => {
            info!("REDIS_URL not set, list cache disabled");
            Arc::new(NoopRecordCache)
        }
    };

    // S3 / MinIO for s3:// resume URLs
    let s3 = match &config.s3 {
        Some(s3_config) => {
            let client = build_s3_client(s3_config).await;
            info!("S3 client initialized ({})", s3_config.endpoint);
            Some(client)
        }
        None => None,
    };

    let fetcher = HttpDocumentFetcher::new(
        Duration::from_secs(config.document_download_timeout_secs),
        s3,
    )?;

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Build app state
    let state = AppState {
        jobs: JobRecordStore::new(Arc::new(PgJobRepository::new(db.clone())), cache),
        documents: Arc::new(PgDocumentStore::new(db)),
        fetcher: Arc::new(fetcher),
        model: Arc::new(llm),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.access_key_id,
        &config.secret_access_key,
        None,
        None,
        "jobtrack-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
