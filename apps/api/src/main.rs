mod config;
mod errors;
mod intake;
mod llm_client;
mod models;
mod routes;
mod screening;
mod state;

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::intake::object_store::S3Fetcher;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::screening::batch::BatchRunner;
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

    info!("Starting screener v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Gemini client
    let gemini = GeminiClient::new(&config).context("Failed to build the Gemini HTTP client")?;
    info!(
        "Gemini client initialized (model: {}, attempts: {})",
        config.gemini_model, config.llm_max_attempts
    );

    // Initialize S3
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    let runner = BatchRunner::new(Arc::new(gemini), config.screening_concurrency);
    info!(
        "Screening up to {} resumes concurrently",
        config.screening_concurrency
    );

    let state = AppState {
        runner,
        fetcher: Arc::new(S3Fetcher::new(s3)),
        config: config.clone(),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// S3 client from the ambient AWS credential chain. `S3_ENDPOINT` switches to
/// path-style addressing for MinIO and other S3-compatible stores.
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.aws_region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    let sdk_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(config.s3_endpoint.is_some())
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}
