use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use autoapply::classifier::HttpClassifier;
use autoapply::config::Config;
use autoapply::extraction::PdfTextExtractor;
use autoapply::routes::build_router;
use autoapply::state::AppState;
use autoapply::storage::JsonFileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("autoapply={0},autoapply_api={0}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AutoApply API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize classifier client
    let classifier = HttpClassifier::new(
        config.classifier_url.clone(),
        config.classifier_token.clone(),
        config.classifier_timeout,
    )
    .context("failed to build classifier client")?;
    info!(
        "Classifier client initialized ({}, timeout {:?})",
        config.classifier_url, config.classifier_timeout
    );

    // Initialize local storage (profile and application history)
    let store = Arc::new(JsonFileStore::new(&config.data_dir));
    info!(
        "Local store at {} (history in {})",
        store.path().display(),
        store.applications_path().display()
    );

    let state = AppState {
        config: config.clone(),
        classifier: Arc::new(classifier),
        documents: Arc::new(PdfTextExtractor),
        store: store.clone(),
        applications: store,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
