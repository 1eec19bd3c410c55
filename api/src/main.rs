//! Badge Analyzer
//!
//! Turns pushed or imported commits into skill promotions: one per detected
//! language and one per matching rule, forwarded to a collector service.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;

use adapters::{GithubClientImpl, HttpCollector};
use app::{CancelSignal, ImportService, LanguageAnalyzer, PromotionPipeline, RulesAnalyzer};
use config::Config;
use domain::ports::Collector;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PromotionPipeline<LanguageAnalyzer, RulesAnalyzer>>,
    pub importer: Arc<ImportService>,
    pub collector: Arc<dyn Collector>,
    /// Fired on shutdown; aborts running imports
    pub shutdown: CancelSignal,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/commit", post(handlers::commit_webhook))
        .route("/import", post(handlers::import_repository))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,badge_analyzer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting badge analyzer...");

    let config = Config::from_env().context("Invalid configuration")?;
    let rules = config.load_rules().context("Failed to load rules")?;

    // Create adapters
    let github = Arc::new(
        GithubClientImpl::new(
            config.github_api_url.clone(),
            config.github_credentials.clone(),
            config.http_timeout,
        )
        .context("Failed to build GitHub client")?,
    );
    let collector = Arc::new(
        HttpCollector::new(config.collector_api.clone(), config.http_timeout)
            .context("Failed to build collector client")?,
    );

    // Create application services
    let pipeline = Arc::new(PromotionPipeline::new(
        Arc::new(LanguageAnalyzer::new(
            config.source.clone(),
            config.default_amount,
        )),
        Arc::new(RulesAnalyzer::new(config.source.clone(), Arc::new(rules))),
    ));
    let importer = Arc::new(ImportService::new(github, config.import.clone()));

    let shutdown = CancelSignal::new();
    let state = AppState {
        pipeline,
        importer,
        collector,
        shutdown: shutdown.clone(),
    };

    let app = build_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(
        "Listening on {}, forwarding to {}",
        addr,
        config.collector_api
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM, cancelling running imports
async fn shutdown_signal(cancel: CancelSignal) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown requested, cancelling imports");
    cancel.cancel();
}
