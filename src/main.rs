//! Breast Cancer Risk Assessment - HTTP service entry point
//!
//! Loads the model artifact and normal-range table once, then serves the
//! scoring API. Startup aborts if either artifact cannot be loaded.

use anyhow::{Context, Result};
use breast_cancer_risk::{
    config::AppConfig,
    metrics::{AssessmentMetrics, MetricsReporter},
    models::{ModelArtifact, NormalRangeTable, RiskScorer},
    server::{self, AppState},
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load_from_path(&path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("breast_cancer_risk={}", config.logging.level).parse()?)
        .add_directive(format!("risk_server={}", config.logging.level).parse()?)
        .add_directive("tower_http=info".parse()?);
    if config.logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting Breast Cancer Risk Assessment service");
    info!(
        "Risk levels: low<{:.2}, moderate<{:.2}, high>={:.2}",
        config.risk_levels.moderate, config.risk_levels.high, config.risk_levels.high
    );

    // Artifacts are loaded exactly once; any failure ends the process here
    let artifact = ModelArtifact::load(&config.artifacts.model_path, config.artifacts.onnx_threads)
        .with_context(|| format!("Failed to load model artifact {}", config.artifacts.model_path))?;
    let ranges = NormalRangeTable::load(&config.artifacts.normal_ranges_path).with_context(|| {
        format!(
            "Failed to load normal ranges {}",
            config.artifacts.normal_ranges_path
        )
    })?;

    info!(
        model = artifact.model_name(),
        accuracy = artifact.accuracy(),
        features = artifact.feature_count(),
        "Model ready"
    );

    let scorer = Arc::new(RiskScorer::new(Arc::new(artifact), config.risk_levels));
    let metrics = Arc::new(AssessmentMetrics::new());

    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let state = AppState::new(scorer, Arc::new(ranges), metrics.clone());
    let app = server::router(state, config.server.allow_any_origin);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!("Listening on http://{}", config.server.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Service shutting down...");
    metrics.print_summary();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
