use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use roomres::api;
use roomres::catalog::Catalog;
use roomres::config::Config;
use roomres::engine::Engine;
use roomres::ledger::Ledger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env()?;
    roomres::observability::init(config.metrics_port)?;

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("cannot create data dir {}", config.data_dir.display()))?;

    let catalog = Arc::new(Catalog::load(&config.catalog_path)?);
    let ledger = Arc::new(
        Ledger::open(config.wal_path())
            .with_context(|| format!("cannot open reservation log {}", config.wal_path().display()))?,
    );
    tokio::spawn(roomres::compactor::run_compactor(
        ledger.clone(),
        config.compact_threshold,
    ));

    let engine = Arc::new(Engine::new(catalog.clone(), catalog, ledger));
    let app = api::build_router(engine)
        .layer(TraceLayer::new_for_http())
        .layer(api::cors(&config.allowed_origins));

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    info!("roomres listening on {addr}");
    info!("  data_dir: {}", config.data_dir.display());
    info!("  catalog: {}", config.catalog_path.display());
    info!(
        "  metrics: {}",
        config
            .metrics_port
            .map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics"))
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    info!("roomres stopped");
    Ok(())
}

/// Resolves on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to register SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received, draining requests");
}
