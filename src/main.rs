use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;

use adeylink_api::config::{self, StoreBackend};
use adeylink_api::events::{self, EventSender};
use adeylink_api::services::DispatchWindowEstimator;
use adeylink_api::store::{MemoryStore, RecordStore, RedisStore};
use adeylink_api::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::load_config().context("failed to load configuration")?;
    config::init_tracing(&app_config);

    let store: Arc<dyn RecordStore> = match app_config.store_backend {
        StoreBackend::Memory => {
            info!("using in-memory record store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Redis => {
            info!(url = %app_config.redis_url, "connecting to redis record store");
            Arc::new(
                RedisStore::connect(&app_config.redis_url)
                    .await
                    .context("failed to connect to redis")?,
            )
        }
    };

    let (tx, rx) = mpsc::channel(1024);
    tokio::spawn(events::process_events(rx));

    let state = AppState::new(
        Arc::new(app_config.clone()),
        store,
        Arc::new(DispatchWindowEstimator),
        EventSender::new(tx),
    );
    let app = app_router(state);

    let addr = format!("{}:{}", app_config.host, app_config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, environment = %app_config.environment, "marketplace API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
