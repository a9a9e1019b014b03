mod api;
mod middleware;
mod scheduler;
mod session;

use std::{sync::Arc, time::Duration};

use tracing_subscriber::EnvFilter;
use wbdash_core::SummaryCache;
use wbdash_marketplace::{MarketplaceClient, RefreshOutcome, Refresher};

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    session::SessionState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = wbdash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting wbdash-server");

    let catalog = Arc::new(wbdash_core::load_catalog(&config.catalog_path)?);
    tracing::info!(products = catalog.len(), path = %config.catalog_path.display(), "catalog loaded");

    let session = SessionState::from_config(&config)?;
    let client = MarketplaceClient::from_config(&config)?;
    let cache = Arc::new(SummaryCache::new());
    let refresher = Arc::new(Refresher::new(client, catalog, Arc::clone(&cache)));

    // First cycle completes before the listener binds.
    if refresher.refresh().await == RefreshOutcome::Failed {
        tracing::warn!("initial refresh failed; serving empty summaries until the next cycle");
    }

    let _scheduler = scheduler::build_scheduler(
        Arc::clone(&refresher),
        Duration::from_secs(config.refresh_minutes * 60),
    )
    .await?;

    let app = build_app(
        AppState {
            cache,
            session,
            static_dir: config.static_dir.clone(),
        },
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
