//! Market Cache - caching gateway for car-market analytics data
//!
//! Serves brand/model catalogs and trend series from the tiered cache,
//! falling through to the upstream analytics API on a miss.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use market_cache::api::create_router;
use market_cache::cache::{MarketCache, PrimaryStore, RedisStore, TieredCache};
use market_cache::origin::HttpOrigin;
use market_cache::{spawn_sweep_task, AppState, Config};

/// Lower bound on the time allowed to open the Redis connection.
const MIN_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Main entry point for the market cache gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the primary store, or run degraded without it
/// 4. Build the tiered cache, origin client and router
/// 5. Start the optional sweep task
/// 6. Serve until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "market_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting market cache gateway");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, redis={}, secondary_max_entries={}, origin={}, sweep_interval={}s",
        config.server_port,
        config.redis_url.as_deref().unwrap_or("none"),
        config.secondary_max_entries,
        config.origin_base_url,
        config.sweep_interval
    );

    let primary = connect_primary(&config).await;
    let tiers = Arc::new(TieredCache::new(
        primary,
        config.redis_timeout,
        config.secondary_max_entries,
    ));
    let cache = MarketCache::new(tiers.clone(), config.ttl_policy.clone());

    let origin = HttpOrigin::new(config.origin_base_url.clone(), config.origin_timeout)
        .context("building origin HTTP client")?;
    let state = AppState::from_parts(cache, Arc::new(origin));

    let sweep_handle = spawn_sweep_task(tiers, config.sweep_interval);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("serving HTTP")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Connects Redis when configured. A failure is logged and the process
/// runs on the secondary store alone.
async fn connect_primary(config: &Config) -> Option<Arc<dyn PrimaryStore>> {
    let url = config.redis_url.as_deref()?;
    let connect_timeout = config.redis_timeout.max(MIN_CONNECT_TIMEOUT);

    match RedisStore::connect(url, config.redis_key_prefix.clone(), connect_timeout).await {
        Ok(store) => Some(Arc::new(store) as Arc<dyn PrimaryStore>),
        Err(err) => {
            warn!(error = %err, "Redis unavailable, running on in-process cache only");
            None
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep task.
async fn shutdown_signal(sweep_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Sweep task aborted");
    }
}
