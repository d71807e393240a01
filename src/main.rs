//! Notes Cache - process bootstrap
//!
//! Builds the shared object cache and the entity services once, keeps the
//! statistics reporter running, and tears everything down on shutdown.

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notes_cache::{spawn_stats_reporter, AppState, Config};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache and the services around it
/// 4. Start the background stats reporter
/// 5. Wait for SIGINT/SIGTERM and shut down
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notes_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting notes cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_capacity={}, stats_interval={}s",
        config.cache_capacity, config.stats_interval
    );

    let state = AppState::from_config(&config);
    info!("Object cache and services initialized");

    let reporter = (config.stats_interval > 0)
        .then(|| spawn_stats_reporter(state.cache.clone(), config.stats_interval));
    if reporter.is_none() {
        info!("Stats reporter disabled");
    }

    shutdown_signal().await?;

    if let Some(handle) = reporter {
        handle.abort();
        warn!("Stats reporter aborted");
    }

    let stats = state.cache.stats();
    info!(
        entries = stats.entries,
        hit_rate = stats.hit_rate(),
        "Shutdown complete"
    );
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() -> anyhow::Result<()> {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = ctrl_c => {
                result?;
                info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM, initiating shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await?;
        info!("Received Ctrl+C, initiating shutdown...");
    }

    Ok(())
}
