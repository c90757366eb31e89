//! Long-running reconciler process with graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::bootstrap::Services;
use crate::error::Result;
use crate::port::outbound::cache::ProductCache;

/// Run the stock reconciler until `shutdown` flips to `true`.
pub async fn run_with_shutdown(services: &Services, shutdown: watch::Receiver<bool>) -> Result<()> {
    let reconciler = services.reconciler().await?;
    let sweeper = spawn_sweeper(services, shutdown.clone());
    let result = reconciler.run(shutdown).await;
    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    result
}

/// Run the stock reconciler until Ctrl+C.
///
/// The signal only stops the loop between records; the record being
/// processed when it arrives is still committed.
pub async fn run(services: &Services) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reconciler = services.reconciler().await?;
    let sweeper = spawn_sweeper(services, shutdown_rx.clone());
    let mut handle = tokio::spawn(reconciler.run(shutdown_rx));

    let result = tokio::select! {
        result = &mut handle => result,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received (Ctrl+C)");
            let _ = shutdown_tx.send(true);
            handle.await
        }
    };

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    result?
}

fn spawn_sweeper(services: &Services, shutdown: watch::Receiver<bool>) -> Option<JoinHandle<()>> {
    let cache = &services.config().cache;
    if !cache.enabled {
        return None;
    }
    Some(tokio::spawn(sweep_cache(
        services.cache.clone(),
        cache.sweep_interval(),
        shutdown,
    )))
}

/// Drop expired cache entries every `every` until `shutdown` flips to
/// `true` or its sender is dropped.
pub async fn sweep_cache(
    cache: Arc<dyn ProductCache>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => match cache.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "Swept expired cache entries"),
                Err(e) => warn!(error = %e, "Cache sweep failed"),
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}
