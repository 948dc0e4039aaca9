//! Pending-order expiry scheduler
//!
//! A pending order holds reserved stock; without a bound it would hold it
//! forever if the handoff never happens. This task sweeps the pending index
//! on an interval and cancels (with restitution) orders older than the
//! configured TTL.

use super::manager::CheckoutManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Periodic sweeper over the pending-order index
pub struct ExpiryScheduler {
    manager: Arc<CheckoutManager>,
    sweep_interval: Duration,
    ttl: Duration,
    shutdown: CancellationToken,
}

impl ExpiryScheduler {
    pub fn new(
        manager: Arc<CheckoutManager>,
        sweep_interval: Duration,
        ttl: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            manager,
            sweep_interval,
            ttl,
            shutdown,
        }
    }

    /// Main loop: an immediate catch-up sweep, then periodic ticks
    pub async fn run(self) {
        tracing::info!(
            ttl_secs = self.ttl.as_secs(),
            interval_secs = self.sweep_interval.as_secs(),
            "Expiry scheduler started"
        );

        // The first tick fires immediately, which doubles as the startup
        // catch-up for orders that expired while the server was down.
        let mut ticker = tokio::time::interval(self.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => self.sweep().await,
            }
        }

        tracing::info!("Expiry scheduler stopped");
    }

    async fn sweep(&self) {
        let manager = self.manager.clone();
        let ttl_ms = self.ttl.as_millis() as i64;
        // Storage calls block; keep them off the async workers
        let swept = tokio::task::spawn_blocking(move || manager.sweep_expired(ttl_ms))
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Expiry sweep task panicked");
                0
            });
        if swept > 0 {
            tracing::info!(swept, "Expired pending orders canceled");
        }
    }
}
