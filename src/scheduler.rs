use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Something holding expiring entries that can be purged on demand
#[async_trait]
pub trait Sweep: Send + Sync {
    /// Removes expired entries and returns how many were removed
    async fn sweep(&self) -> usize;
}

/// Runs `target.sweep()` every `interval` until `cancel` fires.
///
/// The first sweep happens one full interval after spawning.
pub fn spawn_sweeper(
    name: &'static str,
    interval: Duration,
    target: Arc<dyn Sweep>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(sweeper = name, "sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = target.sweep().await;
                    if removed > 0 {
                        debug!(sweeper = name, removed, "evicted expired entries");
                    }
                }
            }
        }
    })
}
