use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::builder::SnapshotBuilder;
use crate::cache::SnapshotCache;
use crate::error::RefreshError;

/**
    Shutdown signal sender type.
*/
pub type ShutdownSender = watch::Sender<bool>;
/**
    Shutdown signal receiver type.
*/
pub type ShutdownReceiver = watch::Receiver<bool>;

/**
    Create a shutdown signal channel.
*/
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    watch::channel(false)
}

/**
    Keeps the snapshot cache fresh.

    Runs one refresh synchronously at startup through [`refresh`], then
    one per interval from [`run`] until shutdown is signalled.

    [`refresh`]: RefreshScheduler::refresh
    [`run`]: RefreshScheduler::run
*/
pub struct RefreshScheduler {
    builder: SnapshotBuilder,
    cache: Arc<SnapshotCache>,
    station: String,
    interval: Duration,
}

impl RefreshScheduler {
    pub fn new(
        builder: SnapshotBuilder,
        cache: Arc<SnapshotCache>,
        station: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            builder,
            cache,
            station: station.into(),
            interval,
        }
    }

    /**
        Run a single refresh cycle, installing the result on success.

        On failure the cache is left exactly as it was.
    */
    pub async fn refresh(&self) -> Result<(), RefreshError> {
        let snapshot = self.builder.build(&self.station).await?;
        self.cache.replace(snapshot);
        Ok(())
    }

    /**
        Refresh on every tick until shutdown.

        A refresh still in flight when shutdown arrives is abandoned.
        The cache is only written once a cycle has fully built, so an
        abandoned cycle leaves the previous snapshot in place.
    */
    pub async fn run(self, mut shutdown_rx: ShutdownReceiver) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Refresh scheduler started"
        );

        // The startup refresh has just run, so the first tick is one interval out.
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                    continue;
                }
            }

            tokio::select! {
                result = self.refresh() => {
                    if let Err(e) = result {
                        tracing::warn!(
                            error = %e,
                            "Scheduled refresh failed, keeping previous snapshot"
                        );
                    }
                }
                _ = shutdown_rx.changed() => {
                    tracing::info!("Shutdown during refresh, abandoning cycle");
                    break;
                }
            }
        }

        tracing::info!("Refresh scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use crate::source::fake::FakeSource;

    use super::*;

    const INTERVAL: Duration = Duration::from_secs(30 * 60);

    fn scheduler(source: &Arc<FakeSource>, cache: &Arc<SnapshotCache>) -> RefreshScheduler {
        let builder = SnapshotBuilder::new(source.clone(), Duration::from_secs(5));
        RefreshScheduler::new(builder, cache.clone(), "wkrc", INTERVAL)
    }

    #[tokio::test]
    async fn test_failed_first_refresh_leaves_cache_empty() {
        let source = Arc::new(FakeSource::new(2, 2));
        source.fail_status(2);
        let cache = Arc::new(SnapshotCache::new());

        let result = scheduler(&source, &cache).refresh().await;

        assert!(result.is_err());
        assert!(cache.read().is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let source = Arc::new(FakeSource::new(2, 2));
        let cache = Arc::new(SnapshotCache::new());
        let scheduler = scheduler(&source, &cache);

        scheduler.refresh().await.unwrap();
        let before = cache.read().unwrap();

        source.set_channels(3);
        source.fail_status(2);
        assert!(scheduler.refresh().await.is_err());

        let after = cache.read().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.channel_count(), 2);
        assert_eq!(after.program_count, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_refresh_and_survive_failures() {
        let source = Arc::new(FakeSource::new(1, 1));
        let cache = Arc::new(SnapshotCache::new());
        let scheduler = scheduler(&source, &cache);
        scheduler.refresh().await.unwrap();

        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        // First tick fails; the scheduler keeps going with the old snapshot
        source.fail_guide(1);
        tokio::time::sleep(INTERVAL + Duration::from_secs(1)).await;
        assert_eq!(cache.read().unwrap().channel_count(), 1);
        assert!(!handle.is_finished());

        // Second tick succeeds with the new lineup
        source.recover();
        source.set_channels(4);
        tokio::time::sleep(INTERVAL).await;
        assert_eq!(cache.read().unwrap().channel_count(), 4);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_before_first_tick() {
        let source = Arc::new(FakeSource::new(1, 1));
        let cache = Arc::new(SnapshotCache::new());

        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let handle = tokio::spawn(scheduler(&source, &cache).run(shutdown_rx));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(source.calls(), 0);
        assert!(cache.read().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_abandons_refresh_in_flight() {
        let source = Arc::new(FakeSource::new(2, 1));
        let cache = Arc::new(SnapshotCache::new());

        let builder = SnapshotBuilder::new(source.clone(), Duration::from_secs(60 * 60));
        let scheduler = RefreshScheduler::new(builder, cache.clone(), "wkrc", INTERVAL);
        scheduler.refresh().await.unwrap();
        let before = cache.read().unwrap();

        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let handle = tokio::spawn(scheduler.run(shutdown_rx));

        // The next cycle gets stuck on its second status lookup
        source.set_channels(3);
        source.hang_status(2);
        tokio::time::sleep(INTERVAL + Duration::from_secs(1)).await;
        assert!(!handle.is_finished());

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("scheduler should stop without waiting for the stuck cycle")
            .unwrap();

        let after = cache.read().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.channel_count(), 2);
    }
}
