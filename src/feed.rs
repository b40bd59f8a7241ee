//! Leaderboard feed spawns and manages the refresh task

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures::{Stream, StreamExt};
use tokio::sync::{Notify, watch};
use tokio::time::{MissedTickBehavior, interval};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::{DEFAULT_REFRESH_INTERVAL_SECS, Settings};
use crate::format::normalize_driver_name;
use crate::provider::TelemetryProvider;
use crate::transform::process_payload;
use crate::types::{CarClassRule, ProcessedLeaderboard};

/// Shortest accepted refresh interval.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// What the feed fetches and how often.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub server_url: String,
    pub class_rules: Vec<CarClassRule>,
    pub refresh_interval: Duration,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            class_rules: Vec::new(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
        }
    }
}

impl From<&Settings> for FeedOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            server_url: settings.server_url.clone(),
            class_rules: settings.car_classes.clone(),
            refresh_interval: settings.refresh_interval(),
        }
    }
}

/// Periodically refreshed leaderboard.
///
/// A background task owns the provider. It fetches once immediately, then on
/// every interval tick and on every [`refresh`](Self::refresh) request, and
/// publishes each result as a whole snapshot. Fetches never overlap; a refresh
/// requested during a fetch runs right after it.
///
/// Dropping the feed stops the task.
pub struct LeaderboardFeed {
    snapshots: watch::Receiver<Option<Arc<ProcessedLeaderboard>>>,
    refresh: Arc<Notify>,
    cancel: CancellationToken,
}

impl LeaderboardFeed {
    /// Spawn the refresh task for `provider`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<P>(provider: P, options: FeedOptions) -> Self
    where
        P: TelemetryProvider,
    {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let refresh = Arc::new(Notify::new());
        let cancel = CancellationToken::new();

        let task_refresh = Arc::clone(&refresh);
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            Self::refresh_task(provider, options, snapshot_tx, task_refresh, task_cancel).await;
        });

        Self { snapshots: snapshot_rx, refresh, cancel }
    }

    async fn refresh_task<P>(
        provider: P,
        options: FeedOptions,
        snapshot_tx: watch::Sender<Option<Arc<ProcessedLeaderboard>>>,
        refresh: Arc<Notify>,
        cancel: CancellationToken,
    ) where
        P: TelemetryProvider,
    {
        info!("Leaderboard feed started for {} (every {:?})", options.server_url, options.refresh_interval);

        let period = options.refresh_interval.max(MIN_REFRESH_INTERVAL);
        if period != options.refresh_interval {
            warn!("Refresh interval {:?} is below {:?}, using the minimum", options.refresh_interval, period);
        }
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut fetch_count = 0u64;

        loop {
            // First tick completes immediately
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => trace!("Refresh tick"),
                _ = refresh.notified() => {
                    debug!("Manual refresh requested");
                    ticker.reset();
                }
            }

            let snapshot = tokio::select! {
                _ = cancel.cancelled() => break,
                snapshot = fetch_snapshot(&provider, &options.server_url, &options.class_rules) => snapshot,
            };
            fetch_count += 1;

            if snapshot_tx.send(Some(Arc::new(snapshot))).is_err() {
                debug!("Snapshot receiver dropped, shutting down");
                break;
            }
        }

        info!("Leaderboard feed stopped after {} fetches", fetch_count);
    }

    /// Fetch again now instead of waiting for the next tick.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    /// Most recent snapshot, `None` until the first fetch completes.
    pub fn current(&self) -> Option<Arc<ProcessedLeaderboard>> {
        self.snapshots.borrow().clone()
    }

    /// Current snapshot (if any) followed by every new one.
    ///
    /// The stream ends when the feed task stops.
    pub fn updates(&self) -> impl Stream<Item = Arc<ProcessedLeaderboard>> + 'static {
        WatchStream::new(self.snapshots.clone()).filter_map(|snapshot| async move { snapshot })
    }

    /// Stop the refresh task.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for LeaderboardFeed {
    fn drop(&mut self) {
        debug!("Dropping leaderboard feed");
        self.cancel.cancel();
    }
}

/// Fetch and process one snapshot.
///
/// Driver names are normalized for display. A failed fetch yields an empty
/// snapshot carrying the error message.
pub async fn fetch_snapshot<P>(provider: &P, server_url: &str, class_rules: &[CarClassRule]) -> ProcessedLeaderboard
where
    P: TelemetryProvider + ?Sized,
{
    match provider.fetch_leaderboard(server_url).await {
        Ok(data) => {
            let mut snapshot = process_payload(&data, class_rules);
            for entry in &mut snapshot.leaderboard {
                entry.driver_name = normalize_driver_name(&entry.driver_name);
            }
            snapshot.last_update_unix_ms = unix_now_ms();

            debug!("Leaderboard refreshed: {} entries on {}", snapshot.leaderboard.len(), snapshot.track);
            snapshot
        }
        Err(e) => {
            warn!("Failed to fetch leaderboard from {}: {}", server_url, e);
            ProcessedLeaderboard::failed(e.to_string())
        }
    }
}

fn unix_now_ms() -> Option<u64> {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    u64::try_from(elapsed.as_millis()).ok()
}
