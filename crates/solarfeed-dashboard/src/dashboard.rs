//! Mount/unmount lifecycle tying the cycler to the live feed.

use std::time::Duration;

use solarfeed_core::{FeedConfig, Location};
use solarfeed_services::PredictionClient;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::cycler::LocationCycler;
use crate::error::DashboardError;
use crate::feed::LiveFeedController;

/// A running live feed.
///
/// Mounting starts the rotation timer and fetches for the first location
/// right away. Every later location change triggers one more fetch.
/// Dropping without `unmount` still stops the timer, but does not wait
/// for in-flight fetches.
#[derive(Debug)]
pub struct Dashboard {
    feed: LiveFeedController,
    locations: watch::Receiver<Location>,
    cancel: CancellationToken,
    tracker: TaskTracker,
    cycler: Option<JoinHandle<()>>,
}

impl Dashboard {
    pub fn mount(client: PredictionClient, config: &FeedConfig) -> Result<Self, DashboardError> {
        Self::mount_with(
            client,
            config.locations.clone(),
            Duration::from_secs(config.interval_secs),
            config.history_capacity,
        )
    }

    pub fn mount_with(
        client: PredictionClient,
        locations: Vec<Location>,
        period: Duration,
        capacity: usize,
    ) -> Result<Self, DashboardError> {
        let cycler = LocationCycler::new(locations)?;
        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();
        let feed = LiveFeedController::with_cancel(client, capacity, cancel.child_token());

        tracing::info!(
            "Mounting dashboard: {} locations, every {:?}",
            cycler.len(),
            period
        );

        let (locations, cycler) = cycler.spawn(period, cancel.child_token())?;
        tracker.spawn(drive(
            feed.clone(),
            locations.clone(),
            tracker.clone(),
            cancel.clone(),
        ));

        Ok(Self {
            feed,
            locations,
            cancel,
            tracker,
            cycler: Some(cycler),
        })
    }

    pub fn feed(&self) -> &LiveFeedController {
        &self.feed
    }

    /// The location currently shown.
    pub fn current_location(&self) -> Location {
        self.locations.borrow().clone()
    }

    /// Receiver of location changes.
    pub fn location_changes(&self) -> watch::Receiver<Location> {
        self.locations.clone()
    }

    /// Stop the timer and wait for every in-flight fetch to wind down.
    /// Nothing is applied to the feed after this returns.
    pub async fn unmount(mut self) {
        tracing::info!("Unmounting dashboard");
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;

        if let Some(cycler) = self.cycler.take() {
            if let Err(e) = cycler.await {
                tracing::warn!("Location cycler ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Issue one fetch per published location, starting with the current one.
async fn drive(
    feed: LiveFeedController,
    mut locations: watch::Receiver<Location>,
    tracker: TaskTracker,
    cancel: CancellationToken,
) {
    loop {
        let location = locations.borrow_and_update().clone();
        let task_feed = feed.clone();
        tracker.spawn(async move {
            task_feed.on_location_change(&location).await;
        });

        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = locations.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    tracing::debug!("Feed driver stopped");
}
