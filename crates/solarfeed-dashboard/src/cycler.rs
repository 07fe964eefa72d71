//! Round-robin rotation over the fixed feed locations.

use std::sync::Arc;
use std::time::Duration;

use solarfeed_core::Location;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::DashboardError;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Holds the location set and the index of the current one.
#[derive(Debug, Clone)]
pub struct LocationCycler {
    locations: Arc<[Location]>,
    index: usize,
}

impl LocationCycler {
    pub fn new(locations: Vec<Location>) -> Result<Self, DashboardError> {
        if locations.is_empty() {
            return Err(DashboardError::NoLocations);
        }
        Ok(Self {
            locations: locations.into(),
            index: 0,
        })
    }

    pub fn current(&self) -> &Location {
        &self.locations[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Move to the next location, wrapping around.
    pub fn advance(&mut self) -> &Location {
        self.index = (self.index + 1) % self.locations.len();
        self.current()
    }

    /// Run the rotation on a timer.
    ///
    /// The receiver starts at the current location, so subscribers see it
    /// immediately; every `period` afterwards the next one is published.
    /// The task ends when `cancel` fires or every receiver is dropped.
    /// A zero `period` is rejected.
    pub fn spawn(
        mut self,
        period: Duration,
        cancel: CancellationToken,
    ) -> Result<(watch::Receiver<Location>, JoinHandle<()>), DashboardError> {
        if period.is_zero() {
            return Err(DashboardError::ZeroInterval);
        }

        let (tx, rx) = watch::channel(self.current().clone());

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!("Location cycler cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        let next = self.advance().clone();
                        tracing::debug!("Cycling to {} ({})", next.name, self.index);
                        if tx.send(next).is_err() {
                            tracing::debug!("No subscribers left, stopping cycler");
                            break;
                        }
                    }
                }
            }
        });

        Ok((rx, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solarfeed_core::default_locations;

    #[test]
    fn test_starts_at_first_location() {
        let cycler = LocationCycler::new(default_locations()).unwrap();
        assert_eq!(cycler.index(), 0);
        assert_eq!(cycler.current().name, "Phoenix, AZ, USA");
    }

    #[test]
    fn test_five_ticks_return_to_start() {
        let mut cycler = LocationCycler::new(default_locations()).unwrap();
        let start = cycler.current().clone();

        let visited: Vec<String> = (0..5).map(|_| cycler.advance().name.clone()).collect();

        assert_eq!(cycler.current(), &start);
        assert_eq!(
            visited,
            vec![
                "Dubai, UAE",
                "Jodhpur, India",
                "Atacama Desert, Chile",
                "Alice Springs, Australia",
                "Phoenix, AZ, USA",
            ]
        );
    }

    #[test]
    fn test_empty_set_rejected() {
        assert!(matches!(
            LocationCycler::new(Vec::new()),
            Err(DashboardError::NoLocations)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_publishes_each_period() {
        let cycler = LocationCycler::new(default_locations()).unwrap();
        let cancel = CancellationToken::new();
        let (mut rx, handle) = cycler.spawn(DEFAULT_INTERVAL, cancel.clone()).unwrap();

        assert_eq!(rx.borrow_and_update().name, "Phoenix, AZ, USA");

        let started = Instant::now();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().name, "Dubai, UAE");
        assert!(started.elapsed() >= DEFAULT_INTERVAL);

        for _ in 0..4 {
            rx.changed().await.unwrap();
        }
        assert_eq!(rx.borrow_and_update().name, "Phoenix, AZ, USA");

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_publishing() {
        let cycler = LocationCycler::new(default_locations()).unwrap();
        let cancel = CancellationToken::new();
        let (mut rx, handle) = cycler.spawn(DEFAULT_INTERVAL, cancel.clone()).unwrap();

        cancel.cancel();
        handle.await.unwrap();

        // Sender dropped with the task
        assert!(rx.changed().await.is_err());
        assert_eq!(rx.borrow().name, "Phoenix, AZ, USA");
    }

    #[tokio::test]
    async fn test_zero_period_rejected() {
        let cycler = LocationCycler::new(default_locations()).unwrap();
        let result = cycler.spawn(Duration::ZERO, CancellationToken::new());
        assert!(matches!(result, Err(DashboardError::ZeroInterval)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_receiver_dropped() {
        let cycler = LocationCycler::new(default_locations()).unwrap();
        let (rx, handle) = cycler
            .spawn(Duration::from_secs(1), CancellationToken::new())
            .unwrap();
        drop(rx);
        handle.await.unwrap();
    }
}
