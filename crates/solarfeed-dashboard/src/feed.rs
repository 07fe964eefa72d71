//! Live feed: fetch a prediction on every location change, decorate it and
//! append it to the history.

use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;
use solarfeed_core::Location;
use solarfeed_services::{PredictionClient, PredictionRequest};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::display::DisplayPrediction;
use crate::error::FEED_FALLBACK_MESSAGE;
use crate::history::HistoryBuffer;

/// What happened to one fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Appended to the history.
    Appended(DisplayPrediction),
    /// Recorded as the feed error.
    Failed(String),
    /// A newer fetch was issued first; the result was dropped.
    Stale,
    /// The feed was shut down; nothing was applied.
    Cancelled,
}

/// Point-in-time copy of the feed's read surface.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    /// Oldest first
    pub history: Vec<DisplayPrediction>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
struct FeedState {
    history: HistoryBuffer,
    loading: bool,
    error: Option<String>,
    /// Token of the most recently issued fetch
    latest_token: u64,
    next_sequence: u64,
}

/// Owns the history buffer and the feed's loading/error state.
/// Clones share state.
#[derive(Debug, Clone)]
pub struct LiveFeedController {
    client: PredictionClient,
    state: Arc<Mutex<FeedState>>,
    cancel: CancellationToken,
    updates: Arc<watch::Sender<u64>>,
}

impl LiveFeedController {
    pub fn new(client: PredictionClient, capacity: usize) -> Self {
        Self::with_cancel(client, capacity, CancellationToken::new())
    }

    /// Controller that goes inert once `cancel` fires.
    pub fn with_cancel(client: PredictionClient, capacity: usize, cancel: CancellationToken) -> Self {
        let (updates, _) = watch::channel(0);
        Self {
            client,
            state: Arc::new(Mutex::new(FeedState {
                history: HistoryBuffer::new(capacity),
                loading: false,
                error: None,
                latest_token: 0,
                next_sequence: 1,
            })),
            cancel,
            updates: Arc::new(updates),
        }
    }

    /// Fetch, decorate and append a prediction for `location`.
    ///
    /// Overlapping calls are allowed; only the most recently issued one may
    /// change state when it completes.
    pub async fn on_location_change(&self, location: &Location) -> FetchOutcome {
        if self.cancel.is_cancelled() {
            return FetchOutcome::Cancelled;
        }

        let token = {
            let mut state = self.state.lock();
            state.latest_token += 1;
            state.loading = true;
            state.error = None;
            state.latest_token
        };
        self.notify();

        tracing::debug!("Fetching prediction for {} (request {})", location.name, token);
        let request = PredictionRequest::from_location(location);

        let result = tokio::select! {
            _ = self.cancel.cancelled() => {
                tracing::debug!("Feed shut down during fetch for {}", location.name);
                return FetchOutcome::Cancelled;
            }
            result = self.client.predict_live(&request) => result,
        };

        let outcome = {
            let mut state = self.state.lock();

            if self.cancel.is_cancelled() {
                return FetchOutcome::Cancelled;
            }
            if token != state.latest_token {
                tracing::debug!(
                    "Dropping stale prediction for {} (request {}, latest {})",
                    location.name,
                    token,
                    state.latest_token
                );
                return FetchOutcome::Stale;
            }

            state.loading = false;
            match result {
                Ok(raw) => {
                    let sequence = state.next_sequence;
                    state.next_sequence += 1;
                    let item = DisplayPrediction::augment(
                        raw,
                        &location.name,
                        sequence,
                        Local::now(),
                        &mut rand::thread_rng(),
                    );
                    tracing::info!(
                        "{}: {:.2} W ({:?}, {:.1}%)",
                        item.location_name,
                        item.power_watts(),
                        item.trend,
                        item.confidence
                    );
                    state.history.push(item.clone());
                    FetchOutcome::Appended(item)
                }
                Err(e) => {
                    tracing::warn!("Prediction for {} failed: {}", location.name, e);
                    let message = e.display_message(FEED_FALLBACK_MESSAGE);
                    state.error = Some(message.clone());
                    FetchOutcome::Failed(message)
                }
            }
        };

        self.notify();
        outcome
    }

    /// Stop applying results. In-flight fetches finish as no-ops.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Completes once the feed has been shut down.
    pub async fn closed(&self) {
        self.cancel.cancelled().await;
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.state.lock();
        FeedSnapshot {
            history: state.history.to_vec(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// Run `f` against the history without copying it.
    pub fn with_history<R>(&self, f: impl FnOnce(&HistoryBuffer) -> R) -> R {
        f(&self.state.lock().history)
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Receiver whose value changes whenever the feed state does.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.updates.subscribe()
    }

    fn notify(&self) {
        self.updates.send_modify(|version| *version += 1);
    }
}
