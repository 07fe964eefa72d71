//! Live solar prediction dashboard: a rotating feed over fixed sites plus
//! one-off predictions for the user's own location.

pub mod cycler;
pub mod dashboard;
pub mod display;
pub mod error;
pub mod feed;
pub mod history;
pub mod resolver;

pub use cycler::{LocationCycler, DEFAULT_INTERVAL};
pub use dashboard::Dashboard;
pub use display::{DisplayPrediction, Trend, CONFIDENCE_MAX, CONFIDENCE_MIN};
pub use error::{DashboardError, ResolveError, FEED_FALLBACK_MESSAGE, RESOLVER_FALLBACK_MESSAGE};
pub use feed::{FeedSnapshot, FetchOutcome, LiveFeedController};
pub use history::{HistoryBuffer, ListEntry, DEFAULT_CAPACITY};
pub use resolver::{
    ManualAddress, ResolverResult, ResolverSnapshot, UserLocationResolver, DEVICE_LOCATION_LABEL,
};
