//! Context annotations for an ActivityWatch timeline.
//!
//! Notes are kept as one JSON file per local day under the data directory and
//! correlated with window-watcher events fetched from the tracker.

pub mod cli;
pub mod correlate;
pub mod error;
pub mod models;
pub mod settings;
pub mod store;
pub mod timeparse;
pub mod tracker;
pub mod utils;

pub use correlate::{enrich_events, summarize_by_app, AppSummary, CorrelationConfig, EnrichedEvent};
pub use error::{ContextError, ErrorKind, Result};
pub use models::{Bucket, ContextEntry, EventData, ExternalEvent};
pub use settings::Settings;
pub use store::ContextStore;
pub use timeparse::{parse_date_only, parse_datetime_or_natural, TimeParser, TimeRange};
pub use tracker::TrackerClient;

/// Process exit status for a failed command.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ContextError>().map(ContextError::kind) {
        Some(ErrorKind::Validation) => 2,
        _ => 1,
    }
}
