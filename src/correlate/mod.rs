//! Joins tracker events with the context annotations recorded around them.
//!
//! Stateless. A batch of events reads the surrounding day files once through
//! [`ContextStore::entries_around`] and then picks matches in memory with the
//! same distance and tie rules as [`ContextStore::find_nearest`].
//!
//! [`ContextStore::entries_around`]: crate::store::ContextStore::entries_around
//! [`ContextStore::find_nearest`]: crate::store::ContextStore::find_nearest

pub mod config;
pub mod enrich;
pub mod summary;

pub use config::CorrelationConfig;
pub use enrich::{enrich_events, EnrichedEvent};
pub use summary::{summarize_by_app, AppSummary};
