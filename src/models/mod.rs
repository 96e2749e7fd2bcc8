pub mod context_entry;
pub mod event;
pub mod timestamp;

pub use context_entry::ContextEntry;
pub use event::{Bucket, EventData, ExternalEvent, WINDOW_WATCHER_TYPE};
