use serde::Serialize;

use crate::models::{ContextEntry, ExternalEvent};
use crate::store::{self, ContextStore};

/// A tracker event paired with the closest annotation inside the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedEvent {
    pub event: ExternalEvent,
    pub context: Option<ContextEntry>,
}

impl EnrichedEvent {
    pub fn context_text(&self) -> Option<&str> {
        self.context.as_ref().map(|entry| entry.context.as_str())
    }
}

/// Attaches the nearest context to each event. Output order follows `events`.
///
/// Matches what [`ContextStore::find_nearest`] would return per event, with the
/// day files read once for the whole batch.
pub fn enrich_events(
    store: &ContextStore,
    events: &[ExternalEvent],
    window_minutes: u32,
) -> Vec<EnrichedEvent> {
    let nearby = store.entries_around(events.iter().map(|e| e.timestamp), window_minutes);
    events
        .iter()
        .map(|event| EnrichedEvent {
            event: event.clone(),
            context: store::nearest(&nearby, event.timestamp, window_minutes).cloned(),
        })
        .collect()
}
