use std::collections::HashMap;

use serde::Serialize;

use crate::models::ExternalEvent;
use crate::store::{self, ContextStore};

/// Time spent in one application and the contexts recorded while using it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppSummary {
    pub app: String,
    pub total_secs: f64,
    pub event_count: usize,
    /// Distinct context texts, in order of first match.
    pub contexts: Vec<String>,
}

impl AppSummary {
    fn new(app: String) -> Self {
        Self {
            app,
            total_secs: 0.0,
            event_count: 0,
            contexts: Vec::new(),
        }
    }

    /// Whole minutes, rounded down.
    pub fn minutes(&self) -> u64 {
        (self.total_secs.max(0.0) / 60.0) as u64
    }

    fn record(&mut self, duration: f64, context: Option<String>) {
        self.total_secs += duration;
        self.event_count += 1;
        if let Some(text) = context {
            if !self.contexts.contains(&text) {
                self.contexts.push(text);
            }
        }
    }
}

/// Groups `events` by application name, longest total duration first.
/// Applications with equal totals keep the order they were first seen in.
pub fn summarize_by_app(
    store: &ContextStore,
    events: &[ExternalEvent],
    window_minutes: u32,
) -> Vec<AppSummary> {
    let nearby = store.entries_around(events.iter().map(|e| e.timestamp), window_minutes);
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<AppSummary> = Vec::new();

    for event in events {
        let app = event.data.app.as_str();
        let slot = *index.entry(app).or_insert_with(|| {
            summaries.push(AppSummary::new(app.to_string()));
            summaries.len() - 1
        });

        let context = store::nearest(&nearby, event.timestamp, window_minutes)
            .map(|entry| entry.context.clone());
        summaries[slot].record(event.duration, context);
    }

    summaries.sort_by(|a, b| b.total_secs.total_cmp(&a.total_secs));
    summaries
}
