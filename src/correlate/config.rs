use crate::store::DEFAULT_WINDOW_MINUTES;

/// Tunables for matching tracker events against context annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationConfig {
    /// Symmetric margin around each event timestamp searched for a context
    pub window_minutes: u32,

    /// How many applications a summary keeps, longest first
    pub top_apps: usize,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            window_minutes: DEFAULT_WINDOW_MINUTES,
            top_apps: 10,
        }
    }
}
