//! Client for the activity tracker's REST API (`/api/0`).

pub mod client;

pub use client::{TrackerClient, DEFAULT_EVENT_LIMIT};
