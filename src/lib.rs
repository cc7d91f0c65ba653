//! Core engine for the sentiment-analysis dashboard.
/// Backend HTTP client.
pub mod api;
/// Cooperative cancellation tokens.
pub mod cancel;
/// Backend connection configuration.
pub mod config;
/// Tracing subscriber setup.
pub mod logging;
/// Progress simulation and submission gating.
pub mod progress;
/// The results dataset engine: decode, store, query, analytics, export.
pub mod results;
/// Debounce and notification utilities.
pub mod util;
