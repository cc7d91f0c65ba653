//! HTTP client for the sentiment backend.

pub mod client;
pub mod download;
pub(crate) mod http;
pub mod wire;

pub use client::{ApiClient, ApiError};
