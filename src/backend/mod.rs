//! Hosted Backend Integration
//!
//! Talks to the managed backend that stores entries and streams changes.
//!
//! ## Architecture
//!
//! - **rest_query**: row API URLs, headers and error bodies
//! - **protocol**: change-feed frames (Phoenix channels)
//! - **rest**: native HTTP client for fetch / insert
//! - **realtime**: native WebSocket client for the change feed
//!
//! `rest_query` and `protocol` carry no runtime and are reused by the browser
//! front-end; the clients need the `native` feature.

pub mod protocol;
pub mod rest_query;

#[cfg(feature = "native")]
mod error;
#[cfg(feature = "native")]
mod realtime;
#[cfg(feature = "native")]
mod rest;

#[cfg(feature = "native")]
pub use error::BackendError;
#[cfg(feature = "native")]
pub use realtime::{FeedHandle, RealtimeClient};
#[cfg(feature = "native")]
pub use rest::RestClient;

use serde::Deserialize;
use std::time::Duration;

/// Connection settings for the hosted backend
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Project base URL (e.g. "https://abc.example.co")
    #[serde(default = "default_url")]
    pub url: String,

    /// Public API key sent with every request
    #[serde(default, alias = "anon_key")]
    pub api_key: String,

    #[serde(default = "default_schema")]
    pub schema: String,

    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_table() -> String {
    "form_entries".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_key: String::new(),
            schema: default_schema(),
            table: default_table(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Change-feed settings
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,

    /// Capacity of the per-subscription event buffer
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_heartbeat_interval() -> u64 {
    25
}

fn default_event_buffer() -> usize {
    256
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: default_heartbeat_interval(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl RealtimeConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }
}
