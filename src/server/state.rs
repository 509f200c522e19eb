//! Application state container
//!
//! This module defines the shared application state that is passed
//! to all request handlers via Axum's state extraction.

use crate::config::Settings;
use crate::services::{TextExtractor, UpstreamClient, UpstreamConfig};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
///
/// Everything in here is built once at startup and only read afterwards,
/// so cloning it per request is just a handful of `Arc` bumps.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Client for the upstream AI provider
    pub upstream: Arc<UpstreamClient>,

    /// External text extractor
    pub text_extractor: Arc<TextExtractor>,

    /// Application start time (for uptime calculation)
    pub start_time: Instant,
}

impl AppState {
    /// Create a new application state
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let settings = Arc::new(settings);

        tracing::debug!(base_url = %settings.openai_base_url, "Creating upstream client");
        let upstream = Arc::new(UpstreamClient::new(UpstreamConfig::from(settings.as_ref()))?);

        tracing::debug!(
            program = %settings.text_extractor.program,
            args = ?settings.text_extractor.args,
            "Configuring text extractor"
        );
        let text_extractor = Arc::new(TextExtractor::from(&settings.text_extractor));

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            settings,
            upstream,
            text_extractor,
            start_time: Instant::now(),
        })
    }

    /// Get the application uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
