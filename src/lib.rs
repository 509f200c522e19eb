//! GenAI relay library
//!
//! Exact-match routing in front of an OpenAI-compatible provider, plus an
//! external text extractor.

// Public modules
pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod schemas;
pub mod server;
pub mod services;

// Re-export commonly used types
pub use config::Settings;
pub use error::ApiError;
pub use server::{App, AppState, RouteTable};
