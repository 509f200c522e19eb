//! Services module
//!
//! External collaborators: the upstream AI provider and the text extractor.

pub mod text_extractor;
pub mod upstream;

pub use text_extractor::{ExtractionError, TextExtractor, ACCESS_DENIED_MARKER};
pub use upstream::{UpstreamClient, UpstreamConfig, UpstreamError, UpstreamRequest};
