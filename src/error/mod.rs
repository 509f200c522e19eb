//! Error types shared by the HTTP handlers

pub mod types;

pub use types::ApiError;
