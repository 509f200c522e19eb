//! Middleware module
//!
//! Contains HTTP middleware applied to every request.

pub mod logging;

pub use logging::{log_request, RequestId, REQUEST_ID_HEADER};
