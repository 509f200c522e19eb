//! Request and response schemas
//!
//! Wire types for the client-facing endpoints and the upstream provider.

pub mod openai;
