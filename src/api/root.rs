//! Plain-text landing endpoints

/// GET /
pub async fn index() -> &'static str {
    "Hello, go to /docs to check out the endpoints"
}

/// GET /docs
pub async fn docs() -> &'static str {
    "Hello docs are coming soon"
}
