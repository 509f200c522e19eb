//! Shared helpers for HTTP-level tests

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use genai_relay::config::{Settings, TextExtractorConfig};
use genai_relay::server::{routes::create_router, AppState};
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "sk-test";

/// Settings pointing the upstream client at `base_url`
pub fn test_settings(base_url: &str) -> Settings {
    Settings {
        openai_api_key: TEST_API_KEY.to_string(),
        openai_base_url: base_url.to_string(),
        text_extractor: TextExtractorConfig {
            program: "echo".to_string(),
            args: vec![],
        },
        ..Settings::default()
    }
}

pub fn router_for(settings: Settings) -> Router {
    let state = AppState::new(settings).expect("Failed to build app state");
    create_router(state)
}

/// Send one request and collect status plus body text
pub async fn send(router: &Router, method: Method, path: &str, body: Option<&str>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(path);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, String::from_utf8(bytes.to_vec()).unwrap())
}
