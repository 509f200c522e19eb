//! Application routing
//!
//! This module declares every endpoint of the relay in one route table and
//! wraps it with the HTTP middleware stack.

use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{chat_completions, embeddings, health, images, root, text};
use crate::middleware::logging::{log_request, REQUEST_ID_HEADER};
use crate::server::router::RouteTable;
use crate::server::state::AppState;

/// Build the route table with every relay endpoint
pub fn create_route_table() -> RouteTable<AppState> {
    RouteTable::new()
        .get("/", root::index)
        .get("/docs", root::docs)
        .get("/health", health::health_check)
        .post("/chatCompletion", chat_completions::chat_completion)
        .post("/generateImage", images::generate_image)
        .post("/createEmbedding", embeddings::create_embedding)
        .post("/getTextFromURL", text::text_from_url)
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let routes = create_route_table();
    tracing::debug!(route_count = routes.len(), "Route table built");

    routes
        .into_router(state)
        // Layer order: last added = outermost = runs first
        .layer(create_cors_layer())
        .layer(middleware::from_fn(log_request))
}

/// Create CORS layer with permissive settings
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([REQUEST_ID_HEADER])
}
