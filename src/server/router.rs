//! Exact-match route table
//!
//! Maps a `(method, path)` pair to a handler. Paths are compared verbatim:
//! no wildcards, no parameters, no trailing-slash normalization. Registering
//! the same pair twice keeps the last handler. Every miss (unknown path,
//! known path with another method, unsupported HTTP method) produces the
//! same `404 Not found`.
//!
//! Handlers are ordinary axum handlers. The table is built mutably during
//! startup and then frozen by [`RouteTable::into_router`], after which it is
//! only ever read.

use axum::{
    extract::Request,
    handler::Handler,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Body sent for every unmatched request
pub const NOT_FOUND_BODY: &str = "Not found";

// ============================================================================
// Keys
// ============================================================================

/// HTTP methods a route can be registered under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RouteMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
            RouteMethod::Put => "PUT",
            RouteMethod::Patch => "PATCH",
            RouteMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&Method> for RouteMethod {
    type Error = ();

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        match *method {
            Method::GET => Ok(RouteMethod::Get),
            Method::POST => Ok(RouteMethod::Post),
            Method::PUT => Ok(RouteMethod::Put),
            Method::PATCH => Ok(RouteMethod::Patch),
            Method::DELETE => Ok(RouteMethod::Delete),
            _ => Err(()),
        }
    }
}

/// Returned by [`RouteTable::dispatch`] when nothing matches
#[derive(Debug, Clone, Error)]
#[error("no route for {method} {path}")]
pub struct RouteNotFound {
    pub method: Method,
    pub path: String,
}

// ============================================================================
// Handlers
// ============================================================================

type BoxedHandler<S> = Arc<dyn Fn(Request, S) -> BoxFuture<'static, Response> + Send + Sync>;

/// A type-erased handler stored in the table
pub struct RouteHandler<S> {
    inner: BoxedHandler<S>,
}

impl<S> Clone for RouteHandler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for RouteHandler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteHandler").finish_non_exhaustive()
    }
}

impl<S> RouteHandler<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn new<H, T>(handler: H) -> Self
    where
        H: Handler<T, S> + Sync,
        T: 'static,
    {
        Self {
            inner: Arc::new(move |request: Request, state: S| -> BoxFuture<'static, Response> {
                Box::pin(handler.clone().call(request, state))
            }),
        }
    }

    /// Run the handler to completion
    pub async fn call(&self, request: Request, state: S) -> Response {
        (self.inner)(request, state).await
    }
}

// ============================================================================
// Route table
// ============================================================================

/// Route table keyed by exact `(method, path)`
///
/// Paths are grouped per method so a lookup can borrow the request path.
pub struct RouteTable<S> {
    routes: HashMap<RouteMethod, HashMap<String, RouteHandler<S>>>,
}

impl<S> Default for RouteTable<S> {
    fn default() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }
}

impl<S> fmt::Debug for RouteTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routes: Vec<String> = self
            .routes
            .iter()
            .flat_map(|(method, paths)| paths.keys().map(move |path| format!("{} {}", method, path)))
            .collect();

        f.debug_struct("RouteTable").field("routes", &routes).finish()
    }
}

impl<S> RouteTable<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` and the exact `path`
    ///
    /// An existing handler for the same pair is replaced.
    pub fn register<H, T>(mut self, method: RouteMethod, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S> + Sync,
        T: 'static,
    {
        let path = path.into();
        let paths = self.routes.entry(method).or_default();

        if paths.contains_key(&path) {
            tracing::debug!(method = %method, path = %path, "Route handler replaced");
        }
        paths.insert(path, RouteHandler::new(handler));

        self
    }

    pub fn get<H, T>(self, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S> + Sync,
        T: 'static,
    {
        self.register(RouteMethod::Get, path, handler)
    }

    pub fn post<H, T>(self, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S> + Sync,
        T: 'static,
    {
        self.register(RouteMethod::Post, path, handler)
    }

    pub fn put<H, T>(self, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S> + Sync,
        T: 'static,
    {
        self.register(RouteMethod::Put, path, handler)
    }

    pub fn patch<H, T>(self, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S> + Sync,
        T: 'static,
    {
        self.register(RouteMethod::Patch, path, handler)
    }

    pub fn delete<H, T>(self, path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S> + Sync,
        T: 'static,
    {
        self.register(RouteMethod::Delete, path, handler)
    }

    /// Find the handler registered for exactly `method` and `path`
    pub fn dispatch(&self, method: &Method, path: &str) -> Result<&RouteHandler<S>, RouteNotFound> {
        self.lookup(method, path).ok_or_else(|| RouteNotFound {
            method: method.clone(),
            path: path.to_string(),
        })
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<&RouteHandler<S>> {
        let method = RouteMethod::try_from(method).ok()?;
        self.routes.get(&method)?.get(path)
    }

    /// Dispatch `request` and produce its response
    pub async fn serve(&self, state: S, request: Request) -> Response {
        match self.lookup(request.method(), request.uri().path()) {
            Some(handler) => handler.call(request, state).await,
            None => {
                tracing::debug!(method = %request.method(), path = %request.uri().path(), "No route matched");
                (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
            }
        }
    }

    /// Number of registered `(method, path)` pairs
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freeze the table and mount it as the whole of an axum router
    ///
    /// Every request reaching the returned router goes through
    /// [`RouteTable::serve`]; middleware layered on top still applies.
    pub fn into_router(self, state: S) -> axum::Router {
        let table = Arc::new(self);

        axum::Router::new().fallback(move |request: Request| {
            let table = Arc::clone(&table);
            let state = state.clone();
            async move { table.serve(state, request).await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::extract::State;

    async fn first() -> &'static str {
        "first"
    }

    async fn second() -> &'static str {
        "second"
    }

    fn request(method: Method, path: &str) -> Request {
        axum::http::Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_route_method_conversion() {
        assert_eq!(RouteMethod::try_from(&Method::GET), Ok(RouteMethod::Get));
        assert_eq!(RouteMethod::try_from(&Method::DELETE), Ok(RouteMethod::Delete));
        assert!(RouteMethod::try_from(&Method::HEAD).is_err());
        assert!(RouteMethod::try_from(&Method::OPTIONS).is_err());
        assert_eq!(RouteMethod::Patch.to_string(), "PATCH");
    }

    #[test]
    fn test_dispatch_exact_match_only() {
        let table: RouteTable<()> = RouteTable::new().get("/docs", first);

        assert!(table.dispatch(&Method::GET, "/docs").is_ok());
        assert!(table.dispatch(&Method::GET, "/docs/").is_err());
        assert!(table.dispatch(&Method::GET, "/DOCS").is_err());
        assert!(table.dispatch(&Method::GET, "/").is_err());
    }

    #[test]
    fn test_wrong_method_is_not_found() {
        let table: RouteTable<()> = RouteTable::new().post("/chatCompletion", first);

        let err = table.dispatch(&Method::GET, "/chatCompletion").unwrap_err();
        assert_eq!(err.method, Method::GET);
        assert_eq!(err.path, "/chatCompletion");
        assert!(table.dispatch(&Method::HEAD, "/chatCompletion").is_err());
    }

    #[test]
    fn test_each_verb_registers_under_itself() {
        let table: RouteTable<()> = RouteTable::new()
            .get("/item", first)
            .post("/item", first)
            .put("/item", first)
            .patch("/item", first)
            .delete("/item", first);

        assert_eq!(table.len(), 5);
        for method in [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            assert!(table.dispatch(&method, "/item").is_ok(), "{} missing", method);
        }
    }

    #[tokio::test]
    async fn test_same_path_under_several_methods_stays_separate() {
        let table: RouteTable<()> = RouteTable::new()
            .get("/item", first)
            .delete("/item", second)
            .get("/item", second);
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());

        let response = table.serve((), request(Method::GET, "/item")).await;
        assert_eq!(body_text(response).await, "second");

        let response = table.serve((), request(Method::DELETE, "/item")).await;
        assert_eq!(body_text(response).await, "second");

        let response = table.serve((), request(Method::PUT, "/item")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_dispatch_borrows_request_path() {
        let table: RouteTable<()> = RouteTable::new().post("/chatCompletion", first);
        let owned = String::from("/chatCompletion");

        assert!(table.dispatch(&Method::POST, owned.as_str()).is_ok());
        assert!(RouteTable::<()>::new().is_empty());
        assert_eq!(format!("{:?}", table), r#"RouteTable { routes: ["POST /chatCompletion"] }"#);
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let table: RouteTable<()> = RouteTable::new().get("/", first).get("/", second);
        assert_eq!(table.len(), 1);

        let response = table.serve((), request(Method::GET, "/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "second");
    }

    #[tokio::test]
    async fn test_serve_miss_is_plain_404() {
        let table: RouteTable<()> = RouteTable::new().get("/", first);

        for (method, path) in [(Method::GET, "/missing"), (Method::POST, "/"), (Method::HEAD, "/")] {
            let response = table.serve((), request(method, path)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(body_text(response).await, NOT_FOUND_BODY);
        }
    }

    #[tokio::test]
    async fn test_handlers_receive_state() {
        async fn greet(State(name): State<String>) -> String {
            format!("hello {}", name)
        }

        let table: RouteTable<String> = RouteTable::new().get("/greet", greet);
        let response = table
            .serve("relay".to_string(), request(Method::GET, "/greet"))
            .await;

        assert_eq!(body_text(response).await, "hello relay");
    }

    #[tokio::test]
    async fn test_into_router_routes_everything_through_table() {
        use tower::ServiceExt;

        let router = RouteTable::<()>::new().get("/", first).into_router(());

        let response = router
            .clone()
            .oneshot(request(Method::GET, "/"))
            .await
            .unwrap();
        assert_eq!(body_text(response).await, "first");

        let response = router.oneshot(request(Method::DELETE, "/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
