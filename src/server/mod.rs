//! Server module
//!
//! Contains the route table, application state, routing, and server
//! initialization logic.

pub mod app;
pub mod router;
pub mod routes;
pub mod state;

pub use app::App;
pub use router::{RouteMethod, RouteNotFound, RouteTable};
pub use state::AppState;
