//! HTTP API: server bootstrap, routing, middleware, and request/response
//! mapping onto the document/user/game services (spec §4.7–§4.10).

pub mod httpx;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;

pub use router::{build_app, build_app_with_validator};
pub use state::AppState;
