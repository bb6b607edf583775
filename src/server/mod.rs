//! HTTP server
//!
//! Binds the file manager operations to HTTP routes, identifies the caller
//! of each request, and turns results into JSON or file responses.

pub mod core;
pub mod extract;
pub mod responses;
pub mod routes;

pub use self::core::Server;
pub use routes::{AppState, build_router};
