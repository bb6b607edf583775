//! Logging middleware
//!
//! Provides request logging functionality.

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use log::info;
use std::time::Instant;

/// Log method, route and outcome of every request.
///
/// Only the matched route template is logged, never the concrete URI: the
/// URI may carry a rejected path that must not end up in the logs.
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "<unmatched>".to_string());
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        "{} {} -> {} ({} ms)",
        method,
        route,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
