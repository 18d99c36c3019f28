//! Request metrics middleware

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppState;

/// Endpoint label for requests no route matched
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Middleware: record `(method, endpoint, status, duration)` for every request.
/// The endpoint is the route template, so label cardinality stays bounded.
pub async fn track_requests(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_ENDPOINT, |path| path.as_str())
        .to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let duration = started.elapsed();
    state
        .metrics
        .record_request(&method, &endpoint, response.status().as_u16(), duration);

    response
}
