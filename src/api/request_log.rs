use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::info;

/// Logs method, path, status and latency of every request.
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let started = Instant::now();

    let resp = next.run(req).await;

    info!(
        method = %method,
        uri = %uri,
        status = resp.status().as_u16(),
        elapsed_ms = elapsed_millis(started),
        "Request handled"
    );
    resp
}

fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
