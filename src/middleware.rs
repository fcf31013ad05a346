// ABOUTME: HTTP middleware recording the current navigation path
// ABOUTME: Lets log_action capture the route current at call time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

use crate::context::ServerContext;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

/// Record the request path on the session manager before handling.
///
/// Action instrumentation reads this back, so a `log_action` fired anywhere
/// in a handler carries the path that triggered it.
pub async fn track_route(
    State(context): State<ServerContext>,
    request: Request,
    next: Next,
) -> Response {
    context.sessions().record_route(request.uri().path());
    next.run(request).await
}
