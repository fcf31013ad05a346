// ABOUTME: HTTP route composition for the admin API
// ABOUTME: Impersonation lifecycle and audit reporting endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

use crate::auth::{self, UserAccount};
use crate::context::ServerContext;
use crate::errors::{AppError, AppResult};
use axum::middleware;
use axum::Router;
use http::HeaderMap;

/// Audit reporting endpoints
pub mod audit;

/// Impersonation lifecycle endpoints
pub mod impersonation;

/// Assemble the admin API router
#[must_use]
pub fn router(context: ServerContext) -> Router {
    Router::new()
        .merge(impersonation::ImpersonationRoutes::routes())
        .merge(audit::AuditRoutes::routes())
        .layer(middleware::from_fn_with_state(
            context.clone(),
            crate::middleware::track_route,
        ))
        .with_state(context)
}

/// Resolve the bearer token on a request to an authenticated account
pub(crate) async fn authenticate(
    headers: &HeaderMap,
    context: &ServerContext,
) -> AppResult<UserAccount> {
    let header = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::auth_invalid("Missing authorization header"))?;

    let token = auth::extract_bearer_token(header)?;
    context.identity().authenticate(token).await
}

/// Authenticate and require the super admin role
pub(crate) async fn authenticate_super_admin(
    headers: &HeaderMap,
    context: &ServerContext,
) -> AppResult<UserAccount> {
    let account = authenticate(headers, context).await?;

    if !account.role.is_super_admin() {
        return Err(AppError::permission_denied(
            "Super admin privileges required for impersonation",
        ));
    }

    Ok(account)
}
