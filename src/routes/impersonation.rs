// ABOUTME: Impersonation routes for super admin users to view the system as another user
// ABOUTME: Provides secure impersonation with audit logging and session management
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

//! Impersonation Routes
//!
//! Endpoints for super admin users to impersonate other users. All
//! impersonation lifecycle transitions and actions are logged for audit
//! purposes.

use crate::context::ServerContext;
use crate::errors::AppError;
use crate::impersonation::{ImpersonationBanner, ImpersonationContext};
use crate::network::RequestMetadata;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Request body for starting impersonation
#[derive(Deserialize)]
struct StartImpersonationRequestBody {
    target_user_id: Uuid,
    reason: Option<String>,
}

/// Target user information echoed back on start
#[derive(Serialize)]
struct TargetUserInfo {
    id: String,
    email: String,
    display_name: String,
    role: String,
}

/// Response for starting impersonation
#[derive(Serialize)]
struct StartImpersonationResponse {
    success: bool,
    session_id: String,
    target_user: TargetUserInfo,
    message: String,
}

/// Response for ending impersonation
#[derive(Serialize)]
struct EndImpersonationResponse {
    success: bool,
    message: String,
    session_id: String,
    duration_ms: i64,
    actions_performed: usize,
}

/// Request body for the action instrumentation hook
#[derive(Deserialize)]
struct LogActionRequestBody {
    action_type: String,
    details: Option<String>,
    payload: Option<serde_json::Value>,
}

/// Response for the action instrumentation hook
#[derive(Serialize)]
struct LogActionResponse {
    success: bool,
}

/// Response describing the active session, if any
#[derive(Serialize)]
struct CurrentSessionResponse {
    active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<ImpersonationBanner>,
}

/// Impersonation routes - super admin only
pub struct ImpersonationRoutes;

impl ImpersonationRoutes {
    /// Create all impersonation routes
    #[must_use]
    pub fn routes() -> Router<ServerContext> {
        Router::new()
            .route(
                "/api/admin/impersonate",
                post(Self::handle_start_impersonation),
            )
            .route(
                "/api/admin/impersonate/end",
                post(Self::handle_end_impersonation),
            )
            .route("/api/admin/impersonate/action", post(Self::handle_log_action))
            .route(
                "/api/admin/impersonate/current",
                get(Self::handle_current_session),
            )
    }

    /// Handle starting an impersonation session
    async fn handle_start_impersonation(
        State(context): State<ServerContext>,
        headers: HeaderMap,
        Json(request): Json<StartImpersonationRequestBody>,
    ) -> Result<Response, AppError> {
        let admin = super::authenticate_super_admin(&headers, &context).await?;

        // Cannot impersonate yourself
        if request.target_user_id == admin.id {
            return Err(AppError::invalid_input("Cannot impersonate yourself"));
        }

        let target = context
            .identity()
            .get_user(request.target_user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Target user"))?;

        // Cannot impersonate another super admin
        if target.role.is_super_admin() {
            return Err(AppError::permission_denied(
                "Cannot impersonate another super admin",
            ));
        }

        let metadata = RequestMetadata::from_headers(&headers);
        let session = context
            .sessions()
            .start(
                admin.admin_identity(),
                target.target_identity(),
                request.reason,
                metadata,
            )
            .await?;

        Ok((
            StatusCode::OK,
            Json(StartImpersonationResponse {
                success: true,
                session_id: session.id,
                target_user: TargetUserInfo {
                    id: session.target.id.to_string(),
                    email: session.target.email,
                    display_name: format!(
                        "{} {}",
                        session.target.first_name, session.target.last_name
                    ),
                    role: session.target.role.as_str().to_owned(),
                },
                message: "Impersonation session started successfully".to_owned(),
            }),
        )
            .into_response())
    }

    /// Handle ending an impersonation session
    async fn handle_end_impersonation(
        State(context): State<ServerContext>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        // Any authenticated account may end: the operator acts under the
        // target's identity while impersonating
        let _account = super::authenticate(&headers, &context).await?;

        let Some(summary) = context.sessions().end() else {
            return Err(AppError::no_active_session());
        };

        Ok((
            StatusCode::OK,
            Json(EndImpersonationResponse {
                success: true,
                message: "Impersonation session ended successfully".to_owned(),
                session_id: summary.session_id.clone(),
                duration_ms: summary.duration_ms,
                actions_performed: summary.actions_performed,
            }),
        )
            .into_response())
    }

    /// Handle the action instrumentation hook.
    ///
    /// Always answers success: logging an action while no session is active
    /// is a benign no-op, and audit failures never propagate to the caller.
    async fn handle_log_action(
        State(context): State<ServerContext>,
        headers: HeaderMap,
        Json(request): Json<LogActionRequestBody>,
    ) -> Result<Response, AppError> {
        let _account = super::authenticate(&headers, &context).await?;

        context
            .sessions()
            .log_action(&request.action_type, request.details, request.payload);

        Ok((StatusCode::OK, Json(LogActionResponse { success: true })).into_response())
    }

    /// Handle describing the current session for the UI banner
    async fn handle_current_session(
        State(context): State<ServerContext>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let _admin = super::authenticate_super_admin(&headers, &context).await?;

        let banner = ImpersonationContext::new(Arc::clone(context.sessions())).banner();

        Ok((
            StatusCode::OK,
            Json(CurrentSessionResponse {
                active: banner.is_some(),
                session: banner,
            }),
        )
            .into_response())
    }
}
