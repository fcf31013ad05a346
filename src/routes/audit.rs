// ABOUTME: Audit reporting routes for the administrative report screen
// ABOUTME: Structured filters, free-text search, and CSV export download
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

use crate::audit::{AuditEntry, AuditFilter, AuditQueryService};
use crate::context::ServerContext;
use crate::errors::AppError;
use axum::{
    body::Body,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

/// Query parameters accepted by the report endpoints
#[derive(Debug, Default, Deserialize)]
struct AuditReportQuery {
    #[serde(flatten)]
    filter: AuditFilter,
    /// Free-text search over admin email, target email, action, and details
    q: Option<String>,
}

/// Response for the audit report query
#[derive(Serialize)]
struct AuditReportResponse {
    entries: Vec<AuditEntry>,
    total_count: usize,
}

/// Audit reporting routes - super admin only, read-only
pub struct AuditRoutes;

impl AuditRoutes {
    /// Create all audit reporting routes
    #[must_use]
    pub fn routes() -> Router<ServerContext> {
        Router::new()
            .route("/api/admin/audit", get(Self::handle_query))
            .route("/api/admin/audit/export", get(Self::handle_export))
    }

    /// Handle a filtered, searched audit query
    async fn handle_query(
        State(context): State<ServerContext>,
        headers: HeaderMap,
        Query(params): Query<AuditReportQuery>,
    ) -> Result<Response, AppError> {
        let _admin = super::authenticate_super_admin(&headers, &context).await?;

        let entries = context
            .query_service()
            .search(&params.filter, params.q.as_deref());
        let total_count = entries.len();

        Ok((
            StatusCode::OK,
            Json(AuditReportResponse {
                entries,
                total_count,
            }),
        )
            .into_response())
    }

    /// Handle the CSV export download.
    ///
    /// The column set is fixed regardless of filter state, and the filename
    /// embeds the export date.
    async fn handle_export(
        State(context): State<ServerContext>,
        headers: HeaderMap,
        Query(params): Query<AuditReportQuery>,
    ) -> Result<Response, AppError> {
        let _admin = super::authenticate_super_admin(&headers, &context).await?;

        let service = context.query_service();
        let entries = service.search(&params.filter, params.q.as_deref());
        let csv = service.export_csv(&entries);
        let filename = AuditQueryService::export_filename(Utc::now().date_naive());

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
            .header(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            )
            .body(Body::from(csv))
            .map_err(|e| AppError::internal(format!("Failed to build export response: {e}")))
    }
}
