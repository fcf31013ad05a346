// ABOUTME: In-memory impersonation session and its ordered action records
// ABOUTME: Deliberately not persistable; only audit projections are durable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

use crate::constants::impersonation::DEFAULT_REASON;
use crate::models::{AdminIdentity, ClientMetadata, TargetIdentity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One action performed while impersonating.
///
/// Immutable once appended; append order is chronological order. The route
/// and payload live only on this in-memory record, not in the audit
/// projection.
#[derive(Debug, Clone, Serialize)]
pub struct ActionRecord {
    /// Unique record identifier
    pub id: String,
    /// When the action was performed
    pub timestamp: DateTime<Utc>,
    /// Action type tag
    pub action_type: String,
    /// Human-readable details
    pub details: Option<String>,
    /// Navigation path current when the action fired
    pub route: String,
    /// Opaque structured data supplied by the instrumented caller
    pub payload: Option<serde_json::Value>,
}

impl ActionRecord {
    /// New record stamped with the current time
    #[must_use]
    pub fn new(
        action_type: &str,
        details: Option<String>,
        route: String,
        payload: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            action_type: action_type.to_owned(),
            details,
            route,
            payload,
        }
    }
}

/// The single active impersonation session.
///
/// Created by `SessionManager::start`, mutated only by appending actions,
/// destroyed by `SessionManager::end`. Intentionally implements `Serialize`
/// only — the live session is never written to durable storage, so there is
/// nothing to deserialize it from.
#[derive(Debug, Clone, Serialize)]
pub struct ImpersonationSession {
    /// Unique session identifier, generated at start
    pub id: String,
    /// The real, authenticated operator
    pub admin: AdminIdentity,
    /// The user being impersonated
    pub target: TargetIdentity,
    /// Stated reason, defaulted when absent
    pub reason: String,
    /// When impersonation started
    pub started_at: DateTime<Utc>,
    /// Client metadata resolved at start
    pub client: ClientMetadata,
    /// Actions performed so far, in append order
    pub actions: Vec<ActionRecord>,
}

impl ImpersonationSession {
    /// Create a new session starting now
    #[must_use]
    pub fn new(
        admin: AdminIdentity,
        target: TargetIdentity,
        reason: Option<String>,
        client: ClientMetadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            admin,
            target,
            reason: reason
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REASON.to_owned()),
            started_at: Utc::now(),
            client,
            actions: Vec::new(),
        }
    }

    /// Milliseconds elapsed since the session started
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }

    /// Closing facts reported when the session ends
    #[must_use]
    pub fn summary(&self) -> ImpersonationSummary {
        ImpersonationSummary {
            session_id: self.id.clone(),
            duration_ms: self.duration_ms(),
            actions_performed: self.actions.len(),
        }
    }
}

/// Closing facts of an ended session
#[derive(Debug, Clone, Serialize)]
pub struct ImpersonationSummary {
    /// Session the facts belong to
    pub session_id: String,
    /// Total session duration in milliseconds
    pub duration_ms: i64,
    /// Number of actions performed during the session
    pub actions_performed: usize,
}
