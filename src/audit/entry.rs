// ABOUTME: Durable audit entry schema for impersonation lifecycle and action events
// ABOUTME: Entries are content-immutable once created; only bulk eviction removes them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

use crate::models::{AdminIdentity, ClientMetadata, TargetIdentity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The lifecycle event an audit entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEventType {
    /// An impersonation session was started
    #[serde(rename = "SESSION_START")]
    SessionStart,
    /// An action was performed under borrowed identity
    #[serde(rename = "SESSION_ACTION")]
    SessionAction,
    /// An impersonation session was ended
    #[serde(rename = "SESSION_END")]
    SessionEnd,
}

impl AuditEventType {
    /// Stable string form, used in exports and the durable sink
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SessionStart => "SESSION_START",
            Self::SessionAction => "SESSION_ACTION",
            Self::SessionEnd => "SESSION_END",
        }
    }

    /// Parse the stable string form back into the enum
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SESSION_START" => Some(Self::SessionStart),
            "SESSION_ACTION" => Some(Self::SessionAction),
            "SESSION_END" => Some(Self::SessionEnd),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The durable, queryable projection of a lifecycle or action event.
///
/// For a given session, one `SESSION_START` and at most one `SESSION_END`
/// bound zero or more `SESSION_ACTION` entries, with non-decreasing
/// timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry identifier
    pub id: String,
    /// Event this entry records
    pub entry_type: AuditEventType,
    /// Session the event belongs to
    pub session_id: String,
    /// Operator who held the session
    pub admin_id: Uuid,
    /// Operator email, denormalized for reporting
    pub admin_email: String,
    /// Impersonated user
    pub target_user_id: Uuid,
    /// Impersonated user email, denormalized for reporting
    pub target_user_email: String,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// Stated reason (START only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Action type tag (ACTION only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Human-readable action details (ACTION only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Resolved client metadata (START only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_metadata: Option<ClientMetadata>,
    /// Session duration in milliseconds (END only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    /// Number of actions performed during the session (END only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_count: Option<i64>,
}

impl AuditEntry {
    fn base(
        entry_type: AuditEventType,
        session_id: &str,
        admin: &AdminIdentity,
        target: &TargetIdentity,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entry_type,
            session_id: session_id.to_owned(),
            admin_id: admin.id,
            admin_email: admin.email.clone(),
            target_user_id: target.id,
            target_user_email: target.email.clone(),
            timestamp: Utc::now(),
            reason: None,
            action: None,
            details: None,
            client_metadata: None,
            duration_ms: None,
            action_count: None,
        }
    }

    /// Entry recording the start of a session
    #[must_use]
    pub fn session_start(
        session_id: &str,
        admin: &AdminIdentity,
        target: &TargetIdentity,
        reason: &str,
        client: &ClientMetadata,
    ) -> Self {
        let mut entry = Self::base(AuditEventType::SessionStart, session_id, admin, target);
        entry.reason = Some(reason.to_owned());
        entry.client_metadata = Some(client.clone());
        entry
    }

    /// Entry recording one action taken under borrowed identity
    #[must_use]
    pub fn session_action(
        session_id: &str,
        admin: &AdminIdentity,
        target: &TargetIdentity,
        action_type: &str,
        details: Option<&str>,
    ) -> Self {
        let mut entry = Self::base(AuditEventType::SessionAction, session_id, admin, target);
        entry.action = Some(action_type.to_owned());
        entry.details = details.map(str::to_owned);
        entry
    }

    /// Entry recording the end of a session, with its closing facts
    #[must_use]
    pub fn session_end(
        session_id: &str,
        admin: &AdminIdentity,
        target: &TargetIdentity,
        duration_ms: i64,
        action_count: i64,
    ) -> Self {
        let mut entry = Self::base(AuditEventType::SessionEnd, session_id, admin, target);
        entry.duration_ms = Some(duration_ms);
        entry.action_count = Some(action_count);
        entry
    }
}
