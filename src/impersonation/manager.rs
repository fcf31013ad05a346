// ABOUTME: Impersonation session lifecycle state machine
// ABOUTME: One active session at most; every transition emits one audit entry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

use crate::audit::{AuditEntry, AuditStore};
use crate::errors::{AppError, AppResult};
use crate::impersonation::session::{ActionRecord, ImpersonationSession, ImpersonationSummary};
use crate::models::{AdminIdentity, TargetIdentity};
use crate::network::{self, IpLookup, RequestMetadata};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info};

/// Owns the single active impersonation session.
///
/// The manager is an explicitly injected instance, not a process-wide
/// singleton: whatever layer dispatches user actions holds it by `Arc`.
/// All mutation is serialized through `start`, `log_action`, and `end`;
/// the state machine is Idle → Impersonating → Idle, and a second `start`
/// while Impersonating is rejected rather than queued.
pub struct SessionManager {
    audit: Arc<AuditStore>,
    ip_lookup: Arc<dyn IpLookup>,
    active: Mutex<Option<ImpersonationSession>>,
    current_route: RwLock<String>,
}

impl SessionManager {
    /// Manager starting in the Idle state
    #[must_use]
    pub fn new(audit: Arc<AuditStore>, ip_lookup: Arc<dyn IpLookup>) -> Self {
        Self {
            audit,
            ip_lookup,
            active: Mutex::new(None),
            current_route: RwLock::new(String::from("/")),
        }
    }

    /// Start impersonating `target` as `admin`.
    ///
    /// Client metadata resolution is best-effort: header facts win, the
    /// external lookup is the fallback, and the `"Unknown"` sentinel covers
    /// failure — the lookup never blocks or fails session creation.
    ///
    /// # Errors
    ///
    /// `AlreadyImpersonating` when a session is active; starting a second
    /// session requires ending the first.
    pub async fn start(
        &self,
        admin: AdminIdentity,
        target: TargetIdentity,
        reason: Option<String>,
        request: RequestMetadata,
    ) -> AppResult<ImpersonationSession> {
        if self.is_impersonating() {
            return Err(AppError::already_impersonating());
        }

        let client = network::resolve_client_metadata(&request, self.ip_lookup.as_ref()).await;
        let session = ImpersonationSession::new(admin, target, reason, client);

        {
            let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            if active.is_some() {
                return Err(AppError::already_impersonating());
            }
            *active = Some(session.clone());
        }

        self.audit.append(AuditEntry::session_start(
            &session.id,
            &session.admin,
            &session.target,
            &session.reason,
            &session.client,
        ));

        info!(
            admin_id = %session.admin.id,
            admin_email = %session.admin.email,
            target_user_id = %session.target.id,
            target_user_email = %session.target.email,
            session_id = %session.id,
            reason = %session.reason,
            ip_address = %session.client.ip_address,
            "impersonation session started"
        );

        Ok(session)
    }

    /// Record one action performed under borrowed identity.
    ///
    /// Benign no-op while Idle — callers may fire instrumentation
    /// unconditionally. Never fails the caller's primary action: the
    /// in-memory audit append is infallible and the durable write is
    /// fire-and-forget.
    pub fn log_action(
        &self,
        action_type: &str,
        details: Option<String>,
        payload: Option<serde_json::Value>,
    ) {
        let route = self
            .current_route
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let entry = {
            let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(session) = active.as_mut() else {
                return;
            };

            let record = ActionRecord::new(action_type, details, route, payload);
            let entry = AuditEntry::session_action(
                &session.id,
                &session.admin,
                &session.target,
                &record.action_type,
                record.details.as_deref(),
            );
            session.actions.push(record);
            entry
        };

        self.audit.append(entry);
        debug!(action = action_type, "impersonation action recorded");
    }

    /// End the active session and report its closing facts.
    ///
    /// Returns `None` while Idle. The active session is cleared before the
    /// durable audit append can possibly fail — an audit-sink outage must
    /// never trap an operator in a borrowed identity. Callers must then
    /// re-derive any identity-dependent state from the real admin identity.
    pub fn end(&self) -> Option<ImpersonationSummary> {
        let session = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;

        let summary = session.summary();
        self.audit.append(AuditEntry::session_end(
            &session.id,
            &session.admin,
            &session.target,
            summary.duration_ms,
            i64::try_from(summary.actions_performed).unwrap_or(i64::MAX),
        ));

        info!(
            admin_id = %session.admin.id,
            target_user_id = %session.target.id,
            session_id = %session.id,
            duration_ms = summary.duration_ms,
            actions_performed = summary.actions_performed,
            "impersonation session ended"
        );

        Some(summary)
    }

    /// Whether a session is currently active
    #[must_use]
    pub fn is_impersonating(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Snapshot of the active session, if any
    #[must_use]
    pub fn active_session(&self) -> Option<ImpersonationSession> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Record the current navigation path; `log_action` captures it at call
    /// time
    pub fn record_route(&self, path: &str) {
        let mut route = self
            .current_route
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *route = path.to_owned();
    }

    /// The most recently recorded navigation path
    #[must_use]
    pub fn current_route(&self) -> String {
        self.current_route
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The audit store this manager appends to
    #[must_use]
    pub fn audit_store(&self) -> &Arc<AuditStore> {
        &self.audit
    }
}
