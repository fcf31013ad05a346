// ABOUTME: Effective-user read model derived from session manager state
// ABOUTME: Recomputed on every call; caching across start/end would leak identities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

use crate::impersonation::manager::SessionManager;
use crate::models::{AdminIdentity, TargetIdentity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// The identity the rest of the application should treat as currently acting
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectiveUser {
    /// The operator's own identity; no session is active
    Admin(AdminIdentity),
    /// The impersonated target's identity
    Impersonated(TargetIdentity),
}

impl EffectiveUser {
    /// Acting user id
    #[must_use]
    pub const fn id(&self) -> Uuid {
        match self {
            Self::Admin(admin) => admin.id,
            Self::Impersonated(target) => target.id,
        }
    }

    /// Acting user email
    #[must_use]
    pub fn email(&self) -> &str {
        match self {
            Self::Admin(admin) => &admin.email,
            Self::Impersonated(target) => &target.email,
        }
    }

    /// Whether the acting identity is borrowed
    #[must_use]
    pub const fn is_impersonated(&self) -> bool {
        matches!(self, Self::Impersonated(_))
    }
}

/// Data the UI banner shows while a session is active
#[derive(Debug, Clone, Serialize)]
pub struct ImpersonationBanner {
    /// Impersonated user's display name
    pub target_name: String,
    /// Impersonated user's email
    pub target_email: String,
    /// When the session started
    pub started_at: DateTime<Utc>,
    /// Stated reason
    pub reason: String,
    /// Actions recorded so far
    pub actions_recorded: usize,
}

/// Pure read model over the session manager.
///
/// Holds no state of its own; every accessor derives from the manager at
/// call time so a `start`/`end` transition is visible immediately.
#[derive(Clone)]
pub struct ImpersonationContext {
    manager: Arc<SessionManager>,
}

impl ImpersonationContext {
    /// Read model over the given manager
    #[must_use]
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self { manager }
    }

    /// The effective acting user: the target while impersonating, else the
    /// authenticated operator
    #[must_use]
    pub fn effective_user(&self, authenticated: AdminIdentity) -> EffectiveUser {
        match self.manager.active_session() {
            Some(session) => EffectiveUser::Impersonated(session.target),
            None => EffectiveUser::Admin(authenticated),
        }
    }

    /// Banner data for the active session, if any
    #[must_use]
    pub fn banner(&self) -> Option<ImpersonationBanner> {
        self.manager.active_session().map(|session| {
            ImpersonationBanner {
                target_name: session.target.full_name(),
                target_email: session.target.email.clone(),
                started_at: session.started_at,
                reason: session.reason.clone(),
                actions_recorded: session.actions.len(),
            }
        })
    }
}
