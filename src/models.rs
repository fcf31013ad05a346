// ABOUTME: Common data models for the multi-tenant dashboard
// ABOUTME: Roles, operator and target identities, and resolved client metadata
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

use crate::constants::impersonation::UNKNOWN_SENTINEL;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User role for the permission system (`super_admin`, `admin`, `user`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular dashboard user
    User,
    /// Tenant administrator
    Admin,
    /// Platform operator; the only role permitted to impersonate
    SuperAdmin,
}

impl UserRole {
    /// Stable string form used in API responses and audit rows
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Whether this role carries platform-operator privileges
    #[must_use]
    pub const fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Whether this role carries any administrative privileges
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The real, authenticated operator behind an impersonation session.
///
/// Immutable for the lifetime of a session; supplied by the external
/// authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    /// Unique user identifier
    pub id: Uuid,
    /// Operator email address
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

impl AdminIdentity {
    /// Display name for banners and audit summaries
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The user being impersonated.
///
/// Supplied at session start by the external user-lookup collaborator;
/// immutable for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetIdentity {
    /// Unique user identifier
    pub id: Uuid,
    /// Target user email address
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Role the target holds in their tenant
    pub role: UserRole,
}

impl TargetIdentity {
    /// Display name for banners and audit summaries
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Client metadata captured when a session starts.
///
/// Resolution is best-effort; either field degrades to the `"Unknown"`
/// sentinel rather than failing session creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMetadata {
    /// Client IP address, or the sentinel
    pub ip_address: String,
    /// Client user-agent string, or the sentinel
    pub user_agent: String,
}

impl ClientMetadata {
    /// Metadata with both fields set to the sentinel
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            ip_address: UNKNOWN_SENTINEL.to_owned(),
            user_agent: UNKNOWN_SENTINEL.to_owned(),
        }
    }
}
