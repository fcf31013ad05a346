// ABOUTME: Shared fixtures for integration tests
// ABOUTME: Identity fixtures, stub lookups, and audit entry builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

#![allow(dead_code)] // each test binary uses a subset of these fixtures

use async_trait::async_trait;
use atrium::audit::{AuditEntry, AuditEventType};
use atrium::auth::{StaticDirectory, UserAccount};
use atrium::errors::{AppError, AppResult};
use atrium::models::{AdminIdentity, ClientMetadata, TargetIdentity, UserRole};
use atrium::network::{IpLookup, RequestMetadata};
use chrono::{TimeZone, Utc};
use uuid::Uuid;

pub const SUPER_ADMIN_ID: &str = "6a1f8f3e-98a1-4f3d-9c1e-0f6f4be11111";
pub const SECOND_SUPER_ADMIN_ID: &str = "6a1f8f3e-98a1-4f3d-9c1e-0f6f4be22222";
pub const MEMBER_ID: &str = "6a1f8f3e-98a1-4f3d-9c1e-0f6f4be33333";

pub const SUPER_ADMIN_TOKEN: &str = "super-admin-token";
pub const MEMBER_TOKEN: &str = "member-token";

/// IP lookup stub returning a fixed address
pub struct StaticLookup(pub &'static str);

#[async_trait]
impl IpLookup for StaticLookup {
    async fn public_ip(&self) -> AppResult<String> {
        Ok(self.0.to_owned())
    }
}

/// IP lookup stub that is always unavailable
pub struct FailingLookup;

#[async_trait]
impl IpLookup for FailingLookup {
    async fn public_ip(&self) -> AppResult<String> {
        Err(AppError::lookup_unavailable("lookup offline"))
    }
}

pub fn super_admin_account() -> UserAccount {
    UserAccount {
        id: Uuid::parse_str(SUPER_ADMIN_ID).unwrap(),
        email: "root@example.com".into(),
        first_name: "Rowan".into(),
        last_name: "Ops".into(),
        role: UserRole::SuperAdmin,
    }
}

pub fn second_super_admin_account() -> UserAccount {
    UserAccount {
        id: Uuid::parse_str(SECOND_SUPER_ADMIN_ID).unwrap(),
        email: "root2@example.com".into(),
        first_name: "Sasha".into(),
        last_name: "Ops".into(),
        role: UserRole::SuperAdmin,
    }
}

pub fn member_account() -> UserAccount {
    UserAccount {
        id: Uuid::parse_str(MEMBER_ID).unwrap(),
        email: "casey@example.com".into(),
        first_name: "Casey".into(),
        last_name: "Member".into(),
        role: UserRole::User,
    }
}

pub fn admin_identity() -> AdminIdentity {
    super_admin_account().admin_identity()
}

pub fn target_identity() -> TargetIdentity {
    member_account().target_identity()
}

/// Directory with a super admin, a second super admin, and a member
pub fn directory() -> StaticDirectory {
    let mut directory = StaticDirectory::new();
    directory.insert(SUPER_ADMIN_TOKEN, super_admin_account());
    directory.insert("second-super-admin-token", second_super_admin_account());
    directory.insert(MEMBER_TOKEN, member_account());
    directory
}

/// Request metadata with a forwarded client address
pub fn request_metadata() -> RequestMetadata {
    RequestMetadata {
        forwarded_for: Some("203.0.113.7".into()),
        real_ip: None,
        remote_addr: None,
        user_agent: Some("atrium-tests/1.0".into()),
    }
}

/// An action entry stamped at `secs` since the epoch
pub fn action_entry_at(session_id: &str, secs: i64) -> AuditEntry {
    let mut entry = AuditEntry::session_action(
        session_id,
        &admin_identity(),
        &target_identity(),
        "view_dashboard",
        None,
    );
    entry.timestamp = Utc.timestamp_opt(secs, 0).unwrap();
    entry
}

/// A start entry stamped at `secs` since the epoch
pub fn start_entry_at(session_id: &str, secs: i64) -> AuditEntry {
    let mut entry = AuditEntry::session_start(
        session_id,
        &admin_identity(),
        &target_identity(),
        "routine check",
        &ClientMetadata::unknown(),
    );
    entry.timestamp = Utc.timestamp_opt(secs, 0).unwrap();
    entry
}

/// An end entry stamped at `secs` since the epoch
pub fn end_entry_at(session_id: &str, secs: i64) -> AuditEntry {
    let mut entry =
        AuditEntry::session_end(session_id, &admin_identity(), &target_identity(), 1_000, 0);
    entry.timestamp = Utc.timestamp_opt(secs, 0).unwrap();
    entry
}

/// Assert that entries are sorted by timestamp descending
pub fn assert_sorted_desc(entries: &[AuditEntry]) {
    for pair in entries.windows(2) {
        assert!(
            pair[0].timestamp >= pair[1].timestamp,
            "entries not sorted descending: {} before {}",
            pair[0].timestamp,
            pair[1].timestamp
        );
    }
}

/// Shorthand for an event-type check
pub fn count_of(entries: &[AuditEntry], entry_type: AuditEventType) -> usize {
    entries
        .iter()
        .filter(|e| e.entry_type == entry_type)
        .count()
}
