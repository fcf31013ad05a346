// ABOUTME: Integration tests for the impersonation session lifecycle
// ABOUTME: State machine safety, audit trail shape, and the effective-user read model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

mod common;

use atrium::audit::{AuditEventType, AuditFilter, AuditStore};
use atrium::impersonation::{EffectiveUser, ImpersonationContext, SessionManager};
use atrium::errors::ErrorCode;
use atrium::network::RequestMetadata;
use common::{
    admin_identity, assert_sorted_desc, count_of, request_metadata, target_identity,
    FailingLookup, StaticLookup,
};
use std::sync::Arc;

fn manager_with_lookup(
    lookup: Arc<dyn atrium::network::IpLookup>,
) -> (Arc<AuditStore>, Arc<SessionManager>) {
    let store = Arc::new(AuditStore::new(1000));
    let manager = Arc::new(SessionManager::new(Arc::clone(&store), lookup));
    (store, manager)
}

fn manager() -> (Arc<AuditStore>, Arc<SessionManager>) {
    manager_with_lookup(Arc::new(StaticLookup("198.51.100.7")))
}

#[tokio::test]
async fn start_transitions_to_impersonating_and_audits() {
    let (store, manager) = manager();

    let session = manager
        .start(
            admin_identity(),
            target_identity(),
            Some("support ticket #42".into()),
            request_metadata(),
        )
        .await
        .unwrap();

    assert!(manager.is_impersonating());

    let entries = store.query(&AuditFilter::default());
    assert_eq!(entries.len(), 1);
    let start = &entries[0];
    assert_eq!(start.entry_type, AuditEventType::SessionStart);
    assert_eq!(start.session_id, session.id);
    assert_eq!(start.admin_email, "root@example.com");
    assert_eq!(start.target_user_email, "casey@example.com");
    assert_eq!(start.reason.as_deref(), Some("support ticket #42"));

    let metadata = start.client_metadata.as_ref().unwrap();
    assert_eq!(metadata.ip_address, "203.0.113.7");
    assert_eq!(metadata.user_agent, "atrium-tests/1.0");
}

#[tokio::test]
async fn double_start_is_rejected_without_touching_the_trail() {
    let (store, manager) = manager();

    manager
        .start(admin_identity(), target_identity(), None, request_metadata())
        .await
        .unwrap();

    let err = manager
        .start(admin_identity(), target_identity(), None, request_metadata())
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::AlreadyImpersonating);
    assert!(manager.is_impersonating());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn idle_operations_are_benign_no_ops() {
    let (store, manager) = manager();

    manager.log_action("view_dashboard", None, None);
    assert!(manager.end().is_none());

    assert!(!manager.is_impersonating());
    assert!(store.is_empty());
}

#[tokio::test]
async fn missing_reason_defaults_to_fixed_string() {
    let (store, manager) = manager();

    manager
        .start(admin_identity(), target_identity(), None, request_metadata())
        .await
        .unwrap();

    let entries = store.query(&AuditFilter::default());
    assert_eq!(entries[0].reason.as_deref(), Some("No reason provided"));
}

#[tokio::test]
async fn lookup_failure_substitutes_sentinel_and_start_succeeds() {
    let (store, manager) = manager_with_lookup(Arc::new(FailingLookup));

    manager
        .start(
            admin_identity(),
            target_identity(),
            None,
            RequestMetadata::default(),
        )
        .await
        .unwrap();

    let entries = store.query(&AuditFilter::default());
    let metadata = entries[0].client_metadata.as_ref().unwrap();
    assert_eq!(metadata.ip_address, "Unknown");
    assert_eq!(metadata.user_agent, "Unknown");
}

#[tokio::test]
async fn lookup_fallback_is_used_when_headers_are_silent() {
    let (store, manager) = manager();

    manager
        .start(
            admin_identity(),
            target_identity(),
            None,
            RequestMetadata::default(),
        )
        .await
        .unwrap();

    let entries = store.query(&AuditFilter::default());
    let metadata = entries[0].client_metadata.as_ref().unwrap();
    assert_eq!(metadata.ip_address, "198.51.100.7");
}

#[tokio::test]
async fn actions_capture_the_current_route() {
    let (_store, manager) = manager();

    manager
        .start(admin_identity(), target_identity(), None, request_metadata())
        .await
        .unwrap();

    manager.record_route("/billing/invoices");
    manager.log_action("open_invoice", Some("Invoice #9".into()), None);

    let session = manager.active_session().unwrap();
    assert_eq!(session.actions.len(), 1);
    assert_eq!(session.actions[0].route, "/billing/invoices");
    assert_eq!(session.actions[0].action_type, "open_invoice");
}

#[tokio::test]
async fn full_lifecycle_produces_a_bounded_consistent_trail() {
    let (store, manager) = manager();

    let session = manager
        .start(
            admin_identity(),
            target_identity(),
            Some("support ticket #42".into()),
            request_metadata(),
        )
        .await
        .unwrap();

    manager.log_action("update_profile", Some("Changed display name".into()), None);
    manager.log_action(
        "update_profile",
        Some("Changed notification settings".into()),
        Some(serde_json::json!({"channel": "email"})),
    );

    let summary = manager.end().unwrap();
    assert_eq!(summary.session_id, session.id);
    assert_eq!(summary.actions_performed, 2);
    assert!(summary.duration_ms >= 0);
    assert!(!manager.is_impersonating());

    let entries = store.query(&AuditFilter {
        session_id: Some(session.id.clone()),
        ..AuditFilter::default()
    });
    assert_eq!(entries.len(), 4);
    assert_eq!(count_of(&entries, AuditEventType::SessionStart), 1);
    assert_eq!(count_of(&entries, AuditEventType::SessionAction), 2);
    assert_eq!(count_of(&entries, AuditEventType::SessionEnd), 1);
    assert!(entries.iter().all(|e| e.session_id == session.id));
    assert_sorted_desc(&entries);

    let end = entries
        .iter()
        .find(|e| e.entry_type == AuditEventType::SessionEnd)
        .unwrap();
    assert_eq!(end.action_count, Some(2));
    assert_eq!(end.duration_ms, Some(summary.duration_ms));
}

#[tokio::test]
async fn end_while_idle_after_a_session_does_not_duplicate_the_end_entry() {
    let (store, manager) = manager();

    manager
        .start(admin_identity(), target_identity(), None, request_metadata())
        .await
        .unwrap();
    manager.end().unwrap();
    assert!(manager.end().is_none());

    let entries = store.query(&AuditFilter {
        entry_type: Some(AuditEventType::SessionEnd),
        ..AuditFilter::default()
    });
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn effective_user_follows_the_session_lifecycle() {
    let (_store, manager) = manager();
    let context = ImpersonationContext::new(Arc::clone(&manager));

    let before = context.effective_user(admin_identity());
    assert!(matches!(before, EffectiveUser::Admin(_)));

    manager
        .start(
            admin_identity(),
            target_identity(),
            Some("shadowing".into()),
            request_metadata(),
        )
        .await
        .unwrap();

    let during = context.effective_user(admin_identity());
    assert!(during.is_impersonated());
    assert_eq!(during.email(), "casey@example.com");

    let banner = context.banner().unwrap();
    assert_eq!(banner.target_email, "casey@example.com");
    assert_eq!(banner.reason, "shadowing");

    manager.end().unwrap();

    let after = context.effective_user(admin_identity());
    assert!(!after.is_impersonated());
    assert_eq!(after.email(), "root@example.com");
    assert!(context.banner().is_none());
}

#[tokio::test]
async fn restart_never_restores_a_live_session() {
    // Only audit projections survive a restart; a fresh manager always
    // starts Idle even when the store is hydrated with an open session's
    // START entry.
    let (store, _old_manager) = manager();
    store.append(common::start_entry_at("orphaned", 100));

    let fresh = SessionManager::new(Arc::clone(&store), Arc::new(StaticLookup("192.0.2.3")));
    assert!(!fresh.is_impersonating());
    assert!(fresh.active_session().is_none());
}
