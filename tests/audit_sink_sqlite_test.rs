// ABOUTME: Integration tests for the SQLite durable audit sink
// ABOUTME: Schema bootstrap, idempotent persistence, and startup hydration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

mod common;

use atrium::audit::{AuditEventType, DurableAuditSink, SqliteAuditSink};
use common::{action_entry_at, end_entry_at, start_entry_at};

async fn sink_in(dir: &tempfile::TempDir) -> SqliteAuditSink {
    let url = format!("sqlite://{}/audit.db", dir.path().display());
    SqliteAuditSink::new(&url).await.unwrap()
}

#[tokio::test]
async fn persist_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let sink = sink_in(&dir).await;

    let start = start_entry_at("sess", 1);
    let action = action_entry_at("sess", 2);
    let end = end_entry_at("sess", 3);

    sink.persist(&start).await.unwrap();
    sink.persist(&action).await.unwrap();
    sink.persist(&end).await.unwrap();

    let loaded = sink.load_recent(10).await.unwrap();
    assert_eq!(loaded.len(), 3);

    // newest first
    assert_eq!(loaded[0].entry_type, AuditEventType::SessionEnd);
    assert_eq!(loaded[2].entry_type, AuditEventType::SessionStart);

    // fields survive the round trip
    let restored_start = &loaded[2];
    assert_eq!(restored_start.id, start.id);
    assert_eq!(restored_start.session_id, "sess");
    assert_eq!(restored_start.admin_email, start.admin_email);
    assert_eq!(restored_start.reason, start.reason);
    assert_eq!(restored_start.client_metadata, start.client_metadata);
    assert_eq!(restored_start.timestamp, start.timestamp);

    let restored_end = &loaded[0];
    assert_eq!(restored_end.duration_ms, Some(1_000));
    assert_eq!(restored_end.action_count, Some(0));
}

#[tokio::test]
async fn load_recent_honors_the_limit_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let sink = sink_in(&dir).await;

    for secs in 0..10 {
        sink.persist(&action_entry_at("sess", secs)).await.unwrap();
    }

    let loaded = sink.load_recent(4).await.unwrap();
    assert_eq!(loaded.len(), 4);
    assert_eq!(loaded[0].timestamp.timestamp(), 9);
    assert_eq!(loaded[3].timestamp.timestamp(), 6);
}

#[tokio::test]
async fn redelivery_of_the_same_entry_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let sink = sink_in(&dir).await;

    let entry = action_entry_at("sess", 1);
    sink.persist(&entry).await.unwrap();
    sink.persist(&entry).await.unwrap();

    let loaded = sink.load_recent(10).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, entry.id);
}

#[tokio::test]
async fn sink_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();

    {
        let sink = sink_in(&dir).await;
        sink.persist(&action_entry_at("sess", 5)).await.unwrap();
    }

    // a fresh sink over the same file sees the persisted trail
    let reopened = sink_in(&dir).await;
    let loaded = reopened.load_recent(10).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].session_id, "sess");
}
