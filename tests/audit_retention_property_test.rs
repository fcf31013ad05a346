// ABOUTME: Property-based tests for audit retention invariants
// ABOUTME: Cap enforcement, newest-first survival, idempotence, and start protection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

mod common;

use atrium::audit::{AuditEventType, AuditFilter, AuditStore};
use common::{action_entry_at, start_entry_at};
use proptest::prelude::*;
use std::collections::HashSet;

/// Distinct timestamps in random order
fn arb_timestamps() -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::hash_set(0i64..1_000_000, 0..200)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

proptest! {
    #[test]
    fn retention_keeps_at_most_cap_and_only_the_newest(
        timestamps in arb_timestamps(),
        cap in 1usize..40,
    ) {
        let store = AuditStore::new(cap);
        let entries: Vec<_> = timestamps
            .iter()
            .enumerate()
            .map(|(i, &secs)| action_entry_at(&format!("sess-{i}"), secs))
            .collect();
        store.hydrate(entries);
        store.cleanup();

        let kept = store.query(&AuditFilter::default());
        prop_assert!(kept.len() <= cap);
        prop_assert_eq!(kept.len(), timestamps.len().min(cap));

        // survivors are exactly the newest timestamps
        let mut sorted = timestamps.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        let expected: HashSet<i64> = sorted.into_iter().take(cap).collect();
        for entry in &kept {
            prop_assert!(expected.contains(&entry.timestamp.timestamp()));
        }
    }

    #[test]
    fn cleanup_is_idempotent_for_any_collection(
        timestamps in arb_timestamps(),
        cap in 1usize..40,
    ) {
        let store = AuditStore::new(cap);
        let entries: Vec<_> = timestamps
            .iter()
            .enumerate()
            .map(|(i, &secs)| action_entry_at(&format!("sess-{i}"), secs))
            .collect();
        store.hydrate(entries);

        store.cleanup();
        let first: Vec<String> = store
            .query(&AuditFilter::default())
            .into_iter()
            .map(|e| e.id)
            .collect();

        store.cleanup();
        let second: Vec<String> = store
            .query(&AuditFilter::default())
            .into_iter()
            .map(|e| e.id)
            .collect();

        prop_assert_eq!(first, second);
    }

    #[test]
    fn open_session_start_survives_any_sweep(
        timestamps in arb_timestamps(),
        cap in 2usize..40,
    ) {
        // one open session START, strictly older than everything else
        let start = start_entry_at("in-flight", -1);
        let mut entries = vec![start];
        entries.extend(
            timestamps
                .iter()
                .enumerate()
                .map(|(i, &secs)| action_entry_at(&format!("sess-{i}"), secs)),
        );

        let store = AuditStore::new(cap);
        store.hydrate(entries);
        store.cleanup();

        let kept = store.query(&AuditFilter::default());
        prop_assert!(kept.len() <= cap);
        let kept_in_flight = kept.iter().any(|e| {
            e.entry_type == AuditEventType::SessionStart && e.session_id == "in-flight"
        });
        prop_assert!(kept_in_flight);
    }
}
