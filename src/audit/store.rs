// ABOUTME: In-memory capped audit collection with filtered, time-sorted queries
// ABOUTME: Retention evicts oldest-first and never orphans an open session's start record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

use crate::audit::entry::{AuditEntry, AuditEventType};
use crate::audit::pipeline::AuditPipeline;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

/// Structured filters for audit queries.
///
/// Each present field is an equality predicate, except the date bounds which
/// are inclusive-range predicates; filters compose by logical AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditFilter {
    /// Match entries recorded for this operator
    pub admin_id: Option<Uuid>,
    /// Match entries recorded for this impersonated user
    pub target_user_id: Option<Uuid>,
    /// Match entries belonging to this session
    pub session_id: Option<String>,
    /// Match entries of this event type
    pub entry_type: Option<AuditEventType>,
    /// Match entries at or after this instant
    pub start_date: Option<DateTime<Utc>>,
    /// Match entries at or before this instant
    pub end_date: Option<DateTime<Utc>>,
}

impl AuditFilter {
    /// Whether an entry satisfies every present predicate
    #[must_use]
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if self.admin_id.is_some_and(|id| id != entry.admin_id) {
            return false;
        }
        if self
            .target_user_id
            .is_some_and(|id| id != entry.target_user_id)
        {
            return false;
        }
        if self
            .session_id
            .as_deref()
            .is_some_and(|id| id != entry.session_id)
        {
            return false;
        }
        if self.entry_type.is_some_and(|t| t != entry.entry_type) {
            return false;
        }
        if self.start_date.is_some_and(|start| entry.timestamp < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| entry.timestamp > end) {
            return false;
        }
        true
    }
}

/// Append-only, size-bounded collection of audit entries.
///
/// Appends always succeed locally; the durable write is dispatched to the
/// pipeline fire-and-forget. Queries and the retention sweep operate on a
/// consistent snapshot under the collection lock.
pub struct AuditStore {
    entries: RwLock<Vec<AuditEntry>>,
    max_retained: usize,
    pipeline: Option<AuditPipeline>,
}

impl AuditStore {
    /// Store without a durable pipeline (tests, tooling)
    #[must_use]
    pub fn new(max_retained: usize) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            max_retained,
            pipeline: None,
        }
    }

    /// Store that forwards every append to a durable pipeline
    #[must_use]
    pub fn with_pipeline(max_retained: usize, pipeline: AuditPipeline) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            max_retained,
            pipeline: Some(pipeline),
        }
    }

    /// Append one entry.
    ///
    /// Never fails: the in-memory append is infallible and the durable write
    /// is asynchronous and best-effort. Runs the retention sweep afterwards.
    pub fn append(&self, entry: AuditEntry) {
        if let Some(pipeline) = &self.pipeline {
            pipeline.dispatch(entry.clone());
        }

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entries.push(entry);
        Self::sweep(&mut entries, self.max_retained);
    }

    /// Query entries matching the filter, sorted by timestamp descending.
    ///
    /// The ordering is fixed and deterministic regardless of insertion order
    /// or filter combination.
    #[must_use]
    pub fn query(&self, filter: &AuditFilter) -> Vec<AuditEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut matched: Vec<AuditEntry> = entries
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        drop(entries);

        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched
    }

    /// Enforce the retention cap by evicting the chronologically oldest
    /// entries. Idempotent: with no new appends, a second call is a no-op.
    pub fn cleanup(&self) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Self::sweep(&mut entries, self.max_retained);
    }

    /// Replace the collection from the durable sink at startup.
    ///
    /// The cap applies to hydrated data too.
    pub fn hydrate(&self, restored: Vec<AuditEntry>) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *entries = restored;
        Self::sweep(&mut entries, self.max_retained);
    }

    /// Number of retained entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the collection is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Durable writes that exhausted their retries, when a pipeline is attached
    #[must_use]
    pub fn failed_durable_writes(&self) -> u64 {
        self.pipeline
            .as_ref()
            .map_or(0, AuditPipeline::failed_writes)
    }

    /// Evict down to `cap`, oldest first. A `SESSION_START` whose session has
    /// no `SESSION_END` yet is still in flight and survives the sweep; the
    /// next-oldest unprotected entries are evicted in its place.
    fn sweep(entries: &mut Vec<AuditEntry>, cap: usize) {
        if entries.len() <= cap {
            return;
        }

        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let ended: HashSet<String> = entries
            .iter()
            .filter(|e| e.entry_type == AuditEventType::SessionEnd)
            .map(|e| e.session_id.clone())
            .collect();
        let is_protected = |e: &AuditEntry| {
            e.entry_type == AuditEventType::SessionStart && !ended.contains(&e.session_id)
        };

        let protected: Vec<AuditEntry> = entries[cap..]
            .iter()
            .filter(|e| is_protected(e))
            .cloned()
            .collect();
        entries.truncate(cap);

        if !protected.is_empty() {
            for entry in protected {
                // oldest unprotected survivor makes room; the vec is sorted
                // descending, so scan from the tail
                let Some(victim) = entries.iter().rposition(|e| !is_protected(e)) else {
                    break;
                };
                entries.remove(victim);
                entries.push(entry);
            }
            entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        }
    }
}
