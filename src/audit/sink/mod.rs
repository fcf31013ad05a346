// ABOUTME: Durable audit sink contract and the zero-infrastructure tracing sink
// ABOUTME: Sinks persist entries with an at-least-once delivery contract
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

use crate::audit::entry::AuditEntry;
use crate::errors::AppResult;
use async_trait::async_trait;
use tracing::info;

/// SQLite-backed durable sink
pub mod sqlite;

pub use sqlite::SqliteAuditSink;

/// Durable destination for audit entries.
///
/// Delivery is at-least-once: the pipeline retries failed writes, so a sink
/// must tolerate seeing the same entry id more than once.
#[async_trait]
pub trait DurableAuditSink: Send + Sync {
    /// Short sink name for diagnostics
    fn name(&self) -> &'static str;

    /// Persist one entry
    async fn persist(&self, entry: &AuditEntry) -> AppResult<()>;
}

/// Sink that writes entries to the structured log.
///
/// The development default; never fails.
pub struct TracingSink;

#[async_trait]
impl DurableAuditSink for TracingSink {
    fn name(&self) -> &'static str {
        "tracing"
    }

    async fn persist(&self, entry: &AuditEntry) -> AppResult<()> {
        info!(
            entry_id = %entry.id,
            entry_type = %entry.entry_type,
            session_id = %entry.session_id,
            admin_email = %entry.admin_email,
            target_user_email = %entry.target_user_email,
            "audit entry recorded"
        );
        Ok(())
    }
}
