// ABOUTME: Audit trail subsystem for the impersonation core
// ABOUTME: Durable, queryable projections of every lifecycle and action event
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

//! Audit trail subsystem
//!
//! Every impersonation lifecycle transition and every action taken under a
//! borrowed identity is projected into an [`AuditEntry`] and appended to the
//! [`AuditStore`]. The store is in-memory, size-bounded, and hydrated from a
//! durable sink at startup; the live session itself is never persisted.

/// Audit entry schema and per-event constructors
pub mod entry;

/// Asynchronous dispatch of entries to durable sinks
pub mod pipeline;

/// Filtering, free-text search, and tabular export
pub mod query;

/// Durable sink contract and implementations
pub mod sink;

/// In-memory capped collection with retention sweep
pub mod store;

pub use entry::{AuditEntry, AuditEventType};
pub use pipeline::AuditPipeline;
pub use query::AuditQueryService;
pub use sink::{DurableAuditSink, SqliteAuditSink, TracingSink};
pub use store::{AuditFilter, AuditStore};
