// ABOUTME: SQLite implementation of the durable audit sink
// ABOUTME: Idempotent inserts keyed by entry id; hydrates the store at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

use crate::audit::entry::{AuditEntry, AuditEventType};
use crate::audit::sink::DurableAuditSink;
use crate::errors::{AppError, AppResult};
use crate::models::ClientMetadata;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

/// Durable audit sink backed by SQLite.
///
/// Inserts are `INSERT OR REPLACE` keyed by entry id, which makes the
/// pipeline's at-least-once delivery idempotent at rest.
#[derive(Clone)]
pub struct SqliteAuditSink {
    pool: SqlitePool,
}

impl SqliteAuditSink {
    /// Open (creating if missing) the audit database and ensure its schema
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be created.
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::database(format!("Invalid audit database URL: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open audit database: {e}")))?;

        let sink = Self { pool };
        sink.ensure_schema().await?;
        Ok(sink)
    }

    async fn ensure_schema(&self) -> AppResult<()> {
        let table = r"
            CREATE TABLE IF NOT EXISTS audit_entries (
                id TEXT PRIMARY KEY,
                entry_type TEXT NOT NULL,
                session_id TEXT NOT NULL,
                admin_id TEXT NOT NULL,
                admin_email TEXT NOT NULL,
                target_user_id TEXT NOT NULL,
                target_user_email TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                reason TEXT,
                action TEXT,
                details TEXT,
                ip_address TEXT,
                user_agent TEXT,
                duration_ms INTEGER,
                action_count INTEGER
            )
        ";
        sqlx::query(table)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create audit schema: {e}")))?;

        let index = r"
            CREATE INDEX IF NOT EXISTS idx_audit_entries_timestamp
            ON audit_entries (timestamp DESC)
        ";
        sqlx::query(index)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create audit index: {e}")))?;

        Ok(())
    }

    /// Load the most recent entries, newest first, to hydrate the store
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub async fn load_recent(&self, limit: usize) -> AppResult<Vec<AuditEntry>> {
        let query = r"
            SELECT id, entry_type, session_id, admin_id, admin_email,
                   target_user_id, target_user_email, timestamp, reason,
                   action, details, ip_address, user_agent, duration_ms, action_count
            FROM audit_entries
            ORDER BY timestamp DESC
            LIMIT ?
        ";

        let rows = sqlx::query(query)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load audit entries: {e}")))?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Convert a database row to an `AuditEntry`
    fn row_to_entry(row: &SqliteRow) -> AppResult<AuditEntry> {
        let id: String = row.get("id");
        let entry_type: String = row.get("entry_type");
        let session_id: String = row.get("session_id");
        let admin_id: String = row.get("admin_id");
        let admin_email: String = row.get("admin_email");
        let target_user_id: String = row.get("target_user_id");
        let target_user_email: String = row.get("target_user_email");
        let timestamp: String = row.get("timestamp");
        let reason: Option<String> = row.get("reason");
        let action: Option<String> = row.get("action");
        let details: Option<String> = row.get("details");
        let ip_address: Option<String> = row.get("ip_address");
        let user_agent: Option<String> = row.get("user_agent");
        let duration_ms: Option<i64> = row.get("duration_ms");
        let action_count: Option<i64> = row.get("action_count");

        let client_metadata = match (ip_address, user_agent) {
            (None, None) => None,
            (ip, ua) => Some(ClientMetadata {
                ip_address: ip.unwrap_or_else(|| {
                    crate::constants::impersonation::UNKNOWN_SENTINEL.to_owned()
                }),
                user_agent: ua.unwrap_or_else(|| {
                    crate::constants::impersonation::UNKNOWN_SENTINEL.to_owned()
                }),
            }),
        };

        Ok(AuditEntry {
            id,
            entry_type: AuditEventType::parse(&entry_type).ok_or_else(|| {
                AppError::database(format!("Unknown audit entry type: {entry_type}"))
            })?,
            session_id,
            admin_id: Uuid::parse_str(&admin_id)
                .map_err(|e| AppError::database(format!("Invalid admin_id UUID: {e}")))?,
            admin_email,
            target_user_id: Uuid::parse_str(&target_user_id)
                .map_err(|e| AppError::database(format!("Invalid target_user_id UUID: {e}")))?,
            target_user_email,
            timestamp: DateTime::parse_from_rfc3339(&timestamp)
                .map_err(|e| AppError::database(format!("Invalid timestamp: {e}")))?
                .with_timezone(&Utc),
            reason,
            action,
            details,
            client_metadata,
            duration_ms,
            action_count,
        })
    }
}

#[async_trait]
impl DurableAuditSink for SqliteAuditSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn persist(&self, entry: &AuditEntry) -> AppResult<()> {
        let query = r"
            INSERT OR REPLACE INTO audit_entries (
                id, entry_type, session_id, admin_id, admin_email,
                target_user_id, target_user_email, timestamp, reason,
                action, details, ip_address, user_agent, duration_ms, action_count
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ";

        sqlx::query(query)
            .bind(&entry.id)
            .bind(entry.entry_type.as_str())
            .bind(&entry.session_id)
            .bind(entry.admin_id.to_string())
            .bind(&entry.admin_email)
            .bind(entry.target_user_id.to_string())
            .bind(&entry.target_user_email)
            .bind(entry.timestamp.to_rfc3339())
            .bind(entry.reason.as_deref())
            .bind(entry.action.as_deref())
            .bind(entry.details.as_deref())
            .bind(entry.client_metadata.as_ref().map(|m| m.ip_address.clone()))
            .bind(entry.client_metadata.as_ref().map(|m| m.user_agent.clone()))
            .bind(entry.duration_ms)
            .bind(entry.action_count)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::audit_sink_unavailable(format!("Failed to persist audit entry: {e}"))
            })?;

        Ok(())
    }
}
