// ABOUTME: Filtering, free-text search, and tabular export over the audit store
// ABOUTME: Read-only view consumed by the administrative reporting screen
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

use crate::audit::entry::AuditEntry;
use crate::audit::store::{AuditFilter, AuditStore};
use chrono::NaiveDate;
use std::sync::Arc;

/// Fixed export column order; never varies with filter state.
const EXPORT_COLUMNS: [&str; 7] = [
    "timestamp",
    "type",
    "admin",
    "target_user",
    "action",
    "details",
    "session_id",
];

/// Read-only reporting view over the audit store.
///
/// Reporting never mutates session state; it only reads the collection.
#[derive(Clone)]
pub struct AuditQueryService {
    store: Arc<AuditStore>,
}

impl AuditQueryService {
    /// View over the given store
    #[must_use]
    pub fn new(store: Arc<AuditStore>) -> Self {
        Self { store }
    }

    /// Structured filters AND an optional case-insensitive free-text search
    /// over admin email, target email, action, and details.
    #[must_use]
    pub fn search(&self, filter: &AuditFilter, text: Option<&str>) -> Vec<AuditEntry> {
        let mut entries = self.store.query(filter);

        if let Some(needle) = text.map(str::trim).filter(|t| !t.is_empty()) {
            let needle = needle.to_lowercase();
            entries.retain(|entry| Self::matches_text(entry, &needle));
        }

        entries
    }

    fn matches_text(entry: &AuditEntry, needle: &str) -> bool {
        let haystacks = [
            Some(entry.admin_email.as_str()),
            Some(entry.target_user_email.as_str()),
            entry.action.as_deref(),
            entry.details.as_deref(),
        ];

        haystacks
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle))
    }

    /// Serialize entries to the fixed tabular form.
    ///
    /// Every field is quoted with doubled inner quotes; column order and
    /// presence are constant.
    #[must_use]
    pub fn export_csv(&self, entries: &[AuditEntry]) -> String {
        let mut lines = Vec::with_capacity(entries.len() + 1);
        lines.push(
            EXPORT_COLUMNS
                .iter()
                .map(|c| csv_field(c))
                .collect::<Vec<_>>()
                .join(","),
        );

        for entry in entries {
            let row = [
                entry.timestamp.to_rfc3339(),
                entry.entry_type.as_str().to_owned(),
                entry.admin_email.clone(),
                entry.target_user_email.clone(),
                entry.action.clone().unwrap_or_default(),
                entry.details.clone().unwrap_or_default(),
                entry.session_id.clone(),
            ];
            lines.push(
                row.iter()
                    .map(|field| csv_field(field))
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    /// Download filename for an export taken on the given date
    #[must_use]
    pub fn export_filename(date: NaiveDate) -> String {
        format!("impersonation-audit-{}.csv", date.format("%Y-%m-%d"))
    }
}

/// Quote a field for the export, doubling embedded quotes
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
