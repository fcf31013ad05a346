// ABOUTME: Application constants organized by domain
// ABOUTME: Retention limits, sentinel values, and environment helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

//! Constants module
//!
//! Constants are grouped into logical domains rather than being spread
//! across the modules that consume them.

/// Audit retention and durable-write defaults
pub mod audit {
    /// Maximum number of audit entries retained in memory and hydrated at startup
    pub const MAX_RETAINED_ENTRIES: usize = 1000;

    /// Bounded capacity of the durable-write dispatch queue
    pub const QUEUE_CAPACITY: usize = 256;

    /// Durable write attempts per entry before the write is counted as failed
    pub const SINK_RETRY_ATTEMPTS: u32 = 3;
}

/// Impersonation session defaults
pub mod impersonation {
    /// Recorded when the operator does not supply a reason
    pub const DEFAULT_REASON: &str = "No reason provided";

    /// Substituted when client metadata cannot be resolved
    pub const UNKNOWN_SENTINEL: &str = "Unknown";
}

/// Service identity for structured logging
pub mod service {
    /// Service name reported in startup logs
    pub const NAME: &str = "atrium";
}

/// Environment-based configuration helpers
pub mod env_config {
    use std::env;

    /// Get HTTP server port from environment or default
    #[must_use]
    pub fn http_port() -> u16 {
        env::var("HTTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080)
    }

    /// Get the database URL for the durable audit sink
    #[must_use]
    pub fn database_url() -> String {
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/atrium.db".into())
    }

    /// Get the public IP echo endpoint for client metadata resolution
    #[must_use]
    pub fn ip_lookup_url() -> String {
        env::var("IP_LOOKUP_URL").unwrap_or_else(|_| "https://api.ipify.org".into())
    }
}
