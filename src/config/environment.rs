// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Environment-based configuration management for production deployment

use crate::constants::{audit, env_config};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Environment type for security and other configurations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" => Self::Production,
            "testing" => Self::Testing,
            _ => Self::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Database configuration for the durable audit sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,
}

/// Audit retention and durable-write configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Maximum audit entries retained in memory and hydrated at startup
    pub max_retained: usize,
    /// Capacity of the durable-write dispatch queue
    pub queue_capacity: usize,
    /// Durable write attempts per entry before counting the write as failed
    pub sink_retries: u32,
}

/// Client metadata lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpLookupConfig {
    /// Public IP echo endpoint
    pub endpoint: String,
    /// Request timeout in seconds; the lookup is best-effort and bounded
    pub timeout_secs: u64,
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Audit sink database
    pub database: DatabaseConfig,
    /// Audit retention and delivery
    pub audit: AuditConfig,
    /// Client metadata lookup
    pub ip_lookup: IpLookupConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to defaults; present-but-invalid numeric
    /// values are logged and defaulted rather than aborting startup.
    ///
    /// # Errors
    ///
    /// Currently infallible; the `Result` keeps the signature stable while
    /// validation rules grow.
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_str_or_default(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        );

        Ok(Self {
            http_port: env_config::http_port(),
            environment,
            database: DatabaseConfig {
                url: env_config::database_url(),
            },
            audit: AuditConfig {
                max_retained: parse_env_or("AUDIT_MAX_ENTRIES", audit::MAX_RETAINED_ENTRIES),
                queue_capacity: parse_env_or("AUDIT_QUEUE_CAPACITY", audit::QUEUE_CAPACITY),
                sink_retries: parse_env_or("AUDIT_SINK_RETRIES", audit::SINK_RETRY_ATTEMPTS),
            },
            ip_lookup: IpLookupConfig {
                endpoint: env_config::ip_lookup_url(),
                timeout_secs: parse_env_or("IP_LOOKUP_TIMEOUT_SECS", 2),
            },
        })
    }

    /// One-line configuration summary for startup logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "environment={} http_port={} database={} audit_max_entries={} ip_lookup={}",
            self.environment,
            self.http_port,
            self.database.url,
            self.audit.max_retained,
            self.ip_lookup.endpoint
        )
    }
}

/// Parse an environment variable, warning and defaulting on invalid values
fn parse_env_or<T: std::str::FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(
                variable = name,
                value = %raw,
                default = %default,
                "invalid environment value, using default"
            );
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        for var in [
            "HTTP_PORT",
            "ENVIRONMENT",
            "DATABASE_URL",
            "AUDIT_MAX_ENTRIES",
            "AUDIT_QUEUE_CAPACITY",
            "AUDIT_SINK_RETRIES",
            "IP_LOOKUP_URL",
            "IP_LOOKUP_TIMEOUT_SECS",
        ] {
            std::env::remove_var(var);
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.audit.max_retained, 1000);
        assert_eq!(config.ip_lookup.timeout_secs, 2);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("HTTP_PORT", "9090");
        std::env::set_var("ENVIRONMENT", "production");
        std::env::set_var("AUDIT_MAX_ENTRIES", "250");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.audit.max_retained, 250);

        std::env::remove_var("HTTP_PORT");
        std::env::remove_var("ENVIRONMENT");
        std::env::remove_var("AUDIT_MAX_ENTRIES");
    }

    #[test]
    #[serial]
    fn test_invalid_numeric_falls_back() {
        std::env::set_var("AUDIT_MAX_ENTRIES", "not-a-number");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.audit.max_retained, 1000);

        std::env::remove_var("AUDIT_MAX_ENTRIES");
    }
}
