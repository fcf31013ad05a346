// ABOUTME: Configuration management for deployment-specific settings
// ABOUTME: Environment-only configuration, no config files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

/// Environment-based configuration parsing
pub mod environment;

pub use environment::{AuditConfig, Environment, IpLookupConfig, ServerConfig};
