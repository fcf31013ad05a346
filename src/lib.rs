// ABOUTME: Main library entry point for the Atrium dashboard backend
// ABOUTME: Administrative impersonation core with an immutable, queryable audit trail
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

#![deny(unsafe_code)]

//! # Atrium
//!
//! A multi-tenant role-based dashboard backend. The security-sensitive core
//! is the administrative impersonation subsystem: a super admin can
//! transparently assume the identity and view of another user, and every
//! state transition and action taken under borrowed identity is captured in
//! an immutable, queryable audit trail.
//!
//! ## Architecture
//!
//! - **Impersonation**: session lifecycle state machine and effective-user
//!   read model
//! - **Audit**: in-memory capped store, durable sink pipeline, reporting and
//!   export
//! - **Routes**: super-admin gated HTTP API for the dashboard frontend
//! - **Collaborators**: authentication, user directory, and client metadata
//!   lookup are external systems expressed as traits
//!
//! ## Example
//!
//! ```rust,no_run
//! use atrium::config::ServerConfig;
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Atrium configured: {}", config.summary());
//!     Ok(())
//! }
//! ```

/// Audit trail: entries, capped store, durable sinks, reporting
pub mod audit;

/// Identity collaborator contract and bearer-token handling
pub mod auth;

/// Environment-based configuration management
pub mod config;

/// Application constants organized by domain
pub mod constants;

/// Focused dependency injection context for request handling
pub mod context;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Administrative impersonation: lifecycle, actions, effective user
pub mod impersonation;

/// Production logging and structured output
pub mod logging;

/// HTTP middleware for navigation path tracking
pub mod middleware;

/// Common data models: roles, identities, client metadata
pub mod models;

/// Client address resolution and the IP lookup collaborator
pub mod network;

/// HTTP routes for the admin API
pub mod routes;
