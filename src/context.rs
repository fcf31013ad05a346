// ABOUTME: Focused dependency injection context for request handling
// ABOUTME: Provides only the dependencies route handlers need, no service locator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

use crate::audit::{AuditQueryService, AuditStore};
use crate::auth::IdentityProvider;
use crate::config::ServerConfig;
use crate::impersonation::SessionManager;
use std::sync::Arc;

/// Dependencies shared by the HTTP route handlers.
///
/// The session manager and audit store are explicitly owned instances
/// injected here, never hidden globals, so each test can build its own.
#[derive(Clone)]
pub struct ServerContext {
    config: Arc<ServerConfig>,
    identity: Arc<dyn IdentityProvider>,
    sessions: Arc<SessionManager>,
    audit: Arc<AuditStore>,
}

impl ServerContext {
    /// Assemble the context from its collaborators
    #[must_use]
    pub fn new(
        config: Arc<ServerConfig>,
        identity: Arc<dyn IdentityProvider>,
        sessions: Arc<SessionManager>,
        audit: Arc<AuditStore>,
    ) -> Self {
        Self {
            config,
            identity,
            sessions,
            audit,
        }
    }

    /// Server configuration
    #[must_use]
    pub fn config(&self) -> &Arc<ServerConfig> {
        &self.config
    }

    /// External identity collaborator
    #[must_use]
    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    /// Impersonation session manager
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Audit store
    #[must_use]
    pub fn audit(&self) -> &Arc<AuditStore> {
        &self.audit
    }

    /// Reporting view over the audit store
    #[must_use]
    pub fn query_service(&self) -> AuditQueryService {
        AuditQueryService::new(Arc::clone(&self.audit))
    }
}
