// ABOUTME: Identity collaborator contract for authentication and user lookup
// ABOUTME: Bearer token extraction and a static directory for bootstrap and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

//! Identity collaborators
//!
//! The primary authentication provider and the user directory are external
//! to this system; the impersonation core only needs the minimal contract
//! below. `StaticDirectory` is the in-memory implementation used for
//! development bootstrap and tests.

use crate::errors::{AppError, AppResult};
use crate::models::{AdminIdentity, TargetIdentity, UserRole};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

/// A user account as reported by the external directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Unique user identifier
    pub id: Uuid,
    /// Email address
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Role the account holds
    pub role: UserRole,
}

impl UserAccount {
    /// Project this account as the real operator behind a session
    #[must_use]
    pub fn admin_identity(&self) -> AdminIdentity {
        AdminIdentity {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }

    /// Project this account as an impersonation target
    #[must_use]
    pub fn target_identity(&self) -> TargetIdentity {
        TargetIdentity {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role,
        }
    }
}

/// External authentication and user-lookup collaborator
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token to the account that presented it
    async fn authenticate(&self, bearer_token: &str) -> AppResult<UserAccount>;

    /// Look up a user account by ID
    async fn get_user(&self, user_id: Uuid) -> AppResult<Option<UserAccount>>;
}

/// Extract a Bearer token from an `Authorization` header value
pub fn extract_bearer_token(auth_header: &str) -> AppResult<&str> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::auth_invalid("Invalid authorization header format"))?
        .trim();

    if token.is_empty() {
        return Err(AppError::auth_invalid("Empty bearer token"));
    }
    Ok(token)
}

/// Serialized form of a directory entry, for the bootstrap users file
#[derive(Debug, Clone, Deserialize)]
struct DirectoryRecord {
    token: String,
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    role: UserRole,
}

/// In-memory `IdentityProvider` for development bootstrap and tests
#[derive(Debug, Default)]
pub struct StaticDirectory {
    users: HashMap<Uuid, UserAccount>,
    tokens: HashMap<String, Uuid>,
}

impl StaticDirectory {
    /// Empty directory; every authentication attempt fails
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account reachable via the given bearer token
    pub fn insert(&mut self, token: impl Into<String>, account: UserAccount) {
        self.tokens.insert(token.into(), account.id);
        self.users.insert(account.id, account);
    }

    /// Load a directory from a JSON users file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::config(format!(
                "Failed to read users file {}: {e}",
                path.as_ref().display()
            ))
        })?;

        let records: Vec<DirectoryRecord> = serde_json::from_str(&raw)
            .map_err(|e| AppError::config(format!("Invalid users file: {e}")))?;

        let mut directory = Self::new();
        for record in records {
            directory.insert(
                record.token,
                UserAccount {
                    id: record.id,
                    email: record.email,
                    first_name: record.first_name,
                    last_name: record.last_name,
                    role: record.role,
                },
            );
        }
        Ok(directory)
    }

    /// Number of registered accounts
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the directory holds no accounts
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl IdentityProvider for StaticDirectory {
    async fn authenticate(&self, bearer_token: &str) -> AppResult<UserAccount> {
        self.tokens
            .get(bearer_token)
            .and_then(|id| self.users.get(id))
            .cloned()
            .ok_or_else(|| AppError::auth_invalid("Unknown bearer token"))
    }

    async fn get_user(&self, user_id: Uuid) -> AppResult<Option<UserAccount>> {
        Ok(self.users.get(&user_id).cloned())
    }
}
