// ABOUTME: Client address resolution for impersonation audit metadata
// ABOUTME: Header-based extraction with a best-effort public IP lookup fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

use crate::constants::impersonation::UNKNOWN_SENTINEL;
use crate::errors::{AppError, AppResult};
use crate::models::ClientMetadata;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::warn;

/// Request-scoped connection facts the HTTP layer hands to the session manager.
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    /// `X-Forwarded-For` header value, if present
    pub forwarded_for: Option<String>,
    /// `X-Real-IP` header value, if present
    pub real_ip: Option<String>,
    /// Peer socket address, when the transport exposes it
    pub remote_addr: Option<SocketAddr>,
    /// `User-Agent` header value, if present
    pub user_agent: Option<String>,
}

impl RequestMetadata {
    /// Capture the relevant headers from an incoming request
    #[must_use]
    pub fn from_headers(headers: &http::HeaderMap) -> Self {
        let header_value = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };

        Self {
            forwarded_for: header_value("x-forwarded-for"),
            real_ip: header_value("x-real-ip"),
            remote_addr: None,
            user_agent: header_value("user-agent"),
        }
    }
}

/// Extract the client IP address from proxy headers and the peer address.
///
/// Priority: `X-Forwarded-For` > `X-Real-IP` > remote address.
#[must_use]
pub fn extract_client_ip(
    x_forwarded_for: Option<&str>,
    x_real_ip: Option<&str>,
    remote_addr: Option<SocketAddr>,
) -> Option<String> {
    if let Some(xff) = x_forwarded_for {
        // X-Forwarded-For can contain multiple IPs, take the first one
        xff.split(',')
            .next()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_owned)
    } else if let Some(real_ip) = x_real_ip {
        Some(real_ip.trim().to_owned())
    } else {
        remote_addr.map(|addr| addr.ip().to_string())
    }
}

/// Best-effort public IP lookup collaborator.
///
/// Failure must never abort session start; callers substitute the
/// `"Unknown"` sentinel instead.
#[async_trait]
pub trait IpLookup: Send + Sync {
    /// Resolve the public IP address of this client
    async fn public_ip(&self) -> AppResult<String>;
}

/// `IpLookup` backed by a plain-text public IP echo endpoint.
pub struct HttpIpLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpIpLookup {
    /// Build a lookup client with a bounded request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build IP lookup client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl IpLookup for HttpIpLookup {
    async fn public_ip(&self) -> AppResult<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| AppError::lookup_unavailable(format!("IP lookup request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::lookup_unavailable(format!("IP lookup rejected: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| AppError::lookup_unavailable(format!("IP lookup body unreadable: {e}")))?;

        let ip = body.trim();
        if ip.is_empty() {
            return Err(AppError::lookup_unavailable("IP lookup returned empty body"));
        }
        Ok(ip.to_owned())
    }
}

/// Resolve client metadata for a starting session.
///
/// Headers win; the external lookup is the fallback, and the sentinel
/// covers everything else. Lookup failure is logged, never propagated.
pub async fn resolve_client_metadata(
    request: &RequestMetadata,
    lookup: &dyn IpLookup,
) -> ClientMetadata {
    let from_headers = extract_client_ip(
        request.forwarded_for.as_deref(),
        request.real_ip.as_deref(),
        request.remote_addr,
    );

    let ip_address = match from_headers {
        Some(ip) => ip,
        None => match lookup.public_ip().await {
            Ok(ip) => ip,
            Err(e) => {
                warn!(error = %e, "client IP resolution failed, recording sentinel");
                UNKNOWN_SENTINEL.to_owned()
            }
        },
    };

    let user_agent = request
        .user_agent
        .clone()
        .filter(|ua| !ua.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_SENTINEL.to_owned());

    ClientMetadata {
        ip_address,
        user_agent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarded_for_takes_priority() {
        let ip = extract_client_ip(
            Some("203.0.113.7, 10.0.0.1"),
            Some("198.51.100.2"),
            Some("192.0.2.1:443".parse().unwrap()),
        );
        assert_eq!(ip.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_real_ip_fallback() {
        let ip = extract_client_ip(None, Some(" 198.51.100.2 "), None);
        assert_eq!(ip.as_deref(), Some("198.51.100.2"));
    }

    #[test]
    fn test_remote_addr_fallback() {
        let ip = extract_client_ip(None, None, Some("192.0.2.1:443".parse().unwrap()));
        assert_eq!(ip.as_deref(), Some("192.0.2.1"));
    }

    #[test]
    fn test_no_source_yields_none() {
        assert_eq!(extract_client_ip(None, None, None), None);
    }
}
