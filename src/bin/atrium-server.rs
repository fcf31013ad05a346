// ABOUTME: Server binary wiring configuration, audit persistence, and the admin API
// ABOUTME: Hydrates the audit store from the durable sink; never restores live sessions
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Atrium Server Binary
//!
//! Starts the dashboard backend with the impersonation core, the audit
//! store hydrated from the durable sink, and the super-admin HTTP API.

use anyhow::Result;
use atrium::{
    audit::{AuditPipeline, AuditStore, DurableAuditSink, SqliteAuditSink},
    auth::{IdentityProvider, StaticDirectory},
    config::ServerConfig,
    context::ServerContext,
    impersonation::SessionManager,
    logging,
    network::HttpIpLookup,
    routes,
};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Parser)]
#[command(name = "atrium-server")]
#[command(about = "Atrium - multi-tenant dashboard backend with admin impersonation")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Bootstrap users file (JSON) for the static identity directory
    #[arg(long)]
    users_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Argument parsing failed: {e}");
            eprintln!("Using default configuration");
            Args {
                http_port: None,
                users_file: None,
            }
        }
    };

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting Atrium dashboard backend");
    info!("{}", config.summary());

    // Durable audit sink; only audit projections are persisted, never the
    // live impersonation session
    let sink = SqliteAuditSink::new(&config.database.url).await?;
    let sinks: Vec<Arc<dyn DurableAuditSink>> = vec![Arc::new(sink.clone())];
    let pipeline = AuditPipeline::new(
        sinks,
        config.audit.queue_capacity,
        config.audit.sink_retries,
    );
    let store = Arc::new(AuditStore::with_pipeline(
        config.audit.max_retained,
        pipeline,
    ));

    let restored = sink.load_recent(config.audit.max_retained).await?;
    if !restored.is_empty() {
        info!(
            count = restored.len(),
            "audit collection restored from durable sink"
        );
    }
    store.hydrate(restored);

    let ip_lookup = Arc::new(HttpIpLookup::new(
        config.ip_lookup.endpoint.clone(),
        Duration::from_secs(config.ip_lookup.timeout_secs),
    )?);
    let sessions = Arc::new(SessionManager::new(Arc::clone(&store), ip_lookup));

    let identity: Arc<dyn IdentityProvider> = match &args.users_file {
        Some(path) => {
            let directory = StaticDirectory::from_file(path)?;
            info!(count = directory.len(), "identity directory loaded");
            Arc::new(directory)
        }
        None => Arc::new(StaticDirectory::new()),
    };

    let context = ServerContext::new(Arc::new(config.clone()), identity, sessions, store);
    let app = routes::router(context).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
