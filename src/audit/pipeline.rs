// ABOUTME: Asynchronous dispatch of audit entries to durable sinks
// ABOUTME: Bounded queue, bounded retries, failures observable but never propagated
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atrium Systems

use crate::audit::entry::AuditEntry;
use crate::audit::sink::DurableAuditSink;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

/// Fire-and-forget delivery of audit entries to durable sinks.
///
/// Entries are queued on a bounded channel and persisted by a background
/// task with bounded retries per sink. A write that exhausts its retries is
/// logged and counted; it is never surfaced to the caller, and it never
/// blocks a session state transition.
#[derive(Clone)]
pub struct AuditPipeline {
    tx: mpsc::Sender<AuditEntry>,
    failed_writes: Arc<AtomicU64>,
}

impl AuditPipeline {
    /// Spawn the background delivery task.
    ///
    /// `retry_attempts` is the total number of persist attempts per sink
    /// before the entry is counted as a failed durable write.
    #[must_use]
    pub fn new(
        sinks: Vec<Arc<dyn DurableAuditSink>>,
        queue_capacity: usize,
        retry_attempts: u32,
    ) -> Self {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let failed_writes = Arc::new(AtomicU64::new(0));

        tokio::spawn(Self::background_task(
            rx,
            sinks,
            retry_attempts.max(1),
            Arc::clone(&failed_writes),
        ));

        Self { tx, failed_writes }
    }

    async fn background_task(
        mut rx: mpsc::Receiver<AuditEntry>,
        sinks: Vec<Arc<dyn DurableAuditSink>>,
        retry_attempts: u32,
        failed_writes: Arc<AtomicU64>,
    ) {
        while let Some(entry) = rx.recv().await {
            for sink in &sinks {
                let mut attempt = 0u32;
                loop {
                    match sink.persist(&entry).await {
                        Ok(()) => break,
                        Err(e) => {
                            attempt += 1;
                            if attempt >= retry_attempts {
                                failed_writes.fetch_add(1, Ordering::Relaxed);
                                warn!(
                                    sink = sink.name(),
                                    entry_id = %entry.id,
                                    error = %e,
                                    "durable audit write failed after retries"
                                );
                                break;
                            }
                            tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt)))
                                .await;
                        }
                    }
                }
            }
        }
    }

    /// Queue one entry for durable delivery.
    ///
    /// Returns `false` only when the pipeline has shut down; a full queue
    /// falls back to an async send so the entry is still delivered.
    pub fn dispatch(&self, entry: AuditEntry) -> bool {
        match self.tx.try_send(entry) {
            Ok(()) => true,
            Err(TrySendError::Full(entry)) => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(entry).await;
                });
                true
            }
            Err(TrySendError::Closed(_)) => {
                self.failed_writes.fetch_add(1, Ordering::Relaxed);
                warn!("audit pipeline closed, durable write dropped");
                false
            }
        }
    }

    /// Durable writes that exhausted their retries since startup
    #[must_use]
    pub fn failed_writes(&self) -> u64 {
        self.failed_writes.load(Ordering::Relaxed)
    }
}
