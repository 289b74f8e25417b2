//! Periodic deadline sweeps.
//!
//! Reads and writes already apply overdue deadlines lazily. The scheduler
//! makes sure proposals nobody touches still close on time.

use crate::engine::GovernanceEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use umbra_utils::format_duration;

/// Handle to a running scheduler task.
pub struct PhaseScheduler {
    shutdown_tx: broadcast::Sender<()>,
    handle: JoinHandle<()>,
}

impl PhaseScheduler {
    /// Spawn a task that calls [`GovernanceEngine::advance_deadlines`] every
    /// `interval` until [`shutdown`](Self::shutdown) is called.
    pub fn spawn(engine: Arc<GovernanceEngine>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        tracing::info!(every = %format_duration(interval.as_secs()), "phase scheduler started");
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::debug!("phase scheduler stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        let moved = engine.advance_deadlines().await;
                        if !moved.is_empty() {
                            tracing::info!(count = moved.len(), "scheduler advanced proposals");
                        }
                    }
                }
            }
        });
        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Spawn with the period from the engine's configuration.
    pub fn spawn_from_config(engine: Arc<GovernanceEngine>) -> Self {
        let interval = Duration::from_secs(engine.config().scheduler_interval_secs);
        Self::spawn(engine, interval)
    }

    /// Stop the task and wait for it to finish its current sweep.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "phase scheduler task failed");
        }
    }
}
