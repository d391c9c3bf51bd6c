//! # Staleness-driven scheduling
//!
//! Every reconciled record carries a `last_reconciled_at` timestamp. A [`ReconciliationPass`] picks one record that
//! has never been reconciled, or was last reconciled before the staleness window, processes it and stamps it. A
//! [`StalenessScheduler`] runs a pass in a loop until it is told to stop. It sleeps briefly after a productive pass and
//! longer when there was nothing to do or the pass failed.
//!
//! A record whose pass fails is not stamped, so it is picked up again on a later iteration.
mod passes;

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::*;
pub use passes::{OrderBookPass, OwnershipPass};
use tokio::sync::watch;

use crate::tcm_api::errors::ReconcileError;

pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::from_secs(360);
pub const DEFAULT_BUSY_DELAY: Duration = Duration::from_millis(10);
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// A record was reconciled.
    Processed,
    /// No record was due.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// A record is due once it has not been reconciled for this long.
    pub staleness_window: Duration,
    pub busy_delay: Duration,
    pub idle_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            staleness_window: DEFAULT_STALENESS_WINDOW,
            busy_delay: DEFAULT_BUSY_DELAY,
            idle_delay: DEFAULT_IDLE_DELAY,
        }
    }
}

impl SchedulerConfig {
    /// Records last reconciled before the returned instant are due.
    pub fn stale_before(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        chrono::Duration::from_std(self.staleness_window)
            .ok()
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// One unit of reconciliation work.
#[allow(async_fn_in_trait)]
pub trait ReconciliationPass {
    fn name(&self) -> &str;

    /// Reconciles at most one due record.
    async fn run_pass(&self) -> Result<PassOutcome, ReconcileError>;
}

/// Counts of what a scheduler did over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub processed: u64,
    pub idle: u64,
    pub errors: u64,
}

pub struct StalenessScheduler<P> {
    pass: P,
    config: SchedulerConfig,
}

impl<P: ReconciliationPass> StalenessScheduler<P> {
    pub fn new(pass: P, config: SchedulerConfig) -> Self {
        Self { pass, config }
    }

    /// Runs passes back to back until `shutdown` becomes `true` or its sender is dropped. A pass that has started is
    /// always allowed to finish.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> SchedulerStats {
        let name = self.pass.name().to_string();
        let mut stats = SchedulerStats::default();
        info!("🔄️ {name} scheduler started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            let delay = match self.pass.run_pass().await {
                Ok(PassOutcome::Processed) => {
                    stats.processed += 1;
                    self.config.busy_delay
                },
                Ok(PassOutcome::Idle) => {
                    stats.idle += 1;
                    self.config.idle_delay
                },
                Err(e) => {
                    error!("🔄️ {name} pass failed. {e}");
                    stats.errors += 1;
                    self.config.idle_delay
                },
            };
            tokio::select! {
                _ = tokio::time::sleep(delay) => {},
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                },
            }
        }
        info!(
            "🔄️ {name} scheduler stopped. {} records processed, {} idle passes, {} failed passes",
            stats.processed, stats.idle, stats.errors
        );
        stats
    }
}
