use crate::errors::TrendBotError;
use crate::services::trend_service::{CycleOutcome, TrendService};
use async_trait::async_trait;
use log::{error, info};
use std::error::Error as _;
use std::time::Duration;

/// Blocks the loop between cycles. Swapped for a recording fake in tests.
#[async_trait]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Tally of cycle outcomes over a bounded run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub published: usize,
    pub no_data: usize,
    pub failed: usize,
}

impl CycleStats {
    pub fn total(&self) -> usize {
        self.published + self.no_data + self.failed
    }
}

/// Fixed-delay loop: run a cycle, swallow and log any failure, sleep, repeat.
pub struct Scheduler<S> {
    service: TrendService,
    sleeper: S,
    interval: Duration,
}

impl<S: Sleeper + Send + Sync> Scheduler<S> {
    pub fn new(service: TrendService, sleeper: S) -> Self {
        let interval = service.config().refresh_interval;
        Self {
            service,
            sleeper,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs until the process is killed.
    pub async fn run_forever(&self) {
        let mut stats = CycleStats::default();
        loop {
            self.tick(&mut stats).await;
        }
    }

    /// Runs exactly `cycles` cycles, each followed by a sleep.
    pub async fn run_cycles(&self, cycles: usize) -> CycleStats {
        let mut stats = CycleStats::default();
        for _ in 0..cycles {
            self.tick(&mut stats).await;
        }
        stats
    }

    async fn tick(&self, stats: &mut CycleStats) {
        match self.service.run_cycle().await {
            Ok(CycleOutcome::Published(_)) => stats.published += 1,
            Ok(CycleOutcome::NoData) => stats.no_data += 1,
            Err(e) => {
                stats.failed += 1;
                log_cycle_error(&e);
            }
        }

        info!(
            "Sleeping for {} seconds before next run...",
            self.interval.as_secs()
        );
        self.sleeper.sleep(self.interval).await;
    }
}

fn log_cycle_error(e: &TrendBotError) {
    error!("Unexpected error during update cycle ({}): {}", e.kind(), e);
    let mut source = e.source();
    while let Some(cause) = source {
        error!("  caused by: {}", cause);
        source = cause.source();
    }
}
