//! Timer-driven refresh scheduling
//!
//! The first tick fires immediately. Each tick spawns its own cycle so the
//! cadence does not drift with cycle duration; overlapping ticks are turned
//! away by the store's refresh guard. A failed cycle arms one early retry,
//! doubling per consecutive failure up to the regular interval.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::refresh_service::{RefreshError, RefreshService, RefreshSummary};
use crate::infrastructure::config::AppConfig;

type CycleOutcome = Result<RefreshSummary, RefreshError>;

pub struct RefreshScheduler {
    service: Arc<RefreshService>,
    interval: Duration,
    failure_retry: Duration,
}

impl RefreshScheduler {
    pub fn new(service: Arc<RefreshService>, interval: Duration, failure_retry: Duration) -> Self {
        Self {
            service,
            interval,
            failure_retry,
        }
    }

    pub fn from_config(service: Arc<RefreshService>, config: &AppConfig) -> Self {
        Self::new(
            service,
            Duration::from_secs(config.refresh_interval_minutes.saturating_mul(60)),
            Duration::from_secs(config.failure_retry_seconds),
        )
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Delay before the early retry after `failures` consecutive failed cycles
    pub fn retry_delay(&self, failures: u32) -> Duration {
        let factor = 2u32.saturating_pow(failures.saturating_sub(1));
        self.failure_retry.saturating_mul(factor).min(self.interval)
    }

    /// Run until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            "⏰ Refresh scheduler started (every {:?}, retry after failure from {:?})",
            self.interval, self.failure_retry
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<CycleOutcome>();
        let retry = time::sleep(self.interval);
        tokio::pin!(retry);
        let mut retry_armed = false;
        let mut failures = 0u32;

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    info!("🛑 Refresh scheduler stopping");
                    break;
                }
                _ = ticker.tick() => self.spawn_cycle(&outcome_tx),
                () = &mut retry, if retry_armed => {
                    retry_armed = false;
                    debug!("Retrying after {} failed cycle(s)", failures);
                    self.spawn_cycle(&outcome_tx);
                }
                Some(outcome) = outcome_rx.recv() => match outcome {
                    Ok(_) => {
                        failures = 0;
                        retry_armed = false;
                    }
                    Err(RefreshError::AlreadyRunning) => {}
                    Err(err) => {
                        failures = failures.saturating_add(1);
                        if !retry_armed {
                            let delay = self.retry_delay(failures);
                            warn!("🔁 Cycle failed ({}), retrying in {:?}", err, delay);
                            retry.as_mut().reset(Instant::now() + delay);
                            retry_armed = true;
                        }
                    }
                },
            }
        }
    }

    fn spawn_cycle(&self, outcome_tx: &mpsc::UnboundedSender<CycleOutcome>) {
        let service = Arc::clone(&self.service);
        let outcome_tx = outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = service.run_cycle().await;
            // receiver is gone once the scheduler has stopped
            let _ = outcome_tx.send(outcome);
        });
    }
}
