use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::{errors::AppResult, repositories::TicketRepository};

/// Background sweep that deletes Issued tickets whose lifetime elapsed
/// without consumption. Consumed tickets are never touched. A missed or
/// failed sweep only delays reclamation: `consume` rejects expired tickets
/// on its own, so correctness never depends on this job's timing.
pub struct TicketCleanupJob {
    repository: Arc<dyn TicketRepository>,
    interval: Duration,
}

impl TicketCleanupJob {
    pub fn new(repository: Arc<dyn TicketRepository>, interval_secs: u64) -> Self {
        Self {
            repository,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// One sweep. Idempotent and safe to run concurrently with itself and
    /// with in-flight consume calls.
    pub async fn run_once(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let removed = self.repository.delete_expired_issued(now).await?;
        if removed > 0 {
            log::info!("Ticket cleanup removed {} expired attempt tickets", removed);
        }
        Ok(removed)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(err) = self.run_once(Utc::now()).await {
                    log::warn!("Ticket cleanup sweep failed: {}", err);
                }
            }
        })
    }
}
