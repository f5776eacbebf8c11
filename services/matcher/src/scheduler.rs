use anyhow::Result;
use matching::MatchingEngine;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

/// Runs match discovery on a cron schedule
#[derive(Clone)]
pub struct DiscoveryScheduler {
    engine: MatchingEngine,
    guard: TickGuard,
}

impl DiscoveryScheduler {
    pub fn new(engine: MatchingEngine) -> Self {
        Self {
            engine,
            guard: TickGuard::default(),
        }
    }

    /// Run one discovery pass unless the previous one is still going
    pub async fn run_once(&self) {
        let Some(_permit) = self.guard.try_acquire() else {
            warn!("Previous discovery run still in progress, skipping this tick");
            return;
        };

        match self.engine.discover_matches().await {
            Ok(created) => info!(created, "Scheduled match discovery finished"),
            Err(e) => error!("Scheduled match discovery failed: {}", e),
        }
    }

    pub async fn start(&self, schedule: &str) -> Result<JobScheduler> {
        let runner = self.clone();

        let scheduler = JobScheduler::new().await?;

        let job = Job::new_async(schedule, move |_, _| {
            let runner = runner.clone();
            Box::pin(async move {
                runner.run_once().await;
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!("Started match discovery scheduler with schedule: {}", schedule);
        Ok(scheduler)
    }
}

/// Lets at most one discovery run proceed at a time
#[derive(Clone, Default)]
struct TickGuard {
    running: Arc<AtomicBool>,
}

struct TickPermit {
    running: Arc<AtomicBool>,
}

impl TickGuard {
    fn try_acquire(&self) -> Option<TickPermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TickPermit {
                running: Arc::clone(&self.running),
            })
    }
}

impl Drop for TickPermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}
