//! Login throttling against password guessing
//!
//! Failed logins are counted per key (the normalized email). Once a key
//! reaches `max_failures` within `window`, it is locked out for `lockout`.
//! A successful login clears the key.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Throttle configuration
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Failures allowed inside the window before locking out
    pub max_failures: u32,
    /// Window over which failures are counted
    pub window: Duration,
    /// How long a locked-out key stays locked
    pub lockout: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window: Duration::from_secs(5 * 60),
            lockout: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Debug)]
struct FailureRecord {
    failures: u32,
    first_failure: Instant,
    locked_until: Option<Instant>,
}

impl FailureRecord {
    /// Nothing left to enforce: the window passed unlocked, or the lockout ended
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        match self.locked_until {
            Some(until) => until <= now,
            None => now.duration_since(self.first_failure) >= window,
        }
    }
}

/// Per-key login failure tracker
#[derive(Debug, Clone)]
pub struct LoginThrottle {
    config: ThrottleConfig,
    records: Arc<Mutex<HashMap<String, FailureRecord>>>,
}

impl LoginThrottle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Remaining lockout for a key, if it is locked out
    pub async fn locked_for(&self, key: &str) -> Option<Duration> {
        self.locked_for_at(key, Instant::now()).await
    }

    /// Count a failed attempt
    pub async fn record_failure(&self, key: &str) {
        self.record_failure_at(key, Instant::now()).await
    }

    /// Forget a key after a successful login
    pub async fn clear(&self, key: &str) {
        self.records.lock().await.remove(key);
    }

    async fn locked_for_at(&self, key: &str, now: Instant) -> Option<Duration> {
        let mut records = self.records.lock().await;
        let record = records.get(key)?;

        match record.locked_until {
            Some(until) if until > now => Some(until - now),
            Some(_) => {
                records.remove(key);
                None
            }
            None => None,
        }
    }

    async fn record_failure_at(&self, key: &str, now: Instant) {
        let mut records = self.records.lock().await;
        records.retain(|_, record| !record.is_stale(now, self.config.window));

        let record = records.entry(key.to_string()).or_insert(FailureRecord {
            failures: 0,
            first_failure: now,
            locked_until: None,
        });

        record.failures += 1;
        if record.failures >= self.config.max_failures {
            record.locked_until = Some(now + self.config.lockout);
            warn!(
                "Locking out {} for {} seconds after {} failed logins",
                key,
                self.config.lockout.as_secs(),
                record.failures
            );
        }
    }
}
