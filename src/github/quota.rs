//! API quota handling
//!
//! [`QuotaGuard`] checks the core quota and retries calls that were refused
//! because the quota ran out. How long to wait, and when to give up, is left
//! to an injected [`QuotaStrategy`].

use crate::core::{DataError, DataResult};
use crate::di::traits::{GitHubProvider, QuotaStrategy};
use crate::github::types::RateLimit;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Sleep until the quota resets, bounded by `max_wait` per call
pub struct WaitUntilReset {
    max_wait: Duration,
    min_sleep: Duration,
}

impl WaitUntilReset {
    pub fn new(max_wait: Duration) -> Self {
        Self {
            max_wait,
            min_sleep: Duration::from_secs(1),
        }
    }

    /// Time left until `reset` (unix seconds), never below the minimum sleep
    fn sleep_for(&self, reset: u64) -> Duration {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Duration::from_secs(reset.saturating_sub(now)).max(self.min_sleep)
    }
}

#[async_trait]
impl QuotaStrategy for WaitUntilReset {
    async fn wait(&self, quota: &RateLimit, waited: Duration) -> DataResult<Duration> {
        let sleep = self.sleep_for(quota.reset);
        if waited + sleep > self.max_wait {
            return Err(DataError::QuotaExhausted { reset: quota.reset });
        }

        warn!(
            "GitHub API quota exhausted; waiting {}s for reset",
            sleep.as_secs()
        );
        tokio::time::sleep(sleep).await;
        Ok(sleep)
    }
}

/// Give up immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWait;

#[async_trait]
impl QuotaStrategy for NoWait {
    async fn wait(&self, quota: &RateLimit, _waited: Duration) -> DataResult<Duration> {
        Err(DataError::QuotaExhausted { reset: quota.reset })
    }
}

/// Quota check and retry helper shared by the fetcher and generator
#[derive(Clone)]
pub struct QuotaGuard {
    github: Arc<dyn GitHubProvider>,
    strategy: Arc<dyn QuotaStrategy>,
}

impl QuotaGuard {
    pub fn new(github: Arc<dyn GitHubProvider>, strategy: Arc<dyn QuotaStrategy>) -> Self {
        Self { github, strategy }
    }

    /// Block until the core quota has requests left
    pub async fn ensure(&self) -> DataResult<RateLimit> {
        let mut waited = Duration::ZERO;
        loop {
            let quota = self.github.get_rate_limit().await?;
            if !quota.is_exhausted() {
                debug!("API quota: {} requests remaining", quota.remaining);
                return Ok(quota);
            }
            waited += self.strategy.wait(&quota, waited).await?;
        }
    }

    /// Run `call`, waiting and running it again whenever it reports an
    /// exhausted quota
    pub async fn retry<T, F, Fut>(&self, mut call: F) -> DataResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = DataResult<T>>,
    {
        let mut waited = Duration::ZERO;
        loop {
            match call().await {
                Err(DataError::QuotaExhausted { reset }) => {
                    let quota = RateLimit {
                        limit: 0,
                        remaining: 0,
                        reset,
                    };
                    waited += self.strategy.wait(&quota, waited).await?;
                }
                other => return other,
            }
        }
    }
}
