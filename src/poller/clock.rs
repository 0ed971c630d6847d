//! Time source for the poll loop.

use std::time::Duration;

use async_trait::async_trait;

/// Wall clock and sleep, injected so tests can run cycles without waiting.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now_unix(&self) -> i64;

    async fn sleep(&self, duration: Duration);
}

/// Real time, backed by `chrono` and the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
