use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Enforces a minimum interval between outgoing requests.
///
/// Shared by every request a scraper makes, so concurrent analyses still
/// hit the results site one at a time.
pub struct RateLimiter {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            last_request: Mutex::new(None),
        }
    }

    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            sleep_until(previous + self.interval).await;
        }
        *last = Some(Instant::now());
    }
}
