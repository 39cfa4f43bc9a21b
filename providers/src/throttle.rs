//! Minimum spacing between consecutive calls through one client.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum wall-clock interval between calls.
///
/// The first call goes out immediately. Later calls wait until
/// `min_interval` has passed since the previous call started.
#[derive(Debug)]
pub struct CallSpacing {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl CallSpacing {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call
            && !self.min_interval.is_zero()
        {
            tokio::time::sleep_until(previous + self.min_interval).await;
        }
        *last_call = Some(Instant::now());
    }
}
