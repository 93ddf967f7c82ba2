//! Polling wait for the next observation.
//!
//! # Data Flow
//! ```text
//! wait_for_observation(log)
//!     → tick every poll_interval
//!     → log.take_new_observation()?  → Ok(())
//!     → deadline reached             → InterceptError::WaitTimeout
//! ```

use std::time::Duration;

use crate::config::WaitConfig;
use crate::error::InterceptError;
use crate::observation::log::CaptureLog;

/// Timing for a single wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitOptions {
    /// Default polling with a custom timeout.
    pub fn timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Timing from the `[wait]` section.
    pub fn from_config(config: &WaitConfig) -> Self {
        Self {
            timeout: config.default_timeout(),
            poll_interval: config.poll_interval(),
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::from_config(&WaitConfig::default())
    }
}

/// Resolve once `log` has a new observation, or fail after `options.timeout`.
///
/// `method` and `url` only label the timeout error.
pub async fn wait_for_observation<T: Clone>(
    log: &CaptureLog<T>,
    method: &str,
    url: &str,
    options: WaitOptions,
) -> Result<(), InterceptError> {
    let poll = async {
        let mut ticker = tokio::time::interval(options.poll_interval.max(Duration::from_millis(1)));
        loop {
            ticker.tick().await;
            if log.take_new_observation() {
                return;
            }
        }
    };

    match tokio::time::timeout(options.timeout, poll).await {
        Ok(()) => {
            tracing::debug!(method = %method, url = %url, "Wait satisfied");
            Ok(())
        }
        Err(_) => {
            tracing::debug!(
                method = %method,
                url = %url,
                timeout_ms = options.timeout_ms(),
                "Wait timed out"
            );
            Err(InterceptError::WaitTimeout {
                method: method.to_string(),
                url: url.to_string(),
                timeout_ms: options.timeout_ms(),
            })
        }
    }
}
