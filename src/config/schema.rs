//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for an interception session.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct InterceptConfig {
    /// Directory that fixture paths are joined against.
    pub fixture_root_path: PathBuf,

    /// File extensions (without the dot) that bypass interception entirely.
    pub static_extensions: Vec<String>,

    /// Defaults for `wait` calls.
    pub wait: WaitConfig,

    /// Websocket relay settings.
    pub websocket: WebsocketConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl InterceptConfig {
    /// Config with a fixture root and nothing else changed.
    pub fn with_fixture_root(path: impl Into<PathBuf>) -> Self {
        Self {
            fixture_root_path: path.into(),
            ..Self::default()
        }
    }

    /// Builder-style setter for the static extension list.
    pub fn static_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.static_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }
}

/// Wait coordinator defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Deadline for a wait in milliseconds.
    pub default_timeout_ms: u64,

    /// Interval between predicate evaluations in milliseconds.
    pub poll_interval_ms: u64,
}

impl WaitConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 5000,
            poll_interval_ms: 10,
        }
    }
}

/// Websocket bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebsocketConfig {
    /// Interface the relay listener binds to.
    pub bind_host: String,

    /// Host written into the `ws://` relay URL substituted into page content.
    pub relay_host: String,

    /// Sentinel delivered to the handler when a client connects.
    pub handshake_message: String,
}

impl Default for WebsocketConfig {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".to_string(),
            relay_host: "localhost".to_string(),
            handshake_message: "intercept:handshake".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
