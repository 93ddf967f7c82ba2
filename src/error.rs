//! Error types surfaced to callers of the interception session.
//!
//! # Design Decisions
//! - Soft failures (unreadable fixture, pattern grammar errors, rewrite
//!   failures) are logged and never appear here
//! - Wait timeouts name the awaited rule so assertion failures are readable
//! - Errors raised by user callbacks propagate unchanged

use thiserror::Error;

use crate::config::loader::ConfigError;

/// Boxed error returned by user-supplied callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors reported by the host automation framework.
#[derive(Debug, Error)]
pub enum HostError {
    /// The request was already fulfilled or continued by another hook.
    #[error("request has already been handled")]
    AlreadyHandled,

    /// The page or browser context went away.
    #[error("page is closed")]
    Closed,

    /// Any other host failure.
    #[error("host error: {0}")]
    Other(String),
}

/// Errors produced by the interception subsystem.
#[derive(Debug, Error)]
pub enum InterceptError {
    /// No new observation arrived before the deadline.
    #[error("Wait timeout: {method} {url} did not receive any requests.")]
    WaitTimeout {
        method: String,
        url: String,
        timeout_ms: u64,
    },

    /// A user handler, transform or fixture resolver failed.
    #[error("callback failed: {0}")]
    Callback(BoxError),

    /// The host failed to fulfill or continue a matched request.
    #[error(transparent)]
    Host(#[from] HostError),

    /// `send` was called on a bridge before any client connected.
    #[error("websocket bridge for {url} has no connected client")]
    BridgeNotConnected { url: String },

    /// Binding the local relay failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl InterceptError {
    /// Returns true for the timeout variant.
    pub fn is_timeout(&self) -> bool {
        matches!(self, InterceptError::WaitTimeout { .. })
    }
}
