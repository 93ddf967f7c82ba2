//! Caller-facing handle for a registered rule.

use std::sync::Arc;

use crate::error::InterceptError;
use crate::http::InterceptedRequest;
use crate::intercept::rule::{Method, Rule, RuleUpdate};
use crate::observation::{wait_for_observation, WaitOptions};

/// Returned by registration; observes and updates one rule.
#[derive(Debug, Clone)]
pub struct RuleHandle {
    rule: Arc<Rule>,
    wait_defaults: WaitOptions,
}

impl RuleHandle {
    pub(crate) fn new(rule: Arc<Rule>, wait_defaults: WaitOptions) -> Self {
        Self { rule, wait_defaults }
    }

    /// Method the rule answers.
    pub fn method(&self) -> Method {
        self.rule.method()
    }

    /// URL template the rule was registered with.
    pub fn url(&self) -> &str {
        self.rule.url()
    }

    /// Requests answered by this rule, in the order they finished.
    pub fn captured_requests(&self) -> Vec<InterceptedRequest> {
        self.rule.captures().snapshot()
    }

    /// Number of captured requests.
    pub fn request_count(&self) -> usize {
        self.rule.captures().len()
    }

    /// Wait for a request not yet consumed by a previous wait, using the
    /// session's default timeout.
    pub async fn wait(&self) -> Result<(), InterceptError> {
        self.wait_with(self.wait_defaults).await
    }

    /// Like [`RuleHandle::wait`] with explicit timing.
    ///
    /// Two concurrent waits on one rule share a single baseline; the first to
    /// observe a new request consumes it for both.
    pub async fn wait_with(&self, options: WaitOptions) -> Result<(), InterceptError> {
        wait_for_observation(
            self.rule.captures(),
            self.rule.method().as_str(),
            self.rule.url(),
            options,
        )
        .await
    }

    /// Change the rule's response. Takes effect from the next matched request.
    pub fn update(&self, update: impl Into<RuleUpdate>) -> &Self {
        self.rule.update(update.into());
        self
    }
}
