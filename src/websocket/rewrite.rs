//! Response rewrite hook that points page content at a local relay.
//!
//! # Responsibilities
//! - Fetch each navigation/resource response from the real network
//! - Replace every occurrence of the target websocket URL with the relay URL
//! - Allow the relay in a `connect-src 'self'` content security policy
//!
//! # Design Decisions
//! - Literal substitution only; no HTML or CSP parsing beyond directives
//! - Any failure passes the original request through untouched

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::header::{CONTENT_LENGTH, CONTENT_SECURITY_POLICY};
use axum::http::HeaderValue;

use crate::error::{HostError, InterceptError};
use crate::http::{Fulfillment, FulfillmentBody, InterceptedRoute, RouteHook};

/// Rewrites responses that mention `target_url`.
#[derive(Debug, Clone)]
pub struct RelayRewriteHook {
    target_url: String,
    relay_url: String,
    relay_host: String,
}

impl RelayRewriteHook {
    pub fn new(
        target_url: impl Into<String>,
        relay_url: impl Into<String>,
        relay_host: impl Into<String>,
    ) -> Self {
        Self {
            target_url: target_url.into(),
            relay_url: relay_url.into(),
            relay_host: relay_host.into(),
        }
    }

    /// The rewritten response, or `None` when the body does not mention the
    /// target.
    async fn rewrite(&self, route: &dyn InterceptedRoute) -> Result<Option<Fulfillment>, HostError> {
        let response = route.fetch().await?;
        let Some(text) = response.text() else {
            return Ok(None);
        };
        if !text.contains(&self.target_url) {
            return Ok(None);
        }

        let body = text.replace(&self.target_url, &self.relay_url);

        let mut headers = response.headers.clone();
        headers.remove(CONTENT_LENGTH);
        let widened = headers
            .get(CONTENT_SECURITY_POLICY)
            .and_then(|value| value.to_str().ok())
            .and_then(|policy| widen_connect_src(policy, &self.relay_host));
        if let Some(policy) = widened {
            let value = HeaderValue::from_str(&policy).map_err(|e| HostError::Other(e.to_string()))?;
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }

        Ok(Some(
            Fulfillment::status(response.status)
                .with_headers(headers)
                .with_body(FulfillmentBody::Text(body)),
        ))
    }
}

#[async_trait]
impl RouteHook for RelayRewriteHook {
    async fn handle(&self, route: Arc<dyn InterceptedRoute>) -> Result<(), InterceptError> {
        match self.rewrite(route.as_ref()).await {
            Ok(Some(fulfillment)) => {
                tracing::debug!(
                    url = %route.request().url(),
                    relay = %self.relay_url,
                    "Websocket target rewritten"
                );
                if let Err(e) = route.fulfill(fulfillment).await {
                    tracing::warn!(error = %e, "Rewritten response could not be delivered");
                }
            }
            Ok(None) => {
                let _ = route.continue_request().await;
            }
            Err(e) => {
                tracing::warn!(url = %route.request().url(), error = %e, "Rewrite hook failed");
                let _ = route.continue_request().await;
            }
        }
        Ok(())
    }
}

/// Widen a `connect-src` directive that is exactly `'self'` so the relay
/// host is reachable. Returns `None` when nothing changes.
pub fn widen_connect_src(policy: &str, relay_host: &str) -> Option<String> {
    let mut changed = false;
    let directives: Vec<String> = policy
        .split(';')
        .map(|directive| {
            let tokens: Vec<&str> = directive.split_whitespace().collect();
            if tokens.len() == 2
                && tokens[0].eq_ignore_ascii_case("connect-src")
                && tokens[1] == "'self'"
            {
                changed = true;
                let leading = &directive[..directive.len() - directive.trim_start().len()];
                format!("{leading}connect-src 'self' {relay_host}:* ws://{relay_host}:*")
            } else {
                directive.to_string()
            }
        })
        .collect();

    changed.then(|| directives.join(";"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_self_only() {
        assert_eq!(
            widen_connect_src("default-src 'self'; connect-src 'self'", "localhost").as_deref(),
            Some("default-src 'self'; connect-src 'self' localhost:* ws://localhost:*")
        );
    }

    #[test]
    fn test_leave_other_policies() {
        assert!(widen_connect_src("connect-src 'self' https://api.example.com", "localhost").is_none());
        assert!(widen_connect_src("default-src 'self'", "localhost").is_none());
    }
}
