//! Per-request dispatch.
//!
//! # Data Flow
//! ```text
//! RouteHook::handle(route)
//!     → RequestFilter::excludes(url)?  → continue to network, done
//!     → RuleRegistry::find(method, url)
//!         None → unhandled log, continue to network (errors suppressed)
//!         Some → spawn capture task (route finished → yield → record)
//!              → delay (optional)
//!              → fulfill.rs with the rule's current responder
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;

use crate::error::InterceptError;
use crate::http::{InterceptedRoute, RouteHook};
use crate::intercept::fulfill::fulfill;
use crate::intercept::rule::Rule;
use crate::lifecycle::Shutdown;
use crate::routing::{RequestFilter, RuleRegistry};

/// The session's single request hook.
pub struct Dispatcher {
    registry: Arc<RuleRegistry>,
    filter: Arc<ArcSwap<RequestFilter>>,
    fixture_root: PathBuf,
    shutdown: Arc<Shutdown>,
}

impl Dispatcher {
    pub(crate) fn new(
        registry: Arc<RuleRegistry>,
        filter: Arc<ArcSwap<RequestFilter>>,
        fixture_root: PathBuf,
        shutdown: Arc<Shutdown>,
    ) -> Self {
        Self {
            registry,
            filter,
            fixture_root,
            shutdown,
        }
    }

    /// Record the request on `rule` once the host reports it finished, one
    /// scheduler turn later.
    fn record_on_finish(&self, rule: Arc<Rule>, route: Arc<dyn InterceptedRoute>) {
        let mut shutdown = self.shutdown.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = route.finished() => {
                    tokio::task::yield_now().await;
                    rule.captures().push(route.request().clone());
                    tracing::debug!(
                        method = %rule.method(),
                        url = %rule.url(),
                        count = rule.captures().len(),
                        "Capture recorded"
                    );
                }
                _ = shutdown.recv() => {}
            }
        });
    }
}

#[async_trait]
impl RouteHook for Dispatcher {
    async fn handle(&self, route: Arc<dyn InterceptedRoute>) -> Result<(), InterceptError> {
        let request = route.request().clone();

        if self.filter.load().excludes(request.url()) {
            tracing::debug!(url = %request.url(), "Request excluded by filter");
            let _ = route.continue_request().await;
            return Ok(());
        }

        let Some(found) = self.registry.find(request.method(), request.url()) else {
            tracing::debug!(
                method = %request.method(),
                url = %request.url(),
                "Unhandled request passed through"
            );
            self.registry.record_unhandled(request);
            if let Err(e) = route.continue_request().await {
                tracing::warn!(error = %e, "Pass-through failed");
            }
            return Ok(());
        };

        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            rule = %found.rule.url(),
            path = %found.path,
            "Request dispatched to rule"
        );

        self.record_on_finish(found.rule.clone(), route.clone());

        if let Some(delay) = found.rule.config().delay {
            tokio::time::sleep(delay).await;
        }

        let responder = found.rule.config().responder;
        fulfill(route, request, found.params, responder, &self.fixture_root).await
    }
}
