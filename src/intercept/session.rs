//! The interception session exposed to tests.
//!
//! # Responsibilities
//! - Subscribe one dispatcher to the page for the session's lifetime
//! - Register rules and hand out `RuleHandle`s
//! - Maintain the ignored-URL list behind an atomically swapped filter
//! - Open websocket bridges and shut them down with the session

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::config::loader::ConfigError;
use crate::config::validation::validate_config;
use crate::config::InterceptConfig;
use crate::error::InterceptError;
use crate::http::{InterceptedRequest, Page};
use crate::intercept::dispatch::Dispatcher;
use crate::intercept::handle::RuleHandle;
use crate::intercept::rule::{Method, Rule, RuleOptions};
use crate::lifecycle::Shutdown;
use crate::observation::WaitOptions;
use crate::routing::{RequestFilter, RuleRegistry};
use crate::websocket::bridge::{BridgeHandle, BridgeMessage};
use crate::websocket::RelayRewriteHook;

/// Interception state bound to one page.
pub struct Intercept {
    page: Arc<dyn Page>,
    config: Arc<InterceptConfig>,
    registry: Arc<RuleRegistry>,
    filter: Arc<ArcSwap<RequestFilter>>,
    ignored_urls: Mutex<Vec<String>>,
    shutdown: Arc<Shutdown>,
}

impl Intercept {
    /// Validate `config` and subscribe to every request of `page`.
    pub async fn attach(page: Arc<dyn Page>, config: InterceptConfig) -> Result<Self, InterceptError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let config = Arc::new(config);
        let registry = Arc::new(RuleRegistry::new());
        let filter = Arc::new(ArcSwap::from_pointee(RequestFilter::new(
            &config.static_extensions,
            &[],
        )));
        let shutdown = Arc::new(Shutdown::new());

        let dispatcher = Dispatcher::new(
            registry.clone(),
            filter.clone(),
            config.fixture_root_path.clone(),
            shutdown.clone(),
        );
        page.route(Arc::new(dispatcher)).await?;

        tracing::info!(
            fixture_root = %config.fixture_root_path.display(),
            static_extensions = ?config.static_extensions,
            "Interception session attached"
        );

        Ok(Self {
            page,
            config,
            registry,
            filter,
            ignored_urls: Mutex::new(Vec::new()),
            shutdown,
        })
    }

    /// The validated configuration the session runs with.
    pub fn config(&self) -> &InterceptConfig {
        &self.config
    }

    /// Directory fixture paths are resolved against.
    pub fn fixture_root(&self) -> &Path {
        &self.config.fixture_root_path
    }

    fn wait_defaults(&self) -> WaitOptions {
        WaitOptions::from_config(&self.config.wait)
    }

    /// Register a rule. Rules registered earlier win when several match.
    pub fn register(&self, method: Method, options: RuleOptions) -> RuleHandle {
        let rule = Arc::new(Rule::new(method, options));
        tracing::debug!(
            method = %rule.method(),
            url = %rule.url(),
            literal = rule.pattern().is_literal(),
            "Rule registered"
        );
        self.registry.insert(rule.clone());
        RuleHandle::new(rule, self.wait_defaults())
    }

    /// Register a `GET` rule.
    pub fn get(&self, options: RuleOptions) -> RuleHandle {
        self.register(Method::Get, options)
    }

    /// Register a `POST` rule.
    pub fn post(&self, options: RuleOptions) -> RuleHandle {
        self.register(Method::Post, options)
    }

    /// Register a `PUT` rule.
    pub fn put(&self, options: RuleOptions) -> RuleHandle {
        self.register(Method::Put, options)
    }

    /// Register a `PATCH` rule.
    pub fn patch(&self, options: RuleOptions) -> RuleHandle {
        self.register(Method::Patch, options)
    }

    /// Register a `DELETE` rule.
    pub fn delete(&self, options: RuleOptions) -> RuleHandle {
        self.register(Method::Delete, options)
    }

    /// Let requests whose URL contains `url` reach the network untouched.
    ///
    /// The new filter replaces the old one in a single swap, so no request
    /// observes a half-updated filter.
    pub fn add_ignored_url(&self, url: impl Into<String>) {
        let mut ignored = self
            .ignored_urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        ignored.push(url.into());
        self.filter.store(Arc::new(RequestFilter::new(
            &self.config.static_extensions,
            &ignored,
        )));
        tracing::debug!(ignored = ?*ignored, "Ignored URL filter swapped");
    }

    /// Ignored URL fragments, in insertion order.
    pub fn ignored_urls(&self) -> Vec<String> {
        self.ignored_urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests that matched no rule, oldest first.
    pub fn unhandled_requests(&self) -> Vec<InterceptedRequest> {
        self.registry.unhandled_requests()
    }

    /// Replace the page's websocket connection to `target_url` with a local
    /// relay and deliver its traffic to `handler`.
    pub async fn open_websocket_bridge<F>(
        &self,
        target_url: impl Into<String>,
        handler: F,
    ) -> Result<BridgeHandle, InterceptError>
    where
        F: Fn(BridgeMessage) + Send + Sync + 'static,
    {
        let target_url = target_url.into();
        let bridge = BridgeHandle::open(
            &target_url,
            Arc::new(handler),
            &self.config.websocket,
            self.wait_defaults(),
            &self.shutdown,
        )
        .await?;

        let hook = RelayRewriteHook::new(
            target_url,
            bridge.relay_url(),
            self.config.websocket.relay_host.clone(),
        );
        if let Err(e) = self.page.rewrite_responses(Arc::new(hook)).await {
            bridge.close();
            return Err(e.into());
        }

        Ok(bridge)
    }

    /// Remove the session's hooks from the page and stop every bridge.
    pub async fn close(&self) -> Result<(), InterceptError> {
        self.shutdown.trigger();
        self.page.unroute_all().await?;
        tracing::info!(rules = self.registry.len(), "Interception session closed");
        Ok(())
    }
}

impl Drop for Intercept {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

impl std::fmt::Debug for Intercept {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Intercept")
            .field("config", &self.config)
            .field("rules", &self.registry.len())
            .field("ignored_urls", &self.ignored_urls())
            .finish()
    }
}
