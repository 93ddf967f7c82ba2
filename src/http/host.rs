//! Traits implemented by the host automation framework.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{HostError, InterceptError};
use crate::http::request::InterceptedRequest;
use crate::http::response::{FetchedResponse, Fulfillment};

/// A single in-flight request handed to a hook by the host.
///
/// Exactly one of `continue_request` or `fulfill` should be called per route;
/// a second call is reported as [`HostError::AlreadyHandled`].
#[async_trait]
pub trait InterceptedRoute: Send + Sync {
    /// Snapshot of the outbound request.
    fn request(&self) -> &InterceptedRequest;

    /// Let the request reach the real network unmodified.
    async fn continue_request(&self) -> Result<(), HostError>;

    /// Answer the request locally.
    async fn fulfill(&self, response: Fulfillment) -> Result<(), HostError>;

    /// Perform the real request and return its response without answering
    /// the page yet.
    async fn fetch(&self) -> Result<FetchedResponse, HostError>;

    /// Resolves once the host reports the request finished.
    async fn finished(&self);
}

/// Receives every request the host routes to it.
#[async_trait]
pub trait RouteHook: Send + Sync {
    async fn handle(&self, route: Arc<dyn InterceptedRoute>) -> Result<(), InterceptError>;
}

/// The page-level subscription primitive.
#[async_trait]
pub trait Page: Send + Sync {
    /// Subscribe a hook to all network requests of the page.
    async fn route(&self, hook: Arc<dyn RouteHook>) -> Result<(), HostError>;

    /// Subscribe a hook to every navigation and resource response, so it can
    /// fetch the real response and fulfill a rewritten one.
    async fn rewrite_responses(&self, hook: Arc<dyn RouteHook>) -> Result<(), HostError>;

    /// Remove every request and response hook this session installed.
    async fn unroute_all(&self) -> Result<(), HostError>;
}
