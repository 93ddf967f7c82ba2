//! Shared utilities for integration testing: an in-memory host page.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use tokio::sync::watch;

use page_intercept::http::{FetchedResponse, Fulfillment};
use page_intercept::{
    HostError, Intercept, InterceptConfig, InterceptError, InterceptedRequest, InterceptedRoute,
    Page, RouteHook,
};

/// What a hook did with a route.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continued,
    Fulfilled(Fulfillment),
}

/// A single request as the host would hand it to a hook.
pub struct MockRoute {
    request: InterceptedRequest,
    outcome: Mutex<Option<Outcome>>,
    finished: watch::Sender<bool>,
    upstream: Option<FetchedResponse>,
}

impl MockRoute {
    pub fn new(request: InterceptedRequest) -> Arc<Self> {
        Self::build(request, None)
    }

    /// A route whose `fetch` returns `upstream`.
    pub fn with_upstream(request: InterceptedRequest, upstream: FetchedResponse) -> Arc<Self> {
        Self::build(request, Some(upstream))
    }

    fn build(request: InterceptedRequest, upstream: Option<FetchedResponse>) -> Arc<Self> {
        let (finished, _) = watch::channel(false);
        Arc::new(Self {
            request,
            outcome: Mutex::new(None),
            finished,
            upstream,
        })
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome.lock().unwrap().clone()
    }

    pub fn fulfillment(&self) -> Fulfillment {
        match self.outcome() {
            Some(Outcome::Fulfilled(fulfillment)) => fulfillment,
            other => panic!("expected a fulfillment, got {:?}", other),
        }
    }

    pub fn was_continued(&self) -> bool {
        self.outcome() == Some(Outcome::Continued)
    }

    /// Report the exchange complete without settling it, as the host does
    /// when a handler answered the request some other way.
    pub fn finish(&self) {
        self.finished.send_replace(true);
    }

    fn settle(&self, outcome: Outcome) -> Result<(), HostError> {
        let mut slot = self.outcome.lock().unwrap();
        if slot.is_some() {
            return Err(HostError::AlreadyHandled);
        }
        *slot = Some(outcome);
        self.finished.send_replace(true);
        Ok(())
    }
}

#[async_trait]
impl InterceptedRoute for MockRoute {
    fn request(&self) -> &InterceptedRequest {
        &self.request
    }

    async fn continue_request(&self) -> Result<(), HostError> {
        self.settle(Outcome::Continued)
    }

    async fn fulfill(&self, response: Fulfillment) -> Result<(), HostError> {
        self.settle(Outcome::Fulfilled(response))
    }

    async fn fetch(&self) -> Result<FetchedResponse, HostError> {
        self.upstream
            .clone()
            .ok_or_else(|| HostError::Other("network unreachable".into()))
    }

    async fn finished(&self) {
        let mut rx = self.finished.subscribe();
        let _ = rx.wait_for(|done| *done).await;
    }
}

/// In-memory page. The most recently installed hook receives each request.
#[derive(Default)]
pub struct MockPage {
    hooks: Mutex<Vec<Arc<dyn RouteHook>>>,
    rewriters: Mutex<Vec<Arc<dyn RouteHook>>>,
    reject_rewrites: bool,
    rejected: Mutex<Vec<Arc<dyn RouteHook>>>,
}

impl MockPage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A page whose response-rewrite primitive always fails.
    pub fn rejecting_rewrites() -> Arc<Self> {
        Arc::new(Self {
            reject_rewrites: true,
            ..Self::default()
        })
    }

    /// The most recent rewrite hook the page refused to install.
    pub fn rejected_rewrite(&self) -> Option<Arc<dyn RouteHook>> {
        self.rejected.lock().unwrap().last().cloned()
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.lock().unwrap().len() + self.rewriters.lock().unwrap().len()
    }

    /// Route a request through the page's request hooks.
    pub async fn dispatch(
        &self,
        request: InterceptedRequest,
    ) -> (Arc<MockRoute>, Result<(), InterceptError>) {
        let route = MockRoute::new(request);
        let hook = self.hooks.lock().unwrap().last().cloned();
        let result = match hook {
            Some(hook) => hook.handle(route.clone()).await,
            None => route.continue_request().await.map_err(Into::into),
        };
        (route, result)
    }

    /// Route a request and insist the hook succeeded.
    pub async fn request(&self, method: &str, url: &str) -> Arc<MockRoute> {
        let (route, result) = self.dispatch(InterceptedRequest::new(method, url)).await;
        result.expect("hook failed");
        route
    }

    /// Simulate loading a resource whose real response is `upstream`.
    pub async fn load(&self, url: &str, upstream: Option<FetchedResponse>) -> Arc<MockRoute> {
        let request = InterceptedRequest::new("GET", url);
        let route = match upstream {
            Some(upstream) => MockRoute::with_upstream(request, upstream),
            None => MockRoute::new(request),
        };
        let hook = self.rewriters.lock().unwrap().last().cloned();
        match hook {
            Some(hook) => hook.handle(route.clone()).await.expect("rewrite hook failed"),
            None => route.continue_request().await.expect("continue failed"),
        }
        route
    }
}

#[async_trait]
impl Page for MockPage {
    async fn route(&self, hook: Arc<dyn RouteHook>) -> Result<(), HostError> {
        self.hooks.lock().unwrap().push(hook);
        Ok(())
    }

    async fn rewrite_responses(&self, hook: Arc<dyn RouteHook>) -> Result<(), HostError> {
        if self.reject_rewrites {
            self.rejected.lock().unwrap().push(hook);
            return Err(HostError::Other("response rewriting unsupported".into()));
        }
        self.rewriters.lock().unwrap().push(hook);
        Ok(())
    }

    async fn unroute_all(&self) -> Result<(), HostError> {
        self.hooks.lock().unwrap().clear();
        self.rewriters.lock().unwrap().clear();
        Ok(())
    }
}

/// Attach a session to a fresh page.
pub async fn attach(config: InterceptConfig) -> (Arc<MockPage>, Intercept) {
    attach_to(MockPage::new(), config).await
}

/// Attach a session to `page`.
pub async fn attach_to(page: Arc<MockPage>, config: InterceptConfig) -> (Arc<MockPage>, Intercept) {
    let intercept = Intercept::attach(page.clone(), config)
        .await
        .expect("attach failed");
    (page, intercept)
}

/// An upstream HTML response.
pub fn html_response(body: &str, headers: HeaderMap) -> FetchedResponse {
    FetchedResponse {
        status: StatusCode::OK,
        headers,
        body: Bytes::from(body.to_string()),
    }
}
