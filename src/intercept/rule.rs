//! Rule data model.
//!
//! # Responsibilities
//! - Describe how a matched request is answered (`Responder`)
//! - Hold the per-rule capture log
//! - Apply `update` transitions between responder variants
//!
//! # Design Decisions
//! - Exactly one responder variant at any instant; `update` may swap it
//! - The compiled pattern never changes after registration
//! - Callbacks are `Arc`ed so a config snapshot is cheap to clone per request

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use axum::http::StatusCode;
use futures_util::future::{BoxFuture, FutureExt};

use crate::content::{Body, MimeType};
use crate::error::BoxError;
use crate::http::{InterceptedRequest, InterceptedRoute};
use crate::observation::CaptureLog;
use crate::routing::{Params, UrlPattern};

/// HTTP method a rule answers, or the websocket sentinel used by bridges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    WebSocket,
}

impl Method {
    /// Upper-case name as used in wait timeout messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::WebSocket => "WSS",
        }
    }

    /// Case-insensitive comparison with a request method. Websocket rules
    /// never match HTTP requests.
    pub fn matches(&self, method: &str) -> bool {
        *self != Method::WebSocket && self.as_str().eq_ignore_ascii_case(method)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments handed to a handler callback.
pub struct HandlerContext {
    pub route: Arc<dyn InterceptedRoute>,
    pub params: Params,
    pub request: InterceptedRequest,
}

/// Arguments handed to a transform callback.
pub struct TransformContext<'a> {
    /// The resolved body. JSON content arrives as `Body::Json`.
    pub body: Body,
    pub params: &'a Params,
    pub request: &'a InterceptedRequest,
}

/// Arguments handed to a fixture resolver.
pub struct FixtureContext<'a> {
    pub route: &'a dyn InterceptedRoute,
    pub params: &'a Params,
}

pub type HandlerFn =
    Arc<dyn Fn(HandlerContext) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;
pub type TransformFn = Arc<dyn Fn(TransformContext<'_>) -> Result<Body, BoxError> + Send + Sync>;
pub type FixtureFn = Arc<dyn Fn(FixtureContext<'_>) -> Result<PathBuf, BoxError> + Send + Sync>;

/// Where a fixture path comes from.
#[derive(Clone)]
pub enum FixtureSource {
    /// Relative to the configured fixture root.
    Path(PathBuf),
    /// Computed per request from the route and its params.
    Resolve(FixtureFn),
}

impl fmt::Debug for FixtureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            FixtureSource::Resolve(_) => f.write_str("Resolve(<fn>)"),
        }
    }
}

/// Body of a static response.
#[derive(Debug, Clone)]
pub enum BodySource {
    Inline(Body),
    Fixture(FixtureSource),
}

/// A canned response, optionally post-processed by a transform.
#[derive(Clone)]
pub struct StaticResponse {
    pub source: BodySource,
    /// Overrides the inferred content type.
    pub mime_type: Option<MimeType>,
    pub transform: Option<TransformFn>,
    pub status: StatusCode,
}

impl StaticResponse {
    pub fn new(source: BodySource) -> Self {
        Self {
            source,
            mime_type: None,
            transform: None,
            status: StatusCode::OK,
        }
    }

    /// Inline body, if the source is not a fixture.
    pub fn body_mut(&mut self) -> Option<&mut Body> {
        match &mut self.source {
            BodySource::Inline(body) => Some(body),
            BodySource::Fixture(_) => None,
        }
    }
}

impl fmt::Debug for StaticResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticResponse")
            .field("source", &self.source)
            .field("mime_type", &self.mime_type)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .field("status", &self.status)
            .finish()
    }
}

/// How a matched request is answered.
#[derive(Clone)]
pub enum Responder {
    Static(StaticResponse),
    /// The callback owns the whole response.
    Handler(HandlerFn),
    /// Bare status, empty body.
    Status(StatusCode),
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Responder::Static(response) => f.debug_tuple("Static").field(response).finish(),
            Responder::Handler(_) => f.write_str("Handler(<fn>)"),
            Responder::Status(status) => f.debug_tuple("Status").field(status).finish(),
        }
    }
}

/// Mutable part of a rule.
#[derive(Debug, Clone)]
pub struct RuleConfig {
    pub responder: Responder,
    /// Artificial latency before any response is produced.
    pub delay: Option<Duration>,
}

impl RuleConfig {
    pub fn new(responder: Responder) -> Self {
        Self {
            responder,
            delay: None,
        }
    }

    /// The static response, when the rule has one.
    pub fn static_response_mut(&mut self) -> Option<&mut StaticResponse> {
        match &mut self.responder {
            Responder::Static(response) => Some(response),
            _ => None,
        }
    }

    /// Merge `patch` into this config.
    ///
    /// A handler in the patch replaces the responder outright. A body or
    /// fixture turns any responder into a static one, keeping static settings
    /// that were already there. A status alone updates the current variant,
    /// and turns a handler rule into a status-only rule.
    pub fn apply(&mut self, patch: RulePatch) {
        if let Some(delay) = patch.delay {
            self.delay = Some(delay);
        }

        if let Some(handler) = patch.handler {
            self.responder = Responder::Handler(handler);
            return;
        }

        let source = match (patch.body, patch.fixture) {
            (_, Some(fixture)) => Some(BodySource::Fixture(fixture)),
            (Some(body), None) => Some(BodySource::Inline(body)),
            (None, None) => None,
        };
        if let Some(source) = source {
            match &mut self.responder {
                Responder::Static(response) => response.source = source,
                Responder::Status(status) => {
                    let mut response = StaticResponse::new(source);
                    response.status = *status;
                    self.responder = Responder::Static(response);
                }
                Responder::Handler(_) => {
                    self.responder = Responder::Static(StaticResponse::new(source));
                }
            }
        }

        if let Some(status) = patch.status {
            match &mut self.responder {
                Responder::Static(response) => response.status = status,
                Responder::Status(current) => *current = status,
                Responder::Handler(_) => self.responder = Responder::Status(status),
            }
        }

        if let Responder::Static(response) = &mut self.responder {
            if patch.mime_type.is_some() {
                response.mime_type = patch.mime_type;
            }
            if patch.transform.is_some() {
                response.transform = patch.transform;
            }
        }
    }
}

/// Registration options: the URL template plus the rule's initial config.
#[derive(Debug, Clone)]
pub struct RuleOptions {
    pub url: String,
    pub config: RuleConfig,
}

impl RuleOptions {
    fn new(url: impl Into<String>, responder: Responder) -> Self {
        Self {
            url: url.into(),
            config: RuleConfig::new(responder),
        }
    }

    /// Answer with an inline body.
    pub fn body(url: impl Into<String>, body: impl Into<Body>) -> Self {
        Self::new(
            url,
            Responder::Static(StaticResponse::new(BodySource::Inline(body.into()))),
        )
    }

    /// Answer with a fixture file relative to the fixture root.
    pub fn fixture(url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(
            url,
            Responder::Static(StaticResponse::new(BodySource::Fixture(FixtureSource::Path(
                path.into(),
            )))),
        )
    }

    /// Answer with a fixture whose path is computed per request.
    pub fn fixture_with<F>(url: impl Into<String>, resolve: F) -> Self
    where
        F: Fn(FixtureContext<'_>) -> Result<PathBuf, BoxError> + Send + Sync + 'static,
    {
        Self::new(
            url,
            Responder::Static(StaticResponse::new(BodySource::Fixture(
                FixtureSource::Resolve(Arc::new(resolve)),
            ))),
        )
    }

    /// Hand the request to a callback.
    pub fn handler<F, Fut>(url: impl Into<String>, handler: F) -> Self
    where
        F: Fn(HandlerContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self::new(url, Responder::Handler(handler_fn(handler)))
    }

    /// Answer with a bare status.
    pub fn status(url: impl Into<String>, status: StatusCode) -> Self {
        Self::new(url, Responder::Status(status))
    }

    /// Status for static and status-only rules. No effect on handler rules.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        match &mut self.config.responder {
            Responder::Static(response) => response.status = status,
            Responder::Status(current) => *current = status,
            Responder::Handler(_) => {}
        }
        self
    }

    /// Content type override for static rules.
    pub fn with_mime_type(mut self, mime_type: MimeType) -> Self {
        if let Some(response) = self.config.static_response_mut() {
            response.mime_type = Some(mime_type);
        }
        self
    }

    /// Body transform for static rules.
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(TransformContext<'_>) -> Result<Body, BoxError> + Send + Sync + 'static,
    {
        if let Some(response) = self.config.static_response_mut() {
            response.transform = Some(Arc::new(transform));
        }
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.config.delay = Some(delay);
        self
    }
}

/// Field-wise changes merged into a rule by [`RuleConfig::apply`].
#[derive(Default, Clone)]
pub struct RulePatch {
    pub body: Option<Body>,
    pub fixture: Option<FixtureSource>,
    pub handler: Option<HandlerFn>,
    pub status: Option<StatusCode>,
    pub mime_type: Option<MimeType>,
    pub transform: Option<TransformFn>,
    pub delay: Option<Duration>,
}

impl RulePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn fixture(mut self, path: impl Into<PathBuf>) -> Self {
        self.fixture = Some(FixtureSource::Path(path.into()));
        self
    }

    pub fn handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(HandlerContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.handler = Some(handler_fn(handler));
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn mime_type(mut self, mime_type: MimeType) -> Self {
        self.mime_type = Some(mime_type);
        self
    }

    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(TransformContext<'_>) -> Result<Body, BoxError> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl fmt::Debug for RulePatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RulePatch")
            .field("body", &self.body)
            .field("fixture", &self.fixture)
            .field("handler", &self.handler.as_ref().map(|_| "<fn>"))
            .field("status", &self.status)
            .field("mime_type", &self.mime_type)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .field("delay", &self.delay)
            .finish()
    }
}

/// A change to a registered rule.
pub enum RuleUpdate {
    Patch(RulePatch),
    /// Receives the current config and returns its replacement.
    Transform(Box<dyn FnOnce(RuleConfig) -> RuleConfig + Send>),
}

impl RuleUpdate {
    pub fn transform<F>(f: F) -> Self
    where
        F: FnOnce(RuleConfig) -> RuleConfig + Send + 'static,
    {
        RuleUpdate::Transform(Box::new(f))
    }
}

impl From<RulePatch> for RuleUpdate {
    fn from(patch: RulePatch) -> Self {
        RuleUpdate::Patch(patch)
    }
}

impl fmt::Debug for RuleUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleUpdate::Patch(patch) => f.debug_tuple("Patch").field(patch).finish(),
            RuleUpdate::Transform(_) => f.write_str("Transform(<fn>)"),
        }
    }
}

/// A registered interception rule.
#[derive(Debug)]
pub struct Rule {
    method: Method,
    pattern: UrlPattern,
    config: RwLock<RuleConfig>,
    captures: CaptureLog<InterceptedRequest>,
}

impl Rule {
    /// Compile the rule's URL template.
    pub fn new(method: Method, options: RuleOptions) -> Self {
        Self {
            method,
            pattern: UrlPattern::compile(&options.url),
            config: RwLock::new(options.config),
            captures: CaptureLog::new(),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Compiled URL template.
    pub fn pattern(&self) -> &UrlPattern {
        &self.pattern
    }

    /// The URL template as registered.
    pub fn url(&self) -> &str {
        self.pattern.source()
    }

    /// Snapshot of the current config.
    pub fn config(&self) -> RuleConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply a patch or transform to the stored config.
    pub fn update(&self, update: RuleUpdate) {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        match update {
            RuleUpdate::Patch(patch) => config.apply(patch),
            RuleUpdate::Transform(transform) => {
                let current = config.clone();
                *config = transform(current);
            }
        }
        tracing::debug!(method = %self.method, url = %self.url(), "Rule updated");
    }

    /// Requests recorded once their exchange finished.
    pub fn captures(&self) -> &CaptureLog<InterceptedRequest> {
        &self.captures
    }
}

fn handler_fn<F, Fut>(handler: F) -> HandlerFn
where
    F: Fn(HandlerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    Arc::new(move |ctx| handler(ctx).boxed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn static_of(config: &RuleConfig) -> &StaticResponse {
        match &config.responder {
            Responder::Static(response) => response,
            other => panic!("expected static responder, got {other:?}"),
        }
    }

    #[test]
    fn test_method_matching() {
        assert!(Method::Get.matches("get"));
        assert!(!Method::Get.matches("POST"));
        assert!(!Method::WebSocket.matches("WSS"));
        assert_eq!(Method::WebSocket.to_string(), "WSS");
    }

    #[test]
    fn test_options_builders() {
        let options = RuleOptions::body("/a", json!({"id": 0}))
            .with_status(StatusCode::CREATED)
            .with_mime_type(MimeType::Text)
            .with_delay(Duration::from_millis(5));

        let response = static_of(&options.config);
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.mime_type, Some(MimeType::Text));
        assert_eq!(options.config.delay, Some(Duration::from_millis(5)));
    }

    #[test]
    fn test_patch_status_keeps_body() {
        let mut config = RuleOptions::body("/a", "hello").config;
        config.apply(RulePatch::new().status(StatusCode::BAD_REQUEST));

        let response = static_of(&config);
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(matches!(&response.source, BodySource::Inline(Body::Text(t)) if t == "hello"));
    }

    #[test]
    fn test_patch_body_turns_status_rule_static() {
        let mut config = RuleOptions::status("/a", StatusCode::ACCEPTED).config;
        config.apply(RulePatch::new().body(json!({"ok": true})));

        let response = static_of(&config);
        assert_eq!(response.status, StatusCode::ACCEPTED);
        assert!(matches!(response.source, BodySource::Inline(Body::Json(_))));
    }

    #[test]
    fn test_patch_status_on_handler() {
        let mut config = RuleOptions::handler("/a", |_ctx| async { Ok(()) }).config;
        config.apply(RulePatch::new().status(StatusCode::NOT_FOUND));
        assert!(matches!(config.responder, Responder::Status(StatusCode::NOT_FOUND)));

        config.apply(RulePatch::new().handler(|_ctx| async { Ok(()) }));
        assert!(matches!(config.responder, Responder::Handler(_)));
    }

    #[test]
    fn test_transform_update_replaces_config() {
        let rule = Rule::new(Method::Get, RuleOptions::body("/a", json!({"id": 0})));
        rule.update(RuleUpdate::transform(|mut config| {
            if let Some(response) = config.static_response_mut() {
                response.status = StatusCode::BAD_REQUEST;
                if let Some(value) = response.body_mut().and_then(Body::as_json_mut) {
                    value["id"] = json!(1);
                }
            }
            config
        }));

        let config = rule.config();
        let response = static_of(&config);
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(matches!(&response.source, BodySource::Inline(Body::Json(v)) if v == &json!({"id": 1})));
        assert_eq!(rule.url(), "/a");
    }
}
