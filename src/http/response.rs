//! Responses sent back to the host.
//!
//! # Design Decisions
//! - JSON bodies stay structured until the host serializes them
//! - Status-only fulfillments carry no content type and an empty body

use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use serde_json::Value;

/// Body of a local fulfillment.
#[derive(Debug, Clone, PartialEq)]
pub enum FulfillmentBody {
    Empty,
    /// Structured JSON, serialized by the transport.
    Json(Value),
    Text(String),
    Bytes(Bytes),
}

impl FulfillmentBody {
    /// Wire representation of the body.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            FulfillmentBody::Empty => Bytes::new(),
            FulfillmentBody::Json(value) => Bytes::from(value.to_string()),
            FulfillmentBody::Text(text) => Bytes::from(text.clone()),
            FulfillmentBody::Bytes(bytes) => bytes.clone(),
        }
    }
}

/// A response produced locally for an intercepted request.
#[derive(Debug, Clone, PartialEq)]
pub struct Fulfillment {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub headers: HeaderMap,
    pub body: FulfillmentBody,
}

impl Fulfillment {
    /// Bare status with an empty body.
    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            headers: HeaderMap::new(),
            body: FulfillmentBody::Empty,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: FulfillmentBody) -> Self {
        self.body = body;
        self
    }
}

/// The real network's answer, as returned by `InterceptedRoute::fetch`.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FetchedResponse {
    /// Body as UTF-8, or `None` for binary content.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}
