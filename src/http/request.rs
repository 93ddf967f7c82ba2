//! Request snapshots.
//!
//! # Design Decisions
//! - Captured requests are owned copies; the host's handle may be gone by the
//!   time a test inspects a capture log
//! - Every snapshot carries a UUID v4 for correlation in logs

use axum::http::HeaderMap;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// An outbound request as seen by the interception core.
#[derive(Debug, Clone)]
pub struct InterceptedRequest {
    id: Uuid,
    method: String,
    url: String,
    headers: HeaderMap,
    post_data: Option<Bytes>,
}

impl InterceptedRequest {
    /// Snapshot a request with a fresh id and no body.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method: method.into().to_ascii_uppercase(),
            url: url.into(),
            headers: HeaderMap::new(),
            post_data: None,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_post_data(mut self, body: impl Into<Bytes>) -> Self {
        self.post_data = Some(body.into());
        self
    }

    /// Unique id assigned when the snapshot was taken.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Upper-cased HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw request body, if any.
    pub fn post_data(&self) -> Option<&Bytes> {
        self.post_data.as_ref()
    }

    /// Post body decoded as UTF-8 (lossy).
    pub fn post_data_text(&self) -> Option<String> {
        self.post_data
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    /// Post body parsed as JSON. `None` when there is no body.
    pub fn post_data_json<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.post_data.as_ref().map(|b| serde_json::from_slice(b))
    }
}
