//! Canned response bodies.

use bytes::Bytes;
use serde_json::Value;

use crate::http::FulfillmentBody;

/// An inline response body as registered on a rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(String),
    /// Structured data, serialized to compact JSON on the wire.
    Json(Value),
    Bytes(Bytes),
}

impl Body {
    /// Text form of the body: bytes are decoded lossily, structured values
    /// become compact JSON, strings pass through.
    pub fn normalize(&self) -> String {
        match self {
            Body::Text(text) => text.clone(),
            Body::Json(value) => value.to_string(),
            Body::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_json_mut(&mut self) -> Option<&mut Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn into_fulfillment(self) -> FulfillmentBody {
        match self {
            Body::Text(text) => FulfillmentBody::Text(text),
            Body::Json(value) => FulfillmentBody::Json(value),
            Body::Bytes(bytes) => FulfillmentBody::Bytes(bytes),
        }
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(bytes))
    }
}
