//! Fulfillment pipeline: turns a matched rule's responder into a response.
//!
//! # Data Flow
//! ```text
//! Responder::Static
//!     → resolve body (inline, or fixture root + path read as text)
//!     → resolve content type (override, else fixture extension, else sniff)
//!     → JSON content parsed into a structured value
//!     → transform callback (optional)
//!     → route.fulfill(status, content type, body)
//!
//! Responder::Handler → user callback owns the response
//! Responder::Status  → route.fulfill(status, empty body)
//! ```
//!
//! # Design Decisions
//! - An unreadable fixture is logged and answered with an empty body
//! - Callback errors propagate unchanged as `InterceptError::Callback`

use std::path::Path;
use std::sync::Arc;

use crate::content::{sniff_body, sniff_path, Body, MimeType};
use crate::error::InterceptError;
use crate::http::{Fulfillment, FulfillmentBody, InterceptedRequest, InterceptedRoute};
use crate::intercept::rule::{
    BodySource, FixtureContext, FixtureSource, HandlerContext, Responder, StaticResponse,
    TransformContext,
};
use crate::routing::Params;

/// Answer `route` according to `responder`.
pub(crate) async fn fulfill(
    route: Arc<dyn InterceptedRoute>,
    request: InterceptedRequest,
    params: Params,
    responder: Responder,
    fixture_root: &Path,
) -> Result<(), InterceptError> {
    match responder {
        Responder::Static(response) => {
            let fulfillment =
                build_static(route.as_ref(), &request, &params, response, fixture_root).await?;
            route.fulfill(fulfillment).await?;
            Ok(())
        }
        Responder::Handler(handler) => handler(HandlerContext {
            route,
            params,
            request,
        })
        .await
        .map_err(InterceptError::Callback),
        Responder::Status(status) => {
            route.fulfill(Fulfillment::status(status)).await?;
            Ok(())
        }
    }
}

async fn build_static(
    route: &dyn InterceptedRoute,
    request: &InterceptedRequest,
    params: &Params,
    response: StaticResponse,
    fixture_root: &Path,
) -> Result<Fulfillment, InterceptError> {
    let (body, detected) = match response.source {
        BodySource::Inline(body) => {
            let detected = sniff_body(&body.normalize());
            (Some(body), detected)
        }
        BodySource::Fixture(source) => {
            let relative = match source {
                FixtureSource::Path(path) => path,
                FixtureSource::Resolve(resolve) => {
                    resolve(FixtureContext { route, params }).map_err(InterceptError::Callback)?
                }
            };
            let path = fixture_root.join(relative);
            let detected = sniff_path(&path);
            (read_fixture(&path).await.map(Body::Text), detected)
        }
    };

    let mime_type = response.mime_type.unwrap_or(detected);
    let mut body = body.map(|body| shape_body(body, &mime_type));

    if let Some(transform) = response.transform {
        let input = body.take().unwrap_or_else(|| Body::Text(String::new()));
        body = Some(
            transform(TransformContext {
                body: input,
                params,
                request,
            })
            .map_err(InterceptError::Callback)?,
        );
    }

    tracing::debug!(
        url = %request.url(),
        status = %response.status,
        content_type = %mime_type,
        "Fulfilling static response"
    );

    Ok(Fulfillment::status(response.status)
        .with_content_type(mime_type.as_str())
        .with_body(body.map_or(FulfillmentBody::Empty, Body::into_fulfillment)))
}

/// Parse JSON content into a structured value; keep everything else as text
/// or raw bytes.
fn shape_body(body: Body, mime_type: &MimeType) -> Body {
    if !mime_type.is_json() {
        return match body {
            Body::Json(value) => Body::Text(value.to_string()),
            other => other,
        };
    }

    match body {
        Body::Json(value) => Body::Json(value),
        other => {
            let text = other.normalize();
            match serde_json::from_str(&text) {
                Ok(value) => Body::Json(value),
                Err(e) => {
                    tracing::warn!(error = %e, "JSON response body does not parse, sending as text");
                    Body::Text(text)
                }
            }
        }
    }
}

async fn read_fixture(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Fixture read error: file does not exist or cannot be read"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shape_json_text_parses() {
        let shaped = shape_body(Body::Text("{\"a\":1}".into()), &MimeType::Json);
        assert_eq!(shaped, Body::Json(json!({"a": 1})));
    }

    #[test]
    fn test_shape_invalid_json_falls_back_to_text() {
        let shaped = shape_body(Body::Text("not json".into()), &MimeType::Json);
        assert_eq!(shaped, Body::Text("not json".into()));
    }

    #[test]
    fn test_shape_non_json_keeps_bytes() {
        let raw = Body::Bytes(bytes::Bytes::from_static(&[0, 1, 2]));
        assert_eq!(shape_body(raw.clone(), &MimeType::Other("image/png".into())), raw);
        assert_eq!(
            shape_body(Body::Json(json!({"a": 1})), &MimeType::Text),
            Body::Text("{\"a\":1}".into())
        );
    }

    #[tokio::test]
    async fn test_missing_fixture_is_soft() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_fixture(&dir.path().join("missing.json")).await.is_none());
    }
}
