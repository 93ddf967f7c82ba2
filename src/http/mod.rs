//! Host automation framework boundary.
//!
//! The browser/page runtime is an external collaborator. This module defines
//! the shapes the interception core needs from it and nothing more.
//!
//! # Data Flow
//! ```text
//! Page (host)
//!     → RouteHook::handle(route)          (every outbound request)
//!     → route.request()                   (request.rs snapshot)
//!     → route.fulfill(Fulfillment)        (response.rs)
//!       | route.continue_request()
//!     → route.finished()                  (real exchange completed)
//!
//! Page (host)
//!     → rewrite hook (Page::rewrite_responses)
//!     → route.fetch() → FetchedResponse   (real response, rewritten or passed)
//! ```

pub mod host;
pub mod request;
pub mod response;

pub use host::{InterceptedRoute, Page, RouteHook};
pub use request::InterceptedRequest;
pub use response::{FetchedResponse, Fulfillment, FulfillmentBody};
