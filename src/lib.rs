//! Network interception for browser-driven tests.
//!
//! A session subscribes to every request of a page, answers the ones that
//! match registered rules with canned, computed or status-only responses, and
//! lets tests wait for those requests to happen. A websocket bridge can stand
//! in for a page's real websocket server.

pub mod config;
pub mod content;
pub mod error;
pub mod http;
pub mod intercept;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod observation;
pub mod routing;
pub mod websocket;

pub use config::InterceptConfig;
pub use content::{sniff, Body, MimeType, SniffInput};
pub use error::{BoxError, HostError, InterceptError};
pub use http::{InterceptedRequest, InterceptedRoute, Page, RouteHook};
pub use intercept::{Intercept, Method, RuleHandle, RuleOptions, RulePatch, RuleUpdate};
pub use observability::{init_logging, init_logging_from};
pub use observation::WaitOptions;
pub use routing::{compile, Params};
pub use websocket::{BridgeHandle, BridgeMessage};
