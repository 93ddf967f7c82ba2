//! Interception subsystem.
//!
//! # Data Flow
//! ```text
//! Intercept::get/post/... (session.rs)
//!     → rule.rs (compile pattern, build responder)
//!     → routing::RuleRegistry (append)
//!     → RuleHandle (handle.rs)
//!
//! Host request
//!     → dispatch.rs (filter, lookup, capture scheduling, delay)
//!     → fulfill.rs (static body / handler / status)
//!     → capture log → RuleHandle::wait
//! ```
//!
//! # Design Decisions
//! - One hook is subscribed per session; the filter is swapped beneath it
//! - The responder is read per request, so updates apply to the next match

pub mod dispatch;
pub mod fulfill;
pub mod handle;
pub mod rule;
pub mod session;

pub use dispatch::Dispatcher;
pub use handle::RuleHandle;
pub use rule::{
    BodySource, FixtureContext, FixtureSource, HandlerContext, Method, Responder, Rule,
    RuleConfig, RuleOptions, RulePatch, RuleUpdate, StaticResponse, TransformContext,
};
pub use session::Intercept;
