//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, relays, fulfillment:
//!     → tracing events with structured fields (method, url, port)
//!     → whatever subscriber the caller installed, or logging.rs's default
//! ```
//!
//! # Design Decisions
//! - The library never installs a subscriber on its own
//! - Soft failures are reported as warn events instead of errors

pub mod logging;

pub use logging::{init_logging, init_logging_from};
