//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, url)
//!     → filter.rs (static extensions / ignored URLs bypass everything)
//!     → registry.rs (rule lookup in insertion order)
//!     → matcher.rs (host check, path template match, param extraction)
//!     → Return: matched rule + params, or NoMatch (logged as unhandled)
//!
//! Rule Registration:
//!     url template
//!     → matcher.rs compiles once
//!     → registry.rs appends (insertion order is the tie-break)
//! ```
//!
//! # Design Decisions
//! - Patterns compiled at registration, immutable afterwards
//! - Deterministic: same input always matches same rule
//! - First match wins

pub mod filter;
pub mod matcher;
pub mod registry;

pub use filter::RequestFilter;
pub use matcher::{compile, MatchResult, Params, UrlPattern};
pub use registry::{RuleMatch, RuleRegistry};
