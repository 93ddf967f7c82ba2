//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → InterceptConfig (validated, immutable)
//!     → shared via Arc with the session, dispatcher and bridges
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a session is attached
//! - All fields have defaults so an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::InterceptConfig;
pub use schema::ObservabilityConfig;
pub use schema::WaitConfig;
pub use schema::WebsocketConfig;
