//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Intercept::close / drop → trigger → every relay stops accepting
//!     → open websocket connections drain → servers exit
//! ```
//!
//! # Design Decisions
//! - One coordinator per interception session
//! - Relays subscribe before serving, so no signal is missed

pub mod shutdown;

pub use shutdown::Shutdown;
