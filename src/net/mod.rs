//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! open_websocket_bridge
//!     → listener.rs (bind 127.0.0.1:0, read back the port)
//!     → websocket::bridge (axum serves the relay on the listener)
//! ```

pub mod listener;

pub use listener::Listener;
