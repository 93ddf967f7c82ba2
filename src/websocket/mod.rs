//! Websocket bridge subsystem.
//!
//! # Data Flow
//! ```text
//! open_websocket_bridge(target, handler)
//!     → net::Listener::bind_ephemeral      (OS-assigned port)
//!     → rewrite.rs                         (page content: target → ws://host:port)
//!     → bridge.rs                          (axum relay on the listener)
//!
//! Page client ──ws──→ relay
//!     → handshake sentinel, then each client frame
//!     → payload log (CaptureLog) → BridgeHandle::wait
//!     → handler({message, send}) ──send──→ client
//! ```

pub mod bridge;
pub mod rewrite;

pub use bridge::{BridgeHandle, BridgeMessage, BridgeSender};
pub use rewrite::{widen_connect_src, RelayRewriteHook};
