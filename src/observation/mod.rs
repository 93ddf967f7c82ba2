//! Observation subsystem: capture logs and the waits that consume them.
//!
//! Both rule handles and websocket bridges record what they see into a
//! [`CaptureLog`] and expose `wait` on top of [`wait_for_observation`].

pub mod log;
pub mod wait;

pub use log::CaptureLog;
pub use wait::{wait_for_observation, WaitOptions};
