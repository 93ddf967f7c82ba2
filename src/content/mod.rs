//! Response content handling.
//!
//! # Data Flow
//! ```text
//! inline body (text / JSON / bytes)
//!     → body.rs (normalize to text)
//!     → mime.rs (sniff from body: JSON → HTML → CSS → script parser → text)
//!
//! fixture path
//!     → mime.rs (extension table, legacy JS type normalized)
//! ```

pub mod body;
pub mod mime;

pub use body::Body;
pub use mime::{sniff, sniff_body, sniff_path, MimeType, SniffInput};
