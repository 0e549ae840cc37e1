//! Clipboard-write capability.
//!
//! The engine only needs to hand text to some system clipboard and learn whether
//! that worked. The TUI crate supplies the real implementation.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("clipboard write failed: {0}")]
pub struct ClipboardError(pub String);

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}
