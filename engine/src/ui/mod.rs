//! UI-facing types for the engine.

mod input;

pub use input::{DraftInput, InputMode};

/// Rendering preferences carried from config to the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
}
