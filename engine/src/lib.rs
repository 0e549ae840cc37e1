//! Core engine for the excuse wizard - state machine and orchestration.
//!
//! This crate contains the `App` session without TUI dependencies, providing:
//!
//! - **Selection**: the four-step answers and their snapshot token
//! - **Cascade**: earlier answers invalidate later ones and any result
//! - **Prompt**: deterministic request text for a complete selection
//! - **Generation**: the single outstanding request and its classified outcome
//! - **Presentation**: derived visibility flags and the copy confirmation
//!
//! # Architecture
//!
//! The generation collaborator is injected as an [`excuse_providers::TextGenerator`].
//! Requests run on spawned tokio tasks; their outcomes come back over a channel
//! that [`App::poll_generation`] drains once per frame. An outcome issued against an
//! older [`SelectionRevision`] is dropped, so a slow response can never overwrite a
//! newer selection.

mod app;
mod clipboard;
mod generation;
mod presenter;
mod prompt;
mod selection;
pub mod ui;

pub use app::{App, DEFAULT_LANGUAGE, step_options};
pub use clipboard::{Clipboard, ClipboardError};
pub use generation::{
    GenerationController, GenerationOutcome, GenerationStatus, RequestId, StartRejected,
};
pub use presenter::{COPY_CONFIRMATION_WINDOW, CopyConfirmation, CopyLabel, Presentation};
pub use prompt::{NONE_MARKER, PromptError, build_prompt, render};
pub use selection::{CompleteSelection, Selection, SelectionRevision};

pub use excuse_providers::{self, GenerationError, TextGenerator};
pub use excuse_types::{Audience, Choice, Situation, Step, Tone, sanitize_terminal_text};
