//! Generation request text.
//!
//! The template asks for one short message in the configured language. The model's
//! compliance with the output rules is not checked afterwards.

use excuse_types::{Choice, Step};
use thiserror::Error;

use crate::selection::{CompleteSelection, Selection};

/// Stand-in for a blank additional detail.
pub const NONE_MARKER: &str = "none";

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("cannot build a prompt without an answer for step {}: {}", .0.number(), .0.title())]
    MissingField(Step),
}

pub fn build_prompt(selection: &Selection, language: &str) -> Result<String, PromptError> {
    match selection.complete() {
        Some(complete) => Ok(render(&complete, language)),
        None => Err(PromptError::MissingField(
            selection.first_missing().unwrap_or(Step::Situation),
        )),
    }
}

#[must_use]
pub fn render(selection: &CompleteSelection, language: &str) -> String {
    let detail = selection.detail.trim();
    let detail = if detail.is_empty() { NONE_MARKER } else { detail };

    format!(
        "You help people write realistic, ready-to-send messages explaining themselves.\n\
         \n\
         Write one message that meets the conditions below.\n\
         \n\
         [Situation]\n\
         - {situation}\n\
         \n\
         [Recipient]\n\
         - {audience}\n\
         \n\
         [Tone]\n\
         - {tone}\n\
         \n\
         [Additional context]\n\
         - {detail}\n\
         \n\
         Output rules:\n\
         - Write only in {language}\n\
         - 2-3 sentences\n\
         - Ready to copy and send as a message as-is\n\
         \n\
         Output only the message, with no explanation or commentary.",
        situation = selection.situation.label(),
        audience = selection.audience.label(),
        tone = selection.tone.label(),
    )
}
