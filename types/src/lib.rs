//! Core domain types for the excuse wizard.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod choice;
mod sanitize;
mod step;

pub use choice::{Audience, Choice, ChoiceParseError, Situation, Tone};
pub use sanitize::sanitize_terminal_text;
pub use step::Step;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Model Name
// ============================================================================

/// Model used when neither config nor caller picks one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// A generation model identifier (e.g. `gemini-2.5-flash`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelName(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelParseError {
    #[error("model name must not be empty")]
    Empty,
    #[error("model name must not contain whitespace or '/': {0}")]
    InvalidCharacters(String),
}

impl ModelName {
    pub fn parse(raw: &str) -> Result<Self, ModelParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ModelParseError::Empty);
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(ModelParseError::InvalidCharacters(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ModelName {
    fn default() -> Self {
        Self(DEFAULT_MODEL.to_string())
    }
}

impl std::fmt::Display for ModelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ModelName {
    type Error = ModelParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ModelName> for String {
    fn from(value: ModelName) -> Self {
        value.0
    }
}

// ============================================================================
// API Key
// ============================================================================

/// Credential for the generation service.
///
/// `Debug` is manually implemented to redact the key value, preventing accidental
/// credential disclosure in logs or error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("API key must not be empty")]
pub struct EmptyApiKeyError;

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyApiKeyError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EmptyApiKeyError);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}
