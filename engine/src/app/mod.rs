//! The wizard session.
//!
//! [`App`] owns the selection, the generation controller, the copy confirmation,
//! and the navigation state the surface needs (focused step, list cursors, detail
//! draft, input mode). The TUI layer reads state from `App` and forwards input
//! back to it; no rendering logic lives here.

mod cascade;
mod navigation;

pub use navigation::step_options;


use std::sync::Arc;
use std::time::{Duration, Instant};

use excuse_providers::TextGenerator;
use excuse_types::Step;

use crate::clipboard::Clipboard;
use crate::generation::{GenerationController, GenerationStatus};
use crate::presenter::{CopyConfirmation, Presentation};
use crate::prompt::build_prompt;
use crate::selection::Selection;
use crate::ui::{DraftInput, InputMode, UiOptions};

/// Spinner cadence, independent of render FPS.
const UI_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Output language used unless the caller picks one.
pub const DEFAULT_LANGUAGE: &str = "English";

#[derive(Debug, Clone, Default)]
struct Navigation {
    focus: Step,
    /// List cursor per option step, indexed by [`Step::index`]. Detail has none.
    cursors: [usize; 3],
    mode: InputMode,
    detail: DraftInput,
}

pub struct App<G> {
    selection: Selection,
    generation: GenerationController<G>,
    copy: CopyConfirmation,
    nav: Navigation,
    language: String,
    ui_options: UiOptions,
    tick: usize,
    last_ui_tick: Option<Instant>,
    should_quit: bool,
}

impl<G: TextGenerator> App<G> {
    pub fn new(generator: Arc<G>) -> Self {
        Self {
            selection: Selection::default(),
            generation: GenerationController::new(generator),
            copy: CopyConfirmation::default(),
            nav: Navigation::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            ui_options: UiOptions::default(),
            tick: 0,
            last_ui_tick: None,
            should_quit: false,
        }
    }

    /// Natural language the generated message should be written in.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        if !language.trim().is_empty() {
            self.language = language.trim().to_string();
        }
        self
    }

    pub fn with_ui_options(mut self, ui_options: UiOptions) -> Self {
        self.ui_options = ui_options;
        self
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn status(&self) -> GenerationStatus {
        self.generation.status()
    }

    /// Most recent generated text; empty unless the last request succeeded.
    #[must_use]
    pub fn result(&self) -> &str {
        self.generation.result()
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui_options
    }

    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.tick
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    /// Issue a generation request for the current selection.
    ///
    /// Ignored (returns `false`) unless all three required answers are present and
    /// the status is `Idle`, `Succeeded` or `Failed`. `RateLimited` blocks here as
    /// well as on the surface.
    pub fn generate(&mut self) -> bool {
        let status = self.generation.status();
        if !status.accepts_generate() {
            tracing::debug!(status = status.as_str(), "Generate ignored");
            return false;
        }

        let prompt = match build_prompt(&self.selection, &self.language) {
            Ok(prompt) => prompt,
            Err(err) => {
                tracing::debug!(%err, "Generate ignored");
                return false;
            }
        };

        match self.generation.start(prompt, self.selection.revision()) {
            Ok(()) => {
                self.copy.clear();
                true
            }
            Err(reason) => {
                tracing::debug!(?reason, "Generate rejected");
                false
            }
        }
    }

    /// Start over: empty selection, `Idle`, no result. Clears a rate-limit lockout.
    pub fn reset(&mut self) {
        tracing::info!(status = self.generation.status().as_str(), "Session reset");
        self.selection.clear();
        self.generation.invalidate();
        self.copy.clear();
        self.nav = Navigation::default();
    }

    /// Apply finished generation requests. Call once per frame.
    pub fn poll_generation(&mut self) -> bool {
        self.generation.poll(self.selection.revision())
    }

    /// Copy the result to `clipboard`. Failures are logged only.
    pub fn copy_result(&mut self, clipboard: &mut impl Clipboard, now: Instant) -> bool {
        let text = self.generation.result();
        if text.is_empty() {
            return false;
        }

        match clipboard.write_text(text) {
            Ok(()) => {
                tracing::debug!(chars = text.chars().count(), "Copied result to clipboard");
                self.copy.confirm(now);
                true
            }
            Err(err) => {
                tracing::warn!(%err, "Clipboard write failed");
                false
            }
        }
    }

    /// Expire the copy confirmation and advance the spinner.
    pub fn tick(&mut self, now: Instant) {
        self.copy.tick(now);

        let due = self
            .last_ui_tick
            .is_none_or(|last| now.saturating_duration_since(last) >= UI_TICK_INTERVAL);
        if due {
            self.last_ui_tick = Some(now);
            self.tick = self.tick.wrapping_add(1);
        }
    }

    #[must_use]
    pub fn presentation(&self, now: Instant) -> Presentation {
        Presentation::derive(&self.selection, self.generation.status(), &self.copy, now)
    }
}
