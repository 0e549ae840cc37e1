//! Derived view state.
//!
//! Nothing here is stored independently of the selection and the generation
//! status except the copy confirmation window.

use std::time::{Duration, Instant};

use excuse_types::Step;

use crate::generation::GenerationStatus;
use crate::selection::Selection;

/// How long the copy action keeps its confirmed label.
pub const COPY_CONFIRMATION_WINDOW: Duration = Duration::from_secs(2);

/// Transient "copied" flag with a single replaceable deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyConfirmation {
    deadline: Option<Instant>,
}

impl CopyConfirmation {
    /// Start a fresh window. An earlier pending window is replaced, not extended.
    pub fn confirm(&mut self, now: Instant) {
        self.deadline = Some(now + COPY_CONFIRMATION_WINDOW);
    }

    #[must_use]
    pub fn is_active(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }

    /// Drop an expired deadline. Returns `true` when the flag just turned off.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyLabel {
    #[default]
    Default,
    Confirmed,
}

impl CopyLabel {
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Default => "Copy",
            Self::Confirmed => "Copied!",
        }
    }
}

/// Everything the surface needs to decide what to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub can_generate: bool,
    /// Indexed by [`Step::index`].
    pub visible_steps: [bool; 4],
    pub highest_visible_step: Step,
    pub generate_visible: bool,
    pub loading_visible: bool,
    pub result_visible: bool,
    pub lockout_visible: bool,
    pub copy_label: CopyLabel,
}

impl Presentation {
    #[must_use]
    pub fn derive(
        selection: &Selection,
        status: GenerationStatus,
        copy: &CopyConfirmation,
        now: Instant,
    ) -> Self {
        let can_generate = selection.is_complete();
        let visible_steps = Step::ALL.map(|step| selection.is_step_visible(step));
        let highest_visible_step = Step::ALL
            .into_iter()
            .rev()
            .find(|step| visible_steps[step.index()])
            .unwrap_or_default();

        let loading = status == GenerationStatus::Loading;
        Self {
            can_generate,
            visible_steps,
            highest_visible_step,
            generate_visible: can_generate && !loading,
            loading_visible: loading,
            result_visible: status == GenerationStatus::Succeeded,
            lockout_visible: status == GenerationStatus::RateLimited,
            copy_label: if copy.is_active(now) {
                CopyLabel::Confirmed
            } else {
                CopyLabel::Default
            },
        }
    }

    #[must_use]
    pub fn is_visible(&self, step: Step) -> bool {
        self.visible_steps[step.index()]
    }
}
