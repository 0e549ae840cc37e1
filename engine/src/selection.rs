//! Wizard selection data.
//!
//! `Selection` is plain data. Ordering between the steps (an audience only after a
//! situation, and so on) is enforced by the cascade setters on [`crate::App`], which
//! are the sole writers.

use excuse_types::{Audience, Situation, Step, Tone};

/// Snapshot token for the selection.
///
/// Bumped by every cascading write and by a session reset. A generation outcome is
/// applied only while the revision it was issued against is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SelectionRevision(u64);

impl SelectionRevision {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub(crate) const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for SelectionRevision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// The user's answers so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub(crate) situation: Option<Situation>,
    pub(crate) audience: Option<Audience>,
    pub(crate) tone: Option<Tone>,
    pub(crate) detail: String,
    pub(crate) revision: SelectionRevision,
}

impl Selection {
    #[must_use]
    pub fn situation(&self) -> Option<Situation> {
        self.situation
    }

    #[must_use]
    pub fn audience(&self) -> Option<Audience> {
        self.audience
    }

    #[must_use]
    pub fn tone(&self) -> Option<Tone> {
        self.tone
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    #[must_use]
    pub fn revision(&self) -> SelectionRevision {
        self.revision
    }

    /// All three required answers are present. The detail never matters.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.first_missing().is_none()
    }

    /// First required step without an answer.
    #[must_use]
    pub fn first_missing(&self) -> Option<Step> {
        if self.situation.is_none() {
            Some(Step::Situation)
        } else if self.audience.is_none() {
            Some(Step::Audience)
        } else if self.tone.is_none() {
            Some(Step::Tone)
        } else {
            None
        }
    }

    /// Whether `step` may be shown: its predecessor has an answer.
    #[must_use]
    pub fn is_step_visible(&self, step: Step) -> bool {
        match step {
            Step::Situation => true,
            Step::Audience => self.situation.is_some(),
            Step::Tone => self.audience.is_some(),
            Step::Detail => self.tone.is_some(),
        }
    }

    #[must_use]
    pub fn complete(&self) -> Option<CompleteSelection> {
        Some(CompleteSelection {
            situation: self.situation?,
            audience: self.audience?,
            tone: self.tone?,
            detail: self.detail.clone(),
        })
    }

    /// Overwrite the situation and drop everything after it.
    pub(crate) fn write_situation(&mut self, situation: Situation) {
        self.situation = Some(situation);
        self.audience = None;
        self.tone = None;
        self.detail.clear();
        self.bump();
    }

    pub(crate) fn write_audience(&mut self, audience: Audience) {
        self.audience = Some(audience);
        self.tone = None;
        self.detail.clear();
        self.bump();
    }

    pub(crate) fn write_tone(&mut self, tone: Tone) {
        self.tone = Some(tone);
        self.detail.clear();
        self.bump();
    }

    pub(crate) fn write_detail(&mut self, detail: String) {
        self.detail = detail;
    }

    pub(crate) fn clear(&mut self) {
        self.situation = None;
        self.audience = None;
        self.tone = None;
        self.detail.clear();
        self.bump();
    }

    fn bump(&mut self) {
        self.revision = self.revision.next();
    }
}

/// A selection with every required answer present.
///
/// Only obtainable through [`Selection::complete`], so prompt rendering from it
/// cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteSelection {
    pub situation: Situation,
    pub audience: Audience,
    pub tone: Tone,
    pub detail: String,
}
