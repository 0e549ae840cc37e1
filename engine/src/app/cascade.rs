//! Cascading selection writes.
//!
//! Writing a step clears every later step, the result, and any outstanding request,
//! even when the new value equals the old one. A cascade also lifts a rate-limit
//! lockout. The detail is the last step and clears nothing; changing it only
//! abandons a request still in flight.

use excuse_providers::TextGenerator;
use excuse_types::{Audience, Choice, Situation, Step, Tone};

use super::App;

impl<G: TextGenerator> App<G> {
    /// Also lifts a rate-limit lockout: the status returns to `Idle`.
    pub fn set_situation(&mut self, situation: Situation) {
        tracing::debug!(situation = situation.as_str(), "Situation selected");
        self.selection.write_situation(situation);
        self.nav.cursors[Step::Situation.index()] = situation.index();
        self.after_cascade(Step::Situation);
    }

    /// Ignored (returns `false`) while no situation is set. Lifts a rate-limit
    /// lockout like [`App::set_situation`].
    pub fn set_audience(&mut self, audience: Audience) -> bool {
        if self.selection.situation().is_none() {
            tracing::debug!(audience = audience.as_str(), "Audience ignored before situation");
            return false;
        }
        tracing::debug!(audience = audience.as_str(), "Audience selected");
        self.selection.write_audience(audience);
        self.nav.cursors[Step::Audience.index()] = audience.index();
        self.after_cascade(Step::Audience);
        true
    }

    /// Ignored (returns `false`) while no audience is set. Lifts a rate-limit
    /// lockout like [`App::set_situation`].
    pub fn set_tone(&mut self, tone: Tone) -> bool {
        if self.selection.audience().is_none() {
            tracing::debug!(tone = tone.as_str(), "Tone ignored before audience");
            return false;
        }
        tracing::debug!(tone = tone.as_str(), "Tone selected");
        self.selection.write_tone(tone);
        self.nav.cursors[Step::Tone.index()] = tone.index();
        self.after_cascade(Step::Tone);
        true
    }

    /// Ignored (returns `false`) while no tone is set.
    ///
    /// Never clears a settled result. A changed detail abandons a request that is
    /// still loading, so its reply cannot land under the new detail.
    pub fn set_additional_detail(&mut self, detail: impl Into<String>) -> bool {
        if self.selection.tone().is_none() {
            return false;
        }
        let detail = detail.into();
        if self.nav.detail.text() != detail {
            self.nav.detail.set_text(detail.clone());
        }
        if self.selection.detail() != detail && self.generation.abandon() {
            tracing::debug!("Detail changed while loading");
        }
        self.selection.write_detail(detail);
        true
    }

    fn after_cascade(&mut self, written: Step) {
        self.generation.invalidate();
        self.copy.clear();
        self.nav.detail.clear();

        let mut later = written.next();
        while let Some(step) = later {
            if let Some(cursor) = self.nav.cursors.get_mut(step.index()) {
                *cursor = 0;
            }
            later = step.next();
        }
    }
}
