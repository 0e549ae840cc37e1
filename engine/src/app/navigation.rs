//! Wizard navigation: focus, list cursors, and detail editing.

use excuse_providers::TextGenerator;
use excuse_types::{Audience, Choice, Situation, Step, Tone};

use super::App;
use crate::ui::{DraftInput, InputMode};

/// Display labels of the options offered at `step`. Empty for the free-text step.
#[must_use]
pub fn step_options(step: Step) -> Vec<&'static str> {
    fn labels<C: Choice>() -> Vec<&'static str> {
        C::ALL.iter().map(|choice| choice.label()).collect()
    }
    match step {
        Step::Situation => labels::<Situation>(),
        Step::Audience => labels::<Audience>(),
        Step::Tone => labels::<Tone>(),
        Step::Detail => Vec::new(),
    }
}

fn option_count(step: Step) -> usize {
    match step {
        Step::Situation => Situation::ALL.len(),
        Step::Audience => Audience::ALL.len(),
        Step::Tone => Tone::ALL.len(),
        Step::Detail => 0,
    }
}

impl<G: TextGenerator> App<G> {
    #[must_use]
    pub fn focus(&self) -> Step {
        self.nav.focus
    }

    #[must_use]
    pub fn input_mode(&self) -> InputMode {
        self.nav.mode
    }

    #[must_use]
    pub fn detail_draft(&self) -> &DraftInput {
        &self.nav.detail
    }

    /// Highlighted option index at `step`; `None` for the free-text step.
    #[must_use]
    pub fn cursor(&self, step: Step) -> Option<usize> {
        self.nav.cursors.get(step.index()).copied()
    }

    /// Index of the committed answer at `step`, if any.
    #[must_use]
    pub fn selected_index(&self, step: Step) -> Option<usize> {
        match step {
            Step::Situation => self.selection.situation().map(Choice::index),
            Step::Audience => self.selection.audience().map(Choice::index),
            Step::Tone => self.selection.tone().map(Choice::index),
            Step::Detail => None,
        }
    }

    /// Move focus to the next step, if it is visible.
    pub fn focus_next(&mut self) {
        if let Some(next) = self.nav.focus.next()
            && self.selection.is_step_visible(next)
        {
            self.set_focus(next);
        }
    }

    pub fn focus_prev(&mut self) {
        if let Some(prev) = self.nav.focus.prev() {
            self.set_focus(prev);
        }
    }

    fn set_focus(&mut self, step: Step) {
        self.nav.focus = step;
        self.nav.mode = InputMode::Browse;
        if let Some(selected) = self.selected_index(step)
            && let Some(cursor) = self.nav.cursors.get_mut(step.index())
        {
            *cursor = selected;
        }
    }

    pub fn cursor_up(&mut self) {
        if let Some(cursor) = self.nav.cursors.get_mut(self.nav.focus.index()) {
            *cursor = cursor.saturating_sub(1);
        }
    }

    pub fn cursor_down(&mut self) {
        let max = option_count(self.nav.focus).saturating_sub(1);
        if let Some(cursor) = self.nav.cursors.get_mut(self.nav.focus.index()) {
            *cursor = (*cursor + 1).min(max);
        }
    }

    /// Commit the highlighted option and move on to the next step.
    ///
    /// On the free-text step this starts editing instead.
    pub fn select_focused(&mut self) {
        let focus = self.nav.focus;
        let cursor = self.cursor(focus).unwrap_or_default();
        let committed = match focus {
            Step::Situation => Situation::ALL.get(cursor).is_some_and(|&situation| {
                self.set_situation(situation);
                true
            }),
            Step::Audience => Audience::ALL
                .get(cursor)
                .is_some_and(|&audience| self.set_audience(audience)),
            Step::Tone => Tone::ALL
                .get(cursor)
                .is_some_and(|&tone| self.set_tone(tone)),
            Step::Detail => {
                self.enter_detail_edit();
                return;
            }
        };
        if committed {
            self.focus_next();
        }
    }

    /// Start editing the detail. Only possible once the detail step is visible.
    pub fn enter_detail_edit(&mut self) -> bool {
        if !self.selection.is_step_visible(Step::Detail) {
            return false;
        }
        self.nav.focus = Step::Detail;
        self.nav.mode = InputMode::EditDetail;
        self.nav.detail.move_cursor_end();
        true
    }

    pub fn exit_detail_edit(&mut self) {
        self.nav.mode = InputMode::Browse;
    }

    fn edit_detail(&mut self, edit: impl FnOnce(&mut DraftInput)) {
        if self.nav.mode != InputMode::EditDetail {
            return;
        }
        edit(&mut self.nav.detail);
        let text = self.nav.detail.text().to_string();
        self.set_additional_detail(text);
    }

    pub fn insert_char(&mut self, c: char) {
        self.edit_detail(|draft| draft.enter_char(c));
    }

    pub fn insert_str(&mut self, text: &str) {
        self.edit_detail(|draft| draft.enter_text(text));
    }

    pub fn backspace(&mut self) {
        self.edit_detail(DraftInput::delete_char);
    }

    pub fn delete(&mut self) {
        self.edit_detail(DraftInput::delete_char_forward);
    }

    pub fn move_left(&mut self) {
        self.edit_detail(DraftInput::move_cursor_left);
    }

    pub fn move_right(&mut self) {
        self.edit_detail(DraftInput::move_cursor_right);
    }

    pub fn move_home(&mut self) {
        self.edit_detail(DraftInput::reset_cursor);
    }

    pub fn move_end(&mut self) {
        self.edit_detail(DraftInput::move_cursor_end);
    }
}
