//! Wizard steps, in dependency order.

/// One step of the four-step wizard.
///
/// Each step depends on every earlier one: a step is reachable only once the
/// previous step's selection is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Step {
    #[default]
    Situation,
    Audience,
    Tone,
    Detail,
}

impl Step {
    pub const ALL: [Self; 4] = [Self::Situation, Self::Audience, Self::Tone, Self::Detail];

    /// 1-based step number shown in the UI.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Situation => 1,
            Self::Audience => 2,
            Self::Tone => 3,
            Self::Detail => 4,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.number() as usize - 1
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Situation => "What happened?",
            Self::Audience => "Who are you telling?",
            Self::Tone => "How should it sound?",
            Self::Detail => "Anything else? (optional)",
        }
    }

    #[must_use]
    pub const fn is_optional(self) -> bool {
        matches!(self, Self::Detail)
    }

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Situation => Some(Self::Audience),
            Self::Audience => Some(Self::Tone),
            Self::Tone => Some(Self::Detail),
            Self::Detail => None,
        }
    }

    #[must_use]
    pub const fn prev(self) -> Option<Self> {
        match self {
            Self::Situation => None,
            Self::Audience => Some(Self::Situation),
            Self::Tone => Some(Self::Audience),
            Self::Detail => Some(Self::Tone),
        }
    }
}
