//! The three closed selection sets of the wizard.
//!
//! Every set has a stable kebab-case identifier (`as_str`) used in config, logs and
//! tests, and a human label (`label`) that is shown in the UI and embedded in the
//! generation prompt. Declaration order is display order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Common surface of the wizard's single-select option sets.
pub trait Choice: Copy + Eq + std::fmt::Debug + 'static {
    /// Every variant, in display order.
    const ALL: &'static [Self];
    /// Name of the set, used in errors.
    const KIND: &'static str;

    fn as_str(self) -> &'static str;
    fn label(self) -> &'static str;

    /// Position of this variant in [`Choice::ALL`].
    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|candidate| *candidate == self)
            .unwrap_or_default()
    }

    fn parse(raw: &str) -> Result<Self, ChoiceParseError> {
        let needle = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ChoiceParseError {
                kind: Self::KIND,
                value: needle.to_string(),
            })
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value:?}")]
pub struct ChoiceParseError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => ($id:literal, $label:literal),)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($variant,)+
        }

        impl Choice for $name {
            const ALL: &'static [Self] = &[$(Self::$variant,)+];
            const KIND: &'static str = $kind;

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $id,)+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

choice_enum! {
    /// What happened (step 1).
    Situation, "situation" {
        Late => ("late", "I was late"),
        MissedReply => ("missed-reply", "I didn't reply to a message"),
        CancelPlans => ("cancel-plans", "I have to cancel plans"),
        MissedAppointment => ("missed-appointment", "I didn't show up to plans"),
        LateWork => ("late-work", "I turned in work late"),
        WorkMistake => ("work-mistake", "I made a mistake at work"),
        SkipGathering => ("skip-gathering", "I can't make it to a team dinner or get-together"),
        NoContact => ("no-contact", "I didn't keep in touch"),
        ScheduleChange => ("schedule-change", "My schedule suddenly changed"),
        PersonalMatter => ("personal-matter", "Something personal came up"),
    }
}

choice_enum! {
    /// Who the message is for (step 2).
    Audience, "audience" {
        Boss => ("boss", "My boss"),
        Coworker => ("coworker", "A coworker"),
        Friend => ("friend", "A friend"),
        Partner => ("partner", "My partner"),
        Family => ("family", "Family"),
        Stranger => ("stranger", "Someone I just met"),
    }
}

choice_enum! {
    /// How the message should sound (step 3).
    Tone, "tone" {
        Serious => ("serious", "Serious"),
        Polite => ("polite", "As polite as possible"),
        Honest => ("honest", "Honest"),
        Funny => ("funny", "Funny"),
        Shameless => ("shameless", "Shameless"),
        Heartfelt => ("heartfelt", "Heartfelt"),
        NotAnExcuse => ("not-an-excuse", "Without sounding like an excuse"),
    }
}
