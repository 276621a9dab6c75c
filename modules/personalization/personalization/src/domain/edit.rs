//! Copy-with-change updates issued by the settings form.

use personalization_sdk::{
    ExplanationDepth, Language, LearningDisability, LearningPace, LearningStyle, PreferenceSet,
    TimeFormat, Tone, UnitSystem,
};

use super::fields::FieldLimits;
use super::normalize::{canonical_disabilities, clamp_text, is_valid_timezone};

/// A single field change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceChange {
    DisplayName(String),
    Pronouns(String),
    Language(Language),
    Timezone(String),
    Units(UnitSystem),
    TimeFormat(TimeFormat),
    LearningStyle(LearningStyle),
    Pace(LearningPace),
    ExplanationDepth(ExplanationDepth),
    Tone(Tone),
    ToggleLearningDisability {
        item: LearningDisability,
        selected: bool,
    },
    LearningDisabilitiesOther(String),
    ReduceMotion(bool),
    HighContrast(bool),
    DyslexiaFont(bool),
    ConsentAnalytics(bool),
    ConsentPersonalization(bool),
    ConsentResearch(bool),
}

/// Returns `prefs` with `change` applied. `prefs` itself is left untouched.
#[must_use]
pub fn apply_change(prefs: &PreferenceSet, change: PreferenceChange) -> PreferenceSet {
    let mut next = prefs.clone();
    match change {
        PreferenceChange::DisplayName(name) => {
            next.display_name = clamp_text(&name, FieldLimits::DISPLAY_NAME);
        }
        PreferenceChange::Pronouns(pronouns) => {
            next.pronouns = clamp_text(&pronouns, FieldLimits::PRONOUNS);
        }
        PreferenceChange::Language(language) => next.language = language,
        PreferenceChange::Timezone(tz) => {
            if is_valid_timezone(&tz) {
                next.timezone = tz;
            }
        }
        PreferenceChange::Units(units) => next.units = units,
        PreferenceChange::TimeFormat(format) => next.time_format = format,
        PreferenceChange::LearningStyle(style) => next.learning_style = style,
        PreferenceChange::Pace(pace) => next.pace = pace,
        PreferenceChange::ExplanationDepth(depth) => next.explanation_depth = depth,
        PreferenceChange::Tone(tone) => next.tone = tone,
        PreferenceChange::ToggleLearningDisability { item, selected } => {
            next.learning_disabilities =
                toggle_disability(&prefs.learning_disabilities, item, selected);
            if !next.learning_disabilities.contains(&LearningDisability::Other) {
                next.learning_disabilities_other.clear();
            }
        }
        PreferenceChange::LearningDisabilitiesOther(text) => {
            // Free text is only kept alongside the "other" category.
            if next.learning_disabilities.contains(&LearningDisability::Other) {
                next.learning_disabilities_other =
                    clamp_text(&text, FieldLimits::LEARNING_DISABILITIES_OTHER);
            }
        }
        PreferenceChange::ReduceMotion(on) => next.accessibility.reduce_motion = on,
        PreferenceChange::HighContrast(on) => next.accessibility.high_contrast = on,
        PreferenceChange::DyslexiaFont(on) => next.accessibility.dyslexia_font = on,
        PreferenceChange::ConsentAnalytics(on) => next.consent.analytics = on,
        PreferenceChange::ConsentPersonalization(on) => next.consent.personalization = on,
        PreferenceChange::ConsentResearch(on) => next.consent.research = on,
    }
    next
}

fn toggle_disability(
    current: &[LearningDisability],
    item: LearningDisability,
    selected: bool,
) -> Vec<LearningDisability> {
    if !selected {
        return current.iter().copied().filter(|d| *d != item).collect();
    }
    if item == LearningDisability::PreferNotToSay {
        return vec![LearningDisability::PreferNotToSay];
    }
    canonical_disabilities(
        current
            .iter()
            .copied()
            .filter(|d| *d != LearningDisability::PreferNotToSay)
            .chain(std::iter::once(item)),
    )
}
