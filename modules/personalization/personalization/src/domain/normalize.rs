//! Validation of preference payloads read from untrusted sources.
//!
//! Remote responses and local storage records both go through [`normalize`]:
//! a payload with the wrong `version` is discarded as a whole, otherwise each
//! field is adopted when valid and replaced by the default when not.

use personalization_sdk::{
    AccessibilityFlags, ConsentToggles, ExplanationDepth, Language, LearningDisability,
    LearningPace, LearningStyle, PREFERENCES_VERSION, PreferenceSet, TimeFormat, Tone, UnitSystem,
};
use serde_json::{Map, Value};

use super::fields::{FieldLimits, PreferenceFields as F};

/// Normalize `raw` against `defaults`.
///
/// Never fails: anything that is not an object tagged with the current
/// version yields `defaults` unchanged.
#[must_use]
pub fn normalize(raw: &Value, defaults: &PreferenceSet) -> PreferenceSet {
    let Some(obj) = raw.as_object() else {
        return defaults.clone();
    };
    if !has_current_version(obj) {
        return defaults.clone();
    }

    let learning_disabilities = obj
        .get(F::LEARNING_DISABILITIES)
        .and_then(Value::as_array)
        .map_or_else(
            || defaults.learning_disabilities.clone(),
            |items| {
                canonical_disabilities(
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .filter_map(LearningDisability::parse),
                )
            },
        );
    let learning_disabilities_other = if learning_disabilities.contains(&LearningDisability::Other)
    {
        text_field(
            obj,
            F::LEARNING_DISABILITIES_OTHER,
            FieldLimits::LEARNING_DISABILITIES_OTHER,
            &defaults.learning_disabilities_other,
        )
    } else {
        String::new()
    };

    let timezone = obj
        .get(F::TIMEZONE)
        .and_then(Value::as_str)
        .filter(|tz| is_valid_timezone(tz))
        .map_or_else(|| defaults.timezone.clone(), str::to_owned);

    PreferenceSet {
        version: PREFERENCES_VERSION,
        display_name: text_field(
            obj,
            F::DISPLAY_NAME,
            FieldLimits::DISPLAY_NAME,
            &defaults.display_name,
        ),
        pronouns: text_field(obj, F::PRONOUNS, FieldLimits::PRONOUNS, &defaults.pronouns),
        language: enum_field(obj, F::LANGUAGE, Language::parse, defaults.language),
        timezone,
        units: enum_field(obj, F::UNITS, UnitSystem::parse, defaults.units),
        time_format: enum_field(obj, F::TIME_FORMAT, TimeFormat::parse, defaults.time_format),
        learning_style: enum_field(
            obj,
            F::LEARNING_STYLE,
            LearningStyle::parse,
            defaults.learning_style,
        ),
        pace: enum_field(obj, F::PACE, LearningPace::parse, defaults.pace),
        explanation_depth: enum_field(
            obj,
            F::EXPLANATION_DEPTH,
            ExplanationDepth::parse,
            defaults.explanation_depth,
        ),
        tone: enum_field(obj, F::TONE, Tone::parse, defaults.tone),
        learning_disabilities,
        learning_disabilities_other,
        accessibility: AccessibilityFlags {
            reduce_motion: bool_field(
                obj,
                F::REDUCE_MOTION,
                defaults.accessibility.reduce_motion,
            ),
            high_contrast: bool_field(
                obj,
                F::HIGH_CONTRAST,
                defaults.accessibility.high_contrast,
            ),
            dyslexia_font: bool_field(
                obj,
                F::DYSLEXIA_FONT,
                defaults.accessibility.dyslexia_font,
            ),
        },
        consent: ConsentToggles {
            analytics: bool_field(obj, F::CONSENT_ANALYTICS, defaults.consent.analytics),
            personalization: bool_field(
                obj,
                F::CONSENT_PERSONALIZATION,
                defaults.consent.personalization,
            ),
            research: bool_field(obj, F::CONSENT_RESEARCH, defaults.consent.research),
        },
    }
}

/// Parse a local storage record.
///
/// Returns `None` unless `text` is a JSON object tagged with the current version.
#[must_use]
pub fn parse_stored(text: &str, defaults: &PreferenceSet) -> Option<PreferenceSet> {
    let value: Value = serde_json::from_str(text).ok()?;
    parse_record(&value, defaults)
}

/// Normalize `value` only if it is an object tagged with the current version.
#[must_use]
pub fn parse_record(value: &Value, defaults: &PreferenceSet) -> Option<PreferenceSet> {
    let obj = value.as_object()?;
    has_current_version(obj).then(|| normalize(value, defaults))
}

/// `true` for `null`, `{}` and anything else that carries no settings.
#[must_use]
pub fn is_blank_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(obj) => obj.is_empty(),
        _ => false,
    }
}

/// De-duplicate and sort into canonical order; `prefer_not_to_say` wins alone.
#[must_use]
pub fn canonical_disabilities<I>(items: I) -> Vec<LearningDisability>
where
    I: IntoIterator<Item = LearningDisability>,
{
    let mut list: Vec<LearningDisability> = items.into_iter().collect();
    if list.contains(&LearningDisability::PreferNotToSay) {
        return vec![LearningDisability::PreferNotToSay];
    }
    list.sort_unstable();
    list.dedup();
    list
}

/// The serialization used for every change comparison.
#[must_use]
pub fn fingerprint(prefs: &PreferenceSet) -> String {
    serde_json::to_string(prefs).unwrap_or_default()
}

/// Truncate to at most `max_chars` chars on a char boundary.
#[must_use]
pub fn clamp_text(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => value[..idx].to_owned(),
        None => value.to_owned(),
    }
}

/// IANA-style zone names and fixed offsets (`Europe/Paris`, `UTC`, `Etc/GMT+2`).
#[must_use]
pub fn is_valid_timezone(tz: &str) -> bool {
    !tz.is_empty()
        && tz.len() <= FieldLimits::TIMEZONE
        && tz
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-' | '/'))
}

fn has_current_version(obj: &Map<String, Value>) -> bool {
    obj.get(F::VERSION).and_then(Value::as_u64) == Some(u64::from(PREFERENCES_VERSION))
}

fn enum_field<T: Copy>(
    obj: &Map<String, Value>,
    key: &str,
    parse: fn(&str) -> Option<T>,
    fallback: T,
) -> T {
    obj.get(key)
        .and_then(Value::as_str)
        .and_then(parse)
        .unwrap_or(fallback)
}

fn bool_field(obj: &Map<String, Value>, key: &str, fallback: bool) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(fallback)
}

fn text_field(obj: &Map<String, Value>, key: &str, max_chars: usize, fallback: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .map_or_else(|| fallback.to_owned(), |s| clamp_text(s, max_chars))
}
