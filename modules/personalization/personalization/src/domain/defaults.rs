use personalization_sdk::{Language, PreferenceSet, UserProfile};

use super::fields::FieldLimits;
use super::normalize::{clamp_text, is_valid_timezone};

const FALLBACK_TIMEZONE: &str = "UTC";

/// Device environment the defaults are derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub timezone: String,
    pub language: Language,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            timezone: FALLBACK_TIMEZONE.to_owned(),
            language: Language::default(),
        }
    }
}

impl Environment {
    /// Read `TZ` and `LC_ALL` / `LANG`. Unusable values fall back to `UTC` / `en`.
    #[must_use]
    pub fn detect() -> Self {
        let timezone = std::env::var("TZ")
            .ok()
            .map(|tz| tz.trim_start_matches(':').to_owned())
            .filter(|tz| is_valid_timezone(tz))
            .unwrap_or_else(|| FALLBACK_TIMEZONE.to_owned());

        let language = ["LC_ALL", "LANG"]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok())
            .find_map(|locale| language_from_locale(&locale))
            .unwrap_or_default();

        Self { timezone, language }
    }
}

/// `"es_ES.UTF-8"` -> `Language::Es`.
#[must_use]
pub fn language_from_locale(locale: &str) -> Option<Language> {
    let tag = locale.split(['_', '-', '.', '@']).next()?;
    Language::parse(&tag.to_ascii_lowercase())
}

/// Per-user defaults: display name from the profile, locale from the environment.
#[must_use]
pub fn defaults_for(profile: &UserProfile, env: &Environment) -> PreferenceSet {
    let display_name = profile
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| {
            profile
                .email
                .as_deref()
                .and_then(|email| email.split('@').next())
                .map(str::trim)
                .filter(|local| !local.is_empty())
        })
        .map(|name| clamp_text(name, FieldLimits::DISPLAY_NAME))
        .unwrap_or_default();

    let timezone = if is_valid_timezone(&env.timezone) {
        env.timezone.clone()
    } else {
        FALLBACK_TIMEZONE.to_owned()
    };

    PreferenceSet {
        display_name,
        language: env.language,
        timezone,
        ..PreferenceSet::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_prefer_profile_display_name() {
        let profile = UserProfile::new("u1")
            .with_display_name("  Ada Lovelace ")
            .with_email("ada@example.test");
        let prefs = defaults_for(&profile, &Environment::default());
        assert_eq!(prefs.display_name, "Ada Lovelace");
    }

    #[test]
    fn test_defaults_fall_back_to_email_local_part() {
        let profile = UserProfile::new("u1").with_email("grace@example.test");
        let prefs = defaults_for(&profile, &Environment::default());
        assert_eq!(prefs.display_name, "grace");
    }

    #[test]
    fn test_defaults_use_environment_locale() {
        let env = Environment {
            timezone: "Europe/Madrid".to_owned(),
            language: Language::Es,
        };
        let prefs = defaults_for(&UserProfile::new("u1"), &env);
        assert_eq!(prefs.timezone, "Europe/Madrid");
        assert_eq!(prefs.language, Language::Es);
        assert_eq!(prefs.display_name, "");
    }

    #[test]
    fn test_defaults_replace_invalid_environment_timezone() {
        let env = Environment {
            timezone: "not a zone".to_owned(),
            language: Language::En,
        };
        let prefs = defaults_for(&UserProfile::new("u1"), &env);
        assert_eq!(prefs.timezone, "UTC");
    }

    #[test]
    fn test_language_from_locale() {
        assert_eq!(language_from_locale("es_ES.UTF-8"), Some(Language::Es));
        assert_eq!(language_from_locale("pt-BR"), Some(Language::Pt));
        assert_eq!(language_from_locale("C"), None);
        assert_eq!(language_from_locale(""), None);
    }

    #[test]
    fn test_detect_reads_process_environment() {
        temp_env::with_vars(
            [
                ("TZ", Some(":America/New_York")),
                ("LC_ALL", None),
                ("LANG", Some("fr_FR.UTF-8")),
            ],
            || {
                let env = Environment::detect();
                assert_eq!(env.timezone, "America/New_York");
                assert_eq!(env.language, Language::Fr);
            },
        );
    }

    #[test]
    fn test_detect_falls_back_when_unset() {
        temp_env::with_vars(
            [
                ("TZ", None::<&str>),
                ("LC_ALL", None),
                ("LANG", None),
            ],
            || {
                assert_eq!(Environment::detect(), Environment::default());
            },
        );
    }
}
