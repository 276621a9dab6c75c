//! Public models for the personalization module.
//!
//! `PreferenceSet` is the versioned, flat record of a user's personalization
//! settings. Its JSON form (camelCase keys, snake_case enum values) is what
//! the remote service and the local storage slot hold.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The only `version` tag accepted from untrusted sources.
pub const PREFERENCES_VERSION: u32 = 1;

macro_rules! preference_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => $wire:literal ),+ $(,)?
        }
        default = $default:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $( #[serde(rename = $wire)] $variant, )+
        }

        impl $name {
            /// Every allowed value, in canonical order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Parses a wire value. Returns `None` for anything outside the allowed set.
            #[must_use]
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

preference_enum! {
    /// Interface language.
    pub enum Language {
        En => "en",
        Es => "es",
        Fr => "fr",
        De => "de",
        Pt => "pt",
        Hi => "hi",
        Zh => "zh",
        Ar => "ar",
    }
    default = En;
}

preference_enum! {
    pub enum UnitSystem {
        Metric => "metric",
        Imperial => "imperial",
    }
    default = Metric;
}

preference_enum! {
    pub enum TimeFormat {
        TwelveHour => "12h",
        TwentyFourHour => "24h",
    }
    default = TwentyFourHour;
}

preference_enum! {
    /// Default presentation style for generated learning material.
    pub enum LearningStyle {
        Visual => "visual",
        Auditory => "auditory",
        ReadingWriting => "reading_writing",
        Kinesthetic => "kinesthetic",
        Mixed => "mixed",
    }
    default = Mixed;
}

preference_enum! {
    pub enum LearningPace {
        Relaxed => "relaxed",
        Steady => "steady",
        Intensive => "intensive",
    }
    default = Steady;
}

preference_enum! {
    pub enum ExplanationDepth {
        Brief => "brief",
        Standard => "standard",
        InDepth => "in_depth",
    }
    default = Standard;
}

preference_enum! {
    /// Tone of the tutor's replies.
    pub enum Tone {
        Friendly => "friendly",
        Neutral => "neutral",
        Formal => "formal",
    }
    default = Friendly;
}

preference_enum! {
    /// Multi-select accessibility categories.
    ///
    /// Declaration order is the canonical ordering of the stored list.
    /// `PreferNotToSay` is exclusive of every other value.
    pub enum LearningDisability {
        Adhd => "adhd",
        Dyslexia => "dyslexia",
        Dyscalculia => "dyscalculia",
        Dysgraphia => "dysgraphia",
        Autism => "autism",
        AuditoryProcessing => "auditory_processing",
        Other => "other",
        PreferNotToSay => "prefer_not_to_say",
    }
    default = PreferNotToSay;
}

/// Display accessibility switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityFlags {
    pub reduce_motion: bool,
    pub high_contrast: bool,
    pub dyslexia_font: bool,
}

/// Data-use consent switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentToggles {
    #[serde(rename = "consentAnalytics")]
    pub analytics: bool,
    #[serde(rename = "consentPersonalization")]
    pub personalization: bool,
    #[serde(rename = "consentResearch")]
    pub research: bool,
}

impl Default for ConsentToggles {
    fn default() -> Self {
        Self {
            analytics: false,
            personalization: true,
            research: false,
        }
    }
}

/// A user's personalization settings.
///
/// Values are replaced whole (copy-with-change); nothing mutates a shared
/// instance in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSet {
    pub version: u32,

    pub display_name: String,
    pub pronouns: String,

    pub language: Language,
    pub timezone: String,
    pub units: UnitSystem,
    pub time_format: TimeFormat,

    pub learning_style: LearningStyle,
    pub pace: LearningPace,
    pub explanation_depth: ExplanationDepth,
    pub tone: Tone,
    pub learning_disabilities: Vec<LearningDisability>,
    pub learning_disabilities_other: String,

    #[serde(flatten)]
    pub accessibility: AccessibilityFlags,
    #[serde(flatten)]
    pub consent: ConsentToggles,
}

impl Default for PreferenceSet {
    fn default() -> Self {
        Self {
            version: PREFERENCES_VERSION,
            display_name: String::new(),
            pronouns: String::new(),
            language: Language::default(),
            timezone: "UTC".to_owned(),
            units: UnitSystem::default(),
            time_format: TimeFormat::default(),
            learning_style: LearningStyle::default(),
            pace: LearningPace::default(),
            explanation_depth: ExplanationDepth::default(),
            tone: Tone::default(),
            learning_disabilities: Vec::new(),
            learning_disabilities_other: String::new(),
            accessibility: AccessibilityFlags::default(),
            consent: ConsentToggles::default(),
        }
    }
}

/// Opaque identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The slice of the authenticated user's profile used to derive defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl UserProfile {
    #[must_use]
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            email: None,
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
