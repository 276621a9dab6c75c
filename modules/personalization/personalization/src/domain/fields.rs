/// JSON keys of the stored `PreferenceSet`.
pub struct PreferenceFields;

impl PreferenceFields {
    pub const VERSION: &'static str = "version";
    pub const DISPLAY_NAME: &'static str = "displayName";
    pub const PRONOUNS: &'static str = "pronouns";
    pub const LANGUAGE: &'static str = "language";
    pub const TIMEZONE: &'static str = "timezone";
    pub const UNITS: &'static str = "units";
    pub const TIME_FORMAT: &'static str = "timeFormat";
    pub const LEARNING_STYLE: &'static str = "learningStyle";
    pub const PACE: &'static str = "pace";
    pub const EXPLANATION_DEPTH: &'static str = "explanationDepth";
    pub const TONE: &'static str = "tone";
    pub const LEARNING_DISABILITIES: &'static str = "learningDisabilities";
    pub const LEARNING_DISABILITIES_OTHER: &'static str = "learningDisabilitiesOther";
    pub const REDUCE_MOTION: &'static str = "reduceMotion";
    pub const HIGH_CONTRAST: &'static str = "highContrast";
    pub const DYSLEXIA_FONT: &'static str = "dyslexiaFont";
    pub const CONSENT_ANALYTICS: &'static str = "consentAnalytics";
    pub const CONSENT_PERSONALIZATION: &'static str = "consentPersonalization";
    pub const CONSENT_RESEARCH: &'static str = "consentResearch";
}

/// Maximum lengths, in chars, of the free-text fields.
pub struct FieldLimits;

impl FieldLimits {
    pub const DISPLAY_NAME: usize = 80;
    pub const PRONOUNS: usize = 40;
    pub const LEARNING_DISABILITIES_OTHER: usize = 200;
    pub const TIMEZONE: usize = 64;
}
