//! Personalization SDK
//!
//! This crate provides the public API for the personalization module:
//! - `PreferencesClientV1` trait for talking to the remote preference resource
//! - Model types (`PreferenceSet`, its enums, `UserId`, `UserProfile`)
//! - Error type (`PreferencesError`)
//!
//! The synchronizer in `nb-personalization` consumes the client as a trait object:
//! ```ignore
//! let client: Arc<dyn PreferencesClientV1> = Arc::new(HttpPreferencesClient::new(&cfg.remote)?);
//! let raw = client.get_preferences(&user_id).await?;
//! ```

#![forbid(unsafe_code)]

pub mod api;
pub mod errors;
pub mod models;

pub use api::PreferencesClientV1;
pub use errors::PreferencesError;
pub use models::{
    AccessibilityFlags, ConsentToggles, ExplanationDepth, Language, LearningDisability,
    LearningPace, LearningStyle, PREFERENCES_VERSION, PreferenceSet, TimeFormat, Tone, UnitSystem,
    UserId, UserProfile,
};
