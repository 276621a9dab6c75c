//! Personalization Module Implementation
//!
//! Keeps one `PreferenceSet` consistent across in-memory state, a per-user
//! local storage slot and the remote preference resource while the user edits
//! it live. The remote API contract is defined in `personalization-sdk` and
//! re-exported here.

pub use personalization_sdk::{
    PreferenceSet, PreferencesClientV1, PreferencesError, UserId, UserProfile,
};

pub use config::PersonalizationConfig;
pub use domain::edit::PreferenceChange;
pub use domain::save_state::SaveState;
pub use domain::sync::{HydrationSource, PreferenceSync};
pub use module::init;

#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
pub mod module;
