//! `PreferencesClientV1` trait definition.
//!
//! This trait defines the remote preference resource as seen by the client
//! (Version 1). Payloads coming back from the server are returned raw: they
//! are untrusted and must be normalized against per-user defaults before use.

use async_trait::async_trait;

use crate::errors::PreferencesError;
use crate::models::{PreferenceSet, UserId};

/// Remote preference API (Version 1).
///
/// Implementations are shared as `Arc<dyn PreferencesClientV1>` by the
/// synchronizer, so every method takes `&self`.
#[async_trait]
pub trait PreferencesClientV1: Send + Sync {
    /// Fetch the stored preferences of `user`.
    ///
    /// Returns `Ok(None)` when the server holds no record (`{ "prefs": null }`).
    async fn get_preferences(
        &self,
        user: &UserId,
    ) -> Result<Option<serde_json::Value>, PreferencesError>;

    /// Replace the stored preferences of `user` with `prefs` (full body PATCH).
    ///
    /// Returns the server-normalized record.
    async fn patch_preferences(
        &self,
        user: &UserId,
        prefs: &PreferenceSet,
    ) -> Result<serde_json::Value, PreferencesError>;
}
