//! Boundaries the synchronizer talks to besides the remote API.

use personalization_sdk::PreferencesError;

use super::error::StorageError;

/// Synchronous per-device key/value storage (browser local storage semantics).
pub trait LocalStore: Send + Sync {
    /// # Errors
    /// Returns `StorageError` if the store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    /// Returns `StorageError` if the value cannot be written (quota, I/O).
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns `StorageError` if the store cannot be modified.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// User-facing notification channel (toasts in the UI).
pub trait ErrorNotifier: Send + Sync {
    fn save_failed(&self, error: &PreferencesError);
}
