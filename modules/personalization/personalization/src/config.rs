use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Environment variable prefix; nested keys use `__` (`NB_PERSONALIZATION_REMOTE__BASE_URL`).
pub const ENV_PREFIX: &str = "NB_PERSONALIZATION_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid personalization config: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizationConfig {
    #[serde(default = "default_local_debounce_ms")]
    pub local_debounce_ms: u64,
    #[serde(default = "default_remote_debounce_ms")]
    pub remote_debounce_ms: u64,
    #[serde(default = "default_error_toast_interval_ms")]
    pub error_toast_interval_ms: u64,
    #[serde(default = "default_storage_key_prefix")]
    pub storage_key_prefix: String,
    /// Directory for `FileStore`. `None` keeps the cache in memory only.
    #[serde(default)]
    pub storage_dir: Option<String>,
    #[serde(default)]
    pub remote: RemoteClientConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_preferences_path")]
    pub preferences_path: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for PersonalizationConfig {
    fn default() -> Self {
        Self {
            local_debounce_ms: default_local_debounce_ms(),
            remote_debounce_ms: default_remote_debounce_ms(),
            error_toast_interval_ms: default_error_toast_interval_ms(),
            storage_key_prefix: default_storage_key_prefix(),
            storage_dir: None,
            remote: RemoteClientConfig::default(),
        }
    }
}

impl Default for RemoteClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            preferences_path: default_preferences_path(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl PersonalizationConfig {
    /// Layer defaults, an optional YAML file and `NB_PERSONALIZATION_*` env vars.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if a layer holds a value of the wrong type.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(&figment)
    }

    /// # Errors
    /// Returns `ConfigError::Invalid` if the figment cannot be extracted.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    #[must_use]
    pub fn local_debounce(&self) -> Duration {
        Duration::from_millis(self.local_debounce_ms)
    }

    #[must_use]
    pub fn remote_debounce(&self) -> Duration {
        Duration::from_millis(self.remote_debounce_ms)
    }

    #[must_use]
    pub fn error_toast_interval(&self) -> Duration {
        Duration::from_millis(self.error_toast_interval_ms)
    }
}

impl RemoteClientConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_local_debounce_ms() -> u64 {
    250
}

fn default_remote_debounce_ms() -> u64 {
    650
}

fn default_error_toast_interval_ms() -> u64 {
    8_000
}

fn default_storage_key_prefix() -> String {
    "nb:personalization:v1:".to_owned()
}

fn default_base_url() -> String {
    "http://localhost:8087".to_owned()
}

fn default_preferences_path() -> String {
    "/api/user/preferences".to_owned()
}

fn default_timeout_ms() -> u64 {
    10_000
}
