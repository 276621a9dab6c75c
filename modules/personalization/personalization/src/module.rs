use std::sync::Arc;

use anyhow::Context;
use personalization_sdk::PreferencesClientV1;
use secrecy::SecretString;
use tracing::info;

use crate::config::PersonalizationConfig;
use crate::domain::defaults::Environment;
use crate::domain::ports::LocalStore;
use crate::domain::sync::PreferenceSync;
use crate::infra::notify::LogNotifier;
use crate::infra::remote::HttpPreferencesClient;
use crate::infra::storage::{FileStore, InMemoryStore};

/// Wire a `PreferenceSync` from configuration: HTTP remote, file-backed local
/// storage when `storage_dir` is set (in-memory otherwise), log notifications.
///
/// # Errors
/// Fails when the remote client cannot be built from `config.remote`.
pub fn init(
    config: PersonalizationConfig,
    bearer_token: Option<SecretString>,
) -> anyhow::Result<PreferenceSync> {
    info!("Initializing personalization module");

    let mut client = HttpPreferencesClient::new(&config.remote)
        .context("failed to create preference service client")?;
    if let Some(token) = bearer_token {
        client = client.with_bearer_token(token);
    }
    info!(endpoint = %client.endpoint(), "preference service client ready");

    let store: Arc<dyn LocalStore> = match config.storage_dir.as_deref() {
        Some(dir) => {
            info!(dir, "using file-backed local preference storage");
            Arc::new(FileStore::new(dir))
        }
        None => Arc::new(InMemoryStore::new()),
    };

    let client: Arc<dyn PreferencesClientV1> = Arc::new(client);
    let sync = PreferenceSync::new(
        config,
        Environment::detect(),
        client,
        store,
        Arc::new(LogNotifier),
    );

    info!("Personalization module initialized");
    Ok(sync)
}
