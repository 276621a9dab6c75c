//! `PreferencesClientV1` over HTTP.
//!
//! `GET  <base><path>` -> `{ "prefs": PreferenceSet | null }`
//! `PATCH <base><path>` with the full set -> the server-normalized set, bare
//! or wrapped in `{ "prefs": ... }`.

use async_trait::async_trait;
use personalization_sdk::{PreferenceSet, PreferencesClientV1, PreferencesError, UserId};
use reqwest::{Method, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use crate::config::RemoteClientConfig;
use crate::domain::normalize::clamp_text;

const BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum RemoteClientError {
    #[error("invalid preference service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct PreferencesEnvelope {
    #[serde(default)]
    prefs: Option<Value>,
}

pub struct HttpPreferencesClient {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<SecretString>,
}

impl HttpPreferencesClient {
    /// # Errors
    /// Returns `RemoteClientError` if the URL is malformed or the TLS backend fails to initialize.
    pub fn new(config: &RemoteClientConfig) -> Result<Self, RemoteClientError> {
        let endpoint = Url::parse(&config.base_url)?.join(&config.preferences_path)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            endpoint,
            token: None,
        })
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request(&self, method: Method) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.endpoint.clone());
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }
}

#[async_trait]
impl PreferencesClientV1 for HttpPreferencesClient {
    #[instrument(skip_all, fields(user_id = %user))]
    async fn get_preferences(&self, user: &UserId) -> Result<Option<Value>, PreferencesError> {
        let response = self
            .request(Method::GET)
            .send()
            .await
            .map_err(map_transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("no stored preferences on server");
            return Ok(None);
        }

        let envelope: PreferencesEnvelope = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| PreferencesError::invalid_response(e.to_string()))?;

        Ok(envelope.prefs.filter(|prefs| !prefs.is_null()))
    }

    #[instrument(skip_all, fields(user_id = %user))]
    async fn patch_preferences(
        &self,
        user: &UserId,
        prefs: &PreferenceSet,
    ) -> Result<Value, PreferencesError> {
        let response = self
            .request(Method::PATCH)
            .json(prefs)
            .send()
            .await
            .map_err(map_transport_error)?;

        let body: Value = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| PreferencesError::invalid_response(e.to_string()))?;

        Ok(unwrap_envelope(body))
    }
}

async fn ensure_success(response: Response) -> Result<Response, PreferencesError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(PreferencesError::Unauthorized);
    }
    let body = response.text().await.unwrap_or_default();
    Err(PreferencesError::rejected(
        status.as_u16(),
        clamp_text(&body, BODY_PREVIEW_CHARS),
    ))
}

fn map_transport_error(err: reqwest::Error) -> PreferencesError {
    if err.is_decode() {
        PreferencesError::invalid_response(err.to_string())
    } else if err.is_builder() {
        tracing::error!(error = %err, "failed to build preference request");
        PreferencesError::internal()
    } else {
        PreferencesError::unavailable(err.to_string())
    }
}

/// Accept `{ "prefs": {...} }` as well as a bare record.
fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut obj) if obj.contains_key("prefs") && !obj.contains_key("version") => {
            obj.remove("prefs").unwrap_or(Value::Null)
        }
        other => other,
    }
}
