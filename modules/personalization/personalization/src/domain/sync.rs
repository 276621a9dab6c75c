//! Preference hydration and dual-sink synchronization.
//!
//! One `PreferenceSync` owns the in-memory `PreferenceSet` of the signed-in
//! user for as long as the settings view is mounted. Edits are applied
//! immediately and flow to two debounced sinks: the per-user local storage
//! slot and the remote preference resource.
//!
//! Ordering rules:
//! - hydration resets state to per-user defaults first, and edits only count
//!   as dirty once the remote fetch has settled;
//! - every hydration and session end bumps a generation counter; queued or
//!   in-flight work tagged with an older generation is ignored;
//! - a remote acknowledgment marks the state "saved" only if memory still
//!   serializes to what was sent.

use std::sync::Arc;

use parking_lot::Mutex;
use personalization_sdk::{
    PreferenceSet, PreferencesClientV1, PreferencesError, UserId, UserProfile,
};
use tracing::instrument;

use crate::config::PersonalizationConfig;

use super::debounce::DebouncedSink;
use super::defaults::{Environment, defaults_for};
use super::edit::{PreferenceChange, apply_change};
use super::error::SyncError;
use super::normalize::{
    fingerprint, is_blank_payload, normalize, parse_record, parse_stored,
};
use super::optimistic::{OptimisticCell, OptimisticState};
use super::ports::{ErrorNotifier, LocalStore};
use super::save_state::{SaveState, SaveStateInputs, WriteOutcome, derive_save_state};
use super::throttle::ToastThrottle;

/// Where the state adopted by a hydration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationSource {
    /// Server record adopted and mirrored to local storage.
    Remote,
    /// Server had nothing; the local record was adopted and pushed once.
    Migrated { pushed: bool },
    /// Server unreachable; the local record was adopted.
    LocalCache,
    /// Nothing usable anywhere.
    Defaults,
    /// Same identity as the active session, nothing done.
    Unchanged,
    /// A newer hydration or session end overtook this one.
    Superseded,
    SessionEnded,
}

pub struct PreferenceSync {
    inner: Arc<Inner>,
    local_sink: DebouncedSink<u64>,
    remote_sink: DebouncedSink<u64>,
}

struct Inner {
    config: PersonalizationConfig,
    environment: Environment,
    client: Arc<dyn PreferencesClientV1>,
    store: Arc<dyn LocalStore>,
    notifier: Arc<dyn ErrorNotifier>,
    state: Mutex<SyncState>,
}

struct SyncState {
    generation: u64,
    session: Option<Session>,
    toast: ToastThrottle,
}

struct Session {
    user_id: UserId,
    storage_key: String,
    defaults: PreferenceSet,
    current: PreferenceSet,
    hydrated: bool,
    /// Serialization of the last acknowledged (or adopted) state.
    last_sent: Option<String>,
    in_flight: u32,
    outcome: WriteOutcome,
    migration_attempted: bool,
    cache: OptimisticCell<Option<PreferenceSet>>,
}

impl Session {
    fn new(user_id: UserId, storage_key: String, defaults: PreferenceSet) -> Self {
        Self {
            user_id,
            storage_key,
            current: defaults.clone(),
            defaults,
            hydrated: false,
            last_sent: None,
            in_flight: 0,
            outcome: WriteOutcome::None,
            migration_attempted: false,
            cache: OptimisticCell::new(None),
        }
    }

    fn adopt(&mut self, prefs: PreferenceSet, baseline: Option<String>) {
        self.current = prefs;
        self.last_sent = baseline;
        self.hydrated = true;
    }
}

impl PreferenceSync {
    /// Create the synchronizer and spawn its two sink tasks.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn new(
        config: PersonalizationConfig,
        environment: Environment,
        client: Arc<dyn PreferencesClientV1>,
        store: Arc<dyn LocalStore>,
        notifier: Arc<dyn ErrorNotifier>,
    ) -> Self {
        let local_delay = config.local_debounce();
        let remote_delay = config.remote_debounce();
        let toast = ToastThrottle::new(config.error_toast_interval());

        let inner = Arc::new(Inner {
            config,
            environment,
            client,
            store,
            notifier,
            state: Mutex::new(SyncState {
                generation: 0,
                session: None,
                toast,
            }),
        });

        let local_inner = Arc::clone(&inner);
        let local_sink = DebouncedSink::spawn("local", local_delay, move |generation: u64| {
            let inner = Arc::clone(&local_inner);
            async move {
                let task = tokio::task::spawn_blocking(move || inner.persist_local(generation));
                if let Err(err) = task.await {
                    tracing::debug!(error = %err, "local preference write task failed");
                }
            }
        });

        let remote_inner = Arc::clone(&inner);
        let remote_sink = DebouncedSink::spawn("remote", remote_delay, move |generation: u64| {
            let inner = Arc::clone(&remote_inner);
            async move {
                inner.write_remote(generation).await;
            }
        });

        Self {
            inner,
            local_sink,
            remote_sink,
        }
    }

    /// Follow the authenticated identity: hydrate on a new user, end on `None`.
    pub async fn set_session(&self, profile: Option<&UserProfile>) -> HydrationSource {
        let Some(profile) = profile else {
            self.end_session();
            return HydrationSource::SessionEnded;
        };
        let same_user = self
            .inner
            .state
            .lock()
            .session
            .as_ref()
            .is_some_and(|s| s.user_id == profile.id);
        if same_user {
            return HydrationSource::Unchanged;
        }
        self.hydrate(profile).await
    }

    /// Reset to `profile`'s defaults, then load the remote or local record.
    #[instrument(skip_all, fields(user_id = %profile.id))]
    pub async fn hydrate(&self, profile: &UserProfile) -> HydrationSource {
        self.local_sink.cancel();
        self.remote_sink.cancel();

        let defaults = defaults_for(profile, &self.inner.environment);
        let storage_key = self.inner.storage_key(&profile.id);
        let generation = {
            let mut state = self.inner.state.lock();
            state.generation = state.generation.wrapping_add(1);
            state.session = Some(Session::new(
                profile.id.clone(),
                storage_key.clone(),
                defaults.clone(),
            ));
            state.generation
        };
        tracing::debug!(generation, "hydration started");

        let fetched = self.inner.client.get_preferences(&profile.id).await;

        let remote = match fetched {
            Ok(Some(raw)) if !is_blank_payload(&raw) => Ok(Some(normalize(&raw, &defaults))),
            Ok(_) => Ok(None),
            Err(err) => Err(err),
        };
        let local = match &remote {
            Ok(Some(_)) => None,
            _ => self.inner.load_local(&storage_key, &defaults).await,
        };

        let (source, mirror) = {
            let mut state = self.inner.state.lock();
            if state.generation != generation {
                tracing::debug!(generation, "hydration superseded");
                return HydrationSource::Superseded;
            }
            let Some(session) = state.session.as_mut() else {
                return HydrationSource::Superseded;
            };

            match (remote, local) {
                (Ok(Some(prefs)), _) => {
                    let fp = fingerprint(&prefs);
                    session.cache.reset(Some(prefs.clone()));
                    session.adopt(prefs, Some(fp.clone()));
                    (HydrationSource::Remote, Some(fp))
                }
                (Ok(None), Some(prefs)) => {
                    let fp = fingerprint(&prefs);
                    session.cache.reset(None);
                    session.adopt(prefs, None);
                    let first = !session.migration_attempted;
                    session.migration_attempted = true;
                    (HydrationSource::Migrated { pushed: first }, Some(fp))
                }
                (Err(err), Some(prefs)) => {
                    log_fetch_failure(&err, "using local cache");
                    let fp = fingerprint(&prefs);
                    session.cache.reset(None);
                    session.adopt(prefs, Some(fp.clone()));
                    (HydrationSource::LocalCache, Some(fp))
                }
                (result, None) => {
                    if let Err(err) = result {
                        log_fetch_failure(&err, "using defaults");
                    }
                    let fp = fingerprint(&defaults);
                    session.cache.reset(None);
                    session.adopt(defaults, Some(fp));
                    (HydrationSource::Defaults, None)
                }
            }
        };

        if let Some(json) = mirror {
            self.inner.store_local(storage_key, json).await;
        }

        let source = match source {
            HydrationSource::Migrated { pushed: true } => {
                let pushed = self.inner.write_remote(generation).await;
                HydrationSource::Migrated { pushed }
            }
            other => other,
        };
        tracing::info!(?source, "preferences hydrated");
        source
    }

    /// Apply one field change. Never blocks on I/O.
    ///
    /// # Errors
    /// Returns `SyncError::NoSession` when no user is signed in.
    pub fn edit(&self, change: PreferenceChange) -> Result<PreferenceSet, SyncError> {
        self.update(|prefs| apply_change(prefs, change))
    }

    /// Replace the whole record with `f(current)`.
    ///
    /// # Errors
    /// Returns `SyncError::NoSession` when no user is signed in.
    pub fn update<F>(&self, f: F) -> Result<PreferenceSet, SyncError>
    where
        F: FnOnce(&PreferenceSet) -> PreferenceSet,
    {
        let (next, generation) = {
            let mut state = self.inner.state.lock();
            let generation = state.generation;
            let session = state.session.as_mut().ok_or(SyncError::NoSession)?;
            session.current = f(&session.current);
            session.outcome = WriteOutcome::None;
            (session.current.clone(), session.hydrated.then_some(generation))
        };

        if let Some(generation) = generation {
            self.local_sink.schedule(generation);
            self.remote_sink.schedule(generation);
        } else {
            tracing::debug!("edit before hydration completed, kept in memory only");
        }
        Ok(next)
    }

    /// Back to defaults and drop the local slot. The remote copy is updated
    /// through the regular debounced path.
    ///
    /// # Errors
    /// Returns `SyncError::NoSession` when no user is signed in.
    pub fn reset(&self) -> Result<PreferenceSet, SyncError> {
        let (defaults, storage_key, generation) = {
            let mut state = self.inner.state.lock();
            let generation = state.generation;
            let session = state.session.as_mut().ok_or(SyncError::NoSession)?;
            session.current = session.defaults.clone();
            session.outcome = WriteOutcome::None;
            (
                session.defaults.clone(),
                session.storage_key.clone(),
                session.hydrated.then_some(generation),
            )
        };

        self.local_sink.cancel();
        if let Err(err) = self.inner.store.remove(&storage_key) {
            tracing::debug!(error = %err, "failed to clear local preferences");
        }
        if let Some(generation) = generation {
            self.remote_sink.schedule(generation);
        }
        Ok(defaults)
    }

    /// Discard in-memory state and pending writes. Stored copies remain.
    pub fn end_session(&self) {
        self.local_sink.cancel();
        self.remote_sink.cancel();
        let mut state = self.inner.state.lock();
        state.generation = state.generation.wrapping_add(1);
        if let Some(session) = state.session.take() {
            tracing::debug!(user_id = %session.user_id, "preference session ended");
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<PreferenceSet> {
        self.inner
            .state
            .lock()
            .session
            .as_ref()
            .map(|s| s.current.clone())
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.inner
            .state
            .lock()
            .session
            .as_ref()
            .map(|s| s.user_id.clone())
    }

    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.inner
            .state
            .lock()
            .session
            .as_ref()
            .is_some_and(|s| s.hydrated)
    }

    /// The query-cache view of the remote resource, including optimistic writes.
    #[must_use]
    pub fn cached_remote(&self) -> Option<PreferenceSet> {
        self.inner
            .state
            .lock()
            .session
            .as_ref()
            .and_then(|s| s.cache.value().clone())
    }

    #[must_use]
    pub fn save_state(&self) -> SaveState {
        let state = self.inner.state.lock();
        let Some(session) = state.session.as_ref() else {
            return SaveState::Idle;
        };
        let current = fingerprint(&session.current);
        derive_save_state(SaveStateInputs {
            hydrated: session.hydrated,
            in_flight: session.in_flight > 0,
            dirty: session.last_sent.as_deref() != Some(current.as_str()),
            outcome: session.outcome,
        })
    }
}

impl Inner {
    fn storage_key(&self, user_id: &UserId) -> String {
        format!("{}{user_id}", self.config.storage_key_prefix)
    }

    fn read_local(&self, key: &str, defaults: &PreferenceSet) -> Option<PreferenceSet> {
        match self.store.load(key) {
            Ok(Some(text)) => {
                let parsed = parse_stored(&text, defaults);
                if parsed.is_none() {
                    tracing::debug!(key, "ignoring unversioned or corrupt local preferences");
                }
                parsed
            }
            Ok(None) => None,
            Err(err) => {
                tracing::debug!(error = %err, "local preferences unreadable");
                None
            }
        }
    }

    /// `read_local` off the async runtime; the store may do blocking I/O.
    async fn load_local(
        self: &Arc<Self>,
        key: &str,
        defaults: &PreferenceSet,
    ) -> Option<PreferenceSet> {
        let inner = Arc::clone(self);
        let (key, defaults) = (key.to_owned(), defaults.clone());
        tokio::task::spawn_blocking(move || inner.read_local(&key, &defaults))
            .await
            .unwrap_or_else(|err| {
                tracing::debug!(error = %err, "local preference read task failed");
                None
            })
    }

    async fn store_local(self: &Arc<Self>, key: String, json: String) {
        let inner = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || inner.save_local(&key, &json));
        if let Err(err) = task.await {
            tracing::debug!(error = %err, "local preference write task failed");
        }
    }

    fn save_local(&self, key: &str, json: &str) {
        if let Err(err) = self.store.save(key, json) {
            tracing::debug!(error = %err, "local preference write failed, continuing remote-only");
        }
    }

    fn persist_local(&self, generation: u64) {
        let target = {
            let state = self.state.lock();
            if state.generation != generation {
                return;
            }
            state
                .session
                .as_ref()
                .filter(|s| s.hydrated)
                .map(|s| (s.storage_key.clone(), fingerprint(&s.current)))
        };
        if let Some((key, json)) = target {
            self.save_local(&key, &json);
        }
    }

    /// Push the current state if it differs from the last acknowledged one.
    ///
    /// Returns `true` when the server acknowledged a write.
    #[instrument(skip(self))]
    async fn write_remote(&self, generation: u64) -> bool {
        let (user_id, prefs, sent) = {
            let mut state = self.state.lock();
            if state.generation != generation {
                return false;
            }
            let Some(session) = state.session.as_mut().filter(|s| s.hydrated) else {
                return false;
            };
            let sent = fingerprint(&session.current);
            if session.last_sent.as_deref() == Some(sent.as_str()) {
                session.outcome = WriteOutcome::None;
                return false;
            }
            session.in_flight += 1;
            session.cache.apply(Some(session.current.clone()));
            (session.user_id.clone(), session.current.clone(), sent)
        };

        let result = self.client.patch_preferences(&user_id, &prefs).await;

        let (saved, notify) = {
            let mut state = self.state.lock();
            if state.generation != generation {
                tracing::debug!("remote write settled after identity change, ignored");
                return false;
            }
            let SyncState { session, toast, .. } = &mut *state;
            let Some(session) = session.as_mut() else {
                return false;
            };
            session.in_flight = session.in_flight.saturating_sub(1);

            match result {
                Ok(ack) => {
                    // Bodies that are not a current record acknowledge what was sent
                    let acknowledged = parse_record(&ack, &session.defaults).unwrap_or(prefs);
                    session.cache.commit(Some(acknowledged));
                    let unchanged_since = fingerprint(&session.current) == sent;
                    session.last_sent = Some(sent);
                    session.outcome = if unchanged_since {
                        WriteOutcome::Saved
                    } else {
                        WriteOutcome::None
                    };
                    tracing::debug!(unchanged_since, "remote preferences saved");
                    (true, None)
                }
                Err(err) => {
                    session.cache.rollback();
                    session.outcome = WriteOutcome::Failed;
                    let rolled_back = session.cache.state() == OptimisticState::RolledBack;
                    tracing::warn!(error = %err, rolled_back, "remote preference write failed");
                    (false, toast.try_fire().then_some(err))
                }
            }
        };

        if let Some(err) = notify {
            self.notifier.save_failed(&err);
        }
        saved
    }
}

/// Being offline is expected; anything else points at a server or auth problem.
fn log_fetch_failure(err: &PreferencesError, fallback: &str) {
    if err.is_unavailable() {
        tracing::info!(error = %err, fallback, "remote preferences unreachable");
    } else {
        tracing::warn!(error = %err, fallback, "remote preferences fetch failed");
    }
}
