// ── Session facade ──
//
// Lifecycle for one caller's view of the bird data service: attaches a
// backend handle, serves cached queries, runs mutations with
// invalidation, and drives the admin gate on every identity change.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::FutureExt;
use secrecy::ExposeSecret;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, trace, warn};
use url::Url;

use birdwatch_api::{BackendClient, BlobClient, Credentials, TlsMode, TransportConfig};

use crate::command::{Command, CommandResult};
use crate::config::{AuthCredentials, SessionConfig, TlsVerification};
use crate::error::CoreError;
use crate::gate::{AdminGate, GateState};
use crate::model::{BirdRecord, FileReference, Identity, LocationEntry, UserProfile, UserRole};
use crate::service::{BirdService, MediaStore};
use crate::store::{DataStore, Fetcher, QueryCache, QueryFamily, QueryKey, QueryResult};
use crate::stream::QueryObserver;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Session ──────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<SessionInner>`. Queries stay disabled
/// (loading, no network call) until a backend is attached.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    store: Arc<DataStore>,
    gate: AdminGate,
    connection_state: watch::Sender<ConnectionState>,
    backend: Mutex<Option<Backend>>,
}

/// Everything bound to one identity.
#[derive(Clone)]
struct Backend {
    service: Arc<dyn BirdService>,
    media: Option<Arc<dyn MediaStore>>,
    identity: Option<Identity>,
}

impl Session {
    /// Create a session from configuration. Does NOT connect; call
    /// [`connect()`](Self::connect) or [`attach()`](Self::attach).
    pub fn new(config: SessionConfig) -> Self {
        let store = Arc::new(DataStore::new(config.stale_time));
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            inner: Arc::new(SessionInner {
                config,
                store,
                gate: AdminGate::new(),
                connection_state,
                backend: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Build HTTP clients from the configuration and attach them.
    pub async fn connect(&self) -> Result<GateState, CoreError> {
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        let config = &self.inner.config;
        let clients = build_clients(config);
        let (service, media) = match clients {
            Ok(clients) => clients,
            Err(e) => {
                self.inner.connection_state.send_replace(ConnectionState::Failed);
                return Err(e);
            }
        };

        let state = self
            .attach(service, media, config.auth.identity())
            .await;
        info!(backend = %config.backend_url, gate = %state, "session connected");
        Ok(state)
    }

    /// Attach a backend handle for `identity`, replacing any previous one.
    ///
    /// Clears every cached query (nothing survives an identity change)
    /// and re-evaluates the admin gate.
    pub async fn attach(
        &self,
        service: Arc<dyn BirdService>,
        media: Option<Arc<dyn MediaStore>>,
        identity: Option<Identity>,
    ) -> GateState {
        {
            let mut backend = self.inner.backend.lock().await;
            self.inner.store.clear();
            *backend = Some(Backend {
                service: Arc::clone(&service),
                media,
                identity: identity.clone(),
            });
        }
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        debug!(principal = ?identity.as_ref().map(Identity::principal), "backend attached");

        self.inner
            .gate
            .evaluate(identity.as_ref(), || async move {
                service.is_caller_admin().await
            })
            .await
    }

    /// Detach the backend, drop all cached data, and close the gate.
    pub async fn logout(&self) {
        {
            let mut backend = self.inner.backend.lock().await;
            *backend = None;
            self.inner.store.clear();
        }
        self.inner.gate.begin(false);
        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("session closed");
    }

    /// One-shot: connect, run closure, log out.
    pub async fn oneshot<F, Fut, T>(config: SessionConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let session = Session::new(config);
        session.connect().await?;
        let result = f(session.clone()).await;
        session.logout().await;
        result
    }

    pub async fn is_ready(&self) -> bool {
        self.inner.backend.lock().await.is_some()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.inner
            .backend
            .lock()
            .await
            .as_ref()
            .and_then(|b| b.identity.clone())
    }

    async fn service(&self) -> Option<Arc<dyn BirdService>> {
        self.inner
            .backend
            .lock()
            .await
            .as_ref()
            .map(|b| Arc::clone(&b.service))
    }

    async fn media(&self) -> Result<Arc<dyn MediaStore>, CoreError> {
        let backend = self.inner.backend.lock().await;
        let backend = backend.as_ref().ok_or(CoreError::NotReady)?;
        backend.media.clone().ok_or_else(|| CoreError::Config {
            message: "no blob storage URL configured".into(),
        })
    }

    // ── Admin gate ───────────────────────────────────────────────

    pub fn gate_state(&self) -> GateState {
        self.inner.gate.state()
    }

    pub fn is_admin(&self) -> bool {
        self.inner.gate.state().is_admin()
    }

    /// Subscribe to gate transitions.
    pub fn watch_gate(&self) -> watch::Receiver<GateState> {
        self.inner.gate.subscribe()
    }

    /// Re-run the admin check for the current identity.
    pub async fn refresh_gate(&self) -> GateState {
        let backend = self.inner.backend.lock().await.clone();
        match backend {
            Some(Backend {
                service, identity, ..
            }) => {
                self.inner
                    .gate
                    .evaluate(identity.as_ref(), || async move {
                        service.is_caller_admin().await
                    })
                    .await
            }
            None => self.inner.gate.evaluate(None, || async { Ok(false) }).await,
        }
    }

    // ── Queries ──────────────────────────────────────────────────

    async fn run_query<T, F, Fut>(&self, cache: &QueryCache<T>, key: QueryKey, f: F) -> QueryResult<T>
    where
        T: Send + Sync + 'static,
        F: Fn(Arc<dyn BirdService>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        // Bind the entry under the backend lock so an `attach` or `logout`
        // cannot clear the store between reading the service and storing
        // its fetcher.
        let pending = {
            let backend = self.inner.backend.lock().await;
            let Some(backend) = backend.as_ref() else {
                trace!(%key, "query disabled until a backend is attached");
                return QueryResult::loading();
            };
            let service = Arc::clone(&backend.service);
            let fetcher: Fetcher<T> = Arc::new(move || f(Arc::clone(&service)).boxed());
            cache.prepare(&key, fetcher)
        };
        pending.run().await
    }

    pub async fn all_birds(&self) -> QueryResult<Vec<BirdRecord>> {
        self.run_query(&self.inner.store.birds, QueryKey::AllBirdData, |svc| async move {
            svc.all_birds().await
        })
        .await
    }

    pub async fn bird_details(&self, name: &str) -> QueryResult<Option<BirdRecord>> {
        let owned = name.to_owned();
        self.run_query(
            &self.inner.store.bird_details,
            QueryKey::BirdDetails(name.to_owned()),
            move |svc| {
                let name = owned.clone();
                async move { svc.bird_details(&name).await }
            },
        )
        .await
    }

    pub async fn all_locations(&self) -> QueryResult<Vec<LocationEntry>> {
        self.run_query(&self.inner.store.locations, QueryKey::AllLocations, |svc| async move {
            svc.all_locations().await
        })
        .await
    }

    pub async fn file_references(&self) -> QueryResult<Vec<FileReference>> {
        self.run_query(
            &self.inner.store.file_references,
            QueryKey::FileReferences,
            |svc| async move { svc.file_references().await },
        )
        .await
    }

    pub async fn caller_profile(&self) -> QueryResult<Option<UserProfile>> {
        self.run_query(&self.inner.store.profile, QueryKey::CallerProfile, |svc| async move {
            svc.caller_profile().await
        })
        .await
    }

    pub async fn caller_role(&self) -> QueryResult<UserRole> {
        self.run_query(&self.inner.store.role, QueryKey::CallerRole, |svc| async move {
            svc.caller_role().await
        })
        .await
    }

    /// Cached bird list without touching the network.
    pub fn cached_birds(&self) -> QueryResult<Vec<BirdRecord>> {
        self.inner.store.birds.peek(&QueryKey::AllBirdData)
    }

    /// Look up one file reference. Not cached: used right before a
    /// delete or to check an upload landed.
    pub async fn file_reference(&self, path: &str) -> Result<Option<FileReference>, CoreError> {
        let service = self.service().await.ok_or(CoreError::NotReady)?;
        service.file_reference(path).await
    }

    /// Re-run the last fetch for `key` regardless of freshness. Clears a
    /// cached error. Returns `false` when the key was never queried.
    pub async fn refetch(&self, key: &QueryKey) -> bool {
        let store = &self.inner.store;
        match key.family() {
            QueryFamily::AllBirdData => store.birds.refetch(key).await.is_some(),
            QueryFamily::BirdDetails => store.bird_details.refetch(key).await.is_some(),
            QueryFamily::AllLocations => store.locations.refetch(key).await.is_some(),
            QueryFamily::FileReferences => store.file_references.refetch(key).await.is_some(),
            QueryFamily::CallerProfile => store.profile.refetch(key).await.is_some(),
            QueryFamily::CallerRole => store.role.refetch(key).await.is_some(),
        }
    }

    // ── Observers ────────────────────────────────────────────────

    pub fn observe_birds(&self) -> QueryObserver<Vec<BirdRecord>> {
        self.inner.store.birds.observe(&QueryKey::AllBirdData)
    }

    pub fn observe_bird_details(&self, name: &str) -> QueryObserver<Option<BirdRecord>> {
        self.inner
            .store
            .bird_details
            .observe(&QueryKey::BirdDetails(name.to_owned()))
    }

    pub fn observe_locations(&self) -> QueryObserver<Vec<LocationEntry>> {
        self.inner.store.locations.observe(&QueryKey::AllLocations)
    }

    pub fn observe_file_references(&self) -> QueryObserver<Vec<FileReference>> {
        self.inner
            .store
            .file_references
            .observe(&QueryKey::FileReferences)
    }

    pub fn observe_profile(&self) -> QueryObserver<Option<UserProfile>> {
        self.inner.store.profile.observe(&QueryKey::CallerProfile)
    }

    pub fn observe_role(&self) -> QueryObserver<UserRole> {
        self.inner.store.role.observe(&QueryKey::CallerRole)
    }

    // ── Mutations ────────────────────────────────────────────────

    /// Run `op` once against the backend. On success, mark `invalidates`
    /// stale before returning; on failure, leave the cache untouched.
    pub async fn mutate<R, F, Fut>(&self, invalidates: &[QueryFamily], op: F) -> Result<R, CoreError>
    where
        F: FnOnce(Arc<dyn BirdService>) -> Fut,
        Fut: Future<Output = Result<R, CoreError>>,
    {
        let service = self.service().await.ok_or(CoreError::NotReady)?;
        let result = op(service).await?;
        self.inner.store.invalidate(invalidates);
        Ok(result)
    }

    /// Validate and execute a command.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        cmd.validate()?;

        let name = cmd.name();
        let invalidates = cmd.invalidates();
        debug!(command = name, "executing command");

        let result = self
            .mutate(invalidates, move |service| async move {
                route_command(service.as_ref(), cmd).await
            })
            .await;

        match &result {
            Ok(_) => info!(command = name, "command succeeded"),
            Err(e) => warn!(command = name, error = %e, "command failed"),
        }
        result
    }

    // ── Media ────────────────────────────────────────────────────

    /// Upload a blob, then register it with the backend.
    pub async fn upload_media(&self, path: &str, bytes: Bytes) -> Result<FileReference, CoreError> {
        if path.trim().is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "file path must not be empty".into(),
            });
        }
        let media = self.media().await?;
        let receipt = media.upload(path, bytes).await?;
        debug!(path = %receipt.path, hash = %receipt.hash, "blob uploaded; registering");

        match self
            .execute(Command::RegisterFileReference {
                path: receipt.path,
                hash: receipt.hash,
            })
            .await?
        {
            CommandResult::FileReference(reference) => Ok(reference),
            other => Err(CoreError::Internal(format!(
                "register_file_reference returned {other:?}"
            ))),
        }
    }

    /// Displayable URL for a storage path. `None` while no storage is
    /// attached or when the object is missing.
    pub async fn resolve_media_url(&self, path: &str) -> Option<Url> {
        let media = self.media().await.ok()?;
        media.resolve_url(path).await
    }

    // ── State observation ────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }
}

// ── Command routing ──────────────────────────────────────────────

async fn route_command(
    service: &dyn BirdService,
    cmd: Command,
) -> Result<CommandResult, CoreError> {
    match cmd {
        Command::AddBird(bird) => Ok(CommandResult::Bird(service.add_bird(&bird).await?)),
        Command::UpdateBird { id, bird } => Ok(CommandResult::Bird(
            service.update_bird(&id, &bird).await?,
        )),
        Command::DeleteBird { id } => {
            service.delete_bird(&id).await?;
            Ok(CommandResult::Ok)
        }
        Command::AddLocation { bird_id, location } => {
            service.add_location(&bird_id, &location).await?;
            Ok(CommandResult::Ok)
        }
        Command::DeleteLocation { bird_id, index } => {
            service.delete_location(&bird_id, index).await?;
            Ok(CommandResult::Ok)
        }
        Command::RegisterFileReference { path, hash } => Ok(CommandResult::FileReference(
            service.register_file_reference(&path, &hash).await?,
        )),
        Command::DropFileReference { path } => {
            service.drop_file_reference(&path).await?;
            Ok(CommandResult::Ok)
        }
        Command::SaveProfile(profile) => {
            service.save_caller_profile(&profile).await?;
            Ok(CommandResult::Ok)
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

type Clients = (Arc<dyn BirdService>, Option<Arc<dyn MediaStore>>);

fn build_clients(config: &SessionConfig) -> Result<Clients, CoreError> {
    let transport = TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    };
    let credentials = match &config.auth {
        AuthCredentials::Anonymous => Credentials::Anonymous,
        AuthCredentials::Token { token, .. } => Credentials::bearer(token.expose_secret()),
    };

    let backend = BackendClient::new(config.backend_url.as_str(), &credentials, &transport)?;
    let media = config
        .storage_url
        .as_ref()
        .map(|url| BlobClient::new(url.as_str(), &credentials, &transport))
        .transpose()?
        .map(|client| Arc::new(client) as Arc<dyn MediaStore>);

    Ok((Arc::new(backend), media))
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
