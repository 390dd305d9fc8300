//! crates/velotrivia_core/src/sync.rs
//!
//! The sync controller owns the in-memory project state. It hydrates that
//! state once at startup (remote store first, local cache second) and pushes
//! every later change to both stores after a quiet period.
//!
//! All mutations take the same async mutex that guards the pending debounce
//! timer, so concurrent commands are applied one at a time and always
//! coalesce into a single debounce window. Sync cycles hold a separate write
//! gate, so at most one cycle writes to the stores at a time and each one
//! snapshots the state only after earlier writes have landed.

use crate::domain::{AgentConfig, PostStatus, ProjectData, TriviaPost};
use crate::ports::{ContentGenerator, LocalCache, PortError, PortResult, RemoteStore};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Quiet period between the last mutation and the write to both stores.
pub const SYNC_DEBOUNCE: Duration = Duration::from_millis(1000);

/// How long the simulated Facebook authorization takes.
pub const SIMULATED_AUTH_DELAY: Duration = Duration::from_millis(1500);

pub const CONFIG_CACHE_KEY: &str = "velotrivia_config";
pub const POSTS_CACHE_KEY: &str = "velotrivia_posts";

/// Topic sent to the generator when the configured one is blank.
pub const FALLBACK_TOPIC: &str = "Bicycles and Cycling";

/// Transient flags surfaced to the views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_loading: bool,
    /// Set while a sync cycle runs. Trivia generation also raises it so the
    /// dashboard can show the generate button as busy.
    pub is_syncing: bool,
    /// Id of the post whose image is being generated.
    pub generating_image: Option<String>,
}

struct ControllerState {
    data: ProjectData,
    status: SyncStatus,
    /// False until hydration completes and again after shutdown.
    sync_enabled: bool,
    pending_sync: Option<CancellationToken>,
}

struct Shared {
    state: Mutex<ControllerState>,
    write_gate: Mutex<()>,
    remote: Arc<dyn RemoteStore>,
    cache: Arc<dyn LocalCache>,
    generator: Arc<dyn ContentGenerator>,
}

/// Single owner of `config` and `posts`. Cloning yields another handle to
/// the same state.
#[derive(Clone)]
pub struct SyncController {
    shared: Arc<Shared>,
}

impl SyncController {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        cache: Arc<dyn LocalCache>,
        generator: Arc<dyn ContentGenerator>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ControllerState {
                    data: ProjectData::default(),
                    status: SyncStatus::default(),
                    sync_enabled: false,
                    pending_sync: None,
                }),
                write_gate: Mutex::new(()),
                remote,
                cache,
                generator,
            }),
        }
    }

    //=====================================================================================
    // Hydration
    //=====================================================================================

    /// Populates the state from the remote store, falling back to the local
    /// cache. Never fails: any error leaves the state at its defaults.
    pub async fn hydrate(&self) {
        let baseline = {
            let mut state = self.shared.state.lock().await;
            state.status.is_loading = true;
            state.data.clone()
        };

        let hydrated = match self.read_persisted(&baseline).await {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to load initial data: {}", e);
                baseline.clone()
            }
        };

        let mut state = self.shared.state.lock().await;
        let changed = hydrated != baseline;
        state.data = hydrated;
        state.status.is_loading = false;
        state.sync_enabled = true;
        info!(
            "Hydration complete with {} posts.",
            state.data.posts.len()
        );

        // Mirror freshly adopted data back so both stores agree with memory.
        if changed {
            self.schedule_sync(&mut state);
        }
    }

    async fn read_persisted(&self, baseline: &ProjectData) -> PortResult<ProjectData> {
        if let Some(data) = self.shared.remote.load().await {
            info!("Loaded project data from the remote store.");
            return Ok(data);
        }

        info!("Remote store returned nothing, reading the local cache.");
        let mut data = baseline.clone();
        if let Some(raw) = self.shared.cache.get_item(POSTS_CACHE_KEY).await? {
            data.posts = serde_json::from_str(&raw)
                .map_err(|e| PortError::Unexpected(format!("Corrupt cached posts: {}", e)))?;
        }

        // Posts adopted above survive a bad config entry.
        match self.read_cached_config().await {
            Ok(Some(config)) => data.config = config,
            Ok(None) => {}
            Err(e) => error!("Keeping default config: {}", e),
        }
        Ok(data)
    }

    async fn read_cached_config(&self) -> PortResult<Option<AgentConfig>> {
        let Some(raw) = self.shared.cache.get_item(CONFIG_CACHE_KEY).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| PortError::Unexpected(format!("Corrupt cached config: {}", e)))
    }

    //=====================================================================================
    // Debounced Sync
    //=====================================================================================

    /// Replaces the whole project value and schedules a sync.
    fn replace_data(&self, state: &mut ControllerState, next: ProjectData) {
        state.data = next;
        self.schedule_sync(state);
    }

    fn schedule_sync(&self, state: &mut ControllerState) {
        if !state.sync_enabled {
            return;
        }
        if let Some(previous) = state.pending_sync.take() {
            previous.cancel();
        }

        let token = CancellationToken::new();
        state.pending_sync = Some(token.clone());

        let controller = self.clone();
        tokio::spawn(async move {
            controller.run_sync_timer(token).await;
        });
    }

    async fn run_sync_timer(self, token: CancellationToken) {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(SYNC_DEBOUNCE) => {}
        }

        let _gate = self.shared.write_gate.lock().await;
        let snapshot = {
            let mut state = self.shared.state.lock().await;
            // Cancellation happens under this lock, so a timer superseded
            // while it waited for the gate or the lock must not write.
            if token.is_cancelled() {
                return;
            }
            state.pending_sync = None;
            state.status.is_syncing = true;
            state.data.clone()
        };

        debug!("Syncing {} posts.", snapshot.posts.len());
        if let Err(e) = self.push_snapshot(&snapshot).await {
            error!("Sync failed: {}", e);
        }

        self.shared.state.lock().await.status.is_syncing = false;
    }

    /// Writes the local cache first so the data survives a remote outage.
    async fn push_snapshot(&self, data: &ProjectData) -> PortResult<()> {
        let config = serde_json::to_string(&data.config)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let posts = serde_json::to_string(&data.posts)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        self.shared.cache.set_item(CONFIG_CACHE_KEY, &config).await?;
        self.shared.cache.set_item(POSTS_CACHE_KEY, &posts).await?;

        self.shared.remote.save(data).await
    }

    /// Drops the pending timer without flushing and stops scheduling syncs.
    pub async fn shutdown(&self) {
        let mut state = self.shared.state.lock().await;
        state.sync_enabled = false;
        if let Some(pending) = state.pending_sync.take() {
            pending.cancel();
            info!("Discarded a pending sync on shutdown.");
        }
    }

    //=====================================================================================
    // Reads
    //=====================================================================================

    pub async fn snapshot(&self) -> ProjectData {
        self.shared.state.lock().await.data.clone()
    }

    pub async fn status(&self) -> SyncStatus {
        self.shared.state.lock().await.status.clone()
    }

    //=====================================================================================
    // Commands
    //=====================================================================================

    /// Asks the generator for a new trivia item and prepends it as a
    /// scheduled post.
    pub async fn generate_trivia(&self) -> PortResult<TriviaPost> {
        let topic = {
            let mut state = self.shared.state.lock().await;
            state.status.is_syncing = true;
            state.data.config.topic.clone()
        };
        let topic = if topic.trim().is_empty() {
            FALLBACK_TOPIC.to_string()
        } else {
            topic
        };

        let result = self.shared.generator.generate_trivia(&topic).await;

        let mut state = self.shared.state.lock().await;
        state.status.is_syncing = false;
        match result {
            Ok(content) => {
                let post = TriviaPost::scheduled(content);
                let mut next = state.data.clone();
                next.posts.insert(0, post.clone());
                self.replace_data(&mut state, next);
                info!("Generated trivia post {}.", post.id);
                Ok(post)
            }
            Err(e) => {
                error!("Failed to generate trivia: {}", e);
                Err(e)
            }
        }
    }

    /// Generates an image for the post and attaches it. Returns `Ok(None)`
    /// when no post has that id.
    pub async fn generate_image(&self, post_id: &str) -> PortResult<Option<TriviaPost>> {
        let description = {
            let mut state = self.shared.state.lock().await;
            let Some(post) = state.data.posts.iter().find(|p| p.id == post_id) else {
                return Ok(None);
            };
            let description = post.image_description.clone();
            state.status.generating_image = Some(post_id.to_string());
            description
        };

        let result = self
            .shared
            .generator
            .generate_image_from_description(&description)
            .await;

        let mut state = self.shared.state.lock().await;
        state.status.generating_image = None;
        match result {
            Ok(image_url) => {
                let mut next = state.data.clone();
                let mut updated = None;
                for post in next.posts.iter_mut().filter(|p| p.id == post_id) {
                    post.image_url = Some(image_url.clone());
                    updated = Some(post.clone());
                }
                self.replace_data(&mut state, next);
                Ok(updated)
            }
            Err(e) => {
                error!("Failed to generate image for post {}: {}", post_id, e);
                Err(e)
            }
        }
    }

    /// Sets the status of the post with the given id, if any.
    pub async fn update_post_status(&self, post_id: &str, status: PostStatus) -> Option<TriviaPost> {
        let mut state = self.shared.state.lock().await;
        let mut next = state.data.clone();
        let mut updated = None;
        for post in next.posts.iter_mut().filter(|p| p.id == post_id) {
            post.status = status;
            updated = Some(post.clone());
        }
        if updated.is_some() {
            self.replace_data(&mut state, next);
        }
        updated
    }

    pub async fn toggle_connection(&self) -> AgentConfig {
        let mut state = self.shared.state.lock().await;
        let mut next = state.data.clone();
        next.config.fb_connected = !next.config.fb_connected;
        let config = next.config.clone();
        self.replace_data(&mut state, next);
        config
    }

    pub async fn update_config(&self, config: AgentConfig) -> AgentConfig {
        let mut state = self.shared.state.lock().await;
        let mut next = state.data.clone();
        next.config = config.clone();
        self.replace_data(&mut state, next);
        config
    }

    /// Disconnects immediately, or connects after a simulated OAuth round trip.
    pub async fn manage_auth(&self) -> AgentConfig {
        let connected = self.shared.state.lock().await.data.config.fb_connected;
        if !connected {
            info!("Simulating Facebook authorization.");
            tokio::time::sleep(SIMULATED_AUTH_DELAY).await;
        }
        self.toggle_connection().await
    }
}
