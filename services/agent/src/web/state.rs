//! services/agent/src/web/state.rs
//!
//! Defines the application state shared by all handlers.

use crate::config::Config;
use std::sync::Arc;
use velotrivia_core::SyncController;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: SyncController,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn remote_sync_enabled(&self) -> bool {
        self.config.firebase_db_url.is_some()
    }
}
