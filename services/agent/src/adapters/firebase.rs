//! services/agent/src/adapters/firebase.rs
//!
//! This module contains the remote store adapter. It keeps the whole project
//! blob as a single JSON document under a Firebase Realtime Database URL and
//! implements the `RemoteStore` port from the `core` crate.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, warn};
use velotrivia_core::domain::ProjectData;
use velotrivia_core::ports::{PortError, PortResult, RemoteStore};

/// Path of the project document below the database root.
pub const DOCUMENT_PATH: &str = "velotrivia.json";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A remote store adapter speaking the Realtime Database REST protocol:
/// `GET` reads the document, `PUT` replaces it.
#[derive(Clone)]
pub struct FirebaseStore {
    client: Client,
    db_url: Option<String>,
}

impl FirebaseStore {
    /// Creates a new `FirebaseStore`. Without a database URL every load misses
    /// and every save is skipped.
    pub fn new(client: Client, db_url: Option<String>) -> Self {
        Self { client, db_url }
    }

    fn document_url(&self) -> Option<String> {
        self.db_url
            .as_ref()
            .map(|base| format!("{}/{}", base, DOCUMENT_PATH))
    }
}

//=========================================================================================
// `RemoteStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl RemoteStore for FirebaseStore {
    async fn save(&self, data: &ProjectData) -> PortResult<()> {
        let Some(url) = self.document_url() else {
            warn!("Firebase DB URL not configured. Saving only to the local cache.");
            return Ok(());
        };

        let response = self
            .client
            .put(&url)
            .json(data)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Firebase sync error: {}", e)))?;

        if !response.status().is_success() {
            return Err(PortError::Unexpected(format!(
                "Firebase rejected the sync with status {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn load(&self) -> Option<ProjectData> {
        let url = self.document_url()?;

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Firebase load error: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("Firebase load returned status {}", response.status());
            return None;
        }

        // An absent document comes back as `null`.
        match response.json::<Option<ProjectData>>().await {
            Ok(data) => data,
            Err(e) => {
                error!("Firebase returned a malformed document: {}", e);
                None
            }
        }
    }
}
