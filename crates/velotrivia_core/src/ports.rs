//! crates/velotrivia_core/src/ports.rs
//!
//! Defines the service contracts (traits) the sync controller depends on.
//! Concrete adapters for the document store, the local cache and the
//! generative-AI service live in the `agent` service crate.

use async_trait::async_trait;
use crate::domain::{ProjectData, TriviaContent};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    /// The upstream answered but withheld the content, e.g. a safety filter.
    #[error("Content rejected: {0}")]
    ContentRejected(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Replaces the remote blob wholesale.
    async fn save(&self, data: &ProjectData) -> PortResult<()>;

    /// Returns `None` when the store is unconfigured, unreachable, answers with
    /// a non-success status, or holds a malformed document.
    async fn load(&self) -> Option<ProjectData>;
}

#[async_trait]
pub trait LocalCache: Send + Sync {
    async fn set_item(&self, key: &str, value: &str) -> PortResult<()>;

    async fn get_item(&self, key: &str) -> PortResult<Option<String>>;
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generates one structured trivia item about `topic`.
    async fn generate_trivia(&self, topic: &str) -> PortResult<TriviaContent>;

    /// Generates an image for the description and returns it as a data URI.
    /// Fails with [`PortError::ContentRejected`] when no image payload comes back.
    async fn generate_image_from_description(&self, description: &str) -> PortResult<String>;
}
