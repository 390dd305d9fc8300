//! services/agent/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the dashboard client and the
//! agent. Domain types from the core crate are mapped into these structs so
//! the OpenAPI document can describe them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use velotrivia_core::{
    AgentConfig, DashboardView, HistoryFilter, Platform, PostStatus, SyncStatus, TriviaPost,
};

//=========================================================================================
// Shared Payloads
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PostStatusBody {
    Scheduled,
    Posted,
    Failed,
}

impl From<PostStatus> for PostStatusBody {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Scheduled => PostStatusBody::Scheduled,
            PostStatus::Posted => PostStatusBody::Posted,
            PostStatus::Failed => PostStatusBody::Failed,
        }
    }
}

impl From<PostStatusBody> for PostStatus {
    fn from(status: PostStatusBody) -> Self {
        match status {
            PostStatusBody::Scheduled => PostStatus::Scheduled,
            PostStatusBody::Posted => PostStatus::Posted,
            PostStatusBody::Failed => PostStatus::Failed,
        }
    }
}

/// A trivia post as rendered on a card.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Creation date formatted for display, e.g. "March 4, 2025".
    pub display_date: String,
    pub question: String,
    pub answer: String,
    pub fun_fact: String,
    pub image_description: String,
    pub hashtags: Vec<String>,
    pub status: PostStatusBody,
    pub platform: String,
    pub image_url: Option<String>,
}

impl From<TriviaPost> for PostResponse {
    fn from(post: TriviaPost) -> Self {
        let platform = match post.platform {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
        };
        Self {
            display_date: post.display_date(),
            id: post.id,
            timestamp: post.timestamp,
            question: post.question,
            answer: post.answer,
            fun_fact: post.fun_fact,
            image_description: post.image_description,
            hashtags: post.hashtags,
            status: post.status.into(),
            platform: platform.to_string(),
            image_url: post.image_url,
        }
    }
}

/// The agent settings edited on the settings screen.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigBody {
    pub auto_post_enabled: bool,
    /// Daily post time as HH:MM.
    pub post_time: String,
    pub topic: String,
    pub group_name: String,
    pub fb_connected: bool,
}

impl From<AgentConfig> for ConfigBody {
    fn from(config: AgentConfig) -> Self {
        Self {
            auto_post_enabled: config.auto_post_enabled,
            post_time: config.post_time,
            topic: config.topic,
            group_name: config.group_name,
            fb_connected: config.fb_connected,
        }
    }
}

impl From<ConfigBody> for AgentConfig {
    fn from(body: ConfigBody) -> Self {
        Self {
            auto_post_enabled: body.auto_post_enabled,
            post_time: body.post_time,
            topic: body.topic,
            group_name: body.group_name,
            fb_connected: body.fb_connected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub is_loading: bool,
    pub is_syncing: bool,
    pub generating_image: Option<String>,
    /// False when no document store is configured and only the local cache is written.
    pub remote_sync_enabled: bool,
}

impl StatusResponse {
    pub fn new(status: SyncStatus, remote_sync_enabled: bool) -> Self {
        Self {
            is_loading: status.is_loading,
            is_syncing: status.is_syncing,
            generating_image: status.generating_image,
            remote_sync_enabled,
        }
    }
}

//=========================================================================================
// View Payloads
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub scheduled_post: Option<PostResponse>,
    pub total_posts: usize,
    pub config: ConfigBody,
    pub status: StatusResponse,
}

impl DashboardResponse {
    pub fn new(view: DashboardView, remote_sync_enabled: bool) -> Self {
        Self {
            scheduled_post: view.scheduled_post.map(PostResponse::from),
            total_posts: view.total_posts,
            config: view.config.into(),
            status: StatusResponse::new(view.status, remote_sync_enabled),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// One of `all`, `posted` or `failed`. Defaults to `all`.
    #[param(value_type = Option<String>)]
    pub filter: Option<HistoryFilter>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    pub posts: Vec<PostResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Either `posted` or `failed`.
    pub status: PostStatusBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub title: String,
    pub text: String,
}
