//! crates/velotrivia_core/src/domain.rs
//!
//! Defines the core data structures for the trivia agent.
//! Field names follow the camelCase layout of the persisted JSON blob, so the
//! same types are used for the remote document and the local cache entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_POST_TIME: &str = "09:00";
pub const DEFAULT_TOPIC: &str = "Pro Cycling and Bicycle History";
pub const DEFAULT_GROUP_NAME: &str = "Global Cycling Enthusiasts";

/// The singleton agent configuration edited from the settings view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub auto_post_enabled: bool,
    /// Daily post time as `HH:MM`.
    pub post_time: String,
    pub topic: String,
    pub group_name: String,
    pub fb_connected: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            auto_post_enabled: true,
            post_time: DEFAULT_POST_TIME.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            group_name: DEFAULT_GROUP_NAME.to_string(),
            fb_connected: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Scheduled,
    Posted,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
}

/// The structured trivia returned by the content generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriviaContent {
    pub question: String,
    pub answer: String,
    pub fun_fact: String,
    pub image_description: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

/// A single generated trivia post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriviaPost {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub answer: String,
    pub fun_fact: String,
    pub image_description: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    pub status: PostStatus,
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl TriviaPost {
    /// Wraps freshly generated content into a scheduled Facebook post.
    pub fn scheduled(content: TriviaContent) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            timestamp: Utc::now(),
            question: content.question,
            answer: content.answer,
            fun_fact: content.fun_fact,
            image_description: content.image_description,
            hashtags: content.hashtags,
            status: PostStatus::Scheduled,
            platform: Platform::Facebook,
            image_url: None,
        }
    }

    /// The text copied to the clipboard or handed to a share sheet.
    pub fn share_text(&self) -> String {
        let tags = self
            .hashtags
            .iter()
            .map(|tag| format!("#{}", tag))
            .collect::<Vec<_>>()
            .join(" ");

        format!(
            "🚲 VeloTrivia Time!\n\n❓ Question: {}\n✅ Answer: {}\n\n✨ Fun Fact: {}\n\n#VeloTrivia {}",
            self.question, self.answer, self.fun_fact, tags
        )
    }

    /// Creation date as shown on a card, e.g. `March 4, 2025`.
    pub fn display_date(&self) -> String {
        self.timestamp.format("%B %-d, %Y").to_string()
    }
}

/// The persisted aggregate. This is the unit of load and save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectData {
    pub config: AgentConfig,
    // Document stores drop empty arrays, so a missing field means no posts.
    #[serde(default)]
    pub posts: Vec<TriviaPost>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_post() -> TriviaPost {
        TriviaPost {
            id: "abc123".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap(),
            question: "Who won the first Tour de France?".to_string(),
            answer: "Maurice Garin".to_string(),
            fun_fact: "It was 1903.".to_string(),
            image_description: "A 1903 peloton".to_string(),
            hashtags: vec!["TDF".to_string(), "history".to_string()],
            status: PostStatus::Scheduled,
            platform: Platform::Facebook,
            image_url: None,
        }
    }

    #[test]
    fn test_blob_uses_camel_case_fields() {
        let data = ProjectData {
            config: AgentConfig::default(),
            posts: vec![sample_post()],
        };
        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(json["config"]["autoPostEnabled"], true);
        assert_eq!(json["config"]["postTime"], "09:00");
        assert_eq!(json["config"]["fbConnected"], false);
        assert_eq!(json["posts"][0]["funFact"], "It was 1903.");
        assert_eq!(json["posts"][0]["status"], "scheduled");
        assert_eq!(json["posts"][0]["platform"], "facebook");
        assert!(json["posts"][0].get("imageUrl").is_none());
    }

    #[test]
    fn test_blob_without_posts_reads_as_empty() {
        let json = r#"{"config":{"autoPostEnabled":false,"postTime":"07:30","topic":"Gravel","groupName":"Club","fbConnected":true}}"#;
        let data: ProjectData = serde_json::from_str(json).unwrap();

        assert!(data.posts.is_empty());
        assert_eq!(data.config.post_time, "07:30");
        assert!(data.config.fb_connected);
    }

    #[test]
    fn test_scheduled_post_from_content() {
        let content = TriviaContent {
            question: "Q".to_string(),
            answer: "A".to_string(),
            fun_fact: "F".to_string(),
            image_description: "D".to_string(),
            hashtags: vec!["tdf".to_string()],
        };
        let first = TriviaPost::scheduled(content.clone());
        let second = TriviaPost::scheduled(content);

        assert_eq!(first.status, PostStatus::Scheduled);
        assert_eq!(first.platform, Platform::Facebook);
        assert_eq!(first.hashtags, vec!["tdf".to_string()]);
        assert!(first.image_url.is_none());
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_share_text_lists_hashtags() {
        let text = sample_post().share_text();

        assert!(text.starts_with("🚲 VeloTrivia Time!"));
        assert!(text.contains("❓ Question: Who won the first Tour de France?"));
        assert!(text.contains("✅ Answer: Maurice Garin"));
        assert!(text.ends_with("#VeloTrivia #TDF #history"));
    }

    #[test]
    fn test_display_date() {
        assert_eq!(sample_post().display_date(), "March 4, 2025");
    }
}
