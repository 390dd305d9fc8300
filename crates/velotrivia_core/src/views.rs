//! crates/velotrivia_core/src/views.rs
//!
//! Read-only projections of the project state used by the dashboard and
//! history screens.

use crate::domain::{AgentConfig, PostStatus, ProjectData, TriviaPost};
use crate::sync::SyncStatus;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct DashboardView {
    /// The first scheduled post found. Further scheduled posts are not shown.
    pub scheduled_post: Option<TriviaPost>,
    pub total_posts: usize,
    pub config: AgentConfig,
    pub status: SyncStatus,
}

impl DashboardView {
    pub fn build(data: &ProjectData, status: SyncStatus) -> Self {
        Self {
            scheduled_post: data
                .posts
                .iter()
                .find(|p| p.status == PostStatus::Scheduled)
                .cloned(),
            total_posts: data.posts.len(),
            config: data.config.clone(),
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryFilter {
    /// Everything that has left the schedule.
    #[default]
    All,
    Posted,
    Failed,
}

impl HistoryFilter {
    pub fn matches(self, post: &TriviaPost) -> bool {
        match self {
            HistoryFilter::All => post.status != PostStatus::Scheduled,
            HistoryFilter::Posted => post.status == PostStatus::Posted,
            HistoryFilter::Failed => post.status == PostStatus::Failed,
        }
    }

    pub fn apply(self, posts: &[TriviaPost]) -> Vec<TriviaPost> {
        posts.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TriviaContent;

    fn post_with(status: PostStatus, question: &str) -> TriviaPost {
        let mut post = TriviaPost::scheduled(TriviaContent {
            question: question.to_string(),
            answer: "A".to_string(),
            fun_fact: "F".to_string(),
            image_description: "D".to_string(),
            hashtags: vec![],
        });
        post.status = status;
        post
    }

    #[test]
    fn test_dashboard_shows_first_scheduled_post() {
        let data = ProjectData {
            config: AgentConfig::default(),
            posts: vec![
                post_with(PostStatus::Posted, "old"),
                post_with(PostStatus::Scheduled, "first"),
                post_with(PostStatus::Scheduled, "second"),
            ],
        };
        let view = DashboardView::build(&data, SyncStatus::default());

        assert_eq!(view.total_posts, 3);
        assert_eq!(view.scheduled_post.unwrap().question, "first");
    }

    #[test]
    fn test_dashboard_without_scheduled_post() {
        let data = ProjectData {
            config: AgentConfig::default(),
            posts: vec![post_with(PostStatus::Failed, "discarded")],
        };
        assert!(DashboardView::build(&data, SyncStatus::default())
            .scheduled_post
            .is_none());
    }

    #[test]
    fn test_history_filters() {
        let posts = vec![
            post_with(PostStatus::Scheduled, "s"),
            post_with(PostStatus::Posted, "p"),
            post_with(PostStatus::Failed, "f"),
        ];

        let all: Vec<_> = HistoryFilter::All.apply(&posts).into_iter().map(|p| p.question).collect();
        assert_eq!(all, vec!["p", "f"]);

        let posted = HistoryFilter::Posted.apply(&posts);
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].question, "p");

        let failed = HistoryFilter::Failed.apply(&posts);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].question, "f");
    }
}
