pub mod domain;
pub mod ports;
pub mod sync;
pub mod views;

pub use domain::{AgentConfig, Platform, PostStatus, ProjectData, TriviaContent, TriviaPost};
pub use ports::{ContentGenerator, LocalCache, PortError, PortResult, RemoteStore};
pub use sync::{SyncController, SyncStatus, CONFIG_CACHE_KEY, POSTS_CACHE_KEY, SYNC_DEBOUNCE};
pub use views::{DashboardView, HistoryFilter};
