pub mod firebase;
pub mod gemini;
pub mod local_cache;

pub use firebase::FirebaseStore;
pub use gemini::GeminiAdapter;
pub use local_cache::SqliteCache;
