use agent_lib::adapters::SqliteCache;
use velotrivia_core::LocalCache;

async fn memory_cache() -> SqliteCache {
    let cache = SqliteCache::connect("sqlite::memory:").await.unwrap();
    cache.run_migrations().await.unwrap();
    cache
}

#[tokio::test]
async fn test_missing_key_reads_as_none() {
    let cache = memory_cache().await;
    assert_eq!(cache.get_item("velotrivia_posts").await.unwrap(), None);
}

#[tokio::test]
async fn test_set_then_overwrite() {
    let cache = memory_cache().await;

    cache.set_item("velotrivia_config", "{\"a\":1}").await.unwrap();
    assert_eq!(
        cache.get_item("velotrivia_config").await.unwrap().as_deref(),
        Some("{\"a\":1}")
    );

    cache.set_item("velotrivia_config", "{\"a\":2}").await.unwrap();
    assert_eq!(
        cache.get_item("velotrivia_config").await.unwrap().as_deref(),
        Some("{\"a\":2}")
    );
}

#[tokio::test]
async fn test_keys_are_independent() {
    let cache = memory_cache().await;

    cache.set_item("velotrivia_config", "config").await.unwrap();
    cache.set_item("velotrivia_posts", "[]").await.unwrap();

    assert_eq!(cache.get_item("velotrivia_config").await.unwrap().as_deref(), Some("config"));
    assert_eq!(cache.get_item("velotrivia_posts").await.unwrap().as_deref(), Some("[]"));
}
