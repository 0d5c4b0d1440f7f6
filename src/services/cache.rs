use crate::models::Video;
use moka::future::Cache;
use std::time::Duration;

/// In-memory cache of video metadata keyed by short key.
#[derive(Clone)]
pub struct VideoCache {
    memory: Cache<String, Video>,
}

impl VideoCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let memory = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { memory }
    }

    pub async fn get(&self, key: &str) -> Option<Video> {
        let cached = self.memory.get(key).await;
        if cached.is_some() {
            tracing::debug!("Memory cache hit for video: {}", key);
        }
        cached
    }

    pub async fn insert(&self, key: &str, video: Video) {
        self.memory.insert(key.to_string(), video).await;
    }
}

impl Default for VideoCache {
    fn default() -> Self {
        Self::new(1000, Duration::from_secs(60))
    }
}
