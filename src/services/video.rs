use crate::client::ApiClient;
use crate::error::{Result, VideyError};
use crate::models::Video;
use crate::services::VideoCache;

/// File name offered for download: the last path segment of `video_url`.
pub fn download_file_name(video_url: &str) -> String {
    video_url
        .split(['?', '#'])
        .next()
        .and_then(|path| path.trim_end_matches('/').rsplit('/').next())
        .filter(|name| !name.is_empty() && !name.contains(':'))
        .unwrap_or("video.mp4")
        .to_string()
}

/// Looks up video metadata by short key, through the memory cache.
#[derive(Clone)]
pub struct VideoService {
    api: ApiClient,
    cache: VideoCache,
}

impl VideoService {
    pub fn new(api: ApiClient, cache: VideoCache) -> Self {
        Self { api, cache }
    }

    pub async fn get(&self, key: &str) -> Result<Video> {
        if let Some(video) = self.cache.get(key).await {
            return Ok(video);
        }

        let video: Video = self
            .api
            .get(&format!("/api/video/{}", key))
            .await
            .map_err(|e| match e {
                VideyError::Api { status, message } => {
                    tracing::debug!("Video lookup for {} failed ({}): {}", key, status, message);
                    VideyError::NotFound("Video not found.".to_string())
                }
                other => other,
            })?;

        self.cache.insert(key, video.clone()).await;

        tracing::info!("Loaded video {} ({})", video.video_id, video.title);
        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_name_is_last_url_segment() {
        assert_eq!(download_file_name("https://cdn.videy.co/XyZ123.mp4"), "XyZ123.mp4");
        assert_eq!(download_file_name("https://cdn.videy.co/a/b.mp4?token=1"), "b.mp4");
        assert_eq!(download_file_name("https://cdn.videy.co/"), "video.mp4");
        assert_eq!(download_file_name(""), "video.mp4");
    }
}
