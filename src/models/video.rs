use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::de;

/// A hosted video as returned by `/api/video/:key`. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    #[serde(alias = "id", deserialize_with = "de::u64_lenient")]
    pub video_id: u64,
    #[serde(alias = "url")]
    pub video_url: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default, alias = "fileSize", deserialize_with = "de::opt_f64_lenient")]
    pub file_size: Option<f64>,
    #[serde(default, alias = "uploadDate", deserialize_with = "de::opt_timestamp")]
    pub upload_date: Option<DateTime<Utc>>,
}

/// Registration payload sent to `/api/videos` once the file sits on the CDN.
#[derive(Debug, Clone, Serialize)]
pub struct NewVideo {
    pub short_key: String,
    pub video_url: String,
    pub title: String,
    pub file_size: u64,
    pub user_id: Option<u64>,
}

/// Body returned by the third-party upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// One row of the public catalog. Older catalog feeds use Indonesian keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    #[serde(alias = "short_key")]
    pub id: String,
    #[serde(alias = "Judul")]
    pub title: String,
    #[serde(alias = "Url", alias = "video_url")]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_accepts_player_payload() {
        let video: Video = serde_json::from_str(
            r#"{"video_id": 42, "video_url": "https://cdn.videy.co/abc.mp4", "title": "Sunset", "duration": "01:02"}"#,
        )
        .unwrap();
        assert_eq!(video.video_id, 42);
        assert_eq!(video.duration.as_deref(), Some("01:02"));
        assert!(video.upload_date.is_none());
    }

    #[test]
    fn catalog_entry_accepts_legacy_keys() {
        let entry: CatalogEntry =
            serde_json::from_str(r#"{"id": "a1", "Judul": "Pantai", "Url": "https://x/a1.mp4"}"#).unwrap();
        assert_eq!(entry.title, "Pantai");
        assert_eq!(entry.url, "https://x/a1.mp4");
    }
}
