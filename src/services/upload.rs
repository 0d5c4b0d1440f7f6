use crate::client::api::error_from_response;
use crate::client::ApiClient;
use crate::error::{Result, VideyError};
use crate::models::{NewVideo, UploadedFile};
use crate::services::shortlink::{generate_short_key, short_link};
use crate::services::SessionStore;
use futures::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use std::path::Path;
use std::sync::atomic::{AtomicI16, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub sent: u64,
    pub total: u64,
    pub percent: u8,
}

pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub upload_url: String,
    pub cdn_url: String,
    pub public_base_url: String,
    pub max_bytes: u64,
    pub chunk_size: usize,
}

#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub short_key: String,
    pub short_link: String,
    pub video_url: String,
    pub file_name: String,
    pub file_size: u64,
}

/// Reports each distinct percentage once, in increasing order, starting at 0
/// and ending at 100.
struct ProgressReporter {
    total: u64,
    sent: AtomicU64,
    last_percent: AtomicI16,
    callback: ProgressCallback,
}

impl ProgressReporter {
    fn new(total: u64, callback: ProgressCallback) -> Self {
        Self {
            total,
            sent: AtomicU64::new(0),
            last_percent: AtomicI16::new(-1),
            callback,
        }
    }

    fn start(&self) {
        self.emit(0, 0);
    }

    fn advance(&self, bytes: usize) {
        let sent = self.sent.fetch_add(bytes as u64, Ordering::SeqCst) + bytes as u64;
        let percent = if self.total == 0 {
            100
        } else {
            (sent.min(self.total) * 100 / self.total) as u8
        };
        self.emit(sent, percent);
    }

    fn finish(&self) {
        self.emit(self.total, 100);
    }

    fn emit(&self, sent: u64, percent: u8) {
        let previous = self.last_percent.fetch_max(percent as i16, Ordering::SeqCst);
        if (percent as i16) > previous {
            (self.callback)(UploadProgress {
                sent,
                total: self.total,
                percent,
            });
        }
    }
}

pub struct Uploader {
    http: Client,
    metadata: ApiClient,
    settings: UploadSettings,
}

impl Uploader {
    pub fn new(http: Client, metadata: ApiClient, settings: UploadSettings) -> Self {
        Self {
            http,
            metadata,
            settings,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.settings.max_bytes
    }

    /// Rejects empty and oversized files before anything touches the network.
    pub fn check_size(&self, file_name: &str, size: u64) -> Result<()> {
        if size == 0 {
            return Err(VideyError::EmptyFile(file_name.to_string()));
        }
        if size > self.settings.max_bytes {
            tracing::warn!(
                "File too large: {:.2}MB (max: {}MB)",
                size as f64 / 1024.0 / 1024.0,
                self.settings.max_bytes / 1024 / 1024
            );
            return Err(VideyError::FileTooLarge {
                size,
                limit: self.settings.max_bytes,
            });
        }
        Ok(())
    }

    /// Streams the file to the CDN in `chunk_size` reads, registers it with
    /// the metadata API and returns the short link. The download keys are
    /// remembered in `session`.
    pub async fn upload(
        &self,
        path: &Path,
        title: Option<String>,
        session: &SessionStore,
        on_progress: ProgressCallback,
    ) -> Result<UploadReceipt> {
        let meta = tokio::fs::metadata(path).await?;
        if !meta.is_file() {
            return Err(VideyError::Validation(format!("{} is not a file", path.display())));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string());
        let file_size = meta.len();
        self.check_size(&file_name, file_size)?;

        tracing::info!("Uploading {} ({} bytes)", file_name, file_size);
        let file = File::open(path).await?;
        let uploaded = self
            .send_to_cdn(file, file_size, &file_name, on_progress)
            .await?;
        let video_url = format!("{}/{}.mp4", self.settings.cdn_url, uploaded.id);

        let short_key = generate_short_key(&mut rand::rng());
        let registration = NewVideo {
            short_key: short_key.clone(),
            video_url: video_url.clone(),
            title: title.unwrap_or_else(|| file_name.clone()),
            file_size,
            user_id: session.user().map(|u| u.user_id),
        };
        self.metadata.post_ack("/api/videos", &registration).await?;

        session.set_download(&video_url, &file_name);

        let receipt = UploadReceipt {
            short_link: short_link(&self.settings.public_base_url, &short_key),
            short_key,
            video_url,
            file_name,
            file_size,
        };

        tracing::info!("Upload complete: {}", receipt.short_link);
        Ok(receipt)
    }

    async fn send_to_cdn(
        &self,
        file: File,
        total: u64,
        file_name: &str,
        on_progress: ProgressCallback,
    ) -> Result<UploadedFile> {
        let reporter = Arc::new(ProgressReporter::new(total, on_progress));
        reporter.start();

        let body_reporter = reporter.clone();
        let stream = ReaderStream::with_capacity(file, self.settings.chunk_size)
            .inspect_ok(move |chunk| body_reporter.advance(chunk.len()));

        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/api/upload", self.settings.upload_url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let uploaded: UploadedFile = response.json().await?;
        reporter.finish();

        tracing::debug!("CDN accepted upload as {}", uploaded.id);
        Ok(uploaded)
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "3gp" => "video/3gpp",
        _ => "application/octet-stream",
    }
}
