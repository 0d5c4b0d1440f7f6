use crate::error::Result;
use crate::models::User;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const USER_KEY: &str = "user";
pub const TOKEN_KEY: &str = "token";
pub const DOWNLOAD_URL_KEY: &str = "download_video_url";
pub const DOWNLOAD_NAME_KEY: &str = "download_file_name";
pub const PAYMENT_METHOD_SUCCESS_KEY: &str = "paymentMethodSuccess";

/// Client-side key/value state persisted between CLI runs as one JSON object.
pub struct SessionStore {
    path: Option<PathBuf>,
    values: Mutex<Map<String, Value>>,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Mutex::new(Map::new()),
        }
    }

    /// Loads the session file, starting empty when it does not exist yet.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(content) if !content.trim().is_empty() => serde_json::from_str(&content)?,
            Ok(_) => Map::new(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: Some(path),
            values: Mutex::new(values),
        })
    }

    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let serialized = {
            let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
            serde_json::to_string_pretty(&*values)?
        };
        tokio::fs::write(path, serialized).await?;

        tracing::debug!("Session saved to {}", path.display());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        match values.get(key)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), Value::String(value.into()));
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        match values.remove(key)? {
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    /// Reads and clears a one-shot flag.
    pub fn take_flag(&self, key: &str) -> bool {
        self.remove(key).as_deref() == Some("true")
    }

    pub fn user(&self) -> Option<User> {
        let raw = self.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Stored user is unreadable, ignoring it: {}", e);
                None
            }
        }
    }

    pub fn set_user(&self, user: &User) -> Result<()> {
        self.set(USER_KEY, serde_json::to_string(user)?);
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY)
    }

    pub fn clear_user(&self) {
        self.remove(USER_KEY);
        self.remove(TOKEN_KEY);
    }

    pub fn set_download(&self, url: &str, file_name: &str) {
        self.set(DOWNLOAD_URL_KEY, url);
        self.set(DOWNLOAD_NAME_KEY, file_name);
    }

    /// The `(url, file name)` of the last video offered for download.
    pub fn download(&self) -> Option<(String, Option<String>)> {
        let url = self.get(DOWNLOAD_URL_KEY)?;
        Some((url, self.get(DOWNLOAD_NAME_KEY)))
    }
}
