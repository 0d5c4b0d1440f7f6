use serde::{Deserialize, Serialize};

/// Error or acknowledgement body most endpoints return.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiMessage {
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.trim().is_empty())
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct IpLookupResponse {
    pub ip: String,
}
