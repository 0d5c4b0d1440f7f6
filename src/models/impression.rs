use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpressionKind {
    Play,
    FullScreen,
}

impl ImpressionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpressionKind::Play => "play",
            ImpressionKind::FullScreen => "full_screen",
        }
    }
}

impl fmt::Display for ImpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Impression {
    #[serde(rename = "videoId")]
    pub video_id: u64,
    #[serde(rename = "userIp")]
    pub viewer_ip: String,
    #[serde(rename = "type")]
    pub kind: ImpressionKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_wire_names() {
        let impression = Impression {
            video_id: 7,
            viewer_ip: "203.0.113.9".to_string(),
            kind: ImpressionKind::FullScreen,
        };
        assert_eq!(
            serde_json::to_value(&impression).unwrap(),
            json!({"videoId": 7, "userIp": "203.0.113.9", "type": "full_screen"})
        );
    }
}
