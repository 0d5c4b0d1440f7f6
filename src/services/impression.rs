use crate::client::{ApiClient, IpLookup};
use crate::error::{Result, VideyError};
use crate::models::{Impression, ImpressionKind, Video};
use crate::services::VideoService;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use uuid::Uuid;

pub const UNKNOWN_IP: &str = "unknown";

/// How impression kinds share the once-per-page-load guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    /// One guard for every kind: the first recorded impression of any kind
    /// suppresses all later ones.
    #[default]
    Shared,
    /// One guard per kind: a `play` and a `full_screen` can each be recorded once.
    PerKind,
}

impl FromStr for DedupPolicy {
    type Err = VideyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shared" => Ok(DedupPolicy::Shared),
            "per-kind" | "per_kind" | "perkind" => Ok(DedupPolicy::PerKind),
            other => Err(VideyError::Config(format!("Unknown dedup policy: {}", other))),
        }
    }
}

impl fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupPolicy::Shared => f.write_str("shared"),
            DedupPolicy::PerKind => f.write_str("per-kind"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Idle,
    InFlight,
    Recorded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpressionOutcome {
    /// The impression was posted and accepted.
    Sent,
    /// An impression guarding the same slot is in flight or already recorded.
    Suppressed,
    /// Video id or viewer IP missing, or the event does not count.
    Skipped,
    /// The post failed; the slot is free again for the next event.
    Failed,
}

/// Claim/complete state machine behind the dedup. A slot moves
/// `Idle -> InFlight -> Recorded`, or back to `Idle` when the post fails.
#[derive(Debug)]
pub struct ImpressionGuard {
    policy: DedupPolicy,
    slots: Mutex<[SlotState; 2]>,
}

impl ImpressionGuard {
    pub fn new(policy: DedupPolicy) -> Self {
        Self {
            policy,
            slots: Mutex::new([SlotState::Idle; 2]),
        }
    }

    fn slot(&self, kind: ImpressionKind) -> usize {
        match (self.policy, kind) {
            (DedupPolicy::Shared, _) => 0,
            (DedupPolicy::PerKind, ImpressionKind::Play) => 0,
            (DedupPolicy::PerKind, ImpressionKind::FullScreen) => 1,
        }
    }

    /// Returns true when the caller now owns the slot and must send.
    pub fn try_claim(&self, kind: ImpressionKind) -> bool {
        let slot = self.slot(kind);
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if slots[slot] == SlotState::Idle {
            slots[slot] = SlotState::InFlight;
            true
        } else {
            false
        }
    }

    pub fn complete(&self, kind: ImpressionKind, accepted: bool) {
        let slot = self.slot(kind);
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots[slot] = if accepted {
            SlotState::Recorded
        } else {
            SlotState::Idle
        };
    }

    pub fn is_recorded(&self, kind: ImpressionKind) -> bool {
        let slot = self.slot(kind);
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots[slot] == SlotState::Recorded
    }
}

pub struct ImpressionTracker {
    api: ApiClient,
    guard: ImpressionGuard,
}

impl ImpressionTracker {
    pub fn new(api: ApiClient, policy: DedupPolicy) -> Self {
        Self {
            api,
            guard: ImpressionGuard::new(policy),
        }
    }

    pub fn guard(&self) -> &ImpressionGuard {
        &self.guard
    }

    /// Posts one impression unless the guard says this page load already has
    /// one. Never returns an error: failures are logged and reported in the
    /// outcome.
    pub async fn record(
        &self,
        video_id: Option<u64>,
        viewer_ip: Option<&str>,
        kind: ImpressionKind,
    ) -> ImpressionOutcome {
        let (Some(video_id), Some(viewer_ip)) = (video_id.filter(|id| *id != 0), viewer_ip) else {
            tracing::debug!("Skipping {} impression: video or viewer IP not ready", kind);
            return ImpressionOutcome::Skipped;
        };

        if !self.guard.try_claim(kind) {
            tracing::debug!("Impression ({}) already recorded for this page load", kind);
            return ImpressionOutcome::Suppressed;
        }

        let impression = Impression {
            video_id,
            viewer_ip: viewer_ip.to_string(),
            kind,
        };

        match self.api.post_ack("/api/impression", &impression).await {
            Ok(()) => {
                self.guard.complete(kind, true);
                tracing::info!("Impression ({}) added for video {}", kind, video_id);
                ImpressionOutcome::Sent
            }
            Err(e) => {
                self.guard.complete(kind, false);
                tracing::warn!("Failed to add impression ({}): {}", kind, e);
                ImpressionOutcome::Failed
            }
        }
    }
}

/// One page load of the player: the video being watched, the viewer's IP
/// and the impression guard scoped to this load.
pub struct PlaybackSession {
    id: Uuid,
    video: Video,
    viewer_ip: Option<String>,
    tracker: ImpressionTracker,
}

impl PlaybackSession {
    /// Fetches the video and resolves the viewer IP concurrently. An IP lookup
    /// failure degrades to `"unknown"`; a missing video fails the load.
    pub async fn open(
        videos: &VideoService,
        ip_lookup: &dyn IpLookup,
        impressions_api: ApiClient,
        key: &str,
        policy: DedupPolicy,
    ) -> Result<Self> {
        let (video, ip) = tokio::join!(videos.get(key), ip_lookup.lookup());

        let viewer_ip = ip.unwrap_or_else(|e| {
            tracing::warn!("Error fetching IP address: {}", e);
            UNKNOWN_IP.to_string()
        });
        let video = video?;

        let session = Self::new(video, Some(viewer_ip), impressions_api, policy);
        tracing::info!(
            session_id = %session.id,
            video_id = session.video.video_id,
            "Playback session opened"
        );
        Ok(session)
    }

    pub fn new(video: Video, viewer_ip: Option<String>, impressions_api: ApiClient, policy: DedupPolicy) -> Self {
        Self {
            id: Uuid::new_v4(),
            video,
            viewer_ip,
            tracker: ImpressionTracker::new(impressions_api, policy),
        }
    }

    pub fn video(&self) -> &Video {
        &self.video
    }

    pub fn viewer_ip(&self) -> Option<&str> {
        self.viewer_ip.as_deref()
    }

    pub async fn on_play(&self) -> ImpressionOutcome {
        self.record(ImpressionKind::Play).await
    }

    /// Only entering full screen counts; leaving it is ignored.
    pub async fn on_fullscreen_change(&self, entered: bool) -> ImpressionOutcome {
        if !entered {
            return ImpressionOutcome::Skipped;
        }
        self.record(ImpressionKind::FullScreen).await
    }

    pub async fn record(&self, kind: ImpressionKind) -> ImpressionOutcome {
        self.tracker
            .record(Some(self.video.video_id), self.viewer_ip.as_deref(), kind)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_guard_covers_both_kinds() {
        let guard = ImpressionGuard::new(DedupPolicy::Shared);
        assert!(guard.try_claim(ImpressionKind::Play));
        assert!(!guard.try_claim(ImpressionKind::FullScreen));
        guard.complete(ImpressionKind::Play, true);
        assert!(guard.is_recorded(ImpressionKind::FullScreen));
        assert!(!guard.try_claim(ImpressionKind::Play));
    }

    #[test]
    fn per_kind_guard_is_independent() {
        let guard = ImpressionGuard::new(DedupPolicy::PerKind);
        assert!(guard.try_claim(ImpressionKind::Play));
        assert!(guard.try_claim(ImpressionKind::FullScreen));
        assert!(!guard.try_claim(ImpressionKind::Play));
    }

    #[test]
    fn failed_post_releases_slot() {
        let guard = ImpressionGuard::new(DedupPolicy::Shared);
        assert!(guard.try_claim(ImpressionKind::Play));
        guard.complete(ImpressionKind::Play, false);
        assert!(!guard.is_recorded(ImpressionKind::Play));
        assert!(guard.try_claim(ImpressionKind::Play));
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("shared".parse::<DedupPolicy>().unwrap(), DedupPolicy::Shared);
        assert_eq!("Per-Kind".parse::<DedupPolicy>().unwrap(), DedupPolicy::PerKind);
        assert!("never".parse::<DedupPolicy>().is_err());
    }
}
