use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::estimator::estimate_position;

pub const UNKNOWN: &str = "Unknown";

pub fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaybackStatus {
    Playing,
    Paused,
    NotPlaying,
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RemoteCommand {
    PlayToggle,
    Next,
    Prev,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackSnapshot {
    pub album: String,
    pub artist: String,
    pub audio_quality: String,
    pub duration: f64,
    pub cover: String,
    pub isrc: String,
    pub popularity: String,
    pub release_date: String,
    pub title: String,
    pub track_id: String,
}

impl Default for TrackSnapshot {
    fn default() -> Self {
        Self {
            album: String::new(),
            artist: String::new(),
            audio_quality: UNKNOWN.to_string(),
            duration: 0.0,
            cover: String::new(),
            isrc: String::new(),
            popularity: UNKNOWN.to_string(),
            release_date: UNKNOWN.to_string(),
            title: String::new(),
            track_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackStatusPayload {
    #[serde(flatten)]
    pub track: TrackSnapshot,
    pub status: PlaybackStatus,
    pub position_seconds: f64,
    pub position_updated_at: u64,
}

impl TrackStatusPayload {
    pub fn new(
        track: TrackSnapshot,
        status: PlaybackStatus,
        position_seconds: f64,
        now_ms: u64,
    ) -> Self {
        Self {
            track,
            status,
            position_seconds: position_seconds.max(0.0),
            position_updated_at: now_ms,
        }
    }

    // Last-write-wins: a stamp earlier than the held one still replaces it.
    pub fn merge_state(&mut self, status: PlaybackStatus, position_seconds: f64, now_ms: u64) {
        self.status = status;
        self.position_seconds = position_seconds.max(0.0);
        self.position_updated_at = now_ms;
    }

    pub fn extrapolated(&self, now_ms: u64) -> Self {
        let mut out = self.clone();
        out.position_seconds = estimate_position(
            self.position_seconds,
            self.status,
            self.position_updated_at,
            self.track.duration,
            now_ms,
        );
        out
    }
}
