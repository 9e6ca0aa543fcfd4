use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use nowplay_bridge_core::PlaybackStatus;

pub mod scripted;
pub mod watch;

pub use watch::{liveliness_probe, watch_source, SourceWatcher};

#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub id: String,
    pub duration_seconds: Option<f64>,
    pub best_quality: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackContext {
    pub status: PlaybackStatus,
    pub position_seconds: f64,
    pub duration_seconds: Option<f64>,
    pub quality: Option<String>,
}

impl PlaybackContext {
    pub fn unknown() -> Self {
        Self {
            status: PlaybackStatus::Unknown,
            position_seconds: 0.0,
            duration_seconds: None,
            quality: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    TrackChanged(MediaItem),
    StateChanged(PlaybackStatus),
}

#[async_trait]
pub trait MediaSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn current_item(&self) -> Result<Option<MediaItem>>;
    async fn playback(&self) -> Result<PlaybackContext>;
    async fn title(&self, item: &MediaItem) -> Result<String>;
    async fn artist(&self, item: &MediaItem) -> Result<String>;
    async fn album(&self, item: &MediaItem) -> Result<String>;
    async fn cover_url(&self, item: &MediaItem, size: u32) -> Result<String>;
    async fn audio_quality(&self, item: &MediaItem, preferred: Option<&str>) -> Result<String>;
    async fn release_date(&self, item: &MediaItem) -> Result<String>;
    async fn isrc(&self, item: &MediaItem) -> Result<String>;
    async fn popularity(&self, item: &MediaItem) -> Result<String>;
}

#[async_trait]
pub trait ControlSurface: Send + Sync {
    fn name(&self) -> &'static str;
    async fn activate(&self, selector: &str) -> Result<bool>;
}

pub struct NullSource;

#[async_trait]
impl MediaSource for NullSource {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn current_item(&self) -> Result<Option<MediaItem>> {
        Ok(None)
    }

    async fn playback(&self) -> Result<PlaybackContext> {
        Ok(PlaybackContext::unknown())
    }

    async fn title(&self, _item: &MediaItem) -> Result<String> {
        anyhow::bail!("no media source attached")
    }

    async fn artist(&self, _item: &MediaItem) -> Result<String> {
        anyhow::bail!("no media source attached")
    }

    async fn album(&self, _item: &MediaItem) -> Result<String> {
        anyhow::bail!("no media source attached")
    }

    async fn cover_url(&self, _item: &MediaItem, _size: u32) -> Result<String> {
        anyhow::bail!("no media source attached")
    }

    async fn audio_quality(&self, _item: &MediaItem, _preferred: Option<&str>) -> Result<String> {
        anyhow::bail!("no media source attached")
    }

    async fn release_date(&self, _item: &MediaItem) -> Result<String> {
        anyhow::bail!("no media source attached")
    }

    async fn isrc(&self, _item: &MediaItem) -> Result<String> {
        anyhow::bail!("no media source attached")
    }

    async fn popularity(&self, _item: &MediaItem) -> Result<String> {
        anyhow::bail!("no media source attached")
    }
}

pub struct NullSurface;

#[async_trait]
impl ControlSurface for NullSurface {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn activate(&self, _selector: &str) -> Result<bool> {
        Ok(false)
    }
}

pub fn build_media_source(priority: &[String]) -> Arc<dyn MediaSource> {
    for item in priority {
        let source = match item.as_str() {
            "mpris" => platform::mpris_source(),
            "windows" => platform::windows_source(),
            _ => None,
        };
        if let Some(source) = source {
            return source;
        }
    }
    Arc::new(NullSource)
}

pub fn build_control_surface(priority: &[String]) -> Arc<dyn ControlSurface> {
    for item in priority {
        let surface = match item.as_str() {
            "mpris" => platform::mpris_controls(),
            "windows" => platform::windows_controls(),
            _ => None,
        };
        if let Some(surface) = surface {
            return surface;
        }
    }
    Arc::new(NullSurface)
}

mod platform {
    use std::sync::Arc;

    use super::{ControlSurface, MediaSource};

    #[cfg(target_os = "linux")]
    pub fn mpris_source() -> Option<Arc<dyn MediaSource>> {
        Some(Arc::new(crate::mpris::MprisSource::new()))
    }

    #[cfg(not(target_os = "linux"))]
    pub fn mpris_source() -> Option<Arc<dyn MediaSource>> {
        None
    }

    #[cfg(target_os = "linux")]
    pub fn mpris_controls() -> Option<Arc<dyn ControlSurface>> {
        Some(Arc::new(crate::mpris::MprisControls::new()))
    }

    #[cfg(not(target_os = "linux"))]
    pub fn mpris_controls() -> Option<Arc<dyn ControlSurface>> {
        None
    }

    #[cfg(target_os = "windows")]
    pub fn windows_source() -> Option<Arc<dyn MediaSource>> {
        Some(Arc::new(crate::windows::GsmtcSource::new()))
    }

    #[cfg(not(target_os = "windows"))]
    pub fn windows_source() -> Option<Arc<dyn MediaSource>> {
        None
    }

    #[cfg(target_os = "windows")]
    pub fn windows_controls() -> Option<Arc<dyn ControlSurface>> {
        Some(Arc::new(crate::windows::GsmtcControls::new()))
    }

    #[cfg(not(target_os = "windows"))]
    pub fn windows_controls() -> Option<Arc<dyn ControlSurface>> {
        None
    }
}

#[cfg(target_os = "linux")]
mod mpris;
#[cfg(target_os = "windows")]
mod windows;
