use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use nowplay_bridge_core::PlaybackStatus;
use windows::Media::Control::{
    GlobalSystemMediaTransportControlsSession, GlobalSystemMediaTransportControlsSessionManager,
    GlobalSystemMediaTransportControlsSessionPlaybackStatus,
};

use crate::{ControlSurface, MediaItem, MediaSource, PlaybackContext};

fn current_session() -> Result<Option<GlobalSystemMediaTransportControlsSession>> {
    let manager = GlobalSystemMediaTransportControlsSessionManager::RequestAsync()?.get()?;
    Ok(manager.GetCurrentSession().ok())
}

fn timeline_seconds(duration_100ns: i64) -> Option<f64> {
    if duration_100ns > 0 {
        Some(duration_100ns as f64 / 10_000_000.0)
    } else {
        None
    }
}

#[derive(Default)]
pub struct GsmtcSource;

impl GsmtcSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaSource for GsmtcSource {
    fn name(&self) -> &'static str {
        "windows"
    }

    async fn current_item(&self) -> Result<Option<MediaItem>> {
        let session = match current_session()? {
            Some(s) => s,
            None => return Ok(None),
        };

        let props = session.TryGetMediaPropertiesAsync()?.get()?;
        let title = props.Title()?.to_string_lossy();
        let artist = props.Artist()?.to_string_lossy();
        if title.is_empty() && artist.is_empty() {
            return Ok(None);
        }

        let timeline = session.GetTimelineProperties()?;
        let duration_100ns = timeline.EndTime()?.Duration - timeline.StartTime()?.Duration;

        Ok(Some(MediaItem {
            id: format!("{artist}:{title}"),
            duration_seconds: timeline_seconds(duration_100ns),
            best_quality: None,
        }))
    }

    async fn playback(&self) -> Result<PlaybackContext> {
        let session =
            current_session()?.ok_or_else(|| anyhow!("no active media session"))?;

        let playback = session.GetPlaybackInfo()?;
        let timeline = session.GetTimelineProperties()?;
        let raw = playback.PlaybackStatus()?;
        let status = if raw == GlobalSystemMediaTransportControlsSessionPlaybackStatus::Playing {
            PlaybackStatus::Playing
        } else if raw == GlobalSystemMediaTransportControlsSessionPlaybackStatus::Paused {
            PlaybackStatus::Paused
        } else if raw == GlobalSystemMediaTransportControlsSessionPlaybackStatus::Stopped
            || raw == GlobalSystemMediaTransportControlsSessionPlaybackStatus::Closed
        {
            PlaybackStatus::NotPlaying
        } else {
            PlaybackStatus::Unknown
        };

        let duration_100ns = timeline.EndTime()?.Duration - timeline.StartTime()?.Duration;
        let position_100ns = timeline.Position()?.Duration;

        Ok(PlaybackContext {
            status,
            position_seconds: timeline_seconds(position_100ns).unwrap_or(0.0),
            duration_seconds: timeline_seconds(duration_100ns),
            quality: None,
        })
    }

    async fn title(&self, _item: &MediaItem) -> Result<String> {
        let session =
            current_session()?.ok_or_else(|| anyhow!("no active media session"))?;
        let title = session.TryGetMediaPropertiesAsync()?.get()?.Title()?.to_string_lossy();
        if title.is_empty() {
            bail!("session reports no title");
        }
        Ok(title)
    }

    async fn artist(&self, _item: &MediaItem) -> Result<String> {
        let session =
            current_session()?.ok_or_else(|| anyhow!("no active media session"))?;
        let artist = session
            .TryGetMediaPropertiesAsync()?
            .get()?
            .Artist()?
            .to_string_lossy();
        if artist.is_empty() {
            bail!("session reports no artist");
        }
        Ok(artist)
    }

    async fn album(&self, _item: &MediaItem) -> Result<String> {
        let session =
            current_session()?.ok_or_else(|| anyhow!("no active media session"))?;
        let album = session
            .TryGetMediaPropertiesAsync()?
            .get()?
            .AlbumTitle()?
            .to_string_lossy();
        if album.is_empty() {
            bail!("session reports no album");
        }
        Ok(album)
    }

    async fn cover_url(&self, _item: &MediaItem, _size: u32) -> Result<String> {
        // GSMTC exposes thumbnails as streams, not addressable URLs.
        bail!("cover art not addressable over GSMTC")
    }

    async fn audio_quality(&self, _item: &MediaItem, preferred: Option<&str>) -> Result<String> {
        match preferred {
            Some(preferred) => Ok(preferred.to_string()),
            None => bail!("audio quality not exposed over GSMTC"),
        }
    }

    async fn release_date(&self, _item: &MediaItem) -> Result<String> {
        bail!("release date not exposed over GSMTC")
    }

    async fn isrc(&self, _item: &MediaItem) -> Result<String> {
        bail!("ISRC not exposed over GSMTC")
    }

    async fn popularity(&self, _item: &MediaItem) -> Result<String> {
        bail!("popularity not exposed over GSMTC")
    }
}

#[derive(Default)]
pub struct GsmtcControls;

impl GsmtcControls {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ControlSurface for GsmtcControls {
    fn name(&self) -> &'static str {
        "windows"
    }

    async fn activate(&self, selector: &str) -> Result<bool> {
        let session = match current_session()? {
            Some(s) => s,
            None => return Ok(false),
        };

        let op = match selector {
            "PlayPause" => session.TryTogglePlayPauseAsync()?,
            "Play" => session.TryPlayAsync()?,
            "Pause" => session.TryPauseAsync()?,
            "Next" => session.TrySkipNextAsync()?,
            "Previous" => session.TrySkipPreviousAsync()?,
            _ => return Ok(false),
        };

        Ok(op.get()?)
    }
}
