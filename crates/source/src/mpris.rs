use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use nowplay_bridge_core::PlaybackStatus;
use tokio::sync::Mutex;
use zbus::zvariant::{OwnedValue, Str};
use zbus::{Connection, Proxy};

use crate::{ControlSurface, MediaItem, MediaSource, PlaybackContext};

async fn cached_connection(slot: &Mutex<Option<Connection>>) -> Result<Connection> {
    let mut slot = slot.lock().await;
    if let Some(conn) = slot.as_ref() {
        return Ok(conn.clone());
    }
    let conn = Connection::session()
        .await
        .context("failed to connect DBus session")?;
    *slot = Some(conn.clone());
    Ok(conn)
}

async fn find_player(conn: &Connection) -> Result<Option<String>> {
    let proxy = Proxy::new(
        conn,
        "org.freedesktop.DBus",
        "/org/freedesktop/DBus",
        "org.freedesktop.DBus",
    )
    .await?;

    let names: Vec<String> = proxy.call("ListNames", &()).await?;
    let mut players: Vec<String> = names
        .into_iter()
        .filter(|n| n.starts_with("org.mpris.MediaPlayer2."))
        .collect();
    players.sort();
    Ok(players.into_iter().next())
}

async fn player_proxy(slot: &Mutex<Option<Connection>>) -> Result<Option<Proxy<'static>>> {
    let conn = cached_connection(slot).await?;
    let player = match find_player(&conn).await? {
        Some(p) => p,
        None => return Ok(None),
    };
    let proxy = Proxy::new_owned(
        conn,
        player,
        "/org/mpris/MediaPlayer2",
        "org.mpris.MediaPlayer2.Player",
    )
    .await?;
    Ok(Some(proxy))
}

fn ov_to_string(v: &OwnedValue) -> Option<String> {
    let owned = v.try_clone().ok()?;
    if let Ok(s) = String::try_from(owned.try_clone().ok()?) {
        return Some(s);
    }
    if let Ok(s) = Str::try_from(owned) {
        return Some(s.to_string());
    }
    None
}

fn ov_to_i64(v: &OwnedValue) -> Option<i64> {
    if let Ok(i) = <i64>::try_from(v) {
        return Some(i);
    }
    if let Ok(u) = <u64>::try_from(v) {
        return Some(u as i64);
    }
    None
}

fn ov_to_f64(v: &OwnedValue) -> Option<f64> {
    <f64>::try_from(v).ok()
}

fn artist_from_value(v: &OwnedValue) -> Option<String> {
    if let Ok(arr) = Vec::<String>::try_from(v.try_clone().ok()?) {
        return arr.into_iter().next();
    }
    None
}

fn length_seconds(metadata: &HashMap<String, OwnedValue>) -> Option<f64> {
    metadata
        .get("mpris:length")
        .and_then(ov_to_i64)
        .filter(|v| *v > 0)
        .map(|v| v as f64 / 1_000_000.0)
}

#[derive(Default)]
pub struct MprisSource {
    conn: Mutex<Option<Connection>>,
}

impl MprisSource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn metadata(&self) -> Result<HashMap<String, OwnedValue>> {
        let proxy = player_proxy(&self.conn)
            .await?
            .ok_or_else(|| anyhow!("no MPRIS player on the session bus"))?;
        Ok(proxy.get_property("Metadata").await?)
    }
}

#[async_trait]
impl MediaSource for MprisSource {
    fn name(&self) -> &'static str {
        "mpris"
    }

    async fn current_item(&self) -> Result<Option<MediaItem>> {
        let proxy = match player_proxy(&self.conn).await? {
            Some(p) => p,
            None => return Ok(None),
        };

        let status: String = proxy.get_property("PlaybackStatus").await?;
        if status == "Stopped" {
            return Ok(None);
        }

        let metadata: HashMap<String, OwnedValue> = proxy.get_property("Metadata").await?;
        let title = metadata
            .get("xesam:title")
            .and_then(ov_to_string)
            .unwrap_or_default();
        let artist = metadata
            .get("xesam:artist")
            .and_then(artist_from_value)
            .unwrap_or_default();
        if title.is_empty() && artist.is_empty() {
            return Ok(None);
        }

        Ok(Some(MediaItem {
            id: format!("{artist}:{title}"),
            duration_seconds: length_seconds(&metadata),
            best_quality: None,
        }))
    }

    async fn playback(&self) -> Result<PlaybackContext> {
        let proxy = player_proxy(&self.conn)
            .await?
            .ok_or_else(|| anyhow!("no MPRIS player on the session bus"))?;

        let raw: String = proxy.get_property("PlaybackStatus").await?;
        let status = match raw.as_str() {
            "Playing" => PlaybackStatus::Playing,
            "Paused" => PlaybackStatus::Paused,
            "Stopped" => PlaybackStatus::NotPlaying,
            _ => PlaybackStatus::Unknown,
        };

        let position_raw: i64 = proxy.get_property("Position").await.unwrap_or(0);
        let position_seconds = if position_raw > 0 {
            position_raw as f64 / 1_000_000.0
        } else {
            0.0
        };

        let metadata: HashMap<String, OwnedValue> =
            proxy.get_property("Metadata").await.unwrap_or_default();

        Ok(PlaybackContext {
            status,
            position_seconds,
            duration_seconds: length_seconds(&metadata),
            quality: None,
        })
    }

    async fn title(&self, _item: &MediaItem) -> Result<String> {
        let metadata = self.metadata().await?;
        metadata
            .get("xesam:title")
            .and_then(ov_to_string)
            .ok_or_else(|| anyhow!("xesam:title missing"))
    }

    async fn artist(&self, _item: &MediaItem) -> Result<String> {
        let metadata = self.metadata().await?;
        metadata
            .get("xesam:artist")
            .and_then(artist_from_value)
            .ok_or_else(|| anyhow!("xesam:artist missing"))
    }

    async fn album(&self, _item: &MediaItem) -> Result<String> {
        let metadata = self.metadata().await?;
        metadata
            .get("xesam:album")
            .and_then(ov_to_string)
            .ok_or_else(|| anyhow!("xesam:album missing"))
    }

    async fn cover_url(&self, _item: &MediaItem, _size: u32) -> Result<String> {
        let metadata = self.metadata().await?;
        metadata
            .get("mpris:artUrl")
            .and_then(ov_to_string)
            .ok_or_else(|| anyhow!("mpris:artUrl missing"))
    }

    async fn audio_quality(&self, _item: &MediaItem, preferred: Option<&str>) -> Result<String> {
        match preferred {
            Some(preferred) => Ok(preferred.to_string()),
            None => bail!("audio quality not exposed over MPRIS"),
        }
    }

    async fn release_date(&self, _item: &MediaItem) -> Result<String> {
        let metadata = self.metadata().await?;
        let created = metadata
            .get("xesam:contentCreated")
            .and_then(ov_to_string)
            .ok_or_else(|| anyhow!("xesam:contentCreated missing"))?;
        // xesam carries a full ISO 8601 timestamp, keep the date part.
        Ok(created.chars().take(10).collect())
    }

    async fn isrc(&self, _item: &MediaItem) -> Result<String> {
        bail!("ISRC not exposed over MPRIS")
    }

    async fn popularity(&self, _item: &MediaItem) -> Result<String> {
        let metadata = self.metadata().await?;
        let rating = metadata
            .get("xesam:autoRating")
            .and_then(ov_to_f64)
            .ok_or_else(|| anyhow!("xesam:autoRating missing"))?;
        Ok(format!("{:.0}", rating * 100.0))
    }
}

#[derive(Default)]
pub struct MprisControls {
    conn: Mutex<Option<Connection>>,
}

impl MprisControls {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ControlSurface for MprisControls {
    fn name(&self) -> &'static str {
        "mpris"
    }

    async fn activate(&self, selector: &str) -> Result<bool> {
        let method = match selector {
            "PlayPause" | "Play" | "Pause" | "Next" | "Previous" => selector,
            _ => return Ok(false),
        };

        let proxy = match player_proxy(&self.conn).await? {
            Some(p) => p,
            None => return Ok(false),
        };
        proxy.call_method(method, &()).await?;
        Ok(true)
    }
}
