//! In-memory source and control surface with scriptable answers, for tests.

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{ControlSurface, MediaItem, MediaSource, PlaybackContext};

#[derive(Default)]
struct ScriptState {
    item: Option<MediaItem>,
    playback: Option<PlaybackContext>,
    playback_broken: bool,
    fields: HashMap<String, String>,
    failing: HashSet<String>,
}

#[derive(Default)]
pub struct ScriptedSource {
    state: Mutex<ScriptState>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_item(&self, item: Option<MediaItem>) {
        self.state.lock().await.item = item;
    }

    pub async fn set_playback(&self, ctx: PlaybackContext) {
        let mut state = self.state.lock().await;
        state.playback = Some(ctx);
        state.playback_broken = false;
    }

    pub async fn break_playback(&self) {
        self.state.lock().await.playback_broken = true;
    }

    pub async fn set_field(&self, name: &str, value: &str) {
        self.state
            .lock()
            .await
            .fields
            .insert(name.to_string(), value.to_string());
    }

    pub async fn fail_field(&self, name: &str) {
        self.state.lock().await.failing.insert(name.to_string());
    }

    async fn field(&self, name: &str) -> Result<String> {
        let state = self.state.lock().await;
        if state.failing.contains(name) {
            bail!("scripted failure for {name}");
        }
        state
            .fields
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("no scripted value for {name}"))
    }
}

#[async_trait]
impl MediaSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn current_item(&self) -> Result<Option<MediaItem>> {
        Ok(self.state.lock().await.item.clone())
    }

    async fn playback(&self) -> Result<PlaybackContext> {
        let state = self.state.lock().await;
        if state.playback_broken {
            bail!("scripted playback failure");
        }
        Ok(state
            .playback
            .clone()
            .unwrap_or_else(PlaybackContext::unknown))
    }

    async fn title(&self, _item: &MediaItem) -> Result<String> {
        self.field("title").await
    }

    async fn artist(&self, _item: &MediaItem) -> Result<String> {
        self.field("artist").await
    }

    async fn album(&self, _item: &MediaItem) -> Result<String> {
        self.field("album").await
    }

    async fn cover_url(&self, _item: &MediaItem, _size: u32) -> Result<String> {
        self.field("cover").await
    }

    async fn audio_quality(&self, _item: &MediaItem, preferred: Option<&str>) -> Result<String> {
        let state = self.state.lock().await;
        if state.failing.contains("quality") {
            bail!("scripted failure for quality");
        }
        drop(state);
        if let Some(preferred) = preferred {
            return Ok(preferred.to_string());
        }
        self.field("quality").await
    }

    async fn release_date(&self, _item: &MediaItem) -> Result<String> {
        self.field("release_date").await
    }

    async fn isrc(&self, _item: &MediaItem) -> Result<String> {
        self.field("isrc").await
    }

    async fn popularity(&self, _item: &MediaItem) -> Result<String> {
        self.field("popularity").await
    }
}

pub struct RecordingSurface {
    known: Vec<String>,
    failing: Vec<String>,
    seen: Mutex<Vec<String>>,
}

impl RecordingSurface {
    pub fn new(known: &[&str]) -> Self {
        Self {
            known: known.iter().map(|s| s.to_string()).collect(),
            failing: Vec::new(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_failing(mut self, failing: &[&str]) -> Self {
        self.failing = failing.iter().map(|s| s.to_string()).collect();
        self
    }

    pub async fn attempts(&self) -> Vec<String> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl ControlSurface for RecordingSurface {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn activate(&self, selector: &str) -> Result<bool> {
        self.seen.lock().await.push(selector.to_string());
        if self.failing.iter().any(|s| s == selector) {
            bail!("control backend refused {selector}");
        }
        Ok(self.known.iter().any(|s| s == selector))
    }
}
