use std::sync::Arc;
use std::time::Duration;

use nowplay_bridge_core::PlaybackStatus;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::{MediaItem, MediaSource, SourceEvent};

#[derive(Default)]
pub struct SourceWatcher {
    last_track_id: Option<String>,
    last_status: Option<PlaybackStatus>,
}

impl SourceWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diff(&mut self, item: Option<&MediaItem>, status: PlaybackStatus) -> Vec<SourceEvent> {
        let mut events = Vec::new();

        match item {
            Some(item) => {
                if self.last_track_id.as_deref() != Some(item.id.as_str()) {
                    self.last_track_id = Some(item.id.clone());
                    // The rebuilt snapshot carries the fresh status, so the
                    // baseline moves without a separate state event.
                    self.last_status = Some(status);
                    events.push(SourceEvent::TrackChanged(item.clone()));
                    return events;
                }
            }
            None => {
                self.last_track_id = None;
            }
        }

        if self.last_status != Some(status) {
            self.last_status = Some(status);
            events.push(SourceEvent::StateChanged(status));
        }

        events
    }
}

pub async fn watch_source(
    source: Arc<dyn MediaSource>,
    interval: Duration,
    events: mpsc::Sender<SourceEvent>,
) {
    let mut watcher = SourceWatcher::new();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let item = match source.current_item().await {
            Ok(item) => item,
            Err(err) => {
                debug!(source = source.name(), error = %err, "current item read failed");
                None
            }
        };
        let status = match source.playback().await {
            Ok(ctx) => ctx.status,
            Err(err) => {
                debug!(source = source.name(), error = %err, "playback read failed");
                PlaybackStatus::Unknown
            }
        };

        for event in watcher.diff(item.as_ref(), status) {
            if events.send(event).await.is_err() {
                debug!("event receiver dropped, watcher stopping");
                return;
            }
        }
    }
}

pub async fn liveliness_probe(source: Arc<dyn MediaSource>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        match source.playback().await {
            Ok(ctx) => debug!(
                source = source.name(),
                status = ?ctx.status,
                position = ctx.position_seconds,
                "source alive"
            ),
            Err(err) => debug!(source = source.name(), error = %err, "source probe failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            duration_seconds: Some(200.0),
            best_quality: None,
        }
    }

    #[test]
    fn first_sighting_emits_track_changed_only() {
        let mut watcher = SourceWatcher::new();
        let t1 = item("t1");

        let events = watcher.diff(Some(&t1), PlaybackStatus::Playing);
        assert_eq!(events, vec![SourceEvent::TrackChanged(t1)]);
    }

    #[test]
    fn unchanged_poll_emits_nothing() {
        let mut watcher = SourceWatcher::new();
        let t1 = item("t1");

        watcher.diff(Some(&t1), PlaybackStatus::Playing);
        assert!(watcher.diff(Some(&t1), PlaybackStatus::Playing).is_empty());
    }

    #[test]
    fn status_flip_emits_state_changed() {
        let mut watcher = SourceWatcher::new();
        let t1 = item("t1");

        watcher.diff(Some(&t1), PlaybackStatus::Playing);
        let events = watcher.diff(Some(&t1), PlaybackStatus::Paused);
        assert_eq!(
            events,
            vec![SourceEvent::StateChanged(PlaybackStatus::Paused)]
        );
    }

    #[test]
    fn track_swap_emits_track_changed_even_with_status_flip() {
        let mut watcher = SourceWatcher::new();
        let t1 = item("t1");
        let t2 = item("t2");

        watcher.diff(Some(&t1), PlaybackStatus::Playing);
        let events = watcher.diff(Some(&t2), PlaybackStatus::Paused);
        assert_eq!(events, vec![SourceEvent::TrackChanged(t2.clone())]);

        // Baseline moved with the swap, so the same status stays quiet.
        assert!(watcher.diff(Some(&t2), PlaybackStatus::Paused).is_empty());
    }

    #[test]
    fn track_clear_emits_only_the_status_event() {
        let mut watcher = SourceWatcher::new();
        let t1 = item("t1");

        watcher.diff(Some(&t1), PlaybackStatus::Playing);
        let events = watcher.diff(None, PlaybackStatus::NotPlaying);
        assert_eq!(
            events,
            vec![SourceEvent::StateChanged(PlaybackStatus::NotPlaying)]
        );

        // A re-appearing track is a fresh sighting.
        let events = watcher.diff(Some(&t1), PlaybackStatus::Playing);
        assert_eq!(events, vec![SourceEvent::TrackChanged(t1)]);
    }
}
