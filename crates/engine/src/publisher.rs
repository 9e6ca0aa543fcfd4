use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use nowplay_bridge_core::{epoch_ms, PlaybackStatus, TrackStatusPayload};
use nowplay_bridge_source::{MediaItem, MediaSource, SourceEvent};

use crate::channel::LaneSender;
use crate::snapshot::build_snapshot;

pub struct TrackPublisher {
    source: Arc<dyn MediaSource>,
    track_tx: LaneSender<TrackStatusPayload>,
    cover_size: u32,
    current: Option<TrackStatusPayload>,
}

impl TrackPublisher {
    pub fn new(
        source: Arc<dyn MediaSource>,
        track_tx: LaneSender<TrackStatusPayload>,
        cover_size: u32,
    ) -> Self {
        Self {
            source,
            track_tx,
            cover_size,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&TrackStatusPayload> {
        self.current.as_ref()
    }

    pub async fn on_track_changed(&mut self, item: &MediaItem) {
        let built = build_snapshot(self.source.as_ref(), item, self.cover_size).await;
        let (snapshot, context) = match built {
            Ok(built) => built,
            Err(err) => {
                warn!(track = %item.id, error = %err, "snapshot build failed, publish skipped");
                return;
            }
        };

        let payload = TrackStatusPayload::new(
            snapshot,
            context.status,
            context.position_seconds,
            epoch_ms(),
        );
        self.track_tx.send(payload.clone());
        self.current = Some(payload);
    }

    pub async fn on_state_changed(&mut self, status: PlaybackStatus) {
        let current = match self.current.as_mut() {
            Some(current) => current,
            None => {
                debug!(?status, "state change before any track, dropped");
                return;
            }
        };

        let now = epoch_ms();
        let position = match self.source.playback().await {
            Ok(ctx) => ctx.position_seconds,
            Err(err) => {
                debug!(error = %err, "live position read failed, extrapolating");
                current.extrapolated(now).position_seconds
            }
        };

        current.merge_state(status, position, now);
        self.track_tx.send(current.clone());
    }

    pub async fn run(mut self, mut events: mpsc::Receiver<SourceEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                SourceEvent::TrackChanged(item) => self.on_track_changed(&item).await,
                SourceEvent::StateChanged(status) => self.on_state_changed(status).await,
            }
        }
        debug!("source event pump closed, publisher stopping");
    }
}
