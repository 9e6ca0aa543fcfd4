use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use nowplay_bridge_core::TrackStatusPayload;

use crate::channel::LaneReceiver;

#[derive(Default)]
pub struct TrackCache {
    latest: RwLock<Option<TrackStatusPayload>>,
}

impl TrackCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn store(&self, payload: TrackStatusPayload) {
        *self.latest.write().await = Some(payload);
    }

    pub async fn read(&self, now_ms: u64) -> Option<TrackStatusPayload> {
        self.latest
            .read()
            .await
            .as_ref()
            .map(|payload| payload.extrapolated(now_ms))
    }
}

// The receiver stays parked in the shared mutex so a stopped listener can
// hand it back to the next one.
pub async fn run_cache_loop(
    track_rx: Arc<Mutex<LaneReceiver<TrackStatusPayload>>>,
    cache: Arc<TrackCache>,
) {
    let mut rx = track_rx.lock().await;
    while let Some(payload) = rx.recv().await {
        debug!(track = %payload.track.track_id, status = ?payload.status, "payload cached");
        cache.store(payload).await;
    }
    debug!(lane = rx.name(), "lane closed, cache loop stopping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::lane;
    use nowplay_bridge_core::{PlaybackStatus, TrackSnapshot};
    use std::time::Duration;

    fn payload(id: &str, status: PlaybackStatus, position: f64, at_ms: u64) -> TrackStatusPayload {
        let track = TrackSnapshot {
            title: id.to_string(),
            duration: 200.0,
            track_id: id.to_string(),
            ..TrackSnapshot::default()
        };
        TrackStatusPayload::new(track, status, position, at_ms)
    }

    #[tokio::test]
    async fn empty_cache_reads_none() {
        let cache = TrackCache::new();
        assert!(cache.read(1_000).await.is_none());
    }

    #[tokio::test]
    async fn playing_read_extrapolates_and_clamps() {
        let cache = TrackCache::new();
        cache
            .store(payload("t1", PlaybackStatus::Playing, 10.0, 1_000))
            .await;

        let read = cache.read(6_000).await.expect("cached payload");
        assert_eq!(read.position_seconds, 15.0);

        cache
            .store(payload("t1", PlaybackStatus::Playing, 198.0, 1_000))
            .await;
        let read = cache.read(11_000).await.expect("cached payload");
        assert_eq!(read.position_seconds, 200.0);
    }

    #[tokio::test]
    async fn paused_read_passes_position_through() {
        let cache = TrackCache::new();
        cache
            .store(payload("t1", PlaybackStatus::Paused, 42.0, 1_000))
            .await;

        let read = cache.read(600_000).await.expect("cached payload");
        assert_eq!(read.position_seconds, 42.0);
    }

    #[tokio::test]
    async fn store_is_last_write_wins() {
        let cache = TrackCache::new();
        cache
            .store(payload("t1", PlaybackStatus::Playing, 10.0, 1_000))
            .await;
        cache
            .store(payload("t2", PlaybackStatus::Paused, 0.0, 2_000))
            .await;

        let read = cache.read(2_000).await.expect("cached payload");
        assert_eq!(read.track.track_id, "t2");
    }

    #[tokio::test]
    async fn cache_loop_stores_received_payloads() {
        let (tx, rx) = lane("trackInfo", 8);
        let rx = Arc::new(Mutex::new(rx));
        let cache = Arc::new(TrackCache::new());

        let task = tokio::spawn(run_cache_loop(rx.clone(), cache.clone()));

        tx.send(payload("t1", PlaybackStatus::Paused, 5.0, 1_000));
        let mut read = None;
        for _ in 0..50 {
            read = cache.read(1_000).await;
            if read.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(read.expect("cached payload").track.track_id, "t1");

        // Aborting the loop parks the receiver back for the next listener.
        task.abort();
        let _ = task.await;
        assert!(rx.try_lock().is_ok());
    }
}
