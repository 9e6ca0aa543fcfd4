use anyhow::Result;
use tracing::debug;

use nowplay_bridge_core::{normalize_cover_path, TrackSnapshot, UNKNOWN};
use nowplay_bridge_source::{MediaItem, MediaSource, PlaybackContext};

pub async fn build_snapshot(
    source: &dyn MediaSource,
    item: &MediaItem,
    cover_size: u32,
) -> Result<(TrackSnapshot, PlaybackContext)> {
    // The live context is the one read that fails the whole snapshot.
    let context = source.playback().await?;

    let preferred = context
        .quality
        .clone()
        .or_else(|| item.best_quality.clone());

    let (title, artist, album, cover, quality, release_date, isrc, popularity) = tokio::join!(
        source.title(item),
        source.artist(item),
        source.album(item),
        source.cover_url(item, cover_size),
        source.audio_quality(item, preferred.as_deref()),
        source.release_date(item),
        source.isrc(item),
        source.popularity(item),
    );

    let snapshot = TrackSnapshot {
        album: field_or_empty("album", album),
        artist: field_or_empty("artist", artist),
        audio_quality: field_or_unknown("quality", quality),
        duration: context
            .duration_seconds
            .or(item.duration_seconds)
            .unwrap_or(0.0),
        cover: normalize_cover_path(&field_or_empty("cover", cover)),
        isrc: field_or_empty("isrc", isrc),
        popularity: field_or_unknown("popularity", popularity),
        release_date: field_or_unknown("release_date", release_date),
        title: field_or_empty("title", title),
        track_id: item.id.clone(),
    };

    Ok((snapshot, context))
}

fn field_or_empty(name: &str, value: Result<String>) -> String {
    match value {
        Ok(v) => v,
        Err(err) => {
            debug!(field = name, error = %err, "metadata field degraded");
            String::new()
        }
    }
}

fn field_or_unknown(name: &str, value: Result<String>) -> String {
    match value {
        Ok(v) => v,
        Err(err) => {
            debug!(field = name, error = %err, "metadata field degraded");
            UNKNOWN.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nowplay_bridge_core::PlaybackStatus;
    use nowplay_bridge_source::scripted::ScriptedSource;

    fn item(id: &str) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            duration_seconds: Some(180.0),
            best_quality: None,
        }
    }

    async fn scripted_with_metadata() -> ScriptedSource {
        let source = ScriptedSource::new();
        source.set_field("title", "Giant Steps").await;
        source.set_field("artist", "John Coltrane").await;
        source.set_field("album", "Giant Steps").await;
        source
            .set_field("cover", "https://x/images/abc/1280x1280.jpg")
            .await;
        source.set_field("quality", "LOSSLESS").await;
        source.set_field("release_date", "1960-02-01").await;
        source.set_field("isrc", "USAT29900609").await;
        source.set_field("popularity", "61").await;
        source
            .set_playback(PlaybackContext {
                status: PlaybackStatus::Playing,
                position_seconds: 12.0,
                duration_seconds: Some(286.0),
                quality: None,
            })
            .await;
        source
    }

    #[tokio::test]
    async fn resolves_all_fields() {
        let source = scripted_with_metadata().await;

        let (snapshot, context) = build_snapshot(&source, &item("t1"), 1280).await.unwrap();

        assert_eq!(snapshot.title, "Giant Steps");
        assert_eq!(snapshot.artist, "John Coltrane");
        assert_eq!(snapshot.album, "Giant Steps");
        assert_eq!(snapshot.cover, "abc");
        assert_eq!(snapshot.audio_quality, "LOSSLESS");
        assert_eq!(snapshot.release_date, "1960-02-01");
        assert_eq!(snapshot.isrc, "USAT29900609");
        assert_eq!(snapshot.popularity, "61");
        assert_eq!(snapshot.track_id, "t1");
        assert_eq!(snapshot.duration, 286.0);
        assert_eq!(context.status, PlaybackStatus::Playing);
    }

    #[tokio::test]
    async fn failed_fields_degrade_to_sentinels() {
        let source = scripted_with_metadata().await;
        source.fail_field("title").await;
        source.fail_field("quality").await;
        source.fail_field("popularity").await;
        source.fail_field("cover").await;

        let (snapshot, _) = build_snapshot(&source, &item("t1"), 1280).await.unwrap();

        assert_eq!(snapshot.title, "");
        assert_eq!(snapshot.audio_quality, "Unknown");
        assert_eq!(snapshot.popularity, "Unknown");
        assert_eq!(snapshot.cover, "");
        assert_eq!(snapshot.artist, "John Coltrane");
    }

    #[tokio::test]
    async fn duration_falls_back_to_item_then_zero() {
        let source = scripted_with_metadata().await;
        source
            .set_playback(PlaybackContext {
                status: PlaybackStatus::Playing,
                position_seconds: 0.0,
                duration_seconds: None,
                quality: None,
            })
            .await;

        let (snapshot, _) = build_snapshot(&source, &item("t1"), 1280).await.unwrap();
        assert_eq!(snapshot.duration, 180.0);

        let bare = MediaItem {
            id: "t2".to_string(),
            duration_seconds: None,
            best_quality: None,
        };
        let (snapshot, _) = build_snapshot(&source, &bare, 1280).await.unwrap();
        assert_eq!(snapshot.duration, 0.0);
    }

    #[tokio::test]
    async fn quality_preference_comes_from_context_then_item() {
        let source = scripted_with_metadata().await;
        source
            .set_playback(PlaybackContext {
                status: PlaybackStatus::Playing,
                position_seconds: 0.0,
                duration_seconds: Some(286.0),
                quality: Some("HI_RES".to_string()),
            })
            .await;

        let (snapshot, _) = build_snapshot(&source, &item("t1"), 1280).await.unwrap();
        assert_eq!(snapshot.audio_quality, "HI_RES");

        let mut fallback_item = item("t1");
        fallback_item.best_quality = Some("HIGH".to_string());
        source
            .set_playback(PlaybackContext {
                status: PlaybackStatus::Playing,
                position_seconds: 0.0,
                duration_seconds: Some(286.0),
                quality: None,
            })
            .await;

        let (snapshot, _) = build_snapshot(&source, &fallback_item, 1280)
            .await
            .unwrap();
        assert_eq!(snapshot.audio_quality, "HIGH");
    }

    #[tokio::test]
    async fn playback_failure_fails_the_whole_snapshot() {
        let source = scripted_with_metadata().await;
        source.break_playback().await;

        assert!(build_snapshot(&source, &item("t1"), 1280).await.is_err());
    }
}
