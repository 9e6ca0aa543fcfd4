use crate::model::PlaybackStatus;

pub fn estimate_position(
    last_position_seconds: f64,
    last_status: PlaybackStatus,
    last_updated_at_ms: u64,
    duration_seconds: f64,
    now_ms: u64,
) -> f64 {
    if last_status != PlaybackStatus::Playing {
        return last_position_seconds;
    }
    // Saturating: a stamp from the future must not extrapolate backward.
    let delta_seconds = now_ms.saturating_sub(last_updated_at_ms) as f64 / 1000.0;
    let mut position = last_position_seconds + delta_seconds;
    if duration_seconds > 0.0 {
        position = position.min(duration_seconds);
    }
    position
}
