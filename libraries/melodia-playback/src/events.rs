//! Playback Events
//!
//! Event-based communication for UI synchronization. The controller queues
//! events as its state changes; the UI drains them and re-renders:
//! - State changes (loading/playing/paused/error)
//! - Track and queue changes
//! - Volume and mode changes
//! - Position updates from the media handle

use crate::types::{MediaState, RepeatMode};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// Media lifecycle or intended playing state changed
    #[serde(rename_all = "camelCase")]
    StateChanged {
        media: MediaState,
        is_playing: bool,
        is_loading: bool,
    },

    /// Current track changed (None after stop)
    #[serde(rename_all = "camelCase")]
    TrackChanged {
        track_id: Option<String>,
        previous_track_id: Option<String>,
    },

    /// Queue replaced, extended or cleared
    #[serde(rename_all = "camelCase")]
    QueueChanged {
        length: usize,
        current_index: Option<usize>,
    },

    /// Volume or mute changed
    #[serde(rename_all = "camelCase")]
    VolumeChanged { level: u8, is_muted: bool },

    /// Repeat or shuffle toggled
    ModeChanged { repeat: RepeatMode, shuffle: bool },

    /// Position or duration changed
    #[serde(rename_all = "camelCase")]
    PositionUpdate {
        position_secs: f64,
        duration_secs: f64,
    },

    /// Transport failure (informational; state already reflects it)
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = PlaybackEvent::TrackChanged {
            track_id: Some("t2".into()),
            previous_track_id: Some("t1".into()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "trackChanged");
        assert_eq!(json["trackId"], "t2");
        assert_eq!(json["previousTrackId"], "t1");
    }

    #[test]
    fn mode_event_uses_lowercase_repeat() {
        let event = PlaybackEvent::ModeChanged {
            repeat: RepeatMode::One,
            shuffle: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["repeat"], "one");
        assert_eq!(json["shuffle"], true);
    }
}
