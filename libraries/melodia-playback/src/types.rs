//! Core types for playback management

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::time::Duration;

/// Glyph rendered when a track has no artwork
pub const DEFAULT_COVER_GLYPH: &str = "🎵";

/// Default volume for a fresh session (0-100)
pub const DEFAULT_VOLUME: u8 = 70;

/// A playable unit
///
/// Immutable once constructed. Identity is by `id`: two tracks with the same
/// id compare equal even if their metadata differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track identifier from the API
    pub id: String,

    /// Track title
    pub title: String,

    /// Artist name as displayed
    pub artist_display_name: String,

    /// Progressive-download URL (may be blank until resolved)
    #[serde(default)]
    pub stream_url: String,

    /// Duration if already known
    #[serde(default)]
    pub duration_seconds: Option<f64>,

    /// Artwork placeholder
    #[serde(default = "default_cover_glyph")]
    pub cover_glyph: String,
}

fn default_cover_glyph() -> String {
    DEFAULT_COVER_GLYPH.to_string()
}

impl Track {
    /// Create a track with no stream URL and unknown duration
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist_display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist_display_name: artist_display_name.into(),
            stream_url: String::new(),
            duration_seconds: None,
            cover_glyph: default_cover_glyph(),
        }
    }

    #[must_use]
    pub fn with_stream_url(mut self, url: impl Into<String>) -> Self {
        self.stream_url = url.into();
        self
    }

    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    #[must_use]
    pub fn with_cover_glyph(mut self, glyph: impl Into<String>) -> Self {
        self.cover_glyph = glyph.into();
        self
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when queue ends
    #[default]
    Off,

    /// Loop entire queue
    All,

    /// Loop current track only
    One,
}

impl RepeatMode {
    /// Next mode in the toggle cycle: Off → All → One → Off
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::All => "all",
            RepeatMode::One => "one",
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepeatMode {
    type Err = PlaybackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(RepeatMode::Off),
            "all" => Ok(RepeatMode::All),
            "one" => Ok(RepeatMode::One),
            other => Err(PlaybackError::InvalidRepeatMode(other.to_string())),
        }
    }
}

/// Playback mode flags
///
/// Independent of the queue; lives for the session only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackMode {
    pub repeat: RepeatMode,
    pub shuffle: bool,
}

/// Lifecycle of the media binding for the current load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaState {
    /// Nothing loaded
    Idle,

    /// Source assigned, waiting for enough data
    Loading,

    /// Enough data buffered, not yet playing
    Ready,

    /// Playing audio
    Playing,

    /// Paused mid-track (or ended with nothing to advance to)
    Paused,

    /// Transport failure; track stays selected
    Error,
}

/// Runtime state rendered by the player bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    /// Currently selected track
    pub current_track: Option<Track>,

    /// Intended playback state (may briefly disagree with the media handle)
    pub is_playing: bool,

    /// Volume level (0-100)
    pub volume: u8,

    /// Muted flag (volume level preserved)
    pub is_muted: bool,

    /// A load is in flight
    pub is_loading: bool,

    /// Playback position
    pub current_time_seconds: f64,

    /// Duration reported by the media handle (0 until known)
    pub duration_seconds: f64,
}

impl PlayerState {
    pub fn new(volume: u8) -> Self {
        Self {
            current_track: None,
            is_playing: false,
            volume: volume.min(100),
            is_muted: false,
            is_loading: false,
            current_time_seconds: 0.0,
            duration_seconds: 0.0,
        }
    }

    /// Volume as written to the media handle
    pub fn volume_fraction(&self) -> f32 {
        f32::from(self.volume) / 100.0
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

/// Configuration for the playback controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial volume (0-100, default: 70)
    pub volume: u8,

    /// Recently played list size (default: 50)
    pub history_size: usize,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,

    /// Initial shuffle flag (default: false)
    pub shuffle: bool,

    /// Seconds a load may stay pending before it fails (default: 15, 0 disables)
    pub load_timeout_secs: Option<u64>,
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<()> {
        if self.volume > 100 {
            return Err(PlaybackError::InvalidConfig(format!(
                "volume must be within 0-100, got {}",
                self.volume
            )));
        }
        if self.history_size == 0 {
            return Err(PlaybackError::InvalidConfig(
                "history_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn mode(&self) -> PlaybackMode {
        PlaybackMode {
            repeat: self.repeat,
            shuffle: self.shuffle,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            history_size: 50,
            repeat: RepeatMode::Off,
            shuffle: false,
            load_timeout_secs: Some(15),
        }
    }
}
