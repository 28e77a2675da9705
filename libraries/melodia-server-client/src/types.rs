//! Types for Melodia API requests and responses.

use melodia_playback::Track;
use serde::{Deserialize, Serialize};

/// Configuration for connecting to the Melodia API.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the API (e.g., "http://localhost:8080")
    pub url: String,
    /// Bearer token sent with every request when present
    pub access_token: Option<String>,
}

impl ServerConfig {
    /// Create a new server config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: None,
        }
    }

    /// Create a config with an existing token.
    pub fn with_token(url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: Some(access_token.into()),
        }
    }
}

/// Envelope wrapping every JSON response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
    pub timestamp: Option<i64>,
}

// =============================================================================
// History Types
// =============================================================================

/// Request body for recording a play.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSongToHistoryRequest {
    pub song_id: String,
}

/// Recently played songs for a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayedSongs {
    pub user_id: String,
    pub total_songs: Option<u32>,
    #[serde(default)]
    pub songs: Vec<ServerSong>,
}

/// Song as returned by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSong {
    pub song_id: String,
    pub title: String,
    pub artist_name: Option<String>,
    /// Duration in seconds (0 when unknown)
    #[serde(default)]
    pub duration: u32,
    pub file_path: Option<String>,
}

impl ServerSong {
    /// Convert into a playable track streaming from `stream_url`.
    pub fn into_track(self, stream_url: String) -> Track {
        let mut track = Track::new(
            self.song_id,
            self.title,
            self.artist_name.unwrap_or_else(|| "Unknown Artist".to_string()),
        )
        .with_stream_url(stream_url);
        if self.duration > 0 {
            track = track.with_duration(f64::from(self.duration));
        }
        track
    }
}
