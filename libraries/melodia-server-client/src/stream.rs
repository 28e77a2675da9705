//! Stream URL resolution against the Melodia API.

use melodia_playback::{StreamResolver, Track};

/// Resolves tracks to `{base}/api/songs/stream/{id}`
///
/// Tracks that already carry a stream URL keep it.
#[derive(Debug, Clone)]
pub struct ApiStreamResolver {
    base_url: String,
}

impl ApiStreamResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl StreamResolver for ApiStreamResolver {
    fn resolve(&self, track: &Track) -> Option<String> {
        let own = track.stream_url.trim();
        if !own.is_empty() {
            return Some(own.to_string());
        }

        let id = track.id.trim();
        if id.is_empty() {
            return None;
        }
        Some(stream_url(&self.base_url, id))
    }
}

pub(crate) fn stream_url(base_url: &str, song_id: &str) -> String {
    format!("{}/api/songs/stream/{}", base_url, song_id)
}
