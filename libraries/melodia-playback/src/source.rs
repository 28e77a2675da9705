//! Stream URL resolution
//!
//! Maps a track to the HTTP(S) URL the media backend downloads progressively.
//! A track with no resolvable URL is never loaded.

use crate::types::Track;

/// Resolves the stream URL for a track
pub trait StreamResolver {
    /// `None` means no load should be attempted
    fn resolve(&self, track: &Track) -> Option<String>;
}

/// Uses the URL carried by the track itself
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackStreamUrl;

impl StreamResolver for TrackStreamUrl {
    fn resolve(&self, track: &Track) -> Option<String> {
        let url = track.stream_url.trim();
        if url.is_empty() {
            None
        } else {
            Some(url.to_string())
        }
    }
}

impl<F> StreamResolver for F
where
    F: Fn(&Track) -> Option<String>,
{
    fn resolve(&self, track: &Track) -> Option<String> {
        self(track)
    }
}
