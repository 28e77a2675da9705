//! Recently played tracks
//!
//! Maintains a bounded, de-duplicated list of played tracks for the UI's
//! history view. Most recent first, each stamped with when it was played.

use crate::types::Track;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One entry in the recently played list
///
/// Serializes as the track's fields plus `playedAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPlay {
    #[serde(flatten)]
    pub track: Track,

    /// Wall-clock time of the most recent play
    pub played_at: DateTime<Utc>,
}

/// Recently played list with bounded size
///
/// Playing a track that is already listed moves it to the front.
#[derive(Debug, Clone)]
pub struct RecentlyPlayed {
    /// Most recent = front
    entries: VecDeque<RecentPlay>,

    /// Maximum list size
    max_size: usize,
}

impl RecentlyPlayed {
    /// Create new list with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Record a play now
    pub fn push(&mut self, track: Track) {
        self.push_at(track, Utc::now());
    }

    /// Record a play at `played_at`
    ///
    /// Removes any earlier entry for the same track and discards the oldest
    /// entry once full.
    pub fn push_at(&mut self, track: Track, played_at: DateTime<Utc>) {
        self.entries.retain(|e| e.track.id != track.id);
        self.entries.push_front(RecentPlay { track, played_at });
        self.entries.truncate(self.max_size);
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&RecentPlay> {
        self.entries.front()
    }

    /// All entries, most recent first
    pub fn iter(&self) -> impl Iterator<Item = &RecentPlay> {
        self.entries.iter()
    }

    /// Played tracks, most recent first
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.entries.iter().map(|e| &e.track)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for RecentlyPlayed {
    fn default() -> Self {
        Self::new(50)
    }
}
