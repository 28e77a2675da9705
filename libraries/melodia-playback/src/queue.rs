//! Play queue with a cursor
//!
//! The queue is replaced wholesale by every "play from this list" command;
//! `next`/`previous` only move the cursor. Selection rules live here so they
//! can be exercised without a media backend.

use crate::shuffle::pick_other_index;
use crate::types::{PlaybackMode, RepeatMode, Track};
use rand::Rng;
use serde::Serialize;

/// Ordered tracks plus the index of the current one
///
/// Invariant: `current_index < items.len()` whenever `items` is non-empty.
/// When empty the index is kept at 0 and is never dereferenced.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    items: Vec<Track>,
    current_index: usize,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace contents and cursor
    ///
    /// Out-of-range start indices fall back to 0.
    pub fn replace(&mut self, items: Vec<Track>, index: usize) {
        self.current_index = if index < items.len() { index } else { 0 };
        self.items = items;
    }

    /// Append a track without touching the cursor
    pub fn push(&mut self, track: Track) {
        self.items.push(track);
    }

    /// Remove every track and reset the cursor
    pub fn clear(&mut self) {
        self.items.clear();
        self.current_index = 0;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Track] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.items.get(index)
    }

    /// Cursor position, `None` for an empty queue
    pub fn current_index(&self) -> Option<usize> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.current_index)
        }
    }

    /// Track under the cursor
    pub fn current(&self) -> Option<&Track> {
        self.items.get(self.current_index)
    }

    /// Move the cursor; returns the track now under it
    pub(crate) fn select(&mut self, index: usize) -> Option<&Track> {
        if index >= self.items.len() {
            return None;
        }
        self.current_index = index;
        self.items.get(index)
    }

    /// Index `next()` would move to, or `None` for a no-op
    ///
    /// - empty queue: no-op
    /// - repeat one: no-op (the media handle loops the track)
    /// - shuffle with 2+ items: random index other than the current one
    /// - otherwise advance, wrapping only under repeat all
    pub fn next_index<R: Rng + ?Sized>(&self, mode: PlaybackMode, rng: &mut R) -> Option<usize> {
        if self.items.is_empty() || mode.repeat == RepeatMode::One {
            return None;
        }

        let len = self.items.len();
        if mode.shuffle && len > 1 {
            return pick_other_index(len, self.current_index, rng);
        }

        if self.current_index + 1 < len {
            Some(self.current_index + 1)
        } else if mode.repeat == RepeatMode::All {
            Some(0)
        } else {
            None
        }
    }

    /// Index `previous()` would move to, or `None` for a no-op
    ///
    /// Always moves the cursor; there is no "restart the current track" case.
    pub fn previous_index(&self, mode: PlaybackMode) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }

        if self.current_index > 0 {
            Some(self.current_index - 1)
        } else if mode.repeat == RepeatMode::All {
            Some(self.items.len() - 1)
        } else {
            None
        }
    }

    /// Tracks after the cursor
    pub fn upcoming(&self) -> &[Track] {
        if self.items.is_empty() {
            &[]
        } else {
            &self.items[self.current_index + 1..]
        }
    }

    /// Tracks before the cursor
    pub fn played(&self) -> &[Track] {
        if self.items.is_empty() {
            &[]
        } else {
            &self.items[..self.current_index]
        }
    }
}

/// Read-only queue snapshot for rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueView {
    pub current_track: Option<Track>,
    pub current_index: Option<usize>,
    pub total: usize,
    pub items: Vec<Track>,
    pub upcoming: Vec<Track>,
    pub played: Vec<Track>,
}

impl QueueView {
    pub(crate) fn new(queue: &Queue, current_track: Option<&Track>) -> Self {
        Self {
            current_track: current_track.cloned(),
            current_index: queue.current_index(),
            total: queue.len(),
            items: queue.items().to_vec(),
            upcoming: queue.upcoming().to_vec(),
            played: queue.played().to_vec(),
        }
    }
}
