//! Deterministic fakes for exercising the controller without a media backend
//!
//! [`ScriptedMedia`] records every command it receives and never emits events
//! on its own; tests deliver events explicitly, in whatever order the race
//! under test requires.

use crate::error::MediaError;
use crate::media::{LoadGeneration, LoadRequest, MediaEvent, MediaEventKind, MediaHandle};
use crate::sink::{HistorySink, HistorySinkError};
use std::sync::{Arc, Mutex};

/// A command received by [`ScriptedMedia`]
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    Load(LoadRequest),
    Play(LoadGeneration),
    Pause,
    Reset,
    Seek(f64),
    SetVolume(f32),
    SetMuted(bool),
    SetLooping(bool),
}

/// Command-recording media handle
#[derive(Debug, Default)]
pub struct ScriptedMedia {
    commands: Vec<MediaCommand>,
    last_load: Option<LoadRequest>,
    fail_next_load: Option<MediaError>,
    fail_next_play: Option<MediaError>,
    volume: f32,
    muted: bool,
    looping: bool,
    position: f64,
}

impl ScriptedMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[MediaCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Most recent source assignment
    pub fn last_load(&self) -> Option<&LoadRequest> {
        self.last_load.as_ref()
    }

    /// Generation of the most recent load
    pub fn current_generation(&self) -> Option<LoadGeneration> {
        self.last_load.as_ref().map(|request| request.generation)
    }

    /// Build an event for the most recent load
    pub fn event(&self, kind: MediaEventKind) -> MediaEvent {
        MediaEvent::new(self.current_generation().unwrap_or_default(), kind)
    }

    pub fn load_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, MediaCommand::Load(_)))
            .count()
    }

    pub fn play_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, MediaCommand::Play(_)))
            .count()
    }

    /// Make the next `load` fail synchronously
    pub fn fail_next_load(&mut self, error: MediaError) {
        self.fail_next_load = Some(error);
    }

    /// Make the next `play` fail synchronously
    pub fn fail_next_play(&mut self, error: MediaError) {
        self.fail_next_play = Some(error);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn position(&self) -> f64 {
        self.position
    }
}

impl MediaHandle for ScriptedMedia {
    fn load(&mut self, request: LoadRequest) -> Result<(), MediaError> {
        self.commands.push(MediaCommand::Load(request.clone()));
        if let Some(error) = self.fail_next_load.take() {
            return Err(error);
        }
        self.position = 0.0;
        self.last_load = Some(request);
        Ok(())
    }

    fn play(&mut self, generation: LoadGeneration) -> Result<(), MediaError> {
        self.commands.push(MediaCommand::Play(generation));
        match self.fail_next_play.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn pause(&mut self) {
        self.commands.push(MediaCommand::Pause);
    }

    fn reset(&mut self) {
        self.commands.push(MediaCommand::Reset);
        self.position = 0.0;
    }

    fn seek(&mut self, position_secs: f64) {
        self.commands.push(MediaCommand::Seek(position_secs));
        self.position = position_secs;
    }

    fn set_volume(&mut self, fraction: f32) {
        self.commands.push(MediaCommand::SetVolume(fraction));
        self.volume = fraction;
    }

    fn set_muted(&mut self, muted: bool) {
        self.commands.push(MediaCommand::SetMuted(muted));
        self.muted = muted;
    }

    fn set_looping(&mut self, looping: bool) {
        self.commands.push(MediaCommand::SetLooping(looping));
        self.looping = looping;
    }
}

/// History sink that keeps every `(user_id, track_id)` pair
///
/// Clones share the same record list.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistorySink {
    records: Arc<Mutex<Vec<(String, String)>>>,
    failing: bool,
}

impl MemoryHistorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that records nothing and rejects every event
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<(String, String)> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Recorded track ids in order
    pub fn track_ids(&self) -> Vec<String> {
        self.records().into_iter().map(|(_, track)| track).collect()
    }
}

impl HistorySink for MemoryHistorySink {
    fn record_play(&self, user_id: &str, track_id: &str) -> Result<(), HistorySinkError> {
        if self.failing {
            return Err(HistorySinkError("history service unavailable".to_string()));
        }
        if let Ok(mut records) = self.records.lock() {
            records.push((user_id.to_string(), track_id.to_string()));
        }
        Ok(())
    }
}
