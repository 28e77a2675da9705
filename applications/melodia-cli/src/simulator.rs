//! Simulated media backend
//!
//! Stands in for a browser `<audio>` element so the controller can be driven
//! from a terminal. Commands are recorded immediately; their outcomes are
//! reported as [`MediaEvent`]s the next time the clock is advanced with
//! [`SimulatorHandle::tick`], mimicking the asynchronous element.
//!
//! URLs that are not `http://`, `https://` or `file://` fail with
//! `NotSupported` once their load latency elapses.

use melodia_playback::{
    LoadGeneration, LoadRequest, MediaError, MediaErrorKind, MediaEvent, MediaEventKind,
    MediaHandle,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::trace;

/// Simulated decoder timings
#[derive(Debug, Clone, Copy)]
pub struct SimulatorSettings {
    /// Time from `load` until the source reports it can play
    pub load_latency: Duration,

    /// Duration used for URLs without a hint
    pub default_duration_secs: f64,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            load_latency: Duration::from_millis(300),
            default_duration_secs: 30.0,
        }
    }
}

/// Media handle owned by the controller
pub struct SimulatedMedia {
    state: Arc<Mutex<SimState>>,
}

/// Clock and inspection side of the simulator, kept by the event loop
#[derive(Clone)]
pub struct SimulatorHandle {
    state: Arc<Mutex<SimState>>,
}

struct SimState {
    settings: SimulatorSettings,
    durations: HashMap<String, f64>,
    source: Option<LoadedSource>,
    pending: Vec<MediaEvent>,
    volume: f32,
    muted: bool,
    looping: bool,
}

struct LoadedSource {
    generation: LoadGeneration,
    url: String,
    duration_secs: f64,
    buffered: Duration,
    ready: bool,
    failed: bool,
    play_pending: bool,
    playing: bool,
    position_secs: f64,
}

impl SimulatedMedia {
    /// Create a backend and the handle that drives it
    pub fn new(settings: SimulatorSettings) -> (Self, SimulatorHandle) {
        let state = Arc::new(Mutex::new(SimState {
            settings,
            durations: HashMap::new(),
            source: None,
            pending: Vec::new(),
            volume: 1.0,
            muted: false,
            looping: false,
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            SimulatorHandle { state },
        )
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn is_supported(url: &str) -> bool {
    ["http://", "https://", "file://"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
}

impl SimState {
    fn emit(&mut self, generation: LoadGeneration, kind: MediaEventKind) {
        self.pending.push(MediaEvent::new(generation, kind));
    }

    /// Reject a play that was waiting on the current source
    fn abort_pending_play(&mut self) {
        let aborted = match self.source.as_mut() {
            Some(source) if source.play_pending => {
                source.play_pending = false;
                Some(source.generation)
            }
            _ => None,
        };
        if let Some(generation) = aborted {
            self.emit(
                generation,
                MediaEventKind::PlayRejected(MediaError::aborted()),
            );
        }
    }

    fn advance(&mut self, elapsed: Duration) {
        let latency = self.settings.load_latency;
        let looping = self.looping;
        let mut events = Vec::new();

        let Some(source) = self.source.as_mut() else {
            return;
        };
        let generation = source.generation;

        if !source.ready && !source.failed {
            source.buffered += elapsed;
            if source.buffered < latency {
                return;
            }

            if !is_supported(&source.url) {
                source.failed = true;
                source.play_pending = false;
                events.push(MediaEventKind::Failed(MediaError::new(
                    MediaErrorKind::NotSupported,
                    format!("Unsupported source: {}", source.url),
                )));
            } else {
                source.ready = true;
                events.push(MediaEventKind::MetadataLoaded {
                    duration_secs: source.duration_secs,
                });
                events.push(MediaEventKind::Ready);
                if source.play_pending {
                    source.play_pending = false;
                    source.playing = true;
                    events.push(MediaEventKind::PlayResolved);
                }
            }
        } else if source.playing {
            source.position_secs += elapsed.as_secs_f64();
            if source.position_secs >= source.duration_secs {
                if looping {
                    source.position_secs = 0.0;
                    events.push(MediaEventKind::TimeUpdate { position_secs: 0.0 });
                } else {
                    source.position_secs = source.duration_secs;
                    source.playing = false;
                    events.push(MediaEventKind::TimeUpdate {
                        position_secs: source.duration_secs,
                    });
                    events.push(MediaEventKind::Ended);
                }
            } else {
                events.push(MediaEventKind::TimeUpdate {
                    position_secs: source.position_secs,
                });
            }
        }

        for kind in events {
            self.emit(generation, kind);
        }
    }
}

impl MediaHandle for SimulatedMedia {
    fn load(&mut self, request: LoadRequest) -> Result<(), MediaError> {
        let mut state = self.state();
        state.abort_pending_play();

        let duration_secs = state
            .durations
            .get(&request.url)
            .copied()
            .unwrap_or(state.settings.default_duration_secs);

        trace!(generation = %request.generation, url = %request.url, "Simulated load");
        state.source = Some(LoadedSource {
            generation: request.generation,
            url: request.url,
            duration_secs,
            buffered: Duration::ZERO,
            ready: false,
            failed: false,
            play_pending: false,
            playing: false,
            position_secs: 0.0,
        });
        state.emit(request.generation, MediaEventKind::LoadStarted);
        Ok(())
    }

    fn play(&mut self, generation: LoadGeneration) -> Result<(), MediaError> {
        let mut state = self.state();
        let source = match state.source.as_mut() {
            Some(source) if source.generation == generation => source,
            _ => return Err(MediaError::aborted()),
        };

        if source.failed {
            return Err(MediaError::new(
                MediaErrorKind::NotSupported,
                format!("Source failed to load: {}", source.url),
            ));
        }

        if source.ready {
            source.playing = true;
            state.emit(generation, MediaEventKind::PlayResolved);
        } else {
            source.play_pending = true;
        }
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.state();
        state.abort_pending_play();
        if let Some(source) = state.source.as_mut() {
            source.playing = false;
        }
    }

    fn reset(&mut self) {
        let mut state = self.state();
        state.abort_pending_play();
        state.source = None;
    }

    fn seek(&mut self, position_secs: f64) {
        if let Some(source) = self.state().source.as_mut() {
            source.position_secs = position_secs.clamp(0.0, source.duration_secs);
        }
    }

    fn set_volume(&mut self, fraction: f32) {
        self.state().volume = fraction.clamp(0.0, 1.0);
    }

    fn set_muted(&mut self, muted: bool) {
        self.state().muted = muted;
    }

    fn set_looping(&mut self, looping: bool) {
        self.state().looping = looping;
    }
}

impl SimulatorHandle {
    /// Advance simulated time and collect the events it produced
    ///
    /// Also returns events queued by commands since the last tick.
    pub fn tick(&self, elapsed: Duration) -> Vec<MediaEvent> {
        let mut state = lock(&self.state);
        state.advance(elapsed);
        std::mem::take(&mut state.pending)
    }

    /// Register the duration of the resource behind `url`
    pub fn set_duration_hint(&self, url: impl Into<String>, duration_secs: f64) {
        if duration_secs.is_finite() && duration_secs > 0.0 {
            lock(&self.state).durations.insert(url.into(), duration_secs);
        }
    }

    pub fn volume(&self) -> f32 {
        lock(&self.state).volume
    }

    pub fn is_muted(&self) -> bool {
        lock(&self.state).muted
    }

    pub fn is_looping(&self) -> bool {
        lock(&self.state).looping
    }

    /// Generation of the attached source, if any
    pub fn generation(&self) -> Option<LoadGeneration> {
        lock(&self.state).source.as_ref().map(|s| s.generation)
    }
}
