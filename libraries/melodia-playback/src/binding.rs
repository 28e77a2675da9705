//! Media binding - owns the media handle and its per-load state machine
//!
//! ```text
//! IDLE ──load──▶ LOADING ──ready──▶ READY ──play ok──▶ PLAYING ⇄ PAUSED
//!                   │                  │                  │
//!                   └──────── failure / timeout ──────────┴──▶ ERROR
//! ```
//!
//! Every load bumps the generation. Events stamped with an older generation
//! are discarded, which is the only cancellation mechanism: in-flight work on
//! the handle is never actively aborted.

use crate::error::{MediaError, MediaErrorKind};
use crate::media::{LoadGeneration, LoadRequest, MediaEvent, MediaEventKind, MediaHandle};
use crate::types::MediaState;
use std::time::Duration;
use tracing::{debug, warn};

/// What the controller must react to after an event
#[derive(Debug, Clone, PartialEq)]
pub enum BindingSignal {
    LoadStarted,

    /// Duration accepted (finite, non-negative)
    Metadata { duration_secs: f64 },

    /// Entered READY; `autoplay` tells whether a play command was issued
    Ready { autoplay: bool },

    Position { position_secs: f64 },

    /// Playback confirmed by the backend
    ///
    /// `record_history` is set on the first start of a load whose history
    /// event has not been fired yet.
    Started { record_history: bool },

    /// Transport failure; the load is dead until reloaded
    Failed(MediaError),

    /// Natural end of media
    Ended,
}

/// Outcome of a user play request
#[derive(Debug, Clone, PartialEq)]
pub enum PlayCommand {
    /// Play issued to the handle
    Issued,

    /// A load is pending; READY will honour the intent
    Deferred,

    AlreadyPlaying,

    /// Previous load failed, the track must be loaded again
    NeedsReload,

    /// Nothing loaded
    Unavailable,

    /// Handle refused the command synchronously
    Failed(MediaError),
}

#[derive(Debug, Clone, Copy)]
struct OutputSettings {
    volume: f32,
    muted: bool,
    looping: bool,
}

/// Single owner of a [`MediaHandle`]
#[derive(Debug)]
pub struct MediaBinding<M> {
    handle: M,
    state: MediaState,
    generation: LoadGeneration,
    load_started_at: Option<Duration>,

    /// A `play()` promise for this load is outstanding
    awaiting_play: bool,

    /// Playback of this load has been confirmed at least once
    started: bool,

    /// The history event for this load has already been fired
    history_recorded: bool,

    output: OutputSettings,
}

impl<M: MediaHandle> MediaBinding<M> {
    pub fn new(handle: M, volume: f32) -> Self {
        let mut binding = Self {
            handle,
            state: MediaState::Idle,
            generation: LoadGeneration::default(),
            load_started_at: None,
            awaiting_play: false,
            started: false,
            history_recorded: false,
            output: OutputSettings {
                volume: volume.clamp(0.0, 1.0),
                muted: false,
                looping: false,
            },
        };
        binding.apply_output();
        binding
    }

    pub fn state(&self) -> MediaState {
        self.state
    }

    pub fn generation(&self) -> LoadGeneration {
        self.generation
    }

    pub fn handle(&self) -> &M {
        &self.handle
    }

    /// Supersede whatever is loaded and start loading `url`
    pub fn load(&mut self, url: String, now: Duration) -> Result<LoadGeneration, MediaError> {
        if self.state != MediaState::Idle {
            self.handle.reset();
        }

        self.generation = self.generation.next();
        self.state = MediaState::Loading;
        self.load_started_at = Some(now);
        self.awaiting_play = false;
        self.started = false;
        self.history_recorded = false;

        debug!(generation = %self.generation, url = %url, "Loading media");

        let request = LoadRequest {
            generation: self.generation,
            url,
        };
        if let Err(e) = self.handle.load(request) {
            self.state = MediaState::Error;
            self.load_started_at = None;
            return Err(e);
        }

        self.apply_output();
        Ok(self.generation)
    }

    /// Detach the source; pending events become stale
    pub fn unload(&mut self) {
        if self.state != MediaState::Idle {
            self.handle.reset();
        }
        self.generation = self.generation.next();
        self.state = MediaState::Idle;
        self.load_started_at = None;
        self.awaiting_play = false;
        self.started = false;
        self.history_recorded = false;
    }

    pub fn mark_history_recorded(&mut self) {
        self.history_recorded = true;
    }

    /// User asked to (re)start playback
    pub fn play(&mut self) -> PlayCommand {
        match self.state {
            MediaState::Idle => PlayCommand::Unavailable,
            MediaState::Loading => PlayCommand::Deferred,
            MediaState::Error => PlayCommand::NeedsReload,
            MediaState::Playing => PlayCommand::AlreadyPlaying,
            MediaState::Ready | MediaState::Paused => {
                if self.awaiting_play {
                    return PlayCommand::Issued;
                }
                match self.issue_play() {
                    Ok(()) => PlayCommand::Issued,
                    Err(e) => {
                        self.fail(e.clone());
                        PlayCommand::Failed(e)
                    }
                }
            }
        }
    }

    /// User asked to pause
    ///
    /// While loading nothing is sent to the handle; the intent is applied at READY.
    pub fn pause(&mut self) {
        match self.state {
            MediaState::Playing | MediaState::Ready | MediaState::Paused => {
                self.handle.pause();
                self.awaiting_play = false;
                if self.state == MediaState::Playing {
                    self.state = MediaState::Paused;
                }
            }
            MediaState::Idle | MediaState::Loading | MediaState::Error => {}
        }
    }

    /// Rewind and play again without starting a new load (repeat one)
    pub fn restart(&mut self) -> Option<BindingSignal> {
        self.handle.seek(0.0);
        match self.issue_play() {
            Ok(()) => None,
            Err(e) => self.fail(e),
        }
    }

    pub fn seek(&mut self, position_secs: f64) {
        self.handle.seek(position_secs);
    }

    pub fn set_volume(&mut self, fraction: f32) {
        self.output.volume = fraction.clamp(0.0, 1.0);
        self.handle.set_volume(self.output.volume);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.output.muted = muted;
        self.handle.set_muted(muted);
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.output.looping = looping;
        self.handle.set_looping(looping);
    }

    /// Process one backend event
    ///
    /// `wants_play` is the controller's intended playing state, consulted
    /// when the load becomes ready.
    pub fn handle_event(&mut self, event: MediaEvent, wants_play: bool) -> Option<BindingSignal> {
        if event.generation != self.generation {
            debug!(
                event_generation = %event.generation,
                current_generation = %self.generation,
                kind = ?event.kind,
                "Discarding stale media event"
            );
            return None;
        }

        match event.kind {
            MediaEventKind::LoadStarted => {
                (self.state == MediaState::Loading).then_some(BindingSignal::LoadStarted)
            }
            MediaEventKind::MetadataLoaded { duration_secs } => {
                if duration_secs.is_finite() && duration_secs >= 0.0 {
                    Some(BindingSignal::Metadata { duration_secs })
                } else {
                    debug!(duration_secs, "Ignoring unusable duration");
                    None
                }
            }
            MediaEventKind::Ready => self.on_ready(wants_play),
            MediaEventKind::TimeUpdate { position_secs } => (position_secs.is_finite()
                && position_secs >= 0.0)
                .then_some(BindingSignal::Position { position_secs }),
            MediaEventKind::PlayResolved => {
                if !self.awaiting_play {
                    debug!(generation = %self.generation, "Play resolved after being withdrawn");
                    return None;
                }
                self.awaiting_play = false;
                self.state = MediaState::Playing;
                let first_start = !self.started;
                self.started = true;
                let record_history = first_start && !self.history_recorded;
                if record_history {
                    self.history_recorded = true;
                }
                Some(BindingSignal::Started { record_history })
            }
            MediaEventKind::PlayRejected(error) => {
                self.awaiting_play = false;
                self.fail(error)
            }
            MediaEventKind::Failed(error) => self.fail(error),
            MediaEventKind::Ended => {
                if matches!(self.state, MediaState::Playing | MediaState::Paused) {
                    self.state = MediaState::Paused;
                    Some(BindingSignal::Ended)
                } else {
                    None
                }
            }
        }
    }

    /// Fail a load that has been pending longer than `timeout`
    pub fn check_timeout(&mut self, now: Duration, timeout: Duration) -> Option<BindingSignal> {
        if self.state != MediaState::Loading {
            return None;
        }
        let started_at = self.load_started_at?;
        if now.saturating_sub(started_at) < timeout {
            return None;
        }

        self.handle.pause();
        self.fail(MediaError::new(
            MediaErrorKind::TimedOut,
            format!("load did not become ready within {}s", timeout.as_secs_f64()),
        ))
    }

    fn on_ready(&mut self, wants_play: bool) -> Option<BindingSignal> {
        // canplay also fires after seeks; only the first one ends the load
        if self.state != MediaState::Loading {
            return None;
        }
        self.state = MediaState::Ready;
        self.load_started_at = None;

        if !wants_play {
            return Some(BindingSignal::Ready { autoplay: false });
        }

        match self.issue_play() {
            Ok(()) => Some(BindingSignal::Ready { autoplay: true }),
            Err(e) => self.fail(e),
        }
    }

    fn issue_play(&mut self) -> Result<(), MediaError> {
        self.awaiting_play = true;
        let result = self.handle.play(self.generation);
        if result.is_err() {
            self.awaiting_play = false;
        }
        result
    }

    fn fail(&mut self, error: MediaError) -> Option<BindingSignal> {
        if error.is_cancellation() {
            debug!(generation = %self.generation, error = %error, "Play attempt cancelled");
            return None;
        }

        warn!(generation = %self.generation, error = %error, "Media transport failure");
        self.state = MediaState::Error;
        self.load_started_at = None;
        self.awaiting_play = false;
        Some(BindingSignal::Failed(error))
    }

    fn apply_output(&mut self) {
        self.handle.set_volume(self.output.volume);
        self.handle.set_muted(self.output.muted);
        self.handle.set_looping(self.output.looping);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MediaCommand, ScriptedMedia};

    fn binding() -> MediaBinding<ScriptedMedia> {
        MediaBinding::new(ScriptedMedia::new(), 0.7)
    }

    fn event(generation: LoadGeneration, kind: MediaEventKind) -> MediaEvent {
        MediaEvent::new(generation, kind)
    }

    #[test]
    fn load_bumps_generation() {
        let mut binding = binding();
        let first = binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        let second = binding.load("https://a/2.mp3".into(), Duration::ZERO).unwrap();
        assert!(second > first);
        assert_eq!(binding.state(), MediaState::Loading);
    }

    #[test]
    fn reload_resets_previous_source() {
        let mut binding = binding();
        binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        binding.handle.clear_commands();
        binding.load("https://a/2.mp3".into(), Duration::ZERO).unwrap();
        assert_eq!(binding.handle().commands()[0], MediaCommand::Reset);
    }

    #[test]
    fn ready_autoplays_when_wanted() {
        let mut binding = binding();
        let gen = binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        let signal = binding.handle_event(event(gen, MediaEventKind::Ready), true);
        assert_eq!(signal, Some(BindingSignal::Ready { autoplay: true }));
        assert_eq!(binding.handle().play_count(), 1);
    }

    #[test]
    fn ready_without_intent_stays_paused() {
        let mut binding = binding();
        let gen = binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        let signal = binding.handle_event(event(gen, MediaEventKind::Ready), false);
        assert_eq!(signal, Some(BindingSignal::Ready { autoplay: false }));
        assert_eq!(binding.handle().play_count(), 0);
        assert_eq!(binding.state(), MediaState::Ready);
    }

    #[test]
    fn second_ready_is_ignored() {
        let mut binding = binding();
        let gen = binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        binding.handle_event(event(gen, MediaEventKind::Ready), true);
        assert_eq!(binding.handle_event(event(gen, MediaEventKind::Ready), true), None);
        assert_eq!(binding.handle().play_count(), 1);
    }

    #[test]
    fn stale_events_are_dropped() {
        let mut binding = binding();
        let old = binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        binding.load("https://a/2.mp3".into(), Duration::ZERO).unwrap();

        assert_eq!(binding.handle_event(event(old, MediaEventKind::Ready), true), None);
        assert_eq!(binding.state(), MediaState::Loading);
        assert_eq!(binding.handle().play_count(), 0);
    }

    #[test]
    fn play_is_deferred_while_loading() {
        let mut binding = binding();
        binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        assert_eq!(binding.play(), PlayCommand::Deferred);
        assert_eq!(binding.handle().play_count(), 0);
    }

    #[test]
    fn first_start_requests_history_once() {
        let mut binding = binding();
        let gen = binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        binding.handle_event(event(gen, MediaEventKind::Ready), true);
        assert_eq!(
            binding.handle_event(event(gen, MediaEventKind::PlayResolved), true),
            Some(BindingSignal::Started { record_history: true })
        );

        binding.pause();
        assert_eq!(binding.play(), PlayCommand::Issued);
        assert_eq!(
            binding.handle_event(event(gen, MediaEventKind::PlayResolved), true),
            Some(BindingSignal::Started { record_history: false })
        );
    }

    #[test]
    fn history_already_recorded_is_not_repeated() {
        let mut binding = binding();
        let gen = binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        binding.mark_history_recorded();
        binding.handle_event(event(gen, MediaEventKind::Ready), true);
        assert_eq!(
            binding.handle_event(event(gen, MediaEventKind::PlayResolved), true),
            Some(BindingSignal::Started { record_history: false })
        );
    }

    #[test]
    fn cancellation_is_swallowed() {
        let mut binding = binding();
        let gen = binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        binding.handle_event(event(gen, MediaEventKind::Ready), true);
        let signal = binding.handle_event(
            event(gen, MediaEventKind::PlayRejected(MediaError::aborted())),
            true,
        );
        assert_eq!(signal, None);
        assert_ne!(binding.state(), MediaState::Error);
    }

    #[test]
    fn transport_failure_enters_error() {
        let mut binding = binding();
        let gen = binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        let error = MediaError::new(MediaErrorKind::Network, "connection reset");
        let signal = binding.handle_event(event(gen, MediaEventKind::Failed(error.clone())), true);
        assert_eq!(signal, Some(BindingSignal::Failed(error)));
        assert_eq!(binding.state(), MediaState::Error);
        assert_eq!(binding.play(), PlayCommand::NeedsReload);
    }

    #[test]
    fn withdrawn_play_resolution_is_ignored() {
        let mut binding = binding();
        let gen = binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        binding.handle_event(event(gen, MediaEventKind::Ready), true);
        binding.pause();
        assert_eq!(binding.handle_event(event(gen, MediaEventKind::PlayResolved), true), None);
        assert_ne!(binding.state(), MediaState::Playing);
    }

    #[test]
    fn unusable_durations_are_rejected() {
        let mut binding = binding();
        let gen = binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        for bad in [f64::NAN, f64::INFINITY, -1.0] {
            let kind = MediaEventKind::MetadataLoaded { duration_secs: bad };
            assert_eq!(binding.handle_event(event(gen, kind), true), None);
        }
        let kind = MediaEventKind::MetadataLoaded { duration_secs: 200.5 };
        assert_eq!(
            binding.handle_event(event(gen, kind), true),
            Some(BindingSignal::Metadata { duration_secs: 200.5 })
        );
    }

    #[test]
    fn timeout_fails_pending_load() {
        let mut binding = binding();
        binding.load("https://a/1.mp3".into(), Duration::from_secs(10)).unwrap();
        let timeout = Duration::from_secs(15);

        assert_eq!(binding.check_timeout(Duration::from_secs(24), timeout), None);
        let signal = binding.check_timeout(Duration::from_secs(25), timeout);
        assert!(matches!(
            signal,
            Some(BindingSignal::Failed(MediaError { kind: MediaErrorKind::TimedOut, .. }))
        ));
        assert_eq!(binding.state(), MediaState::Error);
    }

    #[test]
    fn no_timeout_after_ready() {
        let mut binding = binding();
        let gen = binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        binding.handle_event(event(gen, MediaEventKind::Ready), false);
        assert_eq!(binding.check_timeout(Duration::from_secs(60), Duration::from_secs(15)), None);
    }

    #[test]
    fn synchronous_load_failure_enters_error() {
        let mut binding = binding();
        binding
            .handle
            .fail_next_load(MediaError::new(MediaErrorKind::NotSupported, "no decoder"));
        assert!(binding.load("https://a/1.flac".into(), Duration::ZERO).is_err());
        assert_eq!(binding.state(), MediaState::Error);
    }

    #[test]
    fn synchronous_play_failure_enters_error() {
        let mut binding = binding();
        let gen = binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        binding.handle_event(event(gen, MediaEventKind::Ready), false);
        binding
            .handle
            .fail_next_play(MediaError::new(MediaErrorKind::NotAllowed, "autoplay blocked"));
        assert!(matches!(binding.play(), PlayCommand::Failed(_)));
        assert_eq!(binding.state(), MediaState::Error);
    }

    #[test]
    fn restart_rewinds_and_plays_same_load() {
        let mut binding = binding();
        let gen = binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        binding.handle_event(event(gen, MediaEventKind::Ready), true);
        binding.handle_event(event(gen, MediaEventKind::PlayResolved), true);
        binding.handle_event(event(gen, MediaEventKind::Ended), true);
        binding.handle.clear_commands();

        assert_eq!(binding.restart(), None);
        assert_eq!(
            binding.handle().commands(),
            &[MediaCommand::Seek(0.0), MediaCommand::Play(gen)]
        );
        assert_eq!(binding.generation(), gen);
        assert_eq!(
            binding.handle_event(event(gen, MediaEventKind::PlayResolved), true),
            Some(BindingSignal::Started { record_history: false })
        );
    }

    #[test]
    fn output_settings_survive_reload() {
        let mut binding = binding();
        binding.set_volume(0.25);
        binding.set_looping(true);
        binding.load("https://a/1.mp3".into(), Duration::ZERO).unwrap();
        assert!((binding.handle().volume() - 0.25).abs() < f32::EPSILON);
        assert!(binding.handle().is_looping());
    }
}
