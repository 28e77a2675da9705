//! Playback controller - core orchestration
//!
//! Ties the queue and playback mode to the media binding. The controller is
//! the single writer of queue and player state; the UI reads snapshots and
//! drains [`PlaybackEvent`]s, and the platform layer feeds media events in
//! through [`PlaybackController::handle_media_event`].

use crate::{
    binding::{BindingSignal, MediaBinding, PlayCommand},
    clock::Clock,
    error::MediaError,
    events::PlaybackEvent,
    history::RecentlyPlayed,
    media::{MediaEvent, MediaHandle},
    queue::{Queue, QueueView},
    sink::{HistorySink, SessionProvider},
    source::{StreamResolver, TrackStreamUrl},
    types::{MediaState, PlaybackConfig, PlaybackMode, PlayerState, RepeatMode, Track},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

/// Central playback management
///
/// Orchestrates:
/// - Queue replacement and cursor transitions (next/previous/wrap/shuffle)
/// - Media handle synchronization (load guard, deferred play, failures)
/// - History sink notifications
/// - Volume, mute, seek and repeat/shuffle modes
pub struct PlaybackController<M: MediaHandle> {
    // State
    queue: Queue,
    mode: PlaybackMode,
    player: PlayerState,
    recent: RecentlyPlayed,

    // Media
    binding: MediaBinding<M>,

    // Collaborators
    history_sink: Box<dyn HistorySink>,
    session: Box<dyn SessionProvider>,
    resolver: Box<dyn StreamResolver>,
    clock: Box<dyn Clock>,
    rng: StdRng,

    config: PlaybackConfig,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
    last_state: Option<(MediaState, bool, bool)>,
}

impl<M: MediaHandle> PlaybackController<M> {
    /// Create new playback controller
    ///
    /// Uses the track's own stream URL, a monotonic clock and an
    /// entropy-seeded shuffle RNG; see the `with_*` methods to replace them.
    pub fn new(
        config: PlaybackConfig,
        media: M,
        history_sink: impl HistorySink + 'static,
        session: impl SessionProvider + 'static,
    ) -> Self {
        let player = PlayerState::new(config.volume);
        let binding = MediaBinding::new(media, player.volume_fraction());

        let mut controller = Self {
            queue: Queue::new(),
            mode: config.mode(),
            player,
            recent: RecentlyPlayed::new(config.history_size.max(1)),
            binding,
            history_sink: Box::new(history_sink),
            session: Box::new(session),
            resolver: Box::new(TrackStreamUrl),
            clock: default_clock(),
            rng: StdRng::from_entropy(),
            config,
            pending_events: Vec::new(),
            last_state: None,
        };
        controller
            .binding
            .set_looping(controller.mode.repeat == RepeatMode::One);
        controller
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: impl StreamResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Deterministic shuffle selection
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // ===== Transport =====

    /// Play `track`, replacing the queue with `list` and the cursor with `index`
    ///
    /// An out-of-range `index` selects the first item. This is the only
    /// command that replaces the queue contents.
    pub fn play(&mut self, track: impl Into<Option<Track>>, list: Vec<Track>, index: usize) {
        self.queue.replace(list, index);
        self.emit_queue_changed();

        match track.into() {
            Some(track) => {
                info!(track_id = %track.id, title = %track.title, "Play requested");
                self.player.is_playing = true;
                self.recent.push(track.clone());
                let track_id = track.id.clone();
                self.select_track(Some(track));
                self.binding.mark_history_recorded();
                self.record_history(&track_id);
            }
            None => {
                self.player.is_playing = false;
                self.select_track(None);
            }
        }
        self.emit_state();
    }

    /// Advance to the next track
    ///
    /// Returns `false` when the rules leave the cursor in place (empty queue,
    /// repeat one, or end of queue without repeat all).
    pub fn next(&mut self) -> bool {
        match self.queue.next_index(self.mode, &mut self.rng) {
            Some(index) => {
                self.jump_to(index);
                true
            }
            None => false,
        }
    }

    /// Go back one track
    ///
    /// Always moves the cursor: there is no "restart the current track" rule.
    pub fn previous(&mut self) -> bool {
        match self.queue.previous_index(self.mode) {
            Some(index) => {
                self.jump_to(index);
                true
            }
            None => false,
        }
    }

    /// Clear the current track; the queue is left intact
    pub fn stop(&mut self) {
        info!("Playback stopped");
        self.player.is_playing = false;
        self.select_track(None);
        self.emit_state();
    }

    pub fn toggle_play_pause(&mut self) {
        if self.player.current_track.is_none() {
            return;
        }
        if self.player.is_playing {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// Pause playback (intent only while a load is pending)
    pub fn pause(&mut self) {
        if self.player.current_track.is_none() {
            return;
        }
        self.player.is_playing = false;
        self.binding.pause();
        self.emit_state();
    }

    /// Resume playback of the current track
    ///
    /// A failed track is loaded again; a pending load honours the intent
    /// once it becomes ready.
    pub fn resume(&mut self) {
        let Some(track) = self.player.current_track.clone() else {
            return;
        };
        self.player.is_playing = true;

        match self.binding.play() {
            PlayCommand::Issued | PlayCommand::Deferred | PlayCommand::AlreadyPlaying => {}
            PlayCommand::NeedsReload => {
                debug!(track_id = %track.id, "Retrying failed track");
                self.start_load(&track);
            }
            PlayCommand::Unavailable => {
                self.player.is_playing = false;
            }
            PlayCommand::Failed(error) if error.is_cancellation() => {}
            PlayCommand::Failed(error) => self.transport_failed(error),
        }
        self.emit_state();
    }

    /// Set the position, clamped to `[0, duration]`
    ///
    /// Mirrored into player state immediately without waiting for the handle.
    pub fn seek(&mut self, position_secs: f64) {
        if self.player.current_track.is_none() || self.binding.state() == MediaState::Idle {
            return;
        }
        if !position_secs.is_finite() {
            return;
        }

        let position = position_secs.clamp(0.0, self.player.duration_seconds.max(0.0));
        self.binding.seek(position);
        self.player.current_time_seconds = position;
        self.emit_position();
    }

    // ===== Volume =====

    /// Set volume, clamped to 0-100
    ///
    /// A non-zero level also unmutes.
    pub fn set_volume(&mut self, level: i32) {
        let level = level.clamp(0, 100) as u8;
        self.player.volume = level;
        self.binding.set_volume(self.player.volume_fraction());
        if level > 0 && self.player.is_muted {
            self.player.is_muted = false;
            self.binding.set_muted(false);
        }
        self.emit_volume();
    }

    pub fn toggle_mute(&mut self) {
        self.player.is_muted = !self.player.is_muted;
        self.binding.set_muted(self.player.is_muted);
        self.emit_volume();
    }

    // ===== Modes =====

    /// Cycle repeat: Off → All → One → Off
    pub fn toggle_repeat(&mut self) {
        self.set_repeat(self.mode.repeat.cycle());
    }

    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        self.mode.repeat = repeat;
        self.binding.set_looping(repeat == RepeatMode::One);
        self.emit_mode();
    }

    /// Flip shuffle; the queue order is never changed
    pub fn toggle_shuffle(&mut self) {
        self.mode.shuffle = !self.mode.shuffle;
        self.emit_mode();
    }

    // ===== Queue Management =====

    /// Append a track to the end of the queue
    pub fn add_to_queue(&mut self, track: Track) {
        self.queue.push(track);
        self.emit_queue_changed();
    }

    /// Empty the queue; the current track keeps playing
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.emit_queue_changed();
    }

    // ===== Media Events =====

    /// Feed a lifecycle event from the media handle
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        let Some(signal) = self.binding.handle_event(event, self.player.is_playing) else {
            return;
        };

        match signal {
            BindingSignal::LoadStarted => {
                self.player.is_loading = true;
                self.player.current_time_seconds = 0.0;
                self.player.duration_seconds = 0.0;
                self.emit_position();
            }
            BindingSignal::Metadata { duration_secs } => {
                self.player.duration_seconds = duration_secs;
                self.emit_position();
            }
            BindingSignal::Ready { autoplay } => {
                debug!(autoplay, "Media ready");
                self.player.is_loading = false;
            }
            BindingSignal::Position { position_secs } => {
                self.player.current_time_seconds = position_secs;
                self.emit_position();
            }
            BindingSignal::Started { record_history } => {
                self.player.is_playing = true;
                if record_history {
                    if let Some(track_id) = self.player.current_track.as_ref().map(|t| t.id.clone()) {
                        self.record_history(&track_id);
                    }
                }
            }
            BindingSignal::Failed(error) => self.transport_failed(error),
            BindingSignal::Ended => self.track_ended(),
        }
        self.emit_state();
    }

    /// Fail a load that has stalled past the configured timeout
    ///
    /// Call periodically from the host's event loop.
    pub fn poll(&mut self) {
        let Some(timeout) = self.config.load_timeout() else {
            return;
        };
        if let Some(BindingSignal::Failed(error)) =
            self.binding.check_timeout(self.clock.now(), timeout)
        {
            self.transport_failed(error);
            self.emit_state();
        }
    }

    // ===== State Queries =====

    pub fn get_player(&self) -> &PlayerState {
        &self.player
    }

    pub fn get_current_track(&self) -> Option<&Track> {
        self.player.current_track.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing
    }

    pub fn get_volume(&self) -> u8 {
        self.player.volume
    }

    pub fn is_muted(&self) -> bool {
        self.player.is_muted
    }

    pub fn get_mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn get_repeat(&self) -> RepeatMode {
        self.mode.repeat
    }

    pub fn is_shuffled(&self) -> bool {
        self.mode.shuffle
    }

    pub fn get_queue(&self) -> &Queue {
        &self.queue
    }

    /// Snapshot of the queue split around the cursor
    pub fn queue_view(&self) -> QueueView {
        QueueView::new(&self.queue, self.player.current_track.as_ref())
    }

    pub fn get_media_state(&self) -> MediaState {
        self.binding.state()
    }

    /// Read-only access to the media handle
    pub fn media(&self) -> &M {
        self.binding.handle()
    }

    pub fn recently_played(&self) -> &RecentlyPlayed {
        &self.recent
    }

    pub fn clear_recently_played(&mut self) {
        self.recent.clear();
    }

    /// Take all queued UI events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Internals =====

    fn jump_to(&mut self, index: usize) {
        let Some(track) = self.queue.select(index).cloned() else {
            return;
        };
        debug!(index, track_id = %track.id, "Queue cursor moved");
        self.player.is_playing = true;
        self.recent.push(track.clone());
        self.select_track(Some(track));
        self.emit_queue_changed();
        self.emit_state();
    }

    /// Make `track` current and (re)load it
    fn select_track(&mut self, track: Option<Track>) {
        let previous_track_id = self.player.current_track.as_ref().map(|t| t.id.clone());
        self.player.current_track = track.clone();
        self.pending_events.push(PlaybackEvent::TrackChanged {
            track_id: track.as_ref().map(|t| t.id.clone()),
            previous_track_id,
        });

        match track {
            Some(track) => self.start_load(&track),
            None => {
                self.binding.unload();
                self.player.is_loading = false;
                self.player.current_time_seconds = 0.0;
                self.player.duration_seconds = 0.0;
            }
        }
    }

    fn start_load(&mut self, track: &Track) {
        self.player.current_time_seconds = 0.0;
        self.player.duration_seconds = 0.0;

        let Some(url) = self.resolver.resolve(track) else {
            debug!(track_id = %track.id, "No stream URL for track, skipping load");
            self.binding.unload();
            self.player.is_loading = false;
            return;
        };

        match self.binding.load(url, self.clock.now()) {
            Ok(generation) => {
                debug!(track_id = %track.id, generation = %generation, "Track load started");
                self.player.is_loading = true;
            }
            Err(error) => self.transport_failed(error),
        }
    }

    fn track_ended(&mut self) {
        if self.mode.repeat == RepeatMode::One {
            debug!("Track ended under repeat one, restarting");
            self.player.current_time_seconds = 0.0;
            if let Some(BindingSignal::Failed(error)) = self.binding.restart() {
                self.transport_failed(error);
            }
            return;
        }

        self.player.is_playing = false;
        if !self.next() {
            debug!("Reached end of queue");
        }
    }

    fn transport_failed(&mut self, error: MediaError) {
        warn!(
            track_id = ?self.player.current_track.as_ref().map(|t| &t.id),
            error = %error,
            "Playback failed"
        );
        self.player.is_playing = false;
        self.player.is_loading = false;
        self.pending_events.push(PlaybackEvent::Error {
            message: error.to_string(),
        });
    }

    /// Fire-and-forget notification; failures never reach playback
    fn record_history(&mut self, track_id: &str) {
        let Some(user_id) = self.session.current_user_id() else {
            debug!(track_id, "No signed-in user, play not recorded");
            return;
        };
        match self.history_sink.record_play(&user_id, track_id) {
            Ok(()) => debug!(user_id = %user_id, track_id, "Play recorded"),
            Err(error) => debug!(error = %error, track_id, "History sink failed, ignoring"),
        }
    }

    fn emit_state(&mut self) {
        let state = (
            self.binding.state(),
            self.player.is_playing,
            self.player.is_loading,
        );
        if self.last_state == Some(state) {
            return;
        }
        self.last_state = Some(state);
        self.pending_events.push(PlaybackEvent::StateChanged {
            media: state.0,
            is_playing: state.1,
            is_loading: state.2,
        });
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
            current_index: self.queue.current_index(),
        });
    }

    fn emit_volume(&mut self) {
        self.pending_events.push(PlaybackEvent::VolumeChanged {
            level: self.player.volume,
            is_muted: self.player.is_muted,
        });
    }

    fn emit_mode(&mut self) {
        self.pending_events.push(PlaybackEvent::ModeChanged {
            repeat: self.mode.repeat,
            shuffle: self.mode.shuffle,
        });
    }

    fn emit_position(&mut self) {
        self.pending_events.push(PlaybackEvent::PositionUpdate {
            position_secs: self.player.current_time_seconds,
            duration_secs: self.player.duration_seconds,
        });
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_clock() -> Box<dyn Clock> {
    Box::new(crate::clock::MonotonicClock::new())
}

// No monotonic std clock on wasm; hosts supply one with `with_clock`
#[cfg(target_arch = "wasm32")]
fn default_clock() -> Box<dyn Clock> {
    Box::new(crate::clock::ManualClock::new())
}

impl<M: MediaHandle + std::fmt::Debug> std::fmt::Debug for PlaybackController<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("queue", &self.queue)
            .field("mode", &self.mode)
            .field("player", &self.player)
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}
