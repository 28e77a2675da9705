//! Terminal player session
//!
//! Owns the controller and the simulated media backend, executes parsed
//! commands and forwards simulator events back into the controller.

use crate::commands::{Command, HELP};
use crate::error::{CliError, Result};
use crate::simulator::{SimulatedMedia, SimulatorHandle};
use melodia_playback::{
    format_time, HistorySink, HistorySinkError, MediaState, PlaybackController, PlaybackEvent,
    RepeatMode, SharedSession, StreamResolver, Track,
};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

/// History sink used when no server is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHistorySink;

impl HistorySink for LogHistorySink {
    fn record_play(&self, user_id: &str, track_id: &str) -> std::result::Result<(), HistorySinkError> {
        info!(user_id = %user_id, track_id = %track_id, "Play recorded");
        Ok(())
    }
}

/// Whether the prompt loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

pub struct PlayerSession {
    controller: PlaybackController<SimulatedMedia>,
    simulator: SimulatorHandle,
    session: SharedSession,
    playlist: Vec<Track>,
}

impl PlayerSession {
    /// Wrap a controller driving `simulator`'s backend
    ///
    /// Known track durations are registered with the simulator under the
    /// URL `resolver` produces for them.
    pub fn new(
        controller: PlaybackController<SimulatedMedia>,
        simulator: SimulatorHandle,
        session: SharedSession,
        playlist: Vec<Track>,
        resolver: &dyn StreamResolver,
    ) -> Self {
        for track in &playlist {
            if let (Some(duration), Some(url)) = (track.duration_seconds, resolver.resolve(track)) {
                simulator.set_duration_hint(url, duration);
            }
        }

        Self {
            controller,
            simulator,
            session,
            playlist,
        }
    }

    pub fn controller(&self) -> &PlaybackController<SimulatedMedia> {
        &self.controller
    }

    pub fn playlist(&self) -> &[Track] {
        &self.playlist
    }

    /// Execute one command, writing any report to `out`
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<Outcome> {
        debug!(?command, "Executing command");

        match command {
            Command::Play(n) => {
                let index = self.playlist_index(n)?;
                let track = self.playlist[index].clone();
                self.controller.play(track, self.playlist.clone(), index);
            }
            Command::Next => {
                if !self.controller.next() {
                    writeln!(out, "End of queue")?;
                }
            }
            Command::Previous => {
                if !self.controller.previous() {
                    writeln!(out, "Start of queue")?;
                }
            }
            Command::Stop => self.controller.stop(),
            Command::TogglePlayPause => self.controller.toggle_play_pause(),
            Command::Pause => self.controller.pause(),
            Command::Resume => self.controller.resume(),
            Command::Volume(level) => self.controller.set_volume(level),
            Command::Mute => self.controller.toggle_mute(),
            Command::Seek(position) => self.controller.seek(position),
            Command::Repeat(None) => self.controller.toggle_repeat(),
            Command::Repeat(Some(mode)) => self.controller.set_repeat(mode),
            Command::Shuffle => self.controller.toggle_shuffle(),
            Command::Add(n) => {
                let index = self.playlist_index(n)?;
                self.controller.add_to_queue(self.playlist[index].clone());
            }
            Command::ClearQueue => self.controller.clear_queue(),
            Command::Queue => self.write_queue(out)?,
            Command::Status => writeln!(out, "{}", self.status_line())?,
            Command::Recent => self.write_recent(out)?,
            Command::Login(user_id) => {
                info!(user_id = %user_id, "Signed in");
                self.session.sign_in(user_id);
            }
            Command::Logout => {
                info!("Signed out");
                self.session.sign_out();
            }
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => {
                self.controller.stop();
                self.log_events();
                return Ok(Outcome::Quit);
            }
        }

        self.log_events();
        Ok(Outcome::Continue)
    }

    /// Advance the simulated backend and feed its events to the controller
    pub fn tick(&mut self, elapsed: Duration) -> Vec<PlaybackEvent> {
        for event in self.simulator.tick(elapsed) {
            self.controller.handle_media_event(event);
        }
        self.controller.poll();
        self.log_events()
    }

    /// One-line summary of the player bar
    pub fn status_line(&self) -> String {
        let player = self.controller.get_player();

        let symbol = match self.controller.get_media_state() {
            MediaState::Loading => "…",
            MediaState::Error => "!",
            _ if player.is_playing => "▶",
            MediaState::Idle => "■",
            _ => "⏸",
        };

        let track = match &player.current_track {
            Some(track) => format!("{} - {}", track.title, track.artist_display_name),
            None => "Nothing playing".to_string(),
        };

        let volume = if player.is_muted {
            "muted".to_string()
        } else {
            format!("vol {}", player.volume)
        };

        let mut line = format!(
            "{} {}  {} / {}  {}",
            symbol,
            track,
            format_time(player.current_time_seconds),
            format_time(player.duration_seconds),
            volume
        );
        if self.controller.get_repeat() != RepeatMode::Off {
            line.push_str(&format!("  repeat {}", self.controller.get_repeat()));
        }
        if self.controller.is_shuffled() {
            line.push_str("  shuffle");
        }
        line
    }

    fn playlist_index(&self, n: usize) -> Result<usize> {
        if n == 0 || n > self.playlist.len() {
            return Err(CliError::InvalidArgument(format!(
                "no track {} (playlist has {})",
                n,
                self.playlist.len()
            )));
        }
        Ok(n - 1)
    }

    fn write_queue(&self, out: &mut impl Write) -> Result<()> {
        let view = self.controller.queue_view();
        if view.items.is_empty() {
            writeln!(out, "Queue is empty")?;
            return Ok(());
        }

        for (i, track) in view.items.iter().enumerate() {
            let marker = if Some(i) == view.current_index { ">" } else { " " };
            let duration = track
                .duration_seconds
                .map(format_time)
                .unwrap_or_else(|| "-:--".to_string());
            writeln!(
                out,
                "{} {:>3}. {} - {} [{}]",
                marker,
                i + 1,
                track.title,
                track.artist_display_name,
                duration
            )?;
        }
        Ok(())
    }

    fn write_recent(&self, out: &mut impl Write) -> Result<()> {
        let recent = self.controller.recently_played();
        if recent.is_empty() {
            writeln!(out, "Nothing played yet")?;
        }
        for (i, entry) in recent.iter().enumerate() {
            writeln!(
                out,
                "{:>3}. {} - {} ({})",
                i + 1,
                entry.track.title,
                entry.track.artist_display_name,
                entry.played_at.format("%H:%M:%S")
            )?;
        }
        Ok(())
    }

    fn log_events(&mut self) -> Vec<PlaybackEvent> {
        let events = self.controller.drain_events();
        for event in &events {
            match event {
                PlaybackEvent::TrackChanged { track_id, .. } => match self.controller.get_current_track() {
                    Some(track) => info!(
                        track_id = ?track_id,
                        "Now playing: {} - {}",
                        track.title,
                        track.artist_display_name
                    ),
                    None => info!("Stopped"),
                },
                PlaybackEvent::Error { message } => warn!(error = %message, "Playback error"),
                PlaybackEvent::PositionUpdate { .. } => {}
                other => debug!(event = ?other, "Playback event"),
            }
        }
        events
    }
}
