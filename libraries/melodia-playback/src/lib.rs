//! Melodia - Playback Core
//!
//! Platform-agnostic queue and playback state machine for the Melodia player.
//!
//! This crate provides:
//! - Queue replacement and transition rules (next, previous, wrap, shuffle)
//! - Repeat modes (Off, All, One) and shuffle sampled at selection time
//! - Media binding with per-load generations (stale events are discarded)
//! - Deferred play while a load is pending, cancellation-tolerant failures
//! - Fire-and-forget history notifications keyed by the signed-in user
//! - Volume, mute and seek written through to the media handle
//!
//! # Architecture
//!
//! `melodia-playback` owns no I/O:
//! - The media backend is a [`MediaHandle`] (an `<audio>` element, a CLI
//!   simulator, or the [`testing::ScriptedMedia`] fake)
//! - Play history goes to an injected [`HistorySink`]
//! - The user id is read from a [`SessionProvider`] each time it is needed
//!
//! The [`PlaybackController`] is the only writer of queue and player state.
//! The host forwards backend events with
//! [`PlaybackController::handle_media_event`] and renders from read-only
//! snapshots and drained [`PlaybackEvent`]s.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use melodia_playback::testing::ScriptedMedia;
//! use melodia_playback::{MediaEventKind, NoopHistorySink, PlaybackConfig, PlaybackController, Track};
//!
//! let mut controller = PlaybackController::new(
//!     PlaybackConfig::default(),
//!     ScriptedMedia::new(),
//!     NoopHistorySink,
//!     || Some("user-1".to_string()),
//! );
//!
//! let tracks = vec![
//!     Track::new("1", "Intro", "Band").with_stream_url("https://cdn.example/1.mp3"),
//!     Track::new("2", "Outro", "Band").with_stream_url("https://cdn.example/2.mp3"),
//! ];
//! controller.play(tracks[0].clone(), tracks.clone(), 0);
//!
//! // The backend reports readiness for the current load
//! let ready = controller.media().event(MediaEventKind::Ready);
//! controller.handle_media_event(ready);
//!
//! controller.set_volume(150); // clamped to 100
//! assert_eq!(controller.get_volume(), 100);
//!
//! assert!(controller.next());
//! assert_eq!(controller.get_current_track().map(|t| t.id.as_str()), Some("2"));
//! ```
//!
//! # Example: Repeat and Shuffle
//!
//! ```rust
//! use melodia_playback::testing::ScriptedMedia;
//! use melodia_playback::{NoopHistorySink, PlaybackConfig, PlaybackController, RepeatMode};
//!
//! let mut controller = PlaybackController::new(
//!     PlaybackConfig::default(),
//!     ScriptedMedia::new(),
//!     NoopHistorySink,
//!     || None::<String>,
//! );
//!
//! controller.toggle_repeat();
//! assert_eq!(controller.get_repeat(), RepeatMode::All);
//!
//! controller.toggle_shuffle();
//! assert!(controller.is_shuffled());
//! ```

pub mod binding;
pub mod clock;
mod controller;
mod error;
pub mod events;
pub mod format;
mod history;
pub mod media;
pub mod queue;
mod shuffle;
pub mod sink;
pub mod source;
pub mod testing;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use binding::{BindingSignal, MediaBinding, PlayCommand};
pub use clock::{Clock, ManualClock};
pub use controller::PlaybackController;
pub use error::{MediaError, MediaErrorKind, PlaybackError, Result};
pub use events::PlaybackEvent;
pub use format::{format_time, format_time_long, parse_time};
pub use history::{RecentPlay, RecentlyPlayed};
pub use media::{LoadGeneration, LoadRequest, MediaEvent, MediaEventKind, MediaHandle};
pub use queue::{Queue, QueueView};
pub use sink::{HistorySink, HistorySinkError, NoopHistorySink, SessionProvider, SharedSession};
pub use source::{StreamResolver, TrackStreamUrl};
pub use types::{
    MediaState, PlaybackConfig, PlaybackMode, PlayerState, RepeatMode, Track, DEFAULT_VOLUME,
};

#[cfg(not(target_arch = "wasm32"))]
pub use clock::MonotonicClock;
