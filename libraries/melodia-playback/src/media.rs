//! Playable resource abstraction
//!
//! Abstracts the platform media element (browser `<audio>`, desktop decoder,
//! simulation) behind transport commands plus a stream of lifecycle events.
//!
//! Every load is tagged with a [`LoadGeneration`]. Implementations must stamp
//! each event they report with the generation of the load it belongs to so
//! that completions from superseded loads can be recognised and dropped.

use crate::error::MediaError;
use std::fmt;

/// Identity of one load on the media handle
///
/// Monotonically increasing for the lifetime of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LoadGeneration(pub u64);

impl LoadGeneration {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for LoadGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A source assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub generation: LoadGeneration,
    pub url: String,
}

/// Transport commands accepted by a media backend
///
/// All calls are non-blocking. Outcomes of `load` and `play` are reported
/// later as [`MediaEvent`]s; a synchronous `Err` means the command could not
/// even be issued and is treated like the corresponding failure event.
pub trait MediaHandle {
    /// Assign a new source and begin loading it
    fn load(&mut self, request: LoadRequest) -> Result<(), MediaError>;

    /// Start or resume playback of the given load
    ///
    /// Resolves with [`MediaEventKind::PlayResolved`] or
    /// [`MediaEventKind::PlayRejected`].
    fn play(&mut self, generation: LoadGeneration) -> Result<(), MediaError>;

    fn pause(&mut self);

    /// Pause, rewind and detach the current source
    fn reset(&mut self);

    /// Set the playback position in seconds
    fn seek(&mut self, position_secs: f64);

    /// Volume as a fraction in [0, 1]
    fn set_volume(&mut self, fraction: f32);

    fn set_muted(&mut self, muted: bool);

    /// Loop the current source natively (repeat one)
    fn set_looping(&mut self, looping: bool);
}

impl<M: MediaHandle + ?Sized> MediaHandle for Box<M> {
    fn load(&mut self, request: LoadRequest) -> Result<(), MediaError> {
        (**self).load(request)
    }

    fn play(&mut self, generation: LoadGeneration) -> Result<(), MediaError> {
        (**self).play(generation)
    }

    fn pause(&mut self) {
        (**self).pause();
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn seek(&mut self, position_secs: f64) {
        (**self).seek(position_secs);
    }

    fn set_volume(&mut self, fraction: f32) {
        (**self).set_volume(fraction);
    }

    fn set_muted(&mut self, muted: bool) {
        (**self).set_muted(muted);
    }

    fn set_looping(&mut self, looping: bool) {
        (**self).set_looping(looping);
    }
}

/// Lifecycle notification from a media backend
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    /// Load this event belongs to
    pub generation: LoadGeneration,
    pub kind: MediaEventKind,
}

impl MediaEvent {
    pub fn new(generation: LoadGeneration, kind: MediaEventKind) -> Self {
        Self { generation, kind }
    }
}

/// Event payloads, mirroring the HTML media element events
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEventKind {
    /// `loadstart`
    LoadStarted,

    /// `loadedmetadata`
    MetadataLoaded { duration_secs: f64 },

    /// `canplay`: enough data to begin playback
    Ready,

    /// `timeupdate`
    TimeUpdate { position_secs: f64 },

    /// The pending `play()` promise resolved
    PlayResolved,

    /// The pending `play()` promise rejected
    PlayRejected(MediaError),

    /// `error` on the element (network or decode failure)
    Failed(MediaError),

    /// `ended`
    Ended,
}
