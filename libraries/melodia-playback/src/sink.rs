//! History sink and session seams
//!
//! The controller reports "track started" events to an injected sink and
//! reads the current user from an injected session at the moment of firing.

use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Failure to dispatch a play event
///
/// Only ever logged by the controller.
#[derive(Debug, Clone, Error)]
#[error("history sink: {0}")]
pub struct HistorySinkError(pub String);

/// Receives "track started playing" notifications
///
/// Implementations must not block: a networked sink hands the request off to
/// its own executor and returns immediately. Any error returned here (or
/// produced later by the dispatched request) is ignored by the caller.
pub trait HistorySink {
    fn record_play(&self, user_id: &str, track_id: &str) -> Result<(), HistorySinkError>;
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHistorySink;

impl HistorySink for NoopHistorySink {
    fn record_play(&self, _user_id: &str, _track_id: &str) -> Result<(), HistorySinkError> {
        Ok(())
    }
}

impl<S: HistorySink + ?Sized> HistorySink for Arc<S> {
    fn record_play(&self, user_id: &str, track_id: &str) -> Result<(), HistorySinkError> {
        (**self).record_play(user_id, track_id)
    }
}

/// Source of the signed-in user's id
///
/// Read on every history event, never cached by the controller.
pub trait SessionProvider {
    fn current_user_id(&self) -> Option<String>;
}

impl<F> SessionProvider for F
where
    F: Fn() -> Option<String>,
{
    fn current_user_id(&self) -> Option<String> {
        self()
    }
}

/// Session shared between the auth layer and the controller
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    user_id: Arc<RwLock<Option<String>>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        let session = Self::new();
        session.sign_in(user_id);
        session
    }

    pub fn sign_in(&self, user_id: impl Into<String>) {
        if let Ok(mut guard) = self.user_id.write() {
            *guard = Some(user_id.into());
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut guard) = self.user_id.write() {
            *guard = None;
        }
    }
}

impl SessionProvider for SharedSession {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.read().ok().and_then(|guard| guard.clone())
    }
}
