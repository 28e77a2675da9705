//! Fire-and-forget history sink backed by the HTTP API.

use crate::client::MelodiaClient;
use melodia_playback::{HistorySink, HistorySinkError};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// [`HistorySink`] posting plays to the API on a tokio runtime
///
/// `record_play` returns as soon as the request task is spawned; the
/// outcome is only logged.
#[derive(Clone)]
pub struct HttpHistorySink {
    client: Arc<MelodiaClient>,
    runtime: Handle,
}

impl HttpHistorySink {
    pub fn new(client: Arc<MelodiaClient>, runtime: Handle) -> Self {
        Self { client, runtime }
    }

    /// Use the runtime of the calling context.
    ///
    /// Panics outside a tokio runtime.
    pub fn current(client: Arc<MelodiaClient>) -> Self {
        Self::new(client, Handle::current())
    }
}

impl HistorySink for HttpHistorySink {
    fn record_play(&self, user_id: &str, track_id: &str) -> Result<(), HistorySinkError> {
        let client = Arc::clone(&self.client);
        let user_id = user_id.to_string();
        let track_id = track_id.to_string();

        self.runtime.spawn(async move {
            let history = client.history().await;
            match history.client().record_play(&user_id, &track_id).await {
                Ok(()) => debug!(user_id = %user_id, track_id = %track_id, "History updated"),
                Err(e) => warn!(
                    user_id = %user_id,
                    track_id = %track_id,
                    error = %e,
                    "Failed to record play"
                ),
            }
        });
        Ok(())
    }
}
