//! Play history operations for the Melodia API.

use crate::error::{Result, ServerClientError};
use crate::stream::stream_url;
use crate::types::{AddSongToHistoryRequest, ApiResponse, PlayedSongs};
use melodia_playback::Track;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

/// History client for the Melodia API.
pub struct HistoryClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: Option<&'a str>,
}

impl<'a> HistoryClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, access_token: Option<&'a str>) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    /// Record that `user_id` started playing `song_id`.
    ///
    /// The server moves an already-played song to the front of the history.
    pub async fn record_play(&self, user_id: &str, song_id: &str) -> Result<()> {
        let url = format!("{}/api/history/{}/songs", self.base_url, user_id);
        debug!(url = %url, song_id = %song_id, "Recording play");

        let body = AddSongToHistoryRequest {
            song_id: song_id.to_string(),
        };
        let response = self
            .authorize(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        if status.is_success() {
            debug!(user_id = %user_id, song_id = %song_id, "Play recorded");
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Most recently played songs for `user_id`, newest first.
    pub async fn recent_plays(&self, user_id: &str, limit: u32) -> Result<Vec<Track>> {
        let url = format!(
            "{}/api/history/{}/songs/recent?limit={}",
            self.base_url, user_id, limit
        );
        debug!(url = %url, "Fetching recently played songs");

        let response = self
            .authorize(self.http.get(&url))
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        let envelope: ApiResponse<PlayedSongs> = response.json().await.map_err(|e| {
            ServerClientError::ParseError(format!("Failed to parse history response: {}", e))
        })?;
        let played = envelope.data.ok_or_else(|| {
            ServerClientError::ParseError("History response has no data".to_string())
        })?;

        debug!(
            user_id = %played.user_id,
            songs = played.songs.len(),
            "Fetched recently played songs"
        );

        Ok(played
            .songs
            .into_iter()
            .map(|song| {
                let url = stream_url(self.base_url, &song.song_id);
                song.into_track(url)
            })
            .collect())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn send_error(error: reqwest::Error) -> ServerClientError {
    if error.is_connect() || error.is_timeout() {
        ServerClientError::ServerUnreachable(error.to_string())
    } else {
        ServerClientError::Request(error)
    }
}

/// Map a non-success response, preferring the envelope's message
async fn error_from_response(response: Response) -> ServerClientError {
    let status = response.status().as_u16();
    if status == 401 {
        return ServerClientError::AuthRequired;
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&text)
        .ok()
        .and_then(|envelope| envelope.message)
        .unwrap_or(text);
    ServerClientError::ServerError { status, message }
}
