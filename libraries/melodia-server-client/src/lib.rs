//! Melodia API Client
//!
//! HTTP collaborators the playback core consumes from the Melodia REST API.
//!
//! # Features
//!
//! - **Play history**: record plays, fetch recently played songs
//! - **Stream URLs**: resolve tracks to `{base}/api/songs/stream/{id}`
//! - **History sink**: [`HttpHistorySink`] plugs into the playback controller
//!   as a fire-and-forget [`melodia_playback::HistorySink`]
//!
//! # Example
//!
//! ```ignore
//! use melodia_server_client::{HttpHistorySink, MelodiaClient, ServerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(MelodiaClient::new(ServerConfig::new("http://localhost:8080"))?);
//!
//!     // Recently played songs as playable tracks
//!     let history = client.history().await;
//!     let tracks = history.client().recent_plays("USR001", 10).await?;
//!     println!("{} recent tracks", tracks.len());
//!
//!     // Sink for the playback controller
//!     let sink = HttpHistorySink::current(Arc::clone(&client));
//!     # let _ = sink;
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod history;
mod sink;
mod stream;
mod types;

// Re-export main types
pub use client::{HistoryClientHandle, MelodiaClient, API_TIMEOUT};
pub use error::{Result, ServerClientError};
pub use history::HistoryClient;
pub use sink::HttpHistorySink;
pub use stream::ApiStreamResolver;
pub use types::{AddSongToHistoryRequest, ApiResponse, PlayedSongs, ServerConfig, ServerSong};
