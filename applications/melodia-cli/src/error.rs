/// CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Playlist error: {0}")]
    Playlist(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Playback error: {0}")]
    Playback(#[from] melodia_playback::PlaybackError),

    #[error("Server error: {0}")]
    Server(#[from] melodia_server_client::ServerClientError),
}
