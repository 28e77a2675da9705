/// Playlist files
use crate::error::{CliError, Result};
use melodia_playback::Track;
use std::path::Path;

/// Load a JSON array of tracks
///
/// Entries use the same camelCase fields the web client exchanges
/// (`id`, `title`, `artistDisplayName`, optional `streamUrl` and
/// `durationSeconds`).
pub fn load(path: &Path) -> Result<Vec<Track>> {
    let contents = std::fs::read_to_string(path)?;
    parse(&contents).map_err(|e| CliError::Playlist(format!("{}: {}", path.display(), e)))
}

pub fn parse(contents: &str) -> std::result::Result<Vec<Track>, String> {
    let tracks: Vec<Track> = serde_json::from_str(contents).map_err(|e| e.to_string())?;

    if tracks.is_empty() {
        return Err("playlist is empty".to_string());
    }
    if let Some(position) = tracks.iter().position(|t| t.id.trim().is_empty()) {
        return Err(format!("track {} has no id", position + 1));
    }

    Ok(tracks)
}
