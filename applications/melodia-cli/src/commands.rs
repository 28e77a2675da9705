//! Interactive command parsing

use crate::error::{CliError, Result};
use melodia_playback::{parse_time, RepeatMode};
use std::str::FromStr;

/// A line typed at the player prompt
///
/// Track numbers are 1-based as printed by `queue`.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Play playlist entry `n`, replacing the queue with the playlist
    Play(usize),
    Next,
    Previous,
    Stop,
    TogglePlayPause,
    Pause,
    Resume,
    Volume(i32),
    Mute,
    /// Seek to an absolute position in seconds
    Seek(f64),
    /// Cycle the repeat mode, or set it explicitly
    Repeat(Option<RepeatMode>),
    Shuffle,
    /// Append playlist entry `n` to the queue
    Add(usize),
    ClearQueue,
    Queue,
    Status,
    Recent,
    Login(String),
    Logout,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  play <n>          play playlist track n (queue = playlist)
  next | n          next track
  prev | p          previous track
  toggle | space    play/pause
  pause | resume    pause or resume
  stop              stop and clear the current track
  seek <m:ss|secs>  seek within the current track
  vol <0-100>       set volume
  mute              toggle mute
  repeat [mode]     cycle repeat (off, all, one) or set it
  shuffle           toggle shuffle
  add <n>           append playlist track n to the queue
  clear             clear the queue
  queue             show the queue
  status            show the player state
  recent            show recently played tracks
  login <user>      sign in as user
  logout            sign out
  help              show this help
  quit              exit";

impl FromStr for Command {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            // A bare enter (or space) toggles playback
            return Ok(Command::TogglePlayPause);
        };
        let arg = parts.next();

        let command = match name.to_ascii_lowercase().as_str() {
            "play" => Command::Play(track_number(arg)?),
            "next" | "n" => Command::Next,
            "prev" | "previous" | "p" => Command::Previous,
            "stop" => Command::Stop,
            "toggle" | "space" => Command::TogglePlayPause,
            "pause" => Command::Pause,
            "resume" => Command::Resume,
            "vol" | "volume" => Command::Volume(volume(arg)?),
            "mute" => Command::Mute,
            "seek" => Command::Seek(position(arg)?),
            "repeat" => Command::Repeat(arg.map(str::parse).transpose()?),
            "shuffle" => Command::Shuffle,
            "add" => Command::Add(track_number(arg)?),
            "clear" => Command::ClearQueue,
            "queue" | "q" => Command::Queue,
            "status" | "s" => Command::Status,
            "recent" => Command::Recent,
            "login" => Command::Login(
                arg.ok_or_else(|| CliError::InvalidArgument("login needs a user id".into()))?
                    .to_string(),
            ),
            "logout" => Command::Logout,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CliError::UnknownCommand(other.to_string())),
        };

        Ok(command)
    }
}

fn track_number(arg: Option<&str>) -> Result<usize> {
    let arg = arg.ok_or_else(|| CliError::InvalidArgument("missing track number".into()))?;
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CliError::InvalidArgument(format!(
            "track number must be 1 or more, got {}",
            arg
        ))),
    }
}

fn volume(arg: Option<&str>) -> Result<i32> {
    let arg = arg.ok_or_else(|| CliError::InvalidArgument("missing volume".into()))?;
    arg.parse()
        .map_err(|_| CliError::InvalidArgument(format!("volume must be a number, got {}", arg)))
}

/// Accepts `m:ss` or plain seconds
fn position(arg: Option<&str>) -> Result<f64> {
    let arg = arg.ok_or_else(|| CliError::InvalidArgument("missing position".into()))?;
    if let Some(secs) = parse_time(arg) {
        return Ok(secs as f64);
    }
    match arg.parse::<f64>() {
        Ok(secs) if secs.is_finite() => Ok(secs),
        _ => Err(CliError::InvalidArgument(format!(
            "position must be m:ss or seconds, got {}",
            arg
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        line.parse().unwrap()
    }

    #[test]
    fn test_transport_commands() {
        assert_eq!(parse("play 3"), Command::Play(3));
        assert_eq!(parse("next"), Command::Next);
        assert_eq!(parse("p"), Command::Previous);
        assert_eq!(parse("STOP"), Command::Stop);
        assert_eq!(parse(""), Command::TogglePlayPause);
        assert_eq!(parse("   "), Command::TogglePlayPause);
    }

    #[test]
    fn test_seek_formats() {
        assert_eq!(parse("seek 1:30"), Command::Seek(90.0));
        assert_eq!(parse("seek 42.5"), Command::Seek(42.5));
        assert!("seek".parse::<Command>().is_err());
        assert!("seek soon".parse::<Command>().is_err());
        assert!("seek inf".parse::<Command>().is_err());
    }

    #[test]
    fn test_volume_passes_out_of_range_through() {
        // Clamping happens in the controller
        assert_eq!(parse("vol 150"), Command::Volume(150));
        assert_eq!(parse("vol -5"), Command::Volume(-5));
        assert!("vol loud".parse::<Command>().is_err());
    }

    #[test]
    fn test_repeat_argument() {
        assert_eq!(parse("repeat"), Command::Repeat(None));
        assert_eq!(parse("repeat one"), Command::Repeat(Some(RepeatMode::One)));
        assert!("repeat twice".parse::<Command>().is_err());
    }

    #[test]
    fn test_track_numbers_are_one_based() {
        assert!("play 0".parse::<Command>().is_err());
        assert!("add".parse::<Command>().is_err());
        assert_eq!(parse("add 2"), Command::Add(2));
    }

    #[test]
    fn test_unknown_command() {
        match "dance".parse::<Command>() {
            Err(CliError::UnknownCommand(name)) => assert_eq!(name, "dance"),
            other => panic!("Expected UnknownCommand, got {:?}", other),
        }
    }

    #[test]
    fn test_session_commands() {
        assert_eq!(parse("login USR001"), Command::Login("USR001".to_string()));
        assert_eq!(parse("logout"), Command::Logout);
        assert!("login".parse::<Command>().is_err());
    }
}
