//! Melodia terminal player
//!
//! Drives the playback controller from stdin against a simulated media
//! backend. Plays are reported to the Melodia API when a server is
//! configured.

pub mod commands;
pub mod config;
pub mod error;
pub mod player;
pub mod playlist;
pub mod simulator;

pub use commands::Command;
pub use crate::config::CliConfig;
pub use error::{CliError, Result};
pub use player::{LogHistorySink, Outcome, PlayerSession};
pub use simulator::{SimulatedMedia, SimulatorHandle, SimulatorSettings};

