/// CLI configuration
use crate::error::{CliError, Result};
use crate::simulator::SimulatorSettings;
use melodia_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "melodia.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default = "default_simulation")]
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerSettings {
    /// API base URL; history and stream URLs are local-only when unset
    #[serde(default)]
    pub url: Option<String>,

    /// Bearer token for the API
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionSettings {
    /// Signed-in user; plays are not recorded when unset
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSettings {
    /// Time from load to "ready"
    #[serde(default = "default_load_latency_ms")]
    pub load_latency_ms: u64,

    /// Event loop tick
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Length of tracks that carry no duration
    #[serde(default = "default_track_secs")]
    pub default_track_secs: f64,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// Uses `path` if given, else `melodia.toml` when present. Variables
    /// prefixed with `MELODIA_` override file values, with `__` between
    /// section and key (e.g. `MELODIA_PLAYBACK__VOLUME=40`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    pub(crate) fn load_with_env(
        path: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(environment);

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.playback
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;

        if let Some(url) = &self.server.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CliError::Config(format!(
                    "server.url must start with http:// or https:// (got {})",
                    url
                )));
            }
        }

        if self.simulation.tick_ms == 0 {
            return Err(CliError::Config(
                "simulation.tick_ms must be at least 1".to_string(),
            ));
        }

        if !self.simulation.default_track_secs.is_finite()
            || self.simulation.default_track_secs <= 0.0
        {
            return Err(CliError::Config(
                "simulation.default_track_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// `MELODIA_`-prefixed environment source
pub(crate) fn environment() -> config::Environment {
    config::Environment::with_prefix("MELODIA")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

// Default values
fn default_simulation() -> SimulationSettings {
    SimulationSettings {
        load_latency_ms: default_load_latency_ms(),
        tick_ms: default_tick_ms(),
        default_track_secs: default_track_secs(),
    }
}

fn default_load_latency_ms() -> u64 {
    300
}

fn default_tick_ms() -> u64 {
    250
}

fn default_track_secs() -> f64 {
    30.0
}

impl SimulationSettings {
    pub fn simulator(&self) -> SimulatorSettings {
        SimulatorSettings {
            load_latency: Duration::from_millis(self.load_latency_ms),
            default_duration_secs: self.default_track_secs,
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        default_simulation()
    }
}
