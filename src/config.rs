//! Application-level configuration loading, including the friendly-match defaults.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use serde_with::{DurationMilliSeconds, serde_as};
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MATCHDAY_BACK_CONFIG_PATH";

const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;
const DEFAULT_SSE_CAPACITY: usize = 64;

/// Durations used when a match is opened without a tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FriendlyDefaults {
    /// Regulation half length in minutes.
    pub half_duration_minutes: u32,
    /// Extra-time half length in minutes.
    pub extra_time_minutes: u32,
    /// Regulation penalty kicks per side.
    pub penalty_kicks: u8,
}

impl Default for FriendlyDefaults {
    fn default() -> Self {
        Self {
            half_duration_minutes: 20,
            extra_time_minutes: 5,
            penalty_kicks: 5,
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    friendly: FriendlyDefaults,
    tick_interval: Duration,
    sse_capacity: usize,
    fixtures_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        half_minutes = app_config.friendly.half_duration_minutes,
                        tick_ms = app_config.tick_interval.as_millis() as u64,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Defaults applied to friendly matches.
    pub fn friendly(&self) -> &FriendlyDefaults {
        &self.friendly
    }

    /// Wall-clock time between two countdown ticks.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Capacity of the live SSE broadcast channel.
    pub fn sse_capacity(&self) -> usize {
        self.sse_capacity
    }

    /// Fixture bundle seeded into the in-memory store at startup.
    pub fn fixtures_path(&self) -> Option<&Path> {
        self.fixtures_path.as_deref()
    }

    /// Same configuration with a different tick interval.
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            friendly: FriendlyDefaults::default(),
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            sse_capacity: DEFAULT_SSE_CAPACITY,
            fixtures_path: None,
        }
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    friendly: FriendlyDefaults,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_tick_interval", rename = "tick_interval_ms")]
    tick_interval: Duration,
    #[serde(default = "default_sse_capacity")]
    sse_capacity: usize,
    #[serde(default)]
    fixtures_path: Option<PathBuf>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let friendly = FriendlyDefaults {
            half_duration_minutes: value.friendly.half_duration_minutes.max(1),
            extra_time_minutes: value.friendly.extra_time_minutes.max(1),
            penalty_kicks: value.friendly.penalty_kicks.max(1),
        };
        Self {
            friendly,
            tick_interval: value.tick_interval.max(Duration::from_millis(1)),
            sse_capacity: value.sse_capacity.max(1),
            fixtures_path: value
                .fixtures_path
                .filter(|path| !path.as_os_str().is_empty()),
        }
    }
}

fn default_tick_interval() -> Duration {
    Duration::from_millis(DEFAULT_TICK_INTERVAL_MS)
}

fn default_sse_capacity() -> usize {
    DEFAULT_SSE_CAPACITY
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
