//! Engine configuration.
//!
//! TOML-deserializable settings covering the two documented configuration
//! surfaces (backend selection, driver library path) plus the timing and
//! probe knobs that would otherwise be magic numbers. Every field has a
//! default, so an empty document is a valid config.
//!
//! ```toml
//! backend = "driver"
//! driver_library = "libs/interception.dll"
//! max_probe_devices = 20
//!
//! [timing]
//! move_timeout_ms = 2000
//! click_delay_ms = 10
//! key_delay_ms = 30
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::backend::BackendKind;
use crate::trajectory::TrajectoryOptions;

/// Default upper bound of the driver device probe scan. Encodes the
/// assumption that no machine has more than this many input devices
/// attached to the interception filter stack.
pub const DEFAULT_MAX_PROBE_DEVICES: i32 = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML syntax or type error; the message carries line/column.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Initial backend selection. Message needs no setup; Driver initializes
    /// lazily on first use.
    #[serde(default)]
    pub backend: BackendKind,

    /// Path handed to the driver loader. Relative names resolve through the
    /// system library search path.
    #[serde(default = "default_driver_library")]
    pub driver_library: PathBuf,

    /// Upper bound of the device probe scan (indices `1..=n`).
    #[serde(default = "default_max_probe_devices")]
    pub max_probe_devices: i32,

    #[serde(default)]
    pub timing: Timing,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Timing {
    /// Wall-clock ceiling for one mouse trajectory.
    #[serde(default = "default_move_timeout_ms")]
    pub move_timeout_ms: u64,
    /// Pause between button-down and button-up on the message path.
    #[serde(default = "default_click_delay_ms")]
    pub click_delay_ms: u64,
    /// Pause between key-down and key-up on the message path.
    #[serde(default = "default_key_delay_ms")]
    pub key_delay_ms: u64,
}

fn default_driver_library() -> PathBuf {
    PathBuf::from("interception.dll")
}

fn default_max_probe_devices() -> i32 {
    DEFAULT_MAX_PROBE_DEVICES
}

fn default_move_timeout_ms() -> u64 {
    2000
}

fn default_click_delay_ms() -> u64 {
    10
}

fn default_key_delay_ms() -> u64 {
    30
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            move_timeout_ms: default_move_timeout_ms(),
            click_delay_ms: default_click_delay_ms(),
            key_delay_ms: default_key_delay_ms(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            backend: BackendKind::default(),
            driver_library: default_driver_library(),
            max_probe_devices: default_max_probe_devices(),
            timing: Timing::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document. Unknown keys are rejected so typos fail loud.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub(crate) fn trajectory_options(&self) -> TrajectoryOptions {
        TrajectoryOptions {
            timeout: Duration::from_millis(self.timing.move_timeout_ms),
            ..Default::default()
        }
    }

    pub(crate) fn click_delay(&self) -> Duration {
        Duration::from_millis(self.timing.click_delay_ms)
    }

    pub(crate) fn key_delay(&self) -> Duration {
        Duration::from_millis(self.timing.key_delay_ms)
    }
}
