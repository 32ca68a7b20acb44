use std::path::Path;

use serde::Deserialize;

use crate::error::Error;
use crate::noise::OperationKind;
use crate::timer::TimerKind;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/jitterharvest.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub timer: TimerKind,
    pub operation: OperationKind,
    /// Falls back to the operation's suggested count when unset.
    pub samples: Option<usize>,
    pub max_failures: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            timer: TimerKind::Cycle,
            operation: OperationKind::BusyLoop,
            samples: None,
            max_failures: 16,
        }
    }
}

impl HarnessConfig {
    /// Clamp fields to valid ranges.
    pub fn validate(&mut self) {
        self.samples = self.samples.map(|n| n.clamp(1, 10_000_000));
        self.max_failures = self.max_failures.clamp(0, 1_000_000);
    }

    pub fn sample_count(&self) -> usize {
        self.samples
            .unwrap_or_else(|| self.operation.suggested_samples())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JitterConfig {
    pub oversampling_rate: u32,
    pub flags: u32,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            oversampling_rate: 1,
            flags: 0,
        }
    }
}

impl JitterConfig {
    /// Clamp fields to valid ranges.
    pub fn validate(&mut self) {
        self.oversampling_rate = self.oversampling_rate.clamp(1, 64);
    }
}

/// Opt-in switches for operations that execute privileged or
/// platform-dependent trap instructions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub syscall_trap: bool,
    pub software_interrupt: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub harness: HarnessConfig,
    pub jitter: JitterConfig,
    pub capabilities: Capabilities,
}

impl Config {
    pub fn validate(&mut self) {
        self.harness.validate();
        self.jitter.validate();
    }
}

/// Load configuration from a TOML file.
///
/// - If `explicit_path` is `Some` and the file is missing, returns an error.
/// - If `explicit_path` is `None`, tries `/etc/jitterharvest.toml`; if missing, returns defaults.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config, Error> {
    let path = match explicit_path {
        Some(p) => {
            if !p.exists() {
                return Err(Error::InvalidArgs(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p.to_path_buf()
        }
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return Ok(Config::default());
            }
            default.to_path_buf()
        }
    };

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        Error::InvalidArgs(format!("failed to read config {}: {}", path.display(), e))
    })?;

    let config: Config = toml::from_str(&contents).map_err(|e| {
        Error::InvalidArgs(format!("failed to parse config {}: {}", path.display(), e))
    })?;

    Ok(config)
}
