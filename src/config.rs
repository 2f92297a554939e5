//! TOML pinout plan: which pins to claim at startup and how.
//!
//! ```toml
//! [board]
//! revision = "a02082"       # optional, overrides detection
//!
//! [driver]
//! kind = "sysfs"            # or "sim"
//!
//! [watch]
//! poll_ms = 10
//!
//! [[inputs]]
//! pin = 0                   # wired scheme unless stated otherwise
//! resistor = "pull_down"
//! watch = "rising"
//!
//! [[outputs]]
//! pin = 1
//! active_low = true
//!
//! [[outputs]]
//! pin = 12
//! scheme = "board"
//! pwm = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::PinError;
use crate::handle::PinHandle;
use crate::numbering::{PinIdentifier, Scheme};
use crate::pin::{ClaimOptions, Resistor};
use crate::registry::PinRegistry;
use crate::watch::Edge;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PinoutPlan {
    #[serde(default)]
    pub board: BoardSection,
    #[serde(default)]
    pub driver: DriverSection,
    #[serde(default)]
    pub watch: WatchSection,
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BoardSection {
    #[serde(default)]
    pub revision: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriverSection {
    #[serde(default)]
    pub kind: DriverKind,
    #[serde(default)]
    pub sysfs_root: Option<PathBuf>,
}

impl Default for DriverSection {
    fn default() -> Self {
        Self { kind: DriverKind::Sysfs, sysfs_root: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    #[default]
    Sysfs,
    Sim,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatchSection {
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self { poll_ms: default_poll_ms() }
    }
}

fn default_poll_ms() -> u64 {
    10
}

/// Declared input pin. The wired scheme is the plan default, matching how
/// wiring lists are usually written down.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputSpec {
    pub pin: u8,
    #[serde(default = "default_scheme")]
    pub scheme: Scheme,
    #[serde(default)]
    pub resistor: Resistor,
    #[serde(default)]
    pub active_low: bool,
    #[serde(default)]
    pub watch: Option<Edge>,
}

/// Declared output pin; `pwm = true` claims the hardware PWM channel.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputSpec {
    pub pin: u8,
    #[serde(default = "default_scheme")]
    pub scheme: Scheme,
    #[serde(default)]
    pub pwm: bool,
    #[serde(default)]
    pub active_low: bool,
}

fn default_scheme() -> Scheme {
    Scheme::Wired
}

/// A pin claimed through a plan, plus its watch request if any.
#[derive(Debug)]
pub struct PlannedPin {
    pub handle: PinHandle,
    pub watch: Option<Edge>,
}

pub fn load_plan(path: impl AsRef<Path>) -> Result<PinoutPlan, ConfigError> {
    let text = fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

impl PinoutPlan {
    /// Claims every declared pin, inputs first. Fails fast on the first
    /// error; pins already claimed from this plan are released when the
    /// partial result drops.
    pub fn claim_all(&self, registry: &PinRegistry) -> Result<Vec<PlannedPin>, PinError> {
        let mut claimed = Vec::with_capacity(self.inputs.len() + self.outputs.len());
        for input in &self.inputs {
            let identifier = PinIdentifier { scheme: input.scheme, pin: input.pin };
            let options =
                ClaimOptions { resistor: input.resistor, active_low: input.active_low };
            let handle = registry.claim_input(identifier, options)?;
            claimed.push(PlannedPin { handle: PinHandle::Input(handle), watch: input.watch });
        }
        for output in &self.outputs {
            let identifier = PinIdentifier { scheme: output.scheme, pin: output.pin };
            let handle = if output.pwm {
                PinHandle::Pwm(registry.claim_pwm(identifier)?)
            } else {
                let options =
                    ClaimOptions { active_low: output.active_low, ..Default::default() };
                PinHandle::Output(registry.claim_output(identifier, options)?)
            };
            claimed.push(PlannedPin { handle, watch: None });
        }
        Ok(claimed)
    }
}
