//! Plain data types shared across the registry, handles, and configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capability::CapabilityMask;

/// What a claimed pin is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Usage {
    Input,
    Output,
    Pwm,
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Usage::Input => write!(f, "input"),
            Usage::Output => write!(f, "output"),
            Usage::Pwm => write!(f, "pwm"),
        }
    }
}

/// Logical signal level. With active-low wiring the logical level is the
/// inverse of the raw electrical level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Low,
    High,
}

impl Signal {
    pub fn from_raw(raw: u8) -> Self {
        if raw == 0 { Signal::Low } else { Signal::High }
    }

    pub fn as_raw(self) -> u8 {
        match self {
            Signal::Low => 0,
            Signal::High => 1,
        }
    }

    pub fn inverted(self) -> Self {
        match self {
            Signal::Low => Signal::High,
            Signal::High => Signal::Low,
        }
    }

    /// Maps between raw and logical levels. The inversion is symmetric, so
    /// the same call serves both directions.
    pub fn with_active_low(self, active_low: bool) -> Self {
        if active_low { self.inverted() } else { self }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Low => write!(f, "low"),
            Signal::High => write!(f, "high"),
        }
    }
}

/// Input bias resistor selection. Only meaningful for input claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resistor {
    #[default]
    None,
    PullUp,
    PullDown,
}

impl fmt::Display for Resistor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resistor::None => write!(f, "none"),
            Resistor::PullUp => write!(f, "pull_up"),
            Resistor::PullDown => write!(f, "pull_down"),
        }
    }
}

/// Options supplied with a claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimOptions {
    pub resistor: Resistor,
    pub active_low: bool,
}

impl ClaimOptions {
    pub fn active_low() -> Self {
        Self { active_low: true, ..Self::default() }
    }

    pub fn with_resistor(resistor: Resistor) -> Self {
        Self { resistor, ..Self::default() }
    }
}

/// Immutable snapshot of one physical pin, computed on demand from the
/// board profile. `None` means the pin has no number in that scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinInfo {
    pub board_pin: u8,
    pub bcm_pin: Option<u8>,
    pub wired_pin: Option<u8>,
    pub name: String,
    pub capabilities: CapabilityMask,
}

impl PinInfo {
    /// Whether the pin can be claimed for GPIO usage at all.
    pub fn is_claimable(&self) -> bool {
        self.capabilities.contains(CapabilityMask::GPIO)
    }
}
