//! The GPIO driver capability.
//!
//! Everything that touches the operating system's GPIO surface goes through
//! [`GpioDriver`]; the registry and handles never open device files
//! themselves. That keeps the whole pin lifecycle testable against the
//! in-memory simulator. All methods are addressed by physical pin number
//! and are fast, synchronous calls; a stuck driver is fatal to the caller,
//! not retried here.

pub mod sim;
pub mod sysfs;

use std::fmt;
use thiserror::Error;

use crate::pin::Resistor;

pub use sim::SimDriver;
pub use sysfs::SysfsDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("gpio i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("operation not supported by this driver: {0}")]
    Unsupported(&'static str),
    #[error("injected fault on {0}")]
    Injected(&'static str),
}

/// OS-level GPIO access, substitutable with [`SimDriver`] for tests and
/// dry runs.
pub trait GpioDriver: Send + Sync {
    fn export(&self, board_pin: u8) -> Result<(), DriverError>;
    fn unexport(&self, board_pin: u8) -> Result<(), DriverError>;
    fn set_direction(&self, board_pin: u8, direction: Direction) -> Result<(), DriverError>;
    fn set_bias(&self, board_pin: u8, resistor: Resistor) -> Result<(), DriverError>;
    fn read_value(&self, board_pin: u8) -> Result<u8, DriverError>;
    fn write_value(&self, board_pin: u8, raw: u8) -> Result<(), DriverError>;
    fn set_pwm_duty(&self, board_pin: u8, duty: f64) -> Result<(), DriverError>;
}
