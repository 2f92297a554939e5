use thiserror::Error;

use crate::driver::DriverError;
use crate::numbering::Scheme;
use crate::pin::Usage;

/// Errors surfaced by translation, claiming, and handle I/O. All are
/// reported synchronously to the caller; nothing is retried internally.
#[derive(Debug, Error)]
pub enum PinError {
    #[error("pin {pin} has no mapping in the {scheme} numbering scheme")]
    UnknownPin { scheme: Scheme, pin: u8 },
    #[error("physical pin {pin} is already claimed")]
    PinOccupied { pin: u8 },
    #[error("physical pin {pin} does not support {usage} usage")]
    CapabilityMismatch { pin: u8, usage: Usage },
    #[error("physical pin {pin} has no wired number and cannot be driven")]
    InvalidWiring { pin: u8 },
    #[error("duty cycle {duty} is outside 0.0..=1.0")]
    OutOfRange { duty: f64 },
    #[error("physical pin {pin} was accessed through a released handle")]
    Released { pin: u8 },
    #[error("gpio driver error: {0}")]
    Driver(#[from] DriverError),
}
