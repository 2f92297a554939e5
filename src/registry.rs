//! Exclusive pin ownership, claim and release.
//!
//! The registry is the only writer of the pin table. One mutex guards the
//! table and the driver configuration done under a claim, which makes claim
//! and release atomic with respect to each other; ports are claimed at
//! startup, not in hot loops, so a table-wide lock is fine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::board::BoardProfile;
use crate::driver::{Direction, DriverError, GpioDriver};
use crate::error::PinError;
use crate::handle::{ClaimedPin, InputHandle, OutputHandle, PinHandle, PwmHandle};
use crate::numbering::{PinIdentifier, Scheme};
use crate::pin::{ClaimOptions, PinInfo, Resistor, Signal, Usage};

/// Registry entry for one claimed pin. At most one exists per physical pin
/// at any time; that is the correctness property everything else leans on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRegistration {
    pub usage: Usage,
    pub resistor: Resistor,
    pub active_low: bool,
}

pub(crate) struct RegistryInner {
    pub(crate) profile: Arc<BoardProfile>,
    pub(crate) driver: Arc<dyn GpioDriver>,
    pub(crate) pins: Mutex<HashMap<u8, PinRegistration>>,
}

/// Arbitrates pin ownership for one board.
///
/// The registry is an explicit instance, not a process global; embedders
/// that want process-wide arbitration share one instance. Clones share the
/// same pin table.
#[derive(Clone)]
pub struct PinRegistry {
    inner: Arc<RegistryInner>,
}

impl PinRegistry {
    pub fn new(profile: Arc<BoardProfile>, driver: Arc<dyn GpioDriver>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                profile,
                driver,
                pins: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn profile(&self) -> &BoardProfile {
        &self.inner.profile
    }

    /// Claims a pin for the given usage, returning the matching handle
    /// variant. Claims are not reentrant: re-claiming a pin requires
    /// releasing the existing handle first.
    pub fn claim(
        &self,
        pin: PinIdentifier,
        usage: Usage,
        options: ClaimOptions,
    ) -> Result<PinHandle, PinError> {
        match usage {
            Usage::Input => self.claim_input(pin, options).map(PinHandle::Input),
            Usage::Output => self.claim_output(pin, options).map(PinHandle::Output),
            Usage::Pwm => self.claim_pwm(pin).map(PinHandle::Pwm),
        }
    }

    pub fn claim_input(
        &self,
        pin: PinIdentifier,
        options: ClaimOptions,
    ) -> Result<InputHandle, PinError> {
        self.acquire(pin, Usage::Input, options).map(InputHandle::new)
    }

    pub fn claim_output(
        &self,
        pin: PinIdentifier,
        options: ClaimOptions,
    ) -> Result<OutputHandle, PinError> {
        self.acquire(pin, Usage::Output, options).map(OutputHandle::new)
    }

    pub fn claim_pwm(&self, pin: PinIdentifier) -> Result<PwmHandle, PinError> {
        self.acquire(pin, Usage::Pwm, ClaimOptions::default())
            .map(PwmHandle::new)
    }

    /// Whether a registration currently exists for the physical pin.
    pub fn is_pin_used(&self, board_pin: u8) -> bool {
        self.inner.pins.lock().unwrap().contains_key(&board_pin)
    }

    /// Snapshot of the registration for the physical pin, if any.
    pub fn describe(&self, board_pin: u8) -> Option<PinRegistration> {
        self.inner.pins.lock().unwrap().get(&board_pin).cloned()
    }

    pub fn pin_info(&self, pin: PinIdentifier) -> Result<PinInfo, PinError> {
        self.inner.profile.pin_info(pin)
    }

    fn acquire(
        &self,
        pin: PinIdentifier,
        usage: Usage,
        options: ClaimOptions,
    ) -> Result<ClaimedPin, PinError> {
        let profile = &self.inner.profile;
        let board = profile.translate(pin.pin, pin.scheme, Scheme::Board)?;

        let mut pins = self.inner.pins.lock().unwrap();
        if pins.contains_key(&board) {
            return Err(PinError::PinOccupied { pin: board });
        }
        if !profile.supports(board, usage) {
            return Err(PinError::CapabilityMismatch { pin: board, usage });
        }
        // Downstream hardware configuration is addressed by wired
        // numbering; a pin the wired scheme cannot express is unusable
        // even when free.
        let wired = profile
            .translate(board, Scheme::Board, Scheme::Wired)
            .map_err(|_| PinError::InvalidWiring { pin: board })?;
        let bcm = profile.translate(board, Scheme::Board, Scheme::Bcm).ok();

        self.configure(board, usage, &options)?;

        let resistor = if usage == Usage::Input { options.resistor } else { Resistor::None };
        pins.insert(
            board,
            PinRegistration { usage, resistor, active_low: options.active_low },
        );
        tracing::info!(
            "claimed pin {} ({}) as {}",
            board,
            profile.name(board).unwrap_or("?"),
            usage
        );
        Ok(ClaimedPin::new(
            Arc::clone(&self.inner),
            board,
            bcm,
            wired,
            options.active_low,
        ))
    }

    /// Configures direction, bias, and the initial inactive level. On
    /// failure the partial configuration is undone so the pin is left
    /// unclaimed; no half-claimed state survives a failed claim.
    fn configure(
        &self,
        board: u8,
        usage: Usage,
        options: &ClaimOptions,
    ) -> Result<(), DriverError> {
        let driver = &self.inner.driver;
        driver.export(board)?;

        let configured = match usage {
            Usage::Input => driver
                .set_direction(board, Direction::In)
                .and_then(|_| driver.set_bias(board, options.resistor)),
            Usage::Output => driver.set_direction(board, Direction::Out).and_then(|_| {
                let inactive = Signal::Low.with_active_low(options.active_low).as_raw();
                driver.write_value(board, inactive)
            }),
            Usage::Pwm => driver
                .set_direction(board, Direction::Out)
                .and_then(|_| driver.set_pwm_duty(board, 0.0)),
        };

        if let Err(err) = configured {
            if let Err(revert) = driver.set_direction(board, Direction::In) {
                tracing::warn!("pin {}: rollback to input failed: {}", board, revert);
            }
            if let Err(revert) = driver.unexport(board) {
                tracing::warn!("pin {}: rollback unexport failed: {}", board, revert);
            }
            return Err(err);
        }
        Ok(())
    }
}
