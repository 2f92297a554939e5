//! Typed accessors to claimed pins.
//!
//! Exactly one handle exists per claimed pin and ownership moves with the
//! handle; none of the types here are `Clone`. Handles release their pin on
//! drop, and release is idempotent so teardown paths may also call it
//! explicitly.

use std::fmt;
use std::sync::Arc;

use crate::driver::Direction;
use crate::error::PinError;
use crate::pin::{Signal, Usage};
use crate::registry::RegistryInner;

/// Shared bookkeeping for every handle variant: the registry back-reference
/// and the pin's numbers in each scheme.
pub(crate) struct ClaimedPin {
    inner: Arc<RegistryInner>,
    board: u8,
    bcm: Option<u8>,
    wired: u8,
    active_low: bool,
    released: bool,
}

impl fmt::Debug for ClaimedPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimedPin")
            .field("board", &self.board)
            .field("bcm", &self.bcm)
            .field("wired", &self.wired)
            .field("active_low", &self.active_low)
            .field("released", &self.released)
            .finish()
    }
}

impl ClaimedPin {
    pub(crate) fn new(
        inner: Arc<RegistryInner>,
        board: u8,
        bcm: Option<u8>,
        wired: u8,
        active_low: bool,
    ) -> Self {
        Self { inner, board, bcm, wired, active_low, released: false }
    }

    fn ensure_live(&self) -> Result<(), PinError> {
        if self.released {
            Err(PinError::Released { pin: self.board })
        } else {
            Ok(())
        }
    }

    /// Common tail of every release: revert to input (the safe default),
    /// free the OS-level resource, drop the registration. Driver failures
    /// are logged and swallowed; teardown always runs to completion.
    fn finish_release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let driver = &self.inner.driver;
        if let Err(err) = driver.set_direction(self.board, Direction::In) {
            tracing::warn!("pin {}: revert to input failed: {}", self.board, err);
        }
        if let Err(err) = driver.unexport(self.board) {
            tracing::warn!("pin {}: unexport failed: {}", self.board, err);
        }
        self.inner.pins.lock().unwrap().remove(&self.board);
        tracing::info!("released pin {}", self.board);
    }
}

/// Readable pin. Every `read` is a fresh driver call; nothing is cached.
#[derive(Debug)]
pub struct InputHandle {
    pin: ClaimedPin,
}

impl InputHandle {
    pub(crate) fn new(pin: ClaimedPin) -> Self {
        Self { pin }
    }

    /// Reads the logical level, applying the active-low inversion
    /// configured at claim time.
    pub fn read(&self) -> Result<Signal, PinError> {
        self.pin.ensure_live()?;
        let raw = self.pin.inner.driver.read_value(self.pin.board)?;
        Ok(Signal::from_raw(raw).with_active_low(self.pin.active_low))
    }

    pub fn board_pin(&self) -> u8 {
        self.pin.board
    }

    pub fn bcm_pin(&self) -> Option<u8> {
        self.pin.bcm
    }

    pub fn wired_pin(&self) -> u8 {
        self.pin.wired
    }

    pub fn is_active_low(&self) -> bool {
        self.pin.active_low
    }

    /// Idempotent; releasing twice is a no-op, not an error.
    pub fn release(&mut self) {
        self.pin.finish_release();
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.pin.finish_release();
    }
}

/// Writable pin. Keeps the last successfully written level for
/// introspection.
#[derive(Debug)]
pub struct OutputHandle {
    pin: ClaimedPin,
    last_written: Option<Signal>,
}

impl OutputHandle {
    pub(crate) fn new(pin: ClaimedPin) -> Self {
        Self { pin, last_written: None }
    }

    /// Writes the logical level; the active-low inversion is applied
    /// symmetrically to reads. A failed write leaves the last-written
    /// record unchanged.
    pub fn write(&mut self, signal: Signal) -> Result<(), PinError> {
        self.pin.ensure_live()?;
        let raw = signal.with_active_low(self.pin.active_low).as_raw();
        self.pin.inner.driver.write_value(self.pin.board, raw)?;
        self.last_written = Some(signal);
        Ok(())
    }

    pub fn last_written(&self) -> Option<Signal> {
        self.last_written
    }

    pub fn board_pin(&self) -> u8 {
        self.pin.board
    }

    pub fn bcm_pin(&self) -> Option<u8> {
        self.pin.bcm
    }

    pub fn wired_pin(&self) -> u8 {
        self.pin.wired
    }

    pub fn is_active_low(&self) -> bool {
        self.pin.active_low
    }

    /// Drives the pin to its inactive level before the direction reverts,
    /// so no actuator is left energized. Idempotent.
    pub fn release(&mut self) {
        if self.pin.released {
            return;
        }
        let inactive = Signal::Low.with_active_low(self.pin.active_low).as_raw();
        if let Err(err) = self.pin.inner.driver.write_value(self.pin.board, inactive) {
            tracing::warn!("pin {}: drive to inactive failed: {}", self.pin.board, err);
        }
        self.pin.finish_release();
    }
}

impl Drop for OutputHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Hardware-PWM pin. Duty cycle lives in `0.0..=1.0`; 0.0 and PWM-disable
/// are the same thing at teardown.
#[derive(Debug)]
pub struct PwmHandle {
    pin: ClaimedPin,
    duty: f64,
}

impl PwmHandle {
    pub(crate) fn new(pin: ClaimedPin) -> Self {
        Self { pin, duty: 0.0 }
    }

    pub fn set_duty_cycle(&mut self, duty: f64) -> Result<(), PinError> {
        self.pin.ensure_live()?;
        if !(0.0..=1.0).contains(&duty) {
            return Err(PinError::OutOfRange { duty });
        }
        self.pin.inner.driver.set_pwm_duty(self.pin.board, duty)?;
        self.duty = duty;
        Ok(())
    }

    pub fn duty_cycle(&self) -> f64 {
        self.duty
    }

    pub fn board_pin(&self) -> u8 {
        self.pin.board
    }

    pub fn bcm_pin(&self) -> Option<u8> {
        self.pin.bcm
    }

    pub fn wired_pin(&self) -> u8 {
        self.pin.wired
    }

    /// Zeroes the duty before the direction reverts. Idempotent.
    pub fn release(&mut self) {
        if self.pin.released {
            return;
        }
        if let Err(err) = self.pin.inner.driver.set_pwm_duty(self.pin.board, 0.0) {
            tracing::warn!("pin {}: pwm off failed: {}", self.pin.board, err);
        }
        self.pin.finish_release();
    }
}

impl Drop for PwmHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Handle variant keyed by usage, for callers that claim from data (the
/// pinout plan) rather than statically knowing the usage.
#[derive(Debug)]
pub enum PinHandle {
    Input(InputHandle),
    Output(OutputHandle),
    Pwm(PwmHandle),
}

impl PinHandle {
    pub fn usage(&self) -> Usage {
        match self {
            PinHandle::Input(_) => Usage::Input,
            PinHandle::Output(_) => Usage::Output,
            PinHandle::Pwm(_) => Usage::Pwm,
        }
    }

    pub fn board_pin(&self) -> u8 {
        match self {
            PinHandle::Input(handle) => handle.board_pin(),
            PinHandle::Output(handle) => handle.board_pin(),
            PinHandle::Pwm(handle) => handle.board_pin(),
        }
    }

    pub fn release(&mut self) {
        match self {
            PinHandle::Input(handle) => handle.release(),
            PinHandle::Output(handle) => handle.release(),
            PinHandle::Pwm(handle) => handle.release(),
        }
    }
}
