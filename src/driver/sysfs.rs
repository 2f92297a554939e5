//! Sysfs-backed GPIO driver.
//!
//! The sysfs interface addresses pins by SoC number, so this driver
//! resolves physical numbers through its board profile before touching any
//! file. The root directory is configurable for tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::board::BoardProfile;
use crate::numbering::Scheme;
use crate::pin::Resistor;

use super::{Direction, DriverError, GpioDriver};

const DEFAULT_ROOT: &str = "/sys/class/gpio";

pub struct SysfsDriver {
    profile: Arc<BoardProfile>,
    root: PathBuf,
}

impl SysfsDriver {
    pub fn new(profile: Arc<BoardProfile>) -> Self {
        Self::with_root(profile, DEFAULT_ROOT)
    }

    pub fn with_root(profile: Arc<BoardProfile>, root: impl AsRef<Path>) -> Self {
        Self { profile, root: root.as_ref().to_path_buf() }
    }

    fn bcm(&self, board_pin: u8) -> Result<u8, DriverError> {
        self.profile
            .translate(board_pin, Scheme::Board, Scheme::Bcm)
            .map_err(|_| DriverError::Unsupported("pin has no soc number"))
    }

    fn pin_file(&self, bcm: u8, leaf: &str) -> PathBuf {
        self.root.join(format!("gpio{bcm}")).join(leaf)
    }
}

impl GpioDriver for SysfsDriver {
    fn export(&self, board_pin: u8) -> Result<(), DriverError> {
        let bcm = self.bcm(board_pin)?;
        tracing::debug!("exporting pin {} (bcm {})", board_pin, bcm);
        fs::write(self.root.join("export"), bcm.to_string())?;
        Ok(())
    }

    fn unexport(&self, board_pin: u8) -> Result<(), DriverError> {
        let bcm = self.bcm(board_pin)?;
        tracing::debug!("unexporting pin {} (bcm {})", board_pin, bcm);
        fs::write(self.root.join("unexport"), bcm.to_string())?;
        Ok(())
    }

    fn set_direction(&self, board_pin: u8, direction: Direction) -> Result<(), DriverError> {
        let bcm = self.bcm(board_pin)?;
        fs::write(self.pin_file(bcm, "direction"), direction.to_string())?;
        Ok(())
    }

    fn set_bias(&self, board_pin: u8, resistor: Resistor) -> Result<(), DriverError> {
        // Sysfs exposes no bias control; the boot-time pull configuration
        // stays in effect.
        tracing::debug!(
            "pin {}: bias {} requested, sysfs has no bias control",
            board_pin, resistor
        );
        Ok(())
    }

    fn read_value(&self, board_pin: u8) -> Result<u8, DriverError> {
        let bcm = self.bcm(board_pin)?;
        let text = fs::read_to_string(self.pin_file(bcm, "value"))?;
        Ok(if text.trim() == "0" { 0 } else { 1 })
    }

    fn write_value(&self, board_pin: u8, raw: u8) -> Result<(), DriverError> {
        let bcm = self.bcm(board_pin)?;
        fs::write(self.pin_file(bcm, "value"), raw.to_string())?;
        Ok(())
    }

    fn set_pwm_duty(&self, _board_pin: u8, _duty: f64) -> Result<(), DriverError> {
        Err(DriverError::Unsupported("sysfs gpio has no pwm backend"))
    }
}
