// pinbroker: pin numbering translation, exclusive pin ownership, and typed
// GPIO handles for single-board computers.

pub mod board;
pub mod capability;
pub mod config;
pub mod driver;
pub mod error;
pub mod handle;
pub mod numbering;
pub mod pin;
pub mod registry;
pub mod system;
pub mod watch;

pub use board::{BoardProfile, ProfileError};
pub use capability::CapabilityMask;
pub use config::{ConfigError, PinoutPlan};
pub use driver::{Direction, DriverError, GpioDriver};
pub use error::PinError;
pub use handle::{InputHandle, OutputHandle, PinHandle, PwmHandle};
pub use numbering::{PinIdentifier, Scheme};
pub use pin::{ClaimOptions, PinInfo, Resistor, Signal, Usage};
pub use registry::{PinRegistration, PinRegistry};
pub use system::BoardIdentity;
pub use watch::{Edge, PinEvent, PinWatcher};
