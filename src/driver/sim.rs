//! In-memory GPIO driver for tests and dry runs.
//!
//! Keeps per-pin state behind a mutex and records every operation in a
//! journal so tests can assert ordering (teardown must drive the inactive
//! level before reverting direction). Faults can be injected per operation
//! kind to exercise the registry's rollback path.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::pin::Resistor;

use super::{Direction, DriverError, GpioDriver};

/// Operation kinds, used for fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimOp {
    Export,
    Unexport,
    SetDirection,
    SetBias,
    Read,
    Write,
    Pwm,
}

impl SimOp {
    fn name(self) -> &'static str {
        match self {
            SimOp::Export => "export",
            SimOp::Unexport => "unexport",
            SimOp::SetDirection => "set_direction",
            SimOp::SetBias => "set_bias",
            SimOp::Read => "read",
            SimOp::Write => "write",
            SimOp::Pwm => "pwm",
        }
    }
}

/// Observable state of one simulated pin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimPin {
    pub exported: bool,
    pub direction: Option<Direction>,
    pub bias: Option<Resistor>,
    pub value: u8,
    pub duty: f64,
}

#[derive(Default)]
struct SimState {
    pins: HashMap<u8, SimPin>,
    journal: Vec<String>,
    fail_on: HashSet<SimOp>,
}

#[derive(Default)]
pub struct SimDriver {
    state: Mutex<SimState>,
}

impl SimDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation of the given kind fail.
    pub fn fail_on(&self, op: SimOp) {
        self.state.lock().unwrap().fail_on.insert(op);
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().fail_on.clear();
    }

    /// Feeds the raw level the next reads will observe.
    pub fn set_input_value(&self, board_pin: u8, raw: u8) {
        let mut state = self.state.lock().unwrap();
        state.pins.entry(board_pin).or_default().value = raw;
    }

    /// Snapshot of one pin's simulated state.
    pub fn pin(&self, board_pin: u8) -> SimPin {
        self.state
            .lock()
            .unwrap()
            .pins
            .get(&board_pin)
            .cloned()
            .unwrap_or_default()
    }

    /// Every operation performed so far, in order.
    pub fn journal(&self) -> Vec<String> {
        self.state.lock().unwrap().journal.clone()
    }

    fn record(
        &self,
        op: SimOp,
        entry: String,
        apply: impl FnOnce(&mut SimState),
    ) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_on.contains(&op) {
            return Err(DriverError::Injected(op.name()));
        }
        state.journal.push(entry);
        apply(&mut state);
        Ok(())
    }
}

impl GpioDriver for SimDriver {
    fn export(&self, board_pin: u8) -> Result<(), DriverError> {
        self.record(SimOp::Export, format!("export {board_pin}"), |state| {
            state.pins.entry(board_pin).or_default().exported = true;
        })
    }

    fn unexport(&self, board_pin: u8) -> Result<(), DriverError> {
        self.record(SimOp::Unexport, format!("unexport {board_pin}"), |state| {
            state.pins.entry(board_pin).or_default().exported = false;
        })
    }

    fn set_direction(&self, board_pin: u8, direction: Direction) -> Result<(), DriverError> {
        self.record(
            SimOp::SetDirection,
            format!("direction {board_pin} {direction}"),
            |state| {
                state.pins.entry(board_pin).or_default().direction = Some(direction);
            },
        )
    }

    fn set_bias(&self, board_pin: u8, resistor: Resistor) -> Result<(), DriverError> {
        self.record(
            SimOp::SetBias,
            format!("bias {board_pin} {resistor}"),
            |state| {
                state.pins.entry(board_pin).or_default().bias = Some(resistor);
            },
        )
    }

    fn read_value(&self, board_pin: u8) -> Result<u8, DriverError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_on.contains(&SimOp::Read) {
            return Err(DriverError::Injected(SimOp::Read.name()));
        }
        let value = state.pins.get(&board_pin).map(|pin| pin.value).unwrap_or(0);
        state.journal.push(format!("read {board_pin}"));
        Ok(value)
    }

    fn write_value(&self, board_pin: u8, raw: u8) -> Result<(), DriverError> {
        self.record(SimOp::Write, format!("write {board_pin} {raw}"), |state| {
            state.pins.entry(board_pin).or_default().value = raw;
        })
    }

    fn set_pwm_duty(&self, board_pin: u8, duty: f64) -> Result<(), DriverError> {
        self.record(SimOp::Pwm, format!("pwm {board_pin} {duty:.2}"), |state| {
            state.pins.entry(board_pin).or_default().duty = duty;
        })
    }
}
