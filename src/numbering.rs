//! Translation between pin numbering schemes.
//!
//! Three schemes address the same header: `Board` is the physical connector
//! position, `Bcm` the SoC signal number, `Wired` the sequential library
//! numbering. A number is meaningless without its scheme, so every
//! translation names both ends explicitly. A pin that cannot be expressed
//! in the destination scheme is an `UnknownPin` error, never a sentinel
//! value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::board::BoardProfile;
use crate::error::PinError;

/// A pin numbering scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    /// Physical connector position.
    Board,
    /// SoC signal number.
    Bcm,
    /// Library-specific sequential numbering.
    Wired,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Board => write!(f, "board"),
            Scheme::Bcm => write!(f, "bcm"),
            Scheme::Wired => write!(f, "wired"),
        }
    }
}

/// A pin number together with the scheme it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinIdentifier {
    pub scheme: Scheme,
    pub pin: u8,
}

impl PinIdentifier {
    pub fn board(pin: u8) -> Self {
        Self { scheme: Scheme::Board, pin }
    }

    pub fn bcm(pin: u8) -> Self {
        Self { scheme: Scheme::Bcm, pin }
    }

    pub fn wired(pin: u8) -> Self {
        Self { scheme: Scheme::Wired, pin }
    }
}

impl fmt::Display for PinIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scheme, self.pin)
    }
}

impl BoardProfile {
    /// Converts a pin number between schemes.
    ///
    /// Translating into the board scheme is a forward table lookup;
    /// translating out of it searches the forward table for the board
    /// number. Board to board is the identity for pins the header has.
    /// Pure function of the profile; safe to call from any thread.
    pub fn translate(&self, pin: u8, from: Scheme, to: Scheme) -> Result<u8, PinError> {
        let board = match from {
            Scheme::Board => {
                if !self.names().contains_key(&pin) {
                    return Err(PinError::UnknownPin { scheme: Scheme::Board, pin });
                }
                pin
            }
            Scheme::Bcm => forward(self.bcm_to_board(), pin, Scheme::Bcm)?,
            Scheme::Wired => forward(self.wired_to_board(), pin, Scheme::Wired)?,
        };

        match to {
            Scheme::Board => Ok(board),
            Scheme::Bcm => reverse(self.bcm_to_board(), board, Scheme::Bcm),
            Scheme::Wired => reverse(self.wired_to_board(), board, Scheme::Wired),
        }
    }
}

fn forward(table: &BTreeMap<u8, u8>, pin: u8, scheme: Scheme) -> Result<u8, PinError> {
    table
        .get(&pin)
        .copied()
        .ok_or(PinError::UnknownPin { scheme, pin })
}

fn reverse(table: &BTreeMap<u8, u8>, board: u8, scheme: Scheme) -> Result<u8, PinError> {
    table
        .iter()
        .find(|(_, mapped)| **mapped == board)
        .map(|(key, _)| *key)
        .ok_or(PinError::UnknownPin { scheme, pin: board })
}
