//! Board profiles: per-revision numbering tables and capability sets.
//!
//! A profile is immutable after construction. The built-in layouts cover the
//! 26-pin rev 1/rev 2 headers and the 40-pin header; custom boards can be
//! described with [`BoardProfile::builder`].

mod layouts;

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::capability::CapabilityMask;
use crate::error::PinError;
use crate::numbering::{PinIdentifier, Scheme};
use crate::pin::PinInfo;
use crate::system::BoardIdentity;

use layouts::LayoutData;

/// Revision codes with bit 23 set use the new-style field encoding.
const NEW_STYLE_FLAG: u32 = 1 << 23;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read board identity: {0}")]
    Io(#[from] std::io::Error),
    #[error("no revision field found in cpuinfo")]
    MissingRevision,
    #[error("unknown board revision '{0}'")]
    UnknownRevision(String),
}

/// Static wiring description of one board revision.
#[derive(Debug, Clone)]
pub struct BoardProfile {
    revision: String,
    model_name: String,
    names: BTreeMap<u8, String>,
    bcm_to_board: BTreeMap<u8, u8>,
    wired_to_board: BTreeMap<u8, u8>,
    functions: Vec<(CapabilityMask, BTreeSet<u8>)>,
}

impl BoardProfile {
    /// Probes `/proc/cpuinfo` and builds the profile for the running board.
    /// An unknown revision is a fatal startup error, not something callers
    /// are expected to recover from.
    pub fn detect() -> Result<Self, ProfileError> {
        let identity = BoardIdentity::detect()?;
        let profile = Self::from_revision(&identity.revision)?;
        tracing::info!(
            "detected {} (revision {})",
            profile.model_name, profile.revision
        );
        Ok(profile)
    }

    /// Builds the profile for a known revision code.
    pub fn from_revision(revision: &str) -> Result<Self, ProfileError> {
        let trimmed = revision.trim();
        let code = u32::from_str_radix(trimmed, 16)
            .map_err(|_| ProfileError::UnknownRevision(trimmed.to_string()))?;

        let (model_name, layout) = if code & NEW_STYLE_FLAG != 0 {
            (decode_new_style(code, trimmed)?, &layouts::LAYOUT_40)
        } else {
            // Over-volt history is recorded in the high bits of old-style
            // codes; only the low half identifies the board.
            match code & 0xffff {
                0x0002 | 0x0003 => ("Model B rev 1", &layouts::LAYOUT_26_R1),
                0x0004..=0x0006 | 0x000d..=0x000f => ("Model B rev 2", &layouts::LAYOUT_26_R2),
                0x0007..=0x0009 => ("Model A", &layouts::LAYOUT_26_R2),
                0x0010 | 0x0013 => ("Model B+", &layouts::LAYOUT_40),
                0x0012 | 0x0015 => ("Model A+", &layouts::LAYOUT_40),
                _ => return Err(ProfileError::UnknownRevision(trimmed.to_string())),
            }
        };

        Ok(Self::from_layout(trimmed, model_name, layout))
    }

    fn from_layout(revision: &str, model_name: &str, layout: &LayoutData) -> Self {
        Self {
            revision: revision.to_string(),
            model_name: model_name.to_string(),
            names: layout
                .names
                .iter()
                .map(|(pin, name)| (*pin, (*name).to_string()))
                .collect(),
            bcm_to_board: layout.bcm_to_board.iter().copied().collect(),
            wired_to_board: layout.wired_to_board.iter().copied().collect(),
            functions: layout
                .functions
                .iter()
                .map(|(mask, pins)| (*mask, pins.iter().copied().collect()))
                .collect(),
        }
    }

    /// Starts a description of a board this crate has no built-in layout
    /// for.
    pub fn builder(revision: &str, model_name: &str) -> BoardProfileBuilder {
        BoardProfileBuilder {
            profile: Self {
                revision: revision.to_string(),
                model_name: model_name.to_string(),
                names: BTreeMap::new(),
                bcm_to_board: BTreeMap::new(),
                wired_to_board: BTreeMap::new(),
                functions: Vec::new(),
            },
        }
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Physical pin numbers of the header, in order.
    pub fn board_pins(&self) -> impl Iterator<Item = u8> + '_ {
        self.names.keys().copied()
    }

    pub fn name(&self, board_pin: u8) -> Option<&str> {
        self.names.get(&board_pin).map(String::as_str)
    }

    /// Snapshot of one pin across all schemes. `None` fields mean the pin
    /// has no number in that scheme.
    pub fn pin_info(&self, pin: PinIdentifier) -> Result<PinInfo, PinError> {
        let board = self.translate(pin.pin, pin.scheme, Scheme::Board)?;
        Ok(PinInfo {
            board_pin: board,
            bcm_pin: self.translate(board, Scheme::Board, Scheme::Bcm).ok(),
            wired_pin: self.translate(board, Scheme::Board, Scheme::Wired).ok(),
            name: self.names.get(&board).cloned().unwrap_or_default(),
            capabilities: self.capabilities(board),
        })
    }

    pub(crate) fn names(&self) -> &BTreeMap<u8, String> {
        &self.names
    }

    pub(crate) fn bcm_to_board(&self) -> &BTreeMap<u8, u8> {
        &self.bcm_to_board
    }

    pub(crate) fn wired_to_board(&self) -> &BTreeMap<u8, u8> {
        &self.wired_to_board
    }

    pub(crate) fn functions(&self) -> &[(CapabilityMask, BTreeSet<u8>)] {
        &self.functions
    }
}

fn decode_new_style(code: u32, revision: &str) -> Result<&'static str, ProfileError> {
    match (code >> 4) & 0xff {
        0x00 => Ok("Model A"),
        0x01 => Ok("Model B"),
        0x02 => Ok("Model A+"),
        0x03 => Ok("Model B+"),
        0x04 => Ok("Pi 2 Model B"),
        0x08 => Ok("Pi 3 Model B"),
        0x09 => Ok("Pi Zero"),
        0x0c => Ok("Pi Zero W"),
        0x0d => Ok("Pi 3 Model B+"),
        0x0e => Ok("Pi 3 Model A+"),
        0x11 => Ok("Pi 4 Model B"),
        0x12 => Ok("Pi Zero 2 W"),
        0x13 => Ok("Pi 400"),
        0x17 => Ok("Pi 5"),
        // Compute modules have no pin header to arbitrate.
        _ => Err(ProfileError::UnknownRevision(revision.to_string())),
    }
}

/// Incrementally assembles a custom [`BoardProfile`].
pub struct BoardProfileBuilder {
    profile: BoardProfile,
}

impl BoardProfileBuilder {
    /// Declares a physical pin and its display name.
    pub fn pin(mut self, board_pin: u8, name: &str) -> Self {
        self.profile.names.insert(board_pin, name.to_string());
        self
    }

    /// Maps an SoC number onto a physical pin.
    pub fn bcm(mut self, bcm_pin: u8, board_pin: u8) -> Self {
        self.profile.bcm_to_board.insert(bcm_pin, board_pin);
        self
    }

    /// Maps a wired number onto a physical pin.
    pub fn wired(mut self, wired_pin: u8, board_pin: u8) -> Self {
        self.profile.wired_to_board.insert(wired_pin, board_pin);
        self
    }

    /// Declares which physical pins carry a capability flag.
    pub fn function(mut self, mask: CapabilityMask, pins: &[u8]) -> Self {
        self.profile
            .functions
            .push((mask, pins.iter().copied().collect()));
        self
    }

    pub fn build(self) -> BoardProfile {
        self.profile
    }
}
