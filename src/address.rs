//! Module, register, and address-line addressing.

use embedded_hal::digital::PinState;

use crate::error::CommError;
use crate::protocol::{ADDRESS_LINES, LIMITED_MODULES, MAX_WIRE_REGISTER, MULTIPLEXED_MODULES};

/// How modules are wired to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemMode {
    /// Up to 16 modules share chip-select 0 and are told apart by the
    /// four binary address lines.
    Multiplexed,
    /// Up to two modules, each wired to its own chip-select line.
    Limited,
}

impl SystemMode {
    /// Parse the single-letter system type used by existing deployments.
    ///
    /// `'Z'` is a limited system; every other code is multiplexed.
    pub fn from_type_code(code: char) -> Self {
        match code {
            'Z' => SystemMode::Limited,
            _ => SystemMode::Multiplexed,
        }
    }

    /// The single-letter type code for this mode.
    pub fn type_code(self) -> char {
        match self {
            SystemMode::Multiplexed => 'M',
            SystemMode::Limited => 'Z',
        }
    }

    /// Number of module addresses valid in this mode.
    pub fn module_count(self) -> u8 {
        match self {
            SystemMode::Multiplexed => MULTIPLEXED_MODULES,
            SystemMode::Limited => LIMITED_MODULES,
        }
    }
}

/// A module address validated against a [`SystemMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModuleAddress(u8);

impl ModuleAddress {
    /// Validate `address` for `mode`.
    ///
    /// # Errors
    /// * [`CommError::InvalidAddress`] if `address` is 16 or above on a
    ///   multiplexed system, or 2 or above on a limited system.
    pub fn new<E>(mode: SystemMode, address: u8) -> Result<Self, CommError<E>> {
        if address >= mode.module_count() {
            #[cfg(feature = "defmt")]
            defmt::warn!("module address {} out of range for {}", address, mode);
            return Err(CommError::InvalidAddress(address));
        }
        Ok(Self(address))
    }

    /// The raw address value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Chip-select line used for this address in `mode`.
    ///
    /// Multiplexed systems always use CE0. Limited systems use CE0 for
    /// module 0 and CE1 for anything else.
    pub fn chip_select(self, mode: SystemMode) -> usize {
        match mode {
            SystemMode::Multiplexed => 0,
            SystemMode::Limited if self.0 == 0 => 0,
            SystemMode::Limited => 1,
        }
    }
}

/// Narrow a register index to the one-byte wire field.
///
/// # Errors
/// * [`CommError::Truncation`] if `register > 255`; the frame has no room
///   for the high bits of the extended 0–2047 register space.
pub fn wire_register<E>(register: u16) -> Result<u8, CommError<E>> {
    if register > MAX_WIRE_REGISTER {
        #[cfg(feature = "defmt")]
        defmt::warn!("register {=u16:#x} does not fit the wire field", register);
        return Err(CommError::Truncation(register));
    }
    Ok(register as u8)
}

/// Levels of the four module address lines A0–A3.
///
/// The lines are active-low: each carries the inverse of the matching
/// address bit, so address 0 leaves every line HIGH and address 15
/// pulls every line LOW.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressLineState {
    levels: [PinState; ADDRESS_LINES],
}

impl AddressLineState {
    /// Compute the line levels for a module address.
    ///
    /// Line `i` is driven to `!bit_i(address)`.
    pub fn for_address(address: ModuleAddress) -> Self {
        let mut levels = [PinState::High; ADDRESS_LINES];
        for (bit, level) in levels.iter_mut().enumerate() {
            *level = PinState::from((address.value() >> bit) & 1 == 0);
        }
        Self { levels }
    }

    /// Levels indexed by line number (A0 first).
    pub fn levels(&self) -> [PinState; ADDRESS_LINES] {
        self.levels
    }

    /// Level of a single line, or `None` past A3.
    pub fn line(&self, index: usize) -> Option<PinState> {
        self.levels.get(index).copied()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AddressLineState {
    fn format(&self, f: defmt::Formatter) {
        let b = self.levels.map(|l| (l == PinState::High) as u8);
        defmt::write!(f, "A0={} A1={} A2={} A3={}", b[0], b[1], b[2], b[3]);
    }
}
