//! Wire-protocol and board constants for the alamods module bus.
//!
//! SPI modules speak a fixed 4-byte command frame:
//! - Byte 0: opcode
//! - Byte 1: module-internal register index
//! - Bytes 2/3: 16-bit value, high byte first
//!
//! I2C modules take a register byte followed by one or two data bytes.

// ---------------------------------------------------------------------------
// SPI opcodes
// ---------------------------------------------------------------------------

/// Return the register selected by the last set-read-index command.
pub const OP_FETCH: u8 = 0x00;

/// Set the module's internal read index register.
pub const OP_SET_READ_INDEX: u8 = 0x01;

/// Write a 16-bit value into a module register.
pub const OP_WRITE: u8 = 0x02;

/// Length of every SPI command frame in bytes.
pub const FRAME_LEN: usize = 4;

// ---------------------------------------------------------------------------
// Addressing
// ---------------------------------------------------------------------------

/// Number of modules addressable on the multiplexed bus.
pub const MULTIPLEXED_MODULES: u8 = 16;

/// Number of modules on a limited system (one per chip-select).
pub const LIMITED_MODULES: u8 = 2;

/// Number of binary address lines (A0–A3).
pub const ADDRESS_LINES: usize = 4;

/// Largest register index the one-byte wire field can carry.
pub const MAX_WIRE_REGISTER: u16 = 0xFF;

// ---------------------------------------------------------------------------
// Bus timing
// ---------------------------------------------------------------------------

/// Platform core clock the bus dividers are derived from (BCM2835 VPU).
pub const CORE_CLOCK_HZ: u32 = 250_000_000;

/// SPI clock divider used for every module transaction.
pub const SPI_CLOCK_DIVIDER: u16 = 512;

/// I2C bus speed used for every transaction.
pub const I2C_BAUD_RATE_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Header wiring (Raspberry Pi 40-pin header, physical numbering)
// ---------------------------------------------------------------------------

/// Physical header pins wired to address lines A0, A1, A2, A3.
pub const ADDRESS_LINE_PINS: [u8; ADDRESS_LINES] = [16, 18, 29, 31];

/// Physical header pins for SPI chip-selects CE0 and CE1.
pub const CHIP_SELECT_PINS: [u8; 2] = [24, 26];

/// Value the original driver returned for unsupported I2C widths.
///
/// Kept for reference only; this crate reports
/// [`CommError::UnsupportedWidth`](crate::CommError::UnsupportedWidth)
/// instead and never produces this value.
pub const LEGACY_NO_DATA: u32 = 0xFFFF_FFFF;
