//! Command frame encoding and response decoding.
//!
//! SPI frames are always [`FRAME_LEN`] bytes: `[opcode, register, hi, lo]`.
//! I2C frames are the register byte followed by one or two data bytes,
//! most-significant byte first.

use crate::error::CommError;
use crate::protocol::{FRAME_LEN, OP_FETCH, OP_SET_READ_INDEX, OP_WRITE};

/// SPI command identifiers (frame byte 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Opcode {
    /// Return the register selected by the read index in bytes 2/3.
    Fetch = OP_FETCH,
    /// Point the module's read index at a register.
    SetReadIndex = OP_SET_READ_INDEX,
    /// Store bytes 2/3 into a register.
    Write = OP_WRITE,
}

/// One SPI command, built fresh for every transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFrame {
    /// What the module should do with the frame.
    pub opcode: Opcode,
    /// Register index, byte 1 on the wire.
    pub register: u8,
    /// Payload, big-endian in bytes 2/3. Zero for reads.
    pub value: u16,
}

impl CommandFrame {
    /// First half of a register read.
    pub fn set_read_index(register: u8) -> Self {
        Self {
            opcode: Opcode::SetReadIndex,
            register,
            value: 0,
        }
    }

    /// Second half of a register read.
    pub fn fetch(register: u8) -> Self {
        Self {
            opcode: Opcode::Fetch,
            register,
            value: 0,
        }
    }

    /// Store `value` into `register`.
    pub fn write(register: u8, value: u16) -> Self {
        Self {
            opcode: Opcode::Write,
            register,
            value,
        }
    }

    /// Wire bytes for this frame.
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let [hi, lo] = self.value.to_be_bytes();
        [self.opcode as u8, self.register, hi, lo]
    }
}

/// Extract the register value a module returned to a fetch frame.
///
/// Byte 2 of the response is the high byte, byte 3 the low byte.
pub fn decode_value(response: &[u8; FRAME_LEN]) -> u16 {
    u16::from(response[3]) | (u16::from(response[2]) << 8)
}

/// Number of data bytes in an I2C register transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterWidth {
    Byte = 1,
    Word = 2,
}

impl RegisterWidth {
    /// Validate a byte count.
    ///
    /// # Errors
    /// * [`CommError::UnsupportedWidth`] for anything other than 1 or 2.
    pub fn from_len<E>(num_bytes: usize) -> Result<Self, CommError<E>> {
        match num_bytes {
            1 => Ok(RegisterWidth::Byte),
            2 => Ok(RegisterWidth::Word),
            n => {
                #[cfg(feature = "defmt")]
                defmt::warn!("unsupported I2C width {}", n);
                Err(CommError::UnsupportedWidth(n))
            }
        }
    }

    /// Number of data bytes.
    pub fn byte_count(self) -> usize {
        self as usize
    }
}

/// Largest I2C write frame: register byte plus a 16-bit payload.
pub const I2C_MAX_FRAME: usize = 3;

/// Build an I2C write frame: the register byte followed by `width`
/// payload bytes.
///
/// Returns the scratch buffer and the number of bytes in use.
///
/// # Errors
/// * [`CommError::ShortPayload`] if `payload` holds fewer than `width`
///   bytes.
pub fn encode_i2c_write<E>(
    register: u8,
    width: RegisterWidth,
    payload: &[u8],
) -> Result<([u8; I2C_MAX_FRAME], usize), CommError<E>> {
    let data = payload.get(..width.byte_count()).ok_or(CommError::ShortPayload)?;

    let mut buf = [0u8; I2C_MAX_FRAME];
    buf[0] = register;
    buf[1..=data.len()].copy_from_slice(data);

    Ok((buf, 1 + data.len()))
}

/// Assemble the bytes read back from an I2C register.
///
/// A single byte is returned as-is. Two bytes are combined with the first
/// byte read as the most significant.
pub fn decode_i2c_read(width: RegisterWidth, bytes: &[u8; 2]) -> u16 {
    match width {
        RegisterWidth::Byte => u16::from(bytes[0]),
        RegisterWidth::Word => u16::from(bytes[1]) | (u16::from(bytes[0]) << 8),
    }
}
