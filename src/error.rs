//! Error types for the module bus driver.

use core::fmt;

use embedded_hal::digital;

/// Errors that can occur when talking to an alamods module.
///
/// Generic over the bus error `E` of the SPI or I2C transport. Pin errors
/// from chip-select and address lines are reduced to their portable
/// [`ErrorKind`](digital::ErrorKind) so that one error type covers every
/// GPIO implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommError<E> {
    /// Underlying SPI or I2C transport error.
    Transport(E),

    /// Failed to drive a chip-select or address line.
    Pin(digital::ErrorKind),

    /// Module address out of range for the active system mode
    /// (0–15 multiplexed, 0–1 limited).
    InvalidAddress(u8),

    /// I2C transfer width other than 1 or 2 bytes.
    UnsupportedWidth(usize),

    /// Register address does not fit the one-byte wire field.
    Truncation(u16),

    /// I2C payload shorter than the requested transfer width.
    ShortPayload,
}

// Allow ergonomic `?` propagation from raw bus errors.
impl<E> From<E> for CommError<E> {
    fn from(error: E) -> Self {
        CommError::Transport(error)
    }
}

impl<E> CommError<E> {
    /// Wrap a GPIO error from a chip-select or address line.
    pub(crate) fn pin<P: digital::Error>(error: P) -> Self {
        CommError::Pin(error.kind())
    }
}

impl<E: fmt::Debug> fmt::Display for CommError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CommError::Transport(e) => write!(f, "Transport error: {:?}", e),
            CommError::Pin(kind) => write!(f, "Pin error: {:?}", kind),
            CommError::InvalidAddress(a) => write!(f, "Invalid module address {}", a),
            CommError::UnsupportedWidth(n) => {
                write!(f, "Unsupported I2C width {} (must be 1 or 2)", n)
            }
            CommError::Truncation(r) => {
                write!(f, "Register address {:#x} does not fit in one byte", r)
            }
            CommError::ShortPayload => write!(f, "Payload shorter than transfer width"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for CommError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            CommError::Transport(e) => defmt::write!(f, "Transport error: {}", e),
            CommError::Pin(kind) => defmt::write!(f, "Pin error: {}", kind),
            CommError::InvalidAddress(a) => defmt::write!(f, "Invalid module address {}", a),
            CommError::UnsupportedWidth(n) => defmt::write!(f, "Unsupported I2C width {}", n),
            CommError::Truncation(r) => defmt::write!(f, "Register {=u16:#x} truncated", *r),
            CommError::ShortPayload => defmt::write!(f, "Short payload"),
        }
    }
}
