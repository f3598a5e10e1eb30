//! Transport boundary and per-transaction bus settings.
//!
//! Byte transfers go through the `embedded-hal` 1.0 blocking traits. The
//! HAL traits have no notion of clock or mode configuration, so the two
//! extension traits here let the platform apply [`SpiSettings`] and
//! [`I2cSettings`] at the start of every session.

use embedded_hal::i2c::I2c;
use embedded_hal::spi::{Mode, SpiBus, MODE_0};

use crate::protocol::{CORE_CLOCK_HZ, I2C_BAUD_RATE_HZ, SPI_CLOCK_DIVIDER};

/// SPI clock and mode applied before every module transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiSettings {
    /// Divider applied to the platform core clock.
    pub clock_divider: u16,
    /// Clock polarity and phase. Modules expect mode 0.
    pub mode: Mode,
}

impl Default for SpiSettings {
    fn default() -> Self {
        Self {
            clock_divider: SPI_CLOCK_DIVIDER,
            mode: MODE_0,
        }
    }
}

impl SpiSettings {
    /// SCLK frequency produced by this divider on a given core clock.
    pub fn frequency_hz(&self, core_clock_hz: u32) -> u32 {
        core_clock_hz / u32::from(self.clock_divider.max(1))
    }
}

/// I2C bus speed applied at the start of every I2C call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cSettings {
    /// Target bus speed in Hz.
    pub baud_rate_hz: u32,
    /// Core clock divider producing `baud_rate_hz`.
    pub clock_divider: u16,
}

impl Default for I2cSettings {
    /// 100 kHz on the 250 MHz core clock (divider 2500).
    fn default() -> Self {
        Self::for_baud_rate(CORE_CLOCK_HZ, I2C_BAUD_RATE_HZ)
    }
}

impl I2cSettings {
    /// Derive the clock divider for `baud_rate_hz` from the core clock.
    ///
    /// The divider saturates at `u16::MAX` and is never zero.
    pub fn for_baud_rate(core_clock_hz: u32, baud_rate_hz: u32) -> Self {
        let divider = core_clock_hz / baud_rate_hz.max(1);
        Self {
            baud_rate_hz,
            clock_divider: u16::try_from(divider).unwrap_or(u16::MAX).max(1),
        }
    }
}

/// An SPI bus that can be (re)configured per session.
///
/// Implement this for the platform SPI peripheral. `begin` runs before
/// chip-select and address lines are driven; `end` runs once the logical
/// operation is complete.
pub trait SpiTransport: SpiBus<u8> {
    /// Apply clock divider and mode for the next transaction.
    fn begin(&mut self, settings: &SpiSettings) -> Result<(), Self::Error>;

    /// Release the bus after a transaction.
    fn end(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// An I2C bus that can be (re)configured per call.
pub trait I2cTransport: I2c {
    /// Apply baud rate and clock divider for the next transfer.
    fn begin(&mut self, settings: &I2cSettings) -> Result<(), Self::Error>;

    /// Release the bus after a transfer.
    fn end(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T: SpiTransport + ?Sized> SpiTransport for &mut T {
    fn begin(&mut self, settings: &SpiSettings) -> Result<(), Self::Error> {
        T::begin(self, settings)
    }

    fn end(&mut self) -> Result<(), Self::Error> {
        T::end(self)
    }
}

impl<T: I2cTransport + ?Sized> I2cTransport for &mut T {
    fn begin(&mut self, settings: &I2cSettings) -> Result<(), Self::Error> {
        T::begin(self, settings)
    }

    fn end(&mut self) -> Result<(), Self::Error> {
        T::end(self)
    }
}
