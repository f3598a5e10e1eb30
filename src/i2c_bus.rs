//! Register access to simple (I2C) modules.
//!
//! Each call is its own session: the bus is configured, the register is
//! addressed, data moves, and the bus is released. Nothing about the slave
//! or the bus speed is remembered between calls.

use embedded_hal::i2c::I2c;

use crate::address::wire_register;
use crate::error::CommError;
use crate::frame::{decode_i2c_read, encode_i2c_write, RegisterWidth};
use crate::transport::{I2cSettings, I2cTransport};

/// Driver for register-mapped I2C modules.
///
/// # Example
///
/// ```ignore
/// use alamods_comm::I2cModuleBus;
///
/// let mut i2c = I2cModuleBus::new(i2c);
///
/// // Configure the port expander at 0x20
/// i2c.write(0x20, 0x06, 1, &[0x07])?;
/// let value = i2c.read(0x20, 0x80, 2)?;
/// ```
pub struct I2cModuleBus<I2C> {
    i2c: I2C,
    settings: I2cSettings,
}

impl<I2C> I2cModuleBus<I2C>
where
    I2C: I2cTransport,
{
    /// Take ownership of the I2C bus; 100 kHz per call.
    pub fn new(i2c: I2C) -> Self {
        Self::with_settings(i2c, I2cSettings::default())
    }

    /// Take ownership of the I2C bus with explicit clock settings.
    pub fn with_settings(i2c: I2C, settings: I2cSettings) -> Self {
        Self { i2c, settings }
    }

    /// Clock settings applied at the start of every call.
    pub fn settings(&self) -> &I2cSettings {
        &self.settings
    }

    // -----------------------------------------------------------------------
    // Read operations
    // -----------------------------------------------------------------------

    /// Read a 1- or 2-byte register.
    ///
    /// Writes the register index, then reads `num_bytes` back. Two-byte
    /// values arrive most-significant byte first.
    ///
    /// # Errors
    /// * [`CommError::UnsupportedWidth`] if `num_bytes` is not 1 or 2; no
    ///   bus traffic is generated.
    /// * [`CommError::Truncation`] if `register > 255`.
    /// * [`CommError::Transport`] on communication failure.
    pub fn read(
        &mut self,
        slave: u8,
        register: u16,
        num_bytes: usize,
    ) -> Result<u16, CommError<I2C::Error>> {
        let width = RegisterWidth::from_len::<I2C::Error>(num_bytes)?;
        let register = wire_register::<I2C::Error>(register)?;

        let mut buf = [0u8; 2];
        self.session(|i2c| {
            i2c.write(slave, &[register])?;
            i2c.read(slave, &mut buf[..width.byte_count()])
        })?;

        let value = decode_i2c_read(width, &buf);
        #[cfg(feature = "defmt")]
        defmt::trace!("i2c {=u8:#x} reg {=u8:#x} -> {=u16:#x}", slave, register, value);
        Ok(value)
    }

    // -----------------------------------------------------------------------
    // Write operations
    // -----------------------------------------------------------------------

    /// Write a 1- or 2-byte register.
    ///
    /// Sends the register index followed by the first `num_bytes` bytes of
    /// `payload` in a single write.
    ///
    /// # Errors
    /// * [`CommError::UnsupportedWidth`] if `num_bytes` is not 1 or 2; no
    ///   bus traffic is generated.
    /// * [`CommError::ShortPayload`] if `payload` is shorter than
    ///   `num_bytes`.
    /// * [`CommError::Truncation`] if `register > 255`.
    /// * [`CommError::Transport`] on communication failure.
    pub fn write(
        &mut self,
        slave: u8,
        register: u16,
        num_bytes: usize,
        payload: &[u8],
    ) -> Result<(), CommError<I2C::Error>> {
        let width = RegisterWidth::from_len::<I2C::Error>(num_bytes)?;
        let register = wire_register::<I2C::Error>(register)?;
        let (frame, len) = encode_i2c_write::<I2C::Error>(register, width, payload)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("i2c {=u8:#x} <- {:02x}", slave, &frame[..len]);

        self.session(|i2c| i2c.write(slave, &frame[..len]))?;
        Ok(())
    }

    /// Give back the I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Run `f` between bus begin and end.
    ///
    /// The bus is released even when `f` fails; the first error wins.
    fn session<F>(&mut self, f: F) -> Result<(), CommError<I2C::Error>>
    where
        F: FnOnce(&mut I2C) -> Result<(), I2C::Error>,
    {
        self.i2c.begin(&self.settings)?;
        let result = f(&mut self.i2c);
        let ended = self.i2c.end();
        result?;
        ended?;
        Ok(())
    }
}
