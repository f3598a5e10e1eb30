//! Register access to smart (SPI) modules.
//!
//! [`ModuleBus`] owns the SPI bus and the control lines. Every logical
//! operation goes through a [`ModuleSession`], which mutably borrows the
//! bus so nothing else can re-select lines between the frames of a
//! two-phase read.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::address::{wire_register, ModuleAddress, SystemMode};
use crate::error::CommError;
use crate::frame::{decode_value, CommandFrame};
use crate::protocol::FRAME_LEN;
use crate::selector::{AddressLines, BusSelector};
use crate::transport::{SpiSettings, SpiTransport};

/// Driver for alamods modules on the SPI bus.
///
/// # Example
///
/// ```ignore
/// use alamods_comm::{AddressLines, ModuleBus};
///
/// // `spi` implements `SpiTransport`; the pins implement `OutputPin`.
/// let lines = AddressLines::new(a0, a1, a2, a3);
/// let mut bus = ModuleBus::multiplexed(spi, ce0, lines);
/// bus.init()?;
///
/// // Read the model register of module 0
/// let model = bus.read_register(0, 0x80)?;
///
/// // Red and blue LEDs on
/// bus.write_register(0, 0x90, 0x8005)?;
/// ```
pub struct ModuleBus<SPI, CS, A> {
    spi: SPI,
    selector: BusSelector<CS, A>,
    settings: SpiSettings,
}

impl<SPI, CS, A> ModuleBus<SPI, CS, A>
where
    SPI: SpiTransport,
    CS: OutputPin,
    A: OutputPin,
{
    /// Up to 16 modules on chip-select 0, addressed by lines A0–A3.
    pub fn multiplexed(spi: SPI, chip_select: CS, lines: AddressLines<A>) -> Self {
        Self::with_settings(
            spi,
            BusSelector::multiplexed(chip_select, lines),
            SpiSettings::default(),
        )
    }

    /// Build a driver from explicit wiring and bus settings.
    pub fn with_settings(spi: SPI, selector: BusSelector<CS, A>, settings: SpiSettings) -> Self {
        Self {
            spi,
            selector,
            settings,
        }
    }

    /// Whether modules are picked by address lines or by chip-select.
    pub fn mode(&self) -> SystemMode {
        self.selector.mode()
    }

    /// Clock and mode applied at the start of every session.
    pub fn settings(&self) -> &SpiSettings {
        &self.settings
    }

    /// Drive every control line to its idle level.
    ///
    /// Releases the chip-selects and, on a multiplexed system, sets all
    /// address lines HIGH (module 0).
    pub fn init(&mut self) -> Result<(), CommError<SPI::Error>> {
        self.selector.reset::<SPI::Error>()?;
        #[cfg(feature = "defmt")]
        defmt::debug!("module bus initialised ({})", self.selector.mode());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    /// Configure the bus and route it to one module.
    ///
    /// The returned session holds the bus exclusively; call
    /// [`ModuleSession::close`] to end it.
    ///
    /// # Errors
    /// * [`CommError::InvalidAddress`] if `address` is out of range for the
    ///   system mode; no line is touched.
    /// * [`CommError::Transport`] if the bus cannot be configured.
    /// * [`CommError::Pin`] if an address line cannot be driven.
    pub fn select_module(
        &mut self,
        address: u8,
    ) -> Result<ModuleSession<'_, SPI, CS, A>, CommError<SPI::Error>> {
        let address = ModuleAddress::new::<SPI::Error>(self.selector.mode(), address)?;

        self.spi.begin(&self.settings)?;
        let chip_select = match self.selector.select(address) {
            Ok(cs) => cs,
            Err(e) => {
                // The selection error takes precedence over a failed end.
                if let Err(_ended) = self.spi.end() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("bus end failed after selection error");
                }
                return Err(e);
            }
        };

        #[cfg(feature = "defmt")]
        defmt::trace!("session open: module {} on CE{}", address.value(), chip_select);

        Ok(ModuleSession {
            bus: self,
            address,
            chip_select,
        })
    }

    /// Write a 16-bit value into a module register.
    ///
    /// Opens a session, sends one write frame, and closes the session.
    /// A register above 255 is rejected before the bus is configured.
    pub fn write_register(
        &mut self,
        address: u8,
        register: u16,
        value: u16,
    ) -> Result<(), CommError<SPI::Error>> {
        let register = wire_register::<SPI::Error>(register)?;
        let mut session = self.select_module(address)?;
        let result = session.write_wire(register, value);
        let closed = session.close();
        result?;
        closed
    }

    /// Read a 16-bit value from a module register.
    ///
    /// Opens a session, performs the set-index/fetch exchange, and closes
    /// the session. A register above 255 is rejected before the bus is
    /// configured.
    pub fn read_register(&mut self, address: u8, register: u16) -> Result<u16, CommError<SPI::Error>> {
        let register = wire_register::<SPI::Error>(register)?;
        let mut session = self.select_module(address)?;
        let result = session.read_wire(register);
        let closed = session.close();
        let value = result?;
        closed?;
        Ok(value)
    }

    /// Give back the SPI bus and the control lines.
    pub fn release(self) -> (SPI, BusSelector<CS, A>) {
        (self.spi, self.selector)
    }
}

impl<SPI, CS> ModuleBus<SPI, CS, CS>
where
    SPI: SpiTransport,
    CS: OutputPin,
{
    /// Two modules, module 0 on CE0 and module 1 on CE1.
    pub fn limited(spi: SPI, cs0: CS, cs1: CS) -> Self {
        Self::with_settings(spi, BusSelector::limited(cs0, cs1), SpiSettings::default())
    }
}

/// Exclusive access to one selected module.
///
/// Created by [`ModuleBus::select_module`]. Address lines stay put for
/// the life of the session; chip-select is pulsed around every frame.
pub struct ModuleSession<'a, SPI, CS, A> {
    bus: &'a mut ModuleBus<SPI, CS, A>,
    address: ModuleAddress,
    chip_select: usize,
}

impl<SPI, CS, A> ModuleSession<'_, SPI, CS, A>
where
    SPI: SpiTransport,
    CS: OutputPin,
    A: OutputPin,
{
    /// The module this session talks to.
    pub fn address(&self) -> ModuleAddress {
        self.address
    }

    /// Write a 16-bit value into a module register (one frame).
    ///
    /// # Errors
    /// * [`CommError::Truncation`] if `register > 255`; nothing is sent.
    /// * [`CommError::Transport`] / [`CommError::Pin`] on bus failure.
    pub fn write_register(&mut self, register: u16, value: u16) -> Result<(), CommError<SPI::Error>> {
        let register = wire_register::<SPI::Error>(register)?;
        self.write_wire(register, value)
    }

    /// Read a 16-bit value from a module register.
    ///
    /// Sends a set-read-index frame followed by a fetch frame; the value
    /// comes back in bytes 2/3 of the fetch response.
    ///
    /// # Errors
    /// * [`CommError::Truncation`] if `register > 255`; nothing is sent.
    /// * [`CommError::Transport`] / [`CommError::Pin`] on bus failure.
    pub fn read_register(&mut self, register: u16) -> Result<u16, CommError<SPI::Error>> {
        let register = wire_register::<SPI::Error>(register)?;
        self.read_wire(register)
    }

    /// End the session and release the bus.
    pub fn close(self) -> Result<(), CommError<SPI::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("session close: module {}", self.address.value());
        self.bus.spi.end()?;
        Ok(())
    }

    fn write_wire(&mut self, register: u8, value: u16) -> Result<(), CommError<SPI::Error>> {
        // The module's reply to a write carries nothing.
        let _ = self.exchange(CommandFrame::write(register, value))?;
        Ok(())
    }

    fn read_wire(&mut self, register: u8) -> Result<u16, CommError<SPI::Error>> {
        let _ = self.exchange(CommandFrame::set_read_index(register))?;
        let response = self.exchange(CommandFrame::fetch(register))?;
        Ok(decode_value(&response))
    }

    /// Clock one frame through the bus with chip-select asserted.
    ///
    /// Chip-select is released even if the transfer fails.
    fn exchange(&mut self, frame: CommandFrame) -> Result<[u8; FRAME_LEN], CommError<SPI::Error>> {
        let mut buf = frame.encode();
        #[cfg(feature = "defmt")]
        defmt::trace!("spi frame -> {:02x}", buf);

        let bus = &mut *self.bus;
        bus.selector.set_chip_select::<SPI::Error>(self.chip_select, true)?;
        let transferred = bus
            .spi
            .transfer_in_place(&mut buf)
            .and_then(|()| bus.spi.flush());
        let released = bus.selector.set_chip_select::<SPI::Error>(self.chip_select, false);

        transferred?;
        released?;
        Ok(buf)
    }
}
