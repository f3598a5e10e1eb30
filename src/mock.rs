//! Test transports: `embedded-hal-mock` buses that also record the
//! session begin/end calls made through the transport traits.

use embedded_hal::i2c::{self, I2c, Operation};
use embedded_hal::spi::{self, SpiBus};
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

use crate::transport::{I2cSettings, I2cTransport, SpiSettings, SpiTransport};

/// Error surfaced by the test transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestBusError {
    /// The wrapped mock reported a failure.
    Mock,
    /// `begin` or a data transfer was told to fail.
    Injected,
}

impl spi::Error for TestBusError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

impl i2c::Error for TestBusError {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::Other
    }
}

/// Session bracket calls seen by a test transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<S> {
    Begin(S),
    End,
}

pub struct MockSpi {
    pub bus: SpiMock<u8>,
    pub events: Vec<Event<SpiSettings>>,
    pub fail_begin: bool,
    pub fail_transfer: bool,
}

impl MockSpi {
    pub fn new(expectations: &[SpiTransaction<u8>]) -> Self {
        Self {
            bus: SpiMock::new(expectations),
            events: Vec::new(),
            fail_begin: false,
            fail_transfer: false,
        }
    }
}

impl spi::ErrorType for MockSpi {
    type Error = TestBusError;
}

impl MockSpi {
    fn check_transfer(&self) -> Result<(), TestBusError> {
        if self.fail_transfer {
            return Err(TestBusError::Injected);
        }
        Ok(())
    }
}

impl SpiBus<u8> for MockSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.check_transfer()?;
        self.bus.read(words).map_err(|_| TestBusError::Mock)
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.check_transfer()?;
        self.bus.write(words).map_err(|_| TestBusError::Mock)
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.check_transfer()?;
        self.bus.transfer(read, write).map_err(|_| TestBusError::Mock)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.check_transfer()?;
        self.bus.transfer_in_place(words).map_err(|_| TestBusError::Mock)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.bus.flush().map_err(|_| TestBusError::Mock)
    }
}

impl SpiTransport for MockSpi {
    fn begin(&mut self, settings: &SpiSettings) -> Result<(), Self::Error> {
        if self.fail_begin {
            return Err(TestBusError::Injected);
        }
        self.events.push(Event::Begin(*settings));
        Ok(())
    }

    fn end(&mut self) -> Result<(), Self::Error> {
        self.events.push(Event::End);
        Ok(())
    }
}

pub struct MockI2c {
    pub bus: I2cMock,
    pub events: Vec<Event<I2cSettings>>,
    pub fail_begin: bool,
    pub fail_transfer: bool,
}

impl MockI2c {
    pub fn new(expectations: &[I2cTransaction]) -> Self {
        Self {
            bus: I2cMock::new(expectations),
            events: Vec::new(),
            fail_begin: false,
            fail_transfer: false,
        }
    }
}

impl i2c::ErrorType for MockI2c {
    type Error = TestBusError;
}

impl MockI2c {
    fn check_transfer(&self) -> Result<(), TestBusError> {
        if self.fail_transfer {
            return Err(TestBusError::Injected);
        }
        Ok(())
    }
}

impl I2c for MockI2c {
    fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), Self::Error> {
        self.check_transfer()?;
        self.bus.read(address, read).map_err(|_| TestBusError::Mock)
    }

    fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
        self.check_transfer()?;
        self.bus.write(address, write).map_err(|_| TestBusError::Mock)
    }

    fn write_read(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<(), Self::Error> {
        self.check_transfer()?;
        self.bus
            .write_read(address, write, read)
            .map_err(|_| TestBusError::Mock)
    }

    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.check_transfer()?;
        self.bus
            .transaction(address, operations)
            .map_err(|_| TestBusError::Mock)
    }
}

impl I2cTransport for MockI2c {
    fn begin(&mut self, settings: &I2cSettings) -> Result<(), Self::Error> {
        if self.fail_begin {
            return Err(TestBusError::Injected);
        }
        self.events.push(Event::Begin(*settings));
        Ok(())
    }

    fn end(&mut self) -> Result<(), Self::Error> {
        self.events.push(Event::End);
        Ok(())
    }
}
