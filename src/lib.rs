//! Blocking driver for alamods expansion modules.
//!
//! Modules attach to a host single-board computer over two buses:
//!
//! - **SPI** — smart modules with an embedded processor. Up to 16 share
//!   one chip-select and are picked out by four binary address lines
//!   (multiplexed system), or two sit on their own chip-selects (limited
//!   system).
//! - **I2C** — simple register-mapped modules.
//!
//! # Architecture
//!
//! - **`selector`** — maps a module address to chip-select and address-line
//!   levels ([`BusSelector`], [`AddressLines`]).
//! - **`frame`** — encodes the 4-byte SPI command frames and the
//!   register-prefixed I2C frames, and decodes register values.
//! - **[`ModuleBus`]** / **[`ModuleSession`]** — SPI register reads and
//!   writes. A session borrows the bus exclusively for one logical
//!   operation.
//! - **[`I2cModuleBus`]** — I2C register reads and writes, one bus session
//!   per call.
//!
//! Transfers go through the `embedded-hal` 1.0 blocking traits; the
//! [`SpiTransport`] and [`I2cTransport`] extensions apply bus clock and
//! mode settings at the start of each session.
//!
//! # Quick start
//!
//! ```ignore
//! use alamods_comm::{AddressLines, ModuleBus};
//!
//! let lines = AddressLines::new(a0, a1, a2, a3);
//! let mut bus = ModuleBus::multiplexed(spi, ce0, lines);
//! bus.init()?;
//!
//! let model = bus.read_register(0, 0x80)?;
//! bus.write_register(0, 0x90, 0x8005)?;
//! ```
//!
//! # Features
//!
//! - **`defmt`** — [`defmt::Format`] on public types and trace logging of
//!   every frame and session.

#![cfg_attr(not(test), no_std)]

pub use address::{wire_register, AddressLineState, ModuleAddress, SystemMode};
pub use error::CommError;
pub use frame::{CommandFrame, Opcode, RegisterWidth};
pub use i2c_bus::I2cModuleBus;
pub use selector::{AddressLines, BusSelector};
pub use spi_bus::{ModuleBus, ModuleSession};
pub use transport::{I2cSettings, I2cTransport, SpiSettings, SpiTransport};

mod address;
mod error;
pub mod frame;
mod i2c_bus;
pub mod protocol;
mod selector;
mod spi_bus;
mod transport;

#[cfg(test)]
mod mock;
