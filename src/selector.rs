//! Bus selection: chip-select and module address lines.
//!
//! Before each SPI transaction the selector puts the control lines into
//! the state that routes the bus to one module:
//!
//! - **Multiplexed** — chip-select 0, plus A0–A3 driven active-low with
//!   the module address.
//! - **Limited** — chip-select 0 for module 0, chip-select 1 otherwise.
//!   Address lines are not wired.
//!
//! Chip-select lines are active-low and idle HIGH.

use embedded_hal::digital::{OutputPin, PinState};

use crate::address::{AddressLineState, ModuleAddress, SystemMode};
use crate::error::CommError;
use crate::protocol::ADDRESS_LINES;

/// The four GPIO outputs wired to module address lines A0–A3.
pub struct AddressLines<A> {
    pins: [A; ADDRESS_LINES],
}

impl<A> AddressLines<A>
where
    A: OutputPin,
{
    /// Take ownership of the address-line pins. No pin is driven.
    pub fn new(a0: A, a1: A, a2: A, a3: A) -> Self {
        Self {
            pins: [a0, a1, a2, a3],
        }
    }

    /// Drive every line to the level in `state`.
    pub fn apply(&mut self, state: &AddressLineState) -> Result<(), A::Error> {
        for (pin, level) in self.pins.iter_mut().zip(state.levels()) {
            pin.set_state(level)?;
        }
        Ok(())
    }

    /// Give the pins back, A0 first.
    pub fn release(self) -> [A; ADDRESS_LINES] {
        self.pins
    }
}

/// Control-line wiring for one system, in either [`SystemMode`].
pub enum BusSelector<CS, A> {
    /// One shared chip-select plus the four address lines.
    Multiplexed { chip_select: CS, lines: AddressLines<A> },
    /// One chip-select per module.
    Limited { chip_selects: [CS; 2] },
}

impl<CS, A> BusSelector<CS, A>
where
    CS: OutputPin,
    A: OutputPin,
{
    /// Shared chip-select plus address lines A0–A3.
    pub fn multiplexed(chip_select: CS, lines: AddressLines<A>) -> Self {
        BusSelector::Multiplexed { chip_select, lines }
    }

    /// The system mode this wiring implements.
    pub fn mode(&self) -> SystemMode {
        match self {
            BusSelector::Multiplexed { .. } => SystemMode::Multiplexed,
            BusSelector::Limited { .. } => SystemMode::Limited,
        }
    }

    /// Put every line in its idle state: chip-selects released and, on a
    /// multiplexed system, all address lines HIGH (module 0).
    pub fn reset<E>(&mut self) -> Result<(), CommError<E>> {
        match self {
            BusSelector::Multiplexed { chip_select, lines } => {
                chip_select.set_high().map_err(CommError::<E>::pin)?;
                let module_zero = ModuleAddress::new::<E>(SystemMode::Multiplexed, 0)?;
                let idle = AddressLineState::for_address(module_zero);
                lines.apply(&idle).map_err(CommError::pin)
            }
            BusSelector::Limited { chip_selects } => {
                for cs in chip_selects.iter_mut() {
                    cs.set_high().map_err(CommError::<E>::pin)?;
                }
                Ok(())
            }
        }
    }

    /// Route the bus to `address`.
    ///
    /// Drives the address lines when multiplexed and returns the index of
    /// the chip-select line to pulse for each frame.
    pub fn select<E>(&mut self, address: ModuleAddress) -> Result<usize, CommError<E>> {
        let mode = self.mode();
        if let BusSelector::Multiplexed { lines, .. } = self {
            let state = AddressLineState::for_address(address);
            #[cfg(feature = "defmt")]
            defmt::trace!("module {}: address lines {}", address.value(), state);
            lines.apply(&state).map_err(CommError::<E>::pin)?;
        }
        Ok(address.chip_select(mode))
    }

    /// Drive chip-select `index` active (LOW) or idle (HIGH).
    pub fn set_chip_select<E>(&mut self, index: usize, active: bool) -> Result<(), CommError<E>> {
        let level = PinState::from(!active);
        let pin = match self {
            BusSelector::Multiplexed { chip_select, .. } => chip_select,
            BusSelector::Limited { chip_selects } => &mut chip_selects[index.min(1)],
        };
        pin.set_state(level).map_err(CommError::pin)
    }
}

impl<CS> BusSelector<CS, CS>
where
    CS: OutputPin,
{
    /// Two modules, each on its own chip-select (CE0, CE1).
    pub fn limited(cs0: CS, cs1: CS) -> Self {
        BusSelector::Limited {
            chip_selects: [cs0, cs1],
        }
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};

    use super::*;

    fn lines_for(levels: [State; 4]) -> ([PinMock; 4], AddressLines<PinMock>) {
        let pins = levels.map(|l| PinMock::new(&[PinTransaction::set(l)]));
        let [a0, a1, a2, a3] = pins.clone();
        (pins, AddressLines::new(a0, a1, a2, a3))
    }

    #[test]
    fn select_drives_inverted_address_bits() {
        // Module 5 = 0b0101: A0 and A2 pulled LOW.
        let (mut pins, lines) = lines_for([State::Low, State::High, State::Low, State::High]);
        let mut cs = PinMock::new(&[]);
        let mut selector = BusSelector::multiplexed(cs.clone(), lines);

        let address = ModuleAddress::new::<()>(SystemMode::Multiplexed, 5).unwrap();
        assert_eq!(selector.select::<()>(address), Ok(0));

        for pin in pins.iter_mut() {
            pin.done();
        }
        cs.done();
    }

    #[test]
    fn reset_releases_chip_select_and_selects_module_zero() {
        let (mut pins, lines) = lines_for([State::High; 4]);
        let mut cs = PinMock::new(&[PinTransaction::set(State::High)]);
        let mut selector = BusSelector::multiplexed(cs.clone(), lines);

        assert_eq!(selector.reset::<()>(), Ok(()));

        for pin in pins.iter_mut() {
            pin.done();
        }
        cs.done();
    }

    #[test]
    fn limited_select_never_touches_lines() {
        let mut cs0 = PinMock::new(&[]);
        let mut cs1 = PinMock::new(&[]);
        let mut selector = BusSelector::limited(cs0.clone(), cs1.clone());
        assert_eq!(selector.mode(), SystemMode::Limited);

        let zero = ModuleAddress::new::<()>(SystemMode::Limited, 0).unwrap();
        let one = ModuleAddress::new::<()>(SystemMode::Limited, 1).unwrap();
        assert_eq!(selector.select::<()>(zero), Ok(0));
        assert_eq!(selector.select::<()>(one), Ok(1));

        cs0.done();
        cs1.done();
    }

    #[test]
    fn chip_select_is_active_low() {
        let mut cs0 = PinMock::new(&[]);
        let mut cs1 = PinMock::new(&[
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
        ]);
        let mut selector = BusSelector::limited(cs0.clone(), cs1.clone());

        assert_eq!(selector.set_chip_select::<()>(1, true), Ok(()));
        assert_eq!(selector.set_chip_select::<()>(1, false), Ok(()));

        cs0.done();
        cs1.done();
    }
}
