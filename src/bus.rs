//! Bit-banged three-wire bus.
//!
//! The DS1302 talks over three GPIO lines: a clock (SCLK), a bidirectional
//! data line (I/O) and a chip enable (CE). A transaction is framed by CE:
//!
//! - write: `CE↑, command, value, CE↓`
//! - read:  `CE↑, command, <device drives 8 bits>, CE↓`
//!
//! Bytes go out least-significant bit first. The device samples I/O on the
//! rising edge of SCLK and drives read data while SCLK is high. Every phase
//! of a bit cell is separated by a short delay (2 µs by default).
//!
//! There is no acknowledgement, so apart from GPIO errors a transaction
//! cannot fail.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Default half bit cell, in microseconds.
pub const DEFAULT_HALF_CELL_US: u32 = 2;

/// A bidirectional GPIO line used for the DS1302 I/O pin.
///
/// The line is an output while the host shifts bytes out and a floating
/// input while the device drives read data.
pub trait DataPin: InputPin + OutputPin {
    /// Switch the line to push-pull output.
    fn set_as_output(&mut self) -> Result<(), Self::Error>;
    /// Switch the line to floating input.
    fn set_as_input(&mut self) -> Result<(), Self::Error>;
}

/// Register level access to the DS1302.
///
/// Implemented by [`ThreeWireBus`]; the driver only depends on this trait.
pub trait RegisterBus {
    /// Transport error
    type Error;

    /// Reads one register. `addr` is a read command byte.
    fn read_register(&mut self, addr: u8) -> Result<u8, Self::Error>;

    /// Writes one register. `addr` is a write command byte.
    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), Self::Error>;
}

/// Errors returned by the bit-bang bus.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError<ClkE, IoE, CeE> {
    /// Error driving SCLK.
    Clock(ClkE),
    /// Error driving or reading I/O.
    Data(IoE),
    /// Error driving CE.
    ChipEnable(CeE),
}

/// [`BusError`] for a given set of pin types.
pub type PinError<CLK, IO, CE> =
    BusError<<CLK as ErrorType>::Error, <IO as ErrorType>::Error, <CE as ErrorType>::Error>;

/// The three lines wired to the DS1302.
pub struct Pins<CLK, IO, CE> {
    /// SCLK, push-pull output
    pub clock: CLK,
    /// I/O, bidirectional
    pub data: IO,
    /// CE, push-pull output
    pub chip_enable: CE,
}

/// Bit-banged DS1302 bus over three GPIO lines.
pub struct ThreeWireBus<CLK, IO, CE, D> {
    clock: CLK,
    data: IO,
    chip_enable: CE,
    delay: D,
    half_cell_us: u32,
}

impl<CLK, IO, CE, D> ThreeWireBus<CLK, IO, CE, D>
where
    CLK: OutputPin,
    IO: DataPin,
    CE: OutputPin,
    D: DelayNs,
{
    /// Takes ownership of the pins and drives all three lines low as
    /// outputs.
    pub fn new(pins: Pins<CLK, IO, CE>, delay: D) -> Result<Self, PinError<CLK, IO, CE>> {
        let Pins {
            mut clock,
            mut data,
            mut chip_enable,
        } = pins;
        clock.set_low().map_err(BusError::Clock)?;
        data.set_as_output().map_err(BusError::Data)?;
        data.set_low().map_err(BusError::Data)?;
        chip_enable.set_low().map_err(BusError::ChipEnable)?;

        Ok(Self {
            clock,
            data,
            chip_enable,
            delay,
            half_cell_us: DEFAULT_HALF_CELL_US,
        })
    }

    /// Set the delay between bit cell phases, in microseconds.
    pub fn set_half_cell_us(&mut self, half_cell_us: u32) {
        self.half_cell_us = half_cell_us.max(1);
    }

    /// Destroy the bus and return the owned peripherals.
    pub fn release(self) -> (Pins<CLK, IO, CE>, D) {
        (
            Pins {
                clock: self.clock,
                data: self.data,
                chip_enable: self.chip_enable,
            },
            self.delay,
        )
    }

    #[inline(always)]
    fn wait(&mut self) {
        self.delay.delay_us(self.half_cell_us);
    }

    /// Drives CE and SCLK low, ending any transaction.
    pub fn reset(&mut self) -> Result<(), PinError<CLK, IO, CE>> {
        self.chip_enable.set_low().map_err(BusError::ChipEnable)?;
        self.clock.set_low().map_err(BusError::Clock)?;
        Ok(())
    }

    /// Starts a transaction: resets the bus, raises CE and shifts out
    /// `command`.
    pub fn start(&mut self, command: u8) -> Result<(), PinError<CLK, IO, CE>> {
        self.reset()?;
        self.chip_enable.set_high().map_err(BusError::ChipEnable)?;
        self.wait();
        self.write_byte(command)
    }

    /// Shifts `byte` out LSB first. SCLK is low on return.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), PinError<CLK, IO, CE>> {
        self.data.set_as_output().map_err(BusError::Data)?;
        for bit in 0..8 {
            if (byte >> bit) & 0x01 != 0 {
                self.data.set_high().map_err(BusError::Data)?;
            } else {
                self.data.set_low().map_err(BusError::Data)?;
            }
            self.wait();
            self.clock.set_high().map_err(BusError::Clock)?;
            self.wait();
            self.clock.set_low().map_err(BusError::Clock)?;
        }
        Ok(())
    }

    /// Shifts a byte in LSB first, sampling I/O while SCLK is high.
    pub fn read_byte(&mut self) -> Result<u8, PinError<CLK, IO, CE>> {
        self.data.set_as_input().map_err(BusError::Data)?;
        let mut byte = 0;
        for bit in 0..8 {
            self.clock.set_high().map_err(BusError::Clock)?;
            self.wait();
            let high = self.data.is_high().map_err(BusError::Data)?;
            self.clock.set_low().map_err(BusError::Clock)?;
            self.wait();
            byte |= u8::from(high) << bit;
        }
        Ok(byte)
    }
}

impl<CLK, IO, CE, D> RegisterBus for ThreeWireBus<CLK, IO, CE, D>
where
    CLK: OutputPin,
    IO: DataPin,
    CE: OutputPin,
    D: DelayNs,
{
    type Error = PinError<CLK, IO, CE>;

    fn read_register(&mut self, addr: u8) -> Result<u8, Self::Error> {
        self.start(addr)?;
        let value = self.read_byte()?;
        self.reset()?;
        trace!("DS1302: read {} -> {}", addr, value);
        Ok(value)
    }

    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), Self::Error> {
        trace!("DS1302: write {} <- {}", addr, value);
        self.start(addr)?;
        self.write_byte(value)?;
        // CE hold after the last falling SCLK edge
        self.wait();
        self.reset()
    }
}
