//! Register definitions and bitfield structures for the DS1302 RTC.
//!
//! This module contains the command bytes and bitfield definitions for the
//! seven calendar/time registers and the write-protect register.
//!
//! # Command bytes
//!
//! Every transaction starts with a command byte of the form `1000_RAAx`:
//! bit 7 is always set, bits 3..1 select the register and bit 0 selects read
//! (`1`) or write (`0`). Read and write variants are kept as distinct
//! constants in [`ReadAddr`] and [`WriteAddr`] rather than derived by flipping
//! bit 0 at the call site.

use bitfield::bitfield;

/// Read command bytes (odd, `1000_xxx1`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ReadAddr {
    /// Seconds register (0-59) and clock-halt flag
    Seconds = 0x81,
    /// Minutes register (0-59)
    Minutes = 0x83,
    /// Hours register (1-12 + AM/PM or 0-23)
    Hours = 0x85,
    /// Date register (1-31)
    Date = 0x87,
    /// Month register (1-12)
    Month = 0x89,
    /// Day of week register (1-7)
    Weekday = 0x8B,
    /// Year register (0-99)
    Year = 0x8D,
    /// Write-protect register
    WriteProtect = 0x8F,
}

impl From<ReadAddr> for u8 {
    fn from(v: ReadAddr) -> Self {
        v as u8
    }
}

/// Write command bytes (even, `1000_xxx0`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum WriteAddr {
    /// Seconds register (0-59) and clock-halt flag
    Seconds = 0x80,
    /// Minutes register (0-59)
    Minutes = 0x82,
    /// Hours register (1-12 + AM/PM or 0-23)
    Hours = 0x84,
    /// Date register (1-31)
    Date = 0x86,
    /// Month register (1-12)
    Month = 0x88,
    /// Day of week register (1-7)
    Weekday = 0x8A,
    /// Year register (0-99)
    Year = 0x8C,
    /// Write-protect register
    WriteProtect = 0x8E,
}

impl From<WriteAddr> for u8 {
    fn from(v: WriteAddr) -> Self {
        v as u8
    }
}

/// Hour format stored in bit 7 of the hours register.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeRepresentation {
    /// 24-hour format (0-23)
    #[default]
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour = 1,
}
impl From<u8> for TimeRepresentation {
    /// Creates a `TimeRepresentation` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => TimeRepresentation::TwentyFourHour,
            1 => TimeRepresentation::TwelveHour,
            _ => panic!("Invalid value for TimeRepresentation: {}", v),
        }
    }
}
impl From<TimeRepresentation> for u8 {
    /// Converts a `TimeRepresentation` to its raw register value.
    fn from(v: TimeRepresentation) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Seconds register (0-59) with BCD encoding and the clock-halt flag.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Seconds(u8);
    impl Debug;
    /// Clock halt: oscillator stopped while set
    pub clock_halt, set_clock_halt: 7;
    /// Tens place of seconds (0-5)
    pub ten_seconds, set_ten_seconds: 6, 4;
    /// Ones place of seconds (0-9)
    pub seconds, set_seconds: 3, 0;
}
from_register_u8!(Seconds);

#[cfg(feature = "defmt")]
impl defmt::Format for Seconds {
    fn format(&self, f: defmt::Formatter) {
        let seconds = 10 * self.ten_seconds() + self.seconds();
        defmt::write!(f, "Seconds({}s", seconds);
        if self.clock_halt() {
            defmt::write!(f, ", halted");
        }
        defmt::write!(f, ")");
    }
}

bitfield! {
    /// Minutes register (0-59) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Minutes(u8);
    impl Debug;
    /// Tens place of minutes (0-5)
    pub ten_minutes, set_ten_minutes: 6, 4;
    /// Ones place of minutes (0-9)
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(Minutes);

bitfield! {
    /// Hours register with format selection and BCD encoding.
    ///
    /// Bits 5..4 hold the tens digit in 24-hour mode; in 12-hour mode bit 5
    /// is the PM flag and only bit 4 holds the tens digit.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    /// Time representation format (12/24 hour)
    pub from into TimeRepresentation, time_representation, set_time_representation: 7, 7;
    /// PM flag (12-hour mode only)
    pub pm, set_pm: 5;
    /// Tens place of hours in 24-hour mode (0-2)
    pub ten_hours_24, set_ten_hours_24: 5, 4;
    /// Tens place of hours in 12-hour mode (0-1)
    pub ten_hours_12, set_ten_hours_12: 4, 4;
    /// Ones place of hours
    pub hours, set_hours: 3, 0;
}
from_register_u8!(Hours);

#[cfg(feature = "defmt")]
impl defmt::Format for Hours {
    fn format(&self, f: defmt::Formatter) {
        match self.time_representation() {
            TimeRepresentation::TwentyFourHour => {
                let hours = 10 * self.ten_hours_24() + self.hours();
                defmt::write!(f, "Hours({}h 24h)", hours);
            }
            TimeRepresentation::TwelveHour => {
                let hours = 10 * self.ten_hours_12() + self.hours();
                defmt::write!(f, "Hours({}h {})", hours, if self.pm() { "PM" } else { "AM" });
            }
        }
    }
}

bitfield! {
    /// Day of week register (1-7).
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Weekday(u8);
    impl Debug;
    /// Day of week (1-7)
    pub weekday, set_weekday: 2, 0;
}
from_register_u8!(Weekday);

bitfield! {
    /// Date register (1-31) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Date(u8);
    impl Debug;
    /// Tens place of date (0-3)
    pub ten_date, set_ten_date: 5, 4;
    /// Ones place of date (0-9)
    pub date, set_date: 3, 0;
}
from_register_u8!(Date);

bitfield! {
    /// Month register (1-12) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Month(u8);
    impl Debug;
    /// Tens place of month (0-1)
    pub ten_month, set_ten_month: 4, 4;
    /// Ones place of month (0-9)
    pub month, set_month: 3, 0;
}
from_register_u8!(Month);

bitfield! {
    /// Year register (0-99) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Year(u8);
    impl Debug;
    /// Tens place of year (0-9)
    pub ten_year, set_ten_year: 7, 4;
    /// Ones place of year (0-9)
    pub year, set_year: 3, 0;
}
from_register_u8!(Year);

#[cfg(feature = "defmt")]
impl defmt::Format for Year {
    fn format(&self, f: defmt::Formatter) {
        let year = 10 * self.ten_year() + self.year();
        defmt::write!(f, "Year({})", year);
    }
}

bitfield! {
    /// Write-protect register. All other writes are ignored while bit 7 is set.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct WriteProtect(u8);
    impl Debug;
    /// Write protection latch
    pub write_protect, set_write_protect: 7;
}
from_register_u8!(WriteProtect);

#[cfg(feature = "defmt")]
impl defmt::Format for WriteProtect {
    fn format(&self, f: defmt::Formatter) {
        if self.write_protect() {
            defmt::write!(f, "WriteProtect(on)");
        } else {
            defmt::write!(f, "WriteProtect(off)");
        }
    }
}
