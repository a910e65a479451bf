//! A platform-agnostic driver for the DS1302 real-time clock.
//!
//! The DS1302 is a trickle-charge timekeeping chip with a simple three-wire
//! interface. This crate bit-bangs that interface over three
//! [`embedded_hal`] GPIO lines and exposes the clock/calendar registers as
//! plain integers, as a [`Datetime`] snapshot or as a chrono
//! `NaiveDateTime`.
//!
//! # Features
//!
//! - Single field and whole-calendar reads and writes
//! - 12 and 24 hour formats
//! - Write protection and clock-halt control
//! - Optional `log` or `defmt` logging
//!
//! # Example
//!
//! ```rust,ignore
//! use ds1302::{Datetime, Ds1302, Pins, TimeRepresentation};
//!
//! let pins = Pins { clock, data, chip_enable };
//! let mut rtc = Ds1302::configure(Some(pins), delay)?;
//!
//! rtc.set_write_protection(false)?;
//! rtc.set_datetime(Some(&Datetime {
//!     seconds: 0,
//!     minutes: 30,
//!     hours: 9,
//!     weekday: 5,
//!     date: 14,
//!     month: 3,
//!     year: 24,
//!     time_representation: TimeRepresentation::TwentyFourHour,
//!     pm: false,
//! }))?;
//!
//! let now = rtc.datetime()?;
//! ```
//!
//! # Limitations
//!
//! A whole-calendar read is seven independent register reads. If the seconds
//! roll over in the middle, the snapshot mixes the old and new time. Burst
//! mode, the trickle charger and the clock RAM are not supported.

#![no_std]

#[macro_use]
mod fmt;

pub mod bus;
pub mod calendar;
pub mod codec;
pub mod datetime;
pub mod registers;

use chrono::NaiveDateTime;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

pub use bus::{BusError, DataPin, PinError, Pins, RegisterBus, ThreeWireBus};
pub use calendar::{date_range_maximum, is_leap_year, range_maximum, range_minimum};
pub use codec::Field;
pub use datetime::{DateTimeError, Datetime};
pub use registers::TimeRepresentation;

use calendar::{check_range, hour_24_to_12};
use codec::{decode, encode};
use registers::{
    Date, Hours, Minutes, Month, ReadAddr, Seconds, Weekday, WriteAddr, WriteProtect, Year,
};

/// Errors returned by the driver.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ds1302Error<BusE> {
    /// Transport error
    Bus(BusE),
    /// Rejected or undecodable date/time value
    DateTime(DateTimeError),
    /// `configure` was called without a pin assignment
    MissingPins,
}

impl<BusE> From<BusE> for Ds1302Error<BusE> {
    fn from(e: BusE) -> Self {
        Ds1302Error::Bus(e)
    }
}

// Generates typed accessors for whole registers.
macro_rules! set_and_get_register {
    ($(($name:ident, $read:expr, $write:expr, $typ:ty)),+) => {
        $(
            paste::paste! {
                #[doc = concat!("Reads the raw ", stringify!($name), " register.")]
                pub fn [< $name _register >](&mut self) -> Result<$typ, Ds1302Error<BUS::Error>> {
                    Ok(<$typ>::from(self.read($read)?))
                }

                #[doc = concat!("Writes the raw ", stringify!($name), " register.")]
                pub fn [< set_ $name _register >](&mut self, value: $typ) -> Result<(), Ds1302Error<BUS::Error>> {
                    self.write($write, value.into())
                }
            }
        )+
    };
}

// Generates range-checked integer accessors for single-field registers.
macro_rules! set_and_get_field {
    ($(($name:ident, $field:expr)),+) => {
        $(
            paste::paste! {
                #[doc = concat!("Reads the ", stringify!($name), " field.")]
                pub fn [< get_ $name >](&mut self) -> Result<u8, Ds1302Error<BUS::Error>> {
                    self.read_field($field)
                }

                #[doc = concat!("Writes the ", stringify!($name), " field.")]
                ///
                /// # Errors
                /// [`DateTimeError::OutOfRange`] if `value` is outside the
                /// field's range. Nothing is written in that case.
                pub fn [< set_ $name >](&mut self, value: u8) -> Result<(), Ds1302Error<BUS::Error>> {
                    self.write_field($field, value)
                }
            }
        )+
    };
}

/// DS1302 driver.
pub struct Ds1302<BUS> {
    bus: BUS,
}

impl<CLK, IO, CE, D> Ds1302<ThreeWireBus<CLK, IO, CE, D>>
where
    CLK: OutputPin,
    IO: DataPin,
    CE: OutputPin,
    D: DelayNs,
{
    /// Takes ownership of the pin assignment and drives all three lines low.
    ///
    /// # Errors
    /// [`Ds1302Error::MissingPins`] if `pins` is `None`, or the GPIO error of
    /// the first line that could not be driven.
    pub fn configure(
        pins: Option<Pins<CLK, IO, CE>>,
        delay: D,
    ) -> Result<Self, Ds1302Error<PinError<CLK, IO, CE>>> {
        let Some(pins) = pins else {
            error!("DS1302: no pin assignment");
            return Err(Ds1302Error::MissingPins);
        };
        let bus = ThreeWireBus::new(pins, delay)?;
        debug!("DS1302: configured");
        Ok(Self::new(bus))
    }
}

impl<BUS: RegisterBus> Ds1302<BUS> {
    /// Creates a driver over an already initialized bus.
    pub fn new(bus: BUS) -> Self {
        Self { bus }
    }

    /// Destroy the driver and return the bus.
    pub fn release(self) -> BUS {
        self.bus
    }

    fn read(&mut self, addr: ReadAddr) -> Result<u8, Ds1302Error<BUS::Error>> {
        Ok(self.bus.read_register(addr.into())?)
    }

    fn write(&mut self, addr: WriteAddr, value: u8) -> Result<(), Ds1302Error<BUS::Error>> {
        Ok(self.bus.write_register(addr.into(), value)?)
    }

    fn read_field(&mut self, field: Field) -> Result<u8, Ds1302Error<BUS::Error>> {
        let raw = self.read(field.read_addr())?;
        Ok(decode(field, raw))
    }

    fn write_field(&mut self, field: Field, value: u8) -> Result<(), Ds1302Error<BUS::Error>> {
        check_range(field, value).map_err(Ds1302Error::DateTime)?;
        self.write(field.write_addr(), encode(field, value))
    }

    /// Reads the seconds (0-59).
    pub fn get_seconds(&mut self) -> Result<u8, Ds1302Error<BUS::Error>> {
        self.read_field(Field::Seconds)
    }

    /// Writes the seconds, keeping the clock-halt flag as it is.
    pub fn set_seconds(&mut self, seconds: u8) -> Result<(), Ds1302Error<BUS::Error>> {
        check_range(Field::Seconds, seconds).map_err(Ds1302Error::DateTime)?;
        let halted = self.seconds_register()?.clock_halt();
        let mut reg = Seconds::from(encode(Field::Seconds, seconds));
        reg.set_clock_halt(halted);
        self.set_seconds_register(reg)
    }

    /// Reads the hours using the layout of `time_representation`.
    ///
    /// The format flag stored on the device is not consulted, so asking for
    /// the wrong layout yields a meaningless value.
    pub fn get_hours(
        &mut self,
        time_representation: TimeRepresentation,
    ) -> Result<u8, Ds1302Error<BUS::Error>> {
        self.read_field(Field::hours(time_representation))
    }

    /// Writes the hours together with the format flag and, in 12-hour mode,
    /// the PM flag.
    pub fn set_hours(
        &mut self,
        hours: u8,
        time_representation: TimeRepresentation,
        pm: bool,
    ) -> Result<(), Ds1302Error<BUS::Error>> {
        check_range(Field::hours(time_representation), hours).map_err(Ds1302Error::DateTime)?;
        let datetime = Datetime {
            hours,
            time_representation,
            pm,
            ..Default::default()
        };
        self.write(WriteAddr::Hours, datetime.hours_register())
    }

    set_and_get_field!(
        (minutes, Field::Minutes),
        (weekday, Field::Weekday),
        (date, Field::Date),
        (month, Field::Month),
        (year, Field::Year)
    );

    /// Enables or disables the write-protect latch.
    ///
    /// While enabled the device ignores every other register write.
    pub fn set_write_protection(&mut self, enabled: bool) -> Result<(), Ds1302Error<BUS::Error>> {
        let mut reg = WriteProtect::default();
        reg.set_write_protect(enabled);
        debug!("DS1302: write protection {}", enabled);
        self.set_write_protect_register(reg)
    }

    /// Reads back the write-protect latch.
    pub fn is_write_protected(&mut self) -> Result<bool, Ds1302Error<BUS::Error>> {
        Ok(self.write_protect_register()?.write_protect())
    }

    /// Returns `false` while the clock-halt flag is set.
    pub fn is_running(&mut self) -> Result<bool, Ds1302Error<BUS::Error>> {
        Ok(!self.seconds_register()?.clock_halt())
    }

    /// Starts or stops the oscillator. The seconds count is preserved.
    pub fn set_running(&mut self, running: bool) -> Result<(), Ds1302Error<BUS::Error>> {
        let mut seconds = self.seconds_register()?;
        seconds.set_clock_halt(!running);
        debug!("DS1302: running {}", running);
        self.set_seconds_register(seconds)
    }

    /// Switches the stored hour between 12 and 24 hour format.
    ///
    /// The current hour is read, converted and written back, so the time of
    /// day is unchanged.
    pub fn set_time_representation(
        &mut self,
        time_representation: TimeRepresentation,
    ) -> Result<(), Ds1302Error<BUS::Error>> {
        let mut datetime = Datetime::default();
        datetime.set_hours_register(self.read(ReadAddr::Hours)?);
        if datetime.time_representation == time_representation {
            return Ok(());
        }
        check_range(Field::hours(datetime.time_representation), datetime.hours)
            .map_err(Ds1302Error::DateTime)?;

        let hour = datetime.hour_24();
        (datetime.hours, datetime.pm) = match time_representation {
            TimeRepresentation::TwentyFourHour => (hour, false),
            TimeRepresentation::TwelveHour => hour_24_to_12(hour),
        };
        datetime.time_representation = time_representation;
        debug!("DS1302: hour format {:?}", time_representation);
        self.write(WriteAddr::Hours, datetime.hours_register())
    }

    /// Reads the whole calendar into `out`.
    ///
    /// Registers are read year first and seconds last, one transaction each.
    /// `None` performs no transaction. `out` is left untouched on error.
    pub fn get_datetime(
        &mut self,
        out: Option<&mut Datetime>,
    ) -> Result<(), Ds1302Error<BUS::Error>> {
        let Some(out) = out else {
            return Ok(());
        };
        let mut datetime = Datetime {
            year: self.read_field(Field::Year)?,
            month: self.read_field(Field::Month)?,
            date: self.read_field(Field::Date)?,
            weekday: self.read_field(Field::Weekday)?,
            ..Default::default()
        };
        datetime.set_hours_register(self.read(ReadAddr::Hours)?);
        datetime.minutes = self.read_field(Field::Minutes)?;
        datetime.seconds = self.read_field(Field::Seconds)?;
        debug!("DS1302: read {:?}", datetime);
        *out = datetime;
        Ok(())
    }

    /// Writes the whole calendar from `datetime`.
    ///
    /// The snapshot is validated before anything is written. Registers are
    /// written year first and seconds last; writing the seconds also clears
    /// the clock-halt flag. `None` performs no transaction.
    pub fn set_datetime(
        &mut self,
        datetime: Option<&Datetime>,
    ) -> Result<(), Ds1302Error<BUS::Error>> {
        let Some(datetime) = datetime else {
            return Ok(());
        };
        datetime.validate().map_err(Ds1302Error::DateTime)?;
        debug!("DS1302: write {:?}", datetime);

        self.write(WriteAddr::Year, encode(Field::Year, datetime.year))?;
        self.write(WriteAddr::Month, encode(Field::Month, datetime.month))?;
        self.write(WriteAddr::Date, encode(Field::Date, datetime.date))?;
        self.write(WriteAddr::Weekday, encode(Field::Weekday, datetime.weekday))?;
        self.write(WriteAddr::Hours, datetime.hours_register())?;
        self.write(WriteAddr::Minutes, encode(Field::Minutes, datetime.minutes))?;
        self.write(WriteAddr::Seconds, encode(Field::Seconds, datetime.seconds))
    }

    /// Reads the whole calendar.
    pub fn datetime(&mut self) -> Result<Datetime, Ds1302Error<BUS::Error>> {
        let mut datetime = Datetime::default();
        self.get_datetime(Some(&mut datetime))?;
        Ok(datetime)
    }

    /// Reads the whole calendar as a chrono datetime in 2000-2099.
    pub fn naive_datetime(&mut self) -> Result<NaiveDateTime, Ds1302Error<BUS::Error>> {
        self.datetime()?
            .to_naive_datetime()
            .map_err(Ds1302Error::DateTime)
    }

    /// Writes a chrono datetime using the given hour format.
    pub fn set_naive_datetime(
        &mut self,
        datetime: &NaiveDateTime,
        time_representation: TimeRepresentation,
    ) -> Result<(), Ds1302Error<BUS::Error>> {
        let datetime = Datetime::from_naive_datetime(datetime, time_representation)
            .map_err(Ds1302Error::DateTime)?;
        self.set_datetime(Some(&datetime))
    }

    set_and_get_register!(
        (seconds, ReadAddr::Seconds, WriteAddr::Seconds, Seconds),
        (minutes, ReadAddr::Minutes, WriteAddr::Minutes, Minutes),
        (hours, ReadAddr::Hours, WriteAddr::Hours, Hours),
        (weekday, ReadAddr::Weekday, WriteAddr::Weekday, Weekday),
        (date, ReadAddr::Date, WriteAddr::Date, Date),
        (month, ReadAddr::Month, WriteAddr::Month, Month),
        (year, ReadAddr::Year, WriteAddr::Year, Year),
        (write_protect, ReadAddr::WriteProtect, WriteAddr::WriteProtect, WriteProtect)
    );
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use chrono::NaiveDate;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorType, InputPin};
    use embedded_hal_mock::eh1::delay::NoopDelay;

    #[derive(Debug, Copy, Clone, PartialEq)]
    enum Op {
        Read(u8),
        Write(u8, u8),
    }

    /// Register map standing in for the device. Honors the write-protect
    /// latch like the real chip.
    #[derive(Default)]
    struct FakeBus {
        regs: [u8; 8],
        ops: Vec<Op>,
    }

    fn index(addr: u8) -> usize {
        usize::from((addr >> 1) & 0x07)
    }

    impl RegisterBus for FakeBus {
        type Error = Infallible;

        fn read_register(&mut self, addr: u8) -> Result<u8, Self::Error> {
            self.ops.push(Op::Read(addr));
            Ok(self.regs[index(addr)])
        }

        fn write_register(&mut self, addr: u8, value: u8) -> Result<(), Self::Error> {
            self.ops.push(Op::Write(addr, value));
            let protected = self.regs[7] & 0x80 != 0;
            if !protected || addr == u8::from(WriteAddr::WriteProtect) {
                self.regs[index(addr)] = value;
            }
            Ok(())
        }
    }

    fn rtc_with(regs: [u8; 8]) -> Ds1302<FakeBus> {
        Ds1302::new(FakeBus {
            regs,
            ops: Vec::new(),
        })
    }

    fn ops(rtc: &mut Ds1302<FakeBus>) -> Vec<Op> {
        core::mem::take(&mut rtc.bus.ops)
    }

    fn thursday() -> Datetime {
        Datetime {
            seconds: 58,
            minutes: 59,
            hours: 23,
            weekday: 5,
            date: 14,
            month: 3,
            year: 24,
            time_representation: TimeRepresentation::TwentyFourHour,
            pm: false,
        }
    }

    #[test]
    fn test_get_datetime_reads_year_first() {
        // sec, min, hour, date, month, weekday, year, wp
        let mut rtc = rtc_with([0x58, 0x59, 0x23, 0x14, 0x03, 0x05, 0x24, 0x00]);
        let mut datetime = Datetime::default();
        rtc.get_datetime(Some(&mut datetime)).unwrap();
        assert_eq!(datetime, thursday());
        assert_eq!(
            ops(&mut rtc),
            vec![
                Op::Read(0x8D),
                Op::Read(0x89),
                Op::Read(0x87),
                Op::Read(0x8B),
                Op::Read(0x85),
                Op::Read(0x83),
                Op::Read(0x81),
            ]
        );
    }

    /// Register map whose clock ticks over to the next second right after
    /// the date register has been read.
    struct TickingBus {
        inner: FakeBus,
        after_date: [u8; 8],
    }

    impl RegisterBus for TickingBus {
        type Error = Infallible;

        fn read_register(&mut self, addr: u8) -> Result<u8, Self::Error> {
            let value = self.inner.read_register(addr)?;
            if addr == u8::from(ReadAddr::Date) {
                self.inner.regs = self.after_date;
            }
            Ok(value)
        }

        fn write_register(&mut self, addr: u8, value: u8) -> Result<(), Self::Error> {
            self.inner.write_register(addr, value)
        }
    }

    #[test]
    fn test_get_datetime_is_not_atomic_across_rollover() {
        // Thursday 2024-03-14 23:59:59 ticks to Friday 2024-03-15 00:00:00
        let mut rtc = Ds1302::new(TickingBus {
            inner: FakeBus {
                regs: [0x59, 0x59, 0x23, 0x14, 0x03, 0x05, 0x24, 0x00],
                ops: Vec::new(),
            },
            after_date: [0x00, 0x00, 0x00, 0x15, 0x03, 0x06, 0x24, 0x00],
        });
        let datetime = rtc.datetime().unwrap();

        // Date from before the tick, weekday and time from after it
        assert_eq!(
            datetime,
            Datetime {
                seconds: 0,
                minutes: 0,
                hours: 0,
                weekday: 6,
                date: 14,
                month: 3,
                year: 24,
                time_representation: TimeRepresentation::TwentyFourHour,
                pm: false,
            }
        );
        assert_eq!(
            datetime.to_naive_datetime().unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 14)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        // One transaction per register, no burst read
        assert_eq!(rtc.release().inner.ops.len(), 7);
    }

    #[test]
    fn test_set_datetime_writes_seconds_last() {
        let mut rtc = rtc_with([0; 8]);
        rtc.set_datetime(Some(&thursday())).unwrap();
        assert_eq!(
            ops(&mut rtc),
            vec![
                Op::Write(0x8C, 0x24),
                Op::Write(0x88, 0x03),
                Op::Write(0x86, 0x14),
                Op::Write(0x8A, 0x05),
                Op::Write(0x84, 0x23),
                Op::Write(0x82, 0x59),
                Op::Write(0x80, 0x58),
            ]
        );
        assert_eq!(rtc.datetime().unwrap(), thursday());
    }

    #[test]
    fn test_absent_aggregate_is_a_no_op() {
        let mut rtc = rtc_with([0; 8]);
        rtc.set_datetime(None).unwrap();
        rtc.get_datetime(None).unwrap();
        assert!(ops(&mut rtc).is_empty());
    }

    #[test]
    fn test_invalid_aggregate_is_rejected_before_any_write() {
        let mut rtc = rtc_with([0; 8]);

        let datetime = Datetime {
            seconds: 60,
            ..thursday()
        };
        assert!(matches!(
            rtc.set_datetime(Some(&datetime)),
            Err(Ds1302Error::DateTime(DateTimeError::OutOfRange {
                field: Field::Seconds,
                value: 60
            }))
        ));

        // 2023 is not a leap year
        let datetime = Datetime {
            date: 29,
            month: 2,
            year: 23,
            ..thursday()
        };
        assert!(matches!(
            rtc.set_datetime(Some(&datetime)),
            Err(Ds1302Error::DateTime(DateTimeError::OutOfRange {
                field: Field::Date,
                value: 29
            }))
        ));
        assert!(ops(&mut rtc).is_empty());
    }

    #[test]
    fn test_twelve_hour_pm_round_trip() {
        let mut rtc = rtc_with([0; 8]);
        let datetime = Datetime {
            hours: 11,
            time_representation: TimeRepresentation::TwelveHour,
            pm: true,
            ..thursday()
        };
        rtc.set_datetime(Some(&datetime)).unwrap();
        assert_eq!(rtc.bus.regs[2], 0xB1);

        let read = rtc.datetime().unwrap();
        assert_eq!(read.hours, 11);
        assert_eq!(read.time_representation, TimeRepresentation::TwelveHour);
        assert!(read.pm);
        assert_eq!(read, datetime);
    }

    #[test]
    fn test_single_field_getters() {
        let mut rtc = rtc_with([0xD9, 0x07, 0xB1, 0x31, 0x12, 0x07, 0x99, 0x80]);
        assert_eq!(rtc.get_seconds().unwrap(), 59);
        assert_eq!(rtc.get_minutes().unwrap(), 7);
        assert_eq!(rtc.get_hours(TimeRepresentation::TwelveHour).unwrap(), 11);
        assert_eq!(rtc.get_date().unwrap(), 31);
        assert_eq!(rtc.get_month().unwrap(), 12);
        assert_eq!(rtc.get_weekday().unwrap(), 7);
        assert_eq!(rtc.get_year().unwrap(), 99);
        assert_eq!(
            ops(&mut rtc),
            vec![
                Op::Read(0x81),
                Op::Read(0x83),
                Op::Read(0x85),
                Op::Read(0x87),
                Op::Read(0x89),
                Op::Read(0x8B),
                Op::Read(0x8D),
            ]
        );

        let mut rtc = rtc_with([0, 0, 0x23, 0, 0, 0, 0, 0]);
        assert_eq!(rtc.get_hours(TimeRepresentation::TwentyFourHour).unwrap(), 23);
    }

    #[test]
    fn test_single_field_setters() {
        let mut rtc = rtc_with([0; 8]);
        rtc.set_minutes(45).unwrap();
        rtc.set_weekday(1).unwrap();
        rtc.set_date(31).unwrap();
        rtc.set_month(10).unwrap();
        rtc.set_year(0).unwrap();
        assert_eq!(
            ops(&mut rtc),
            vec![
                Op::Write(0x82, 0x45),
                Op::Write(0x8A, 0x01),
                Op::Write(0x86, 0x31),
                Op::Write(0x88, 0x10),
                Op::Write(0x8C, 0x00),
            ]
        );
    }

    #[test]
    fn test_setters_reject_out_of_range() {
        let mut rtc = rtc_with([0; 8]);
        assert!(rtc.set_minutes(60).is_err());
        assert!(rtc.set_weekday(0).is_err());
        assert!(rtc.set_date(32).is_err());
        assert!(rtc.set_month(13).is_err());
        assert!(rtc.set_year(100).is_err());
        assert!(rtc.set_seconds(60).is_err());
        assert!(rtc
            .set_hours(13, TimeRepresentation::TwelveHour, false)
            .is_err());
        assert!(rtc
            .set_hours(24, TimeRepresentation::TwentyFourHour, false)
            .is_err());
        assert!(ops(&mut rtc).is_empty());
    }

    #[test]
    fn test_set_hours() {
        let mut rtc = rtc_with([0; 8]);
        rtc.set_hours(12, TimeRepresentation::TwelveHour, true)
            .unwrap();
        assert_eq!(rtc.bus.regs[2], 0xB2);
        rtc.set_hours(8, TimeRepresentation::TwelveHour, false)
            .unwrap();
        assert_eq!(rtc.bus.regs[2], 0x88);
        // PM is ignored in 24-hour mode
        rtc.set_hours(17, TimeRepresentation::TwentyFourHour, true)
            .unwrap();
        assert_eq!(rtc.bus.regs[2], 0x17);
    }

    #[test]
    fn test_set_seconds_keeps_clock_halt() {
        let mut rtc = rtc_with([0x80, 0, 0, 0, 0, 0, 0, 0]);
        rtc.set_seconds(42).unwrap();
        assert_eq!(rtc.bus.regs[0], 0xC2);
        assert!(!rtc.is_running().unwrap());
    }

    #[test]
    fn test_write_protection() {
        let mut rtc = rtc_with([0; 8]);
        rtc.set_write_protection(true).unwrap();
        assert!(rtc.is_write_protected().unwrap());
        rtc.set_write_protection(false).unwrap();
        assert!(!rtc.is_write_protected().unwrap());
        assert_eq!(
            ops(&mut rtc),
            vec![
                Op::Write(0x8E, 0x80),
                Op::Read(0x8F),
                Op::Write(0x8E, 0x00),
                Op::Read(0x8F),
            ]
        );
    }

    #[test]
    fn test_write_protection_blocks_writes() {
        let mut rtc = rtc_with([0; 8]);
        rtc.set_write_protection(true).unwrap();
        rtc.set_minutes(30).unwrap();
        assert_eq!(rtc.get_minutes().unwrap(), 0);

        rtc.set_write_protection(false).unwrap();
        rtc.set_minutes(30).unwrap();
        assert_eq!(rtc.get_minutes().unwrap(), 30);
    }

    #[test]
    fn test_clock_halt_preserves_seconds() {
        let mut rtc = rtc_with([0x45, 0, 0, 0, 0, 0, 0, 0]);
        assert!(rtc.is_running().unwrap());

        rtc.set_running(false).unwrap();
        assert_eq!(rtc.bus.regs[0], 0xC5);
        assert!(!rtc.is_running().unwrap());
        assert_eq!(rtc.get_seconds().unwrap(), 45);

        rtc.set_running(true).unwrap();
        assert_eq!(rtc.bus.regs[0], 0x45);
    }

    #[test]
    fn test_set_datetime_starts_clock() {
        let mut rtc = rtc_with([0x80, 0, 0, 0, 0, 0, 0, 0]);
        rtc.set_datetime(Some(&thursday())).unwrap();
        assert!(rtc.is_running().unwrap());
    }

    #[test]
    fn test_time_representation_switching() {
        let mut rtc = rtc_with([0, 0, 0x23, 0, 0, 0, 0, 0]);
        rtc.set_time_representation(TimeRepresentation::TwelveHour)
            .unwrap();
        assert_eq!(rtc.bus.regs[2], 0xB1);
        rtc.set_time_representation(TimeRepresentation::TwentyFourHour)
            .unwrap();
        assert_eq!(rtc.bus.regs[2], 0x23);

        // Midnight is 12 AM
        let mut rtc = rtc_with([0; 8]);
        rtc.set_time_representation(TimeRepresentation::TwelveHour)
            .unwrap();
        assert_eq!(rtc.bus.regs[2], 0x92);
    }

    #[test]
    fn test_time_representation_unchanged_skips_write() {
        let mut rtc = rtc_with([0, 0, 0x23, 0, 0, 0, 0, 0]);
        rtc.set_time_representation(TimeRepresentation::TwentyFourHour)
            .unwrap();
        assert_eq!(ops(&mut rtc), vec![Op::Read(0x85)]);
    }

    #[test]
    fn test_naive_datetime_round_trip() {
        let mut rtc = rtc_with([0; 8]);
        let expected = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(15, 4, 5)
            .unwrap();
        rtc.set_naive_datetime(&expected, TimeRepresentation::TwelveHour)
            .unwrap();
        assert_eq!(rtc.get_weekday().unwrap(), 5);
        assert_eq!(rtc.naive_datetime().unwrap(), expected);

        let too_early = NaiveDate::from_ymd_opt(1999, 12, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(matches!(
            rtc.set_naive_datetime(&too_early, TimeRepresentation::TwentyFourHour),
            Err(Ds1302Error::DateTime(DateTimeError::YearOutOfRange(1999)))
        ));
    }

    #[test]
    fn test_naive_datetime_rejects_garbage() {
        // Month 0 cannot be a calendar date
        let mut rtc = rtc_with([0, 0, 0, 0x01, 0x00, 0x01, 0x24, 0]);
        assert!(matches!(
            rtc.naive_datetime(),
            Err(Ds1302Error::DateTime(DateTimeError::InvalidDateTime))
        ));
    }

    /// Bus that fails every transaction.
    struct DeadBus;

    impl RegisterBus for DeadBus {
        type Error = &'static str;

        fn read_register(&mut self, _addr: u8) -> Result<u8, Self::Error> {
            Err("dead")
        }

        fn write_register(&mut self, _addr: u8, _value: u8) -> Result<(), Self::Error> {
            Err("dead")
        }
    }

    #[test]
    fn test_bus_errors_propagate() {
        let mut rtc = Ds1302::new(DeadBus);
        assert!(matches!(rtc.get_seconds(), Err(Ds1302Error::Bus("dead"))));
        assert!(matches!(
            rtc.set_write_protection(true),
            Err(Ds1302Error::Bus("dead"))
        ));

        let mut datetime = thursday();
        assert!(rtc.get_datetime(Some(&mut datetime)).is_err());
        assert_eq!(datetime, thursday());
    }

    /// GPIO line that reads low and accepts everything.
    struct IdlePin;

    impl ErrorType for IdlePin {
        type Error = Infallible;
    }

    impl OutputPin for IdlePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    impl InputPin for IdlePin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(false)
        }
        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(true)
        }
    }

    impl DataPin for IdlePin {
        fn set_as_output(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
        fn set_as_input(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_configure_requires_pins() {
        let result = Ds1302::configure(None::<Pins<IdlePin, IdlePin, IdlePin>>, NoopDelay::new());
        assert!(matches!(result, Err(Ds1302Error::MissingPins)));
    }

    #[test]
    fn test_configure_with_pins() {
        let pins = Pins {
            clock: IdlePin,
            data: IdlePin,
            chip_enable: IdlePin,
        };
        let mut rtc = Ds1302::configure(Some(pins), NoopDelay::new()).unwrap();
        assert_eq!(rtc.get_seconds().unwrap(), 0);
        assert!(rtc.is_running().unwrap());
        let _bus = rtc.release().release();
    }
}
