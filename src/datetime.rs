//! The datetime aggregate read from and written to the DS1302.
//!
//! [`Datetime`] mirrors the seven calendar/time registers plus the hour
//! format and AM/PM flags packed into the hours register. It is a plain
//! snapshot: the driver reads it one register at a time, so a seconds
//! rollover in the middle of a read can produce a mix of the old and new
//! time.
//!
//! # chrono
//!
//! The device stores a two-digit year. Conversions to and from chrono's
//! `NaiveDateTime` assume the 2000-2099 century, and map the weekday
//! register to 1 = Sunday through 7 = Saturday.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::calendar::{
    check_range, date_range_maximum, hour_12_to_24, hour_24_to_12, range_minimum,
};
use crate::codec::{decode, encode, Field};
use crate::registers::TimeRepresentation;

/// Errors that can occur during date/time conversion or validation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DateTimeError {
    /// The field has no entry in the range table (format and AM/PM flags)
    UnsupportedField(Field),
    /// The field's maximum depends on month and year (day-of-month)
    NoStaticMaximum(Field),
    /// Month outside 1-12
    InvalidMonth(u8),
    /// A field value outside its valid range
    OutOfRange {
        /// Offending field
        field: Field,
        /// Offending value
        value: u8,
    },
    /// The year cannot be stored (only 2000-2099 is supported)
    YearOutOfRange(i32),
    /// The decoded date/time is not a valid calendar date
    InvalidDateTime,
}

/// Snapshot of the DS1302 clock/calendar registers.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Datetime {
    /// Seconds (0-59)
    pub seconds: u8,
    /// Minutes (0-59)
    pub minutes: u8,
    /// Hours, 0-23 in 24-hour mode or 1-12 in 12-hour mode
    pub hours: u8,
    /// Day of week (1-7)
    pub weekday: u8,
    /// Day of month (1-31)
    pub date: u8,
    /// Month (1-12)
    pub month: u8,
    /// Two-digit year (0-99)
    pub year: u8,
    /// Hour format of `hours`
    pub time_representation: TimeRepresentation,
    /// PM flag, only meaningful in 12-hour mode
    pub pm: bool,
}

impl Datetime {
    /// Checks every field against its range and the date against the length
    /// of the month.
    pub fn validate(&self) -> Result<(), DateTimeError> {
        check_range(Field::Seconds, self.seconds)?;
        check_range(Field::Minutes, self.minutes)?;
        check_range(Field::hours(self.time_representation), self.hours)?;
        check_range(Field::Weekday, self.weekday)?;
        check_range(Field::Month, self.month)?;
        check_range(Field::Year, self.year)?;

        let max = date_range_maximum(self.year, self.month)?;
        if self.date < range_minimum(Field::Date)? || self.date > max {
            error!("DS1302: date {} out of range 1-{}", self.date, max);
            return Err(DateTimeError::OutOfRange {
                field: Field::Date,
                value: self.date,
            });
        }
        Ok(())
    }

    /// Packs hours, format and AM/PM into one hours register byte.
    pub fn hours_register(&self) -> u8 {
        let hours = encode(Field::hours(self.time_representation), self.hours)
            | encode(Field::Format, self.time_representation.into());
        match self.time_representation {
            TimeRepresentation::TwentyFourHour => hours,
            TimeRepresentation::TwelveHour => hours | encode(Field::AmPm, u8::from(self.pm)),
        }
    }

    /// Unpacks an hours register byte into hours, format and AM/PM.
    ///
    /// The format flag is resolved first since it selects the hours layout.
    pub fn set_hours_register(&mut self, raw: u8) {
        self.time_representation = TimeRepresentation::from(decode(Field::Format, raw));
        self.hours = decode(Field::hours(self.time_representation), raw);
        self.pm = match self.time_representation {
            TimeRepresentation::TwentyFourHour => false,
            TimeRepresentation::TwelveHour => decode(Field::AmPm, raw) != 0,
        };
    }

    /// Hours in 24-hour form regardless of the stored format.
    pub fn hour_24(&self) -> u8 {
        match self.time_representation {
            TimeRepresentation::TwentyFourHour => self.hours,
            TimeRepresentation::TwelveHour => hour_12_to_24(self.hours, self.pm),
        }
    }

    /// Builds a snapshot from a chrono datetime.
    ///
    /// # Errors
    /// [`DateTimeError::YearOutOfRange`] if the year is not within 2000-2099.
    pub fn from_naive_datetime(
        datetime: &NaiveDateTime,
        time_representation: TimeRepresentation,
    ) -> Result<Self, DateTimeError> {
        let year = datetime.year();
        if !(2000..=2099).contains(&year) {
            error!("DS1302: year {} must be within 2000-2099", year);
            return Err(DateTimeError::YearOutOfRange(year));
        }
        let narrow = |v: u32| u8::try_from(v).map_err(|_| DateTimeError::InvalidDateTime);

        let hour = narrow(datetime.hour())?;
        let (hours, pm) = match time_representation {
            TimeRepresentation::TwentyFourHour => (hour, false),
            TimeRepresentation::TwelveHour => hour_24_to_12(hour),
        };
        let raw = Datetime {
            seconds: narrow(datetime.second())?,
            minutes: narrow(datetime.minute())?,
            hours,
            weekday: narrow(datetime.weekday().number_from_sunday())?,
            date: narrow(datetime.day())?,
            month: narrow(datetime.month())?,
            year: u8::try_from(year - 2000).map_err(|_| DateTimeError::YearOutOfRange(year))?,
            time_representation,
            pm,
        };
        debug!("raw={:?}", raw);
        Ok(raw)
    }

    /// Converts the snapshot to a chrono datetime in the 2000-2099 century.
    ///
    /// The weekday register is not cross-checked against the date.
    pub fn to_naive_datetime(&self) -> Result<NaiveDateTime, DateTimeError> {
        NaiveDate::from_ymd_opt(
            2000 + i32::from(self.year),
            u32::from(self.month),
            u32::from(self.date),
        )
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(self.hour_24()),
                u32::from(self.minutes),
                u32::from(self.seconds),
            )
        })
        .ok_or(DateTimeError::InvalidDateTime)
    }
}
