//! Field ranges and calendar bounds.
//!
//! The range table is fixed for the life of the device. Day-of-month has a
//! static minimum but its maximum depends on month and year, see
//! [`date_range_maximum`].

use crate::codec::Field;
use crate::datetime::DateTimeError;

/// Inclusive bounds of a field. `None` maximum means the bound is computed.
struct FieldRange {
    field: Field,
    min: u8,
    max: Option<u8>,
}

impl FieldRange {
    const fn new(field: Field, min: u8, max: Option<u8>) -> Self {
        Self { field, min, max }
    }
}

static RANGES: [FieldRange; 8] = [
    FieldRange::new(Field::Seconds, 0, Some(59)),
    FieldRange::new(Field::Minutes, 0, Some(59)),
    FieldRange::new(Field::Hours24, 0, Some(23)),
    FieldRange::new(Field::Hours12, 1, Some(12)),
    FieldRange::new(Field::Weekday, 1, Some(7)),
    FieldRange::new(Field::Date, 1, None),
    FieldRange::new(Field::Month, 1, Some(12)),
    FieldRange::new(Field::Year, 0, Some(99)),
];

/// Largest day-of-month the date register can hold.
pub const DATE_MAXIMUM: u8 = 31;

fn lookup(field: Field) -> Result<&'static FieldRange, DateTimeError> {
    RANGES
        .iter()
        .find(|range| range.field == field)
        .ok_or(DateTimeError::UnsupportedField(field))
}

/// Smallest valid value of `field`.
///
/// # Errors
/// [`DateTimeError::UnsupportedField`] for the format and AM/PM flags, which
/// carry no numeric range.
pub fn range_minimum(field: Field) -> Result<u8, DateTimeError> {
    lookup(field).map(|range| range.min)
}

/// Largest valid value of `field`.
///
/// # Errors
/// [`DateTimeError::UnsupportedField`] for the format and AM/PM flags and
/// [`DateTimeError::NoStaticMaximum`] for [`Field::Date`]; use
/// [`date_range_maximum`] for the latter.
pub fn range_maximum(field: Field) -> Result<u8, DateTimeError> {
    lookup(field)?
        .max
        .ok_or(DateTimeError::NoStaticMaximum(field))
}

/// Gregorian leap-year rule applied to the stored two-digit year.
///
/// Without a century the rule can only be evaluated on `0..=99`, so year 0
/// counts as divisible by 400 and is a leap year.
pub fn is_leap_year(year: u8) -> bool {
    let year = u16::from(year);
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` of the two-digit `year`.
///
/// # Errors
/// [`DateTimeError::InvalidMonth`] if `month` is not within 1-12.
pub fn date_range_maximum(year: u8, month: u8) -> Result<u8, DateTimeError> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Ok(31),
        4 | 6 | 9 | 11 => Ok(30),
        2 if is_leap_year(year) => Ok(29),
        2 => Ok(28),
        _ => {
            error!("DS1302: invalid month {}", month);
            Err(DateTimeError::InvalidMonth(month))
        }
    }
}

/// Checks `value` against the static range of `field`.
pub(crate) fn check_range(field: Field, value: u8) -> Result<(), DateTimeError> {
    let min = range_minimum(field)?;
    let max = match field {
        Field::Date => DATE_MAXIMUM,
        _ => range_maximum(field)?,
    };
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        error!("DS1302: {:?} value {} out of range", field, value);
        Err(DateTimeError::OutOfRange { field, value })
    }
}

/// Converts a 24-hour value (0-23) to a 12-hour value and PM flag.
pub fn hour_24_to_12(hour: u8) -> (u8, bool) {
    match hour {
        0 => (12, false),
        1..=11 => (hour, false),
        12 => (12, true),
        _ => (hour - 12, true),
    }
}

/// Converts a 12-hour value (1-12) and PM flag to a 24-hour value.
///
/// Hours outside 1-12 are not rejected; PM hours saturate at 255 so the
/// result stays out of range instead of wrapping into a valid hour.
pub fn hour_12_to_24(hour: u8, pm: bool) -> u8 {
    match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h.saturating_add(12),
    }
}
