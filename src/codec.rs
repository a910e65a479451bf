//! BCD packing for the DS1302 calendar registers.
//!
//! Each logical value the driver reads or writes is identified by a
//! [`Field`]. A field knows which register it lives in and how its digits are
//! laid out there:
//!
//! | Field          | Units | Tens | Notes                          |
//! |----------------|-------|------|--------------------------------|
//! | seconds/minutes| 0x0F  | 0x70 |                                |
//! | hours (24h)    | 0x0F  | 0x30 | bit 7 is the format flag       |
//! | hours (12h)    | 0x0F  | 0x10 | bit 5 is the PM flag           |
//! | weekday        | 0x07  | -    |                                |
//! | date           | 0x0F  | 0x30 |                                |
//! | month          | 0x0F  | 0x10 |                                |
//! | year           | 0x0F  | 0xF0 |                                |
//! | format         | -     | -    | bit 7, 0 = 24h, 1 = 12h        |
//! | AM/PM          | -     | -    | bit 5, 1 = PM                  |
//!
//! Encoding masks the tens digit into its slot, so values outside a field's
//! range are truncated rather than rejected. Range checks live in
//! [`crate::calendar`].

use crate::registers::{
    Date, Hours, Minutes, Month, ReadAddr, Seconds, TimeRepresentation, Weekday, WriteAddr, Year,
};

/// Identifies a logical value stored on the device.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Seconds (0-59)
    Seconds,
    /// Minutes (0-59)
    Minutes,
    /// Hours in 24-hour layout (0-23)
    Hours24,
    /// Hours in 12-hour layout (1-12)
    Hours12,
    /// Day of week (1-7)
    Weekday,
    /// Day of month (1-28..31)
    Date,
    /// Month (1-12)
    Month,
    /// Two-digit year (0-99)
    Year,
    /// Hour format flag of the hours register
    Format,
    /// AM/PM flag of the hours register
    AmPm,
}

impl Field {
    /// Command byte used to read the register holding this field.
    pub const fn read_addr(self) -> ReadAddr {
        match self {
            Field::Seconds => ReadAddr::Seconds,
            Field::Minutes => ReadAddr::Minutes,
            Field::Hours24 | Field::Hours12 | Field::Format | Field::AmPm => ReadAddr::Hours,
            Field::Weekday => ReadAddr::Weekday,
            Field::Date => ReadAddr::Date,
            Field::Month => ReadAddr::Month,
            Field::Year => ReadAddr::Year,
        }
    }

    /// Command byte used to write the register holding this field.
    pub const fn write_addr(self) -> WriteAddr {
        match self {
            Field::Seconds => WriteAddr::Seconds,
            Field::Minutes => WriteAddr::Minutes,
            Field::Hours24 | Field::Hours12 | Field::Format | Field::AmPm => WriteAddr::Hours,
            Field::Weekday => WriteAddr::Weekday,
            Field::Date => WriteAddr::Date,
            Field::Month => WriteAddr::Month,
            Field::Year => WriteAddr::Year,
        }
    }

    /// Hours field matching an hour format.
    pub const fn hours(time_representation: TimeRepresentation) -> Self {
        match time_representation {
            TimeRepresentation::TwentyFourHour => Field::Hours24,
            TimeRepresentation::TwelveHour => Field::Hours12,
        }
    }
}

/// Packs `value` into the register layout of `field`.
///
/// Only the bits belonging to `field` are set, so the results for the hours
/// fields can be or-ed together into one register byte.
pub fn encode(field: Field, value: u8) -> u8 {
    let ones = value % 10;
    let tens = value / 10;
    match field {
        Field::Seconds => {
            let mut reg = Seconds::default();
            reg.set_ten_seconds(tens & 0x07);
            reg.set_seconds(ones);
            reg.into()
        }
        Field::Minutes => {
            let mut reg = Minutes::default();
            reg.set_ten_minutes(tens & 0x07);
            reg.set_minutes(ones);
            reg.into()
        }
        Field::Hours24 => {
            let mut reg = Hours::default();
            reg.set_ten_hours_24(tens & 0x03);
            reg.set_hours(ones);
            reg.into()
        }
        Field::Hours12 => {
            let mut reg = Hours::default();
            reg.set_ten_hours_12(tens & 0x01);
            reg.set_hours(ones);
            reg.into()
        }
        Field::Weekday => {
            let mut reg = Weekday::default();
            reg.set_weekday(value & 0x07);
            reg.into()
        }
        Field::Date => {
            let mut reg = Date::default();
            reg.set_ten_date(tens & 0x03);
            reg.set_date(ones);
            reg.into()
        }
        Field::Month => {
            let mut reg = Month::default();
            reg.set_ten_month(tens & 0x01);
            reg.set_month(ones);
            reg.into()
        }
        Field::Year => {
            let mut reg = Year::default();
            reg.set_ten_year(tens & 0x0F);
            reg.set_year(ones);
            reg.into()
        }
        Field::Format => {
            let mut reg = Hours::default();
            reg.set_time_representation(TimeRepresentation::from(value & 0x01));
            reg.into()
        }
        Field::AmPm => {
            let mut reg = Hours::default();
            reg.set_pm(value & 0x01 != 0);
            reg.into()
        }
    }
}

/// Extracts the value of `field` from a raw register byte.
pub fn decode(field: Field, raw: u8) -> u8 {
    match field {
        Field::Seconds => {
            let reg = Seconds::from(raw);
            10 * reg.ten_seconds() + reg.seconds()
        }
        Field::Minutes => {
            let reg = Minutes::from(raw);
            10 * reg.ten_minutes() + reg.minutes()
        }
        Field::Hours24 => {
            let reg = Hours::from(raw);
            10 * reg.ten_hours_24() + reg.hours()
        }
        Field::Hours12 => {
            let reg = Hours::from(raw);
            10 * reg.ten_hours_12() + reg.hours()
        }
        Field::Weekday => Weekday::from(raw).weekday(),
        Field::Date => {
            let reg = Date::from(raw);
            10 * reg.ten_date() + reg.date()
        }
        Field::Month => {
            let reg = Month::from(raw);
            10 * reg.ten_month() + reg.month()
        }
        Field::Year => {
            let reg = Year::from(raw);
            10 * reg.ten_year() + reg.year()
        }
        Field::Format => Hours::from(raw).time_representation().into(),
        Field::AmPm => u8::from(Hours::from(raw).pm()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{range_maximum, range_minimum};

    const RANGED_FIELDS: [Field; 7] = [
        Field::Seconds,
        Field::Minutes,
        Field::Hours24,
        Field::Hours12,
        Field::Weekday,
        Field::Month,
        Field::Year,
    ];

    #[test]
    fn test_roundtrip_within_declared_ranges() {
        for field in RANGED_FIELDS {
            let min = range_minimum(field).unwrap();
            let max = range_maximum(field).unwrap();
            for value in min..=max {
                assert_eq!(
                    decode(field, encode(field, value)),
                    value,
                    "{:?} value {}",
                    field,
                    value
                );
            }
        }
        for value in 1..=31 {
            assert_eq!(decode(Field::Date, encode(Field::Date, value)), value);
        }
        for value in 0..=1 {
            assert_eq!(decode(Field::Format, encode(Field::Format, value)), value);
            assert_eq!(decode(Field::AmPm, encode(Field::AmPm, value)), value);
        }
    }

    #[test]
    fn test_encode_year_99() {
        assert_eq!(encode(Field::Year, 99), 0x99);
        assert_eq!(decode(Field::Year, 0x99), 99);
    }

    #[test]
    fn test_encode_known_layouts() {
        assert_eq!(encode(Field::Seconds, 59), 0x59);
        assert_eq!(encode(Field::Minutes, 7), 0x07);
        assert_eq!(encode(Field::Hours24, 23), 0x23);
        assert_eq!(encode(Field::Hours12, 12), 0x12);
        assert_eq!(encode(Field::Weekday, 7), 0x07);
        assert_eq!(encode(Field::Date, 31), 0x31);
        assert_eq!(encode(Field::Month, 12), 0x12);
        assert_eq!(encode(Field::Format, 1), 0x80);
        assert_eq!(encode(Field::AmPm, 1), 0x20);
    }

    #[test]
    fn test_encode_masks_tens_digit() {
        // Tens digits wider than the field's slot are cut off by the mask
        assert_eq!(encode(Field::Seconds, 99), 0x19);
        assert_eq!(encode(Field::Hours12, 23), 0x03);
        assert_eq!(encode(Field::Month, 25), 0x05);
        assert_eq!(encode(Field::Weekday, 9), 0x01);
    }

    #[test]
    fn test_decode_ignores_foreign_bits() {
        // Clock-halt flag does not leak into seconds
        assert_eq!(decode(Field::Seconds, 0xD9), 59);
        // Format and PM flags do not leak into 12h hours
        assert_eq!(decode(Field::Hours12, 0xB1), 11);
        assert_eq!(decode(Field::Format, 0xB1), 1);
        assert_eq!(decode(Field::AmPm, 0xB1), 1);
        assert_eq!(decode(Field::Weekday, 0xFB), 3);
    }

    #[test]
    fn test_twelve_hour_pm_byte() {
        let raw = encode(Field::Hours12, 11) | encode(Field::Format, 1) | encode(Field::AmPm, 1);
        assert_eq!(raw & 0x80, 0x80, "format bit");
        assert_eq!(raw & 0x20, 0x20, "PM bit");
        assert_eq!(raw & 0x0F, 1, "units nibble");
        assert_eq!(raw & 0x10, 0x10, "tens bit");
        assert_eq!(decode(Field::Hours12, raw), 11);
        assert_eq!(
            TimeRepresentation::from(decode(Field::Format, raw)),
            TimeRepresentation::TwelveHour
        );
        assert_eq!(decode(Field::AmPm, raw), 1);
    }

    #[test]
    fn test_field_addresses_share_register() {
        for field in [Field::Hours24, Field::Hours12, Field::Format, Field::AmPm] {
            assert_eq!(field.read_addr(), ReadAddr::Hours);
            assert_eq!(field.write_addr(), WriteAddr::Hours);
        }
        assert_eq!(Field::Weekday.read_addr(), ReadAddr::Weekday);
        assert_eq!(Field::Year.write_addr(), WriteAddr::Year);
    }

    #[test]
    fn test_hours_field_for_representation() {
        assert_eq!(
            Field::hours(TimeRepresentation::TwentyFourHour),
            Field::Hours24
        );
        assert_eq!(Field::hours(TimeRepresentation::TwelveHour), Field::Hours12);
    }
}
