//! Partial calendar timestamps for the `date` tag.
//!
//! Tag formats store recording dates with varying precision: a bare year is
//! the common case, full date-times are rare. [`Timestamp`] keeps the year
//! mandatory and every finer component optional, with the rule that a
//! component is only present when all coarser ones are.
//!
//! The text form is `YYYY/MM/dd@hh:mm:ss`, truncated after the finest
//! present component.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TimestampError;

const COMPONENT_NAMES: [&str; 6] = ["year", "month", "day", "hour", "minute", "second"];
const MAX_YEAR: u16 = 9999;

/// A calendar timestamp with a mandatory year and optional finer components.
///
/// Construct through [`Timestamp::from_year`], [`Timestamp::from_parts`] or
/// by parsing. The derived ordering compares coarse components first, and an
/// absent component orders before any present one.
///
/// # Examples
///
/// ```
/// use taggy_core::Timestamp;
///
/// let ts: Timestamp = "2020/05/01@13:45".parse()?;
/// assert_eq!(ts.year(), 2020);
/// assert_eq!(ts.minute(), Some(45));
/// assert_eq!(ts.second(), None);
/// assert_eq!(ts.to_string(), "2020/05/01@13:45");
/// # Ok::<(), taggy_core::TimestampError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    year: u16,
    month: Option<u8>,
    day: Option<u8>,
    hour: Option<u8>,
    minute: Option<u8>,
    second: Option<u8>,
}

impl Timestamp {
    /// Creates a year-only timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::OutOfRange`] for years above 9999.
    pub fn from_year(year: u16) -> Result<Self, TimestampError> {
        Self::from_parts(year, None, None, None, None, None)
    }

    /// Creates a timestamp from individual components.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::MissingCoarser`] when a component is given
    /// without the one above it, and [`TimestampError::OutOfRange`] when a
    /// component is outside its calendar or clock range.
    pub fn from_parts(
        year: u16,
        month: Option<u8>,
        day: Option<u8>,
        hour: Option<u8>,
        minute: Option<u8>,
        second: Option<u8>,
    ) -> Result<Self, TimestampError> {
        let finer = [month, day, hour, minute, second];
        for (index, pair) in finer.windows(2).enumerate() {
            if pair[0].is_none() && pair[1].is_some() {
                return Err(TimestampError::MissingCoarser {
                    component: COMPONENT_NAMES[index + 2],
                    missing: COMPONENT_NAMES[index + 1],
                });
            }
        }

        if year > MAX_YEAR {
            return Err(out_of_range("year", year.into()));
        }
        if let Some(month) = month {
            check_range("month", month, 1, 12)?;
        }
        if let (Some(month), Some(day)) = (month, day) {
            check_range("day", day, 1, days_in_month(year, month))?;
        }
        if let Some(hour) = hour {
            check_range("hour", hour, 0, 23)?;
        }
        if let Some(minute) = minute {
            check_range("minute", minute, 0, 59)?;
        }
        if let Some(second) = second {
            check_range("second", second, 0, 59)?;
        }

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Returns the year.
    #[inline]
    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }

    /// Returns the month (1-12), if present.
    #[inline]
    #[must_use]
    pub const fn month(&self) -> Option<u8> {
        self.month
    }

    /// Returns the day of the month, if present.
    #[inline]
    #[must_use]
    pub const fn day(&self) -> Option<u8> {
        self.day
    }

    /// Returns the hour (0-23), if present.
    #[inline]
    #[must_use]
    pub const fn hour(&self) -> Option<u8> {
        self.hour
    }

    /// Returns the minute, if present.
    #[inline]
    #[must_use]
    pub const fn minute(&self) -> Option<u8> {
        self.minute
    }

    /// Returns the second, if present.
    #[inline]
    #[must_use]
    pub const fn second(&self) -> Option<u8> {
        self.second
    }
}

fn out_of_range(component: &'static str, value: u32) -> TimestampError {
    TimestampError::OutOfRange { component, value }
}

fn check_range(component: &'static str, value: u8, min: u8, max: u8) -> Result<(), TimestampError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(out_of_range(component, value.into()))
    }
}

const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Parses one numeric component made of 1..=`max_digits` ASCII digits.
fn parse_component(input: &str, field: &str, max_digits: usize) -> Result<u16, TimestampError> {
    if field.is_empty() {
        return Err(TimestampError::invalid_format(input, "empty component"));
    }
    if field.len() > max_digits || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampError::invalid_format(input, "components must be digits"));
    }
    field
        .parse()
        .map_err(|_| TimestampError::invalid_format(input, "components must be digits"))
}

fn narrow(component: &'static str, value: u16) -> Result<u8, TimestampError> {
    u8::try_from(value).map_err(|_| out_of_range(component, value.into()))
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(TimestampError::invalid_format(s, "empty timestamp"));
        }

        let (date, time) = match input.split_once('@') {
            Some((date, time)) => (date, Some(time)),
            None => (input, None),
        };

        let date_fields: Vec<&str> = date.split('/').collect();
        if date_fields.len() > 3 {
            return Err(TimestampError::invalid_format(input, "too many date components"));
        }
        let time_fields: Vec<&str> = time.map(|t| t.split(':').collect()).unwrap_or_default();
        if time_fields.len() > 3 {
            return Err(TimestampError::invalid_format(input, "too many time components"));
        }
        if time.is_some() && date_fields.len() != 3 {
            return Err(TimestampError::invalid_format(input, "time requires a full date"));
        }

        let year = parse_component(input, date_fields[0], 4)?;
        let mut finer: [Option<u8>; 5] = [None; 5];
        for (slot, field) in date_fields[1..].iter().chain(time_fields.iter()).enumerate() {
            let value = parse_component(input, field, 2)?;
            finer[slot] = Some(narrow(COMPONENT_NAMES[slot + 1], value)?);
        }

        let [month, day, hour, minute, second] = finer;
        Self::from_parts(year, month, day, hour, minute, second)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        let Some(month) = self.month else { return Ok(()) };
        write!(f, "/{month:02}")?;
        let Some(day) = self.day else { return Ok(()) };
        write!(f, "/{day:02}")?;
        let Some(hour) = self.hour else { return Ok(()) };
        write!(f, "@{hour:02}")?;
        let Some(minute) = self.minute else { return Ok(()) };
        write!(f, ":{minute:02}")?;
        let Some(second) = self.second else { return Ok(()) };
        write!(f, ":{second:02}")
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    #[test]
    fn test_round_trip_at_every_precision() {
        let cases = [
            Timestamp::from_year(2020).unwrap(),
            Timestamp::from_parts(2020, Some(5), None, None, None, None).unwrap(),
            Timestamp::from_parts(2020, Some(5), Some(1), None, None, None).unwrap(),
            Timestamp::from_parts(2020, Some(5), Some(1), Some(0), None, None).unwrap(),
            Timestamp::from_parts(2020, Some(5), Some(1), Some(13), Some(45), None).unwrap(),
            Timestamp::from_parts(1999, Some(12), Some(31), Some(23), Some(59), Some(59)).unwrap(),
            Timestamp::from_year(7).unwrap(),
        ];
        for ts in cases {
            let text = ts.to_string();
            assert_eq!(text.parse::<Timestamp>().unwrap(), ts, "round trip of {text}");
        }
    }

    #[test]
    fn test_format_truncates_after_finest_component() {
        assert_eq!(Timestamp::from_year(2020).unwrap().to_string(), "2020");
        assert_eq!(parse("2020/5/1").to_string(), "2020/05/01");
        assert_eq!(parse("2020/05/01@13").to_string(), "2020/05/01@13");
        assert_eq!(parse("2020/05/01@13:45:30").to_string(), "2020/05/01@13:45:30");
        assert_eq!(Timestamp::from_year(7).unwrap().to_string(), "0007");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(
            parse("  2020/05 "),
            Timestamp::from_parts(2020, Some(5), None, None, None, None).unwrap()
        );
    }

    #[test]
    fn test_finer_component_requires_coarser() {
        let err = Timestamp::from_parts(2020, None, Some(1), None, None, None).unwrap_err();
        assert_eq!(
            err,
            TimestampError::MissingCoarser {
                component: "day",
                missing: "month"
            }
        );

        let err = Timestamp::from_parts(2020, Some(1), Some(1), None, Some(30), None).unwrap_err();
        assert!(matches!(err, TimestampError::MissingCoarser { component: "minute", .. }));
    }

    #[test]
    fn test_component_ranges() {
        assert!(Timestamp::from_year(10_000).is_err());
        assert!(Timestamp::from_parts(2020, Some(0), None, None, None, None).is_err());
        assert!(Timestamp::from_parts(2020, Some(13), None, None, None, None).is_err());
        assert!(Timestamp::from_parts(2020, Some(4), Some(31), None, None, None).is_err());
        assert!(Timestamp::from_parts(2020, Some(1), Some(1), Some(24), None, None).is_err());
        assert!(Timestamp::from_parts(2020, Some(1), Some(1), Some(0), Some(60), None).is_err());
        assert!(Timestamp::from_parts(2020, Some(1), Some(1), Some(0), Some(0), Some(60)).is_err());
    }

    #[test]
    fn test_leap_day() {
        assert!(Timestamp::from_parts(2020, Some(2), Some(29), None, None, None).is_ok());
        assert!(Timestamp::from_parts(2000, Some(2), Some(29), None, None, None).is_ok());
        assert!(Timestamp::from_parts(1900, Some(2), Some(29), None, None, None).is_err());
        assert!(Timestamp::from_parts(2021, Some(2), Some(29), None, None, None).is_err());
    }

    #[test]
    fn test_rejects_malformed_text() {
        for bad in [
            "",
            "abcd",
            "2020/",
            "2020//01",
            "2020/05@13",
            "2020/05/01@",
            "2020/05/01/02",
            "12345",
            "2020/005",
            "2020/05/01@1:2:3:4",
        ] {
            assert!(bad.parse::<Timestamp>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_ordering_is_chronological_by_precision() {
        assert!(parse("2019") < parse("2020"));
        assert!(parse("2020") < parse("2020/01"));
        assert!(parse("2020/01/02") < parse("2020/01/10"));
    }

    #[test]
    fn test_serde_uses_text_form() {
        let ts = parse("2021/07/04@09:05");
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2021/07/04@09:05\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
        assert!(serde_json::from_str::<Timestamp>("\"2021/13\"").is_err());
    }
}
