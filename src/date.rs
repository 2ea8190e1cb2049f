use chrono::{Datelike, Local, Month, NaiveDate, Weekday};
use derive_more::Display;
use nom::{
    bytes::complete::take_while_m_n,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res},
    sequence::tuple,
    IResult,
};
use num_traits::FromPrimitive;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result};

/// Canonical `YYYY-MM-DD` key of a calendar day.
///
/// Keys read back from a stored or imported schedule are not validated, so a
/// `DateKey` is only guaranteed to be well-formed when it was built with
/// [`DateKey::new`] or parsed with [`FromStr`].
#[derive(Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(String);

// Evaluated on first access, which the binary forces at startup.
static TODAY: Lazy<DateKey> = Lazy::new(|| DateKey::from(Local::now().date_naive()));

/// Key of the day the process was started on. Never refreshed, so it goes
/// stale when a session runs past midnight.
pub fn today() -> &'static DateKey {
    &TODAY
}

impl DateKey {
    /// `month0` is zero based. The day is not checked against the month.
    pub fn new(year: i32, month0: u32, day: u32) -> Self {
        DateKey(format!("{:04}-{:02}-{:02}", year, month0 + 1, day))
    }

    pub(crate) fn unchecked(raw: String) -> Self {
        DateKey(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the key into `(year, month0, day)`.
    pub fn ymd(&self) -> Result<(i32, u32, u32)> {
        let (_, (year, _, month, _, day)) = all_consuming(parse_ymd)(self.0.as_str()).map_err(|_| {
            Error::new(
                ErrorKind::InputValidation,
                &format!("'{}' is not a date key", self.0),
            )
        })?;

        if month == 0 || month > 12 || day == 0 {
            return Err(Error::new(
                ErrorKind::InputValidation,
                &format!("'{}' is out of range", self.0),
            ));
        }

        Ok((year, month - 1, day))
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        let (year, month0, day) = self.ymd().ok()?;
        NaiveDate::from_ymd_opt(year, month0 + 1, day)
    }
}

fn parse_ymd(input: &str) -> IResult<&str, (i32, char, u32, char, u32)> {
    tuple((
        map_res(digit1, i32::from_str),
        char('-'),
        map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_digit()), u32::from_str),
        char('-'),
        map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_digit()), u32::from_str),
    ))(input)
}

impl FromStr for DateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = DateKey(s.to_owned());
        key.ymd()?;
        Ok(key)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey::new(date.year(), date.month0(), date.day())
    }
}

pub fn month_of(month0: u32) -> Month {
    Month::from_u32(month0 + 1).unwrap_or(Month::January)
}

pub fn days_of_month(month: &Month, year: i32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month.number_from_month(), 1);
    let next = if month.number_from_month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month.number_from_month() + 1, 1)
    };

    match (first, next) {
        (Some(first), Some(next)) => next.signed_duration_since(first).num_days() as u32,
        _ => 0,
    }
}

/// Column of the first day of the month, 0 = Sunday.
pub fn first_weekday(month: &Month, year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, month.number_from_month(), 1)
        .map(|date| date.weekday())
        .unwrap_or(Weekday::Sun)
        .num_days_from_sunday()
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_zero_padded() {
        assert_eq!(DateKey::new(2024, 0, 5).as_str(), "2024-01-05");
        assert_eq!(DateKey::new(1999, 11, 31).as_str(), "1999-12-31");
    }

    #[test]
    fn key_round_trips_for_every_day() {
        for year in [1900, 1999, 2000, 2023, 2024, 2100] {
            for month0 in 0..12 {
                for day in 1..=days_of_month(&month_of(month0), year) {
                    let key = DateKey::new(year, month0, day);
                    assert_eq!(key.ymd().unwrap(), (year, month0, day));
                    assert_eq!(key.as_str().parse::<DateKey>().unwrap(), key);
                }
            }
        }
    }

    #[test]
    fn rejects_malformed_keys() {
        for bad in ["", "2024-1-01", "2024-13-01", "2024-00-10", "2024-02-00", "x-01-01"] {
            assert!(bad.parse::<DateKey>().is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn february_follows_gregorian_rule() {
        assert_eq!(days_of_month(&Month::February, 2000), 29);
        assert_eq!(days_of_month(&Month::February, 1900), 28);
        assert_eq!(days_of_month(&Month::February, 2024), 29);
        assert_eq!(days_of_month(&Month::February, 2023), 28);

        for year in 1890..2110 {
            let expected = if is_leap_year(year) { 29 } else { 28 };
            assert_eq!(days_of_month(&Month::February, year), expected);
        }
    }

    #[test]
    fn first_weekday_is_sunday_based() {
        // 2024-02-01 was a Thursday
        assert_eq!(first_weekday(&Month::February, 2024), 4);
        // 2023-01-01 was a Sunday
        assert_eq!(first_weekday(&Month::January, 2023), 0);
    }

    #[test]
    fn today_is_stable() {
        assert_eq!(today(), today());
        assert!(today().to_naive_date().is_some());
    }
}
