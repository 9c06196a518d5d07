//! Calendar [`Date`] definitions.

use std::{fmt, str::FromStr};

#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use time::{format_description::BorrowedFormatItem, macros::format_description};

/// Textual representation of a [`Date`].
const FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Calendar date without a time zone, in the proleptic Gregorian calendar.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Date(time::Date);

impl Date {
    /// Creates a new [`Date`] from its calendar components.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_calendar(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = time::Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day)
            .ok()
            .map(Self)
    }

    /// Returns the year of this [`Date`].
    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Returns the month of this [`Date`], `1` being January.
    #[must_use]
    pub fn month(self) -> u8 {
        self.0.month().into()
    }

    /// Returns the day of month of this [`Date`], starting from `1`.
    #[must_use]
    pub fn day(self) -> u8 {
        self.0.day()
    }

    /// Adds the provided number of calendar `months` to this [`Date`].
    ///
    /// The day of month is kept if the target month has it, otherwise it is
    /// clamped to the last day of the target month (`2024-01-31` plus one
    /// month is `2024-02-29`).
    ///
    /// [`None`] is returned if the result is out of the supported range.
    #[must_use]
    pub fn checked_add_months(self, months: u32) -> Option<Self> {
        let months_since_zero = i64::from(self.year()) * 12
            + i64::from(self.month())
            - 1
            + i64::from(months);
        let year = i32::try_from(months_since_zero.div_euclid(12)).ok()?;
        let month = u8::try_from(months_since_zero.rem_euclid(12) + 1).ok()?;
        let month = time::Month::try_from(month).ok()?;
        let day = self.day().min(time::util::days_in_year_month(year, month));
        time::Date::from_calendar_date(year, month, day)
            .ok()
            .map(Self)
    }
}

impl From<time::Date> for Date {
    fn from(date: time::Date) -> Self {
        Self(date)
    }
}

impl From<Date> for time::Date {
    fn from(date: Date) -> Self {
        date.0
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0.format(FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl FromStr for Date {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        time::Date::parse(s, FORMAT).map(Self)
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in `YYYY-MM-DD` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = super::Date;

    impl Date {
        fn to_output<S: ScalarValue>(d: &Date) -> Value<S> {
            Value::scalar(d.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use super::Date;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_formats() {
        assert_eq!(date("2024-03-15"), Date::from_calendar(2024, 3, 15).unwrap());
        assert_eq!(date("2024-03-05").to_string(), "2024-03-05");

        assert!("2024-3-5".parse::<Date>().is_err());
        assert!("2024-02-30".parse::<Date>().is_err());
        assert!("15.03.2024".parse::<Date>().is_err());
    }

    #[test]
    fn adds_months_within_year() {
        assert_eq!(
            date("2024-01-15").checked_add_months(6),
            Some(date("2024-07-15")),
        );
        assert_eq!(
            date("2024-01-15").checked_add_months(0),
            Some(date("2024-01-15")),
        );
    }

    #[test]
    fn adds_months_across_years() {
        assert_eq!(
            date("2024-11-10").checked_add_months(3),
            Some(date("2025-02-10")),
        );
        assert_eq!(
            date("2024-05-01").checked_add_months(24),
            Some(date("2026-05-01")),
        );
    }

    #[test]
    fn clamps_to_month_end() {
        assert_eq!(
            date("2024-01-31").checked_add_months(1),
            Some(date("2024-02-29")),
        );
        assert_eq!(
            date("2023-01-31").checked_add_months(1),
            Some(date("2023-02-28")),
        );
        assert_eq!(
            date("2024-08-31").checked_add_months(1),
            Some(date("2024-09-30")),
        );
        assert_eq!(
            date("2024-02-29").checked_add_months(12),
            Some(date("2025-02-28")),
        );
    }

    #[test]
    fn orders_chronologically() {
        assert!(date("2024-01-31") < date("2024-02-01"));
        assert!(date("2023-12-31") < date("2024-01-01"));
    }
}
