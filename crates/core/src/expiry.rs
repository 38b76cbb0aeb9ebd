//! Expiry month value object.
//!
//! Pharmaceutical expiry is printed as month/year with no day component, so
//! the domain tracks a year-month pair. Storage renders it as a zero-padded
//! `"YYYY-MM"` string; because the format is zero-padded and year-first,
//! lexicographic order on those strings equals chronological order, and the
//! `Ord` impl here ((year, month) tuple order) reproduces the same order in
//! memory. Alert queries rely on this: "expiring soon" compares with `<=`,
//! "expired" with strict `<`, both at month granularity.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Default alerting horizon for "expiring soon", in days.
pub const DEFAULT_EXPIRY_HORIZON_DAYS: i64 = 30;

/// A year-month expiry value (no day component).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExpiryMonth {
    year: i32,
    month: u32,
}

impl ExpiryMonth {
    /// Build from explicit parts, validating ranges.
    pub fn new(year: i32, month: u32) -> DomainResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation(format!(
                "expiry month out of range: {month}"
            )));
        }
        if !(1000..=9999).contains(&year) {
            return Err(DomainError::validation(format!(
                "expiry year must have four digits: {year}"
            )));
        }
        Ok(Self { year, month })
    }

    /// Truncate an instant to its calendar month.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    /// Month floor of `at + horizon_days`: the inclusive "expiring soon"
    /// threshold.
    pub fn horizon(at: DateTime<Utc>, horizon_days: i64) -> Self {
        Self::from_datetime(at + Duration::days(horizon_days))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for ExpiryMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for ExpiryMonth {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| DomainError::validation(format!("expiry date must be YYYY-MM: {s:?}")))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(DomainError::validation(format!(
                "expiry date must be YYYY-MM: {s:?}"
            )));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| DomainError::validation(format!("expiry year is not a number: {s:?}")))?;
        let month: u32 = month
            .parse()
            .map_err(|_| DomainError::validation(format!("expiry month is not a number: {s:?}")))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for ExpiryMonth {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExpiryMonth> for String {
    fn from(value: ExpiryMonth) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn parses_and_renders_zero_padded() {
        let month: ExpiryMonth = "2026-03".parse().unwrap();
        assert_eq!(month.year(), 2026);
        assert_eq!(month.month(), 3);
        assert_eq!(month.to_string(), "2026-03");
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["202603", "2026-13", "2026-00", "26-03", "2026-3", "abcd-ef"] {
            assert!(input.parse::<ExpiryMonth>().is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn from_datetime_truncates_the_day() {
        let at = Utc.with_ymd_and_hms(2026, 8, 31, 23, 59, 0).unwrap();
        assert_eq!(ExpiryMonth::from_datetime(at), ExpiryMonth::new(2026, 8).unwrap());
    }

    #[test]
    fn horizon_crosses_month_and_year_boundaries() {
        let mid_december = Utc.with_ymd_and_hms(2026, 12, 15, 0, 0, 0).unwrap();
        assert_eq!(
            ExpiryMonth::horizon(mid_december, 30),
            ExpiryMonth::new(2027, 1).unwrap()
        );

        // A short horizon that stays inside the month does not advance it.
        let early_august = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        assert_eq!(
            ExpiryMonth::horizon(early_august, 30),
            ExpiryMonth::new(2026, 8).unwrap()
        );
    }

    #[test]
    fn serde_round_trips_as_string() {
        let month = ExpiryMonth::new(2027, 1).unwrap();
        let json = serde_json::to_string(&month).unwrap();
        assert_eq!(json, "\"2027-01\"");
        let back: ExpiryMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, month);
    }

    proptest! {
        // The SQL layer compares rendered strings; Ord must agree with it.
        #[test]
        fn ord_matches_lexicographic_string_order(
            y1 in 1000i32..=9999, m1 in 1u32..=12,
            y2 in 1000i32..=9999, m2 in 1u32..=12,
        ) {
            let a = ExpiryMonth::new(y1, m1).unwrap();
            let b = ExpiryMonth::new(y2, m2).unwrap();
            prop_assert_eq!(a.cmp(&b), a.to_string().cmp(&b.to_string()));
        }
    }
}
