//! Stay date range model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Result, RoutecastError};

/// A stay in one city, from arrival day to departure day (both inclusive).
///
/// `arrival <= departure` always holds; the only way to build one is through
/// [`DateRange::new`], which also guards deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange", into = "RawDateRange")]
pub struct DateRange {
    arrival: NaiveDate,
    departure: NaiveDate,
}

#[derive(Serialize, Deserialize)]
struct RawDateRange {
    arrival: NaiveDate,
    departure: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = RoutecastError;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        DateRange::new(raw.arrival, raw.departure)
    }
}

impl From<DateRange> for RawDateRange {
    fn from(range: DateRange) -> Self {
        Self {
            arrival: range.arrival,
            departure: range.departure,
        }
    }
}

impl DateRange {
    /// Create a date range, rejecting a departure before the arrival
    pub fn new(arrival: NaiveDate, departure: NaiveDate) -> Result<Self> {
        if departure < arrival {
            return Err(RoutecastError::invalid_range(arrival, departure));
        }
        Ok(Self { arrival, departure })
    }

    #[must_use]
    pub fn arrival(&self) -> NaiveDate {
        self.arrival
    }

    #[must_use]
    pub fn departure(&self) -> NaiveDate {
        self.departure
    }

    /// True when this stay ends no later than `other` begins
    #[must_use]
    pub fn is_before(&self, other: &DateRange) -> bool {
        self.departure <= other.arrival
    }

    /// True when neither stay lies entirely before the other
    #[must_use]
    pub fn overlaps(&self, other: &DateRange) -> bool {
        !self.is_before(other) && !other.is_before(self)
    }

    /// Inclusive day membership
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.arrival <= date && date <= self.departure
    }

    /// Number of nights spent; zero for a same-day stop
    #[must_use]
    pub fn nights(&self) -> i64 {
        (self.departure - self.arrival).num_days()
    }

    /// Move the stay forward so it starts no earlier than `earliest`.
    ///
    /// The arrival is clamped to `earliest`; the departure is only touched if
    /// it would otherwise precede the clamped arrival.
    pub(crate) fn clamp_forward(self, earliest: NaiveDate) -> Self {
        if self.arrival >= earliest {
            return self;
        }
        Self {
            arrival: earliest,
            departure: self.departure.max(earliest),
        }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.arrival, self.departure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(a: u32, d: u32) -> DateRange {
        DateRange::new(date(2024, 6, a), date(2024, 6, d)).unwrap()
    }

    #[test]
    fn test_new_rejects_departure_before_arrival() {
        let result = DateRange::new(date(2024, 6, 5), date(2024, 6, 1));
        assert!(matches!(result, Err(RoutecastError::InvalidRange { .. })));
    }

    #[test]
    fn test_same_day_stay_is_valid() {
        let stay = range(3, 3);
        assert_eq!(stay.nights(), 0);
        assert!(stay.contains(date(2024, 6, 3)));
    }

    #[rstest]
    #[case(range(1, 5), range(5, 7), true)]
    #[case(range(1, 5), range(6, 7), true)]
    #[case(range(1, 5), range(3, 7), false)]
    #[case(range(5, 7), range(1, 5), false)]
    fn test_is_before(#[case] first: DateRange, #[case] second: DateRange, #[case] expected: bool) {
        assert_eq!(first.is_before(&second), expected);
    }

    #[rstest]
    #[case(range(1, 5), range(3, 7), true)]
    #[case(range(3, 7), range(1, 5), true)]
    #[case(range(1, 10), range(3, 4), true)]
    #[case(range(1, 5), range(5, 7), false)]
    #[case(range(1, 2), range(6, 7), false)]
    fn test_overlaps(#[case] a: DateRange, #[case] b: DateRange, #[case] expected: bool) {
        assert_eq!(a.overlaps(&b), expected);
        assert_eq!(b.overlaps(&a), expected);
    }

    #[rstest]
    #[case(range(3, 7), 5, range(5, 7))]
    #[case(range(1, 3), 5, range(5, 5))]
    #[case(range(6, 8), 5, range(6, 8))]
    fn test_clamp_forward(#[case] proposed: DateRange, #[case] earliest: u32, #[case] expected: DateRange) {
        assert_eq!(proposed.clamp_forward(date(2024, 6, earliest)), expected);
    }

    #[test]
    fn test_deserialize_rejects_inverted_range() {
        let json = r#"{"arrival":"2024-06-05","departure":"2024-06-01"}"#;
        assert!(serde_json::from_str::<DateRange>(json).is_err());

        let json = r#"{"arrival":"2024-06-01","departure":"2024-06-05"}"#;
        let parsed: DateRange = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, range(1, 5));
    }
}
