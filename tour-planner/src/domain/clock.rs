//! Time-of-day handling for itinerary items.
//!
//! Items carry a start and end time without a date. Activities that run
//! late can end after midnight, so a span whose end appears to be before
//! its start is read as crossing into the next day rather than as invalid.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Error returned for invalid times or spans.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A wall-clock time with minute precision.
///
/// # Examples
///
/// ```
/// use tour_planner::domain::ClockTime;
///
/// let start = ClockTime::parse_hhmm("22:00").unwrap();
/// let end = ClockTime::parse_hhmm("01:00").unwrap();
///
/// // Crossing midnight counts forward, never backwards.
/// assert_eq!(start.minutes_until(end), 180);
///
/// let (later, days) = start.plus_minutes(150);
/// assert_eq!(later.to_string(), "00:30");
/// assert_eq!(days, 1);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Create a time from hour (0-23) and minute (0-59).
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| TimeError::new("invalid time"))
    }

    /// Parse a time in "HH:MM" format.
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();
        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;

        Self::from_hm(hour, minute)
    }

    /// Create a time from minutes after midnight, wrapping at 24 hours.
    pub fn from_minutes(minutes: u32) -> Self {
        let m = minutes % MINUTES_PER_DAY;
        // Always in range after the modulo.
        Self(NaiveTime::from_hms_opt(m / 60, m % 60, 0).unwrap_or(NaiveTime::MIN))
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_from_midnight(&self) -> u32 {
        self.hour() * 60 + self.minute()
    }

    /// Add minutes, returning the new time and how many midnights were crossed.
    pub fn plus_minutes(&self, minutes: u32) -> (ClockTime, u32) {
        let total = self.minutes_from_midnight() + minutes;
        (
            ClockTime::from_minutes(total),
            total / MINUTES_PER_DAY,
        )
    }

    /// Minutes from `self` forward to `end`.
    ///
    /// An `end` earlier than `self` is taken to be on the following day.
    pub fn minutes_until(&self, end: ClockTime) -> u32 {
        let start = self.minutes_from_midnight();
        let end = end.minutes_from_midnight();
        if end >= start {
            end - start
        } else {
            end + MINUTES_PER_DAY - start
        }
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({self})")
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ClockTime::parse_hhmm(&s).map_err(serde::de::Error::custom)
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

/// The time an itinerary item occupies.
///
/// # Invariants
///
/// - `start != end`: a span is never empty. A span that looks backwards
///   wraps past midnight, so every non-empty span is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSpan")]
pub struct TimeSpan {
    start: ClockTime,
    end: ClockTime,
}

#[derive(Deserialize)]
struct RawSpan {
    start: ClockTime,
    end: ClockTime,
}

impl TryFrom<RawSpan> for TimeSpan {
    type Error = TimeError;

    fn try_from(raw: RawSpan) -> Result<Self, Self::Error> {
        TimeSpan::new(raw.start, raw.end)
    }
}

impl TimeSpan {
    /// Create a span between two times.
    pub fn new(start: ClockTime, end: ClockTime) -> Result<Self, TimeError> {
        if start == end {
            return Err(TimeError::new("end must differ from start"));
        }
        Ok(Self { start, end })
    }

    /// Create a span of `minutes` beginning at `start`.
    ///
    /// The length must be between 1 minute and just under a full day.
    pub fn starting_at(start: ClockTime, minutes: u32) -> Result<Self, TimeError> {
        if minutes == 0 || minutes >= MINUTES_PER_DAY {
            return Err(TimeError::new("span length must be 1 to 1439 minutes"));
        }
        let (end, _) = start.plus_minutes(minutes);
        Self::new(start, end)
    }

    /// Returns the start time.
    pub fn start(&self) -> ClockTime {
        self.start
    }

    /// Returns the end time.
    pub fn end(&self) -> ClockTime {
        self.end
    }

    /// Length of the span in minutes, wrapping past midnight.
    pub fn duration_mins(&self) -> u32 {
        self.start.minutes_until(self.end)
    }

    /// Returns true if the span ends on the day after it starts.
    pub fn crosses_midnight(&self) -> bool {
        self.end < self.start
    }

    /// The same length of span, moved to begin at `start`.
    pub fn moved_to(&self, start: ClockTime) -> Self {
        let (end, _) = start.plus_minutes(self.duration_mins());
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    #[test]
    fn parse_valid_times() {
        assert_eq!(t("00:00").minutes_from_midnight(), 0);
        assert_eq!(t("23:59").minutes_from_midnight(), 23 * 60 + 59);
        assert_eq!(t("09:30").hour(), 9);
        assert_eq!(t("09:30").minute(), 30);
    }

    #[test]
    fn parse_invalid_times() {
        assert!(ClockTime::parse_hhmm("930").is_err());
        assert!(ClockTime::parse_hhmm("09-30").is_err());
        assert!(ClockTime::parse_hhmm("24:00").is_err());
        assert!(ClockTime::parse_hhmm("12:60").is_err());
        assert!(ClockTime::parse_hhmm("ab:cd").is_err());
        assert!(ClockTime::from_hm(25, 0).is_err());
    }

    #[test]
    fn display_format() {
        assert_eq!(t("07:05").to_string(), "07:05");
        assert_eq!(ClockTime::from_minutes(MINUTES_PER_DAY + 61).to_string(), "01:01");
    }

    #[test]
    fn plus_minutes_same_day() {
        let (end, days) = t("09:00").plus_minutes(90);
        assert_eq!(end, t("10:30"));
        assert_eq!(days, 0);
    }

    #[test]
    fn plus_minutes_crosses_midnight() {
        let (end, days) = t("23:30").plus_minutes(60);
        assert_eq!(end, t("00:30"));
        assert_eq!(days, 1);
    }

    #[test]
    fn wrapped_span_is_three_hours() {
        let span = TimeSpan::new(t("22:00"), t("01:00")).unwrap();
        assert_eq!(span.duration_mins(), 180);
        assert!(span.crosses_midnight());
    }

    #[test]
    fn forward_span() {
        let span = TimeSpan::new(t("09:00"), t("10:30")).unwrap();
        assert_eq!(span.duration_mins(), 90);
        assert!(!span.crosses_midnight());
    }

    #[test]
    fn empty_span_rejected() {
        assert!(TimeSpan::new(t("09:00"), t("09:00")).is_err());
        assert!(TimeSpan::starting_at(t("09:00"), 0).is_err());
        assert!(TimeSpan::starting_at(t("09:00"), MINUTES_PER_DAY).is_err());
    }

    #[test]
    fn moved_span_keeps_length() {
        let span = TimeSpan::starting_at(t("09:00"), 120).unwrap();
        let moved = span.moved_to(t("23:00"));
        assert_eq!(moved.start(), t("23:00"));
        assert_eq!(moved.end(), t("01:00"));
        assert_eq!(moved.duration_mins(), 120);
    }

    #[test]
    fn span_serde_validates() {
        let span: TimeSpan = serde_json::from_str(r#"{"start":"22:00","end":"01:00"}"#).unwrap();
        assert_eq!(span.duration_mins(), 180);

        assert!(serde_json::from_str::<TimeSpan>(r#"{"start":"10:00","end":"10:00"}"#).is_err());
        assert!(serde_json::from_str::<TimeSpan>(r#"{"start":"10:00","end":"1000"}"#).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn clock()(minutes in 0u32..MINUTES_PER_DAY) -> ClockTime {
            ClockTime::from_minutes(minutes)
        }
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(time in clock()) {
            prop_assert_eq!(ClockTime::parse_hhmm(&time.to_string()).unwrap(), time);
        }

        /// Any non-empty span has a length strictly inside one day.
        #[test]
        fn span_length_in_range(start in clock(), end in clock()) {
            prop_assume!(start != end);
            let span = TimeSpan::new(start, end).unwrap();
            prop_assert!(span.duration_mins() > 0);
            prop_assert!(span.duration_mins() < MINUTES_PER_DAY);
        }

        #[test]
        fn starting_at_roundtrips_length(start in clock(), minutes in 1u32..MINUTES_PER_DAY) {
            let span = TimeSpan::starting_at(start, minutes).unwrap();
            prop_assert_eq!(span.duration_mins(), minutes);
        }

        /// Going forward then measuring the distance back gives the same minutes.
        #[test]
        fn plus_then_until(start in clock(), minutes in 0u32..MINUTES_PER_DAY) {
            let (end, _) = start.plus_minutes(minutes);
            prop_assert_eq!(start.minutes_until(end), minutes);
        }
    }
}
