//! Domain error types.
//!
//! These errors represent validation failures when constructing or
//! mutating domain values. They are distinct from catalog/IO errors.

use chrono::NaiveDate;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Rating outside 0.0..=5.0
    #[error("rating must be between 0 and 5, got {0}")]
    InvalidRating(f64),

    /// Route distance negative or not finite
    #[error("distance must be a non-negative number, got {0}")]
    InvalidDistance(f64),

    /// Itinerary end date before its start date
    #[error("date range ends ({end}) before it starts ({start})")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Unrecognised activity kind code
    #[error("unknown activity kind: {0}")]
    UnknownActivityKind(String),

    /// Unrecognised transport mode code
    #[error("unknown transport mode: {0}")]
    UnknownTransportMode(String),

    /// Unrecognised itinerary status code
    #[error("unknown itinerary status: {0}")]
    UnknownStatus(String),

    /// Item sequence numbers are 1-based
    #[error("item order must be at least 1")]
    ZeroOrder,

    /// Another item already uses this sequence number
    #[error("item order {0} is already taken")]
    DuplicateOrder(u32),

    /// Item day outside the itinerary's date range
    #[error("day {day} is outside the itinerary's {days} day(s)")]
    DayOutOfRange { day: u32, days: u32 },

    /// No item with this sequence number
    #[error("no item with order {0}")]
    UnknownItem(u32),
}
