//! Configuration for itinerary generation.

use crate::domain::{ClockTime, Money};

/// Configuration parameters for itinerary generation and editing.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Maximum number of destinations picked by the simple and budget
    /// strategies.
    pub max_destinations: usize,

    /// Unit cost assumed for a destination with no activity and no entry fee.
    pub default_unit_cost: Money,

    /// When the first item of each day starts.
    pub day_start: ClockTime,

    /// Latest end time for an appended item before it rolls to the next day.
    pub day_end: ClockTime,

    /// Gap between consecutive items (minutes).
    pub buffer_mins: u32,

    /// Item length when a destination has no activity and no visit estimate
    /// (minutes).
    pub fallback_duration_mins: u32,

    /// How many top-ranked activities are considered before picking at random.
    pub activity_shortlist: usize,

    /// Hours of sightseeing per day, for the optimized strategy's time budget.
    pub productive_hours_per_day: u32,

    /// Assumed activity length for the optimized strategy's time estimate
    /// (minutes).
    pub average_activity_mins: u32,
}

impl GeneratorConfig {
    /// Create a new configuration with the given parameters.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        max_destinations: usize,
        default_unit_cost: Money,
        day_start: ClockTime,
        day_end: ClockTime,
        buffer_mins: u32,
        fallback_duration_mins: u32,
        activity_shortlist: usize,
        productive_hours_per_day: u32,
        average_activity_mins: u32,
    ) -> Self {
        Self {
            max_destinations,
            default_unit_cost,
            day_start,
            day_end,
            buffer_mins,
            fallback_duration_mins,
            activity_shortlist,
            productive_hours_per_day,
            average_activity_mins,
        }
    }

    /// Time budget for a trip of `days` days, in minutes.
    pub fn time_budget_mins(&self, days: u32) -> u64 {
        u64::from(days) * u64::from(self.productive_hours_per_day) * 60
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_destinations: 3,
            default_unit_cost: Money::from_units(20),
            day_start: ClockTime::from_minutes(9 * 60),
            day_end: ClockTime::from_minutes(21 * 60),
            buffer_mins: 30,
            fallback_duration_mins: 90,
            activity_shortlist: 3,
            productive_hours_per_day: 8,
            average_activity_mins: 90,
        }
    }
}
