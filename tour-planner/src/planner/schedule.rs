//! Laying assignments out in time.
//!
//! Two policies exist and a generator strategy uses exactly one of them:
//! sequential (everything on one day, back to back) and round robin
//! (assignment `i` on day `i mod days + 1`, each day back to back).

use crate::domain::{ClockTime, ItineraryItem, TimeError, TimeSpan};

use super::assign::Assignment;
use super::config::GeneratorConfig;

/// Build the item for an assignment starting at `start`.
///
/// Returns the item, the start time for whatever follows it (end plus the
/// buffer) and how many midnights lie between `start` and that next start.
pub(crate) fn place(
    assignment: &Assignment,
    order: u32,
    day: u32,
    start: ClockTime,
    config: &GeneratorConfig,
) -> Result<(ItineraryItem, ClockTime, u32), TimeError> {
    let span = TimeSpan::starting_at(start, assignment.duration_mins)?;
    let (next, days_crossed) = start.plus_minutes(assignment.duration_mins + config.buffer_mins);

    let mut item = ItineraryItem::new(order, day, assignment.destination, span)
        .with_notes(assignment.notes.clone())
        .with_cost(assignment.cost);
    if let Some(activity) = &assignment.activity {
        item = item.with_activity(activity.id);
    }

    Ok((item, next, days_crossed))
}

/// Lay assignments out back to back from the start of day 1.
///
/// A run that passes midnight continues on the next day. Items that would
/// land after day `days` stay on the last day, so on that day a start time
/// can be earlier than the one before it. Start times themselves always
/// follow the previous end plus the buffer.
pub fn schedule_sequential(
    assignments: &[Assignment],
    days: u32,
    config: &GeneratorConfig,
) -> Result<Vec<ItineraryItem>, TimeError> {
    let last_day = days.max(1);
    let mut items = Vec::with_capacity(assignments.len());
    let mut day = 1;
    let mut start = config.day_start;

    for (i, assignment) in assignments.iter().enumerate() {
        let (item, next, crossed) = place(assignment, i as u32 + 1, day, start, config)?;
        items.push(item);
        start = next;
        day = (day + crossed).min(last_day);
    }

    Ok(items)
}

/// Spread assignments over `days` days in round-robin order.
///
/// Orders follow the input, so consecutive orders land on different days.
pub fn schedule_round_robin(
    assignments: &[Assignment],
    days: u32,
    config: &GeneratorConfig,
) -> Result<Vec<ItineraryItem>, TimeError> {
    let days = days.max(1);
    let mut cursors = vec![config.day_start; days as usize];
    let mut items = Vec::with_capacity(assignments.len());

    for (i, assignment) in assignments.iter().enumerate() {
        let slot = i % days as usize;
        let (item, next, _) = place(assignment, i as u32 + 1, slot as u32 + 1, cursors[slot], config)?;
        items.push(item);
        cursors[slot] = next;
    }

    Ok(items)
}
