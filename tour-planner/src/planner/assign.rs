//! Picking a concrete activity for each chosen destination.

use std::cmp::Reverse;

use crate::domain::{Activity, ActivityId, DestinationId, Money, PreferenceSet};
use crate::random::RandomSource;

use super::config::GeneratorConfig;
use super::scoring::Candidate;

/// What will be done at a destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub destination: DestinationId,
    /// `None` when the destination has no suitable activity and the item
    /// is a plain visit.
    pub activity: Option<Activity>,
    pub cost: Money,
    pub duration_mins: u32,
    pub notes: String,
}

/// Returns true if the activity's kind is one of the preferences.
fn matches_preferences(activity: &Activity, preferences: &PreferenceSet) -> bool {
    preferences.iter().any(|p| activity.kind.matches_token(p))
}

/// The activities a random pick is drawn from.
///
/// Keeps available activities costing at most `allowance`, skipping
/// `exclude`. With preferences, activities whose kind matches come first;
/// the sort is stable. At most `size` activities are returned.
pub fn shortlist<'a>(
    activities: &'a [Activity],
    preferences: &PreferenceSet,
    allowance: Option<Money>,
    exclude: Option<ActivityId>,
    size: usize,
) -> Vec<&'a Activity> {
    let mut eligible: Vec<&Activity> = activities
        .iter()
        .filter(|a| a.available)
        .filter(|a| Some(a.id) != exclude)
        .filter(|a| allowance.is_none_or(|max| a.cost <= max))
        .collect();

    if !preferences.is_empty() {
        eligible.sort_by_key(|a| Reverse(matches_preferences(a, preferences)));
    }
    eligible.truncate(size);
    eligible
}

/// Notes written for an activity item.
pub fn activity_notes(activity: &Activity) -> String {
    format!("Activity: {} ({})", activity.name, activity.cost.annotation())
}

/// Length used for an item, bounded to what a `TimeSpan` can hold.
pub(crate) fn item_minutes(minutes: u32, config: &GeneratorConfig) -> u32 {
    let minutes = if minutes == 0 {
        config.fallback_duration_mins
    } else {
        minutes
    };
    minutes.clamp(1, crate::domain::MINUTES_PER_DAY - 1)
}

/// Choose what to do at a destination.
///
/// An activity is drawn at random from the shortlist, so ties among the
/// top-ranked activities do not always resolve the same way. When no
/// activity qualifies, the item becomes a visit charged at the entry fee
/// and lasting the destination's visit estimate.
pub fn assign_activity<R: RandomSource>(
    candidate: &Candidate,
    preferences: &PreferenceSet,
    allowance: Option<Money>,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Assignment {
    let destination = &candidate.destination;
    let options = shortlist(
        &candidate.activities,
        preferences,
        allowance,
        None,
        config.activity_shortlist,
    );

    match rng.choice(&options) {
        Some(&activity) => Assignment {
            destination: destination.id,
            activity: Some(activity.clone()),
            cost: activity.cost,
            duration_mins: item_minutes(activity.duration_mins, config),
            notes: activity_notes(activity),
        },
        None => Assignment {
            destination: destination.id,
            activity: None,
            cost: destination.entry_fee,
            duration_mins: item_minutes(destination.visit_mins, config),
            notes: format!(
                "Visit: {} (no activity available, entry {})",
                destination.name,
                destination.entry_fee.annotation()
            ),
        },
    }
}
