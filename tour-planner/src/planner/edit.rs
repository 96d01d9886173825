//! Changing an itinerary after it has been generated.
//!
//! Every operation works on a copy and only replaces the caller's
//! itinerary once the whole change has succeeded, so a failed edit leaves
//! the itinerary untouched. Totals are recomputed before returning.

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::{Catalog, CatalogError};
use crate::domain::{
    ActivityId, ClockTime, DestinationId, DomainError, Itinerary, ItineraryItem,
    ItineraryStatus, Money, TimeError, Totals, TravelerProfile,
};
use crate::random::RandomSource;

use super::assign::{Assignment, activity_notes, item_minutes, shortlist};
use super::config::GeneratorConfig;
use super::generator::{GenerateError, GenerateRequest, ItineraryGenerator};
use super::schedule::place;

/// Error from editing an itinerary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    /// Only draft and confirmed itineraries can change
    #[error("itinerary is {0} and can no longer be edited")]
    NotEditable(ItineraryStatus),

    /// The change would push the total past the traveler's budget
    #[error("total {total} would exceed the budget of {budget}")]
    OverBudget { total: Money, budget: Money },

    /// The destination offers no other activity to switch to
    #[error("no alternative activity for item {0}")]
    NoAlternative(u32),

    /// The destination is not in the catalog or not active
    #[error("unknown or inactive destination {0}")]
    UnknownDestination(DestinationId),

    /// The activity is not offered at that destination or not available
    #[error("activity {activity} is not available at destination {destination}")]
    UnknownActivity {
        activity: ActivityId,
        destination: DestinationId,
    },

    /// The new item would fall after the last day of the trip
    #[error("no room left: day {day} is past the itinerary's {days} day(s)")]
    Overflow { day: u32, days: u32 },

    /// Reading the catalog failed
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Regenerating the items failed
    #[error("generation failed: {0}")]
    Generate(#[from] GenerateError),

    /// An item change broke an itinerary invariant
    #[error("itinerary error: {0}")]
    Domain(#[from] DomainError),

    /// An item could not be placed in time
    #[error("scheduling failed: {0}")]
    Schedule(#[from] TimeError),
}

/// Replaces, appends and removes items on existing itineraries.
pub struct ItineraryEditor<'a, C: Catalog> {
    catalog: &'a C,
    config: &'a GeneratorConfig,
}

impl<'a, C: Catalog> ItineraryEditor<'a, C> {
    /// Create an editor.
    pub fn new(catalog: &'a C, config: &'a GeneratorConfig) -> Self {
        Self { catalog, config }
    }

    /// Swap the activity of one item for a different one at the same
    /// destination.
    ///
    /// The replacement is drawn from the same shortlist the generator uses,
    /// limited to what the budget allows. The item keeps its start time;
    /// later items on the same day move to follow it.
    pub fn regenerate_item<R: RandomSource>(
        &self,
        itinerary: &mut Itinerary,
        order: u32,
        profile: &TravelerProfile,
        rng: &mut R,
    ) -> Result<(), EditError> {
        ensure_editable(itinerary)?;
        let item = itinerary
            .item(order)
            .cloned()
            .ok_or(DomainError::UnknownItem(order))?;

        let fees = self.entry_fees(itinerary)?;
        let fee = fees.get(&item.destination).copied().unwrap_or(Money::ZERO);
        let current_total = self.totals_of(itinerary, &fees).cost;
        let others = current_total.saturating_sub(item.resolved_cost(fee));
        let allowance = profile.budget.map(|b| b.saturating_sub(others));

        let activities = self.catalog.activities(item.destination, true)?;
        let options = shortlist(
            &activities,
            &profile.preferences,
            allowance,
            item.activity,
            self.config.activity_shortlist,
        );
        let Some(&activity) = rng.choice(&options) else {
            let any = shortlist(&activities, &profile.preferences, None, item.activity, 1);
            return Err(match (any.first(), profile.budget) {
                (Some(cheapest), Some(budget)) => EditError::OverBudget {
                    total: others + cheapest.cost,
                    budget,
                },
                _ => EditError::NoAlternative(order),
            });
        };

        let assignment = Assignment {
            destination: item.destination,
            activity: Some(activity.clone()),
            cost: activity.cost,
            duration_mins: item_minutes(activity.duration_mins, self.config),
            notes: activity_notes(activity),
        };
        let (replacement, mut cursor, _) =
            place(&assignment, item.order, item.day, item.span.start(), self.config)?;

        let mut draft = itinerary.clone();
        draft.replace_item(replacement)?;

        let followers: Vec<ItineraryItem> = draft
            .items()
            .iter()
            .filter(|i| i.day == item.day && i.order > item.order)
            .cloned()
            .collect();
        for mut follower in followers {
            follower.span = follower.span.moved_to(cursor);
            (cursor, _) = cursor.plus_minutes(follower.duration_mins() + self.config.buffer_mins);
            draft.replace_item(follower)?;
        }

        self.finish(itinerary, draft, &fees, profile.budget)?;
        debug!(order, activity = %activity.id, "item regenerated");
        Ok(())
    }

    /// Replace every item with a freshly generated plan.
    ///
    /// Keeps the itinerary's id, status, name and dates; the request's own
    /// dates are ignored.
    pub fn regenerate_all<R: RandomSource>(
        &self,
        itinerary: &mut Itinerary,
        request: &GenerateRequest,
        rng: &mut R,
    ) -> Result<(), EditError> {
        ensure_editable(itinerary)?;

        let request = GenerateRequest {
            dates: itinerary.dates,
            ..request.clone()
        };
        let plan = ItineraryGenerator::new(self.catalog, self.config).plan(&request, rng)?;

        let mut draft = itinerary.clone();
        draft.clear_items();
        for item in plan.items {
            draft.push_item(item)?;
        }
        draft.description = plan.description;
        draft.recompute_totals(|id| plan.entry_fees.get(&id).copied());

        debug!(items = draft.len(), "itinerary regenerated");
        *itinerary = draft;
        Ok(())
    }

    /// Add a destination after the last item of the trip.
    ///
    /// With an activity, the item takes that activity's cost and length;
    /// without one it is a plain visit at the entry fee. The item starts a
    /// buffer after the latest item on the latest used day, or rolls to the
    /// next morning if it would end after the configured end of day.
    /// Returns the new item's order.
    pub fn append(
        &self,
        itinerary: &mut Itinerary,
        destination: DestinationId,
        activity: Option<ActivityId>,
        budget: Option<Money>,
    ) -> Result<u32, EditError> {
        ensure_editable(itinerary)?;

        let place_at = self
            .catalog
            .destination(destination)?
            .filter(|d| d.active)
            .ok_or(EditError::UnknownDestination(destination))?;

        let assignment = match activity {
            Some(activity_id) => {
                let activity = self
                    .catalog
                    .activities(destination, true)?
                    .into_iter()
                    .find(|a| a.id == activity_id)
                    .ok_or(EditError::UnknownActivity {
                        activity: activity_id,
                        destination,
                    })?;
                Assignment {
                    destination,
                    cost: activity.cost,
                    duration_mins: item_minutes(activity.duration_mins, self.config),
                    notes: activity_notes(&activity),
                    activity: Some(activity),
                }
            }
            None => Assignment {
                destination,
                activity: None,
                cost: place_at.entry_fee,
                duration_mins: item_minutes(place_at.visit_mins, self.config),
                notes: format!("Visit: {} ({})", place_at.name, place_at.entry_fee.annotation()),
            },
        };

        let (day, start) = self.next_slot(itinerary, assignment.duration_mins);
        let days = itinerary.day_count();
        if day > days {
            return Err(EditError::Overflow { day, days });
        }

        let order = itinerary.next_order();
        let (item, _, _) = place(&assignment, order, day, start, self.config)?;

        let mut fees = self.entry_fees(itinerary)?;
        fees.insert(destination, place_at.entry_fee);

        let mut draft = itinerary.clone();
        draft.push_item(item)?;
        self.finish(itinerary, draft, &fees, budget)?;

        debug!(order, day, start = %start, destination = %destination, "item appended");
        Ok(order)
    }

    /// Remove one item and renumber the rest.
    pub fn remove_item(
        &self,
        itinerary: &mut Itinerary,
        order: u32,
    ) -> Result<ItineraryItem, EditError> {
        ensure_editable(itinerary)?;
        let fees = self.entry_fees(itinerary)?;

        let mut draft = itinerary.clone();
        let removed = draft.remove_item(order)?;
        self.finish(itinerary, draft, &fees, None)?;
        Ok(removed)
    }

    /// Where an appended item of `minutes` length would go.
    fn next_slot(&self, itinerary: &Itinerary, minutes: u32) -> (u32, ClockTime) {
        let day_start = self.config.day_start;
        let Some(last) = itinerary
            .items()
            .iter()
            .max_by_key(|i| (i.day, i.order))
        else {
            return (1, day_start);
        };

        // A span that wraps ends on the following day.
        let end_day = last.day + u32::from(last.span.crosses_midnight());
        let (start, crossed) = last.span.end().plus_minutes(self.config.buffer_mins);
        let day = end_day + crossed;

        let start_min = start.minutes_from_midnight();
        if start_min < day_start.minutes_from_midnight() {
            return (day, day_start);
        }
        if start_min + minutes > self.config.day_end.minutes_from_midnight() {
            return (day + 1, day_start);
        }
        (day, start)
    }

    /// Entry fees of every destination on the itinerary.
    fn entry_fees(
        &self,
        itinerary: &Itinerary,
    ) -> Result<BTreeMap<DestinationId, Money>, CatalogError> {
        let mut fees = BTreeMap::new();
        for id in itinerary.distinct_destinations() {
            if let Some(destination) = self.catalog.destination(id)? {
                fees.insert(id, destination.entry_fee);
            }
        }
        Ok(fees)
    }

    fn totals_of(&self, itinerary: &Itinerary, fees: &BTreeMap<DestinationId, Money>) -> Totals {
        let mut copy = itinerary.clone();
        copy.recompute_totals(|id| fees.get(&id).copied())
    }

    /// Recompute the draft's totals, check the budget and commit.
    fn finish(
        &self,
        itinerary: &mut Itinerary,
        mut draft: Itinerary,
        fees: &BTreeMap<DestinationId, Money>,
        budget: Option<Money>,
    ) -> Result<(), EditError> {
        let totals = draft.recompute_totals(|id| fees.get(&id).copied());
        if let Some(budget) = budget
            && totals.cost > budget
        {
            return Err(EditError::OverBudget {
                total: totals.cost,
                budget,
            });
        }
        *itinerary = draft;
        Ok(())
    }
}

fn ensure_editable(itinerary: &Itinerary) -> Result<(), EditError> {
    if itinerary.status.is_editable() {
        Ok(())
    } else {
        Err(EditError::NotEditable(itinerary.status))
    }
}
