//! The itinerary aggregate.
//!
//! An `Itinerary` is the planner's output: an ordered list of items spread
//! over the days of a trip, plus aggregates derived from those items.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{ActivityId, DestinationId, DomainError, ItineraryId, Money, TimeSpan, TravelerId};

/// Flat distance charged between consecutive distinct destinations.
///
/// This is a heuristic, not a routed distance.
pub const HOP_DISTANCE_KM: f64 = 5.0;

/// Lifecycle state of an itinerary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItineraryStatus {
    #[default]
    #[serde(alias = "borrador")]
    Draft,
    #[serde(alias = "confirmado")]
    Confirmed,
    #[serde(alias = "en_proceso")]
    InProgress,
    #[serde(alias = "completado")]
    Completed,
    #[serde(alias = "cancelado")]
    Cancelled,
}

impl ItineraryStatus {
    /// The canonical code for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItineraryStatus::Draft => "draft",
            ItineraryStatus::Confirmed => "confirmed",
            ItineraryStatus::InProgress => "in_progress",
            ItineraryStatus::Completed => "completed",
            ItineraryStatus::Cancelled => "cancelled",
        }
    }

    /// Only draft and confirmed itineraries may have items added or changed.
    pub fn is_editable(&self) -> bool {
        matches!(self, ItineraryStatus::Draft | ItineraryStatus::Confirmed)
    }
}

impl FromStr for ItineraryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" | "borrador" => Ok(ItineraryStatus::Draft),
            "confirmed" | "confirmado" => Ok(ItineraryStatus::Confirmed),
            "in_progress" | "en_proceso" => Ok(ItineraryStatus::InProgress),
            "completed" | "completado" => Ok(ItineraryStatus::Completed),
            "cancelled" | "cancelado" => Ok(ItineraryStatus::Cancelled),
            _ => Err(DomainError::UnknownStatus(s.to_string())),
        }
    }
}

impl fmt::Display for ItineraryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = DomainError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Create a range. The end may equal the start (a one-day trip).
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First day of the range.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the range.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days, counting both ends.
    pub fn day_count(&self) -> u32 {
        let days = (self.end - self.start).num_days() + 1;
        u32::try_from(days).unwrap_or(u32::MAX)
    }

    /// Calendar date of a 1-based day number, if inside the range.
    pub fn date_of(&self, day: u32) -> Option<NaiveDate> {
        if day == 0 || day > self.day_count() {
            return None;
        }
        self.start.checked_add_days(Days::new(u64::from(day - 1)))
    }
}

/// One stop in an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryItem {
    /// 1-based position in the itinerary, unique within it.
    pub order: u32,
    /// 1-based day of the trip.
    pub day: u32,
    pub destination: DestinationId,
    #[serde(default)]
    pub activity: Option<ActivityId>,
    pub span: TimeSpan,
    #[serde(default)]
    pub notes: String,
    /// Cost recorded when the item was planned.
    #[serde(default)]
    pub cost: Option<Money>,
}

impl ItineraryItem {
    /// Create an item with no activity, notes or recorded cost.
    pub fn new(order: u32, day: u32, destination: DestinationId, span: TimeSpan) -> Self {
        Self {
            order,
            day,
            destination,
            activity: None,
            span,
            notes: String::new(),
            cost: None,
        }
    }

    /// Attach the chosen activity.
    pub fn with_activity(mut self, activity: ActivityId) -> Self {
        self.activity = Some(activity);
        self
    }

    /// Set the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Record the item's cost.
    pub fn with_cost(mut self, cost: Money) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Length of the item in minutes (wrapping past midnight).
    pub fn duration_mins(&self) -> u32 {
        self.span.duration_mins()
    }

    /// What this item costs.
    ///
    /// Uses the recorded cost if there is one, then an `S/` amount found in
    /// the notes (items written before costs were recorded), and finally the
    /// destination's entry fee.
    pub fn resolved_cost(&self, entry_fee: Money) -> Money {
        self.cost
            .or_else(|| Money::find_annotation(&self.notes))
            .unwrap_or(entry_fee)
    }
}

/// Aggregates derived from an itinerary's items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub cost: Money,
    pub minutes: u32,
    pub distance_km: f64,
}

/// A traveler's plan.
///
/// # Invariants
///
/// - Item orders are unique, at least 1, and items are kept sorted by order.
/// - Item days fall within the date range.
/// - `totals()` reflects the items as of the last `recompute_totals` call;
///   every planner operation recomputes before handing the itinerary back.
///
/// Deserializing checks the item invariants again. Stored totals are kept
/// as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawItinerary")]
pub struct Itinerary {
    pub id: Option<ItineraryId>,
    pub traveler: TravelerId,
    pub name: String,
    pub description: String,
    pub dates: DateRange,
    pub status: ItineraryStatus,
    totals: Totals,
    items: Vec<ItineraryItem>,
}

#[derive(Deserialize)]
struct RawItinerary {
    #[serde(default)]
    id: Option<ItineraryId>,
    traveler: TravelerId,
    name: String,
    #[serde(default)]
    description: String,
    dates: DateRange,
    #[serde(default)]
    status: ItineraryStatus,
    #[serde(default)]
    totals: Totals,
    #[serde(default)]
    items: Vec<ItineraryItem>,
}

impl TryFrom<RawItinerary> for Itinerary {
    type Error = DomainError;

    fn try_from(raw: RawItinerary) -> Result<Self, Self::Error> {
        let mut itinerary = Itinerary::new(raw.traveler, raw.name, raw.dates)
            .with_description(raw.description);
        itinerary.id = raw.id;
        itinerary.status = raw.status;
        for item in raw.items {
            itinerary.push_item(item)?;
        }
        itinerary.totals = raw.totals;
        Ok(itinerary)
    }
}

impl Itinerary {
    /// Create an empty draft itinerary.
    pub fn new(traveler: TravelerId, name: impl Into<String>, dates: DateRange) -> Self {
        Self {
            id: None,
            traveler,
            name: name.into(),
            description: String::new(),
            dates,
            status: ItineraryStatus::Draft,
            totals: Totals::default(),
            items: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Items in order.
    pub fn items(&self) -> &[ItineraryItem] {
        &self.items
    }

    /// Look up an item by its order.
    pub fn item(&self, order: u32) -> Option<&ItineraryItem> {
        self.position(order).map(|idx| &self.items[idx])
    }

    /// The item with the highest order.
    pub fn last_item(&self) -> Option<&ItineraryItem> {
        self.items.last()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Derived aggregates as of the last recompute.
    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Number of days in the trip.
    pub fn day_count(&self) -> u32 {
        self.dates.day_count()
    }

    /// The order a newly appended item should take.
    pub fn next_order(&self) -> u32 {
        self.items.last().map_or(1, |item| item.order + 1)
    }

    /// Distinct destinations visited.
    pub fn distinct_destinations(&self) -> BTreeSet<DestinationId> {
        self.items.iter().map(|item| item.destination).collect()
    }

    /// Add an item.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the order is zero or already taken, or the day is
    /// outside the date range.
    pub fn push_item(&mut self, item: ItineraryItem) -> Result<(), DomainError> {
        self.check_day(item.day)?;
        if item.order == 0 {
            return Err(DomainError::ZeroOrder);
        }
        match self.items.binary_search_by_key(&item.order, |i| i.order) {
            Ok(_) => Err(DomainError::DuplicateOrder(item.order)),
            Err(idx) => {
                self.items.insert(idx, item);
                Ok(())
            }
        }
    }

    /// Replace the item with the same order, returning the old one.
    pub fn replace_item(&mut self, item: ItineraryItem) -> Result<ItineraryItem, DomainError> {
        self.check_day(item.day)?;
        let idx = self
            .position(item.order)
            .ok_or(DomainError::UnknownItem(item.order))?;
        Ok(std::mem::replace(&mut self.items[idx], item))
    }

    /// Remove an item and renumber the rest contiguously from 1.
    pub fn remove_item(&mut self, order: u32) -> Result<ItineraryItem, DomainError> {
        let idx = self.position(order).ok_or(DomainError::UnknownItem(order))?;
        let removed = self.items.remove(idx);
        for (i, item) in self.items.iter_mut().enumerate() {
            item.order = i as u32 + 1;
        }
        Ok(removed)
    }

    /// Remove every item.
    pub fn clear_items(&mut self) {
        self.items.clear();
    }

    /// Recompute the derived aggregates from the items.
    ///
    /// `entry_fee` supplies each destination's entry fee, used for items
    /// that carry no cost of their own. Unknown destinations count as free.
    /// Idempotent: with no change to the items, repeated calls give the same
    /// totals.
    pub fn recompute_totals<F>(&mut self, entry_fee: F) -> Totals
    where
        F: Fn(DestinationId) -> Option<Money>,
    {
        let cost = self
            .items
            .iter()
            .map(|item| item.resolved_cost(entry_fee(item.destination).unwrap_or(Money::ZERO)))
            .sum();

        let minutes = self.items.iter().map(ItineraryItem::duration_mins).sum();

        let distinct = self.distinct_destinations().len();
        let distance_km = if distinct >= 2 {
            (distinct - 1) as f64 * HOP_DISTANCE_KM
        } else {
            0.0
        };

        self.totals = Totals {
            cost,
            minutes,
            distance_km,
        };
        self.totals
    }

    fn position(&self, order: u32) -> Option<usize> {
        self.items.binary_search_by_key(&order, |i| i.order).ok()
    }

    fn check_day(&self, day: u32) -> Result<(), DomainError> {
        let days = self.day_count();
        if day == 0 || day > days {
            return Err(DomainError::DayOutOfRange { day, days });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClockTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn span(start: &str, end: &str) -> TimeSpan {
        TimeSpan::new(
            ClockTime::parse_hhmm(start).unwrap(),
            ClockTime::parse_hhmm(end).unwrap(),
        )
        .unwrap()
    }

    fn three_days() -> Itinerary {
        let dates = DateRange::new(date(2025, 3, 10), date(2025, 3, 12)).unwrap();
        Itinerary::new(TravelerId(1), "Lima", dates)
    }

    fn fee(id: DestinationId) -> Option<Money> {
        match id.0 {
            1 => Some(Money::from_units(30)),
            2 => Some(Money::from_units(10)),
            _ => None,
        }
    }

    #[test]
    fn date_range_days() {
        let range = DateRange::new(date(2025, 3, 10), date(2025, 3, 12)).unwrap();
        assert_eq!(range.day_count(), 3);
        assert_eq!(range.date_of(1), Some(date(2025, 3, 10)));
        assert_eq!(range.date_of(3), Some(date(2025, 3, 12)));
        assert_eq!(range.date_of(0), None);
        assert_eq!(range.date_of(4), None);

        let single = DateRange::new(date(2025, 3, 10), date(2025, 3, 10)).unwrap();
        assert_eq!(single.day_count(), 1);

        assert!(DateRange::new(date(2025, 3, 10), date(2025, 3, 9)).is_err());
    }

    #[test]
    fn status_editability() {
        assert!(ItineraryStatus::Draft.is_editable());
        assert!(ItineraryStatus::Confirmed.is_editable());
        assert!(!ItineraryStatus::InProgress.is_editable());
        assert!(!ItineraryStatus::Completed.is_editable());
        assert!(!ItineraryStatus::Cancelled.is_editable());
        assert_eq!("en_proceso".parse::<ItineraryStatus>().unwrap(), ItineraryStatus::InProgress);
        assert!("archived".parse::<ItineraryStatus>().is_err());
    }

    #[test]
    fn push_keeps_order_unique_and_sorted() {
        let mut it = three_days();
        it.push_item(ItineraryItem::new(2, 1, DestinationId(1), span("11:00", "12:00")))
            .unwrap();
        it.push_item(ItineraryItem::new(1, 1, DestinationId(2), span("09:00", "10:00")))
            .unwrap();

        assert_eq!(it.items()[0].order, 1);
        assert_eq!(it.items()[1].order, 2);
        assert_eq!(it.next_order(), 3);

        let dup = it.push_item(ItineraryItem::new(2, 1, DestinationId(3), span("13:00", "14:00")));
        assert_eq!(dup, Err(DomainError::DuplicateOrder(2)));

        let zero = it.push_item(ItineraryItem::new(0, 1, DestinationId(3), span("13:00", "14:00")));
        assert_eq!(zero, Err(DomainError::ZeroOrder));
    }

    #[test]
    fn push_rejects_day_outside_range() {
        let mut it = three_days();
        let err = it
            .push_item(ItineraryItem::new(1, 4, DestinationId(1), span("09:00", "10:00")))
            .unwrap_err();
        assert_eq!(err, DomainError::DayOutOfRange { day: 4, days: 3 });
    }

    #[test]
    fn remove_renumbers() {
        let mut it = three_days();
        for order in 1..=3 {
            it.push_item(ItineraryItem::new(order, 1, DestinationId(order), span("09:00", "10:00")))
                .unwrap();
        }

        let removed = it.remove_item(2).unwrap();
        assert_eq!(removed.destination, DestinationId(2));
        let orders: Vec<u32> = it.items().iter().map(|i| i.order).collect();
        assert_eq!(orders, vec![1, 2]);
        assert_eq!(it.items()[1].destination, DestinationId(3));

        assert_eq!(it.remove_item(9), Err(DomainError::UnknownItem(9)));
    }

    #[test]
    fn resolved_cost_precedence() {
        let base = ItineraryItem::new(1, 1, DestinationId(1), span("09:00", "10:00"));
        let fee = Money::from_units(30);

        assert_eq!(base.resolved_cost(fee), fee);

        let annotated = base.clone().with_notes("Tour (S/ 12.50)");
        assert_eq!(annotated.resolved_cost(fee), Money::from_cents(1250));

        let malformed = base.clone().with_notes("Tour (S/ twelve)");
        assert_eq!(malformed.resolved_cost(fee), fee);

        let recorded = annotated.with_cost(Money::from_units(5));
        assert_eq!(recorded.resolved_cost(fee), Money::from_units(5));
    }

    #[test]
    fn recompute_totals_over_items() {
        let mut it = three_days();
        it.push_item(
            ItineraryItem::new(1, 1, DestinationId(1), span("09:00", "10:30"))
                .with_notes("Tour guiado (S/ 20.00)"),
        )
        .unwrap();
        it.push_item(ItineraryItem::new(2, 1, DestinationId(2), span("22:00", "01:00")))
            .unwrap();
        it.push_item(
            ItineraryItem::new(3, 2, DestinationId(1), span("09:00", "09:45"))
                .with_cost(Money::from_units(7)),
        )
        .unwrap();

        let totals = it.recompute_totals(fee);

        // 20.00 from notes + 10.00 entry fee + 7.00 recorded
        assert_eq!(totals.cost, Money::from_units(37));
        // 90 + 180 (wraps midnight) + 45
        assert_eq!(totals.minutes, 315);
        // two distinct destinations
        assert_eq!(totals.distance_km, 5.0);
        assert_eq!(it.totals(), totals);
    }

    #[test]
    fn deserialize_checks_items() {
        let mut it = three_days();
        it.push_item(ItineraryItem::new(1, 1, DestinationId(1), span("09:00", "10:00")))
            .unwrap();
        it.push_item(ItineraryItem::new(2, 3, DestinationId(2), span("22:00", "01:00")))
            .unwrap();
        it.recompute_totals(fee);
        let json = serde_json::to_value(&it).unwrap();

        let back: Itinerary = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, it);

        let mut duplicate = json.clone();
        duplicate["items"][1]["order"] = 1.into();
        let err = serde_json::from_value::<Itinerary>(duplicate).unwrap_err();
        assert!(err.to_string().contains("already taken"), "got {err}");

        let mut late = json.clone();
        late["items"][1]["day"] = 4.into();
        assert!(serde_json::from_value::<Itinerary>(late).is_err());

        let mut zero = json;
        zero["items"][0]["order"] = 0.into();
        assert!(serde_json::from_value::<Itinerary>(zero).is_err());
    }

    #[test]
    fn recompute_empty_and_single() {
        let mut it = three_days();
        assert_eq!(it.recompute_totals(fee), Totals::default());

        it.push_item(ItineraryItem::new(1, 1, DestinationId(9), span("09:00", "10:00")))
            .unwrap();
        let totals = it.recompute_totals(fee);
        assert_eq!(totals.cost, Money::ZERO);
        assert_eq!(totals.distance_km, 0.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::ClockTime;
    use proptest::prelude::*;

    fn item_strategy() -> impl Strategy<Value = (u32, u32, u32, u32, Option<u64>, bool)> {
        (
            1u32..4,        // day
            1u32..6,        // destination
            0u32..1440,     // start minute
            1u32..1439,     // length
            prop::option::of(0u64..10_000),
            any::<bool>(),  // annotate notes
        )
    }

    fn build(specs: &[(u32, u32, u32, u32, Option<u64>, bool)]) -> Itinerary {
        let dates = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
        )
        .unwrap();
        let mut it = Itinerary::new(TravelerId(1), "prop", dates);
        for (i, (day, dest, start, len, cost, annotate)) in specs.iter().enumerate() {
            let span = TimeSpan::starting_at(ClockTime::from_minutes(*start), *len).unwrap();
            let mut item = ItineraryItem::new(i as u32 + 1, *day, DestinationId(*dest), span);
            if let Some(c) = cost {
                item = item.with_cost(Money::from_cents(*c));
            }
            if *annotate {
                item = item.with_notes(format!("visit ({})", Money::from_cents(123).annotation()));
            }
            it.push_item(item).unwrap();
        }
        it
    }

    proptest! {
        /// recompute(recompute(x)) == recompute(x)
        #[test]
        fn recompute_is_idempotent(specs in prop::collection::vec(item_strategy(), 0..12)) {
            let mut it = build(&specs);
            let fee = |id: DestinationId| Some(Money::from_units(u64::from(id.0)));

            let first = it.recompute_totals(fee);
            let snapshot = it.clone();
            let second = it.recompute_totals(fee);

            prop_assert_eq!(first, second);
            prop_assert_eq!(snapshot, it);
        }

        #[test]
        fn json_round_trip(
            specs in prop::collection::vec(item_strategy(), 0..12),
            id in prop::option::of(1u32..1000),
        ) {
            let mut it = build(&specs).with_description("round trip");
            it.id = id.map(ItineraryId);
            it.status = ItineraryStatus::Confirmed;
            it.recompute_totals(|dest| Some(Money::from_units(u64::from(dest.0))));

            let json = serde_json::to_string(&it).unwrap();
            let back: Itinerary = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back, it);
        }

        #[test]
        fn minutes_equal_sum_of_lengths(specs in prop::collection::vec(item_strategy(), 0..12)) {
            let mut it = build(&specs);
            let totals = it.recompute_totals(|_| None);
            let expected: u32 = specs.iter().map(|s| s.3).sum();
            prop_assert_eq!(totals.minutes, expected);
        }
    }
}
