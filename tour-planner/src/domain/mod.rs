//! Domain types for the itinerary planner.
//!
//! This module contains the catalog records the planner reads and the
//! itinerary aggregate it produces. Value types enforce their invariants at
//! construction time, so code that receives them can trust their validity.

mod activity;
mod clock;
mod destination;
mod error;
mod ids;
mod itinerary;
mod money;
mod profile;
mod route;

pub use activity::{Activity, ActivityKind};
pub use clock::{ClockTime, MINUTES_PER_DAY, TimeError, TimeSpan};
pub use destination::{Category, Destination, GeoPoint, Rating, TagSet};
pub use error::DomainError;
pub use ids::{ActivityId, CategoryId, DestinationId, ItineraryId, TravelerId};
pub use itinerary::{
    DateRange, HOP_DISTANCE_KM, Itinerary, ItineraryItem, ItineraryStatus, Totals,
};
pub use money::{CURRENCY_MARKER, InvalidMoney, Money};
pub use profile::{PreferenceSet, TravelerProfile};
pub use route::{Route, RouteKey, RouteSet, TransportMode};
