//! Tourism itinerary planner.
//!
//! Turns a catalog of destinations and activities plus a traveler's profile
//! into a budget-respecting, time-ordered itinerary, and provides the
//! structures used to rank, connect and list destinations:
//!
//! - [`planner`] generates and edits itineraries,
//! - [`graph`] recommends similar destinations and finds shortest routes,
//! - [`index`] sorts destinations through a red-black tree,
//! - [`catalog`] is the read side the planner draws from.

pub mod catalog;
pub mod domain;
pub mod graph;
pub mod index;
pub mod planner;
pub mod random;

#[cfg(test)]
mod scenario_tests;
