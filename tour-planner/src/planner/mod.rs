//! Itinerary planning.
//!
//! This module turns a catalog and a traveler profile into a concrete,
//! time-ordered plan:
//!
//! 1. every candidate destination is scored ([`ScoringModel`]),
//! 2. destinations are selected greedily within the budget,
//! 3. each pick gets an activity, drawn at random from a shortlist,
//! 4. the picks are laid out in time, on one day or across all days.
//!
//! [`ItineraryEditor`] changes existing itineraries under the same rules.

mod assign;
mod config;
mod edit;
mod generator;
mod schedule;
mod scoring;
mod select;

pub use assign::{Assignment, activity_notes, assign_activity, shortlist};
pub use config::GeneratorConfig;
pub use edit::{EditError, ItineraryEditor};
pub use generator::{GenerateError, GenerateRequest, ItineraryGenerator, Strategy};
pub use schedule::{schedule_round_robin, schedule_sequential};
pub use scoring::{Candidate, ScoredDestination, ScoringModel, ScoringWeights};
pub use select::{
    Pick, Selection, order_by_category, select_knapsack, select_top, select_within_budget,
    time_cost, unit_cost,
};
