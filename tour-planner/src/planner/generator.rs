//! Itinerary generation.
//!
//! The generator reads the catalog once, scores every candidate, selects
//! within the traveler's budget, assigns an activity to each pick, lays the
//! picks out in time and returns an itinerary with fresh totals.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::Days;
use tracing::debug;

use crate::catalog::{Catalog, CatalogError, DestinationFilter};
use crate::domain::{
    DateRange, DestinationId, DomainError, Itinerary, ItineraryItem, Money, TimeError,
    TravelerProfile,
};
use crate::random::RandomSource;

use super::assign::{Assignment, assign_activity};
use super::config::GeneratorConfig;
use super::schedule::{schedule_round_robin, schedule_sequential};
use super::scoring::{Candidate, ScoringModel};
use super::select::{order_by_category, select_knapsack, select_top, select_within_budget};

/// Error from itinerary generation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateError {
    /// The request cannot be planned
    #[error("invalid generate request: {0}")]
    InvalidRequest(String),

    /// Reading the catalog failed
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// An item could not be placed in time
    #[error("scheduling failed: {0}")]
    Schedule(#[from] TimeError),

    /// A generated item broke an itinerary invariant
    #[error("itinerary error: {0}")]
    Domain(#[from] DomainError),
}

/// How destinations are chosen and laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Top destinations whose entry fee fits the budget, one day, back to back.
    Simple,
    /// Greedy selection under a running budget, one day, back to back.
    #[default]
    BudgetStrict,
    /// Greedy selection under time and cost budgets, grouped by category,
    /// spread over every day.
    Optimized,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Simple => "simple",
            Strategy::BudgetStrict => "budget",
            Strategy::Optimized => "optimized",
        })
    }
}

impl FromStr for Strategy {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(Strategy::Simple),
            "budget" | "budget_strict" => Ok(Strategy::BudgetStrict),
            "optimized" | "graph" => Ok(Strategy::Optimized),
            _ => Err(GenerateError::InvalidRequest(format!("unknown strategy {s:?}"))),
        }
    }
}

/// Request for itinerary generation.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Who the itinerary is for.
    pub profile: TravelerProfile,

    /// Requested trip dates.
    pub dates: DateRange,

    /// Selection and scheduling policy.
    pub strategy: Strategy,

    /// Narrows the candidate destinations.
    pub filter: DestinationFilter,

    /// Itinerary name; defaults to one derived from the start date.
    pub name: Option<String>,
}

impl GenerateRequest {
    /// Create a budget-strict request over every active destination.
    pub fn new(profile: TravelerProfile, dates: DateRange) -> Self {
        Self {
            profile,
            dates,
            strategy: Strategy::default(),
            filter: DestinationFilter::any(),
            name: None,
        }
    }

    /// Use a different strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Restrict the candidates.
    pub fn with_filter(mut self, filter: DestinationFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Name the itinerary.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Validate the request.
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.profile.available_days == Some(0) {
            return Err(GenerateError::InvalidRequest(
                "traveler has no available days".to_string(),
            ));
        }
        Ok(())
    }

    /// The dates actually planned: the requested range, shortened to the
    /// traveler's available days when those are fewer.
    pub fn planned_dates(&self) -> Result<DateRange, GenerateError> {
        let requested = self.dates.day_count();
        let days = match self.profile.available_days {
            Some(available) if available < requested => available,
            _ => return Ok(self.dates),
        };
        let end = self
            .dates
            .start()
            .checked_add_days(Days::new(u64::from(days.saturating_sub(1))))
            .ok_or_else(|| GenerateError::InvalidRequest("date out of range".to_string()))?;
        Ok(DateRange::new(self.dates.start(), end)?)
    }

    fn default_name(&self) -> String {
        format!("Itinerary {}", self.dates.start().format("%d/%m/%Y"))
    }
}

/// Items planned for a date range, before they are put in an itinerary.
#[derive(Debug, Clone)]
pub(crate) struct Plan {
    pub dates: DateRange,
    pub items: Vec<ItineraryItem>,
    pub description: String,
    /// Entry fee of every candidate, for recomputing totals.
    pub entry_fees: BTreeMap<DestinationId, Money>,
}

/// Builds itineraries from a catalog.
pub struct ItineraryGenerator<'a, C: Catalog> {
    catalog: &'a C,
    config: &'a GeneratorConfig,
    model: ScoringModel,
}

impl<'a, C: Catalog> ItineraryGenerator<'a, C> {
    /// Create a generator with the standard scoring model.
    pub fn new(catalog: &'a C, config: &'a GeneratorConfig) -> Self {
        Self {
            catalog,
            config,
            model: ScoringModel::default(),
        }
    }

    /// Use a different scoring model.
    pub fn with_model(mut self, model: ScoringModel) -> Self {
        self.model = model;
        self
    }

    /// Generate an itinerary.
    ///
    /// An empty candidate set is not an error: the result is an empty
    /// itinerary whose description says why.
    pub fn generate<R: RandomSource>(
        &self,
        request: &GenerateRequest,
        rng: &mut R,
    ) -> Result<Itinerary, GenerateError> {
        let plan = self.plan(request, rng)?;

        let name = request
            .name
            .clone()
            .unwrap_or_else(|| request.default_name());
        let mut itinerary = Itinerary::new(request.profile.traveler, name, plan.dates)
            .with_description(plan.description);
        for item in plan.items {
            itinerary.push_item(item)?;
        }
        itinerary.recompute_totals(|id| plan.entry_fees.get(&id).copied());

        Ok(itinerary)
    }

    /// Select, assign and schedule, without building the itinerary.
    pub(crate) fn plan<R: RandomSource>(
        &self,
        request: &GenerateRequest,
        rng: &mut R,
    ) -> Result<Plan, GenerateError> {
        request.validate()?;
        let dates = request.planned_dates()?;
        let days = dates.day_count();
        let preferences = &request.profile.preferences;
        let budget = request.profile.budget;

        let mut candidates = Vec::new();
        for destination in self.catalog.active_destinations(&request.filter)? {
            let activities = self.catalog.activities(destination.id, true)?;
            candidates.push(Candidate::new(destination, activities));
        }
        let entry_fees: BTreeMap<DestinationId, Money> = candidates
            .iter()
            .map(|c| (c.destination.id, c.destination.entry_fee))
            .collect();
        let candidate_count = candidates.len();

        let scored = self.model.score_all(candidates, preferences, budget);

        let selection = match request.strategy {
            Strategy::Simple => select_top(&scored, budget, self.config),
            Strategy::BudgetStrict => select_within_budget(&scored, budget, self.config),
            Strategy::Optimized => select_knapsack(&scored, budget, days, self.config),
        };
        let selected_cost = selection.total;

        // The simple strategy never tracked a running total, so it places
        // no cap on individual activities either.
        let mut slack = match request.strategy {
            Strategy::Simple => None,
            _ => selection.slack(budget),
        };
        let picks = match request.strategy {
            Strategy::Optimized => order_by_category(selection.picks),
            _ => selection.picks,
        };

        let mut assignments: Vec<Assignment> = Vec::with_capacity(picks.len());
        for pick in &picks {
            let allowance = slack.map(|s| pick.unit_cost + s);
            let assignment =
                assign_activity(pick.candidate(), preferences, allowance, self.config, rng);
            slack = allowance.map(|a| a.saturating_sub(assignment.cost));
            assignments.push(assignment);
        }

        let items = match request.strategy {
            Strategy::Simple | Strategy::BudgetStrict => {
                schedule_sequential(&assignments, days, self.config)?
            }
            Strategy::Optimized => schedule_round_robin(&assignments, days, self.config)?,
        };

        debug!(
            strategy = %request.strategy,
            candidates = candidate_count,
            selected = items.len(),
            selected_cost = %selected_cost,
            days,
            "itinerary planned"
        );

        let description = describe(candidate_count, items.len(), days, request);

        Ok(Plan {
            dates,
            items,
            description,
            entry_fees,
        })
    }
}

fn describe(candidates: usize, selected: usize, days: u32, request: &GenerateRequest) -> String {
    if candidates == 0 {
        return "No active destinations matched the request.".to_string();
    }
    if selected == 0 {
        return match request.profile.budget {
            Some(budget) => format!(
                "No destination fits the budget of {}.",
                budget.annotation()
            ),
            None => "No destination could be scheduled.".to_string(),
        };
    }
    format!(
        "Generated automatically: {selected} destination(s) over {days} day(s), {} strategy.",
        request.strategy
    )
}
