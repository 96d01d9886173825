//! Choosing which destinations go into an itinerary.
//!
//! All selectors scan candidates once, best score first. A candidate that
//! does not fit is skipped and never reconsidered, even if a later, cheaper
//! pick would leave room for it. This is a greedy approximation of the
//! knapsack problem, not an optimal subset search.

use tracing::trace;

use crate::domain::{CategoryId, Money};

use super::config::GeneratorConfig;
use super::scoring::{Candidate, ScoredDestination};

/// One chosen destination and what it was charged against the budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick<'a> {
    pub scored: &'a ScoredDestination,
    pub unit_cost: Money,
}

impl Pick<'_> {
    /// The chosen candidate.
    pub fn candidate(&self) -> &Candidate {
        &self.scored.candidate
    }
}

/// The outcome of a selection pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection<'a> {
    /// Chosen destinations in the order they were accepted.
    pub picks: Vec<Pick<'a>>,
    /// Sum of the picks' unit costs.
    pub total: Money,
}

impl<'a> Selection<'a> {
    fn accept(&mut self, scored: &'a ScoredDestination, unit_cost: Money) {
        self.total += unit_cost;
        self.picks.push(Pick { scored, unit_cost });
    }

    /// Budget left over after the picks, if there is a budget.
    pub fn slack(&self, budget: Option<Money>) -> Option<Money> {
        budget.map(|b| b.saturating_sub(self.total))
    }

    /// Number of picks.
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    /// Returns true if nothing was picked.
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }
}

/// What visiting a candidate is expected to cost.
///
/// The cheapest available activity, else the entry fee, else the
/// configured default. A zero entry fee counts as no fee.
pub fn unit_cost(candidate: &Candidate, config: &GeneratorConfig) -> Money {
    candidate
        .cheapest_activity()
        .or_else(|| candidate.destination.listed_fee())
        .unwrap_or(config.default_unit_cost)
}

/// Greedy selection under a cost ceiling, capped at `max_destinations`.
///
/// Without a budget this is simply the top candidates by score.
pub fn select_within_budget<'a>(
    scored: &'a [ScoredDestination],
    budget: Option<Money>,
    config: &GeneratorConfig,
) -> Selection<'a> {
    let mut selection = Selection::default();

    for candidate in scored {
        if selection.len() >= config.max_destinations {
            break;
        }
        let cost = unit_cost(&candidate.candidate, config);
        let fits = budget.is_none_or(|ceiling| selection.total + cost <= ceiling);
        if fits {
            selection.accept(candidate, cost);
        } else {
            trace!(
                destination = %candidate.destination().id,
                cost = %cost,
                running = %selection.total,
                "candidate over budget, skipped"
            );
        }
    }

    selection
}

/// The simple strategy: drop candidates whose entry fee alone exceeds the
/// budget, then take the top `max_destinations`.
///
/// The running total is not checked, so the picks together may exceed the
/// budget.
pub fn select_top<'a>(
    scored: &'a [ScoredDestination],
    budget: Option<Money>,
    config: &GeneratorConfig,
) -> Selection<'a> {
    let mut selection = Selection::default();

    for candidate in scored
        .iter()
        .filter(|s| budget.is_none_or(|ceiling| s.destination().entry_fee <= ceiling))
        .take(config.max_destinations)
    {
        selection.accept(candidate, unit_cost(&candidate.candidate, config));
    }

    selection
}

/// Estimated minutes spent at a candidate, including the buffer after it.
pub fn time_cost(candidate: &Candidate, config: &GeneratorConfig) -> u64 {
    let activities = candidate.activities.len().max(1) as u64;
    activities * u64::from(config.average_activity_mins) + u64::from(config.buffer_mins)
}

/// Greedy selection bounded by both a time budget and a cost budget.
///
/// The time budget is `days` times the productive hours per day. There is
/// no fixed cap on the number of picks.
pub fn select_knapsack<'a>(
    scored: &'a [ScoredDestination],
    budget: Option<Money>,
    days: u32,
    config: &GeneratorConfig,
) -> Selection<'a> {
    let time_budget = config.time_budget_mins(days);
    let mut time_used = 0u64;
    let mut selection = Selection::default();

    for candidate in scored {
        let cost = unit_cost(&candidate.candidate, config);
        let minutes = time_cost(&candidate.candidate, config);

        let fits_time = time_used + minutes <= time_budget;
        let fits_cost = budget.is_none_or(|ceiling| selection.total + cost <= ceiling);
        if fits_time && fits_cost {
            time_used += minutes;
            selection.accept(candidate, cost);
        }
    }

    trace!(
        picks = selection.len(),
        time_used,
        time_budget,
        "knapsack selection done"
    );

    selection
}

/// Group picks by category, categories in order of first appearance.
///
/// Destinations in the same category are assumed to be near each other.
/// This is a stand-in for ordering by real coordinates. Uncategorised
/// picks go last. Order within a group is preserved.
pub fn order_by_category(picks: Vec<Pick<'_>>) -> Vec<Pick<'_>> {
    let mut groups: Vec<(Option<CategoryId>, Vec<Pick<'_>>)> = Vec::new();

    for pick in picks {
        let category = pick.candidate().destination.category;
        match groups.iter_mut().find(|(c, _)| *c == category) {
            Some((_, group)) => group.push(pick),
            None => groups.push((category, vec![pick])),
        }
    }

    // Stable, so categorised groups keep their first-seen order.
    groups.sort_by_key(|(category, _)| category.is_none());
    groups.into_iter().flat_map(|(_, group)| group).collect()
}
