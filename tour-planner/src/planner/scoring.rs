//! Multi-criteria destination scoring.
//!
//! A destination's score is a weighted sum of four components, each
//! normalised to `[0, 1]`:
//!
//! | component  | value                                         | neutral |
//! |------------|-----------------------------------------------|---------|
//! | rating     | rating / 5 (3.0 assumed when unrated)         |         |
//! | preference | matching tags / preference count              | 0.5     |
//! | cost       | 1 - entry fee / budget, clamped               | 0.5     |
//! | popularity | activity count / largest count among peers    | 0.5     |
//!
//! The neutral value is used when the component cannot be computed (no
//! preferences, no budget, no peer has any activity).

use crate::domain::{Activity, Destination, Money, PreferenceSet, Rating};

/// Value used for a component that has nothing to compare against.
const NEUTRAL: f64 = 0.5;

/// Rating assumed for unrated destinations.
const DEFAULT_RATING: f64 = 3.0;

/// Relative weight of each scoring component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub rating: f64,
    pub preference: f64,
    pub cost: f64,
    pub popularity: f64,
}

impl ScoringWeights {
    /// The weights the planner uses. They sum to exactly 1.0.
    pub const STANDARD: ScoringWeights = ScoringWeights {
        rating: 0.40,
        preference: 0.35,
        cost: 0.15,
        popularity: 0.10,
    };

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.rating + self.preference + self.cost + self.popularity
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// A destination together with the activities it currently offers.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub destination: Destination,
    /// Available activities only.
    pub activities: Vec<Activity>,
}

impl Candidate {
    /// Pair a destination with its available activities.
    pub fn new(destination: Destination, activities: Vec<Activity>) -> Self {
        Self {
            destination,
            activities,
        }
    }

    /// Price of the cheapest activity, if there is one.
    pub fn cheapest_activity(&self) -> Option<Money> {
        self.activities.iter().map(|a| a.cost).min()
    }
}

/// A candidate with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDestination {
    pub candidate: Candidate,
    pub score: f64,
}

impl ScoredDestination {
    /// The scored destination.
    pub fn destination(&self) -> &Destination {
        &self.candidate.destination
    }
}

/// Scores destinations for a traveler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringModel {
    weights: ScoringWeights,
}

impl ScoringModel {
    /// Create a model with custom weights.
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// The weights in use.
    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Score one destination. The result is in `[0, 1]` when the weights
    /// sum to 1.
    ///
    /// `max_activity_count` is the largest activity count among all
    /// destinations being compared.
    ///
    /// # Examples
    ///
    /// ```
    /// use tour_planner::domain::{Destination, DestinationId, GeoPoint, PreferenceSet, Rating};
    /// use tour_planner::planner::ScoringModel;
    ///
    /// let museum = Destination::new(DestinationId(1), "Museo", GeoPoint::new(0.0, 0.0))
    ///     .with_rating(Rating::new(5.0).unwrap())
    ///     .with_tags(["museos"]);
    ///
    /// let model = ScoringModel::default();
    /// let prefs = PreferenceSet::parse("museos");
    ///
    /// // 0.40 * 1.0 + 0.35 * 1.0 + 0.15 * 0.5 + 0.10 * 0.5
    /// let score = model.score(&museum, &prefs, None, 0, 0);
    /// assert!((score - 0.875).abs() < 1e-9);
    /// ```
    pub fn score(
        &self,
        destination: &Destination,
        preferences: &PreferenceSet,
        budget: Option<Money>,
        activity_count: usize,
        max_activity_count: usize,
    ) -> f64 {
        let w = &self.weights;
        w.rating * rating_component(destination.rating)
            + w.preference * preference_component(destination, preferences)
            + w.cost * cost_component(destination.entry_fee, budget)
            + w.popularity * popularity_component(activity_count, max_activity_count)
    }

    /// Score every candidate and sort best first.
    ///
    /// The sort is stable, so equal scores keep their input order.
    pub fn score_all(
        &self,
        candidates: Vec<Candidate>,
        preferences: &PreferenceSet,
        budget: Option<Money>,
    ) -> Vec<ScoredDestination> {
        let max_activity_count = candidates
            .iter()
            .map(|c| c.activities.len())
            .max()
            .unwrap_or(0);

        let mut scored: Vec<ScoredDestination> = candidates
            .into_iter()
            .map(|candidate| {
                let score = self.score(
                    &candidate.destination,
                    preferences,
                    budget,
                    candidate.activities.len(),
                    max_activity_count,
                );
                ScoredDestination { candidate, score }
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }
}

fn rating_component(rating: Option<Rating>) -> f64 {
    rating.map_or(DEFAULT_RATING, |r| r.value()) / Rating::MAX
}

fn preference_component(destination: &Destination, preferences: &PreferenceSet) -> f64 {
    if preferences.is_empty() {
        return NEUTRAL;
    }
    preferences.matches_in(&destination.tags) as f64 / preferences.len() as f64
}

fn cost_component(cost: Money, budget: Option<Money>) -> f64 {
    match budget {
        None => NEUTRAL,
        Some(budget) if budget.is_zero() => {
            if cost.is_zero() {
                1.0
            } else {
                0.0
            }
        }
        Some(budget) => (1.0 - cost.as_f64() / budget.as_f64()).clamp(0.0, 1.0),
    }
}

fn popularity_component(count: usize, max_count: usize) -> f64 {
    if max_count == 0 {
        return NEUTRAL;
    }
    (count as f64 / max_count as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActivityId, ActivityKind, DestinationId, GeoPoint};

    fn dest(id: u32) -> Destination {
        Destination::new(DestinationId(id), format!("D{id}"), GeoPoint::new(0.0, 0.0))
    }

    fn activity(id: u32, destination: u32) -> Activity {
        Activity::new(
            ActivityId(id),
            DestinationId(destination),
            "A",
            ActivityKind::Cultural,
            Money::from_units(10),
            60,
        )
    }

    #[test]
    fn weights_sum_to_one() {
        assert_eq!(ScoringWeights::STANDARD.total(), 1.0);
    }

    #[test]
    fn all_neutral_for_bare_destination() {
        // 0.40 * 0.6 + 0.35 * 0.5 + 0.15 * 0.5 + 0.10 * 0.5
        let score = ScoringModel::default().score(&dest(1), &PreferenceSet::empty(), None, 0, 0);
        assert!((score - 0.54).abs() < 1e-9);
    }

    #[test]
    fn preference_ratio() {
        let d = dest(1).with_tags(["playa", "surf"]);
        let prefs = PreferenceSet::parse("playa,museos,surf,compras");
        assert_eq!(preference_component(&d, &prefs), 0.5);
    }

    #[test]
    fn cost_component_clamps() {
        let budget = Some(Money::from_units(50));
        assert_eq!(cost_component(Money::ZERO, budget), 1.0);
        assert_eq!(cost_component(Money::from_units(25), budget), 0.5);
        assert_eq!(cost_component(Money::from_units(80), budget), 0.0);
        assert_eq!(cost_component(Money::from_units(80), None), 0.5);
        assert_eq!(cost_component(Money::ZERO, Some(Money::ZERO)), 1.0);
        assert_eq!(cost_component(Money::from_units(1), Some(Money::ZERO)), 0.0);
    }

    #[test]
    fn popularity_relative_to_peers() {
        assert_eq!(popularity_component(2, 4), 0.5);
        assert_eq!(popularity_component(0, 0), 0.5);
        assert_eq!(popularity_component(4, 4), 1.0);
    }

    #[test]
    fn score_all_sorts_descending_and_stable() {
        let model = ScoringModel::default();
        let candidates = vec![
            Candidate::new(dest(1), vec![]),
            Candidate::new(dest(2).with_rating(Rating::new(5.0).unwrap()), vec![]),
            Candidate::new(dest(3), vec![]),
            Candidate::new(dest(4), vec![activity(1, 4)]),
        ];

        let scored = model.score_all(candidates, &PreferenceSet::empty(), None);
        let ids: Vec<u32> = scored.iter().map(|s| s.destination().id.0).collect();

        // 2 has the best rating, 4 has the only activity, 1 and 3 tie and
        // keep their input order.
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }
}
