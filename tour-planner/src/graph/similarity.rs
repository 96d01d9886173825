//! Destination similarity graph and recommendations.
//!
//! Two destinations are similar when they share a category, share tags, and
//! offer the same kinds of activity. Pairs above a threshold are joined by
//! an undirected weighted edge; recommendations are a destination's
//! heaviest edges.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use tracing::debug;

use crate::catalog::{Catalog, CatalogError, DestinationFilter};
use crate::domain::{Activity, ActivityKind, CategoryId, Destination, DestinationId};

/// Weights and threshold for the similarity measure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityConfig {
    pub category: f64,
    pub tags: f64,
    pub activity_kinds: f64,
    /// Pairs must score strictly above this to be joined.
    pub threshold: f64,
}

impl SimilarityConfig {
    /// Category 0.4, tags 0.4, activity kinds 0.2, threshold 0.1.
    pub const STANDARD: SimilarityConfig = SimilarityConfig {
        category: 0.4,
        tags: 0.4,
        activity_kinds: 0.2,
        threshold: 0.1,
    };

    /// Similarity of two destinations.
    pub fn similarity(&self, a: &Features, b: &Features) -> f64 {
        let same_category = match (a.category, b.category) {
            (Some(x), Some(y)) if x == y => 1.0,
            _ => 0.0,
        };
        self.category * same_category
            + self.tags * jaccard(&a.tags, &b.tags)
            + self.activity_kinds * jaccard(&a.kinds, &b.kinds)
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Jaccard index `|A ∩ B| / |A ∪ B|`; zero when either set is empty.
///
/// ```
/// use std::collections::BTreeSet;
/// use tour_planner::graph::jaccard;
///
/// let a: BTreeSet<_> = ["playa", "surf"].into_iter().collect();
/// let b: BTreeSet<_> = ["playa", "relax"].into_iter().collect();
/// assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-12);
/// assert_eq!(jaccard(&a, &BTreeSet::new()), 0.0);
/// ```
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let common = a.intersection(b).count();
    let union = a.len() + b.len() - common;
    common as f64 / union as f64
}

/// What the similarity measure looks at for one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Features {
    pub category: Option<CategoryId>,
    pub tags: BTreeSet<String>,
    pub kinds: BTreeSet<ActivityKind>,
}

impl Features {
    /// Collect features from a destination and the kinds of activity it offers.
    pub fn new(destination: &Destination, kinds: impl IntoIterator<Item = ActivityKind>) -> Self {
        Self {
            category: destination.category,
            tags: destination.tags.as_set().clone(),
            kinds: kinds.into_iter().collect(),
        }
    }
}

/// A recommended destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recommendation {
    pub destination: DestinationId,
    pub weight: f64,
    /// The weight as a whole percentage, truncated.
    pub percent: u8,
}

/// Summary of one destination's edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborStats {
    pub connections: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

/// Heap entry ordered by weight alone.
#[derive(Debug, Clone, Copy)]
struct ByWeight(DestinationId, f64);

impl PartialEq for ByWeight {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ByWeight {}

impl Ord for ByWeight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.1.total_cmp(&other.1)
    }
}

impl PartialOrd for ByWeight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Undirected similarity graph over active destinations.
#[derive(Debug, Clone, Default)]
pub struct SimilarityGraph {
    nodes: BTreeSet<DestinationId>,
    edges: BTreeMap<DestinationId, Vec<(DestinationId, f64)>>,
}

impl SimilarityGraph {
    /// Build with the standard weights.
    ///
    /// Inactive destinations are left out. `activities` may cover any
    /// destinations; unavailable ones are ignored. Compares every pair, so
    /// the cost grows with the square of the destination count.
    pub fn build(destinations: &[Destination], activities: &[Activity]) -> Self {
        Self::build_with(&SimilarityConfig::STANDARD, destinations, activities)
    }

    /// Build with custom weights.
    pub fn build_with(
        config: &SimilarityConfig,
        destinations: &[Destination],
        activities: &[Activity],
    ) -> Self {
        let mut kinds: BTreeMap<DestinationId, BTreeSet<ActivityKind>> = BTreeMap::new();
        for activity in activities.iter().filter(|a| a.available) {
            kinds.entry(activity.destination).or_default().insert(activity.kind);
        }

        let features: Vec<(DestinationId, Features)> = destinations
            .iter()
            .filter(|d| d.active)
            .map(|d| {
                let offered = kinds.get(&d.id).into_iter().flatten().copied();
                (d.id, Features::new(d, offered))
            })
            .collect();

        let mut graph = Self::default();
        for (i, (a_id, a)) in features.iter().enumerate() {
            graph.nodes.insert(*a_id);
            for (b_id, b) in &features[i + 1..] {
                let weight = config.similarity(a, b);
                if weight > config.threshold {
                    graph.edges.entry(*a_id).or_default().push((*b_id, weight));
                    graph.edges.entry(*b_id).or_default().push((*a_id, weight));
                }
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "similarity graph built"
        );
        graph
    }

    /// Build from every active destination in a catalog.
    pub fn from_catalog<C: Catalog>(catalog: &C) -> Result<Self, CatalogError> {
        let destinations = catalog.active_destinations(&DestinationFilter::any())?;
        let mut activities = Vec::new();
        for d in &destinations {
            activities.extend(catalog.activities(d.id, true)?);
        }
        Ok(Self::build(&destinations, &activities))
    }

    /// Number of destinations in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum::<usize>() / 2
    }

    /// Weight of the edge between two destinations, if there is one.
    pub fn weight(&self, a: DestinationId, b: DestinationId) -> Option<f64> {
        self.edges
            .get(&a)?
            .iter()
            .find(|(id, _)| *id == b)
            .map(|&(_, w)| w)
    }

    /// Up to `n` most similar destinations, most similar first.
    ///
    /// Unknown destinations and destinations without edges give an empty
    /// list. Neighbours with equal weight come out in no particular order.
    pub fn recommend(&self, id: DestinationId, n: usize) -> Vec<Recommendation> {
        let Some(neighbours) = self.edges.get(&id) else {
            debug!(destination = %id, known = self.nodes.contains(&id), "no recommendations");
            return Vec::new();
        };

        let mut heap: BinaryHeap<ByWeight> =
            neighbours.iter().map(|&(to, w)| ByWeight(to, w)).collect();

        let mut out = Vec::with_capacity(n.min(heap.len()));
        while out.len() < n {
            let Some(ByWeight(destination, weight)) = heap.pop() else {
                break;
            };
            out.push(Recommendation {
                destination,
                weight,
                percent: percent(weight),
            });
        }

        debug!(destination = %id, count = out.len(), "recommendations generated");
        out
    }

    /// Edge statistics for a destination.
    ///
    /// `None` for destinations not in the graph; all zeros for a destination
    /// with no edges.
    pub fn stats(&self, id: DestinationId) -> Option<NeighborStats> {
        if !self.nodes.contains(&id) {
            return None;
        }
        let weights: Vec<f64> = self
            .edges
            .get(&id)
            .map(|e| e.iter().map(|&(_, w)| w).collect())
            .unwrap_or_default();

        if weights.is_empty() {
            return Some(NeighborStats {
                connections: 0,
                mean: 0.0,
                max: 0.0,
                min: 0.0,
            });
        }

        Some(NeighborStats {
            connections: weights.len(),
            mean: weights.iter().sum::<f64>() / weights.len() as f64,
            max: weights.iter().copied().fold(f64::MIN, f64::max),
            min: weights.iter().copied().fold(f64::MAX, f64::min),
        })
    }
}

fn percent(weight: f64) -> u8 {
    (weight * 100.0).clamp(0.0, 100.0) as u8
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const TAGS: [&str; 6] = ["playa", "surf", "museos", "cultura", "compras", "relax"];

    fn tag_set() -> impl Strategy<Value = BTreeSet<String>> {
        prop::sample::subsequence(TAGS.to_vec(), 0..=TAGS.len())
            .prop_map(|tags| tags.into_iter().map(String::from).collect())
    }

    proptest! {
        #[test]
        fn jaccard_bounded_and_symmetric(a in tag_set(), b in tag_set()) {
            let ab = jaccard(&a, &b);
            prop_assert!((0.0..=1.0).contains(&ab));
            prop_assert_eq!(ab, jaccard(&b, &a));
            if !a.is_empty() {
                prop_assert_eq!(jaccard(&a, &a), 1.0);
            }
        }

        #[test]
        fn similarity_bounded(
            a in tag_set(), b in tag_set(),
            ca in prop::option::of(0u32..3), cb in prop::option::of(0u32..3),
        ) {
            let fa = Features { category: ca.map(CategoryId), tags: a, kinds: BTreeSet::new() };
            let fb = Features { category: cb.map(CategoryId), tags: b, kinds: BTreeSet::new() };
            let s = SimilarityConfig::STANDARD.similarity(&fa, &fb);
            prop_assert!((0.0..=1.0 + 1e-12).contains(&s));
        }
    }
}
