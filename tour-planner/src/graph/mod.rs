//! Graphs over destinations.
//!
//! [`RouteGraph`] answers "how do I get there": shortest paths over stored
//! routes or straight-line distances. [`SimilarityGraph`] answers "what else
//! would I like": destinations joined by how much they have in common.

mod geo;
mod route;
mod similarity;

pub use geo::haversine_km;
pub use route::{Node, PathResult, PathSummary, RouteGraph};
pub use similarity::{
    Features, NeighborStats, Recommendation, SimilarityConfig, SimilarityGraph, jaccard,
};
