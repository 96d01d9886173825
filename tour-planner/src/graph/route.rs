//! Directed route graph and shortest paths.
//!
//! Edges come either from stored routes (weighted by their distance) or
//! from straight-line haversine distances between every pair of
//! destinations. Shortest paths use Dijkstra's algorithm with a binary heap.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use std::fmt;

use tracing::debug;

use crate::domain::{Destination, DestinationId, GeoPoint, Money, Route};

use super::geo::haversine_km;

/// A vertex in the route graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Node {
    /// A traveler's ad-hoc position. Only exists for the duration of one
    /// query.
    Origin,
    Destination(DestinationId),
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Origin => f.write_str("origin"),
            Node::Destination(id) => write!(f, "{id}"),
        }
    }
}

impl From<DestinationId> for Node {
    fn from(id: DestinationId) -> Self {
        Node::Destination(id)
    }
}

/// One directed edge.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Edge {
    to: Node,
    distance_km: f64,
    time_mins: u32,
    cost: Money,
}

/// Outcome of a shortest-path query.
#[derive(Debug, Clone, PartialEq)]
pub enum PathResult {
    /// The shortest path, from the start node to the target inclusive.
    Found { distance_km: f64, path: Vec<Node> },
    /// The target cannot be reached, or one of the nodes is unknown.
    Unreachable,
}

impl PathResult {
    /// Returns true if a path was found.
    pub fn is_found(&self) -> bool {
        matches!(self, PathResult::Found { .. })
    }

    /// Total distance, if a path was found.
    pub fn distance_km(&self) -> Option<f64> {
        match self {
            PathResult::Found { distance_km, .. } => Some(*distance_km),
            PathResult::Unreachable => None,
        }
    }

    /// The nodes along the path; empty when unreachable.
    pub fn path(&self) -> &[Node] {
        match self {
            PathResult::Found { path, .. } => path,
            PathResult::Unreachable => &[],
        }
    }
}

/// Time and money along a path, from the edges it uses.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PathSummary {
    pub distance_km: f64,
    pub time_mins: u32,
    pub cost: Money,
    pub legs: usize,
}

/// Heap entry. Ordered so that `BinaryHeap` pops the smallest distance.
#[derive(Debug, Clone, Copy, PartialEq)]
struct QueueEntry {
    distance_km: f64,
    node: Node,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; node order makes ties deterministic.
        other
            .distance_km
            .total_cmp(&self.distance_km)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A weighted directed graph over destinations.
#[derive(Debug, Clone, Default)]
pub struct RouteGraph {
    nodes: BTreeSet<Node>,
    adjacency: BTreeMap<Node, Vec<Edge>>,
    locations: BTreeMap<DestinationId, GeoPoint>,
}

impl RouteGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored routes. Inactive routes are ignored.
    pub fn from_routes<'a>(routes: impl IntoIterator<Item = &'a Route>) -> Self {
        let mut graph = Self::new();
        for route in routes.into_iter().filter(|r| r.active) {
            graph.add_edge_with(
                route.origin.into(),
                route.destination.into(),
                route.distance_km,
                route.time_mins,
                route.cost,
            );
        }
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "route graph built"
        );
        graph
    }

    /// Build a complete graph weighted by haversine distance.
    ///
    /// Every ordered pair of distinct destinations gets an edge. The
    /// destinations' locations are kept for `shortest_path_from_point`.
    pub fn geographic(destinations: &[Destination]) -> Self {
        let mut graph = Self::new();
        for d in destinations {
            graph.nodes.insert(d.id.into());
            graph.locations.insert(d.id, d.location);
        }
        for a in destinations {
            for b in destinations.iter().filter(|b| b.id != a.id) {
                let km = haversine_km(a.location, b.location);
                graph.add_edge(a.id.into(), b.id.into(), km);
            }
        }
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "geographic graph built"
        );
        graph
    }

    /// Add a directed edge weighted by distance only.
    pub fn add_edge(&mut self, from: Node, to: Node, distance_km: f64) {
        self.add_edge_with(from, to, distance_km, 0, Money::ZERO);
    }

    fn add_edge_with(&mut self, from: Node, to: Node, distance_km: f64, time_mins: u32, cost: Money) {
        self.nodes.insert(from);
        self.nodes.insert(to);
        self.adjacency.entry(from).or_default().push(Edge {
            to,
            distance_km,
            time_mins,
            cost,
        });
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Returns true if the node is in the graph.
    pub fn contains(&self, node: Node) -> bool {
        self.nodes.contains(&node)
    }

    /// Shortest path between two nodes.
    ///
    /// Returns `Unreachable` when no path exists or either node is unknown.
    ///
    /// # Examples
    ///
    /// ```
    /// use tour_planner::domain::DestinationId;
    /// use tour_planner::graph::{Node, PathResult, RouteGraph};
    ///
    /// let (a, b, c) = (
    ///     Node::Destination(DestinationId(1)),
    ///     Node::Destination(DestinationId(2)),
    ///     Node::Destination(DestinationId(3)),
    /// );
    /// let mut graph = RouteGraph::new();
    /// graph.add_edge(a, b, 1.0);
    /// graph.add_edge(b, c, 1.0);
    /// graph.add_edge(a, c, 5.0);
    ///
    /// let result = graph.shortest_path(a, c);
    /// assert_eq!(result, PathResult::Found { distance_km: 2.0, path: vec![a, b, c] });
    /// assert_eq!(graph.shortest_path(c, a), PathResult::Unreachable);
    /// ```
    pub fn shortest_path(&self, from: Node, to: Node) -> PathResult {
        if !self.contains(from) || !self.contains(to) {
            return PathResult::Unreachable;
        }
        self.dijkstra(from, to, &[])
    }

    /// Shortest path from an arbitrary point to a destination.
    ///
    /// The point joins the graph as `Node::Origin`, with an edge to every
    /// destination whose location is known. The graph itself is not changed.
    pub fn shortest_path_from_point(&self, point: GeoPoint, to: DestinationId) -> PathResult {
        if !self.contains(to.into()) {
            return PathResult::Unreachable;
        }
        let origin_edges: Vec<Edge> = self
            .locations
            .iter()
            .map(|(&id, &location)| Edge {
                to: id.into(),
                distance_km: haversine_km(point, location),
                time_mins: 0,
                cost: Money::ZERO,
            })
            .collect();
        self.dijkstra(Node::Origin, to.into(), &origin_edges)
    }

    /// Add up time and cost along a path, using the shortest edge for each
    /// hop. Returns `None` if some hop has no edge.
    pub fn summarize(&self, path: &[Node]) -> Option<PathSummary> {
        let mut summary = PathSummary::default();
        for hop in path.windows(2) {
            let edge = self
                .adjacency
                .get(&hop[0])?
                .iter()
                .filter(|e| e.to == hop[1])
                .min_by(|a, b| a.distance_km.total_cmp(&b.distance_km))?;
            summary.distance_km += edge.distance_km;
            summary.time_mins += edge.time_mins;
            summary.cost += edge.cost;
            summary.legs += 1;
        }
        Some(summary)
    }

    fn dijkstra(&self, from: Node, to: Node, origin_edges: &[Edge]) -> PathResult {
        let mut best: BTreeMap<Node, f64> = BTreeMap::new();
        let mut parent: BTreeMap<Node, Node> = BTreeMap::new();
        let mut visited: BTreeSet<Node> = BTreeSet::new();
        let mut queue = BinaryHeap::new();

        best.insert(from, 0.0);
        queue.push(QueueEntry {
            distance_km: 0.0,
            node: from,
        });

        while let Some(QueueEntry { distance_km, node }) = queue.pop() {
            if !visited.insert(node) {
                continue;
            }
            if node == to {
                return PathResult::Found {
                    distance_km,
                    path: reconstruct(&parent, from, to),
                };
            }

            let edges = match node {
                Node::Origin => origin_edges,
                _ => self.adjacency.get(&node).map_or(&[][..], Vec::as_slice),
            };
            for edge in edges {
                if visited.contains(&edge.to) {
                    continue;
                }
                let candidate = distance_km + edge.distance_km;
                let shorter = best.get(&edge.to).is_none_or(|&current| candidate < current);
                if shorter {
                    best.insert(edge.to, candidate);
                    parent.insert(edge.to, node);
                    queue.push(QueueEntry {
                        distance_km: candidate,
                        node: edge.to,
                    });
                }
            }
        }

        debug!(from = %from, to = %to, "no path");
        PathResult::Unreachable
    }
}

/// Walk parent pointers back from the target, then reverse.
fn reconstruct(parent: &BTreeMap<Node, Node>, from: Node, to: Node) -> Vec<Node> {
    let mut path = vec![to];
    let mut node = to;
    while node != from {
        match parent.get(&node) {
            Some(&previous) => {
                path.push(previous);
                node = previous;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransportMode;

    fn n(id: u32) -> Node {
        Node::Destination(DestinationId(id))
    }

    fn route(from: u32, to: u32, km: f64, mins: u32, cost: u64) -> Route {
        Route::new(
            DestinationId(from),
            DestinationId(to),
            km,
            mins,
            TransportMode::Car,
            Money::from_units(cost),
        )
        .unwrap()
    }

    #[test]
    fn prefers_two_short_hops() {
        let routes = [route(1, 2, 1.0, 5, 2), route(2, 3, 1.0, 5, 2), route(1, 3, 5.0, 15, 10)];
        let graph = RouteGraph::from_routes(&routes);

        let result = graph.shortest_path(n(1), n(3));
        assert_eq!(
            result,
            PathResult::Found {
                distance_km: 2.0,
                path: vec![n(1), n(2), n(3)]
            }
        );

        let summary = graph.summarize(result.path()).unwrap();
        assert_eq!(summary.time_mins, 10);
        assert_eq!(summary.cost, Money::from_units(4));
        assert_eq!(summary.legs, 2);
    }

    #[test]
    fn unreachable_is_distinct() {
        let routes = [route(1, 2, 1.0, 5, 0), route(3, 4, 1.0, 5, 0)];
        let graph = RouteGraph::from_routes(&routes);

        let result = graph.shortest_path(n(1), n(4));
        assert_eq!(result, PathResult::Unreachable);
        assert_eq!(result.distance_km(), None);
        assert!(result.path().is_empty());

        // Directed: no way back.
        assert_eq!(graph.shortest_path(n(2), n(1)), PathResult::Unreachable);
    }

    #[test]
    fn unknown_nodes_are_unreachable() {
        let graph = RouteGraph::from_routes(&[route(1, 2, 1.0, 5, 0)]);
        assert_eq!(graph.shortest_path(n(1), n(99)), PathResult::Unreachable);
        assert_eq!(graph.shortest_path(n(99), n(1)), PathResult::Unreachable);
    }

    #[test]
    fn same_node_is_zero_length() {
        let graph = RouteGraph::from_routes(&[route(1, 2, 1.0, 5, 0)]);
        assert_eq!(
            graph.shortest_path(n(2), n(2)),
            PathResult::Found {
                distance_km: 0.0,
                path: vec![n(2)]
            }
        );
    }

    #[test]
    fn inactive_routes_ignored() {
        let mut closed = route(1, 3, 0.5, 1, 0);
        closed.active = false;
        let graph = RouteGraph::from_routes(&[route(1, 2, 1.0, 5, 0), route(2, 3, 1.0, 5, 0), closed]);
        assert_eq!(graph.shortest_path(n(1), n(3)).distance_km(), Some(2.0));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn geographic_from_point() {
        let destinations = vec![
            Destination::new(DestinationId(1), "Larco", GeoPoint::new(-12.0722, -77.0706)),
            Destination::new(DestinationId(2), "Kennedy", GeoPoint::new(-12.1219, -77.0297)),
            Destination::new(DestinationId(3), "Larcomar", GeoPoint::new(-12.1318, -77.0302)),
        ];
        let graph = RouteGraph::geographic(&destinations);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 6);
        assert!(!graph.contains(Node::Origin));

        let near_kennedy = GeoPoint::new(-12.1210, -77.0300);
        let result = graph.shortest_path_from_point(near_kennedy, DestinationId(3));

        assert!(result.is_found());
        assert_eq!(result.path().first(), Some(&Node::Origin));
        assert_eq!(result.path().last(), Some(&n(3)));
        let direct = haversine_km(near_kennedy, destinations[2].location);
        assert!(result.distance_km().unwrap() <= direct + 1e-9);

        assert_eq!(
            graph.shortest_path_from_point(near_kennedy, DestinationId(9)),
            PathResult::Unreachable
        );
    }
}
