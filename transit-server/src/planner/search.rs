//! Transfer-aware shortest path search.
//!
//! Runs Dijkstra over `(location, route)` states instead of bare
//! locations: staying on a route is free, while changing route adds a
//! fixed penalty to the search weight. The penalty only steers the search;
//! the reported distance is the plain sum of edge weights.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::debug;

use crate::domain::{LocationId, RouteId, round_to};
use crate::graph::TransitGraph;

/// Search state: a location, and the route used to arrive there.
///
/// `route` is `None` only at the origin, before boarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    pub location: LocationId,
    pub route: Option<RouteId>,
}

/// One step of a found path.
///
/// `route` is the route ridden from the previous step to this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub location: LocationId,
    pub route: Option<RouteId>,
}

impl From<StateKey> for PathStep {
    fn from(state: StateKey) -> Self {
        Self {
            location: state.location,
            route: state.route,
        }
    }
}

/// Outcome of a successful search.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    pub path: Vec<PathStep>,
    /// Sum of ridden edge weights in kilometres, 3 decimals.
    pub total_distance: f64,
    /// Search weight including transfer penalties, 3 decimals.
    pub total_weighted: f64,
}

impl PathResult {
    fn trivial(location: LocationId) -> Self {
        Self {
            path: vec![PathStep {
                location,
                route: None,
            }],
            total_distance: 0.0,
            total_weighted: 0.0,
        }
    }

    /// Number of route changes after the first boarding.
    pub fn transfers(&self) -> usize {
        self.path
            .windows(2)
            .filter(|w| matches!((w[0].route, w[1].route), (Some(a), Some(b)) if a != b))
            .count()
    }
}

#[derive(Debug, Clone, Copy)]
struct Distances {
    weighted: f64,
    real: f64,
}

/// Find the path from `start` to `end` with the least penalised distance.
///
/// Returns `None` when `end` cannot be reached. A search from a location
/// to itself always succeeds with a single step.
pub fn shortest_path(
    graph: &TransitGraph,
    start: LocationId,
    end: LocationId,
    transfer_penalty_km: f64,
) -> Option<PathResult> {
    if start == end {
        return Some(PathResult::trivial(start));
    }

    if !graph.is_connected(start) {
        debug!(%start, "start location has no edges");
        return None;
    }

    let penalty = transfer_penalty_km.max(0.0);
    let origin = StateKey {
        location: start,
        route: None,
    };

    let mut best: HashMap<StateKey, Distances> = HashMap::new();
    let mut parents: HashMap<StateKey, StateKey> = HashMap::new();
    let mut settled: HashSet<StateKey> = HashSet::new();
    let mut queue = BinaryHeap::new();

    best.insert(
        origin,
        Distances {
            weighted: 0.0,
            real: 0.0,
        },
    );
    queue.push(QueueEntry::new(origin, 0.0));

    while let Some(entry) = queue.pop() {
        let state = entry.state;
        if !settled.insert(state) {
            continue;
        }
        let Some(current) = best.get(&state).copied() else {
            continue;
        };

        if state.location == end {
            let path = reconstruct_path(&parents, origin, state);
            debug!(
                %start,
                %end,
                steps = path.len(),
                settled = settled.len(),
                distance_km = current.real,
                "path found"
            );
            return Some(PathResult {
                path,
                total_distance: round_to(current.real, 3),
                total_weighted: round_to(current.weighted, 3),
            });
        }

        for edge in graph.neighbours(state.location) {
            let next = StateKey {
                location: edge.to,
                route: Some(edge.route),
            };
            if settled.contains(&next) {
                continue;
            }

            let changing = state.route.is_some_and(|r| r != edge.route);
            let weighted = current.weighted + edge.weight_km + if changing { penalty } else { 0.0 };

            if weighted < best.get(&next).map_or(f64::INFINITY, |d| d.weighted) {
                best.insert(
                    next,
                    Distances {
                        weighted,
                        real: current.real + edge.weight_km,
                    },
                );
                parents.insert(next, state);
                queue.push(QueueEntry::new(next, weighted));
            }
        }
    }

    debug!(%start, %end, settled = settled.len(), "no path");
    None
}

fn reconstruct_path(
    parents: &HashMap<StateKey, StateKey>,
    origin: StateKey,
    goal: StateKey,
) -> Vec<PathStep> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(state) = current {
        path.push(PathStep::from(state));
        if state == origin {
            break;
        }
        current = parents.get(&state).copied();
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct QueueEntry {
    state: StateKey,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(state: StateKey, cost: f64) -> Self {
        Self {
            state,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap. Ties go to the smaller state.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.state.cmp(&self.state))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(n: u32) -> LocationId {
        LocationId::new(n).unwrap()
    }

    fn route(n: u32) -> RouteId {
        RouteId::new(n).unwrap()
    }

    fn step(location: u32, r: Option<u32>) -> PathStep {
        PathStep {
            location: loc(location),
            route: r.map(route),
        }
    }

    #[test]
    fn same_location_shortcut() {
        let graph = TransitGraph::default();
        let result = shortest_path(&graph, loc(7), loc(7), 2.0).unwrap();

        assert_eq!(result.path, vec![step(7, None)]);
        assert_eq!(result.total_distance, 0.0);
        assert_eq!(result.total_weighted, 0.0);
        assert_eq!(result.transfers(), 0);
    }

    #[test]
    fn single_route() {
        // A=1, B=2, C=3 on route 1: A-B 2 km, B-C 3 km
        let mut graph = TransitGraph::default();
        graph.connect(loc(1), loc(2), 2.0, route(1));
        graph.connect(loc(2), loc(3), 3.0, route(1));

        let result = shortest_path(&graph, loc(1), loc(3), 2.0).unwrap();

        assert_eq!(result.path, vec![step(1, None), step(2, Some(1)), step(3, Some(1))]);
        assert_eq!(result.total_distance, 5.0);
        assert_eq!(result.total_weighted, 5.0);
        assert_eq!(result.transfers(), 0);
    }

    #[test]
    fn transfer_adds_penalty_to_weight_only() {
        // A=1 -(route 1, 4 km)- M=2 -(route 2, 6 km)- Z=3
        let mut graph = TransitGraph::default();
        graph.connect(loc(1), loc(2), 4.0, route(1));
        graph.connect(loc(2), loc(3), 6.0, route(2));

        let result = shortest_path(&graph, loc(1), loc(3), 1.5).unwrap();

        assert_eq!(result.path, vec![step(1, None), step(2, Some(1)), step(3, Some(2))]);
        assert_eq!(result.total_distance, 10.0);
        assert_eq!(result.total_weighted, 11.5);
        assert_eq!(result.transfers(), 1);
    }

    #[test]
    fn penalty_trades_distance_for_fewer_changes() {
        // Direct route 1: A=1 to D=4, 10 km.
        // Routes 2 and 3 via B=2: 3 km + 3 km with one change.
        let mut graph = TransitGraph::default();
        graph.connect(loc(1), loc(4), 10.0, route(1));
        graph.connect(loc(1), loc(2), 3.0, route(2));
        graph.connect(loc(2), loc(4), 3.0, route(3));

        let cheap = shortest_path(&graph, loc(1), loc(4), 2.0).unwrap();
        assert_eq!(cheap.total_distance, 6.0);
        assert_eq!(cheap.transfers(), 1);

        let dear = shortest_path(&graph, loc(1), loc(4), 5.0).unwrap();
        assert_eq!(dear.total_distance, 10.0);
        assert_eq!(dear.transfers(), 0);
        assert_eq!(dear.path, vec![step(1, None), step(4, Some(1))]);
    }

    #[test]
    fn staying_on_route_is_free() {
        // Two routes share the whole corridor; the path must not hop
        // between them even though each hop would be the same length.
        let mut graph = TransitGraph::default();
        for r in [1, 2] {
            graph.connect(loc(1), loc(2), 1.0, route(r));
            graph.connect(loc(2), loc(3), 1.0, route(r));
            graph.connect(loc(3), loc(4), 1.0, route(r));
        }

        let result = shortest_path(&graph, loc(1), loc(4), 2.0).unwrap();
        assert_eq!(result.transfers(), 0);
        assert_eq!(result.total_weighted, 3.0);
    }

    #[test]
    fn unconnected_start_has_no_path() {
        let mut graph = TransitGraph::default();
        graph.connect(loc(2), loc(3), 1.0, route(1));

        assert!(shortest_path(&graph, loc(1), loc(3), 2.0).is_none());
    }

    #[test]
    fn disjoint_components_have_no_path() {
        let mut graph = TransitGraph::default();
        graph.connect(loc(1), loc(2), 1.0, route(1));
        graph.connect(loc(3), loc(4), 1.0, route(2));

        assert!(shortest_path(&graph, loc(1), loc(4), 2.0).is_none());
    }

    #[test]
    fn parallel_edges_use_shorter() {
        let mut graph = TransitGraph::default();
        graph.connect(loc(1), loc(2), 5.0, route(1));
        graph.connect(loc(1), loc(2), 2.0, route(1));

        let result = shortest_path(&graph, loc(1), loc(2), 2.0).unwrap();
        assert_eq!(result.total_distance, 2.0);
    }

    #[test]
    fn queue_pops_lowest_cost_first() {
        let a = StateKey {
            location: loc(1),
            route: None,
        };
        let b = StateKey {
            location: loc(2),
            route: Some(route(1)),
        };
        let mut heap = BinaryHeap::new();
        heap.push(QueueEntry::new(b, 3.0));
        heap.push(QueueEntry::new(a, 1.0));
        heap.push(QueueEntry::new(b, 1.0));

        assert_eq!(heap.pop().unwrap().state, a);
        assert_eq!(heap.pop().unwrap().state, b);
        assert_eq!(heap.pop().unwrap().cost, FloatOrd(3.0));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn loc(n: u32) -> LocationId {
        LocationId::new(n).unwrap()
    }

    /// Small random networks with whole-kilometre edges, so sums are exact.
    fn arb_graph() -> impl Strategy<Value = TransitGraph> {
        prop::collection::vec((1u32..=7, 1u32..=7, 1u32..=9, 1u32..=3), 1..20).prop_map(|edges| {
            let mut graph = TransitGraph::default();
            for (a, b, weight, r) in edges {
                if a != b {
                    graph.connect(loc(a), loc(b), f64::from(weight), RouteId::new(r).unwrap());
                }
            }
            graph
        })
    }

    /// Penalties in half-kilometre steps.
    fn arb_penalty() -> impl Strategy<Value = f64> {
        (0u32..=12).prop_map(|halves| f64::from(halves) * 0.5)
    }

    /// Shortest edge weight from `a` to `b` on `route`.
    fn edge_weight(graph: &TransitGraph, a: LocationId, b: LocationId, route: RouteId) -> f64 {
        graph
            .neighbours(a)
            .iter()
            .filter(|e| e.to == b && e.route == route)
            .map(|e| e.weight_km)
            .fold(f64::INFINITY, f64::min)
    }

    proptest! {
        /// The same endpoints always give a one-step, zero-length path
        #[test]
        fn same_location(graph in arb_graph(), n in 1u32..=7, p in arb_penalty()) {
            let result = shortest_path(&graph, loc(n), loc(n), p).unwrap();
            prop_assert_eq!(result.path.len(), 1);
            prop_assert_eq!(result.total_distance, 0.0);
        }

        /// Reported distance is the sum of ridden edges; the weight adds
        /// exactly one penalty per route change
        #[test]
        fn distances_account_for_path(
            graph in arb_graph(),
            from in 1u32..=7,
            to in 1u32..=7,
            p in arb_penalty(),
        ) {
            if let Some(result) = shortest_path(&graph, loc(from), loc(to), p) {
                prop_assert!(result.total_distance >= 0.0);
                prop_assert!(result.total_weighted >= result.total_distance);
                prop_assert_eq!(result.path[0].route, None);
                prop_assert_eq!(result.path[0].location, loc(from));
                prop_assert_eq!(result.path.last().unwrap().location, loc(to));

                let sum: f64 = result
                    .path
                    .windows(2)
                    .map(|w| edge_weight(&graph, w[0].location, w[1].location, w[1].route.unwrap()))
                    .sum();
                prop_assert_eq!(result.total_distance, sum);
                prop_assert_eq!(
                    result.total_weighted - result.total_distance,
                    p * result.transfers() as f64
                );
            }
        }

        /// Raising the penalty never increases the number of transfers
        #[test]
        fn penalty_monotonicity(
            graph in arb_graph(),
            from in 1u32..=7,
            to in 1u32..=7,
            p1 in arb_penalty(),
            extra in 1u32..=8,
        ) {
            let p2 = p1 + f64::from(extra) * 0.5;
            let low = shortest_path(&graph, loc(from), loc(to), p1);
            let high = shortest_path(&graph, loc(from), loc(to), p2);

            prop_assert_eq!(low.is_some(), high.is_some());
            if let (Some(low), Some(high)) = (low, high) {
                prop_assert!(high.transfers() <= low.transfers());
            }
        }

        /// Repeated searches on the same graph agree exactly
        #[test]
        fn idempotent(graph in arb_graph(), from in 1u32..=7, to in 1u32..=7, p in arb_penalty()) {
            let first = shortest_path(&graph, loc(from), loc(to), p);
            let second = shortest_path(&graph, loc(from), loc(to), p);
            prop_assert_eq!(first, second);
        }
    }
}
