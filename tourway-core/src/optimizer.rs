//! Waypoint ordering by exhaustive permutation search.
//!
//! The search is O(k!) for k = required stops + 1 and is only viable for
//! the single-digit stop counts the product allows. Queries above the
//! configured ceiling are rejected before any search runs; there is no
//! heuristic fallback.

use std::collections::HashMap;

use crate::edge::EdgeIndex;
use crate::error::PlanError;

/// Pairwise edge distances memoised for a single optimizer invocation.
///
/// Distances depend on the mode's edge set, so the cache must never outlive
/// or be shared beyond one call.
struct PairDistances<'a> {
    index: &'a EdgeIndex,
    cache: HashMap<(usize, usize), Option<u64>>,
}

impl<'a> PairDistances<'a> {
    fn new(index: &'a EdgeIndex) -> Self {
        Self {
            index,
            cache: HashMap::new(),
        }
    }

    /// Distance of the directed hop between two node indices, or `None`
    /// when the edge set has no such segment.
    fn get(&mut self, nodes: &[&str], from: usize, to: usize) -> Option<u64> {
        *self.cache.entry((from, to)).or_insert_with(|| {
            self.index
                .lookup(nodes[from], nodes[to])
                .map(|edge| u64::from(edge.distance))
        })
    }
}

/// Find the visiting order of `{waypoints} ∪ {end}` from `start` that
/// minimises total edge distance.
///
/// The end stop participates in the permutation search like any other
/// candidate rather than being pinned last. Permutations requiring a
/// missing edge cost infinity and are discarded; a running total is pruned
/// as soon as it reaches the best known total. Ties are resolved in favour
/// of the first permutation encountered, and enumeration follows input
/// order (waypoints as given, end appended) — an implementation-defined
/// rule that callers may rely on for determinism but not for any
/// particular preference.
///
/// Returns the ordered stop codes, end included, start excluded.
///
/// # Errors
///
/// - [`PlanError::TooManyStops`] when `waypoints` exceeds `max_stops`.
/// - [`PlanError::RouteNotFound`] when every permutation is infeasible.
///
/// # Examples
/// ```
/// use tourway_core::edge::{Edge, EdgeIndex};
/// use tourway_core::optimizer::best_visit_order;
///
/// let hop = |from: &str, to: &str, distance: u32| Edge {
///     from: from.into(),
///     to: to.into(),
///     distance,
///     duration: 60,
///     origin: String::new(),
///     destination: String::new(),
///     bus: None,
/// };
/// let index = EdgeIndex::new(vec![hop("A", "B", 100), hop("B", "C", 200), hop("A", "C", 400)]);
/// let order = best_visit_order(&index, "A", &["B".into()], "C", 8)?;
/// assert_eq!(order, vec!["B".to_string(), "C".to_string()]);
/// # Ok::<(), tourway_core::PlanError>(())
/// ```
pub fn best_visit_order(
    index: &EdgeIndex,
    start: &str,
    waypoints: &[String],
    end: &str,
    max_stops: usize,
) -> Result<Vec<String>, PlanError> {
    if waypoints.len() > max_stops {
        return Err(PlanError::TooManyStops {
            requested: waypoints.len(),
            limit: max_stops,
        });
    }
    // A degenerate round trip: nothing to visit, nothing to search.
    if waypoints.is_empty() && start == end {
        return Ok(Vec::new());
    }

    // Node 0 is the start; candidates are the waypoints in input order with
    // the end appended, which fixes the enumeration (and tie) order.
    let mut nodes: Vec<&str> = Vec::with_capacity(waypoints.len() + 2);
    nodes.push(start);
    nodes.extend(waypoints.iter().map(String::as_str));
    nodes.push(end);

    let mut distances = PairDistances::new(index);
    let mut remaining: Vec<usize> = (1..nodes.len()).collect();
    let mut path = Vec::with_capacity(remaining.len());
    let mut best: Option<(u64, Vec<usize>)> = None;

    search(
        &nodes,
        &mut distances,
        0,
        &mut remaining,
        &mut path,
        0,
        &mut best,
    );

    best.map(|(_, order)| order.iter().map(|&i| nodes[i].to_owned()).collect())
        .ok_or(PlanError::RouteNotFound)
}

/// Depth-first enumeration of the remaining candidates in input order,
/// with branch-and-bound pruning against the best complete total.
fn search(
    nodes: &[&str],
    distances: &mut PairDistances<'_>,
    current: usize,
    remaining: &mut Vec<usize>,
    path: &mut Vec<usize>,
    total: u64,
    best: &mut Option<(u64, Vec<usize>)>,
) {
    if remaining.is_empty() {
        // Strict comparison keeps the first-encountered permutation on ties.
        if best.as_ref().is_none_or(|(best_total, _)| total < *best_total) {
            *best = Some((total, path.clone()));
        }
        return;
    }
    for slot in 0..remaining.len() {
        let next = remaining[slot];
        let Some(hop) = distances.get(nodes, current, next) else {
            continue;
        };
        let running = total + hop;
        // Average-case speedup only; the worst case is still k!.
        if best
            .as_ref()
            .is_some_and(|(best_total, _)| running >= *best_total)
        {
            continue;
        }
        remaining.remove(slot);
        path.push(next);
        search(nodes, distances, next, remaining, path, running, best);
        path.pop();
        remaining.insert(slot, next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;
    use rstest::rstest;

    fn hop(from: &str, to: &str, distance: u32) -> Edge {
        Edge {
            from: from.to_owned(),
            to: to.to_owned(),
            distance,
            duration: 60,
            origin: String::new(),
            destination: String::new(),
            bus: None,
        }
    }

    fn owned(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|&c| c.to_owned()).collect()
    }

    /// Reference enumeration without pruning or memoisation, for checking
    /// optimality on small fixtures.
    fn brute_force(index: &EdgeIndex, start: &str, candidates: &[String]) -> Option<u64> {
        fn permutations(items: &[String]) -> Vec<Vec<String>> {
            if items.is_empty() {
                return vec![Vec::new()];
            }
            let mut out = Vec::new();
            for (i, item) in items.iter().enumerate() {
                let mut rest = items.to_vec();
                rest.remove(i);
                for mut tail in permutations(&rest) {
                    tail.insert(0, item.clone());
                    out.push(tail);
                }
            }
            out
        }

        let mut best: Option<u64> = None;
        for order in permutations(candidates) {
            let mut current = start;
            let mut total = 0_u64;
            let mut feasible = true;
            for stop in &order {
                match index.lookup(current, stop) {
                    Some(edge) => {
                        total += u64::from(edge.distance);
                        current = stop;
                    }
                    None => {
                        feasible = false;
                        break;
                    }
                }
            }
            if feasible && best.is_none_or(|b| total < b) {
                best = Some(total);
            }
        }
        best
    }

    fn total_for(index: &EdgeIndex, start: &str, order: &[String]) -> u64 {
        let mut current = start;
        let mut total = 0_u64;
        for stop in order {
            let edge = index.lookup(current, stop).expect("feasible order");
            total += u64::from(edge.distance);
            current = stop;
        }
        total
    }

    #[test]
    fn prefers_waypoint_leg_over_direct_edge() {
        let index = EdgeIndex::new(vec![
            hop("A", "B", 100),
            hop("B", "C", 200),
            hop("A", "C", 400),
        ]);
        let order = best_visit_order(&index, "A", &owned(&["B"]), "C", 8).unwrap();
        assert_eq!(order, owned(&["B", "C"]));
        assert_eq!(total_for(&index, "A", &order), 300);
    }

    #[test]
    fn matches_brute_force_on_dense_fixture() {
        let codes = ["A", "B", "C", "D", "E"];
        let mut edges = Vec::new();
        // Deterministic asymmetric distances over a complete graph.
        for (i, from) in codes.iter().enumerate() {
            for (j, to) in codes.iter().enumerate() {
                if i != j {
                    let distance = (100 + 37 * i + 91 * j + 13 * i * j) as u32;
                    edges.push(hop(from, to, distance));
                }
            }
        }
        let index = EdgeIndex::new(edges);
        let waypoints = owned(&["B", "C", "D"]);
        let order = best_visit_order(&index, "A", &waypoints, "E", 8).unwrap();

        let mut candidates = waypoints;
        candidates.push("E".to_owned());
        let reference = brute_force(&index, "A", &candidates).unwrap();
        assert_eq!(total_for(&index, "A", &order), reference);
    }

    #[test]
    fn end_participates_in_permutation_search() {
        // Visiting the end before the waypoint is cheaper and must win.
        let index = EdgeIndex::new(vec![
            hop("A", "C", 50),
            hop("C", "B", 50),
            hop("A", "B", 500),
            hop("B", "C", 500),
        ]);
        let order = best_visit_order(&index, "A", &owned(&["B"]), "C", 8).unwrap();
        assert_eq!(order, owned(&["C", "B"]));
    }

    #[test]
    fn empty_waypoints_reduce_to_single_permutation() {
        let index = EdgeIndex::new(vec![hop("A", "C", 400)]);
        let order = best_visit_order(&index, "A", &[], "C", 8).unwrap();
        assert_eq!(order, owned(&["C"]));
    }

    #[test]
    fn start_equal_end_without_waypoints_is_zero_hop() {
        let index = EdgeIndex::default();
        let order = best_visit_order(&index, "A", &[], "A", 8).unwrap();
        assert!(order.is_empty());
    }

    #[test]
    fn unreachable_hop_is_route_not_found() {
        // No edge into C from anywhere: every permutation is infeasible.
        let index = EdgeIndex::new(vec![hop("A", "B", 100)]);
        let err = best_visit_order(&index, "A", &owned(&["B"]), "C", 8).unwrap_err();
        assert_eq!(err, PlanError::RouteNotFound);
    }

    #[rstest]
    #[case(2, &["B", "C", "D"])]
    #[case(0, &["B"])]
    fn rejects_queries_above_the_ceiling(#[case] limit: usize, #[case] waypoints: &[&str]) {
        let index = EdgeIndex::default();
        let err = best_visit_order(&index, "A", &owned(waypoints), "E", limit).unwrap_err();
        assert_eq!(
            err,
            PlanError::TooManyStops {
                requested: waypoints.len(),
                limit,
            }
        );
    }

    #[test]
    fn first_encountered_permutation_wins_ties() {
        // Both orders cost 200; enumeration starts with the input order.
        let index = EdgeIndex::new(vec![
            hop("A", "B", 100),
            hop("B", "C", 100),
            hop("A", "C", 100),
            hop("C", "B", 100),
        ]);
        let order = best_visit_order(&index, "A", &owned(&["B"]), "C", 8).unwrap();
        assert_eq!(order, owned(&["B", "C"]));
    }
}
