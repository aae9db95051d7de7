//! Nearest-neighbor sequencing
//!
//! Greedy path construction: from the current location, always move to the
//! closest unvisited stop. Deterministic, O(n²), and good enough as a fast
//! heuristic; it makes no optimality claim.

use crate::services::routing::TravelMatrix;

/// Result of sequencing a set of stops
#[derive(Debug, Clone)]
pub struct SequencedPath {
    /// Matrix indices in visit order; excludes the start location
    pub order: Vec<usize>,
    /// True when a stop had to be placed over an unreachable matrix cell
    pub used_unreachable_leg: bool,
}

/// Order `candidates` by repeated nearest-neighbor selection from `start`.
///
/// Ties are broken by the lower matrix index. Unreachable cells are never
/// chosen while a reachable candidate remains; when only unreachable
/// candidates are left they are still placed (stops are never dropped) and
/// the path is flagged. The result is an open path: no return to `start`.
///
/// `on_place` is invoked once per placed stop with (placed so far, total).
pub fn nearest_neighbor_order(
    matrix: &TravelMatrix,
    start: usize,
    candidates: &[usize],
    mut on_place: impl FnMut(usize, usize),
) -> SequencedPath {
    let total = candidates.len();
    let mut remaining: Vec<usize> = candidates.to_vec();
    let mut order = Vec::with_capacity(total);
    let mut used_unreachable_leg = false;
    let mut current = start;

    while !remaining.is_empty() {
        let mut best_slot = 0;
        let mut best_index = remaining[0];
        let mut best_reachable = matrix.is_reachable(current, best_index);
        let mut best_distance = matrix.distance(current, best_index);

        for (slot, &candidate) in remaining.iter().enumerate().skip(1) {
            let reachable = matrix.is_reachable(current, candidate);
            let distance = matrix.distance(current, candidate);

            let better = (reachable && !best_reachable)
                || (reachable == best_reachable
                    && (distance < best_distance
                        || (distance == best_distance && candidate < best_index)));

            if better {
                best_slot = slot;
                best_index = candidate;
                best_reachable = reachable;
                best_distance = distance;
            }
        }

        if !best_reachable {
            used_unreachable_leg = true;
        }

        remaining.swap_remove(best_slot);
        order.push(best_index);
        current = best_index;

        on_place(order.len(), total);
    }

    SequencedPath {
        order,
        used_unreachable_leg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Matrix from explicit distances; durations mirror distances
    fn matrix_from(distances: Vec<Vec<u64>>) -> TravelMatrix {
        let n = distances.len();
        TravelMatrix {
            durations: distances.clone(),
            reachable: vec![vec![true; n]; n],
            distances,
            size: n,
            estimated: false,
        }
    }

    #[test]
    fn test_visits_closest_first() {
        // Stop 2 is closest to the depot, then stop 1 from stop 2
        let mut distances = vec![vec![0u64; 3]; 3];
        distances[0][1] = 20000;
        distances[0][2] = 10000;
        distances[1][0] = 20000;
        distances[1][2] = 15000;
        distances[2][0] = 10000;
        distances[2][1] = 15000;

        let matrix = matrix_from(distances);
        let path = nearest_neighbor_order(&matrix, 0, &[1, 2], |_, _| {});

        assert_eq!(path.order, vec![2, 1]);
        assert!(!path.used_unreachable_leg);
    }

    #[test]
    fn test_empty_candidates() {
        let matrix = matrix_from(vec![vec![0]]);
        let mut calls = 0;
        let path = nearest_neighbor_order(&matrix, 0, &[], |_, _| calls += 1);

        assert!(path.order.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_single_candidate() {
        let mut distances = vec![vec![0u64; 2]; 2];
        distances[0][1] = 5000;
        distances[1][0] = 5000;

        let matrix = matrix_from(distances);
        let path = nearest_neighbor_order(&matrix, 0, &[1], |_, _| {});

        assert_eq!(path.order, vec![1]);
    }

    #[test]
    fn test_tie_breaks_by_lower_index() {
        // Stops 1, 2, 3 all equidistant from the depot and from each other
        let n = 4;
        let mut distances = vec![vec![0u64; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    distances[i][j] = 7000;
                }
            }
        }

        let matrix = matrix_from(distances);
        let path = nearest_neighbor_order(&matrix, 0, &[1, 2, 3], |_, _| {});

        assert_eq!(path.order, vec![1, 2, 3]);
    }

    #[test]
    fn test_tie_break_independent_of_candidate_order() {
        let n = 4;
        let mut distances = vec![vec![0u64; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    distances[i][j] = 7000;
                }
            }
        }

        let matrix = matrix_from(distances);
        let path = nearest_neighbor_order(&matrix, 0, &[3, 1, 2], |_, _| {});

        assert_eq!(path.order, vec![1, 2, 3]);
    }

    #[test]
    fn test_output_is_permutation_of_candidates() {
        let n = 7;
        let mut distances = vec![vec![0u64; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    // Arbitrary but fixed asymmetric costs
                    distances[i][j] = ((i * 31 + j * 17) % 23 + 1) as u64 * 1000;
                }
            }
        }

        let matrix = matrix_from(distances);
        let candidates: Vec<usize> = (1..n).collect();
        let path = nearest_neighbor_order(&matrix, 0, &candidates, |_, _| {});

        let mut sorted = path.order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, candidates);
    }

    #[test]
    fn test_placement_callback_counts_up() {
        let n = 4;
        let mut distances = vec![vec![0u64; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    distances[i][j] = 1000;
                }
            }
        }

        let matrix = matrix_from(distances);
        let mut seen = Vec::new();
        nearest_neighbor_order(&matrix, 0, &[1, 2, 3], |placed, total| {
            seen.push((placed, total));
        });

        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_prefers_reachable_over_closer_unreachable() {
        use crate::services::routing::UNREACHABLE_COST;

        let mut distances = vec![vec![0u64; 3]; 3];
        distances[0][1] = UNREACHABLE_COST;
        distances[0][2] = 50000;
        distances[1][2] = 1000;
        distances[2][1] = 1000;
        distances[1][0] = 50000;
        distances[2][0] = 50000;

        let mut matrix = matrix_from(distances);
        matrix.reachable[0][1] = false;

        let path = nearest_neighbor_order(&matrix, 0, &[1, 2], |_, _| {});

        // Stop 2 first despite stop 1's lower index: 1 is unreachable from 0
        assert_eq!(path.order, vec![2, 1]);
        assert!(!path.used_unreachable_leg);
    }

    #[test]
    fn test_places_unreachable_stop_and_flags_path() {
        use crate::services::routing::UNREACHABLE_COST;

        // Stop 2 unreachable from anywhere; it still must appear in the order
        let mut distances = vec![vec![0u64; 3]; 3];
        distances[0][1] = 1000;
        distances[1][0] = 1000;
        distances[0][2] = UNREACHABLE_COST;
        distances[1][2] = UNREACHABLE_COST;
        distances[2][0] = UNREACHABLE_COST;
        distances[2][1] = UNREACHABLE_COST;

        let mut matrix = matrix_from(distances);
        matrix.reachable[0][2] = false;
        matrix.reachable[1][2] = false;
        matrix.reachable[2][0] = false;
        matrix.reachable[2][1] = false;

        let path = nearest_neighbor_order(&matrix, 0, &[1, 2], |_, _| {});

        assert_eq!(path.order, vec![1, 2]);
        assert!(path.used_unreachable_leg);
    }
}
