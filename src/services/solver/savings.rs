//! Clarke-Wright savings partitioning
//!
//! Each stop starts as its own depot round trip. Serving stops i and j on one
//! route instead saves `s(i,j) = d(depot,i) + d(depot,j) - d(i,j)`; routes
//! are merged end-to-end in descending savings order while both capacity
//! axes stay within the given bound. The output is a partition of the stops;
//! the visit order within each route is refined separately.

use std::collections::HashMap;

use tracing::debug;

use crate::services::routing::TravelMatrix;
use crate::types::Demand;

/// A stop to partition: its travel-matrix index and demand
#[derive(Debug, Clone, Copy)]
pub struct PartitionStop {
    pub index: usize,
    pub demand: Demand,
}

/// Savings value for serving two stops on one route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Saving {
    pub i: usize,
    pub j: usize,
    /// Can go negative when the pair lies on opposite sides of the depot
    pub value: i64,
}

/// A merged route fragment: matrix indices in merge order plus combined load
#[derive(Debug, Clone)]
pub struct ProtoRoute {
    pub stops: Vec<usize>,
    pub load: Demand,
}

/// Compute savings for every unordered stop pair, sorted descending.
/// Ties are broken by the lower (i, j) pair so the merge order is stable.
pub fn compute_savings(
    matrix: &TravelMatrix,
    depot: usize,
    stops: &[PartitionStop],
) -> Vec<Saving> {
    let mut savings = Vec::with_capacity(stops.len() * stops.len().saturating_sub(1) / 2);

    for (a, left) in stops.iter().enumerate() {
        for right in &stops[a + 1..] {
            let (i, j) = if left.index < right.index {
                (left.index, right.index)
            } else {
                (right.index, left.index)
            };
            // Saturating: unreachable cells carry a huge sentinel cost
            let value = (matrix.distance(depot, i) as i64)
                .saturating_add(matrix.distance(depot, j) as i64)
                .saturating_sub(matrix.distance(i, j) as i64);
            savings.push(Saving { i, j, value });
        }
    }

    savings.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then_with(|| (a.i, a.j).cmp(&(b.i, b.j)))
    });

    savings
}

/// Partition stops into routes with the Clarke-Wright merge loop.
///
/// A merge is accepted only when i and j are endpoints of different routes
/// and the combined load fits `max_load` on both axes; rejected merges leave
/// no side effects. Route fragments are joined at the matching endpoints,
/// reversing one fragment when two heads or two tails meet.
pub fn clarke_wright_partition(
    matrix: &TravelMatrix,
    depot: usize,
    stops: &[PartitionStop],
    max_load: &Demand,
) -> Vec<ProtoRoute> {
    let n = stops.len();
    if n == 0 {
        return vec![];
    }

    // One route slot per stop; merged-away slots end up empty
    let mut route_of: HashMap<usize, usize> = HashMap::with_capacity(n);
    let mut members: Vec<Vec<usize>> = Vec::with_capacity(n);
    let mut loads: Vec<Demand> = Vec::with_capacity(n);

    for (slot, stop) in stops.iter().enumerate() {
        route_of.insert(stop.index, slot);
        members.push(vec![stop.index]);
        loads.push(stop.demand);
    }

    let savings = compute_savings(matrix, depot, stops);

    for saving in &savings {
        let ri = route_of[&saving.i];
        let rj = route_of[&saving.j];

        if ri == rj {
            continue;
        }

        let combined = loads[ri].plus(&loads[rj]);
        if combined.weight_kg > max_load.weight_kg
            || combined.package_count > max_load.package_count
        {
            continue;
        }

        let i_at_start = members[ri].first() == Some(&saving.i);
        let i_at_end = members[ri].last() == Some(&saving.i);
        let j_at_start = members[rj].first() == Some(&saving.j);
        let j_at_end = members[rj].last() == Some(&saving.j);

        let (merge_from, merge_into, reverse_from, reverse_into) = if i_at_end && j_at_start {
            (rj, ri, false, false)
        } else if j_at_end && i_at_start {
            (ri, rj, false, false)
        } else if i_at_end && j_at_end {
            (rj, ri, true, false)
        } else if i_at_start && j_at_start {
            (rj, ri, false, true)
        } else {
            continue;
        };

        let mut moved = std::mem::take(&mut members[merge_from]);
        if reverse_from {
            moved.reverse();
        }
        if reverse_into {
            members[merge_into].reverse();
        }
        members[merge_into].append(&mut moved);
        loads[merge_into] = combined;
        loads[merge_from] = Demand::default();

        for &index in &members[merge_into] {
            route_of.insert(index, merge_into);
        }
    }

    let routes: Vec<ProtoRoute> = members
        .into_iter()
        .zip(loads)
        .filter(|(stops, _)| !stops.is_empty())
        .map(|(stops, load)| ProtoRoute { stops, load })
        .collect();

    debug!("Clarke-Wright merged {} stops into {} routes", n, routes.len());

    routes
}
