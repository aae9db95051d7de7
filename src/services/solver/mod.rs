//! Route and fleet optimization.
//!
//! Two entry points share one pipeline: build a travel matrix over the depot
//! and stops, order the stops, then compute per-leg metrics and a summary.
//! `optimize_route` sequences a single vehicle with nearest-neighbor;
//! `optimize_fleet` first partitions stops into routes with Clarke-Wright
//! savings, assigns routes to vehicles by capacity, then sequences each
//! route the same way.

mod problem;
mod savings;
mod sequencing;
mod solution;
mod summary;

pub use problem::{FleetProblem, SingleRouteProblem};
pub use savings::{clarke_wright_partition, compute_savings, PartitionStop, ProtoRoute, Saving};
pub use sequencing::{nearest_neighbor_order, SequencedPath};
pub use solution::{
    PlannedStop, RouteLeg, RouteWarning, Solution, UnassignedStop, VehicleRoute,
    WARNING_ESTIMATED_MATRIX, WARNING_UNASSIGNED, WARNING_UNREACHABLE_LEG,
};
pub use summary::{summarize, SolutionSummary};

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::services::geo;
use crate::services::routing::{MatrixAnnotations, MatrixProvider, TravelMatrix};
use crate::types::{
    Demand, GeoPoint, OptimizationPhase, OptimizationProgress, ProgressSink, Stop,
};

/// Caller-supplied knobs for a single optimization run.
pub struct RunOptions {
    /// Optional progress callback, invoked at phase boundaries and once per
    /// sequenced stop
    pub progress: Option<ProgressSink>,
    /// Cancellation token, checked between phases
    pub cancellation: CancellationToken,
}

impl RunOptions {
    pub fn new() -> Self {
        Self {
            progress: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of an optimization run: the routes plus aggregate metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedPlan {
    pub solution: Solution,
    pub summary: SolutionSummary,
}

/// Maps per-phase step counts onto a single 0-100 percentage.
///
/// Matrix building takes the first 30%, sequencing the next 60% and metrics
/// the final 10%. Reported percentages never decrease even when a later
/// phase starts below the point an earlier phase ended at.
struct ProgressReporter<'a> {
    sink: Option<&'a ProgressSink>,
    last_percent: u8,
}

impl<'a> ProgressReporter<'a> {
    fn new(sink: Option<&'a ProgressSink>) -> Self {
        Self {
            sink,
            last_percent: 0,
        }
    }

    fn report(&mut self, phase: OptimizationPhase, current_step: usize, total_steps: usize) {
        let Some(sink) = self.sink else {
            return;
        };
        let (base, span) = match phase {
            OptimizationPhase::BuildingMatrix => (0.0, 30.0),
            OptimizationPhase::Sequencing => (30.0, 60.0),
            OptimizationPhase::ComputingMetrics => (90.0, 10.0),
        };
        let fraction = if total_steps == 0 {
            1.0
        } else {
            current_step as f64 / total_steps as f64
        };
        let percent = (base + span * fraction).round() as u8;
        let percent = percent.clamp(self.last_percent, 100);
        self.last_percent = percent;
        sink(OptimizationProgress::new(
            phase,
            current_step,
            total_steps,
            percent,
        ));
    }
}

fn check_cancelled(options: &RunOptions) -> Result<(), EngineError> {
    if options.cancellation.is_cancelled() {
        debug!("Optimization cancelled by caller");
        return Err(EngineError::Cancelled);
    }
    Ok(())
}

/// Per-leg metrics between two matrix indices. Unreachable cells fall back
/// to a haversine estimate so route totals stay meaningful; the second
/// element reports whether that fallback was taken.
fn leg_between(
    matrix: &TravelMatrix,
    locations: &[GeoPoint],
    from: usize,
    to: usize,
) -> (RouteLeg, bool) {
    if matrix.is_reachable(from, to) {
        let leg = RouteLeg {
            distance_meters: matrix.distance(from, to),
            duration_seconds: matrix.duration(from, to),
        };
        (leg, false)
    } else {
        let leg = RouteLeg {
            distance_meters: geo::estimate_distance_meters(&locations[from], &locations[to]),
            duration_seconds: geo::estimate_duration_seconds(&locations[from], &locations[to]),
        };
        (leg, true)
    }
}

/// Turns a visit order (matrix indices, depot excluded) into a `VehicleRoute`
/// with leg metrics, running totals and load. Appends an `UNREACHABLE_LEG`
/// warning for every leg that had to be estimated.
fn build_route(
    matrix: &TravelMatrix,
    locations: &[GeoPoint],
    stops: &[Stop],
    order: &[usize],
    vehicle_id: Option<Uuid>,
    include_return: bool,
    warnings: &mut Vec<RouteWarning>,
) -> VehicleRoute {
    let depot = 0usize;
    let mut planned = Vec::with_capacity(order.len());
    let mut total_distance = 0u64;
    let mut total_duration = 0u64;
    let mut load = Demand::default();
    let mut previous = depot;

    for (position, &index) in order.iter().enumerate() {
        let stop = &stops[index - 1];
        let (leg, estimated) = leg_between(matrix, locations, previous, index);
        if estimated {
            warnings.push(RouteWarning {
                stop_id: Some(stop.id.clone()),
                warning_type: WARNING_UNREACHABLE_LEG.to_string(),
                message: format!(
                    "No route found to stop '{}', leg metrics are straight-line estimates",
                    stop.id
                ),
            });
        }
        total_distance += leg.distance_meters;
        total_duration += leg.duration_seconds;
        load = load.plus(&stop.demand);
        planned.push(PlannedStop {
            stop_id: stop.id.clone(),
            order: (position + 1) as u32,
            distance_from_previous_meters: leg.distance_meters,
            duration_from_previous_seconds: leg.duration_seconds,
        });
        previous = index;
    }

    let return_to_depot = if include_return && !order.is_empty() {
        let (leg, estimated) = leg_between(matrix, locations, previous, depot);
        if estimated {
            warnings.push(RouteWarning {
                stop_id: None,
                warning_type: WARNING_UNREACHABLE_LEG.to_string(),
                message: "No route found back to the depot, return leg metrics are straight-line estimates".to_string(),
            });
        }
        total_distance += leg.distance_meters;
        total_duration += leg.duration_seconds;
        Some(leg)
    } else {
        None
    };

    VehicleRoute {
        vehicle_id,
        stops: planned,
        total_distance_meters: total_distance,
        total_duration_seconds: total_duration,
        load,
        return_to_depot,
    }
}

/// Builds travel matrices and runs the solvers. Holds the routing provider
/// and the engine configuration for a process lifetime; individual runs are
/// parameterized through `RunOptions`.
pub struct RouteOptimizer {
    provider: MatrixProvider,
    config: EngineConfig,
}

impl RouteOptimizer {
    pub fn new(provider: MatrixProvider, config: EngineConfig) -> Self {
        Self { provider, config }
    }

    pub fn from_config(config: EngineConfig) -> Self {
        let provider = MatrixProvider::from_config(&config);
        Self::new(provider, config)
    }

    /// Name of the routing backend currently serving matrix requests.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Sequence the stops of a single vehicle starting at the depot.
    ///
    /// The route is an open path: it starts at the depot, visits every stop
    /// exactly once and does not return. Stops are never dropped; a stop the
    /// road network cannot reach is still placed, with estimated leg metrics
    /// and a warning.
    pub async fn optimize_route(
        &self,
        problem: &SingleRouteProblem,
        options: &RunOptions,
    ) -> Result<OptimizedPlan, EngineError> {
        let started_at = Instant::now();
        problem.validate(self.config.max_matrix_locations)?;

        if problem.stops.is_empty() {
            debug!("No stops to sequence, returning empty solution");
            let mut solution = Solution::empty("none");
            solution.solve_time_ms = started_at.elapsed().as_millis() as u64;
            let summary = summarize(&solution, &[], &self.config);
            return Ok(OptimizedPlan { solution, summary });
        }

        check_cancelled(options)?;
        let mut reporter = ProgressReporter::new(options.progress.as_ref());

        let mut locations = Vec::with_capacity(problem.stops.len() + 1);
        locations.push(problem.depot);
        locations.extend(problem.stops.iter().map(|s| s.location));

        reporter.report(OptimizationPhase::BuildingMatrix, 0, 1);
        let matrix = self
            .provider
            .build_matrix(&locations, MatrixAnnotations::Both)
            .await;
        reporter.report(OptimizationPhase::BuildingMatrix, 1, 1);

        check_cancelled(options)?;

        let candidates: Vec<usize> = (1..locations.len()).collect();
        let path = nearest_neighbor_order(&matrix, 0, &candidates, |placed, total| {
            reporter.report(OptimizationPhase::Sequencing, placed, total);
        });

        check_cancelled(options)?;
        reporter.report(OptimizationPhase::ComputingMetrics, 0, 1);

        let mut warnings = Vec::new();
        if matrix.estimated {
            warnings.push(estimated_matrix_warning());
        }
        let route = build_route(
            &matrix,
            &locations,
            &problem.stops,
            &path.order,
            None,
            false,
            &mut warnings,
        );

        let mut solution = Solution {
            routes: vec![route],
            unassigned: Vec::new(),
            algorithm: "nearest-neighbor".to_string(),
            estimated: matrix.estimated,
            degraded: path.used_unreachable_leg,
            warnings,
            solve_time_ms: 0,
        };
        let summary = summarize(&solution, &[], &self.config);
        solution.solve_time_ms = started_at.elapsed().as_millis() as u64;
        reporter.report(OptimizationPhase::ComputingMetrics, 1, 1);

        info!(
            "Sequenced {} stops in {} ms: {:.1} km, {} s travel",
            problem.stops.len(),
            solution.solve_time_ms,
            solution.total_distance_meters() as f64 / 1000.0,
            solution.total_duration_seconds(),
        );
        Ok(OptimizedPlan { solution, summary })
    }

    /// Partition stops across the fleet and sequence each resulting route.
    ///
    /// Routes are grown with Clarke-Wright savings under the largest
    /// capacities present in the fleet, then matched to concrete vehicles
    /// largest-demand-first. Routes left without a fitting vehicle have all
    /// their stops reported as unassigned rather than overloading anyone.
    /// Every route starts and ends at the shared depot.
    pub async fn optimize_fleet(
        &self,
        problem: &FleetProblem,
        options: &RunOptions,
    ) -> Result<OptimizedPlan, EngineError> {
        let started_at = Instant::now();
        problem.validate(self.config.max_matrix_locations)?;

        if problem.stops.is_empty() {
            debug!("No stops to plan, returning empty solution");
            let mut solution = Solution::empty("none");
            solution.solve_time_ms = started_at.elapsed().as_millis() as u64;
            let summary = summarize(&solution, &problem.fleet, &self.config);
            return Ok(OptimizedPlan { solution, summary });
        }

        check_cancelled(options)?;
        let mut reporter = ProgressReporter::new(options.progress.as_ref());

        let depot = problem.depot();
        let mut locations = Vec::with_capacity(problem.stops.len() + 1);
        locations.push(depot);
        locations.extend(problem.stops.iter().map(|s| s.location));

        reporter.report(OptimizationPhase::BuildingMatrix, 0, 1);
        let matrix = self
            .provider
            .build_matrix(&locations, MatrixAnnotations::Both)
            .await;
        reporter.report(OptimizationPhase::BuildingMatrix, 1, 1);

        check_cancelled(options)?;

        // Partition under the largest capacities any vehicle offers; the
        // per-vehicle fit is re-checked at assignment time.
        let max_load = Demand {
            package_count: problem
                .fleet
                .iter()
                .map(|v| v.capacity_count)
                .max()
                .unwrap_or(0),
            weight_kg: problem
                .fleet
                .iter()
                .map(|v| v.capacity_weight_kg)
                .fold(0.0, f64::max),
        };
        let partition_stops: Vec<PartitionStop> = problem
            .stops
            .iter()
            .enumerate()
            .map(|(position, stop)| PartitionStop {
                index: position + 1,
                demand: stop.demand,
            })
            .collect();
        let proto_routes = clarke_wright_partition(&matrix, 0, &partition_stops, &max_load);

        // Heaviest routes get first pick of the biggest vehicles.
        let mut route_order: Vec<usize> = (0..proto_routes.len()).collect();
        route_order.sort_by(|&a, &b| {
            let (ra, rb) = (&proto_routes[a], &proto_routes[b]);
            rb.load
                .weight_kg
                .total_cmp(&ra.load.weight_kg)
                .then_with(|| rb.load.package_count.cmp(&ra.load.package_count))
                .then_with(|| ra.stops[0].cmp(&rb.stops[0]))
        });
        let mut vehicle_order: Vec<usize> = (0..problem.fleet.len()).collect();
        vehicle_order.sort_by(|&a, &b| {
            let (va, vb) = (&problem.fleet[a], &problem.fleet[b]);
            vb.capacity_weight_kg
                .total_cmp(&va.capacity_weight_kg)
                .then_with(|| vb.capacity_count.cmp(&va.capacity_count))
                .then_with(|| a.cmp(&b))
        });

        // A vehicle is only consumed by a route it can actually carry; a
        // rejected route leaves it available for the next, smaller one.
        let mut assignments: Vec<(usize, usize)> = Vec::new();
        let mut rejected: Vec<(usize, &'static str)> = Vec::new();
        let mut next_vehicle = 0usize;
        for &route_index in &route_order {
            match vehicle_order.get(next_vehicle) {
                Some(&vehicle_index)
                    if problem.fleet[vehicle_index].can_carry(&proto_routes[route_index].load) =>
                {
                    assignments.push((route_index, vehicle_index));
                    next_vehicle += 1;
                }
                Some(_) => rejected.push((route_index, "exceeds vehicle capacity")),
                None => rejected.push((route_index, "no vehicle available")),
            }
        }
        // Present routes in fleet order regardless of assignment order.
        assignments.sort_by_key(|&(_, vehicle_index)| vehicle_index);

        let mut warnings = Vec::new();
        if matrix.estimated {
            warnings.push(estimated_matrix_warning());
        }

        let total_to_place: usize = assignments
            .iter()
            .map(|&(route_index, _)| proto_routes[route_index].stops.len())
            .sum();
        let mut placed_so_far = 0usize;
        let mut routes = Vec::with_capacity(assignments.len());
        for &(route_index, vehicle_index) in &assignments {
            let proto = &proto_routes[route_index];
            let path = nearest_neighbor_order(&matrix, 0, &proto.stops, |_, _| {
                placed_so_far += 1;
                reporter.report(OptimizationPhase::Sequencing, placed_so_far, total_to_place);
            });
            routes.push(build_route(
                &matrix,
                &locations,
                &problem.stops,
                &path.order,
                Some(problem.fleet[vehicle_index].id),
                true,
                &mut warnings,
            ));
        }

        let mut unassigned = Vec::new();
        for &(route_index, reason) in &rejected {
            for &stop_index in &proto_routes[route_index].stops {
                let stop = &problem.stops[stop_index - 1];
                unassigned.push(UnassignedStop {
                    stop_id: stop.id.clone(),
                    reason: reason.to_string(),
                });
                warnings.push(RouteWarning {
                    stop_id: Some(stop.id.clone()),
                    warning_type: WARNING_UNASSIGNED.to_string(),
                    message: format!("Stop '{}' could not be assigned to any vehicle", stop.id),
                });
            }
        }

        check_cancelled(options)?;
        reporter.report(OptimizationPhase::ComputingMetrics, 0, 1);

        let degraded = warnings
            .iter()
            .any(|w| w.warning_type == WARNING_UNREACHABLE_LEG);
        let mut solution = Solution {
            routes,
            unassigned,
            algorithm: "clarke-wright".to_string(),
            estimated: matrix.estimated,
            degraded,
            warnings,
            solve_time_ms: 0,
        };
        let summary = summarize(&solution, &problem.fleet, &self.config);
        solution.solve_time_ms = started_at.elapsed().as_millis() as u64;
        reporter.report(OptimizationPhase::ComputingMetrics, 1, 1);

        info!(
            "Planned {} routes for {} vehicles in {} ms: {} stops assigned, {} unassigned, {:.1} km",
            solution.routes.len(),
            problem.fleet.len(),
            solution.solve_time_ms,
            solution.assigned_stop_count(),
            solution.unassigned.len(),
            solution.total_distance_meters() as f64 / 1000.0,
        );
        Ok(OptimizedPlan { solution, summary })
    }
}

fn estimated_matrix_warning() -> RouteWarning {
    RouteWarning {
        stop_id: None,
        warning_type: WARNING_ESTIMATED_MATRIX.to_string(),
        message: "Travel costs are straight-line estimates, routing service was unavailable"
            .to_string(),
    }
}
