//! Solution metrics aggregation

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::services::solver::solution::Solution;
use crate::types::Vehicle;

/// Aggregated metrics for one solution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionSummary {
    /// Total distance across all routes in meters
    pub total_distance_meters: u64,
    /// Total duration across all routes in seconds
    pub total_duration_seconds: u64,
    /// Vehicles with at least one stop
    pub vehicles_used: usize,
    /// Vehicles offered in the request
    pub vehicles_available: usize,
    /// Stops placed on routes
    pub assigned_stops: usize,
    /// Stops left unassigned
    pub unassigned_stops: usize,
    /// Packages placed on routes
    pub assigned_packages: u32,
    /// Weight placed on routes in kilograms
    pub assigned_weight_kg: f64,
    /// Mean weight utilization of used vehicles, 0-100
    pub average_utilization_percent: f64,
    /// Estimated fuel cost (distance × configured rate per km)
    pub fuel_cost: f64,
    /// Estimated CO₂ emissions in kilograms (distance × configured factor)
    pub co2_kg: f64,
}

/// Compute summary metrics for a solution.
///
/// Pure function of its inputs. `fleet` is empty for the single-vehicle
/// path, in which case availability falls back to the route count and
/// utilization is reported as zero (no capacity to measure against).
pub fn summarize(solution: &Solution, fleet: &[Vehicle], config: &EngineConfig) -> SolutionSummary {
    let total_distance_meters = solution.total_distance_meters();
    let total_duration_seconds = solution.total_duration_seconds();

    let used_routes: Vec<_> = solution.routes.iter().filter(|r| !r.stops.is_empty()).collect();

    let assigned_packages: u32 = used_routes.iter().map(|r| r.load.package_count).sum();
    let assigned_weight_kg: f64 = used_routes.iter().map(|r| r.load.weight_kg).sum();

    let vehicles_available = if fleet.is_empty() {
        solution.routes.len()
    } else {
        fleet.len()
    };

    // Utilization only where a vehicle with positive weight capacity is known
    let mut utilization_sum = 0.0;
    let mut utilization_count = 0usize;
    for route in &used_routes {
        let capacity = route
            .vehicle_id
            .and_then(|id| fleet.iter().find(|v| v.id == id))
            .map(|v| v.capacity_weight_kg)
            .unwrap_or(0.0);
        if capacity > 0.0 {
            utilization_sum += route.load.weight_kg / capacity * 100.0;
            utilization_count += 1;
        }
    }
    let average_utilization_percent = if utilization_count == 0 {
        0.0
    } else {
        utilization_sum / utilization_count as f64
    };

    let distance_km = total_distance_meters as f64 / 1000.0;

    SolutionSummary {
        total_distance_meters,
        total_duration_seconds,
        vehicles_used: used_routes.len(),
        vehicles_available,
        assigned_stops: solution.assigned_stop_count(),
        unassigned_stops: solution.unassigned.len(),
        assigned_packages,
        assigned_weight_kg,
        average_utilization_percent,
        fuel_cost: distance_km * config.fuel_cost_per_km,
        co2_kg: distance_km * config.co2_kg_per_km,
    }
}
