//! Optimized solution types
//!
//! A solution is a terminal immutable snapshot: routes with per-leg metrics,
//! stops that could not be assigned, and quality flags for the caller.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Demand;

/// Travel metrics for one leg between consecutive route points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    /// Road distance in meters
    pub distance_meters: u64,
    /// Travel time in seconds
    pub duration_seconds: u64,
}

/// A planned stop in an optimized route
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedStop {
    /// Stop ID (matches the input stop)
    pub stop_id: String,
    /// Order in the route (1-based)
    pub order: u32,
    /// Distance from the previous route point in meters
    pub distance_from_previous_meters: u64,
    /// Travel time from the previous route point in seconds
    pub duration_from_previous_seconds: u64,
}

/// One vehicle's route within a solution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRoute {
    /// Assigned vehicle; `None` for the single-vehicle path
    pub vehicle_id: Option<Uuid>,
    /// Planned stops in visit order
    pub stops: Vec<PlannedStop>,
    /// Total distance in meters, including the return leg when present
    pub total_distance_meters: u64,
    /// Total duration in seconds, including the return leg when present
    pub total_duration_seconds: u64,
    /// Combined demand carried on this route
    pub load: Demand,
    /// Leg from the last stop back to the depot; `None` for open routes
    pub return_to_depot: Option<RouteLeg>,
}

/// A stop that could not be assigned to any vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignedStop {
    /// Stop ID (matches the input stop)
    pub stop_id: String,
    /// Why the stop was left out
    pub reason: String,
}

/// Warning type for matrices produced by the haversine fallback
pub const WARNING_ESTIMATED_MATRIX: &str = "ESTIMATED_MATRIX";
/// Warning type for legs crossing an unreachable matrix cell
pub const WARNING_UNREACHABLE_LEG: &str = "UNREACHABLE_LEG";
/// Warning type for stops left without a vehicle
pub const WARNING_UNASSIGNED: &str = "UNASSIGNED";

/// Warning about the solution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteWarning {
    /// Related stop ID (if applicable)
    pub stop_id: Option<String>,
    /// Warning type code
    pub warning_type: String,
    /// Human-readable message
    pub message: String,
}

/// Optimized solution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    /// Routes in deterministic output order
    pub routes: Vec<VehicleRoute>,
    /// Stops that could not be assigned
    pub unassigned: Vec<UnassignedStop>,
    /// Algorithm that produced the solution
    pub algorithm: String,
    /// True when travel costs came from haversine estimation
    pub estimated: bool,
    /// True when at least one leg crossed an unreachable matrix cell
    pub degraded: bool,
    /// Warnings about the solution
    pub warnings: Vec<RouteWarning>,
    /// Wall-clock solve time in milliseconds
    pub solve_time_ms: u64,
}

impl Solution {
    /// Create empty solution (for empty problems)
    pub fn empty(algorithm: &str) -> Self {
        Self {
            routes: vec![],
            unassigned: vec![],
            algorithm: algorithm.to_string(),
            estimated: false,
            degraded: false,
            warnings: vec![],
            solve_time_ms: 0,
        }
    }

    /// Number of stops placed on routes
    pub fn assigned_stop_count(&self) -> usize {
        self.routes.iter().map(|r| r.stops.len()).sum()
    }

    /// Sum of route distances in meters
    pub fn total_distance_meters(&self) -> u64 {
        self.routes.iter().map(|r| r.total_distance_meters).sum()
    }

    /// Sum of route durations in seconds
    pub fn total_duration_seconds(&self) -> u64 {
        self.routes.iter().map(|r| r.total_duration_seconds).sum()
    }
}
