//! Routing service for distance/time matrix calculations
//!
//! Uses OSRM for production, haversine estimation as the offline fallback.

mod osrm;

pub use osrm::{OsrmClient, OsrmConfig};

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use crate::config::EngineConfig;
use crate::services::geo::{estimate_distance_meters, estimate_duration_seconds};
use crate::types::GeoPoint;

/// Cost assigned to unreachable cells
pub const UNREACHABLE_COST: u64 = u64::MAX / 2; // Very large but won't overflow

/// Which matrices to request from the routing engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixAnnotations {
    Duration,
    Distance,
    #[default]
    Both,
}

impl MatrixAnnotations {
    /// Value for the OSRM `annotations` query parameter
    pub fn query_value(&self) -> &'static str {
        match self {
            MatrixAnnotations::Duration => "duration",
            MatrixAnnotations::Distance => "distance",
            MatrixAnnotations::Both => "duration,distance",
        }
    }
}

/// Distance and time matrices between locations
///
/// Both matrices are always populated; when the routing engine was asked for
/// only one annotation, the other is derived from the average-speed model.
#[derive(Debug, Clone)]
pub struct TravelMatrix {
    /// Distance in meters [i][j] from location i to location j
    pub distances: Vec<Vec<u64>>,
    /// Duration in seconds [i][j] from location i to location j
    pub durations: Vec<Vec<u64>>,
    /// Whether a road connection exists [i][j]; false cells hold [`UNREACHABLE_COST`]
    pub reachable: Vec<Vec<bool>>,
    /// Number of locations
    pub size: usize,
    /// True when the whole matrix came from haversine estimation
    pub estimated: bool,
}

impl TravelMatrix {
    /// Create empty matrices
    pub fn empty() -> Self {
        Self {
            distances: vec![],
            durations: vec![],
            reachable: vec![],
            size: 0,
            estimated: false,
        }
    }

    /// Get distance from location i to location j in meters
    pub fn distance(&self, from: usize, to: usize) -> u64 {
        self.distances[from][to]
    }

    /// Get duration from location i to location j in seconds
    pub fn duration(&self, from: usize, to: usize) -> u64 {
        self.durations[from][to]
    }

    /// Whether location j can be reached from location i by road
    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.reachable[from][to]
    }

    /// Whether any off-diagonal cell is unreachable
    pub fn has_unreachable_cells(&self) -> bool {
        self.reachable
            .iter()
            .any(|row| row.iter().any(|&r| !r))
    }
}

/// Travel cost for a single origin/destination pair
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelLeg {
    /// Road distance in meters
    pub distance_meters: u64,
    /// Travel time in seconds
    pub duration_seconds: u64,
    /// True when the leg came from haversine estimation
    pub estimated: bool,
}

/// Routing service trait for abstraction (OSRM, haversine estimator)
#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Get distance and time matrices for a list of locations
    /// First location is typically the depot (starting point)
    async fn build_matrix(
        &self,
        locations: &[GeoPoint],
        annotations: MatrixAnnotations,
    ) -> Result<TravelMatrix>;

    /// Get travel cost for a single origin/destination pair
    async fn route_leg(&self, from: &GeoPoint, to: &GeoPoint) -> Result<TravelLeg>;

    /// Get service name for logging
    fn name(&self) -> &str;
}

/// Haversine-based travel estimator
///
/// Straight-line distance scaled by a road circuity coefficient, travel time
/// from a fixed average speed. Serves as the production fallback when OSRM is
/// unavailable and as the offline test double.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineEstimator;

impl HaversineEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Estimate the full matrix locally. Never fails, never produces
    /// unreachable cells.
    pub fn estimate_matrix(&self, locations: &[GeoPoint]) -> TravelMatrix {
        let n = locations.len();
        if n == 0 {
            return TravelMatrix::empty();
        }

        let mut distances = vec![vec![0u64; n]; n];
        let mut durations = vec![vec![0u64; n]; n];

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    distances[i][j] = estimate_distance_meters(&locations[i], &locations[j]);
                    durations[i][j] = estimate_duration_seconds(&locations[i], &locations[j]);
                }
            }
        }

        TravelMatrix {
            distances,
            durations,
            reachable: vec![vec![true; n]; n],
            size: n,
            estimated: true,
        }
    }

    /// Estimate a single leg locally
    pub fn estimate_leg(&self, from: &GeoPoint, to: &GeoPoint) -> TravelLeg {
        TravelLeg {
            distance_meters: estimate_distance_meters(from, to),
            duration_seconds: estimate_duration_seconds(from, to),
            estimated: true,
        }
    }
}

#[async_trait]
impl RoutingService for HaversineEstimator {
    async fn build_matrix(
        &self,
        locations: &[GeoPoint],
        _annotations: MatrixAnnotations,
    ) -> Result<TravelMatrix> {
        Ok(self.estimate_matrix(locations))
    }

    async fn route_leg(&self, from: &GeoPoint, to: &GeoPoint) -> Result<TravelLeg> {
        Ok(self.estimate_leg(from, to))
    }

    fn name(&self) -> &str {
        "HaversineEstimator"
    }
}

/// Matrix provider with per-call fallback
///
/// Tries the primary routing engine once per call; any transport or service
/// error is logged and recovered by estimating locally. Callers therefore
/// always get a complete matrix and must check `estimated` to learn which
/// path produced it.
pub struct MatrixProvider {
    primary: Option<Box<dyn RoutingService>>,
    estimator: HaversineEstimator,
}

impl MatrixProvider {
    pub fn new(primary: Option<Box<dyn RoutingService>>) -> Self {
        Self {
            primary,
            estimator: HaversineEstimator::new(),
        }
    }

    /// Build the provider from engine configuration: OSRM when a URL is
    /// configured, pure estimation otherwise.
    pub fn from_config(config: &EngineConfig) -> Self {
        let primary: Option<Box<dyn RoutingService>> = config.osrm_url.as_ref().map(|url| {
            Box::new(OsrmClient::new(OsrmConfig {
                base_url: url.clone(),
                profile: config.osrm_profile.clone(),
                matrix_timeout_seconds: config.matrix_timeout_seconds,
                leg_timeout_seconds: config.leg_timeout_seconds,
            })) as Box<dyn RoutingService>
        });
        Self::new(primary)
    }

    /// Name of the service that will be tried first
    pub fn name(&self) -> &str {
        match &self.primary {
            Some(service) => service.name(),
            None => self.estimator.name(),
        }
    }

    /// Build the full matrix: one attempt against the primary engine, then
    /// the local estimate.
    pub async fn build_matrix(
        &self,
        locations: &[GeoPoint],
        annotations: MatrixAnnotations,
    ) -> TravelMatrix {
        if let Some(service) = &self.primary {
            match service.build_matrix(locations, annotations).await {
                Ok(matrix) => return matrix,
                Err(e) => {
                    warn!(
                        "{} matrix request failed: {:#}. Falling back to haversine estimation.",
                        service.name(),
                        e
                    );
                }
            }
        }
        self.estimator.estimate_matrix(locations)
    }

    /// Travel cost for one pair: one attempt against the primary engine, then
    /// the local estimate.
    pub async fn route_leg(&self, from: &GeoPoint, to: &GeoPoint) -> TravelLeg {
        if let Some(service) = &self.primary {
            match service.route_leg(from, to).await {
                Ok(leg) => return leg,
                Err(e) => {
                    warn!(
                        "{} leg request failed: {:#}. Falling back to haversine estimation.",
                        service.name(),
                        e
                    );
                }
            }
        }
        self.estimator.estimate_leg(from, to)
    }
}
