//! Route and fleet optimization engine for the CargoPilot shipping platform.
//!
//! The engine is a pure, stateless computation over an input snapshot: given
//! a depot, delivery stops and (optionally) a fleet, it builds a travel
//! matrix, orders the stops and returns an [`OptimizedPlan`] with per-leg
//! metrics and an aggregate summary. Travel costs come from an OSRM server
//! when one is configured and fall back to haversine estimates when it is
//! not reachable, so optimization itself never fails on network trouble.
//!
//! ```no_run
//! use cargopilot_engine::{
//!     EngineConfig, RouteOptimizer, RunOptions, SingleRouteProblem,
//! };
//!
//! # async fn run(problem: SingleRouteProblem) -> anyhow::Result<()> {
//! let engine = RouteOptimizer::from_config(EngineConfig::from_env()?);
//! let plan = engine.optimize_route(&problem, &RunOptions::new()).await?;
//! println!("{} stops planned", plan.summary.assigned_stops);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod services;
pub mod types;

pub use config::EngineConfig;
pub use error::EngineError;
pub use services::routing::{
    HaversineEstimator, MatrixAnnotations, MatrixProvider, OsrmClient, OsrmConfig, RoutingService,
    TravelLeg, TravelMatrix,
};
pub use services::solver::{
    FleetProblem, OptimizedPlan, RouteOptimizer, RunOptions, SingleRouteProblem, Solution,
    SolutionSummary, VehicleRoute,
};
pub use types::{
    Demand, GeoPoint, OptimizationPhase, OptimizationProgress, ProgressSink, Stop, Vehicle,
};
