//! Optimization progress reporting types
//!
//! Progress is emitted as a stream of snapshots. Each snapshot carries the
//! current phase, step counters within that phase, and an overall percent
//! that never decreases across the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phase of an optimization run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizationPhase {
    BuildingMatrix,
    Sequencing,
    ComputingMetrics,
}

impl OptimizationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationPhase::BuildingMatrix => "building-matrix",
            OptimizationPhase::Sequencing => "sequencing",
            OptimizationPhase::ComputingMetrics => "computing-metrics",
        }
    }
}

/// Progress snapshot emitted during an optimization run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationProgress {
    /// Current phase
    pub phase: OptimizationPhase,
    /// Completed steps within the current phase
    pub current_step: usize,
    /// Total steps in the current phase
    pub total_steps: usize,
    /// Overall run completion, 0-100, monotonically non-decreasing
    pub percent: u8,
    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,
}

impl OptimizationProgress {
    pub fn new(
        phase: OptimizationPhase,
        current_step: usize,
        total_steps: usize,
        percent: u8,
    ) -> Self {
        Self {
            phase,
            current_step,
            total_steps,
            percent,
            timestamp: Utc::now(),
        }
    }
}

/// Callback receiving progress snapshots during a run.
///
/// Must be cheap; the solver invokes it synchronously on its own task.
pub type ProgressSink = Box<dyn Fn(OptimizationProgress) + Send + Sync>;
