//! Geographic primitives

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A geographic point in the engine's (lat, lng) model order.
///
/// OSRM URL path segments want (lng, lat); that swap happens only at the
/// client boundary, never here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Create a validated point.
    pub fn new(lat: f64, lng: f64) -> Result<Self, EngineError> {
        let point = Self { lat, lng };
        point.validate()?;
        Ok(point)
    }

    /// Check coordinate ranges: lat ∈ [-90, 90], lng ∈ [-180, 180], both finite.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(EngineError::invalid(format!(
                "latitude {} out of range [-90, 90]",
                self.lat
            )));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(EngineError::invalid(format!(
                "longitude {} out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}
