use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::types::geo::GeoPoint;
use crate::types::stop::Demand;

/// Vehicle available for fleet optimization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Unique identifier
    pub id: Uuid,
    /// Display name, e.g. "Van 2"
    pub name: String,
    /// Maximum total weight the vehicle can carry (kg)
    pub capacity_weight_kg: f64,
    /// Maximum number of packages the vehicle can carry
    pub capacity_count: u32,
    /// Depot where the vehicle starts and ends its route
    pub depot: GeoPoint,
}

impl Vehicle {
    /// Whether the vehicle can carry the given load within both capacity axes.
    pub fn can_carry(&self, load: &Demand) -> bool {
        load.weight_kg <= self.capacity_weight_kg && load.package_count <= self.capacity_count
    }

    /// Validate capacities and depot coordinates.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.depot.validate()?;
        if !self.capacity_weight_kg.is_finite() || self.capacity_weight_kg < 0.0 {
            return Err(EngineError::invalid(format!(
                "vehicle '{}' has invalid weight capacity: {}",
                self.name, self.capacity_weight_kg
            )));
        }
        Ok(())
    }
}
