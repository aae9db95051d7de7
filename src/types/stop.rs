//! Delivery stop types

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

use super::GeoPoint;

/// Demand of a stop: packages to deliver and their combined weight.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demand {
    /// Number of packages
    pub package_count: u32,
    /// Total weight in kilograms
    pub weight_kg: f64,
}

impl Demand {
    pub fn new(package_count: u32, weight_kg: f64) -> Self {
        Self {
            package_count,
            weight_kg,
        }
    }

    /// Element-wise sum, used for cumulative route loads.
    pub fn plus(&self, other: &Demand) -> Demand {
        Demand {
            package_count: self.package_count + other.package_count,
            weight_kg: self.weight_kg + other.weight_kg,
        }
    }

    /// Weight must be a finite non-negative number (count is non-negative
    /// by type).
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.weight_kg.is_finite() || self.weight_kg < 0.0 {
            return Err(EngineError::invalid(format!(
                "demand weight must be non-negative, got {}",
                self.weight_kg
            )));
        }
        Ok(())
    }
}

/// A delivery stop. Never mutated by the engine; visiting order is expressed
/// by position in output sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    /// Unique identifier within one optimization request
    pub id: String,
    /// Delivery location
    pub location: GeoPoint,
    /// Display address
    #[serde(default)]
    pub address: String,
    /// Packages and weight to deliver at this stop
    #[serde(default)]
    pub demand: Demand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demand_plus_accumulates() {
        let a = Demand::new(2, 10.0);
        let b = Demand::new(3, 4.5);
        let sum = a.plus(&b);
        assert_eq!(sum.package_count, 5);
        assert!((sum.weight_kg - 14.5).abs() < 1e-10);
    }

    #[test]
    fn test_demand_negative_weight_rejected() {
        assert!(Demand::new(1, -0.5).validate().is_err());
        assert!(Demand::new(1, f64::NAN).validate().is_err());
        assert!(Demand::new(0, 0.0).validate().is_ok());
    }

    #[test]
    fn test_stop_deserializes_with_default_demand() {
        let json = r#"{
            "id": "stop-1",
            "location": {"lat": 50.0, "lng": 14.0},
            "address": "Vodičkova 12, Praha"
        }"#;

        let stop: Stop = serde_json::from_str(json).unwrap();
        assert_eq!(stop.id, "stop-1");
        assert_eq!(stop.demand.package_count, 0);
        assert!((stop.demand.weight_kg - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stop_serializes_camel_case() {
        let stop = Stop {
            id: "stop-9".to_string(),
            location: GeoPoint { lat: 49.2, lng: 16.6 },
            address: "Brno".to_string(),
            demand: Demand::new(4, 12.0),
        };

        let json = serde_json::to_string(&stop).unwrap();
        assert!(json.contains("\"packageCount\":4"));
        assert!(json.contains("\"weightKg\":12.0"));
    }
}
