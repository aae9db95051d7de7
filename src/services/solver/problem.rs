//! Optimization problem types

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::{GeoPoint, Stop, Vehicle};

/// Single-vehicle sequencing problem: order the stops from one depot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleRouteProblem {
    /// Starting point of the route
    pub depot: GeoPoint,
    /// Stops to visit, in caller order
    pub stops: Vec<Stop>,
}

impl SingleRouteProblem {
    /// Validate the problem before any computation or network call.
    pub fn validate(&self, max_matrix_locations: usize) -> Result<(), EngineError> {
        self.depot.validate()?;
        validate_stops(&self.stops, max_matrix_locations)
    }
}

/// Multi-vehicle partitioning problem: split the stops across a fleet
///
/// All vehicles must share one depot; the travel matrix carries a single
/// depot location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetProblem {
    /// Stops to distribute, in caller order
    pub stops: Vec<Stop>,
    /// Available vehicles; order breaks assignment ties
    pub fleet: Vec<Vehicle>,
}

impl FleetProblem {
    /// Validate the problem before any computation or network call.
    pub fn validate(&self, max_matrix_locations: usize) -> Result<(), EngineError> {
        if self.fleet.is_empty() {
            return Err(EngineError::invalid("fleet must contain at least one vehicle"));
        }

        for vehicle in &self.fleet {
            vehicle.validate()?;
        }

        let depot = self.fleet[0].depot;
        for vehicle in &self.fleet[1..] {
            if vehicle.depot != depot {
                return Err(EngineError::invalid(format!(
                    "vehicle '{}' has a different depot; all vehicles must share one depot",
                    vehicle.name
                )));
            }
        }

        validate_stops(&self.stops, max_matrix_locations)
    }

    /// Depot shared by the whole fleet. Valid only after [`validate`].
    ///
    /// [`validate`]: FleetProblem::validate
    pub fn depot(&self) -> GeoPoint {
        self.fleet[0].depot
    }
}

fn validate_stops(stops: &[Stop], max_matrix_locations: usize) -> Result<(), EngineError> {
    // Depot occupies one matrix slot
    if stops.len() + 1 > max_matrix_locations {
        return Err(EngineError::invalid(format!(
            "{} stops plus depot exceed the matrix limit of {} locations",
            stops.len(),
            max_matrix_locations
        )));
    }

    let mut seen = HashSet::new();
    for stop in stops {
        stop.location.validate()?;
        stop.demand.validate()?;
        if !seen.insert(stop.id.as_str()) {
            return Err(EngineError::invalid(format!(
                "duplicate stop id '{}'",
                stop.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Demand;
    use uuid::Uuid;

    fn prague() -> GeoPoint {
        GeoPoint::new(50.0755, 14.4378).unwrap()
    }

    fn make_stop(id: &str, lat: f64, lng: f64) -> Stop {
        Stop {
            id: id.to_string(),
            location: GeoPoint { lat, lng },
            address: format!("Address {}", id),
            demand: Demand::new(1, 5.0),
        }
    }

    fn make_vehicle(name: &str, depot: GeoPoint) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            name: name.to_string(),
            capacity_weight_kg: 100.0,
            capacity_count: 20,
            depot,
        }
    }

    #[test]
    fn test_single_route_problem_valid() {
        let problem = SingleRouteProblem {
            depot: prague(),
            stops: vec![make_stop("a", 50.1, 14.5), make_stop("b", 50.2, 14.6)],
        };
        assert!(problem.validate(100).is_ok());
    }

    #[test]
    fn test_single_route_problem_empty_stops_valid() {
        let problem = SingleRouteProblem {
            depot: prague(),
            stops: vec![],
        };
        assert!(problem.validate(100).is_ok());
    }

    #[test]
    fn test_duplicate_stop_ids_rejected() {
        let problem = SingleRouteProblem {
            depot: prague(),
            stops: vec![make_stop("a", 50.1, 14.5), make_stop("a", 50.2, 14.6)],
        };
        let err = problem.validate(100).unwrap_err();
        assert!(err.to_string().contains("duplicate stop id"));
    }

    #[test]
    fn test_matrix_limit_counts_depot() {
        let problem = SingleRouteProblem {
            depot: prague(),
            stops: vec![
                make_stop("a", 50.1, 14.5),
                make_stop("b", 50.2, 14.6),
                make_stop("c", 50.3, 14.7),
            ],
        };
        // 3 stops + depot = 4 locations
        assert!(problem.validate(4).is_ok());
        assert!(problem.validate(3).is_err());
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let problem = SingleRouteProblem {
            depot: prague(),
            stops: vec![make_stop("a", 95.0, 14.5)],
        };
        assert!(problem.validate(100).is_err());
    }

    #[test]
    fn test_fleet_problem_requires_vehicles() {
        let problem = FleetProblem {
            stops: vec![make_stop("a", 50.1, 14.5)],
            fleet: vec![],
        };
        let err = problem.validate(100).unwrap_err();
        assert!(err.to_string().contains("at least one vehicle"));
    }

    #[test]
    fn test_fleet_problem_rejects_differing_depots() {
        let problem = FleetProblem {
            stops: vec![make_stop("a", 50.1, 14.5)],
            fleet: vec![
                make_vehicle("Van 1", prague()),
                make_vehicle("Van 2", GeoPoint::new(49.1951, 16.6068).unwrap()),
            ],
        };
        let err = problem.validate(100).unwrap_err();
        assert!(err.to_string().contains("different depot"));
    }

    #[test]
    fn test_fleet_problem_shared_depot_ok() {
        let problem = FleetProblem {
            stops: vec![make_stop("a", 50.1, 14.5)],
            fleet: vec![make_vehicle("Van 1", prague()), make_vehicle("Van 2", prague())],
        };
        assert!(problem.validate(100).is_ok());
        assert_eq!(problem.depot(), prague());
    }

    #[test]
    fn test_fleet_problem_negative_demand_rejected() {
        let mut stop = make_stop("a", 50.1, 14.5);
        stop.demand = Demand::new(1, -2.0);
        let problem = FleetProblem {
            stops: vec![stop],
            fleet: vec![make_vehicle("Van 1", prague())],
        };
        assert!(problem.validate(100).is_err());
    }

    #[test]
    fn test_problem_deserializes_camel_case() {
        let json = r#"{
            "depot": {"lat": 50.0755, "lng": 14.4378},
            "stops": [{
                "id": "s1",
                "location": {"lat": 50.1, "lng": 14.5},
                "address": "Andel, Praha",
                "demand": {"packageCount": 2, "weightKg": 7.5}
            }]
        }"#;

        let problem: SingleRouteProblem = serde_json::from_str(json).unwrap();
        assert_eq!(problem.stops.len(), 1);
        assert_eq!(problem.stops[0].demand.package_count, 2);
    }
}
