//! Geographic calculations

use crate::types::GeoPoint;

/// Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Road distance coefficient (straight line to road)
const ROAD_COEFFICIENT: f64 = 1.3;

/// Average speed in km/h for travel time estimation
const AVERAGE_SPEED_KMH: f64 = 40.0;

/// Calculate Haversine distance between two points in kilometers
pub fn haversine_distance(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Estimate road distance in kilometers from straight-line distance
pub fn road_distance(from: &GeoPoint, to: &GeoPoint) -> f64 {
    haversine_distance(from, to) * ROAD_COEFFICIENT
}

/// Estimate road distance between two points in whole meters
pub fn estimate_distance_meters(from: &GeoPoint, to: &GeoPoint) -> u64 {
    (road_distance(from, to) * 1000.0).round() as u64
}

/// Estimate travel time between two points in whole seconds,
/// assuming average driving speed over the estimated road distance
pub fn estimate_duration_seconds(from: &GeoPoint, to: &GeoPoint) -> u64 {
    (road_distance(from, to) / AVERAGE_SPEED_KMH * 3600.0).round() as u64
}

/// Derive travel time in whole seconds from a known road distance in meters
pub fn duration_from_distance_meters(distance_meters: u64) -> u64 {
    (distance_meters as f64 / 1000.0 / AVERAGE_SPEED_KMH * 3600.0).round() as u64
}

/// Derive road distance in whole meters from a known travel time in seconds
pub fn distance_from_duration_seconds(duration_seconds: u64) -> u64 {
    (duration_seconds as f64 / 3600.0 * AVERAGE_SPEED_KMH * 1000.0).round() as u64
}
