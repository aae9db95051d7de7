//! OSRM routing engine client
//!
//! OSRM HTTP API documentation:
//! https://project-osrm.org/docs/v5.24.0/api/#table-service

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::services::geo::{distance_from_duration_seconds, duration_from_distance_meters};
use crate::types::GeoPoint;
use super::{MatrixAnnotations, RoutingService, TravelLeg, TravelMatrix, UNREACHABLE_COST};

/// OSRM client configuration
#[derive(Debug, Clone)]
pub struct OsrmConfig {
    /// Base URL of the OSRM server (e.g., "http://localhost:5000")
    pub base_url: String,
    /// Routing profile in the request path (e.g., "driving")
    pub profile: String,
    /// Timeout for table requests in seconds
    pub matrix_timeout_seconds: u64,
    /// Timeout for single-leg route requests in seconds
    pub leg_timeout_seconds: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "driving".to_string(),
            matrix_timeout_seconds: 10,
            leg_timeout_seconds: 3,
        }
    }
}

impl OsrmConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// OSRM routing client
pub struct OsrmClient {
    client: Client,
    config: OsrmConfig,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.matrix_timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Build the table service URL for the full pairwise matrix
    fn build_table_url(&self, locations: &[GeoPoint], annotations: MatrixAnnotations) -> String {
        format!(
            "{}/table/v1/{}/{}?annotations={}",
            self.config.base_url,
            self.config.profile,
            format_coordinate_path(locations),
            annotations.query_value()
        )
    }

    /// Build the route service URL for a single origin/destination pair
    fn build_route_url(&self, from: &GeoPoint, to: &GeoPoint) -> String {
        format!(
            "{}/route/v1/{}/{}?overview=false",
            self.config.base_url,
            self.config.profile,
            format_coordinate_path(&[*from, *to])
        )
    }
}

/// Format coordinates for the OSRM request path.
/// OSRM expects (longitude, latitude) pairs, opposite of the model order.
fn format_coordinate_path(locations: &[GeoPoint]) -> String {
    locations
        .iter()
        .map(|p| format!("{},{}", p.lng, p.lat))
        .collect::<Vec<_>>()
        .join(";")
}

#[async_trait]
impl RoutingService for OsrmClient {
    async fn build_matrix(
        &self,
        locations: &[GeoPoint],
        annotations: MatrixAnnotations,
    ) -> Result<TravelMatrix> {
        let n = locations.len();

        if n == 0 {
            return Ok(TravelMatrix::empty());
        }

        if n == 1 {
            return Ok(TravelMatrix {
                distances: vec![vec![0]],
                durations: vec![vec![0]],
                reachable: vec![vec![true]],
                size: 1,
                estimated: false,
            });
        }

        let url = self.build_table_url(locations, annotations);

        debug!("Requesting travel matrix from OSRM for {} locations", n);

        let response = self.client
            .get(&url)
            .send()
            .await
            .context("Failed to send table request to OSRM")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OSRM table returned error {}: {}", status, body);
        }

        let table: TableResponse = response
            .json()
            .await
            .context("Failed to parse OSRM table response")?;

        if table.code != "Ok" {
            anyhow::bail!(
                "OSRM table returned code {}: {}",
                table.code,
                table.message.unwrap_or_default()
            );
        }

        let matrix = matrix_from_response(n, table)?;

        debug!("Received travel matrix from OSRM: {}x{}", n, n);

        Ok(matrix)
    }

    async fn route_leg(&self, from: &GeoPoint, to: &GeoPoint) -> Result<TravelLeg> {
        let url = self.build_route_url(from, to);

        debug!("Requesting single leg from OSRM");

        let response = self.client
            .get(&url)
            .timeout(std::time::Duration::from_secs(self.config.leg_timeout_seconds))
            .send()
            .await
            .context("Failed to send route request to OSRM")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OSRM route returned error {}: {}", status, body);
        }

        let route: RouteResponse = response
            .json()
            .await
            .context("Failed to parse OSRM route response")?;

        if route.code != "Ok" {
            anyhow::bail!(
                "OSRM route returned code {}: {}",
                route.code,
                route.message.unwrap_or_default()
            );
        }

        let best = route
            .routes
            .first()
            .ok_or_else(|| anyhow::anyhow!("OSRM returned no routes for the pair"))?;

        Ok(TravelLeg {
            distance_meters: best.distance.round() as u64,
            duration_seconds: best.duration.round() as u64,
            estimated: false,
        })
    }

    fn name(&self) -> &str {
        "OSRM"
    }
}

/// Convert an OSRM table response into a [`TravelMatrix`].
///
/// A `null` cell in either requested matrix means no road connection; the
/// cell keeps [`UNREACHABLE_COST`] and is flagged unreachable. When only one
/// annotation was requested, the missing matrix is derived from the other
/// with the average-speed model.
fn matrix_from_response(n: usize, table: TableResponse) -> Result<TravelMatrix> {
    if table.durations.is_none() && table.distances.is_none() {
        anyhow::bail!("OSRM table response carried neither durations nor distances");
    }

    check_shape("durations", &table.durations, n)?;
    check_shape("distances", &table.distances, n)?;

    let mut distances = vec![vec![0u64; n]; n];
    let mut durations = vec![vec![0u64; n]; n];
    let mut reachable = vec![vec![true; n]; n];

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }

            let duration_cell = table.durations.as_ref().map(|rows| rows[i][j]);
            let distance_cell = table.distances.as_ref().map(|rows| rows[i][j]);

            match (duration_cell, distance_cell) {
                (Some(Some(t)), Some(Some(d))) => {
                    durations[i][j] = t.round() as u64;
                    distances[i][j] = d.round() as u64;
                }
                (Some(Some(t)), None) => {
                    let seconds = t.round() as u64;
                    durations[i][j] = seconds;
                    distances[i][j] = distance_from_duration_seconds(seconds);
                }
                (None, Some(Some(d))) => {
                    let meters = d.round() as u64;
                    distances[i][j] = meters;
                    durations[i][j] = duration_from_distance_meters(meters);
                }
                _ => {
                    warn!("No route for pair {} -> {}", i, j);
                    distances[i][j] = UNREACHABLE_COST;
                    durations[i][j] = UNREACHABLE_COST;
                    reachable[i][j] = false;
                }
            }
        }
    }

    Ok(TravelMatrix {
        distances,
        durations,
        reachable,
        size: n,
        estimated: false,
    })
}

fn check_shape(name: &str, matrix: &Option<Vec<Vec<Option<f64>>>>, n: usize) -> Result<()> {
    if let Some(rows) = matrix {
        if rows.len() != n || rows.iter().any(|row| row.len() != n) {
            anyhow::bail!("OSRM {} matrix has wrong shape, expected {}x{}", name, n, n);
        }
    }
    Ok(())
}

// OSRM API types

#[derive(Debug, Deserialize)]
struct TableResponse {
    code: String,
    message: Option<String>,
    /// Durations in seconds; `null` cells mean no route
    durations: Option<Vec<Vec<Option<f64>>>>,
    /// Distances in meters; `null` cells mean no route
    distances: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    message: Option<String>,
    routes: Vec<RouteSummary>,
}

#[derive(Debug, Deserialize)]
struct RouteSummary {
    /// Distance in meters
    distance: f64,
    /// Duration in seconds
    duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prague() -> GeoPoint {
        GeoPoint::new(50.0755, 14.4378).unwrap()
    }

    fn brno() -> GeoPoint {
        GeoPoint::new(49.1951, 16.6068).unwrap()
    }

    #[test]
    fn test_osrm_config_default() {
        let config = OsrmConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.profile, "driving");
        assert_eq!(config.matrix_timeout_seconds, 10);
        assert_eq!(config.leg_timeout_seconds, 3);
    }

    #[test]
    fn test_osrm_config_custom() {
        let config = OsrmConfig::new("http://osrm:5000");
        assert_eq!(config.base_url, "http://osrm:5000");
    }

    #[test]
    fn test_build_table_url_longitude_first() {
        let client = OsrmClient::new(OsrmConfig::default());
        let url = client.build_table_url(&[prague(), brno()], MatrixAnnotations::Both);

        // Path segments are (lng, lat) even though the model is (lat, lng)
        assert_eq!(
            url,
            "http://localhost:5000/table/v1/driving/14.4378,50.0755;16.6068,49.1951?annotations=duration,distance"
        );
    }

    #[test]
    fn test_build_table_url_single_annotation() {
        let client = OsrmClient::new(OsrmConfig::default());
        let url = client.build_table_url(&[prague(), brno()], MatrixAnnotations::Duration);
        assert!(url.ends_with("?annotations=duration"));
    }

    #[test]
    fn test_build_route_url() {
        let client = OsrmClient::new(OsrmConfig::default());
        let url = client.build_route_url(&prague(), &brno());

        assert_eq!(
            url,
            "http://localhost:5000/route/v1/driving/14.4378,50.0755;16.6068,49.1951?overview=false"
        );
    }

    #[test]
    fn test_osrm_client_name() {
        let client = OsrmClient::new(OsrmConfig::default());
        assert_eq!(client.name(), "OSRM");
    }

    #[test]
    fn test_matrix_from_response_both_annotations() {
        let json = r#"{
            "code": "Ok",
            "durations": [[0, 120.4], [130.6, 0]],
            "distances": [[0, 1500.2], [1600.8, 0]]
        }"#;
        let table: TableResponse = serde_json::from_str(json).unwrap();

        let matrix = matrix_from_response(2, table).unwrap();

        assert_eq!(matrix.duration(0, 1), 120);
        assert_eq!(matrix.duration(1, 0), 131);
        assert_eq!(matrix.distance(0, 1), 1500);
        assert_eq!(matrix.distance(1, 0), 1601);
        assert!(!matrix.estimated);
        assert!(!matrix.has_unreachable_cells());
    }

    #[test]
    fn test_matrix_from_response_null_cell_is_unreachable() {
        let json = r#"{
            "code": "Ok",
            "durations": [[0, null], [130.0, 0]],
            "distances": [[0, 1500.0], [1600.0, 0]]
        }"#;
        let table: TableResponse = serde_json::from_str(json).unwrap();

        let matrix = matrix_from_response(2, table).unwrap();

        assert!(!matrix.is_reachable(0, 1));
        assert_eq!(matrix.distance(0, 1), UNREACHABLE_COST);
        assert_eq!(matrix.duration(0, 1), UNREACHABLE_COST);

        // The reverse direction is untouched
        assert!(matrix.is_reachable(1, 0));
        assert_eq!(matrix.distance(1, 0), 1600);
    }

    #[test]
    fn test_matrix_from_response_derives_missing_distances() {
        let json = r#"{
            "code": "Ok",
            "durations": [[0, 3600.0], [3600.0, 0]]
        }"#;
        let table: TableResponse = serde_json::from_str(json).unwrap();

        let matrix = matrix_from_response(2, table).unwrap();

        assert_eq!(matrix.duration(0, 1), 3600);
        // One hour at the 40 km/h model speed
        assert_eq!(matrix.distance(0, 1), 40_000);
    }

    #[test]
    fn test_matrix_from_response_derives_missing_durations() {
        let json = r#"{
            "code": "Ok",
            "distances": [[0, 40000.0], [40000.0, 0]]
        }"#;
        let table: TableResponse = serde_json::from_str(json).unwrap();

        let matrix = matrix_from_response(2, table).unwrap();

        assert_eq!(matrix.distance(0, 1), 40_000);
        assert_eq!(matrix.duration(0, 1), 3600);
    }

    #[test]
    fn test_matrix_from_response_rejects_empty_payload() {
        let json = r#"{"code": "Ok"}"#;
        let table: TableResponse = serde_json::from_str(json).unwrap();
        assert!(matrix_from_response(2, table).is_err());
    }

    #[test]
    fn test_matrix_from_response_rejects_wrong_shape() {
        let json = r#"{
            "code": "Ok",
            "durations": [[0, 60.0]]
        }"#;
        let table: TableResponse = serde_json::from_str(json).unwrap();
        assert!(matrix_from_response(2, table).is_err());
    }

    #[tokio::test]
    #[ignore = "Requires running OSRM server"]
    async fn test_osrm_integration_prague_brno_matrix() {
        let client = OsrmClient::new(OsrmConfig::new("http://localhost:5000"));

        let matrix = client
            .build_matrix(&[prague(), brno()], MatrixAnnotations::Both)
            .await
            .unwrap();

        assert_eq!(matrix.size, 2);

        // Prague to Brno is ~205 km by road
        let distance_km = matrix.distance(0, 1) as f64 / 1000.0;
        assert!(distance_km > 190.0 && distance_km < 230.0,
            "Expected ~205 km, got {} km", distance_km);

        // Travel time should be ~2 hours
        let duration_hours = matrix.duration(0, 1) as f64 / 3600.0;
        assert!(duration_hours > 1.5 && duration_hours < 3.0,
            "Expected ~2 hours, got {} hours", duration_hours);
    }

    #[tokio::test]
    #[ignore = "Requires running OSRM server"]
    async fn test_osrm_integration_single_leg() {
        let client = OsrmClient::new(OsrmConfig::new("http://localhost:5000"));

        let leg = client.route_leg(&prague(), &brno()).await.unwrap();

        assert!(!leg.estimated);
        assert!(leg.distance_meters > 190_000);
        assert!(leg.duration_seconds > 3600);
    }
}
