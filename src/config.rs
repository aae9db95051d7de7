//! Engine configuration

use anyhow::{bail, Result};

/// Default ceiling on locations per matrix request.
/// Mirrors OSRM's default `max-table-size` so the engine rejects oversized
/// requests before the routing service would.
pub const DEFAULT_MAX_MATRIX_LOCATIONS: usize = 100;

/// Default timeout for a full table request in seconds.
pub const DEFAULT_MATRIX_TIMEOUT_SECONDS: u64 = 10;

/// Default timeout for a single point-to-point lookup in seconds.
pub const DEFAULT_LEG_TIMEOUT_SECONDS: u64 = 3;

/// Default fuel cost per kilometre (currency units).
pub const DEFAULT_FUEL_COST_PER_KM: f64 = 6.5;

/// Default CO₂ emission factor in kilograms per kilometre
/// (typical light commercial vehicle).
pub const DEFAULT_CO2_KG_PER_KM: f64 = 0.192;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// OSRM routing server URL (optional, engine falls back to the haversine
    /// estimator when unset or unreachable)
    pub osrm_url: Option<String>,

    /// OSRM routing profile segment ("driving", "truck", ...)
    pub osrm_profile: String,

    /// Maximum number of locations accepted per matrix request
    pub max_matrix_locations: usize,

    /// Timeout for full table requests, in seconds
    pub matrix_timeout_seconds: u64,

    /// Timeout for single-pair route lookups, in seconds
    pub leg_timeout_seconds: u64,

    /// Estimated fuel cost per kilometre driven
    pub fuel_cost_per_km: f64,

    /// Estimated CO₂ emissions in kg per kilometre driven
    pub co2_kg_per_km: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            osrm_url: None,
            osrm_profile: "driving".to_string(),
            max_matrix_locations: DEFAULT_MAX_MATRIX_LOCATIONS,
            matrix_timeout_seconds: DEFAULT_MATRIX_TIMEOUT_SECONDS,
            leg_timeout_seconds: DEFAULT_LEG_TIMEOUT_SECONDS,
            fuel_cost_per_km: DEFAULT_FUEL_COST_PER_KM,
            co2_kg_per_km: DEFAULT_CO2_KG_PER_KM,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let osrm_url = std::env::var("OSRM_URL").ok().filter(|s| !s.is_empty());

        let osrm_profile = std::env::var("OSRM_PROFILE")
            .unwrap_or_else(|_| "driving".to_string());

        let max_matrix_locations =
            env_number("MATRIX_MAX_LOCATIONS", DEFAULT_MAX_MATRIX_LOCATIONS)?;
        let matrix_timeout_seconds =
            env_number("MATRIX_TIMEOUT_SECONDS", DEFAULT_MATRIX_TIMEOUT_SECONDS)?;
        let leg_timeout_seconds =
            env_number("LEG_TIMEOUT_SECONDS", DEFAULT_LEG_TIMEOUT_SECONDS)?;
        let fuel_cost_per_km = env_number("FUEL_COST_PER_KM", DEFAULT_FUEL_COST_PER_KM)?;
        let co2_kg_per_km = env_number("CO2_KG_PER_KM", DEFAULT_CO2_KG_PER_KM)?;

        let config = Self {
            osrm_url,
            osrm_profile,
            max_matrix_locations,
            matrix_timeout_seconds,
            leg_timeout_seconds,
            fuel_cost_per_km,
            co2_kg_per_km,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_matrix_locations < 2 {
            bail!(
                "MATRIX_MAX_LOCATIONS must be at least 2 (current: {})",
                self.max_matrix_locations
            );
        }
        if self.matrix_timeout_seconds == 0 || self.leg_timeout_seconds == 0 {
            bail!("matrix and leg timeouts must be at least 1 second");
        }
        if !self.fuel_cost_per_km.is_finite() || self.fuel_cost_per_km < 0.0 {
            bail!(
                "FUEL_COST_PER_KM must be a non-negative number (current: {})",
                self.fuel_cost_per_km
            );
        }
        if !self.co2_kg_per_km.is_finite() || self.co2_kg_per_km < 0.0 {
            bail!(
                "CO2_KG_PER_KM must be a non-negative number (current: {})",
                self.co2_kg_per_km
            );
        }
        Ok(())
    }
}

/// Parse a numeric environment variable, falling back to `default` when unset.
fn env_number<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => Ok(value),
            Err(e) => bail!("{} is not a valid number ({}): {}", name, raw, e),
        },
        Err(_) => Ok(default),
    }
}
