//! CLI argument parsing for the cargopilot-engine binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use cargopilot_engine::GeoPoint;

#[derive(Parser)]
#[command(
    name = "cargopilot-engine",
    about = "CargoPilot route and fleet optimization engine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Optimize a problem file and print the plan as JSON
    Solve {
        /// Path to the problem JSON file
        #[arg(long)]
        input: PathBuf,
        /// Treat the input as a fleet problem (multi-vehicle partitioning)
        #[arg(long)]
        fleet: bool,
        /// Print progress events to stderr while solving
        #[arg(long)]
        progress: bool,
    },
    /// Look up travel distance and time between two coordinates
    Leg {
        /// Origin as "lat,lng"
        #[arg(long)]
        from: String,
        /// Destination as "lat,lng"
        #[arg(long)]
        to: String,
    },
}

/// Parse a "lat,lng" pair as given on the command line.
pub fn parse_point(raw: &str) -> Result<GeoPoint> {
    let (lat, lng) = raw
        .split_once(',')
        .with_context(|| format!("Expected \"lat,lng\", got {raw:?}"))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Invalid latitude {lat:?}"))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .with_context(|| format!("Invalid longitude {lng:?}"))?;
    Ok(GeoPoint::new(lat, lng)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_solve_command_parses() {
        let cli = Cli::parse_from(["cargopilot-engine", "solve", "--input", "problem.json"]);
        match cli.command {
            Command::Solve {
                input,
                fleet,
                progress,
            } => {
                assert_eq!(input, PathBuf::from("problem.json"));
                assert!(!fleet);
                assert!(!progress);
            }
            _ => panic!("expected solve command"),
        }
    }

    #[test]
    fn test_cli_solve_fleet_flag_parses() {
        let cli = Cli::parse_from([
            "cargopilot-engine",
            "solve",
            "--input",
            "fleet.json",
            "--fleet",
            "--progress",
        ]);
        match cli.command {
            Command::Solve { fleet, progress, .. } => {
                assert!(fleet);
                assert!(progress);
            }
            _ => panic!("expected solve command"),
        }
    }

    #[test]
    fn test_cli_leg_command_parses() {
        let cli = Cli::parse_from([
            "cargopilot-engine",
            "leg",
            "--from",
            "50.0755,14.4378",
            "--to",
            "49.1951,16.6068",
        ]);
        match cli.command {
            Command::Leg { from, to } => {
                assert_eq!(from, "50.0755,14.4378");
                assert_eq!(to, "49.1951,16.6068");
            }
            _ => panic!("expected leg command"),
        }
    }

    #[test]
    fn test_cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["cargopilot-engine"]).is_err());
    }

    #[test]
    fn test_parse_point_accepts_lat_lng() {
        let point = parse_point("50.0755, 14.4378").unwrap();
        assert!((point.lat - 50.0755).abs() < f64::EPSILON);
        assert!((point.lng - 14.4378).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_point_rejects_garbage() {
        assert!(parse_point("fifty,fourteen").is_err());
        assert!(parse_point("50.0755").is_err());
        assert!(parse_point("95.0,14.0").is_err());
    }
}
