//! cargopilot-engine - route and fleet optimization CLI.
//!
//! Reads a problem snapshot from JSON, runs the requested solver and prints
//! the plan to stdout. Logs go to stderr so the JSON output stays pipeable.

mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cargopilot_engine::{
    EngineConfig, FleetProblem, MatrixProvider, ProgressSink, RouteOptimizer, RunOptions,
    SingleRouteProblem,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,cargopilot_engine=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();
    let config = EngineConfig::from_env()?;

    match cli.command {
        cli::Command::Solve {
            input,
            fleet,
            progress,
        } => solve(&input, fleet, progress, config).await,
        cli::Command::Leg { from, to } => leg(&from, &to, config).await,
    }
}

async fn solve(input: &Path, fleet: bool, progress: bool, config: EngineConfig) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read problem file {}", input.display()))?;

    let engine = RouteOptimizer::from_config(config);
    info!("Routing backend: {}", engine.provider_name());

    let mut options = RunOptions::new();
    if progress {
        let sink: ProgressSink = Box::new(|event| {
            eprintln!(
                "[{}] {}/{} {}%",
                event.phase.as_str(),
                event.current_step,
                event.total_steps,
                event.percent
            );
        });
        options = options.with_progress(sink);
    }

    let plan = if fleet {
        let problem: FleetProblem =
            serde_json::from_str(&raw).context("Failed to parse fleet problem JSON")?;
        engine.optimize_fleet(&problem, &options).await?
    } else {
        let problem: SingleRouteProblem =
            serde_json::from_str(&raw).context("Failed to parse route problem JSON")?;
        engine.optimize_route(&problem, &options).await?
    };

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

async fn leg(from: &str, to: &str, config: EngineConfig) -> Result<()> {
    let from = cli::parse_point(from)?;
    let to = cli::parse_point(to)?;

    let provider = MatrixProvider::from_config(&config);
    info!("Routing backend: {}", provider.name());
    let leg = provider.route_leg(&from, &to).await;

    println!("{}", serde_json::to_string_pretty(&leg)?);
    Ok(())
}
