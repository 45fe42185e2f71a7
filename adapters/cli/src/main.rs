#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a generated Delve scene headlessly.

mod config;
mod presentation;

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use delve_core::{Heuristic, SearchAlgorithm};
use delve_system_actors::Supervisor;
use delve_world::{generate, query, Outcome, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{config::GameConfig, presentation::TracingPresentation};

/// Command-line options for the headless runner.
#[derive(Debug, Parser)]
#[command(name = "delve", version, about = "Watch the autopilot play a generated scene")]
struct Cli {
    /// TOML file with rules, scene, timing and search settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for scene generation and wandering.
    #[arg(long)]
    seed: Option<u64>,
    /// Search algorithm of the player autopilot.
    #[arg(long, value_enum)]
    algorithm: Option<AlgorithmArg>,
    /// Distance estimate used by A*.
    #[arg(long, value_enum)]
    heuristic: Option<HeuristicArg>,
    /// Wall-clock limit of the run in seconds.
    #[arg(long)]
    max_seconds: Option<u64>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum AlgorithmArg {
    Bfs,
    Dfs,
    Astar,
}

impl From<AlgorithmArg> for SearchAlgorithm {
    fn from(value: AlgorithmArg) -> Self {
        match value {
            AlgorithmArg::Bfs => SearchAlgorithm::BreadthFirst,
            AlgorithmArg::Dfs => SearchAlgorithm::DepthFirst,
            AlgorithmArg::Astar => SearchAlgorithm::AStar,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum HeuristicArg {
    Manhattan,
    Diagonal,
    Euclidean,
}

impl From<HeuristicArg> for Heuristic {
    fn from(value: HeuristicArg) -> Self {
        match value {
            HeuristicArg::Manhattan => Heuristic::Manhattan,
            HeuristicArg::Diagonal => Heuristic::Diagonal,
            HeuristicArg::Euclidean => Heuristic::Euclidean,
        }
    }
}

impl Cli {
    fn resolve(self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(algorithm) = self.algorithm {
            config.search.autopilot = algorithm.into();
        }
        if let Some(heuristic) = self.heuristic {
            config.search.heuristic = heuristic.into();
        }
        if let Some(max_seconds) = self.max_seconds {
            config.max_seconds = max_seconds;
        }
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn run(config: &GameConfig) -> Result<Option<Outcome>> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let layout = generate(&config.scene, &mut rng).context("scene generation failed")?;

    let presentation = Arc::new(TracingPresentation::default());
    let world = Arc::new(
        World::from_layout(&layout, config.rules.clone(), presentation.clone())
            .context("generated layout was rejected")?,
    );
    info!("{}", query::welcome_banner(&world));

    let supervisor = Supervisor::launch(
        Arc::clone(&world),
        config.timing,
        config.search,
        config.seed,
    )
    .context("failed to start scene threads")?;

    let outcome = supervisor.wait(config.time_limit());
    if outcome.is_none() {
        warn!(limit = ?config.time_limit(), "time limit reached without an outcome");
    }
    let _ = supervisor.shutdown();

    if let Some(status) = query::player_status(&world) {
        info!(
            health = status.health,
            gems = status.gems,
            cell = %status.cell,
            redraws = presentation.redraws(),
            "final player status"
        );
    }
    Ok(outcome)
}

/// Entry point for the Delve command-line interface.
fn main() -> Result<ExitCode> {
    init_tracing();
    let config = Cli::parse().resolve()?;
    let outcome = run(&config)?;

    let code = match outcome {
        Some(Outcome::Won) => {
            println!("victory");
            ExitCode::SUCCESS
        }
        Some(Outcome::Lost) => {
            println!("defeat");
            ExitCode::from(1)
        }
        None => {
            println!("undecided");
            ExitCode::from(2)
        }
    };
    Ok(code)
}
