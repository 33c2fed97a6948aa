//! AMACAD Simulator - deterministic multi-vehicle clustering runs
//!
//! - `run` - Run one scenario and print the final clusters
//! - `suite` - Run every scenario with the same parameters
//! - `list` - List available scenarios

mod network;
mod scenarios;
mod vehicle;

use amacad_core::ClusterConfig;
use clap::{Args, Parser, Subcommand};
use network::NetworkConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "amacad-sim")]
#[command(about = "Deterministic simulator for AMACAD vehicle clustering")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Radio and protocol parameters shared by `run` and `suite`
#[derive(Args, Debug)]
struct NetworkArgs {
    /// Number of vehicles
    #[arg(short = 'n', long, default_value = "10")]
    vehicles: usize,

    /// RNG seed for start jitter and loss
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Radio range in metres
    #[arg(long, default_value = "250")]
    range: f64,

    /// One-hop latency in milliseconds
    #[arg(long, default_value = "5")]
    latency_ms: u64,

    /// Per-delivery loss probability
    #[arg(long, default_value = "0")]
    loss: f64,

    /// Clustering parameters as JSON
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl NetworkArgs {
    fn network_config(&self) -> Result<NetworkConfig, Box<dyn std::error::Error>> {
        let cluster = match &self.config {
            Some(path) => ClusterConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => ClusterConfig::default(),
        };

        if !(0.0..=1.0).contains(&self.loss) {
            return Err(format!("loss must be within [0, 1], got {}", self.loss).into());
        }

        Ok(NetworkConfig {
            range: self.range,
            latency: Duration::from_millis(self.latency_ms),
            loss: self.loss,
            seed: self.seed,
            cluster,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario
    Run {
        /// Scenario to run
        #[arg(short, long, default_value = "convoy")]
        scenario: String,

        #[command(flatten)]
        network: NetworkArgs,

        /// Write the results as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run every scenario
    Suite {
        #[command(flatten)]
        network: NetworkArgs,
    },

    /// List available scenarios
    List,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            network,
            output,
        } => {
            let scenario_config = scenarios::get_scenario(&scenario, network.vehicles)?;
            info!("{}: {}", scenario_config.name, scenario_config.description);

            let results = scenarios::run_scenario(&scenario_config, network.network_config()?)?;

            println!("\nScenario {} ({} vehicles, seed {})", results.scenario, results.vehicles, results.seed);
            print!("{}", results.snapshot);
            println!("  clusters started: {}, handoffs: {}", results.heads_started, results.handoffs);
            println!(
                "  packets delivered: {}, lost: {}, out of range: {}",
                results.traffic.delivered, results.traffic.lost, results.traffic.out_of_range
            );

            if let Some(path) = output {
                std::fs::write(&path, serde_json::to_string_pretty(&results)?)?;
                info!("Results written to: {}", path.display());
            }
        }

        Commands::Suite { network } => {
            println!("\nScenario Suite Results:");
            for (name, _) in scenarios::SCENARIOS {
                let scenario_config = scenarios::get_scenario(name, network.vehicles)?;
                let results = scenarios::run_scenario(&scenario_config, network.network_config()?)?;
                let snap = &results.snapshot;
                println!(
                    "  {:<13} heads={:<3} members={:<3} unclustered={:<3} orphans={:<3} handoffs={}",
                    name,
                    snap.heads.len(),
                    snap.members.len(),
                    snap.unclustered.len(),
                    snap.orphans().len(),
                    results.handoffs
                );
            }
        }

        Commands::List => {
            println!("Available scenarios:");
            for (name, description) in scenarios::SCENARIOS {
                println!("  {:<13} {}", name, description);
            }
        }
    }

    Ok(())
}
