use std::path::PathBuf;

use clap::Parser;
use elevator_dispatch::config::{self, SimulationConfig};
use elevator_dispatch::floor::load_requests;
use elevator_dispatch::simulation::run_simulation;

/// Runs the scheduler, every car and the request source in one process.
#[derive(Debug, Parser)]
#[command(name = "simulation")]
struct Args {
    #[arg(long, default_value = config::REQUEST_FILE)]
    requests: PathBuf,

    #[arg(long, default_value_t = config::NUM_ELEVATORS)]
    elevators: i32,

    #[arg(long, default_value_t = config::NUM_FLOORS)]
    floors: u8,

    #[arg(long, default_value_t = config::MAX_CAPACITY)]
    capacity: usize,

    /// Scales every timing, e.g. 0.1 runs ten times faster.
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Cars never break down.
    #[arg(long)]
    no_failures: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let mut config = SimulationConfig {
        num_elevators: args.elevators,
        num_floors: args.floors,
        capacity: args.capacity,
        request_file: args.requests,
        ..SimulationConfig::default()
    };
    if args.no_failures {
        config.failure_budget = config::FailureBudget::never();
    }
    let config = config.with_speed(args.speed);

    let requests = load_requests(&config.request_file, config.num_floors)?;
    let report = run_simulation(config, requests).await?;
    println!("{}", report.summary);
    for state in &report.elevators {
        println!("{state}");
    }
    Ok(())
}
