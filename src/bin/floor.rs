use std::path::PathBuf;

use clap::Parser;
use elevator_dispatch::config::{self, SimulationConfig};
use elevator_dispatch::floor::{FloorSubsystem, load_requests};
use elevator_dispatch::transport::UdpTransport;

/// Request source: replays a request file to the scheduler.
#[derive(Debug, Parser)]
#[command(name = "floor")]
struct Args {
    #[arg(long, default_value = config::REQUEST_FILE)]
    requests: PathBuf,

    #[arg(long, default_value_t = config::FLOOR_PORT)]
    port: u16,

    #[arg(long, default_value_t = config::SCHEDULER_PORT)]
    scheduler_port: u16,

    #[arg(long, default_value_t = config::NUM_FLOORS)]
    floors: u8,

    /// Scales the gaps between requests.
    #[arg(long, default_value_t = 1.0)]
    speed: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = SimulationConfig {
        floor_port: args.port,
        scheduler_port: args.scheduler_port,
        num_floors: args.floors,
        ..SimulationConfig::default()
    }
    .with_speed(args.speed);

    let requests = load_requests(&args.requests, config.num_floors)?;
    let transport = UdpTransport::bind(config.floor_port, config.scheduler_port)
        .await?
        .with_attempts(config.retry_attempts);
    let sent = FloorSubsystem::new(transport, requests, &config).run().await?;
    println!("{sent} requests sent");
    Ok(())
}
