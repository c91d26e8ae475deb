use clap::Parser;
use elevator_dispatch::config::{self, SimulationConfig};
use elevator_dispatch::scheduler::Scheduler;
use elevator_dispatch::transport::UdpTransport;
use elevator_dispatch::view::LogView;

/// Central scheduler: assigns floor requests to the registered cars.
#[derive(Debug, Parser)]
#[command(name = "scheduler")]
struct Args {
    #[arg(long, default_value_t = config::SCHEDULER_PORT)]
    port: u16,

    /// Port the request source listens on for acknowledgments.
    #[arg(long, default_value_t = config::FLOOR_PORT)]
    floor_port: u16,

    #[arg(long, default_value_t = config::NUM_FLOORS)]
    floors: u8,

    /// Most requests one car may hold at a time.
    #[arg(long, default_value_t = config::MAX_CAPACITY)]
    capacity: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = SimulationConfig {
        scheduler_port: args.port,
        floor_port: args.floor_port,
        num_floors: args.floors,
        capacity: args.capacity,
        ..SimulationConfig::default()
    };

    let transport = UdpTransport::bind(config.scheduler_port, config.scheduler_port).await?;
    let scheduler = Scheduler::new(transport, &config, Box::new(LogView::new("SCHEDULER")));
    let summary = scheduler.run().await?;
    println!("{summary}");
    Ok(())
}
