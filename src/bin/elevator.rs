use clap::Parser;
use elevator_dispatch::config::{self, SimulationConfig};
use elevator_dispatch::controller::ElevatorController;
use elevator_dispatch::transport::UdpTransport;
use elevator_dispatch::view::LogView;

/// One elevator car. Registers with the scheduler and runs until told to stop.
#[derive(Debug, Parser)]
#[command(name = "elevator")]
struct Args {
    #[arg(long)]
    id: i32,

    #[arg(long, default_value_t = config::SCHEDULER_PORT)]
    scheduler_port: u16,

    #[arg(long, default_value_t = config::NUM_FLOORS)]
    floors: u8,

    /// Scales every movement and door timing.
    #[arg(long, default_value_t = 1.0)]
    speed: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = SimulationConfig {
        scheduler_port: args.scheduler_port,
        num_floors: args.floors,
        ..SimulationConfig::default()
    }
    .with_speed(args.speed);

    let transport = UdpTransport::bind(0, config.scheduler_port)
        .await?
        .with_attempts(config.retry_attempts);
    let view = LogView::new(format!("ELEVATOR-{}", args.id));
    let last = ElevatorController::new(args.id, &config, transport, view)
        .run()
        .await?;
    println!("{last}");
    Ok(())
}
