use log::info;

use crate::config::SimulationConfig;
use crate::controller::ElevatorController;
use crate::floor::FloorSubsystem;
use crate::metrics::RunSummary;
use crate::scheduler::Scheduler;
use crate::transport::UdpTransport;
use crate::types::request::FloorRequest;
use crate::types::state::ElevatorState;
use crate::view::LogView;

/// Outcome of one complete run of the fleet.
#[derive(Debug)]
pub struct SimulationReport {
    /// Requests the scheduler acknowledged.
    pub sent: usize,
    pub summary: RunSummary,
    /// Last snapshot of every car, by id.
    pub elevators: Vec<ElevatorState>,
}

/// Runs the scheduler, every car and the request source in this runtime
/// and waits for all of them to finish.
pub async fn run_simulation(
    config: SimulationConfig,
    requests: Vec<FloorRequest>,
) -> anyhow::Result<SimulationReport> {
    let transport = UdpTransport::bind(config.scheduler_port, config.scheduler_port)
        .await?
        .with_attempts(config.retry_attempts);
    let scheduler = Scheduler::new(transport, &config, Box::new(LogView::new("SCHEDULER")));
    let scheduler = tokio::spawn(scheduler.run());

    let mut cars = Vec::new();
    for id in 1..=config.num_elevators {
        let transport = UdpTransport::bind(0, config.scheduler_port)
            .await?
            .with_attempts(config.retry_attempts);
        let view = LogView::new(format!("ELEVATOR-{id}"));
        let controller = ElevatorController::new(id, &config, transport, view);
        cars.push(tokio::spawn(controller.run()));
    }

    let transport = UdpTransport::bind(config.floor_port, config.scheduler_port)
        .await?
        .with_attempts(config.retry_attempts);
    let floor = tokio::spawn(FloorSubsystem::new(transport, requests, &config).run());

    let sent = floor.await??;
    let mut elevators = Vec::with_capacity(cars.len());
    for car in cars {
        elevators.push(car.await??);
    }
    let summary = scheduler.await??;
    info!("SIMULATION: finished, {sent} requests sent");

    Ok(SimulationReport {
        sent,
        summary,
        elevators,
    })
}
