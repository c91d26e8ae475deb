use std::time::Duration;

use elevator_dispatch::config::{FailureBudget, SimulationConfig};
use elevator_dispatch::floor::parse_requests;
use elevator_dispatch::simulation::run_simulation;
use elevator_dispatch::types::state::MotorState;

const REQUESTS: &str = "\
00:00:00.0 2 Up 4
00:00:01.0 6 Down 1
00:00:01.5 1 Up 7
00:00:03.0 5 Down 3
00:00:03.0 3 Up 6
00:00:04.0 7 Down 2
";

#[tokio::test(flavor = "multi_thread")]
async fn every_request_is_delivered_and_every_process_exits() {
    let config = SimulationConfig {
        scheduler_port: 51050,
        floor_port: 51060,
        num_elevators: 2,
        failure_budget: FailureBudget::never(),
        ..SimulationConfig::default()
    }
    .with_speed(0.01);
    let requests = parse_requests(REQUESTS, config.num_floors).unwrap();
    let expected = requests.len();

    let report = tokio::time::timeout(Duration::from_secs(60), run_simulation(config, requests))
        .await
        .expect("simulation did not finish")
        .unwrap();

    assert_eq!(report.sent, expected);
    assert_eq!(report.summary.completions.len(), expected);
    assert!(report.summary.average.is_some());
    assert_eq!(report.elevators.len(), 2);
    for state in &report.elevators {
        assert!(!state.is_broken());
        assert_eq!(state.motor, MotorState::Stopped);
    }
}
