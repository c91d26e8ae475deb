use std::time::Duration;

use log::{info, warn};

use crate::config::SimulationConfig;
use crate::context::ElevatorContext;
use crate::elevator::Elevator;
use crate::transport::Transport;
use crate::types::message::Message;
use crate::types::state::ElevatorState;
use crate::view::ElevatorView;

/// Control loop of one car process.
///
/// Each cycle reports the car's snapshot to the scheduler, folds the reply
/// into the local request sets, then decides and applies the next instruction.
pub struct ElevatorController<T, V> {
    elevator: Elevator,
    context: ElevatorContext,
    transport: T,
    view: V,
    running: bool,
    active_poll_timeout: Duration,
    reply_timeout: Duration,
}

impl<T, V> ElevatorController<T, V>
where
    T: Transport,
    V: ElevatorView,
{
    pub fn new(id: i32, config: &SimulationConfig, transport: T, view: V) -> Self {
        let elevator = Elevator::new(id, config.failure_budget.sample(), config.timings);
        Self {
            elevator,
            context: ElevatorContext::new(config.num_floors),
            transport,
            view,
            running: true,
            active_poll_timeout: config.active_poll_timeout,
            reply_timeout: config.reply_timeout,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<ElevatorState> {
        let id = self.elevator.id();
        self.register().await;

        while self.running || self.context.has_requests() {
            if !self.running && self.elevator.is_broken() {
                break;
            }
            let before = self.elevator.state();

            let reply = if self.running {
                let timeout = self.poll_timeout(&before);
                self.transport
                    .call_and_wait(&Message::ElevatorState(before), timeout)
                    .await
            } else {
                None
            };

            match reply {
                Some(Message::RequestBatch(batch)) => {
                    for request in batch {
                        self.context.accept(request, &before);
                    }
                }
                Some(Message::Terminate) => {
                    info!("ELEVATOR-{id}: Received terminate");
                    self.running = false;
                    if self.elevator.is_broken() {
                        break;
                    }
                }
                Some(other) => warn!("ELEVATOR-{id}: unexpected reply {other}"),
                None if self.running => {
                    warn!("ELEVATOR-{id}: scheduler unreachable, finishing current passengers");
                    self.running = false;
                }
                None => {}
            }

            let instruction = self.context.next_instruction(&before);
            self.elevator.handle_instruction(instruction).await;
            let after = self.elevator.state();
            self.context.board_and_alight(&after);

            if after != before {
                let change = before.describe_change(&after);
                info!("ELEVATOR-{id}: {change:<60} || {}", self.context.requests());
            }
            self.publish(&before, &after);
        }

        let last = self.elevator.state();
        if !last.is_broken() {
            self.view.terminate(last.floor);
        }
        self.transport.close();
        info!("ELEVATOR-{id}: Terminated at floor {}", last.floor);
        Ok(last)
    }

    async fn register(&mut self) {
        let id = self.elevator.id();
        let register = Message::Register {
            id,
            port: i32::from(self.transport.local_port()),
        };
        match self
            .transport
            .call_and_wait(&register, Some(self.reply_timeout))
            .await
        {
            Some(_) => info!("ELEVATOR-{id}: Registered on port {}", self.transport.local_port()),
            None => {
                warn!("ELEVATOR-{id}: registration was not acknowledged, scheduler unreachable");
                self.running = false;
            }
        }
    }

    /// A parked car with nothing to do waits for the scheduler indefinitely.
    fn poll_timeout(&self, state: &ElevatorState) -> Option<Duration> {
        if state.has_stopped() && !self.context.has_requests() {
            None
        } else {
            Some(self.active_poll_timeout)
        }
    }

    fn publish(&mut self, before: &ElevatorState, after: &ElevatorState) {
        if before.motor != after.motor {
            self.view.set_motor_state(after.motor);
        }
        if before.door != after.door {
            self.view.set_door_state(after.door);
        }
        self.view
            .set_floor(after.floor, after.status, self.context.lamps());
    }
}
