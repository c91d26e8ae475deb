use std::time::Duration;

use log::warn;
use tokio::time::sleep;

use crate::config::Timings;
use crate::types::instruction::Instruction;
use crate::types::state::{DoorState, ElevatorState, MotorState, Status};

/// Physical model of one car.
///
/// Every instruction takes simulated time. Each step is charged against the
/// car's remaining operating time; a step that would exhaust it leaves the
/// car BROKEN and abandons the rest of the instruction.
#[derive(Debug)]
pub struct Elevator {
    id: i32,
    floor: i32,
    motor: MotorState,
    door: DoorState,
    status: Status,
    time_to_failure: Duration,
    timings: Timings,
}

impl Elevator {
    pub fn new(id: i32, time_to_failure: Duration, timings: Timings) -> Self {
        Self {
            id,
            floor: 1,
            motor: MotorState::Stopped,
            door: DoorState::Closed,
            status: Status::Arrived,
            time_to_failure,
            timings,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn state(&self) -> ElevatorState {
        ElevatorState {
            id: self.id,
            floor: self.floor,
            motor: self.motor,
            door: self.door,
            status: self.status,
        }
    }

    pub fn is_broken(&self) -> bool {
        self.status == Status::Broken
    }

    pub fn time_to_failure(&self) -> Duration {
        self.time_to_failure
    }

    pub async fn handle_instruction(&mut self, instruction: Instruction) {
        if self.is_broken() {
            return;
        }
        match instruction {
            Instruction::MoveUp => {
                self.motor = MotorState::Up;
                self.depart().await;
            }
            Instruction::MoveDown => {
                self.motor = MotorState::Down;
                self.depart().await;
            }
            Instruction::Continue => self.keep_moving().await,
            Instruction::Stop => self.stop().await,
            Instruction::Idle => {}
        }
    }

    fn is_approaching_next_floor(&self) -> bool {
        self.status == Status::Arrived && self.motor != MotorState::Stopped
    }

    fn is_arriving_at_floor(&self) -> bool {
        self.status == Status::Approaching && self.motor != MotorState::Stopped
    }

    fn step_floor(&mut self) {
        match self.motor {
            MotorState::Up => self.floor += 1,
            MotorState::Down => self.floor -= 1,
            MotorState::Stopped => {}
        }
    }

    async fn depart(&mut self) {
        if !self.close_doors().await {
            return;
        }
        if !self.spend(self.timings.approach_floor).await {
            return;
        }
        self.status = Status::Approaching;
        self.step_floor();
    }

    async fn keep_moving(&mut self) {
        if self.is_approaching_next_floor() {
            if !self.spend(self.timings.between_floors).await {
                return;
            }
            self.status = Status::Approaching;
            self.step_floor();
        } else if self.is_arriving_at_floor() {
            if !self.spend(self.timings.arrive_at_floor).await {
                return;
            }
            self.status = Status::Arrived;
        }
    }

    async fn stop(&mut self) {
        if self.motor == MotorState::Stopped {
            return;
        }
        // already level with a floor: roll on to the next one first
        if self.status == Status::Arrived {
            self.keep_moving().await;
            if self.is_broken() {
                return;
            }
        }
        if !self.spend(self.timings.decelerate).await {
            return;
        }
        self.status = Status::Arrived;
        self.motor = MotorState::Stopped;
        self.open_doors().await;
    }

    async fn open_doors(&mut self) -> bool {
        if self.door == DoorState::Open {
            return true;
        }
        if !self.spend(self.timings.open_doors).await {
            return false;
        }
        self.door = DoorState::Open;
        true
    }

    async fn close_doors(&mut self) -> bool {
        if self.door == DoorState::Closed {
            return true;
        }
        if !self.spend(self.timings.close_doors).await {
            return false;
        }
        self.door = DoorState::Closed;
        true
    }

    /// Lets `duration` of simulated time pass. Returns false if the car broke
    /// down before it was over.
    async fn spend(&mut self, duration: Duration) -> bool {
        if duration >= self.time_to_failure {
            sleep(self.time_to_failure).await;
            self.time_to_failure = Duration::ZERO;
            self.status = Status::Broken;
            self.motor = MotorState::Stopped;
            warn!("ELEVATOR-{}: broke down at floor {}", self.id, self.floor);
            return false;
        }
        sleep(duration).await;
        self.time_to_failure -= duration;
        true
    }
}
