use std::collections::BTreeMap;

use log::info;

use crate::strategy::RequestSets;
use crate::types::instruction::Instruction;
use crate::types::request::{Direction, FloorRequest};
use crate::types::state::{ElevatorState, MotorState};

/// What a car knows about its own passengers, and the in-car floor lamps.
#[derive(Debug, Default)]
pub struct ElevatorContext {
    requests: RequestSets,
    lamps: BTreeMap<i32, bool>,
}

impl ElevatorContext {
    pub fn new(num_floors: u8) -> Self {
        Self {
            requests: RequestSets::default(),
            lamps: (1..=i32::from(num_floors)).map(|floor| (floor, false)).collect(),
        }
    }

    pub fn requests(&self) -> &RequestSets {
        &self.requests
    }

    pub fn lamps(&self) -> &BTreeMap<i32, bool> {
        &self.lamps
    }

    pub fn has_requests(&self) -> bool {
        !self.requests.is_empty()
    }

    /// Takes a request handed over by the scheduler.
    pub fn accept(&mut self, request: FloorRequest, state: &ElevatorState) {
        self.requests.place(request, state.floor);
        if request.source_floor() == state.floor {
            self.light(request.destination_floor());
        }
        info!("ELEVATOR-{}: Received Floor Request: {request}", state.id);
    }

    pub fn next_instruction(&self, state: &ElevatorState) -> Instruction {
        if state.is_broken() {
            return Instruction::Idle;
        }
        let floor = state.floor;

        if state.has_stopped() {
            if self.requests.has_work_below(floor) {
                return Instruction::MoveDown;
            }
            if self.requests.has_work_above(floor) {
                return Instruction::MoveUp;
            }
            return Instruction::Idle;
        }

        if self.requests.is_destination(floor) {
            return Instruction::Stop;
        }

        if self.requests.is_source(floor) {
            let stop = match state.motor {
                MotorState::Down => {
                    self.requests.is_heading(Direction::Down) || !self.requests.has_work_below(floor)
                }
                MotorState::Up => {
                    self.requests.is_heading(Direction::Up) || !self.requests.has_work_above(floor)
                }
                MotorState::Stopped => false,
            };
            if stop {
                return Instruction::Stop;
            }
        }

        Instruction::Continue
    }

    /// Passengers get on and off while the car stands at a floor.
    pub fn board_and_alight(&mut self, state: &ElevatorState) {
        if !state.has_stopped() {
            return;
        }
        let floor = state.floor;
        for boarded in self.requests.board(floor) {
            self.light(boarded.destination_floor());
        }
        self.requests.alight(floor);
        if let Some(lamp) = self.lamps.get_mut(&floor) {
            *lamp = false;
        }
    }

    fn light(&mut self, floor: i32) {
        if let Some(lamp) = self.lamps.get_mut(&floor) {
            *lamp = true;
        }
    }
}
