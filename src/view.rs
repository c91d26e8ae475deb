use std::collections::BTreeMap;

use log::debug;

use crate::strategy::RequestSets;
use crate::types::request::{self, FloorRequest};
use crate::types::state::{DoorState, MotorState, Status};

/// Read-only observer of one car.
pub trait ElevatorView: Send {
    fn set_motor_state(&mut self, motor: MotorState);
    fn set_door_state(&mut self, door: DoorState);
    fn set_floor(&mut self, floor: i32, status: Status, lamps: &BTreeMap<i32, bool>);
    fn terminate(&mut self, floor: i32);
}

/// Read-only observer of the scheduler's bookkeeping.
pub trait SchedulerView: Send {
    fn update_waitlist(&mut self, waitlist: &[FloorRequest]);
    fn update_elevators(&mut self, requests: &BTreeMap<i32, RequestSets>);
}

/// Renders lamps as `P:1--4---`, one slot per floor.
pub fn lamp_panel(lamps: &BTreeMap<i32, bool>) -> String {
    let mut panel = String::from("P:");
    for (floor, lit) in lamps {
        if *lit {
            panel.push_str(&floor.to_string());
        } else {
            panel.push('-');
        }
    }
    panel
}

/// Writes every update to the `log` facade at debug level.
#[derive(Debug, Clone)]
pub struct LogView {
    label: String,
}

impl LogView {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl ElevatorView for LogView {
    fn set_motor_state(&mut self, motor: MotorState) {
        debug!("{} motor: {motor}", self.label);
    }

    fn set_door_state(&mut self, door: DoorState) {
        debug!("{} doors: {door}", self.label);
    }

    fn set_floor(&mut self, floor: i32, status: Status, lamps: &BTreeMap<i32, bool>) {
        debug!(
            "{} floor {floor} {status} {}",
            self.label,
            lamp_panel(lamps)
        );
    }

    fn terminate(&mut self, floor: i32) {
        debug!("{} out of service at floor {floor}", self.label);
    }
}

impl SchedulerView for LogView {
    fn update_waitlist(&mut self, waitlist: &[FloorRequest]) {
        let mut sorted = waitlist.to_vec();
        sorted.sort_by_key(|request| request.timestamp);
        debug!("{} waitlist: {}", self.label, request::list(&sorted));
    }

    fn update_elevators(&mut self, requests: &BTreeMap<i32, RequestSets>) {
        for (id, sets) in requests {
            debug!("{} elevator {id}: {sets}", self.label);
        }
    }
}
