use std::fmt;

use crate::types::message::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MotorState {
    Up = 0,
    Down = 1,
    Stopped = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DoorState {
    Open = 0,
    Closed = 1,
}

/// Where the car is relative to the floor it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    Approaching = 0,
    Arrived = 1,
    Broken = 2,
}

impl TryFrom<u8> for MotorState {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(MotorState::Up),
            1 => Ok(MotorState::Down),
            2 => Ok(MotorState::Stopped),
            other => Err(DecodeError::InvalidEnum {
                field: "motor",
                value: other,
            }),
        }
    }
}

impl TryFrom<u8> for DoorState {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(DoorState::Open),
            1 => Ok(DoorState::Closed),
            other => Err(DecodeError::InvalidEnum {
                field: "door",
                value: other,
            }),
        }
    }
}

impl TryFrom<u8> for Status {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(Status::Approaching),
            1 => Ok(Status::Arrived),
            2 => Ok(Status::Broken),
            other => Err(DecodeError::InvalidEnum {
                field: "status",
                value: other,
            }),
        }
    }
}

impl fmt::Display for MotorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorState::Up => write!(f, "UP"),
            MotorState::Down => write!(f, "DOWN"),
            MotorState::Stopped => write!(f, "STOPPED"),
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoorState::Open => write!(f, "OPEN"),
            DoorState::Closed => write!(f, "CLOSED"),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Approaching => write!(f, "APPROACHING"),
            Status::Arrived => write!(f, "ARRIVED"),
            Status::Broken => write!(f, "BROKEN"),
        }
    }
}

/// Snapshot of one car, as reported to the scheduler every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElevatorState {
    pub id: i32,
    pub floor: i32,
    pub motor: MotorState,
    pub door: DoorState,
    pub status: Status,
}

impl ElevatorState {
    pub fn has_stopped(&self) -> bool {
        self.motor == MotorState::Stopped
    }

    pub fn is_broken(&self) -> bool {
        self.status == Status::Broken
    }

    /// Narrates what changed between `self` and `next`.
    pub fn describe_change(&self, next: &ElevatorState) -> String {
        if next.is_broken() {
            return format!("BROKEN at floor {}", next.floor);
        }
        if self.motor != next.motor {
            if next.status == Status::Approaching {
                return format!(
                    "Moving {} and {} floor {}",
                    next.motor, next.status, next.floor
                );
            }
            if next.has_stopped() {
                return format!("{} at floor {}", next.motor, next.floor);
            }
            return format!(
                "Moving {} and {} at floor {}",
                next.motor, next.status, next.floor
            );
        }
        if self.door != next.door {
            return format!("Doors are now {}", next.door);
        }
        if next.status == Status::Approaching {
            return format!("{} floor {}", next.status, next.floor);
        }
        format!("{} at floor {}", next.status, next.floor)
    }
}

impl fmt::Display for ElevatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id:{} | motor:{} | doors:{} | {} | floor:{}",
            self.id, self.motor, self.door, self.status, self.floor
        )
    }
}
