use std::fmt;
use std::fmt::Display;

/// What the control loop tells the car to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    MoveUp,
    MoveDown,
    Stop,
    Continue,
    Idle,
}

impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::MoveUp => write!(f, "MOVE_UP"),
            Instruction::MoveDown => write!(f, "MOVE_DOWN"),
            Instruction::Stop => write!(f, "STOP"),
            Instruction::Continue => write!(f, "CONTINUE"),
            Instruction::Idle => write!(f, "IDLE"),
        }
    }
}
