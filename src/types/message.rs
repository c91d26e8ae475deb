use std::convert::TryFrom;
use std::fmt;

use thiserror::Error;

use crate::types::request::{self, FloorRequest};
use crate::types::state::{DoorState, ElevatorState, MotorState, Status};

pub const REQUEST_BATCH: u8 = 1;
pub const ELEVATOR_STATE: u8 = 2;
pub const FLOOR_REQUEST: u8 = 3;
pub const EMPTY_REPLY: u8 = 4;
pub const REGISTER: u8 = 5;
pub const TERMINATE: u8 = 6;

const ELEVATOR_STATE_LEN: usize = 12;
const FLOOR_REQUEST_LEN: usize = 7;
const REGISTER_LEN: usize = 9;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty datagram")]
    Empty,
    #[error("unknown message kind {0}")]
    UnknownKind(u8),
    #[error("truncated message of kind {kind}: expected {expected} bytes, got {actual}")]
    Truncated {
        kind: u8,
        expected: usize,
        actual: usize,
    },
    #[error("invalid {field} value {value}")]
    InvalidEnum { field: &'static str, value: u8 },
}

/// Everything that travels between the scheduler, the cars and the floor.
///
/// Integers are big-endian. A batch only carries floor pairs, so decoded
/// batch requests always come back with a zero timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    RequestBatch(Vec<FloorRequest>),
    ElevatorState(ElevatorState),
    FloorRequest(FloorRequest),
    EmptyReply,
    Register { id: i32, port: i32 },
    Terminate,
}

impl Message {
    pub fn kind(&self) -> u8 {
        match self {
            Message::RequestBatch(_) => REQUEST_BATCH,
            Message::ElevatorState(_) => ELEVATOR_STATE,
            Message::FloorRequest(_) => FLOOR_REQUEST,
            Message::EmptyReply => EMPTY_REPLY,
            Message::Register { .. } => REGISTER,
            Message::Terminate => TERMINATE,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![self.kind()];
        match self {
            Message::RequestBatch(batch) => {
                for request in batch {
                    out.push(request.source);
                    out.push(request.destination);
                }
            }
            Message::ElevatorState(state) => {
                out.extend_from_slice(&state.id.to_be_bytes());
                out.extend_from_slice(&state.floor.to_be_bytes());
                out.push(state.motor as u8);
                out.push(state.door as u8);
                out.push(state.status as u8);
            }
            Message::FloorRequest(request) => {
                out.extend_from_slice(&request.timestamp.to_be_bytes());
                out.push(request.source);
                out.push(request.destination);
            }
            Message::Register { id, port } => {
                out.extend_from_slice(&id.to_be_bytes());
                out.extend_from_slice(&port.to_be_bytes());
            }
            Message::EmptyReply | Message::Terminate => {}
        }
        out
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 1 }
    }

    fn u8(&mut self) -> u8 {
        let value = self.buf[self.pos];
        self.pos += 1;
        value
    }

    fn i32(&mut self) -> i32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.buf[self.pos..self.pos + 4]);
        self.pos += 4;
        i32::from_be_bytes(bytes)
    }
}

fn require(value: &[u8], expected: usize) -> Result<(), DecodeError> {
    if value.len() < expected {
        return Err(DecodeError::Truncated {
            kind: value[0],
            expected,
            actual: value.len(),
        });
    }
    Ok(())
}

impl TryFrom<&[u8]> for Message {
    type Error = DecodeError;

    fn try_from(value: &[u8]) -> Result<Self, DecodeError> {
        let Some(&kind) = value.first() else {
            return Err(DecodeError::Empty);
        };
        let mut reader = Reader::new(value);

        match kind {
            REQUEST_BATCH => {
                let body = &value[1..];
                if body.len() % 2 != 0 {
                    return Err(DecodeError::Truncated {
                        kind,
                        expected: value.len() + 1,
                        actual: value.len(),
                    });
                }
                let batch = body
                    .chunks_exact(2)
                    .map(|pair| FloorRequest::new(0, pair[0], pair[1]))
                    .collect();
                Ok(Message::RequestBatch(batch))
            }
            ELEVATOR_STATE => {
                require(value, ELEVATOR_STATE_LEN)?;
                let id = reader.i32();
                let floor = reader.i32();
                let motor = MotorState::try_from(reader.u8())?;
                let door = DoorState::try_from(reader.u8())?;
                let status = Status::try_from(reader.u8())?;
                Ok(Message::ElevatorState(ElevatorState {
                    id,
                    floor,
                    motor,
                    door,
                    status,
                }))
            }
            FLOOR_REQUEST => {
                require(value, FLOOR_REQUEST_LEN)?;
                let timestamp = reader.i32();
                let source = reader.u8();
                let destination = reader.u8();
                Ok(Message::FloorRequest(FloorRequest::new(
                    timestamp,
                    source,
                    destination,
                )))
            }
            REGISTER => {
                require(value, REGISTER_LEN)?;
                let id = reader.i32();
                let port = reader.i32();
                Ok(Message::Register { id, port })
            }
            EMPTY_REPLY => Ok(Message::EmptyReply),
            TERMINATE => Ok(Message::Terminate),
            other => Err(DecodeError::UnknownKind(other)),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::RequestBatch(batch) => write!(f, "REQUEST_LIST {}", request::list(batch)),
            Message::ElevatorState(state) => write!(f, "ELEVATOR_STATE {state}"),
            Message::FloorRequest(request) => {
                write!(f, "FLOOR_REQUEST {request} @{}", request.timestamp)
            }
            Message::EmptyReply => write!(f, "EMPTY_REPLY"),
            Message::Register { id, port } => write!(f, "REGISTER id:{id} port:{port}"),
            Message::Terminate => write!(f, "TERMINATE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elevator_state_layout() {
        let state = ElevatorState {
            id: 3,
            floor: 5,
            motor: MotorState::Down,
            door: DoorState::Closed,
            status: Status::Approaching,
        };
        let bytes = Message::ElevatorState(state).encode();
        assert_eq!(bytes, vec![2, 0, 0, 0, 3, 0, 0, 0, 5, 1, 1, 0]);
        assert_eq!(
            Message::try_from(bytes.as_slice()).unwrap(),
            Message::ElevatorState(state)
        );
    }

    #[test]
    fn floor_request_keeps_timestamp() {
        let request = FloorRequest::new(50_715_000, 2, 6);
        let bytes = Message::FloorRequest(request).encode();
        assert_eq!(bytes.len(), 7);
        assert_eq!(&bytes[..5], &[3, 0x03, 0x05, 0xd9, 0x78]);
        assert_eq!(
            Message::try_from(bytes.as_slice()).unwrap(),
            Message::FloorRequest(request)
        );
    }

    #[test]
    fn batch_drops_timestamps() {
        let batch = vec![FloorRequest::new(100, 1, 4), FloorRequest::new(200, 6, 2)];
        let bytes = Message::RequestBatch(batch).encode();
        assert_eq!(bytes, vec![1, 1, 4, 6, 2]);
        assert_eq!(
            Message::try_from(bytes.as_slice()).unwrap(),
            Message::RequestBatch(vec![FloorRequest::new(0, 1, 4), FloorRequest::new(0, 6, 2)])
        );
    }

    #[test]
    fn empty_batch_is_a_single_byte() {
        let bytes = Message::RequestBatch(Vec::new()).encode();
        assert_eq!(bytes, vec![1]);
        assert_eq!(
            Message::try_from(bytes.as_slice()).unwrap(),
            Message::RequestBatch(Vec::new())
        );
    }

    #[test]
    fn register_and_bare_kinds() {
        let bytes = Message::Register { id: 2, port: 50123 }.encode();
        assert_eq!(bytes.len(), 9);
        assert_eq!(
            Message::try_from(bytes.as_slice()).unwrap(),
            Message::Register { id: 2, port: 50123 }
        );
        assert_eq!(Message::EmptyReply.encode(), vec![4]);
        assert_eq!(Message::Terminate.encode(), vec![6]);
        assert_eq!(Message::try_from(&[6u8][..]).unwrap(), Message::Terminate);
    }

    #[test]
    fn extreme_values_survive_encoding() {
        let top = ElevatorState {
            id: i32::MAX,
            floor: 255,
            motor: MotorState::Up,
            door: DoorState::Open,
            status: Status::Broken,
        };
        let bottom = ElevatorState {
            id: i32::MIN,
            floor: 0,
            motor: MotorState::Stopped,
            door: DoorState::Closed,
            status: Status::Arrived,
        };
        let messages = [
            Message::ElevatorState(top),
            Message::ElevatorState(bottom),
            Message::FloorRequest(FloorRequest::new(i32::MIN, 0, 255)),
            Message::FloorRequest(FloorRequest::new(i32::MAX, 255, 0)),
            Message::RequestBatch(vec![FloorRequest::new(0, 0, 255), FloorRequest::new(0, 255, 0)]),
            Message::Register {
                id: i32::MIN,
                port: i32::MAX,
            },
            Message::EmptyReply,
            Message::Terminate,
        ];
        for message in messages {
            let bytes = message.encode();
            assert_eq!(Message::try_from(bytes.as_slice()), Ok(message));
        }
    }

    #[test]
    fn malformed_datagrams_are_rejected() {
        assert_eq!(Message::try_from(&[0u8; 0][..]), Err(DecodeError::Empty));
        assert_eq!(
            Message::try_from(&[9u8][..]),
            Err(DecodeError::UnknownKind(9))
        );
        assert_eq!(
            Message::try_from(&[2u8, 0, 0, 0, 1][..]),
            Err(DecodeError::Truncated {
                kind: 2,
                expected: 12,
                actual: 5
            })
        );
        assert!(matches!(
            Message::try_from(&[1u8, 3][..]),
            Err(DecodeError::Truncated { kind: 1, .. })
        ));
        assert_eq!(
            Message::try_from(&[2u8, 0, 0, 0, 1, 0, 0, 0, 1, 7, 1, 1][..]),
            Err(DecodeError::InvalidEnum {
                field: "motor",
                value: 7
            })
        );
    }
}
