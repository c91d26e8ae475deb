use log::warn;
use tower::BoxError;
use tower::filter::Predicate;

use crate::types::message::Message;
use crate::types::request::FloorRequest;

/// Rejects messages that name floors the building does not have.
#[derive(Debug, Clone, Copy)]
pub struct FloorBounds {
    num_floors: u8,
}

impl FloorBounds {
    pub fn new(num_floors: u8) -> Self {
        Self { num_floors }
    }

    fn contains(&self, floor: i32) -> bool {
        (1..=i32::from(self.num_floors)).contains(&floor)
    }

    fn accepts(&self, request: &FloorRequest) -> bool {
        request.source != request.destination
            && self.contains(request.source_floor())
            && self.contains(request.destination_floor())
    }
}

impl Predicate<Message> for FloorBounds {
    type Request = Message;

    fn check(&mut self, message: Message) -> Result<Self::Request, BoxError> {
        let valid = match &message {
            Message::FloorRequest(request) => self.accepts(request),
            Message::RequestBatch(batch) => batch.iter().all(|request| self.accepts(request)),
            Message::ElevatorState(state) => self.contains(state.floor),
            Message::EmptyReply | Message::Register { .. } | Message::Terminate => true,
        };
        if !valid {
            warn!("rejecting out-of-range message: {message}");
            return Err(BoxError::from("floor out of range"));
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::state::{DoorState, ElevatorState, MotorState, Status};

    #[test]
    fn checks_request_floors() {
        let mut bounds = FloorBounds::new(7);
        let ok = Message::FloorRequest(FloorRequest::new(0, 1, 7));
        assert_eq!(bounds.check(ok.clone()).unwrap(), ok);
        assert!(bounds.check(Message::FloorRequest(FloorRequest::new(0, 0, 3))).is_err());
        assert!(bounds.check(Message::FloorRequest(FloorRequest::new(0, 2, 8))).is_err());
        assert!(bounds.check(Message::FloorRequest(FloorRequest::new(0, 4, 4))).is_err());
        assert!(
            bounds
                .check(Message::RequestBatch(vec![
                    FloorRequest::new(0, 1, 2),
                    FloorRequest::new(0, 9, 2)
                ]))
                .is_err()
        );
    }

    #[test]
    fn checks_reported_floor() {
        let mut bounds = FloorBounds::new(7);
        let state = |floor| {
            Message::ElevatorState(ElevatorState {
                id: 1,
                floor,
                motor: MotorState::Stopped,
                door: DoorState::Closed,
                status: Status::Arrived,
            })
        };
        assert!(bounds.check(state(7)).is_ok());
        assert!(bounds.check(state(0)).is_err());
        assert!(bounds.check(Message::Terminate).is_ok());
    }
}
