use std::fmt;

use crate::types::request::{self, Direction, FloorRequest};

/// The two request sets held for one car.
///
/// `assigned` requests are still waiting at their source floor, `in_service`
/// ones have boarded. Both the scheduler and the car keep a copy and apply
/// the same direction-continuity rules to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSets {
    pub assigned: Vec<FloorRequest>,
    pub in_service: Vec<FloorRequest>,
}

impl RequestSets {
    pub fn len(&self) -> usize {
        self.assigned.len() + self.in_service.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty() && self.in_service.is_empty()
    }

    /// True if the oldest boarded request or the oldest assigned request
    /// travels in `direction`. Both directions can hold at once.
    pub fn is_heading(&self, direction: Direction) -> bool {
        let first_matches =
            |requests: &[FloorRequest]| requests.first().is_some_and(|r| r.direction() == direction);
        first_matches(&self.in_service) || first_matches(&self.assigned)
    }

    pub fn has_work_below(&self, floor: i32) -> bool {
        self.in_service
            .iter()
            .any(|request| request.destination_floor() < floor)
            || self
                .assigned
                .iter()
                .any(|request| request.source_floor() < floor)
    }

    pub fn has_work_above(&self, floor: i32) -> bool {
        self.in_service
            .iter()
            .any(|request| request.destination_floor() > floor)
            || self
                .assigned
                .iter()
                .any(|request| request.source_floor() > floor)
    }

    pub fn is_destination(&self, floor: i32) -> bool {
        self.in_service
            .iter()
            .any(|request| request.destination_floor() == floor)
    }

    pub fn is_source(&self, floor: i32) -> bool {
        self.assigned
            .iter()
            .any(|request| request.source_floor() == floor)
    }

    /// Files a new request for a car currently at `floor`: a passenger
    /// already standing there boards straight away.
    pub fn place(&mut self, request: FloorRequest, floor: i32) {
        if request.source_floor() == floor {
            self.in_service.push(request);
        } else {
            self.assigned.push(request);
        }
    }

    /// Moves everyone waiting at `floor` on board and returns them.
    pub fn board(&mut self, floor: i32) -> Vec<FloorRequest> {
        let (boarding, waiting): (Vec<_>, Vec<_>) = self
            .assigned
            .drain(..)
            .partition(|request| request.source_floor() == floor);
        self.assigned = waiting;
        self.in_service.extend(boarding.iter().copied());
        boarding
    }

    /// Drops everyone whose destination is `floor` and returns them.
    pub fn alight(&mut self, floor: i32) -> Vec<FloorRequest> {
        let (arrived, riding): (Vec<_>, Vec<_>) = self
            .in_service
            .drain(..)
            .partition(|request| request.destination_floor() == floor);
        self.in_service = riding;
        arrived
    }
}

impl fmt::Display for RequestSets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "In service --> {} Assigned --> {}",
            request::list(&self.in_service),
            request::list(&self.assigned)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(source: u8, destination: u8) -> FloorRequest {
        FloorRequest::new(0, source, destination)
    }

    #[test]
    fn heading_looks_at_the_oldest_request_of_each_set() {
        let mut sets = RequestSets::default();
        assert!(!sets.is_heading(Direction::Up));
        assert!(!sets.is_heading(Direction::Down));

        sets.assigned.push(req(6, 2));
        assert!(sets.is_heading(Direction::Down));
        assert!(!sets.is_heading(Direction::Up));

        sets.in_service.push(req(1, 4));
        assert!(sets.is_heading(Direction::Up));
        assert!(sets.is_heading(Direction::Down));
    }

    #[test]
    fn work_above_and_below() {
        let sets = RequestSets {
            assigned: vec![req(2, 6)],
            in_service: vec![req(4, 7)],
        };
        assert!(sets.has_work_below(3));
        assert!(sets.has_work_above(3));
        assert!(!sets.has_work_below(2));
        assert!(!sets.has_work_above(7));
        assert!(sets.is_source(2));
        assert!(sets.is_destination(7));
        assert!(!sets.is_destination(6));
    }

    #[test]
    fn place_boards_passengers_at_the_current_floor() {
        let mut sets = RequestSets::default();
        sets.place(req(3, 5), 3);
        sets.place(req(1, 5), 3);
        assert_eq!(sets.in_service, vec![req(3, 5)]);
        assert_eq!(sets.assigned, vec![req(1, 5)]);
    }

    #[test]
    fn board_then_alight_moves_requests_through() {
        let mut sets = RequestSets {
            assigned: vec![req(2, 5), req(4, 1)],
            in_service: vec![req(1, 2)],
        };

        assert_eq!(sets.alight(2), vec![req(1, 2)]);
        assert_eq!(sets.board(2), vec![req(2, 5)]);
        assert_eq!(sets.in_service, vec![req(2, 5)]);
        assert_eq!(sets.assigned, vec![req(4, 1)]);
        assert_eq!(sets.len(), 2);

        assert!(sets.alight(3).is_empty());
        assert_eq!(sets.alight(5), vec![req(2, 5)]);
        assert!(!sets.is_empty());
    }
}
