use std::collections::BTreeMap;

use log::{info, warn};

use crate::metrics::{LatencyMetrics, RunSummary};
use crate::strategy::RequestSets;
use crate::types::message::Message;
use crate::types::request::{self, Direction, FloorRequest};
use crate::types::state::ElevatorState;
use crate::view::SchedulerView;

/// A reply the decision loop has to put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub message: Message,
    pub port: u16,
}

impl Outbound {
    fn new(message: Message, port: u16) -> Self {
        Self { message, port }
    }
}

/// Fleet-wide dispatch state, owned by the scheduler's decision loop.
///
/// Every request is held by exactly one of: the waitlist, one car's
/// assigned set, one car's in-service set. `handle` never does I/O; it
/// returns the datagrams to send.
pub struct Dispatcher {
    capacity: usize,
    floor_port: u16,
    accepting: bool,
    registered_any: bool,
    elevators: BTreeMap<i32, ElevatorState>,
    ports: BTreeMap<i32, u16>,
    requests: BTreeMap<i32, RequestSets>,
    waitlist: Vec<FloorRequest>,
    metrics: LatencyMetrics,
    view: Box<dyn SchedulerView>,
}

impl Dispatcher {
    pub fn new(capacity: usize, floor_port: u16, view: Box<dyn SchedulerView>) -> Self {
        Self {
            capacity,
            floor_port,
            accepting: true,
            registered_any: false,
            elevators: BTreeMap::new(),
            ports: BTreeMap::new(),
            requests: BTreeMap::new(),
            waitlist: Vec::new(),
            metrics: LatencyMetrics::new(),
            view,
        }
    }

    pub fn waitlist(&self) -> &[FloorRequest] {
        &self.waitlist
    }

    pub fn requests(&self, id: i32) -> Option<&RequestSets> {
        self.requests.get(&id)
    }

    pub fn port(&self, id: i32) -> Option<u16> {
        self.ports.get(&id).copied()
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// No request is waiting, assigned or on board anywhere.
    pub fn is_finished(&self) -> bool {
        self.waitlist.is_empty() && self.requests.values().all(RequestSets::is_empty)
    }

    /// Every car that ever registered has since been sent away.
    pub fn all_elevators_gone(&self) -> bool {
        self.registered_any && self.ports.is_empty()
    }

    pub fn should_exit(&self) -> bool {
        (!self.accepting && self.is_finished()) || self.all_elevators_gone()
    }

    pub fn summary(&self) -> RunSummary {
        self.metrics.summary()
    }

    pub fn handle(&mut self, message: Message) -> Vec<Outbound> {
        match message {
            Message::FloorRequest(request) => self.handle_floor_request(request),
            Message::ElevatorState(state) if state.is_broken() => self.handle_broken(state),
            Message::ElevatorState(state) => self.handle_state(state),
            Message::Register { id, port } => self.handle_register(id, port),
            Message::Terminate => {
                info!("SCHEDULER: Received terminate.");
                self.accepting = false;
                vec![Outbound::new(Message::EmptyReply, self.floor_port)]
            }
            other => {
                warn!("SCHEDULER: Unexpected message {other}");
                Vec::new()
            }
        }
    }

    /// Terminates every registered car that has nothing left to do.
    pub fn shutdown(&mut self) -> Vec<Outbound> {
        let idle: Vec<i32> = self
            .ports
            .keys()
            .copied()
            .filter(|id| self.is_waiting(*id))
            .collect();
        idle.into_iter()
            .filter_map(|id| {
                let port = self.ports.remove(&id)?;
                info!("SCHEDULER: Sending terminate to Elevator-{id}");
                Some(Outbound::new(Message::Terminate, port))
            })
            .collect()
    }

    fn handle_floor_request(&mut self, request: FloorRequest) -> Vec<Outbound> {
        let mut out = Vec::new();
        let ack = Outbound::new(Message::EmptyReply, self.floor_port);
        if !self.accepting {
            warn!("SCHEDULER: Ignoring floor request {request} received after terminate");
            out.push(ack);
            return out;
        }

        info!("SCHEDULER: Received floor request -> {request}");
        self.metrics.start(request);

        match self.best_elevator(&request) {
            None => {
                self.waitlist.push(request);
                info!("SCHEDULER: No elevators available. Adding {request} to waitlist");
            }
            Some(id) if self.is_waiting(id) => {
                info!("SCHEDULER: Sending [{request}] to Elevator-{id}");
                out.extend(self.send_batch(id, vec![request]));
            }
            Some(id) => {
                self.waitlist.push(request);
                info!("SCHEDULER: Elevator-{id} not receiving. Adding {request} to waitlist");
            }
        }

        out.push(ack);
        self.view.update_waitlist(&self.waitlist);
        self.view.update_elevators(&self.requests);
        out
    }

    fn handle_state(&mut self, state: ElevatorState) -> Vec<Outbound> {
        let id = state.id;
        let Some(sets) = self.requests.get_mut(&id) else {
            warn!("SCHEDULER: State from unregistered Elevator-{id} ignored");
            return Vec::new();
        };
        info!("SCHEDULER: Received elevator state: {state}");
        self.elevators.insert(id, state);

        if state.has_stopped() {
            let delivered = sets.alight(state.floor);
            sets.board(state.floor);
            for request in delivered {
                if let Some(elapsed) = self.metrics.finish(&request) {
                    info!(
                        "SCHEDULER: Delivered {request} in {:.3} seconds",
                        elapsed.as_secs_f64()
                    );
                }
            }
        }

        let batch = self.take_batch(id);
        info!("SCHEDULER: Current wait list: {}", request::list(&self.waitlist));
        self.view.update_waitlist(&self.waitlist);

        let mut out = Vec::new();
        if !batch.is_empty() || !self.is_waiting(id) {
            info!(
                "SCHEDULER: Sending {} to Elevator-{id}",
                if batch.is_empty() {
                    "no requests".to_string()
                } else {
                    request::list(&batch)
                }
            );
            out.extend(self.send_batch(id, batch));
        } else {
            info!("SCHEDULER: Withholding response.");
        }
        out.extend(self.offer_waitlist());
        self.view.update_elevators(&self.requests);
        out
    }

    fn handle_broken(&mut self, state: ElevatorState) -> Vec<Outbound> {
        let id = state.id;
        info!("SCHEDULER: Received elevator state: {state}");

        let sets = self.requests.remove(&id).unwrap_or_default();
        if !sets.in_service.is_empty() {
            warn!(
                "SCHEDULER: Elevator-{id} broke down carrying {}; they are not reassigned",
                request::list(&sets.in_service)
            );
        }
        self.waitlist.extend(sets.assigned);
        self.elevators.remove(&id);
        self.view.update_waitlist(&self.waitlist);

        let mut out = self.offer_waitlist();
        info!("SCHEDULER: Current wait list: {}", request::list(&self.waitlist));

        match self.ports.remove(&id) {
            Some(port) => {
                info!("SCHEDULER: Sending terminate to Elevator-{id}");
                out.push(Outbound::new(Message::Terminate, port));
            }
            None => warn!("SCHEDULER: Broken Elevator-{id} was never registered"),
        }
        self.view.update_elevators(&self.requests);
        out
    }

    fn handle_register(&mut self, id: i32, port: i32) -> Vec<Outbound> {
        let Ok(port) = u16::try_from(port) else {
            warn!("SCHEDULER: Elevator-{id} registered with invalid port {port}");
            return Vec::new();
        };
        self.ports.insert(id, port);
        self.requests.entry(id).or_default();
        self.registered_any = true;
        info!("SCHEDULER: Registered Elevator-{id} to port {port}");
        vec![Outbound::new(Message::EmptyReply, port)]
    }

    /// Hands waitlisted requests to idle cars that are now the best fit for
    /// them. Idle cars are parked on a withheld reply, so nothing else would
    /// wake them.
    fn offer_waitlist(&mut self) -> Vec<Outbound> {
        let idle: Vec<i32> = self
            .elevators
            .keys()
            .copied()
            .filter(|id| self.is_waiting(*id))
            .collect();
        let mut out = Vec::new();
        for id in idle {
            if self.waitlist.is_empty() {
                break;
            }
            let batch = self.take_batch(id);
            if !batch.is_empty() {
                info!("SCHEDULER: Sending {} to Elevator-{id}", request::list(&batch));
                out.extend(self.send_batch(id, batch));
            }
        }
        if !out.is_empty() {
            self.view.update_waitlist(&self.waitlist);
        }
        out
    }

    fn is_waiting(&self, id: i32) -> bool {
        self.requests.get(&id).is_none_or(RequestSets::is_empty)
    }

    fn is_candidate(&self, request: &FloorRequest, state: &ElevatorState) -> bool {
        let Some(sets) = self.requests.get(&state.id) else {
            return false;
        };
        if sets.len() >= self.capacity {
            return false;
        }
        if state.has_stopped() && sets.is_empty() {
            return true;
        }
        let source = request.source_floor();
        match request.direction() {
            Direction::Up => state.floor <= source && sets.is_heading(Direction::Up),
            Direction::Down => state.floor >= source && sets.is_heading(Direction::Down),
        }
    }

    /// Nearest candidate to the request's source floor; ties go to the lowest id.
    fn best_elevator(&self, request: &FloorRequest) -> Option<i32> {
        self.elevators
            .values()
            .filter(|state| self.is_candidate(request, state))
            .min_by_key(|state| (state.floor - request.source_floor()).abs())
            .map(|state| state.id)
    }

    /// Claims the waitlisted requests car `id` should take next, all in one
    /// direction and within capacity.
    fn take_batch(&mut self, id: i32) -> Vec<FloorRequest> {
        let Some(mut count) = self.requests.get(&id).map(RequestSets::len) else {
            return Vec::new();
        };
        let mut direction = None;
        let mut batch = Vec::new();
        let mut index = 0;
        while index < self.waitlist.len() && count < self.capacity {
            let request = self.waitlist[index];
            let same_way = direction.is_none_or(|d| d == request.direction());
            if same_way && self.best_elevator(&request) == Some(id) {
                direction = Some(request.direction());
                batch.push(self.waitlist.remove(index));
                count += 1;
            } else {
                index += 1;
            }
        }
        batch
    }

    fn send_batch(&mut self, id: i32, batch: Vec<FloorRequest>) -> Option<Outbound> {
        let floor = self.elevators.get(&id).map_or(1, |state| state.floor);
        if let Some(sets) = self.requests.get_mut(&id) {
            for request in &batch {
                sets.place(*request, floor);
            }
        }
        let port = self.port(id)?;
        Some(Outbound::new(Message::RequestBatch(batch), port))
    }
}
