use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;

pub const SCHEDULER_PORT: u16 = 50050;
pub const FLOOR_PORT: u16 = 50060;
pub const NUM_FLOORS: u8 = 7;
pub const NUM_ELEVATORS: i32 = 4;
pub const MAX_CAPACITY: usize = 5;
pub const RETRY_ATTEMPTS: u32 = 3;
pub const UDP_MAX_SIZE: usize = 65535;
pub const REQUEST_FILE: &str = "resources/requests.txt";

/// How long each physical step of a car takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub decelerate: Duration,
    pub arrive_at_floor: Duration,
    pub between_floors: Duration,
    pub approach_floor: Duration,
    pub open_doors: Duration,
    pub close_doors: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            decelerate: Duration::from_millis(1000),
            arrive_at_floor: Duration::from_millis(250),
            between_floors: Duration::from_millis(4750),
            approach_floor: Duration::from_millis(5000),
            open_doors: Duration::from_millis(2000),
            close_doors: Duration::from_millis(2000),
        }
    }
}

impl Timings {
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            decelerate: self.decelerate.mul_f64(factor),
            arrive_at_floor: self.arrive_at_floor.mul_f64(factor),
            between_floors: self.between_floors.mul_f64(factor),
            approach_floor: self.approach_floor.mul_f64(factor),
            open_doors: self.open_doors.mul_f64(factor),
            close_doors: self.close_doors.mul_f64(factor),
        }
    }
}

/// Range a car's operating time before breakdown is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureBudget {
    pub minimum: Duration,
    pub span: Duration,
}

impl Default for FailureBudget {
    fn default() -> Self {
        Self {
            minimum: Duration::from_millis(80_000),
            span: Duration::from_millis(190_000),
        }
    }
}

impl FailureBudget {
    /// A budget no simulated run can exhaust.
    pub fn never() -> Self {
        Self {
            minimum: Duration::MAX,
            span: Duration::ZERO,
        }
    }

    pub fn scaled(self, factor: f64) -> Self {
        if self.minimum == Duration::MAX {
            return self;
        }
        Self {
            minimum: self.minimum.mul_f64(factor),
            span: self.span.mul_f64(factor),
        }
    }

    pub fn sample(&self) -> Duration {
        let span = u64::try_from(self.span.as_millis()).unwrap_or(u64::MAX);
        if span == 0 {
            return self.minimum;
        }
        let offset = rand::rng().random_range(0..span);
        self.minimum.saturating_add(Duration::from_millis(offset))
    }
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub scheduler_port: u16,
    pub floor_port: u16,
    pub num_floors: u8,
    pub num_elevators: i32,
    pub capacity: usize,
    pub request_file: PathBuf,
    pub timings: Timings,
    pub failure_budget: FailureBudget,
    pub retry_attempts: u32,
    /// Reply timeout while the car has work or is moving.
    pub active_poll_timeout: Duration,
    /// Reply timeout for registration and floor requests.
    pub reply_timeout: Duration,
    /// Factor already applied to `timings`; the request source stretches
    /// the gaps between requests by the same amount.
    pub speed: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scheduler_port: SCHEDULER_PORT,
            floor_port: FLOOR_PORT,
            num_floors: NUM_FLOORS,
            num_elevators: NUM_ELEVATORS,
            capacity: MAX_CAPACITY,
            request_file: PathBuf::from(REQUEST_FILE),
            timings: Timings::default(),
            failure_budget: FailureBudget::default(),
            retry_attempts: RETRY_ATTEMPTS,
            active_poll_timeout: Duration::from_millis(500),
            reply_timeout: Duration::from_millis(5000),
            speed: 1.0,
        }
    }
}

impl SimulationConfig {
    pub fn with_speed(mut self, factor: f64) -> Self {
        self.timings = self.timings.scaled(factor);
        self.failure_budget = self.failure_budget.scaled(factor);
        self.speed *= factor;
        self
    }
}
