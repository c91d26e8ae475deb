pub mod config;
pub mod context;
pub mod controller;
pub mod dispatch;
pub mod elevator;
pub mod floor;
pub mod metrics;
pub mod queue;
pub mod scheduler;
pub mod simulation;
pub mod strategy;
pub mod transport;
pub mod view;

pub mod services {
    pub mod decode;
    pub mod enqueue;
    pub mod validate;
}

pub mod types {
    pub mod instruction;
    pub mod message;
    pub mod request;
    pub mod state;
}

#[cfg(test)]
mod testing;
