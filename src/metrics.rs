use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use crate::types::request::FloorRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub request: FloorRequest,
    pub elapsed: Duration,
}

/// Dispatch-to-delivery latency of every request the scheduler saw.
#[derive(Debug)]
pub struct LatencyMetrics {
    started: Instant,
    pending: HashMap<FloorRequest, Instant>,
    completed: Vec<Completion>,
}

impl Default for LatencyMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl LatencyMetrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            pending: HashMap::new(),
            completed: Vec::new(),
        }
    }

    pub fn start(&mut self, request: FloorRequest) {
        self.pending.insert(request, Instant::now());
    }

    pub fn finish(&mut self, request: &FloorRequest) -> Option<Duration> {
        let elapsed = self.pending.remove(request)?.elapsed();
        self.completed.push(Completion {
            request: *request,
            elapsed,
        });
        Some(elapsed)
    }

    pub fn average(&self) -> Option<Duration> {
        let count = u32::try_from(self.completed.len()).ok().filter(|n| *n > 0)?;
        let total: Duration = self.completed.iter().map(|c| c.elapsed).sum();
        Some(total / count)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total: self.started.elapsed(),
            completions: self.completed.clone(),
            average: self.average(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: Duration,
    pub completions: Vec<Completion>,
    pub average: Option<Duration>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total time run: {:.3} seconds", self.total.as_secs_f64())?;
        for completion in &self.completions {
            writeln!(
                f,
                "{} - {} : {:.3} seconds",
                completion.request.timestamp,
                completion.request,
                completion.elapsed.as_secs_f64()
            )?;
        }
        match self.average {
            Some(average) => write!(
                f,
                "Average time for each request: {:.3} seconds",
                average.as_secs_f64()
            ),
            None => write!(f, "No requests were completed"),
        }
    }
}
