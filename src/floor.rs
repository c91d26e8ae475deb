use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use thiserror::Error;
use tokio::time::sleep;

use crate::config::SimulationConfig;
use crate::transport::Transport;
use crate::types::message::Message;
use crate::types::request::FloorRequest;

#[derive(Debug, Error)]
pub enum RequestFileError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// `HH:MM:SS.ff` to milliseconds of the day. Fractions of a millisecond are
/// truncated.
pub fn timestamp_to_millis(text: &str) -> Result<i32, String> {
    let mut parts = text.split(':');
    let (Some(hours), Some(minutes), Some(seconds), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("timestamp '{text}' is not HH:MM:SS.ff"));
    };
    let hours: i32 = hours
        .parse()
        .ok()
        .filter(|h| (0..24).contains(h))
        .ok_or_else(|| format!("bad hours in '{text}'"))?;
    let minutes: i32 = minutes
        .parse()
        .ok()
        .filter(|m| (0..60).contains(m))
        .ok_or_else(|| format!("bad minutes in '{text}'"))?;
    let seconds: f64 = seconds
        .parse()
        .ok()
        .filter(|s| (0.0..60.0).contains(s))
        .ok_or_else(|| format!("bad seconds in '{text}'"))?;
    Ok(hours * 3_600_000 + minutes * 60_000 + (seconds * 1000.0) as i32)
}

/// Parses `HH:MM:SS.ff FROM DIRECTION TO`. The direction token is not
/// checked; direction follows from the two floors.
pub fn parse_request_line(line: &str, num_floors: u8) -> Result<FloorRequest, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [time, source, _direction, destination] = fields.as_slice() else {
        return Err(format!("expected 4 fields, found {}", fields.len()));
    };
    let timestamp = timestamp_to_millis(time)?;
    let source = parse_floor(source, num_floors)?;
    let destination = parse_floor(destination, num_floors)?;
    if source == destination {
        return Err(format!("source and destination are both floor {source}"));
    }
    Ok(FloorRequest::new(timestamp, source, destination))
}

fn parse_floor(text: &str, num_floors: u8) -> Result<u8, String> {
    match text.parse::<u8>() {
        Ok(floor) if (1..=num_floors).contains(&floor) => Ok(floor),
        Ok(floor) => Err(format!("floor {floor} is outside 1..={num_floors}")),
        Err(_) => Err(format!("'{text}' is not a floor number")),
    }
}

pub fn parse_requests(text: &str, num_floors: u8) -> Result<Vec<FloorRequest>, RequestFileError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            parse_request_line(line, num_floors).map_err(|reason| RequestFileError::Malformed {
                line: index + 1,
                reason,
            })
        })
        .collect()
}

pub fn load_requests(path: &Path, num_floors: u8) -> Result<Vec<FloorRequest>, RequestFileError> {
    let text = fs::read_to_string(path).map_err(|source| RequestFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_requests(&text, num_floors)
}

/// The request source: replays floor requests to the scheduler, keeping the
/// time between them.
pub struct FloorSubsystem<T> {
    transport: T,
    requests: Vec<FloorRequest>,
    reply_timeout: Duration,
    time_scale: f64,
}

impl<T: Transport> FloorSubsystem<T> {
    pub fn new(transport: T, requests: Vec<FloorRequest>, config: &SimulationConfig) -> Self {
        Self {
            transport,
            requests,
            reply_timeout: config.reply_timeout,
            time_scale: config.speed,
        }
    }

    /// Returns how many requests the scheduler acknowledged.
    pub async fn run(self) -> anyhow::Result<usize> {
        info!("FLOOR SUBSYSTEM: STARTED");
        let timeout = Some(self.reply_timeout);
        let mut previous = None;
        let mut sent = 0;

        for request in &self.requests {
            if let Some(previous) = previous {
                let gap = u64::try_from(request.timestamp - previous).unwrap_or(0);
                sleep(Duration::from_millis(gap).mul_f64(self.time_scale)).await;
            }
            previous = Some(request.timestamp);

            let message = Message::FloorRequest(*request);
            if self.transport.call_and_wait(&message, timeout).await.is_none() {
                warn!("FLOOR SUBSYSTEM: scheduler did not answer {request}, giving up");
                break;
            }
            info!("FLOOR SUBSYSTEM: sent Floor Request: {request}");
            sent += 1;
        }

        if self
            .transport
            .call_and_wait(&Message::Terminate, timeout)
            .await
            .is_none()
        {
            warn!("FLOOR SUBSYSTEM: terminate was not acknowledged");
        }
        self.transport.close();
        info!("FLOOR SUBSYSTEM: TERMINATED");
        Ok(sent)
    }
}
