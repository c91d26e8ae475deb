use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
        }
    }
}

/// A passenger wanting to travel from `source` to `destination`.
///
/// Equality covers all three fields, so two passengers pressing the same
/// buttons at different times stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloorRequest {
    /// Milliseconds of simulated day.
    pub timestamp: i32,
    pub source: u8,
    pub destination: u8,
}

impl FloorRequest {
    pub fn new(timestamp: i32, source: u8, destination: u8) -> Self {
        Self {
            timestamp,
            source,
            destination,
        }
    }

    pub fn is_going_up(&self) -> bool {
        self.destination > self.source
    }

    pub fn direction(&self) -> Direction {
        if self.is_going_up() {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn source_floor(&self) -> i32 {
        i32::from(self.source)
    }

    pub fn destination_floor(&self) -> i32 {
        i32::from(self.destination)
    }
}

impl fmt::Display for FloorRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source, self.destination)
    }
}

/// Formats requests as `[2->5, 7->3]` for log lines.
pub fn list(requests: &[FloorRequest]) -> String {
    let items: Vec<String> = requests.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_follows_floor_order() {
        assert_eq!(FloorRequest::new(0, 2, 5).direction(), Direction::Up);
        assert_eq!(FloorRequest::new(0, 7, 3).direction(), Direction::Down);
    }

    #[test]
    fn identity_includes_timestamp() {
        assert_ne!(FloorRequest::new(0, 2, 5), FloorRequest::new(10, 2, 5));
        assert_eq!(FloorRequest::new(10, 2, 5), FloorRequest::new(10, 2, 5));
    }

    #[test]
    fn list_formats_like_log_lines() {
        let requests = [FloorRequest::new(0, 2, 5), FloorRequest::new(0, 7, 3)];
        assert_eq!(list(&requests), "[2->5, 7->3]");
        assert_eq!(list(&[]), "[]");
    }
}
