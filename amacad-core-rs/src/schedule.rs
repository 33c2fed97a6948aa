//! Destination schedule
//!
//! A vehicle's destinations arrive as `(delay, x, y)` waypoints. The
//! destination file lists every vehicle in the scenario:
//!
//! ```text
//! <vehicle count>
//! <name> <waypoint count>
//! <delay secs> <x> <y>
//! ...
//! ```

use crate::error::ScheduleError;
use crate::types::Vec2;
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

/// One destination and the delay before the following swap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub after: Duration,
    pub destination: Vec2,
}

impl Waypoint {
    pub fn new(after: Duration, destination: Vec2) -> Self {
        Self { after, destination }
    }
}

/// Remaining waypoints, consumed front to back
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationSchedule {
    waypoints: VecDeque<Waypoint>,
}

impl DestinationSchedule {
    pub fn new(waypoints: impl IntoIterator<Item = Waypoint>) -> Self {
        Self {
            waypoints: waypoints.into_iter().collect(),
        }
    }

    /// A single destination that never changes
    pub fn fixed(destination: Vec2) -> Self {
        Self::new([Waypoint::new(Duration::ZERO, destination)])
    }

    /// Read the schedule of `vehicle` from a destination file
    pub fn load(path: impl AsRef<Path>, vehicle: &str) -> Result<Self, ScheduleError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, vehicle)
    }

    /// Parse the schedule of `vehicle` from destination file contents
    pub fn parse(text: &str, vehicle: &str) -> Result<Self, ScheduleError> {
        let mut tokens = Tokens::new(text);

        let vehicle_count: usize = tokens.next_parsed("vehicle count")?;
        for _ in 0..vehicle_count {
            let name = tokens.next_token("vehicle name")?.to_string();
            let count: usize = tokens.next_parsed("waypoint count")?;

            let mut waypoints = Vec::new();
            for _ in 0..count {
                let secs: f64 = tokens.next_parsed("waypoint delay")?;
                let x: f64 = tokens.next_parsed("waypoint x")?;
                let y: f64 = tokens.next_parsed("waypoint y")?;

                let after = Duration::try_from_secs_f64(secs).map_err(|e| ScheduleError::Malformed {
                    position: tokens.position,
                    reason: format!("waypoint delay {}: {}", secs, e),
                })?;
                waypoints.push(Waypoint::new(after, Vec2::new(x, y)));
            }

            if name == vehicle {
                if waypoints.is_empty() {
                    return Err(ScheduleError::Empty);
                }
                return Ok(Self::new(waypoints));
            }
        }

        Err(ScheduleError::VehicleNotFound(vehicle.to_string()))
    }

    /// Take the next waypoint
    pub fn pop(&mut self) -> Option<Waypoint> {
        self.waypoints.pop_front()
    }

    pub fn peek(&self) -> Option<&Waypoint> {
        self.waypoints.front()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
            position: 0,
        }
    }

    fn next_token(&mut self, what: &str) -> Result<&'a str, ScheduleError> {
        self.position += 1;
        self.inner.next().ok_or_else(|| ScheduleError::Malformed {
            position: self.position,
            reason: format!("unexpected end of file, expected {}", what),
        })
    }

    fn next_parsed<T>(&mut self, what: &str) -> Result<T, ScheduleError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let token = self.next_token(what)?;
        token.parse().map_err(|e: T::Err| ScheduleError::Malformed {
            position: self.position,
            reason: format!("invalid {} {:?}: {}", what, token, e),
        })
    }
}
