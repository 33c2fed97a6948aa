//! Per-node timers as owned deadlines
//!
//! Arming a timer that is already pending replaces its deadline, so a
//! timer can never fire twice for one arming.

use std::collections::BTreeMap;
use std::time::Duration;

/// Timers a clustering node owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    /// Delayed activation
    Start,
    /// Waiting for AFFILIATION_ACKs
    AffiliationTimeout,
    /// Waiting for MEMBER_ACK or RECLUSTERING_ACK
    JoinTimeout,
    /// Next waypoint of the destination schedule
    ChangeDestination,
    /// Periodic mobility update and head beacon
    UpdateMobility,
}

/// Pending deadlines, at most one per kind
#[derive(Debug, Clone, Default)]
pub struct Timers {
    deadlines: BTreeMap<TimerKind, Duration>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending deadline for `kind` and arm it at `at`
    pub fn arm(&mut self, kind: TimerKind, at: Duration) {
        self.deadlines.insert(kind, at);
    }

    /// Returns true if the timer was pending
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.deadlines.remove(&kind).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.deadlines.contains_key(&kind)
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<Duration> {
        self.deadlines.get(&kind).copied()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<(TimerKind, Duration)> {
        self.deadlines
            .iter()
            .min_by_key(|(kind, at)| (**at, **kind))
            .map(|(kind, at)| (*kind, *at))
    }

    /// Disarm and return the earliest timer due at `now`
    pub fn take_due(&mut self, now: Duration) -> Option<TimerKind> {
        let (kind, at) = self.next_deadline()?;
        if at > now {
            return None;
        }
        self.deadlines.remove(&kind);
        Some(kind)
    }
}
