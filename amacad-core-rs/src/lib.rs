//! AMACAD Core Library
//!
//! Mobility-aware clustering for vehicular ad-hoc networks. Each vehicle
//! runs a [`ClusterNode`] that elects cluster heads from position, speed
//! and destination similarity, maintains membership as vehicles move, and
//! hands headship over when a head's mobility diverges from its cluster.
//!
//! The engine is sans-IO: callers feed it packets and timer expiries and
//! carry out the returned [`Effect`]s. [`Transport`] provides a UDP
//! carrier for real deployments.

pub mod types;
pub mod error;
pub mod config;
pub mod message;
pub mod neighbor;
pub mod scoring;
pub mod timer;
pub mod mobility;
pub mod schedule;
pub mod clustering;
pub mod handoff;
pub mod transport;

pub use types::*;
pub use error::{ClusterError, ConfigError, ScheduleError};
pub use config::{ClusterConfig, Weights};
pub use message::{Beacon, Body, ControlKind, ControlMessage, Destination, Packet};
pub use neighbor::{NeighborEntry, NeighborTable};
pub use scoring::Scorer;
pub use timer::TimerKind;
pub use mobility::{MobilityProvider, StaticMobility};
pub use schedule::{DestinationSchedule, Waypoint};
pub use clustering::{ClusterEvent, ClusterNode, Effect};
pub use transport::{Transport, TransportError};
