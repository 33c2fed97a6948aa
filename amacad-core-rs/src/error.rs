//! Error types for the clustering engine

use crate::types::{ClusterState, NodeId};
use thiserror::Error;

/// Invalid clustering parameters
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    NonPositiveDuration(&'static str),

    #[error("weight {name} must be finite and non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("minimum density {minimum} exceeds maximum density {maximum}")]
    DensityRange { minimum: usize, maximum: usize },

    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Missing or malformed destination schedule
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("cannot read destination file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed destination file at token {position}: {reason}")]
    Malformed { position: usize, reason: String },

    #[error("vehicle {0:?} not listed in destination file")]
    VehicleNotFound(String),

    #[error("destination schedule is empty")]
    Empty,
}

/// Errors surfaced by a clustering node
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("destination schedule: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("node {node}: state machine did not settle after {passes} passes (last state {state})")]
    SettleDiverged {
        node: NodeId,
        passes: usize,
        state: ClusterState,
    },
}
