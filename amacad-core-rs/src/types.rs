//! Core types for the AMACAD clustering protocol

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::ops::{Add, Mul, Sub};

/// Unique identifier for a vehicle node
pub type NodeId = u32;

/// Opaque network address used for unicast delivery
pub type NetworkAddress = SocketAddr;

/// A 2-D vector (metres for positions, metres/second for velocities)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Vec2) -> f64 {
        (*self - other).length()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Mobility state compared by the scoring function
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Kinematics {
    pub position: Vec2,
    /// Scalar speed magnitude
    pub speed: f64,
    pub destination: Vec2,
}

/// Clustering role of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterState {
    /// Not affiliated with any cluster
    Unclustered,
    /// Requesting admission from nearby heads
    Joining,
    /// Affiliated with a cluster head
    ClusterMember,
    /// Coordinating a cluster
    ClusterHead,
    /// Head looking to merge into, or hand off to, a better head
    Reclustering,
}

impl Default for ClusterState {
    fn default() -> Self {
        ClusterState::Unclustered
    }
}

impl std::fmt::Display for ClusterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterState::Unclustered => write!(f, "Unclustered"),
            ClusterState::Joining => write!(f, "Joining"),
            ClusterState::ClusterMember => write!(f, "ClusterMember"),
            ClusterState::ClusterHead => write!(f, "ClusterHead"),
            ClusterState::Reclustering => write!(f, "Reclustering"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
    }

    #[test]
    fn test_vec2_arithmetic() {
        let v = Vec2::new(1.0, 2.0) + Vec2::new(0.5, -1.0) * 2.0;
        assert_eq!(v, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ClusterState::ClusterHead.to_string(), "ClusterHead");
        assert_eq!(ClusterState::default(), ClusterState::Unclustered);
    }
}
