//! Simulated vehicles moving at constant velocity

use amacad_core::{ClusterNode, MobilityProvider, Vec2};
use std::time::Duration;

/// Piecewise constant-velocity motion
///
/// Position is computed from the last velocity change, so sampling at
/// any time is exact regardless of how often the simulator advances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleMobility {
    anchor: Vec2,
    anchor_time: Duration,
    velocity: Vec2,
    position: Vec2,
}

impl VehicleMobility {
    /// Vehicle at `position` at time `now`
    pub fn new(position: Vec2, velocity: Vec2, now: Duration) -> Self {
        Self {
            anchor: position,
            anchor_time: now,
            velocity,
            position,
        }
    }

    /// Move to where the vehicle is at `now`
    pub fn advance(&mut self, now: Duration) {
        let dt = now.saturating_sub(self.anchor_time).as_secs_f64();
        self.position = self.anchor + self.velocity * dt;
    }

    /// Change velocity from `now` on
    pub fn set_velocity(&mut self, velocity: Vec2, now: Duration) {
        self.advance(now);
        self.anchor = self.position;
        self.anchor_time = now;
        self.velocity = velocity;
    }
}

impl MobilityProvider for VehicleMobility {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn speed(&self) -> f64 {
        self.velocity.length()
    }
}

/// One vehicle in the simulation
pub struct Vehicle {
    pub node: ClusterNode<VehicleMobility>,
    pub crashed: bool,
}

impl Vehicle {
    pub fn new(node: ClusterNode<VehicleMobility>) -> Self {
        Self { node, crashed: false }
    }

    pub fn position(&self) -> Vec2 {
        self.node.mobility().position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_velocity() {
        let mut m = VehicleMobility::new(Vec2::new(10.0, 0.0), Vec2::new(20.0, 0.0), Duration::ZERO);
        m.advance(Duration::from_millis(1500));
        assert_eq!(m.position(), Vec2::new(40.0, 0.0));
        assert_eq!(m.speed(), 20.0);
    }

    #[test]
    fn test_velocity_change_keeps_position() {
        let mut m = VehicleMobility::new(Vec2::ZERO, Vec2::new(10.0, 0.0), Duration::ZERO);
        m.set_velocity(Vec2::new(0.0, 5.0), Duration::from_secs(2));
        assert_eq!(m.position(), Vec2::new(20.0, 0.0));

        m.advance(Duration::from_secs(4));
        assert_eq!(m.position(), Vec2::new(20.0, 10.0));
        assert_eq!(m.speed(), 5.0);
    }

    #[test]
    fn test_motion_starts_at_creation_time() {
        let mut m = VehicleMobility::new(Vec2::new(50.0, 0.0), Vec2::new(20.0, 0.0), Duration::from_secs(10));
        m.advance(Duration::from_secs(10));
        assert_eq!(m.position(), Vec2::new(50.0, 0.0));

        m.advance(Duration::from_secs(12));
        assert_eq!(m.position(), Vec2::new(90.0, 0.0));
    }
}
