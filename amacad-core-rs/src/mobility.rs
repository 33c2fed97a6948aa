//! Mobility provider interface

use crate::types::Vec2;

/// Supplies a node's current position and speed
///
/// The clustering engine never moves a vehicle; it only samples it.
pub trait MobilityProvider {
    fn position(&self) -> Vec2;

    /// Scalar speed magnitude
    fn speed(&self) -> f64;
}

/// Mobility fixed by the caller, updated through the setters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StaticMobility {
    position: Vec2,
    speed: f64,
}

impl StaticMobility {
    pub fn new(position: Vec2, speed: f64) -> Self {
        Self { position, speed }
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }
}

impl MobilityProvider for StaticMobility {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn speed(&self) -> f64 {
        self.speed
    }
}
