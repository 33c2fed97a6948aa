//! F-value scoring
//!
//! Weighted dissimilarity between two mobility states:
//!
//! ```text
//! F(a, b) = w_distance * |pos(a) - pos(b)|
//!         + w_speed * |speed(a) - speed(b)|
//!         + w_destination * |dest(a) - dest(b)|
//! ```
//!
//! Lower is better: a node whose mobility diverges least from its
//! neighbours makes the most stable head.

use crate::config::Weights;
use crate::neighbor::NeighborTable;
use crate::types::{Kinematics, NodeId};

/// Computes F-values with fixed weights
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    weights: Weights,
}

impl Scorer {
    pub fn new(weights: Weights) -> Self {
        Self { weights }
    }

    /// F between two mobility states
    pub fn pairwise(&self, a: &Kinematics, b: &Kinematics) -> f64 {
        let distance = a.position.distance(b.position);
        let speed = (a.speed - b.speed).abs();
        let destination = a.destination.distance(b.destination);

        distance * self.weights.distance
            + speed * self.weights.speed
            + destination * self.weights.destination
    }

    /// Sum of F between this node and every neighbour it knows
    pub fn self_aggregate(&self, own: &Kinematics, table: &NeighborTable) -> f64 {
        table
            .iter()
            .map(|n| self.pairwise(own, &n.kinematics()))
            .sum()
    }

    /// F between one neighbour and this node's current mobility
    ///
    /// `None` if the neighbour is unknown.
    pub fn versus_self(&self, own: &Kinematics, table: &NeighborTable, id: NodeId) -> Option<f64> {
        table
            .get(id)
            .map(|n| self.pairwise(own, &n.kinematics()))
    }

    /// Sum of F between a candidate and every other known neighbour
    ///
    /// `None` if the candidate is unknown.
    pub fn candidate_aggregate(&self, table: &NeighborTable, id: NodeId) -> Option<f64> {
        let candidate = table.get(id)?.kinematics();

        Some(
            table
                .iter()
                .filter(|n| n.node_id != id)
                .map(|n| self.pairwise(&candidate, &n.kinematics()))
                .sum(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Beacon;
    use crate::types::Vec2;
    use std::time::Duration;

    fn kin(x: f64, speed: f64, dest_x: f64) -> Kinematics {
        Kinematics {
            position: Vec2::new(x, 0.0),
            speed,
            destination: Vec2::new(dest_x, 0.0),
        }
    }

    fn insert(table: &mut NeighborTable, id: NodeId, k: Kinematics) {
        let beacon = Beacon {
            node_id: id,
            position: k.position,
            speed: k.speed,
            destination: k.destination,
            is_cluster_head: false,
            cluster_head: None,
            neighbor_count: 0,
            cluster_size: 0,
        };
        let addr = format!("10.0.0.{}:9970", id).parse().unwrap();
        table.update(&beacon, addr, Duration::ZERO, 0.0);
    }

    #[test]
    fn test_pairwise_weights() {
        let scorer = Scorer::new(Weights {
            distance: 1.0,
            speed: 10.0,
            destination: 0.5,
        });

        let f = scorer.pairwise(&kin(0.0, 20.0, 100.0), &kin(30.0, 22.0, 300.0));
        assert_eq!(f, 30.0 + 20.0 + 100.0);
    }

    #[test]
    fn test_identical_states_score_zero() {
        let scorer = Scorer::new(Weights::default());
        let k = kin(5.0, 13.0, 500.0);
        assert_eq!(scorer.pairwise(&k, &k), 0.0);
    }

    #[test]
    fn test_aggregates() {
        let scorer = Scorer::new(Weights {
            distance: 1.0,
            speed: 0.0,
            destination: 0.0,
        });
        let own = kin(0.0, 0.0, 0.0);

        let mut table = NeighborTable::new();
        insert(&mut table, 1, kin(10.0, 0.0, 0.0));
        insert(&mut table, 2, kin(20.0, 0.0, 0.0));
        insert(&mut table, 3, kin(40.0, 0.0, 0.0));

        assert_eq!(scorer.self_aggregate(&own, &table), 70.0);
        assert_eq!(scorer.versus_self(&own, &table, 2), Some(20.0));
        // Node 2 against 1 and 3 only
        assert_eq!(scorer.candidate_aggregate(&table, 2), Some(10.0 + 20.0));
        assert_eq!(scorer.candidate_aggregate(&table, 99), None);
        assert_eq!(scorer.versus_self(&own, &table, 99), None);
    }

    #[test]
    fn test_empty_table_aggregates_to_zero() {
        let scorer = Scorer::new(Weights::default());
        assert_eq!(scorer.self_aggregate(&kin(1.0, 2.0, 3.0), &NeighborTable::new()), 0.0);
    }
}
