//! Property tests for F-value scoring
//!
//! - Symmetry: F(a, b) == F(b, a)
//! - Non-negativity under non-negative weights
//! - Identity: F(a, a) == 0
//! - Election: the elected head never scores above the current head

use amacad_core::*;
use proptest::prelude::*;
use std::time::Duration;

// ============================================================================
// Strategies
// ============================================================================

fn vec2_strategy() -> impl Strategy<Value = Vec2> {
    (-5000.0f64..5000.0, -5000.0f64..5000.0).prop_map(|(x, y)| Vec2::new(x, y))
}

fn kinematics_strategy() -> impl Strategy<Value = Kinematics> {
    (vec2_strategy(), 0.0f64..60.0, vec2_strategy()).prop_map(|(position, speed, destination)| Kinematics {
        position,
        speed,
        destination,
    })
}

fn weights_strategy() -> impl Strategy<Value = Weights> {
    (0.0f64..10.0, 0.0f64..10.0, 0.0f64..10.0).prop_map(|(distance, speed, destination)| Weights {
        distance,
        speed,
        destination,
    })
}

fn beacon(id: NodeId, k: &Kinematics) -> Beacon {
    Beacon {
        node_id: id,
        position: k.position,
        speed: k.speed,
        destination: k.destination,
        is_cluster_head: false,
        cluster_head: None,
        neighbor_count: 0,
        cluster_size: 0,
    }
}

fn addr(id: NodeId) -> NetworkAddress {
    format!("10.0.{}.{}:9970", id / 256, id % 256).parse().unwrap()
}

// ============================================================================
// Pairwise Properties
// ============================================================================

proptest! {
    /// F is symmetric in its arguments
    #[test]
    fn pairwise_is_symmetric(
        weights in weights_strategy(),
        a in kinematics_strategy(),
        b in kinematics_strategy()
    ) {
        let scorer = Scorer::new(weights);
        let ab = scorer.pairwise(&a, &b);
        let ba = scorer.pairwise(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-9, "F(a,b)={} F(b,a)={}", ab, ba);
    }

    /// F is never negative with non-negative weights
    #[test]
    fn pairwise_non_negative(
        weights in weights_strategy(),
        a in kinematics_strategy(),
        b in kinematics_strategy()
    ) {
        let scorer = Scorer::new(weights);
        prop_assert!(scorer.pairwise(&a, &b) >= 0.0);
    }

    /// A state is identical to itself
    #[test]
    fn pairwise_identity(weights in weights_strategy(), a in kinematics_strategy()) {
        let scorer = Scorer::new(weights);
        prop_assert_eq!(scorer.pairwise(&a, &a), 0.0);
    }

    /// Self aggregate is the sum of the per-neighbour scores
    #[test]
    fn self_aggregate_sums_neighbors(
        weights in weights_strategy(),
        own in kinematics_strategy(),
        neighbors in prop::collection::vec(kinematics_strategy(), 0..12)
    ) {
        let scorer = Scorer::new(weights);
        let mut table = NeighborTable::new();
        for (i, k) in neighbors.iter().enumerate() {
            let id = i as NodeId + 1;
            table.update(&beacon(id, k), addr(id), Duration::ZERO, 0.0);
        }

        let expected: f64 = table
            .ids()
            .filter_map(|id| scorer.versus_self(&own, &table, id))
            .sum();
        let actual = scorer.self_aggregate(&own, &table);
        prop_assert!((expected - actual).abs() < 1e-6);
    }
}

// ============================================================================
// Election Properties
// ============================================================================

proptest! {
    /// The elected node's score is no worse than the current head's own
    #[test]
    fn elected_head_scores_no_worse(
        own_x in -500.0f64..500.0,
        members in prop::collection::vec((-500.0f64..500.0, 0.0f64..40.0), 1..8)
    ) {
        let mut node = ClusterNode::new(
            1,
            addr(1),
            ClusterConfig::default(),
            StaticMobility::new(Vec2::new(own_x, 0.0), 20.0),
            DestinationSchedule::fixed(Vec2::new(5000.0, 0.0)),
        )
        .unwrap();

        node.handle_timer(TimerKind::Start, Duration::from_secs(1)).unwrap();
        node.handle_timer(TimerKind::AffiliationTimeout, Duration::from_secs(2)).unwrap();
        prop_assert!(node.is_cluster_head());

        for (i, (x, speed)) in members.iter().enumerate() {
            let id = i as NodeId + 2;
            let k = Kinematics {
                position: Vec2::new(*x, 0.0),
                speed: *speed,
                destination: Vec2::new(5000.0, 0.0),
            };
            let packet = Packet {
                src: addr(id),
                dest: Destination::Unicast(addr(1)),
                body: Body::Control(ControlMessage {
                    beacon: beacon(id, &k),
                    kind: ControlKind::Add,
                }),
            };
            node.handle_packet(packet, Duration::from_secs(2)).unwrap();
        }

        let (winner, score) = node.elect_head();
        prop_assert!(score <= node.self_score());
        prop_assert!(winner == 1 || node.members().contains(&winner));
    }
}
