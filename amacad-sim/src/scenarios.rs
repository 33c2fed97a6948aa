//! Predefined traffic scenarios
//!
//! Each scenario places vehicles, optionally schedules faults, runs the
//! network for a fixed duration and reports the resulting clusters.

use crate::network::{Network, NetworkConfig, SimError, Snapshot, TrafficStats};
use amacad_core::{DestinationSchedule, Vec2, Waypoint};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Errors from scenario execution
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Scenario {name} needs at least {minimum} vehicles, got {requested}")]
    TooFewVehicles {
        name: &'static str,
        minimum: usize,
        requested: usize,
    },

    #[error("Simulation failed: {0}")]
    Simulation(#[from] SimError),
}

/// Initial state of one vehicle
#[derive(Debug, Clone)]
pub struct VehicleSpec {
    pub position: Vec2,
    pub velocity: Vec2,
    pub schedule: DestinationSchedule,
}

impl VehicleSpec {
    /// Vehicle heading for a single fixed destination
    fn heading(position: Vec2, velocity: Vec2, destination: Vec2) -> Self {
        Self {
            position,
            velocity,
            schedule: DestinationSchedule::fixed(destination),
        }
    }
}

/// Fault injected during a run
#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    /// Stop a vehicle by index
    Crash(usize),
    /// Stop whichever head has the most members at that moment
    CrashLargestHead,
    /// Change a vehicle's velocity
    SetVelocity(usize, Vec2),
}

/// Scenario configuration
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub name: &'static str,
    pub description: &'static str,
    pub duration: Duration,
    pub vehicles: Vec<VehicleSpec>,
    pub faults: Vec<(Duration, Fault)>,
}

/// Scenario execution results
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResults {
    pub scenario: String,
    pub vehicles: usize,
    pub seed: u64,
    pub snapshot: Snapshot,
    pub traffic: TrafficStats,
    pub heads_started: usize,
    pub handoffs: usize,
}

/// Names accepted by [`get_scenario`]
pub const SCENARIOS: &[(&str, &str)] = &[
    ("highway", "Two-lane highway, same direction, mixed speeds"),
    ("convoy", "Single-lane convoy; one vehicle speeds up mid-run"),
    ("intersection", "Two perpendicular streams crossing at the origin; one vehicle breaks down"),
    ("head-crash", "Convoy whose largest cluster head crashes mid-run"),
];

fn require(name: &'static str, minimum: usize, requested: usize) -> Result<(), ScenarioError> {
    if requested < minimum {
        return Err(ScenarioError::TooFewVehicles {
            name,
            minimum,
            requested,
        });
    }
    Ok(())
}

fn convoy_vehicles(count: usize) -> Vec<VehicleSpec> {
    (0..count)
        .map(|i| {
            VehicleSpec::heading(
                Vec2::new(-(i as f64) * 20.0, 0.0),
                Vec2::new(20.0, 0.0),
                Vec2::new(5000.0, 0.0),
            )
        })
        .collect()
}

/// Get a predefined scenario by name
pub fn get_scenario(name: &str, vehicles: usize) -> Result<ScenarioConfig, ScenarioError> {
    match name.to_lowercase().as_str() {
        "highway" => {
            require("highway", 2, vehicles)?;
            let specs = (0..vehicles)
                .map(|i| {
                    let lane = (i % 2) as f64 * 4.0;
                    let speed = 25.0 + (i % 3) as f64 * 2.0;
                    let exit = if i % 4 == 3 { 3000.0 } else { 8000.0 };
                    VehicleSpec {
                        position: Vec2::new(-(i as f64) * 30.0, lane),
                        velocity: Vec2::new(speed, 0.0),
                        schedule: DestinationSchedule::new([
                            Waypoint::new(Duration::from_secs(15), Vec2::new(exit, lane)),
                            Waypoint::new(Duration::ZERO, Vec2::new(8000.0, lane)),
                        ]),
                    }
                })
                .collect();

            Ok(ScenarioConfig {
                name: "highway",
                description: "Two-lane highway, same direction, mixed speeds",
                duration: Duration::from_secs(30),
                vehicles: specs,
                faults: vec![],
            })
        }

        "convoy" => {
            require("convoy", 2, vehicles)?;
            Ok(ScenarioConfig {
                name: "convoy",
                description: "Single-lane convoy; one vehicle speeds up mid-run",
                duration: Duration::from_secs(30),
                vehicles: convoy_vehicles(vehicles),
                faults: vec![(Duration::from_secs(15), Fault::SetVelocity(vehicles - 1, Vec2::new(26.0, 0.0)))],
            })
        }

        "intersection" => {
            require("intersection", 2, vehicles)?;
            let specs = (0..vehicles)
                .map(|i| {
                    let offset = 60.0 + (i / 2) as f64 * 25.0;
                    if i % 2 == 0 {
                        VehicleSpec::heading(Vec2::new(-offset, 0.0), Vec2::new(15.0, 0.0), Vec2::new(2000.0, 0.0))
                    } else {
                        VehicleSpec::heading(Vec2::new(0.0, -offset), Vec2::new(0.0, 15.0), Vec2::new(0.0, 2000.0))
                    }
                })
                .collect();

            Ok(ScenarioConfig {
                name: "intersection",
                description: "Two perpendicular streams crossing at the origin; one vehicle breaks down",
                duration: Duration::from_secs(40),
                vehicles: specs,
                faults: vec![(Duration::from_secs(20), Fault::Crash(0))],
            })
        }

        "head-crash" | "headcrash" => {
            require("head-crash", 3, vehicles)?;
            Ok(ScenarioConfig {
                name: "head-crash",
                description: "Convoy whose largest cluster head crashes mid-run",
                duration: Duration::from_secs(30),
                vehicles: convoy_vehicles(vehicles),
                faults: vec![(Duration::from_secs(12), Fault::CrashLargestHead)],
            })
        }

        _ => Err(ScenarioError::UnknownScenario(name.to_string())),
    }
}

fn inject(network: &mut Network, fault: &Fault) -> Result<(), ScenarioError> {
    match fault {
        Fault::Crash(idx) => network.crash(*idx)?,
        Fault::SetVelocity(idx, velocity) => {
            info!(
                "Vehicle {} changes velocity to {} at {:.2}s",
                idx + 1,
                velocity,
                network.now().as_secs_f64()
            );
            network.set_velocity(*idx, *velocity)?;
        }
        Fault::CrashLargestHead => {
            let snapshot = network.snapshot();
            let largest = snapshot
                .heads
                .iter()
                .max_by_key(|(id, members)| (members.len(), std::cmp::Reverse(**id)))
                .map(|(id, _)| *id);
            match largest {
                Some(id) => network.crash(id as usize - 1)?,
                None => info!("No cluster head to crash"),
            }
        }
    }
    Ok(())
}

/// Run a scenario to completion
pub fn run_scenario(scenario: &ScenarioConfig, config: NetworkConfig) -> Result<ScenarioResults, ScenarioError> {
    info!(
        "Running scenario {} with {} vehicles (seed {})",
        scenario.name,
        scenario.vehicles.len(),
        config.seed
    );

    let seed = config.seed;
    let mut network = Network::new(config);
    for spec in &scenario.vehicles {
        network.add_vehicle(spec.position, spec.velocity, spec.schedule.clone())?;
    }

    let mut faults = scenario.faults.clone();
    faults.sort_by_key(|(at, _)| *at);
    for (at, fault) in &faults {
        network.run_until(*at)?;
        inject(&mut network, fault)?;
    }

    network.run_until(scenario.duration)?;
    network.drain()?;

    let heads_started = network
        .events
        .iter()
        .filter(|(_, e)| matches!(e, amacad_core::ClusterEvent::ClusterStarted { .. }))
        .count();
    let handoffs = network
        .events
        .iter()
        .filter(|(_, e)| matches!(e, amacad_core::ClusterEvent::ClusterCeded { .. }))
        .count();

    Ok(ScenarioResults {
        scenario: scenario.name.to_string(),
        vehicles: scenario.vehicles.len(),
        seed,
        snapshot: network.snapshot(),
        traffic: network.stats.clone(),
        heads_started,
        handoffs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_scenario() {
        for (name, _) in SCENARIOS {
            let scenario = get_scenario(name, 6).unwrap();
            assert_eq!(scenario.vehicles.len(), 6);
        }
        assert!(matches!(get_scenario("gridlock", 6), Err(ScenarioError::UnknownScenario(_))));
        assert!(matches!(
            get_scenario("head-crash", 2),
            Err(ScenarioError::TooFewVehicles { minimum: 3, .. })
        ));
    }

    #[test]
    fn test_convoy_forms_clusters() {
        let scenario = get_scenario("convoy", 5).unwrap();
        let results = run_scenario(&scenario, NetworkConfig::default()).unwrap();

        let snap = &results.snapshot;
        assert!(!snap.heads.is_empty());
        assert!(snap.clustered() >= 4, "snapshot: {}", snap);
        assert!(snap.orphans().is_empty(), "snapshot: {}", snap);
        assert!(results.traffic.sent.get("HELLO").copied().unwrap_or(0) > 0);
    }

    #[test]
    fn test_head_crash_recovers() {
        let scenario = get_scenario("head-crash", 5).unwrap();
        let results = run_scenario(&scenario, NetworkConfig::default()).unwrap();

        let snap = &results.snapshot;
        assert_eq!(snap.crashed.len(), 1);
        let crashed = snap.crashed[0];
        assert!(snap.members.values().all(|head| *head != crashed), "snapshot: {}", snap);
        assert!(!snap.heads.is_empty());
    }

    #[test]
    fn test_run_is_deterministic() {
        let scenario = get_scenario("intersection", 6).unwrap();
        let a = run_scenario(&scenario, NetworkConfig::default()).unwrap();
        let b = run_scenario(&scenario, NetworkConfig::default()).unwrap();

        assert_eq!(a.snapshot.heads, b.snapshot.heads);
        assert_eq!(a.snapshot.members, b.snapshot.members);
        assert_eq!(a.traffic.sent, b.traffic.sent);
        assert_eq!(a.snapshot.crashed, vec![1]);
        assert_eq!(
            a.snapshot.clustered() + a.snapshot.unclustered.len() + a.snapshot.crashed.len(),
            scenario.vehicles.len()
        );
    }

    #[test]
    fn test_highway_with_loss_completes() {
        let scenario = get_scenario("highway", 8).unwrap();
        let config = NetworkConfig {
            loss: 0.1,
            seed: 7,
            ..NetworkConfig::default()
        };
        let results = run_scenario(&scenario, config).unwrap();
        assert!(results.traffic.lost > 0);
        assert!(results.heads_started > 0);
    }
}
