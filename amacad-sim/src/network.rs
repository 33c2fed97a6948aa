//! In-process radio network of clustering vehicles
//!
//! A discrete-event simulation: packets are queued for delivery after a
//! fixed latency, timers are polled at every event instant, and every
//! vehicle's position is sampled from its constant-velocity motion. A
//! packet reaches a receiver only if both are alive and within radio range
//! at send time. Loss is drawn from a seeded RNG, so a run is fully
//! reproducible from its seed.

use crate::vehicle::{Vehicle, VehicleMobility};
use amacad_core::{
    ClusterConfig, ClusterError, ClusterEvent, ClusterNode, ClusterState, Destination, DestinationSchedule,
    Effect, NetworkAddress, NodeId, Packet, Vec2,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Upper bound on deliveries processed by [`Network::drain`]
const MAX_DRAIN_DELIVERIES: usize = 100_000;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("vehicle {0}: {1}")]
    Node(NodeId, #[source] ClusterError),

    #[error("no vehicle with index {0}")]
    UnknownVehicle(usize),
}

/// Radio and protocol parameters of a run
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Radio range in metres
    pub range: f64,
    /// One-hop delivery latency
    pub latency: Duration,
    /// Probability that a single delivery is lost
    pub loss: f64,
    pub seed: u64,
    pub cluster: ClusterConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            range: 250.0,
            latency: Duration::from_millis(5),
            loss: 0.0,
            seed: 42,
            cluster: ClusterConfig::default(),
        }
    }
}

/// Address of the vehicle with the given id
pub fn vehicle_address(id: NodeId) -> NetworkAddress {
    NetworkAddress::from(([10, 0, (id / 256) as u8, (id % 256) as u8], amacad_core::transport::DEFAULT_PORT))
}

/// A packet in flight
struct InFlight {
    at: Duration,
    seq: u64,
    to: usize,
    packet: Packet,
}

impl PartialEq for InFlight {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for InFlight {}

impl PartialOrd for InFlight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InFlight {
    // Reversed so BinaryHeap pops the earliest delivery first
    fn cmp(&self, other: &Self) -> Ordering {
        (other.at, other.seq).cmp(&(self.at, self.seq))
    }
}

/// Traffic counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrafficStats {
    /// Control packets sent, by kind
    pub sent: BTreeMap<String, usize>,
    pub delivered: usize,
    pub lost: usize,
    pub out_of_range: usize,
    pub data_delivered: usize,
}

/// Cluster structure at one instant
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub time_secs: f64,
    /// Heads and their member lists
    pub heads: BTreeMap<NodeId, Vec<NodeId>>,
    /// Members and the head they follow
    pub members: BTreeMap<NodeId, NodeId>,
    /// Vehicles in Unclustered, Joining or Reclustering
    pub unclustered: Vec<NodeId>,
    pub crashed: Vec<NodeId>,
}

impl Snapshot {
    pub fn clustered(&self) -> usize {
        self.heads.len() + self.members.len()
    }

    /// Members whose head is not a live head listing them
    pub fn orphans(&self) -> Vec<NodeId> {
        self.members
            .iter()
            .filter(|(member, head)| {
                self.heads
                    .get(head)
                    .map_or(true, |listed| !listed.contains(member))
            })
            .map(|(member, _)| *member)
            .collect()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "t={:.1}s", self.time_secs)?;
        for (head, members) in &self.heads {
            writeln!(f, "  head {:>3}: {:?}", head, members)?;
        }
        writeln!(f, "  unclustered: {:?}", self.unclustered)?;
        if !self.crashed.is_empty() {
            writeln!(f, "  crashed: {:?}", self.crashed)?;
        }
        Ok(())
    }
}

/// The simulated network
pub struct Network {
    pub vehicles: Vec<Vehicle>,
    config: NetworkConfig,
    by_address: HashMap<NetworkAddress, usize>,
    queue: BinaryHeap<InFlight>,
    seq: u64,
    rng: StdRng,
    now: Duration,
    pub stats: TrafficStats,
    pub events: Vec<(Duration, ClusterEvent)>,
}

impl Network {
    pub fn new(config: NetworkConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            vehicles: Vec::new(),
            config,
            by_address: HashMap::new(),
            queue: BinaryHeap::new(),
            seq: 0,
            rng,
            now: Duration::ZERO,
            stats: TrafficStats::default(),
            events: Vec::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Add and activate a vehicle; returns its index
    pub fn add_vehicle(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        schedule: DestinationSchedule,
    ) -> Result<usize, SimError> {
        let idx = self.vehicles.len();
        let id = idx as NodeId + 1;
        let address = vehicle_address(id);

        let mobility = VehicleMobility::new(position, velocity, self.now);
        let mut node = ClusterNode::new(id, address, self.config.cluster.clone(), mobility, schedule)
            .map_err(|e| SimError::Node(id, e))?;
        node.activate(self.now, &mut self.rng);

        self.by_address.insert(address, idx);
        self.vehicles.push(Vehicle::new(node));
        Ok(idx)
    }

    /// Stop a vehicle: it no longer sends, receives or fires timers
    pub fn crash(&mut self, idx: usize) -> Result<(), SimError> {
        let vehicle = self.vehicles.get_mut(idx).ok_or(SimError::UnknownVehicle(idx))?;
        vehicle.crashed = true;
        vehicle.node.shutdown();
        info!("Vehicle {} crashed at {:.2}s", vehicle.node.id(), self.now.as_secs_f64());
        Ok(())
    }

    pub fn set_velocity(&mut self, idx: usize, velocity: Vec2) -> Result<(), SimError> {
        let now = self.now;
        let vehicle = self.vehicles.get_mut(idx).ok_or(SimError::UnknownVehicle(idx))?;
        vehicle.node.mobility_mut().set_velocity(velocity, now);
        Ok(())
    }

    /// Send an application payload from a vehicle
    pub fn send_data(&mut self, idx: usize, payload: Vec<u8>, dest: Destination) -> Result<(), SimError> {
        let now = self.now;
        let vehicle = self.vehicles.get_mut(idx).ok_or(SimError::UnknownVehicle(idx))?;
        let effects = vehicle.node.send_data(payload, dest, now);
        self.apply(idx, effects);
        Ok(())
    }

    /// Time of the next delivery or timer
    fn next_event(&self) -> Option<Duration> {
        let delivery = self.queue.peek().map(|p| p.at);
        let timer = self
            .vehicles
            .iter()
            .filter(|v| !v.crashed)
            .filter_map(|v| v.node.next_deadline().map(|(_, at)| at))
            .min();

        match (delivery, timer) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn advance_to(&mut self, now: Duration) {
        self.now = now;
        for vehicle in &mut self.vehicles {
            if !vehicle.crashed {
                vehicle.node.mobility_mut().advance(now);
            }
        }
    }

    /// Process events up to and including `until`
    pub fn run_until(&mut self, until: Duration) -> Result<(), SimError> {
        while let Some(at) = self.next_event() {
            if at > until {
                break;
            }
            self.advance_to(at);
            self.deliver_due()?;
            self.poll_timers()?;
        }
        self.advance_to(until.max(self.now));
        Ok(())
    }

    /// Deliver packets still in flight without firing timers
    pub fn drain(&mut self) -> Result<(), SimError> {
        let mut delivered = 0;
        while let Some(at) = self.queue.peek().map(|p| p.at) {
            if delivered >= MAX_DRAIN_DELIVERIES {
                break;
            }
            self.advance_to(at);
            delivered += self.deliver_due()?;
        }
        Ok(())
    }

    fn deliver_due(&mut self) -> Result<usize, SimError> {
        let mut count = 0;
        while self.queue.peek().map_or(false, |p| p.at <= self.now) {
            let Some(InFlight { to, packet, .. }) = self.queue.pop() else {
                break;
            };
            let vehicle = &mut self.vehicles[to];
            if vehicle.crashed {
                continue;
            }
            let id = vehicle.node.id();
            let effects = vehicle
                .node
                .handle_packet(packet, self.now)
                .map_err(|e| SimError::Node(id, e))?;
            count += 1;
            self.apply(to, effects);
        }
        Ok(count)
    }

    fn poll_timers(&mut self) -> Result<(), SimError> {
        for idx in 0..self.vehicles.len() {
            let vehicle = &mut self.vehicles[idx];
            if vehicle.crashed {
                continue;
            }
            let id = vehicle.node.id();
            let effects = vehicle
                .node
                .poll_timers(self.now)
                .map_err(|e| SimError::Node(id, e))?;
            self.apply(idx, effects);
        }
        Ok(())
    }

    fn apply(&mut self, from: usize, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Send(packet) => self.transmit(from, packet),
                Effect::Deliver { src, payload } => {
                    debug!("Vehicle {}: {} bytes of data from {}", from + 1, payload.len(), src);
                    self.stats.data_delivered += 1;
                }
                Effect::Notify(event) => {
                    debug!("{:.3}s {:?}", self.now.as_secs_f64(), event);
                    self.events.push((self.now, event));
                }
            }
        }
    }

    fn transmit(&mut self, from: usize, packet: Packet) {
        if let Some(msg) = packet.control() {
            *self.stats.sent.entry(msg.kind.name().to_string()).or_insert(0) += 1;
        }

        let receivers: Vec<usize> = match packet.dest {
            Destination::Broadcast => (0..self.vehicles.len()).filter(|&i| i != from).collect(),
            Destination::Unicast(addr) => self.by_address.get(&addr).copied().into_iter().collect(),
        };

        let origin = self.vehicles[from].position();
        for to in receivers {
            let receiver = &self.vehicles[to];
            if receiver.crashed {
                continue;
            }
            if receiver.position().distance(origin) > self.config.range {
                self.stats.out_of_range += 1;
                continue;
            }
            if self.config.loss > 0.0 && self.rng.gen::<f64>() < self.config.loss {
                self.stats.lost += 1;
                continue;
            }

            self.seq += 1;
            self.stats.delivered += 1;
            self.queue.push(InFlight {
                at: self.now + self.config.latency,
                seq: self.seq,
                to,
                packet: packet.clone(),
            });
        }
    }

    /// Current cluster structure
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot {
            time_secs: self.now.as_secs_f64(),
            heads: BTreeMap::new(),
            members: BTreeMap::new(),
            unclustered: Vec::new(),
            crashed: Vec::new(),
        };

        for vehicle in &self.vehicles {
            let node = &vehicle.node;
            if vehicle.crashed {
                snapshot.crashed.push(node.id());
                continue;
            }
            match (node.state(), node.cluster_head()) {
                (ClusterState::ClusterHead, _) => {
                    snapshot
                        .heads
                        .insert(node.id(), node.members().iter().copied().collect());
                }
                (ClusterState::ClusterMember, Some(head)) => {
                    snapshot.members.insert(node.id(), head);
                }
                _ => snapshot.unclustered.push(node.id()),
            }
        }

        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> DestinationSchedule {
        DestinationSchedule::fixed(Vec2::new(10_000.0, 0.0))
    }

    #[test]
    fn test_lone_vehicle_becomes_head() {
        let mut net = Network::new(NetworkConfig::default());
        net.add_vehicle(Vec2::ZERO, Vec2::new(20.0, 0.0), fixed()).unwrap();
        net.run_until(Duration::from_secs(5)).unwrap();

        let snap = net.snapshot();
        assert_eq!(snap.heads.keys().copied().collect::<Vec<_>>(), vec![1]);
        assert!(snap.unclustered.is_empty());
        assert_eq!(net.stats.sent.get("AFFILIATION"), Some(&1));
    }

    #[test]
    fn test_out_of_range_vehicles_stay_apart() {
        let mut net = Network::new(NetworkConfig::default());
        net.add_vehicle(Vec2::ZERO, Vec2::ZERO, fixed()).unwrap();
        net.add_vehicle(Vec2::new(1000.0, 0.0), Vec2::ZERO, fixed()).unwrap();
        net.run_until(Duration::from_secs(6)).unwrap();

        let snap = net.snapshot();
        assert_eq!(snap.heads.len(), 2);
        assert!(snap.members.is_empty());
        assert_eq!(net.stats.delivered, 0);
        assert!(net.stats.out_of_range > 0);
    }

    #[test]
    fn test_moving_vehicle_added_late_starts_in_place() {
        let mut net = Network::new(NetworkConfig::default());
        net.add_vehicle(Vec2::ZERO, Vec2::ZERO, fixed()).unwrap();
        net.run_until(Duration::from_secs(10)).unwrap();
        assert_eq!(net.now(), Duration::from_secs(10));

        let idx = net.add_vehicle(Vec2::new(50.0, 0.0), Vec2::new(20.0, 0.0), fixed()).unwrap();
        assert_eq!(net.vehicles[idx].position(), Vec2::new(50.0, 0.0));

        net.run_until(Duration::from_secs(11)).unwrap();
        assert_eq!(net.vehicles[idx].position(), Vec2::new(70.0, 0.0));
    }

    #[test]
    fn test_late_vehicle_joins_existing_head() {
        let mut net = Network::new(NetworkConfig::default());
        net.add_vehicle(Vec2::ZERO, Vec2::ZERO, fixed()).unwrap();
        net.run_until(Duration::from_secs(4)).unwrap();

        net.add_vehicle(Vec2::new(50.0, 0.0), Vec2::ZERO, fixed()).unwrap();
        net.run_until(Duration::from_secs(10)).unwrap();
        net.drain().unwrap();

        let snap = net.snapshot();
        assert_eq!(snap.heads.get(&1), Some(&vec![2]));
        assert_eq!(snap.members.get(&2), Some(&1));
        assert!(snap.orphans().is_empty());
        assert!(net
            .events
            .iter()
            .any(|(_, e)| *e == ClusterEvent::JoinAccepted { from: 2, to: 1 }));
    }

    #[test]
    fn test_crashed_vehicle_is_silent() {
        let mut net = Network::new(NetworkConfig::default());
        net.add_vehicle(Vec2::ZERO, Vec2::ZERO, fixed()).unwrap();
        net.crash(0).unwrap();
        net.run_until(Duration::from_secs(5)).unwrap();

        assert!(net.stats.sent.is_empty());
        assert_eq!(net.snapshot().crashed, vec![1]);
        assert!(matches!(net.crash(7), Err(SimError::UnknownVehicle(7))));
    }

    #[test]
    fn test_total_loss_blocks_delivery() {
        let config = NetworkConfig {
            loss: 1.0,
            ..NetworkConfig::default()
        };
        let mut net = Network::new(config);
        net.add_vehicle(Vec2::ZERO, Vec2::ZERO, fixed()).unwrap();
        net.add_vehicle(Vec2::new(10.0, 0.0), Vec2::ZERO, fixed()).unwrap();
        net.run_until(Duration::from_secs(5)).unwrap();

        assert_eq!(net.stats.delivered, 0);
        assert!(net.stats.lost > 0);
        assert_eq!(net.snapshot().heads.len(), 2);
    }

    #[test]
    fn test_data_broadcast_delivered_in_range() {
        let mut net = Network::new(NetworkConfig::default());
        net.add_vehicle(Vec2::ZERO, Vec2::ZERO, fixed()).unwrap();
        net.add_vehicle(Vec2::new(10.0, 0.0), Vec2::ZERO, fixed()).unwrap();
        net.add_vehicle(Vec2::new(900.0, 0.0), Vec2::ZERO, fixed()).unwrap();

        net.send_data(0, b"hazard ahead".to_vec(), Destination::Broadcast).unwrap();
        net.drain().unwrap();
        assert_eq!(net.stats.data_delivered, 1);
    }

    #[test]
    fn test_vehicle_address_unique() {
        assert_ne!(vehicle_address(1), vehicle_address(257));
        assert_eq!(vehicle_address(258).to_string(), "10.0.1.2:9970");
    }
}
