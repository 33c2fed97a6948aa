//! Neighbour table with staleness eviction
//!
//! Holds the most recently heard state of every known node. Entries are
//! keyed by node id and iterated in ascending id order, which fixes the
//! order in which head candidates are enumerated.

use crate::message::Beacon;
use crate::types::{Kinematics, NetworkAddress, NodeId, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Last known state of a neighbour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborEntry {
    pub node_id: NodeId,
    pub address: NetworkAddress,
    pub position: Vec2,
    pub speed: f64,
    pub destination: Vec2,
    pub is_cluster_head: bool,
    pub cluster_head: Option<NodeId>,
    pub neighbor_count: u32,
    pub cluster_size: u32,
    /// Cached F-value against the owning node
    pub value_f: f64,
    /// Time since activation when this entry was last refreshed
    pub last_heard: Duration,
}

impl NeighborEntry {
    /// Build an entry from a received beacon
    pub fn from_beacon(beacon: &Beacon, address: NetworkAddress, now: Duration) -> Self {
        Self {
            node_id: beacon.node_id,
            address,
            position: beacon.position,
            speed: beacon.speed,
            destination: beacon.destination,
            is_cluster_head: beacon.is_cluster_head,
            cluster_head: beacon.cluster_head,
            neighbor_count: beacon.neighbor_count,
            cluster_size: beacon.cluster_size,
            value_f: 0.0,
            last_heard: now,
        }
    }

    pub fn kinematics(&self) -> Kinematics {
        Kinematics {
            position: self.position,
            speed: self.speed,
            destination: self.destination,
        }
    }
}

/// Per-node table of observed neighbours
#[derive(Debug, Clone, Default)]
pub struct NeighborTable {
    entries: BTreeMap<NodeId, NeighborEntry>,
}

impl NeighborTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for the beacon's sender
    ///
    /// `last_heard` never moves backwards for an existing entry.
    pub fn update(&mut self, beacon: &Beacon, address: NetworkAddress, now: Duration, value_f: f64) {
        let mut entry = NeighborEntry::from_beacon(beacon, address, now);
        entry.value_f = value_f;

        if let Some(existing) = self.entries.get(&beacon.node_id) {
            entry.last_heard = entry.last_heard.max(existing.last_heard);
        }

        self.entries.insert(beacon.node_id, entry);
    }

    /// Merge an entry learned second-hand, keeping whichever is fresher
    ///
    /// Returns true if the supplied entry was stored.
    pub fn merge(&mut self, entry: NeighborEntry) -> bool {
        match self.entries.get(&entry.node_id) {
            Some(existing) if existing.last_heard >= entry.last_heard => false,
            _ => {
                self.entries.insert(entry.node_id, entry);
                true
            }
        }
    }

    /// Remove every entry older than `ttl`, returning the removed ids
    pub fn evict_stale(&mut self, now: Duration, ttl: Duration) -> Vec<NodeId> {
        let stale: Vec<NodeId> = self
            .entries
            .values()
            .filter(|e| now.saturating_sub(e.last_heard) > ttl)
            .map(|e| e.node_id)
            .collect();

        for id in &stale {
            self.entries.remove(id);
        }

        stale
    }

    /// Ids of all neighbours that announce themselves as cluster heads
    pub fn collect_heads(&self) -> Vec<NodeId> {
        self.entries
            .values()
            .filter(|e| e.is_cluster_head)
            .map(|e| e.node_id)
            .collect()
    }

    pub fn get(&self, id: NodeId) -> Option<&NeighborEntry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NeighborEntry> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn address_of(&self, id: NodeId) -> Option<NetworkAddress> {
        self.entries.get(&id).map(|e| e.address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NeighborEntry> {
        self.entries.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(id: NodeId) -> NetworkAddress {
        format!("10.0.0.{}:9970", id).parse().unwrap()
    }

    fn beacon(id: NodeId, is_head: bool) -> Beacon {
        Beacon {
            node_id: id,
            position: Vec2::new(id as f64, 0.0),
            speed: 10.0,
            destination: Vec2::new(1000.0, 0.0),
            is_cluster_head: is_head,
            cluster_head: if is_head { Some(id) } else { None },
            neighbor_count: 0,
            cluster_size: 0,
        }
    }

    #[test]
    fn test_update_overwrites() {
        let mut table = NeighborTable::new();
        table.update(&beacon(2, false), addr(2), Duration::from_secs(1), 1.5);
        table.update(&beacon(2, true), addr(2), Duration::from_secs(2), 2.5);

        let entry = table.get(2).unwrap();
        assert!(entry.is_cluster_head);
        assert_eq!(entry.value_f, 2.5);
        assert_eq!(entry.last_heard, Duration::from_secs(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_last_heard_monotonic() {
        let mut table = NeighborTable::new();
        table.update(&beacon(2, false), addr(2), Duration::from_secs(5), 0.0);
        table.update(&beacon(2, false), addr(2), Duration::from_secs(4), 0.0);
        assert_eq!(table.get(2).unwrap().last_heard, Duration::from_secs(5));
    }

    #[test]
    fn test_evict_stale() {
        let mut table = NeighborTable::new();
        table.update(&beacon(1, false), addr(1), Duration::from_secs(1), 0.0);
        table.update(&beacon(2, false), addr(2), Duration::from_secs(5), 0.0);
        table.update(&beacon(3, false), addr(3), Duration::from_secs(7), 0.0);

        // Exactly ttl old is not stale
        let removed = table.evict_stale(Duration::from_secs(8), Duration::from_secs(3));
        assert_eq!(removed, vec![1]);
        assert!(table.contains(2));
        assert!(table.contains(3));
    }

    #[test]
    fn test_collect_heads_in_id_order() {
        let mut table = NeighborTable::new();
        table.update(&beacon(9, true), addr(9), Duration::ZERO, 0.0);
        table.update(&beacon(4, false), addr(4), Duration::ZERO, 0.0);
        table.update(&beacon(3, true), addr(3), Duration::ZERO, 0.0);

        assert_eq!(table.collect_heads(), vec![3, 9]);
    }

    #[test]
    fn test_merge_prefers_newer() {
        let mut table = NeighborTable::new();
        table.update(&beacon(2, false), addr(2), Duration::from_secs(5), 0.0);

        let mut older = NeighborEntry::from_beacon(&beacon(2, true), addr(2), Duration::from_secs(3));
        assert!(!table.merge(older.clone()));
        assert!(!table.get(2).unwrap().is_cluster_head);

        older.last_heard = Duration::from_secs(6);
        assert!(table.merge(older));
        assert!(table.get(2).unwrap().is_cluster_head);

        let unknown = NeighborEntry::from_beacon(&beacon(7, false), addr(7), Duration::from_secs(1));
        assert!(table.merge(unknown));
        assert_eq!(table.address_of(7), Some(addr(7)));
    }
}
