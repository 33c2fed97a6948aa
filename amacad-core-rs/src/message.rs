//! AMACAD control messages and packet framing

use crate::neighbor::NeighborEntry;
use crate::types::{Kinematics, NetworkAddress, NodeId, Vec2};
use serde::{Deserialize, Serialize};

/// Standard fields carried by every control message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beacon {
    pub node_id: NodeId,
    pub position: Vec2,
    pub speed: f64,
    pub destination: Vec2,
    pub is_cluster_head: bool,
    pub cluster_head: Option<NodeId>,
    pub neighbor_count: u32,
    pub cluster_size: u32,
}

impl Beacon {
    pub fn kinematics(&self) -> Kinematics {
        Kinematics {
            position: self.position,
            speed: self.speed,
            destination: self.destination,
        }
    }
}

/// Control message kinds and their extra payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlKind {
    /// Unclustered node looking for heads
    #[serde(rename = "AFFILIATION")]
    Affiliation,

    /// Head answering an affiliation request
    #[serde(rename = "AFFILIATION_ACK")]
    AffiliationAck,

    /// Head beacon
    #[serde(rename = "HELLO")]
    Hello,

    #[serde(rename = "HELLO_ACK")]
    HelloAck,

    /// Request to join a head's cluster
    #[serde(rename = "ADD")]
    Add,

    /// Answer to ADD; `cluster_head` is `None` on denial
    #[serde(rename = "MEMBER_ACK")]
    MemberAck,

    /// Order to become head, with the members to absorb
    #[serde(rename = "CLUSTERHEAD_ACK")]
    ClusterHeadAck { table: Vec<NeighborEntry> },

    /// Cluster head has changed
    #[serde(rename = "MEMBER_UPDATE")]
    MemberUpdate {
        new_head: NodeId,
        head_entry: NeighborEntry,
    },

    /// Leave (from a member) or disband (from a head)
    #[serde(rename = "DELETE")]
    Delete,

    /// Member's mobility changed significantly
    #[serde(rename = "WARNING")]
    Warning,

    /// Reclustering head probing a neighbouring head
    #[serde(rename = "RECLUSTERING")]
    Reclustering,

    /// Answer to RECLUSTERING with the responder's cluster table
    #[serde(rename = "RECLUSTERING_ACK")]
    ReclusteringAck { table: Vec<NeighborEntry> },
}

impl ControlKind {
    /// Wire name of this kind
    pub fn name(&self) -> &'static str {
        match self {
            ControlKind::Affiliation => "AFFILIATION",
            ControlKind::AffiliationAck => "AFFILIATION_ACK",
            ControlKind::Hello => "HELLO",
            ControlKind::HelloAck => "HELLO_ACK",
            ControlKind::Add => "ADD",
            ControlKind::MemberAck => "MEMBER_ACK",
            ControlKind::ClusterHeadAck { .. } => "CLUSTERHEAD_ACK",
            ControlKind::MemberUpdate { .. } => "MEMBER_UPDATE",
            ControlKind::Delete => "DELETE",
            ControlKind::Warning => "WARNING",
            ControlKind::Reclustering => "RECLUSTERING",
            ControlKind::ReclusteringAck { .. } => "RECLUSTERING_ACK",
        }
    }
}

impl std::fmt::Display for ControlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A control message: sender's beacon plus kind-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlMessage {
    pub beacon: Beacon,
    pub kind: ControlKind,
}

/// Where a packet is addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    Broadcast,
    Unicast(NetworkAddress),
}

/// Packet payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Body {
    Control(ControlMessage),
    /// Application payload passed through to the upper layer
    Data(Vec<u8>),
}

/// A network-layer packet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub src: NetworkAddress,
    pub dest: Destination,
    pub body: Body,
}

impl Packet {
    /// Serialize packet to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize packet from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Control message carried by this packet, if any
    pub fn control(&self) -> Option<&ControlMessage> {
        match &self.body {
            Body::Control(msg) => Some(msg),
            Body::Data(_) => None,
        }
    }
}
