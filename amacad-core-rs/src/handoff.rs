//! Cluster-head handoff
//!
//! When a head is overloaded with warnings or runs out of neighbouring
//! heads during reclustering, it picks the node with the lowest F-value
//! among itself, its members and its head candidates. A losing head
//! becomes a member of the winner and transfers its membership.

use crate::clustering::{ClusterEvent, ClusterNode};
use crate::message::ControlKind;
use crate::mobility::MobilityProvider;
use crate::types::{ClusterState, NodeId};
use tracing::{info, warn};

impl<M: MobilityProvider> ClusterNode<M> {
    /// Best head among self, members and head candidates
    ///
    /// Self is scored against its whole neighbour table; every other
    /// candidate against the rest of the table. Ties keep the earlier
    /// candidate, so self wins any tie.
    pub fn elect_head(&self) -> (NodeId, f64) {
        let mut best = (self.id, self.self_score());

        let others = self.members.iter().chain(self.head_candidates.iter());
        for &candidate in others {
            if candidate == self.id {
                continue;
            }
            match self.scorer.candidate_aggregate(&self.neighbors, candidate) {
                Some(score) if score < best.1 => best = (candidate, score),
                Some(_) => {}
                None => warn!(
                    "Node {}: handoff candidate {} not in neighbour table, skipping",
                    self.id, candidate
                ),
            }
        }

        best
    }

    /// Hand the cluster to the best-scoring node
    pub(crate) fn hand_off(&mut self) {
        let (winner, score) = self.elect_head();

        if winner == self.id {
            info!("Node {}: keeps headship (F={:.2})", self.id, score);
            self.assume_headship();
            return;
        }

        let head_entry = match self.neighbors.get(winner) {
            Some(entry) => entry.clone(),
            None => {
                // elect_head only returns scored candidates, which are in the table
                warn!("Node {}: handoff winner {} vanished, keeping headship", self.id, winner);
                self.assume_headship();
                return;
            }
        };

        info!(
            "Node {}: handing cluster of {} to {} (F={:.2})",
            self.id,
            self.members.len(),
            winner,
            score
        );

        let members: Vec<NodeId> = self.members.iter().copied().filter(|m| *m != winner).collect();
        let table = self.member_snapshot(Some(winner));

        self.is_cluster_head = false;
        self.cluster_head = Some(winner);
        self.members.clear();
        self.warning_count = 0;
        self.transition(ClusterState::ClusterMember);

        for member in members {
            self.send_control(
                ControlKind::MemberUpdate {
                    new_head: winner,
                    head_entry: head_entry.clone(),
                },
                Some(member),
            );
        }
        self.send_control(ControlKind::ClusterHeadAck { table }, Some(winner));

        self.notify(ClusterEvent::ClusterCeded {
            head: self.id,
            successor: winner,
        });
    }
}
