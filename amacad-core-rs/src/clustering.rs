//! Per-node clustering state machine
//!
//! Implements the AMACAD automaton:
//! - States: Unclustered → Joining → ClusterMember, ClusterHead ⇄ Reclustering
//! - Inbound control messages refresh the neighbour table, then run
//!   kind-specific handling
//! - Timers (affiliation, join, mobility update) drive retries and
//!   maintenance
//!
//! Every entry point runs the settle loop: the transition function is
//! re-applied with a synthesized trigger until a pass reports no further
//! change. Outbound traffic and notifications are collected and returned
//! to the caller as [`Effect`]s; the node itself performs no I/O.

use crate::config::ClusterConfig;
use crate::error::{ClusterError, ScheduleError};
use crate::message::{Beacon, Body, ControlKind, ControlMessage, Destination, Packet};
use crate::mobility::MobilityProvider;
use crate::neighbor::{NeighborEntry, NeighborTable};
use crate::schedule::DestinationSchedule;
use crate::scoring::Scorer;
use crate::timer::{TimerKind, Timers};
use crate::types::{ClusterState, Kinematics, NetworkAddress, NodeId, Vec2};
use rand::Rng;
use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound on transition passes for a single event
pub const MAX_SETTLE_PASSES: usize = 32;

/// Informational notifications for observers; no effect on protocol state
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterEvent {
    /// `from` sent an ADD to head `to`
    JoinRequested { from: NodeId, to: NodeId },
    /// Head `to` admitted `from`
    JoinAccepted { from: NodeId, to: NodeId },
    /// `head` started coordinating a cluster
    ClusterStarted { head: NodeId },
    /// `head` handed its cluster to `successor`
    ClusterCeded { head: NodeId, successor: NodeId },
}

/// Output of processing one event
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Packet for the transport
    Send(Packet),
    /// Application payload for the upper layer
    Deliver { src: NetworkAddress, payload: Vec<u8> },
    Notify(ClusterEvent),
}

/// Event fed into a transition pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trigger {
    /// Spontaneous re-evaluation, no message attached
    Reevaluate,
    AffiliationTimeout,
    JoinTimeout,
    UpdateMobility,
}

/// Result of one transition pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Settled,
    Continue(Trigger),
}

/// A vehicle participating in clustering
pub struct ClusterNode<M> {
    pub(crate) id: NodeId,
    pub(crate) address: NetworkAddress,
    pub(crate) config: ClusterConfig,
    pub(crate) scorer: Scorer,
    pub(crate) mobility: M,
    schedule: DestinationSchedule,
    destination: Vec2,

    pub(crate) state: ClusterState,
    pub(crate) is_cluster_head: bool,
    pub(crate) cluster_head: Option<NodeId>,
    pub(crate) members: BTreeSet<NodeId>,
    pub(crate) head_candidates: VecDeque<NodeId>,
    pub(crate) warning_count: u32,
    last_speed: Option<f64>,

    pub(crate) neighbors: NeighborTable,
    timers: Timers,
    started: bool,
    now: Duration,
    outbox: Vec<Effect>,
}

impl<M: MobilityProvider> ClusterNode<M> {
    /// Create a node; fails on invalid configuration or an empty schedule
    pub fn new(
        id: NodeId,
        address: NetworkAddress,
        config: ClusterConfig,
        mobility: M,
        mut schedule: DestinationSchedule,
    ) -> Result<Self, ClusterError> {
        config.validate()?;

        let first = schedule.pop().ok_or(ScheduleError::Empty)?;
        let mut timers = Timers::new();
        timers.arm(TimerKind::ChangeDestination, first.after);

        Ok(Self {
            id,
            address,
            scorer: Scorer::new(config.weights),
            config,
            mobility,
            schedule,
            destination: first.destination,
            state: ClusterState::Unclustered,
            is_cluster_head: false,
            cluster_head: None,
            members: BTreeSet::new(),
            head_candidates: VecDeque::new(),
            warning_count: 0,
            last_speed: None,
            neighbors: NeighborTable::new(),
            timers,
            started: false,
            now: Duration::ZERO,
            outbox: Vec::new(),
        })
    }

    /// Schedule the start of clustering after `time_difference * (1 + jitter)`
    pub fn activate<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) {
        let jitter: f64 = rng.gen_range(0.0..1.0);
        let delay = self.config.time_difference.mul_f64(1.0 + jitter);
        self.now = now;
        self.timers.arm(TimerKind::Start, now + delay);
        debug!("Node {}: activation scheduled in {:?}", self.id, delay);
    }

    /// Cancel every pending timer
    pub fn shutdown(&mut self) {
        self.timers.cancel_all();
        info!("Node {}: shut down in state {}", self.id, self.state);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn address(&self) -> NetworkAddress {
        self.address
    }

    pub fn state(&self) -> ClusterState {
        self.state
    }

    pub fn is_cluster_head(&self) -> bool {
        self.is_cluster_head
    }

    pub fn cluster_head(&self) -> Option<NodeId> {
        self.cluster_head
    }

    pub fn members(&self) -> &BTreeSet<NodeId> {
        &self.members
    }

    pub fn head_candidates(&self) -> &VecDeque<NodeId> {
        &self.head_candidates
    }

    pub fn neighbors(&self) -> &NeighborTable {
        &self.neighbors
    }

    pub fn warning_count(&self) -> u32 {
        self.warning_count
    }

    pub fn destination(&self) -> Vec2 {
        self.destination
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn mobility(&self) -> &M {
        &self.mobility
    }

    pub fn mobility_mut(&mut self) -> &mut M {
        &mut self.mobility
    }

    /// Earliest pending timer
    pub fn next_deadline(&self) -> Option<(TimerKind, Duration)> {
        self.timers.next_deadline()
    }

    pub fn timer_armed(&self, kind: TimerKind) -> bool {
        self.timers.is_armed(kind)
    }

    pub(crate) fn kinematics(&self) -> Kinematics {
        Kinematics {
            position: self.mobility.position(),
            speed: self.mobility.speed(),
            destination: self.destination,
        }
    }

    /// F-value of this node against everyone it knows
    pub fn self_score(&self) -> f64 {
        self.scorer.self_aggregate(&self.kinematics(), &self.neighbors)
    }

    // ------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------

    /// Process a packet from the transport
    pub fn handle_packet(&mut self, packet: Packet, now: Duration) -> Result<Vec<Effect>, ClusterError> {
        self.now = now;

        match packet.body {
            Body::Data(payload) => {
                self.outbox.push(Effect::Deliver {
                    src: packet.src,
                    payload,
                });
            }
            Body::Control(msg) => {
                let result = self.handle_control(packet.src, msg);
                return self.finish(result);
            }
        }

        Ok(self.take_effects())
    }

    /// Fire one timer, whether or not it is due
    pub fn handle_timer(&mut self, kind: TimerKind, now: Duration) -> Result<Vec<Effect>, ClusterError> {
        self.now = now;
        self.timers.cancel(kind);
        let result = self.fire(kind);
        self.finish(result)
    }

    /// Fire every timer due at `now`, earliest first
    pub fn poll_timers(&mut self, now: Duration) -> Result<Vec<Effect>, ClusterError> {
        self.now = now;
        let mut result = Ok(());
        while let Some(kind) = self.timers.take_due(now) {
            result = self.fire(kind);
            if result.is_err() {
                break;
            }
        }
        self.finish(result)
    }

    /// Wrap an application payload in a DATA packet
    pub fn send_data(&mut self, payload: Vec<u8>, dest: Destination, now: Duration) -> Vec<Effect> {
        self.now = now;
        self.outbox.push(Effect::Send(Packet {
            src: self.address,
            dest,
            body: Body::Data(payload),
        }));
        self.take_effects()
    }

    fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.outbox)
    }

    /// Hand back the effects of one event; a failed event discards them
    fn finish(&mut self, result: Result<(), ClusterError>) -> Result<Vec<Effect>, ClusterError> {
        match result {
            Ok(()) => Ok(self.take_effects()),
            Err(e) => {
                self.outbox.clear();
                Err(e)
            }
        }
    }

    fn fire(&mut self, kind: TimerKind) -> Result<(), ClusterError> {
        match kind {
            TimerKind::Start => {
                self.started = true;
                self.timers
                    .arm(TimerKind::UpdateMobility, self.now + self.config.time_difference);
                info!("Node {}: clustering started", self.id);
                self.settle(Trigger::Reevaluate)
            }
            TimerKind::ChangeDestination => {
                if let Some(next) = self.schedule.pop() {
                    self.timers.arm(TimerKind::ChangeDestination, self.now + next.after);
                    debug!(
                        "Node {}: destination {} -> {}",
                        self.id, self.destination, next.destination
                    );
                    self.destination = next.destination;
                }
                Ok(())
            }
            TimerKind::UpdateMobility => {
                self.timers
                    .arm(TimerKind::UpdateMobility, self.now + self.config.time_difference);
                self.settle(Trigger::UpdateMobility)
            }
            TimerKind::AffiliationTimeout => self.settle(Trigger::AffiliationTimeout),
            TimerKind::JoinTimeout => self.settle(Trigger::JoinTimeout),
        }
    }

    // ------------------------------------------------------------------
    // Settle loop
    // ------------------------------------------------------------------

    /// Apply transitions until a pass produces no further change
    pub(crate) fn settle(&mut self, trigger: Trigger) -> Result<(), ClusterError> {
        let mut trigger = trigger;

        for _ in 0..MAX_SETTLE_PASSES {
            match self.step(trigger) {
                Step::Settled => return Ok(()),
                Step::Continue(next) => trigger = next,
            }
        }

        Err(ClusterError::SettleDiverged {
            node: self.id,
            passes: MAX_SETTLE_PASSES,
            state: self.state,
        })
    }

    fn step(&mut self, trigger: Trigger) -> Step {
        match self.state {
            ClusterState::Unclustered => self.step_unclustered(trigger),
            ClusterState::Joining => self.step_joining(trigger),
            ClusterState::ClusterMember => self.step_member(trigger),
            ClusterState::ClusterHead => self.step_head(trigger),
            ClusterState::Reclustering => self.step_reclustering(trigger),
        }
    }

    fn step_unclustered(&mut self, trigger: Trigger) -> Step {
        match trigger {
            Trigger::Reevaluate => {
                self.collect_head_candidates();
                if self.head_candidates.is_empty() {
                    debug!("Node {}: no heads known, sending AFFILIATION", self.id);
                    self.send_control(ControlKind::Affiliation, None);
                    self.timers
                        .arm(TimerKind::AffiliationTimeout, self.now + self.config.timeout_period);
                    Step::Settled
                } else {
                    self.transition(ClusterState::Joining);
                    Step::Continue(Trigger::JoinTimeout)
                }
            }
            Trigger::AffiliationTimeout => {
                if !self.head_candidates.is_empty() {
                    info!(
                        "Node {}: found {} heads in range, joining",
                        self.id,
                        self.head_candidates.len()
                    );
                    self.transition(ClusterState::Joining);
                    Step::Continue(Trigger::JoinTimeout)
                } else {
                    info!("Node {}: no heads in range, becoming head", self.id);
                    self.assume_headship();
                    self.send_control(ControlKind::Hello, None);
                    Step::Continue(Trigger::Reevaluate)
                }
            }
            _ => Step::Settled,
        }
    }

    fn step_joining(&mut self, trigger: Trigger) -> Step {
        if trigger != Trigger::JoinTimeout {
            return Step::Settled;
        }

        match self.head_candidates.pop_front() {
            Some(candidate) => {
                info!("Node {}: requesting to join {}", self.id, candidate);
                self.send_control(ControlKind::Add, Some(candidate));
                self.notify(ClusterEvent::JoinRequested {
                    from: self.id,
                    to: candidate,
                });
                self.timers
                    .arm(TimerKind::JoinTimeout, self.now + self.config.timeout_period);
                Step::Settled
            }
            None => {
                info!("Node {}: no heads responded, back to Unclustered", self.id);
                self.transition(ClusterState::Unclustered);
                Step::Continue(Trigger::Reevaluate)
            }
        }
    }

    fn step_member(&mut self, trigger: Trigger) -> Step {
        if trigger != Trigger::UpdateMobility {
            return Step::Settled;
        }

        let speed = self.mobility.speed();
        if let Some(last) = self.last_speed {
            if (speed - last).abs() > self.config.speed_threshold {
                if let Some(head) = self.cluster_head {
                    debug!(
                        "Node {}: speed changed {:.1} -> {:.1}, warning head {}",
                        self.id, last, speed, head
                    );
                    self.send_control(ControlKind::Warning, Some(head));
                }
            }
        }
        self.last_speed = Some(speed);

        let evicted = self.neighbors.evict_stale(self.now, self.config.time_to_live);
        let lost_head = self
            .cluster_head
            .map_or(false, |head| evicted.contains(&head));

        if lost_head {
            info!("Node {}: lost head {:?}", self.id, self.cluster_head);
            self.cluster_head = None;
            self.transition(ClusterState::Unclustered);
            return Step::Continue(Trigger::Reevaluate);
        }

        Step::Settled
    }

    fn step_head(&mut self, trigger: Trigger) -> Step {
        if trigger != Trigger::UpdateMobility {
            return Step::Settled;
        }

        self.send_control(ControlKind::Hello, None);
        self.warning_count = self.warning_count.saturating_sub(1);

        let evicted = self.neighbors.evict_stale(self.now, self.config.time_to_live);
        let mut lost_members = false;
        for id in &evicted {
            if self.members.remove(id) {
                debug!("Node {}: member {} timed out", self.id, id);
                lost_members = true;
            }
        }

        if lost_members && self.members.len() < self.config.minimum_density {
            info!(
                "Node {}: membership fell to {}, reclustering",
                self.id,
                self.members.len()
            );
            self.transition(ClusterState::Reclustering);
            return Step::Continue(Trigger::Reevaluate);
        }

        self.collect_head_candidates();
        if !self.head_candidates.is_empty() {
            if self.head_candidates.len() > self.config.maximum_cluster_density {
                info!(
                    "Node {}: {} heads in range, reclustering",
                    self.id,
                    self.head_candidates.len()
                );
                self.transition(ClusterState::Reclustering);
                return Step::Continue(Trigger::Reevaluate);
            }

            if self.members.is_empty() {
                info!("Node {}: no members and heads nearby, relinquishing headship", self.id);
                self.is_cluster_head = false;
                self.cluster_head = None;
                self.transition(ClusterState::Unclustered);
                return Step::Continue(Trigger::Reevaluate);
            }
        }

        Step::Settled
    }

    fn step_reclustering(&mut self, trigger: Trigger) -> Step {
        match trigger {
            Trigger::Reevaluate => {
                self.collect_head_candidates();
                if self.head_candidates.is_empty() {
                    info!(
                        "Node {}: no heads nearby, disbanding {} members",
                        self.id,
                        self.members.len()
                    );
                    let members: Vec<NodeId> = self.members.iter().copied().collect();
                    for member in members {
                        self.send_control(ControlKind::Delete, Some(member));
                    }
                    self.members.clear();
                    self.cluster_head = None;
                    self.is_cluster_head = false;
                    self.transition(ClusterState::Unclustered);
                    Step::Continue(Trigger::Reevaluate)
                } else {
                    Step::Continue(Trigger::JoinTimeout)
                }
            }
            Trigger::JoinTimeout => match self.head_candidates.pop_front() {
                Some(candidate) => {
                    debug!("Node {}: sending RECLUSTERING to {}", self.id, candidate);
                    self.send_control(ControlKind::Reclustering, Some(candidate));
                    self.timers
                        .arm(TimerKind::JoinTimeout, self.now + self.config.timeout_period);
                    Step::Settled
                }
                None => {
                    self.hand_off();
                    Step::Settled
                }
            },
            _ => Step::Settled,
        }
    }

    // ------------------------------------------------------------------
    // Inbound control messages
    // ------------------------------------------------------------------

    fn handle_control(&mut self, src: NetworkAddress, msg: ControlMessage) -> Result<(), ClusterError> {
        let ControlMessage { beacon, kind } = msg;
        let sender = beacon.node_id;

        if sender == self.id {
            return Ok(());
        }

        let value_f = self.scorer.pairwise(&self.kinematics(), &beacon.kinematics());
        self.neighbors.update(&beacon, src, self.now, value_f);

        debug!("Node {}: received {} from {}", self.id, kind, sender);

        match kind {
            ControlKind::Affiliation => {
                if self.is_cluster_head {
                    self.send_control(ControlKind::AffiliationAck, Some(sender));
                }
            }

            ControlKind::AffiliationAck => {
                if self.state == ClusterState::Unclustered && beacon.is_cluster_head {
                    self.push_candidate(sender);
                }
            }

            ControlKind::Hello => {
                self.send_control(ControlKind::HelloAck, Some(sender));
                if beacon.is_cluster_head {
                    self.push_candidate(sender);
                }
            }

            ControlKind::HelloAck => {
                if self.is_cluster_head
                    && self.members.contains(&sender)
                    && beacon.cluster_head != Some(self.id)
                {
                    warn!(
                        "Node {}: member {} reports head {:?}, removing it",
                        self.id, sender, beacon.cluster_head
                    );
                    self.members.remove(&sender);
                    if self.members.len() < self.config.minimum_density {
                        self.transition(ClusterState::Reclustering);
                        return self.settle(Trigger::Reevaluate);
                    }
                }
            }

            ControlKind::Add => self.handle_add(sender),

            ControlKind::ClusterHeadAck { table } => {
                info!(
                    "Node {}: ordered to become head by {} with {} members",
                    self.id,
                    sender,
                    table.len()
                );
                self.assume_headship();
                for entry in table {
                    let id = entry.node_id;
                    if id == self.id {
                        continue;
                    }
                    self.merge_entry(entry);
                    self.members.insert(id);
                }
                self.members.insert(sender);
                return self.settle(Trigger::Reevaluate);
            }

            ControlKind::MemberAck => {
                if self.state != ClusterState::Joining {
                    return Ok(());
                }
                self.timers.cancel(TimerKind::JoinTimeout);

                if beacon.cluster_head.is_some() {
                    info!("Node {}: joined cluster {}", self.id, sender);
                    self.cluster_head = Some(sender);
                    self.transition(ClusterState::ClusterMember);
                    return self.settle(Trigger::Reevaluate);
                }

                info!("Node {}: denied access to cluster {}", self.id, sender);
                return self.settle(Trigger::JoinTimeout);
            }

            ControlKind::MemberUpdate {
                new_head,
                head_entry,
            } => {
                info!("Node {}: head changed to {}", self.id, new_head);
                self.cluster_head = Some(new_head);
                self.merge_entry(head_entry);
            }

            ControlKind::Delete => {
                if self.is_cluster_head {
                    let removed = self.members.remove(&sender);
                    if removed && self.members.len() < self.config.minimum_density {
                        info!("Node {}: member {} left, reclustering", self.id, sender);
                        self.transition(ClusterState::Reclustering);
                        return self.settle(Trigger::Reevaluate);
                    }
                } else {
                    info!("Node {}: removed from cluster by {}", self.id, sender);
                    self.cluster_head = None;
                    self.transition(ClusterState::Unclustered);
                    return self.settle(Trigger::Reevaluate);
                }
            }

            ControlKind::Warning => {
                self.warning_count = self.warning_count.saturating_add(1);
                if self.warning_count > self.config.maximum_warning_count {
                    if self.is_cluster_head {
                        warn!(
                            "Node {}: {} warnings exceed limit, handing off",
                            self.id, self.warning_count
                        );
                        self.hand_off();
                        return self.settle(Trigger::Reevaluate);
                    }
                    debug!("Node {}: warning from {} while not head", self.id, sender);
                }
            }

            ControlKind::Reclustering => {
                if self.is_cluster_head {
                    let table = self.member_snapshot(None);
                    self.send_control(ControlKind::ReclusteringAck { table }, Some(sender));
                }
            }

            ControlKind::ReclusteringAck { table } => {
                if self.state == ClusterState::Reclustering {
                    for entry in table {
                        if entry.node_id != self.id {
                            self.merge_entry(entry);
                        }
                    }
                    self.timers.cancel(TimerKind::JoinTimeout);
                    return self.settle(Trigger::JoinTimeout);
                }
            }
        }

        Ok(())
    }

    fn handle_add(&mut self, sender: NodeId) {
        if !self.is_cluster_head {
            return;
        }

        if self.members.len() < self.config.maximum_density {
            self.members.insert(sender);
            self.send_control(ControlKind::MemberAck, Some(sender));
            self.notify(ClusterEvent::JoinAccepted {
                from: sender,
                to: self.id,
            });
            info!("Node {}: permitted {} to join", self.id, sender);
        } else {
            let mut beacon = self.beacon();
            beacon.cluster_head = None;
            self.dispatch(beacon, ControlKind::MemberAck, Some(sender));
            info!(
                "Node {}: denied {} (cluster full at {})",
                self.id,
                sender,
                self.members.len()
            );
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    pub(crate) fn transition(&mut self, next: ClusterState) {
        if self.state != next {
            debug!("Node {}: {} -> {}", self.id, self.state, next);
            self.state = next;
        }
    }

    /// Become head of a cluster
    pub(crate) fn assume_headship(&mut self) {
        self.warning_count = 0;
        self.is_cluster_head = true;
        self.cluster_head = Some(self.id);
        self.transition(ClusterState::ClusterHead);
        self.notify(ClusterEvent::ClusterStarted { head: self.id });
    }

    /// Rebuild the head-candidate list from the neighbour table
    fn collect_head_candidates(&mut self) {
        self.head_candidates = self.neighbors.collect_heads().into();
    }

    fn push_candidate(&mut self, id: NodeId) {
        if !self.head_candidates.contains(&id) {
            self.head_candidates.push_back(id);
        }
    }

    /// Merge a second-hand entry and refresh its cached score
    pub(crate) fn merge_entry(&mut self, entry: NeighborEntry) {
        let id = entry.node_id;
        if self.neighbors.merge(entry) {
            let own = self.kinematics();
            if let Some(score) = self.scorer.versus_self(&own, &self.neighbors, id) {
                if let Some(stored) = self.neighbors.get_mut(id) {
                    stored.value_f = score;
                }
            }
        }
    }

    /// Table entries of current members, optionally leaving one out
    pub(crate) fn member_snapshot(&self, except: Option<NodeId>) -> Vec<NeighborEntry> {
        self.members
            .iter()
            .filter(|id| Some(**id) != except)
            .filter_map(|id| self.neighbors.get(*id).cloned())
            .collect()
    }

    pub(crate) fn notify(&mut self, event: ClusterEvent) {
        self.outbox.push(Effect::Notify(event));
    }

    /// This node's standard message fields
    pub(crate) fn beacon(&self) -> Beacon {
        Beacon {
            node_id: self.id,
            position: self.mobility.position(),
            speed: self.mobility.speed(),
            destination: self.destination,
            is_cluster_head: self.is_cluster_head,
            cluster_head: self.cluster_head,
            neighbor_count: self.neighbors.len() as u32,
            cluster_size: self.members.len() as u32,
        }
    }

    /// Send a control message to `dest`, or broadcast when `None`
    pub(crate) fn send_control(&mut self, kind: ControlKind, dest: Option<NodeId>) {
        let beacon = self.beacon();
        self.dispatch(beacon, kind, dest);
    }

    fn dispatch(&mut self, beacon: Beacon, kind: ControlKind, dest: Option<NodeId>) {
        let destination = match dest {
            None => Destination::Broadcast,
            Some(id) => match self.neighbors.address_of(id) {
                Some(addr) => Destination::Unicast(addr),
                None => {
                    warn!(
                        "Node {}: no address for node {}, dropping {}",
                        self.id, id, kind
                    );
                    return;
                }
            },
        };

        debug!("Node {}: sending {} to {:?}", self.id, kind, dest);
        self.outbox.push(Effect::Send(Packet {
            src: self.address,
            dest: destination,
            body: Body::Control(ControlMessage { beacon, kind }),
        }));
    }
}
