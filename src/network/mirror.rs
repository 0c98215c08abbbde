//! Mirror Replica
//!
//! Read-only copy of the authority's state, kept up to date by applying the
//! messages the session fans out. A mirror never mutates anything except by
//! applying authority messages.
//!
//! Positions are not replicated; a mirror knows who carries what, not where
//! an item lies after being dropped.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::clock::{MirrorClock, Seconds};
use crate::core::hash::StateHash;
use crate::game::cooldown::AbilityId;
use crate::game::events::{GameEventData, ScoreTarget};
use crate::game::faction::{Faction, MaskBits};
use crate::game::layer::{allowed_layers, Layer, LayerSet};
use crate::game::leaderboard::{self, LeaderboardEntry};
use crate::game::phase::{MatchOutcome, MatchPhase};
use crate::game::snapshot::{view_hash, ConnectionView, MatchSnapshot};
use crate::game::state::ConnectionId;
use crate::game::world::{DroppedToken, EntityId, LayerItem};
use crate::network::protocol::ServerMessage;

/// Eventually consistent replica of one match.
#[derive(Debug, Clone, Default)]
pub struct MirrorState {
    clock: MirrorClock,
    tick: u64,
    phase: MatchPhase,
    countdown_remaining: Seconds,
    countdown_progress: f64,
    faction_score: u32,
    connections: BTreeMap<ConnectionId, ConnectionView>,
    items: BTreeMap<EntityId, LayerItem>,
    tokens: BTreeMap<EntityId, DroppedToken>,
    completed_tasks: BTreeSet<Faction>,
    outcome: Option<MatchOutcome>,
    leaderboard: Vec<LeaderboardEntry>,
    synced: bool,
}

impl MirrorState {
    /// Empty replica, waiting for a snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one authority message received at local time `local_now`.
    pub fn apply(&mut self, msg: &ServerMessage, local_now: Seconds) {
        match msg {
            ServerMessage::Snapshot(snapshot) => self.load(snapshot, local_now),
            ServerMessage::Record(event) => {
                self.tick = self.tick.max(event.tick);
                self.apply_record(&event.data);
            }
            ServerMessage::MatchEnded {
                tick,
                catcher_win,
                leaderboard: encoded,
            } => {
                self.tick = self.tick.max(*tick);
                let outcome = MatchOutcome::from_catcher_win(*catcher_win);
                self.finish(outcome, leaderboard::decode(encoded));
            }
            ServerMessage::ClockSync { server_time, tick, .. } => {
                self.clock.observe(*server_time, local_now);
                self.tick = self.tick.max(*tick);
            }
            ServerMessage::IntentResult { .. } | ServerMessage::Pong { .. } => {}
        }
    }

    /// Replace the whole replica with a snapshot.
    fn load(&mut self, snapshot: &MatchSnapshot, local_now: Seconds) {
        self.clock.observe(snapshot.server_time, local_now);
        self.tick = snapshot.tick;
        self.phase = snapshot.phase;
        self.countdown_remaining = snapshot.countdown_remaining;
        self.countdown_progress = snapshot.countdown_progress;
        self.faction_score = snapshot.faction_score;
        self.connections = snapshot.connections.iter().map(|c| (c.id, c.clone())).collect();
        self.items = snapshot.items.iter().map(|i| (i.id, i.clone())).collect();
        self.tokens = snapshot.tokens.iter().map(|t| (t.id, *t)).collect();
        self.completed_tasks.clear();
        self.outcome = snapshot.outcome;
        self.leaderboard = snapshot.leaderboard.clone();
        self.synced = true;
    }

    fn finish(&mut self, outcome: MatchOutcome, leaderboard: Vec<LeaderboardEntry>) {
        self.outcome = Some(outcome);
        self.phase = outcome.phase();
        self.leaderboard = leaderboard;
    }

    /// Apply one change record.
    pub fn apply_record(&mut self, data: &GameEventData) {
        match data {
            GameEventData::PhaseChanged { new_phase, .. } => self.phase = *new_phase,
            GameEventData::CountdownChanged { remaining, progress } => {
                self.countdown_remaining = *remaining;
                self.countdown_progress = *progress;
            }
            GameEventData::CountdownFinished { .. } => {
                self.countdown_remaining = 0.0;
                self.countdown_progress = 0.0;
            }
            GameEventData::ConnectionJoined { connection, name } => {
                self.connections
                    .insert(*connection, ConnectionView::joined(*connection, name.clone()));
            }
            GameEventData::ConnectionRenamed { connection, name } => {
                if let Some(c) = self.connections.get_mut(connection) {
                    c.name = name.clone();
                }
            }
            GameEventData::ConnectionLeft { connection } => {
                if let Some(item) = self.connections.remove(connection).and_then(|c| c.carried_item) {
                    if let Some(item) = self.items.get_mut(&item) {
                        item.carrier = None;
                    }
                }
            }
            GameEventData::LayerChanged { connection, layer } => {
                if let Some(c) = self.connections.get_mut(connection) {
                    c.layer = *layer;
                    if let Some(item) = c.carried_item.and_then(|id| self.items.get_mut(&id)) {
                        item.layer = *layer;
                    }
                }
            }
            GameEventData::FactionAssigned {
                connection,
                faction,
                mask,
            } => {
                if let Some(c) = self.connections.get_mut(connection) {
                    c.faction = *faction;
                    c.mask = Some(*mask);
                }
            }
            GameEventData::InheritedBitsChanged { connection, bits } => {
                if let Some(c) = self.connections.get_mut(connection) {
                    c.inherited_bits = *bits;
                }
            }
            GameEventData::SurvivorEliminated { victim, .. } => {
                if let Some(c) = self.connections.get_mut(victim) {
                    c.alive = false;
                }
            }
            GameEventData::ScoreChanged { target, score } => match target {
                ScoreTarget::Connection(id) => {
                    if let Some(c) = self.connections.get_mut(id) {
                        c.score = *score;
                    }
                }
                ScoreTarget::Aggregate => self.faction_score = *score,
            },
            GameEventData::TaskCompleted { faction } => {
                self.completed_tasks.insert(*faction);
            }
            GameEventData::CooldownCommitted {
                connection,
                ability,
                next_usable,
            } => {
                if let Some(c) = self.connections.get_mut(connection) {
                    c.cooldowns.set_next_usable(*ability, *next_usable);
                }
            }
            GameEventData::SkillsDisabled { connection, until } => {
                if let Some(c) = self.connections.get_mut(connection) {
                    c.skill_disabled_until = *until;
                }
            }
            GameEventData::ChaserFrozen { connection, until } => {
                if let Some(c) = self.connections.get_mut(connection) {
                    c.frozen_until = *until;
                }
            }
            GameEventData::ItemSpawned { item } => {
                self.items.insert(item.id, item.clone());
            }
            GameEventData::TokenSpawned { token } => {
                self.tokens.insert(token.id, *token);
            }
            GameEventData::EntityRemoved { id } => {
                self.items.remove(id);
                self.tokens.remove(id);
            }
            GameEventData::ItemCarried { connection, item } => self.carry(*connection, *item),
            GameEventData::MatchEnded {
                outcome,
                leaderboard,
            } => self.finish(*outcome, leaderboard.clone()),
            GameEventData::MatchReset => self.reset(),
        }
    }

    fn carry(&mut self, connection: ConnectionId, item: Option<EntityId>) {
        let Some(c) = self.connections.get_mut(&connection) else {
            return;
        };
        let previous = std::mem::replace(&mut c.carried_item, item);
        let layer = c.layer;
        if let Some(old) = previous.and_then(|id| self.items.get_mut(&id)) {
            old.carrier = None;
        }
        if let Some(new) = item.and_then(|id| self.items.get_mut(&id)) {
            new.carrier = Some(connection);
            new.layer = layer;
        }
    }

    fn reset(&mut self) {
        self.countdown_remaining = 0.0;
        self.countdown_progress = 0.0;
        self.faction_score = 0;
        self.items.clear();
        self.tokens.clear();
        self.completed_tasks.clear();
        self.outcome = None;
        self.leaderboard.clear();
        for c in self.connections.values_mut() {
            *c = ConnectionView::joined(c.id, std::mem::take(&mut c.name));
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Has a snapshot been loaded?
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Last authority tick seen.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Phase.
    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Countdown remaining as of the last record.
    pub fn countdown_remaining(&self) -> Seconds {
        self.countdown_remaining
    }

    /// Countdown progress as of the last record.
    pub fn countdown_progress(&self) -> f64 {
        self.countdown_progress
    }

    /// Shared faction score.
    pub fn faction_score(&self) -> u32 {
        self.faction_score
    }

    /// One connection.
    pub fn connection(&self, id: &ConnectionId) -> Option<&ConnectionView> {
        self.connections.get(id)
    }

    /// All connections in id order.
    pub fn connections(&self) -> impl Iterator<Item = &ConnectionView> {
        self.connections.values()
    }

    /// Items.
    pub fn items(&self) -> impl Iterator<Item = &LayerItem> {
        self.items.values()
    }

    /// Dropped tokens.
    pub fn tokens(&self) -> impl Iterator<Item = &DroppedToken> {
        self.tokens.values()
    }

    /// Has `faction` completed a task this match?
    pub fn is_task_complete(&self, faction: Faction) -> bool {
        self.completed_tasks.contains(&faction)
    }

    /// Result, once ended.
    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    /// Final standings, once ended.
    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    /// Mirror clock.
    pub fn clock(&self) -> &MirrorClock {
        &self.clock
    }

    /// Estimated authority time at `local_now`.
    pub fn server_time(&self, local_now: Seconds) -> Seconds {
        self.clock.estimate(local_now)
    }

    /// Layer of a connection.
    pub fn layer_of(&self, id: &ConnectionId) -> Option<Layer> {
        self.connections.get(id).map(|c| c.layer)
    }

    /// Are both connections known and on the same layer?
    pub fn same_layer(&self, a: &ConnectionId, b: &ConnectionId) -> bool {
        match (self.layer_of(a), self.layer_of(b)) {
            (Some(la), Some(lb)) => la == lb,
            _ => false,
        }
    }

    /// Layers the connection may move to, for UI previews.
    pub fn allowed_layers(&self, id: &ConnectionId) -> LayerSet {
        self.connections
            .get(id)
            .map(|c| allowed_layers(c.faction, c.mask, c.inherited_bits))
            .unwrap_or_default()
    }

    /// Seconds until `ability` is usable, by the mirror clock.
    pub fn cooldown_remaining(&self, id: &ConnectionId, ability: AbilityId, local_now: Seconds) -> Seconds {
        match self.connections.get(id) {
            Some(c) => c.cooldowns.remaining_seconds(ability, self.clock.estimate(local_now)),
            None => 0.0,
        }
    }

    /// Inherited bits of a connection.
    pub fn inherited_bits(&self, id: &ConnectionId) -> MaskBits {
        self.connections
            .get(id)
            .map(|c| c.inherited_bits)
            .unwrap_or(MaskBits::EMPTY)
    }

    /// Hash over the replica, comparable with a snapshot's.
    pub fn view_hash(&self) -> StateHash {
        view_hash(self.phase, self.faction_score, self.connections.values())
    }

    /// Does the replica match the authority view described by `hash`?
    pub fn is_consistent_with(&self, hash: &StateHash) -> bool {
        self.view_hash() == *hash
    }
}
