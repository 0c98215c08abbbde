//! Full-state snapshots for late-joining mirrors.

use serde::{Deserialize, Serialize};

use crate::core::clock::Seconds;
use crate::core::hash::{StateHash, StateHasher};
use crate::game::cooldown::CooldownGate;
use crate::game::faction::{Faction, MaskBits, MaskId};
use crate::game::layer::Layer;
use crate::game::leaderboard::LeaderboardEntry;
use crate::game::phase::{MatchOutcome, MatchPhase};
use crate::game::state::ConnectionId;
use crate::game::world::{DroppedToken, EntityId, LayerItem};

/// Replicated fields of one connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionView {
    /// Identifier.
    pub id: ConnectionId,
    /// Display name.
    pub name: String,
    /// Faction.
    pub faction: Faction,
    /// Mask.
    pub mask: Option<MaskId>,
    /// Layer.
    pub layer: Layer,
    /// Alive flag.
    pub alive: bool,
    /// Inherited mask bits.
    pub inherited_bits: MaskBits,
    /// Personal score.
    pub score: u32,
    /// Item in hand.
    pub carried_item: Option<EntityId>,
    /// Skill-disabled deadline.
    pub skill_disabled_until: Seconds,
    /// Freeze deadline.
    pub frozen_until: Seconds,
    /// Cooldown deadlines.
    pub cooldowns: CooldownGate,
}

impl ConnectionView {
    /// Fresh view for a newly attached connection.
    pub fn joined(id: ConnectionId, name: String) -> Self {
        Self {
            id,
            name,
            faction: Faction::NoFaction,
            mask: None,
            layer: Layer::Main,
            alive: true,
            inherited_bits: MaskBits::EMPTY,
            score: 0,
            carried_item: None,
            skill_disabled_until: 0.0,
            frozen_until: 0.0,
            cooldowns: CooldownGate::new(),
        }
    }
}

/// Everything a mirror needs to start from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Authority tick.
    pub tick: u64,
    /// Authority time.
    pub server_time: Seconds,
    /// Phase.
    pub phase: MatchPhase,
    /// Countdown remaining.
    pub countdown_remaining: Seconds,
    /// Countdown progress.
    pub countdown_progress: f64,
    /// Shared faction score.
    pub faction_score: u32,
    /// Connections in id order.
    pub connections: Vec<ConnectionView>,
    /// Items.
    pub items: Vec<LayerItem>,
    /// Tokens.
    pub tokens: Vec<DroppedToken>,
    /// Result, once the match has ended.
    pub outcome: Option<MatchOutcome>,
    /// Final leaderboard, once the match has ended.
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Hash of the replicated view.
    pub view_hash: StateHash,
}

/// Hash of the fields mirrors replicate exactly.
///
/// Time-varying values (countdown, clock) are left out so a mirror one tick
/// behind still agrees.
pub fn view_hash<'a>(
    phase: MatchPhase,
    faction_score: u32,
    connections: impl IntoIterator<Item = &'a ConnectionView>,
) -> StateHash {
    let mut h = StateHasher::for_match_view();
    h.update_u8(phase as u8);
    h.update_u32(faction_score);
    for c in connections {
        h.update_id(c.id.as_bytes());
        h.update_str(&c.name);
        h.update_u8(c.faction.index() as u8);
        h.update_opt_u8(c.mask.map(|m| m.index()));
        h.update_u8(c.layer.index());
        h.update_bool(c.alive);
        h.update_u8(c.inherited_bits.raw());
        h.update_u32(c.score);
        h.update_opt_u32(c.carried_item.map(|e| e.0));
    }
    h.finalize()
}
