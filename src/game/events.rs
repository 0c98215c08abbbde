//! Change Records
//!
//! Every authoritative mutation emits a record. Records are drained once per
//! tick, in the order they were produced, and fanned out to mirrors by topic.

use serde::{Deserialize, Serialize};

use crate::core::clock::Seconds;
use crate::game::cooldown::AbilityId;
use crate::game::faction::{Faction, MaskBits, MaskId};
use crate::game::layer::Layer;
use crate::game::leaderboard::LeaderboardEntry;
use crate::game::phase::{MatchOutcome, MatchPhase};
use crate::game::state::ConnectionId;
use crate::game::world::{DroppedToken, EntityId, LayerItem};

/// Subscription topic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Topic {
    /// Phase transitions.
    Phase = 0,
    /// Countdown remaining and finish.
    Countdown = 1,
    /// Clock sync.
    Clock = 2,
    /// Attach, detach, rename.
    Roster = 3,
    /// Layer assignments.
    Layers = 4,
    /// Faction, mask, inherited bits, elimination.
    Factions = 5,
    /// Personal and aggregate scores.
    Scores = 6,
    /// Cooldown commits and skill timers.
    Cooldowns = 7,
    /// Items and tokens.
    World = 8,
    /// Match end and reset. Always delivered.
    Match = 9,
}

/// Set of topics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicSet(u16);

impl Default for TopicSet {
    fn default() -> Self {
        Self::all()
    }
}

impl TopicSet {
    /// Every topic.
    pub const fn all() -> Self {
        Self(0x03ff)
    }

    /// The given topics, plus `Match`.
    pub fn of(topics: &[Topic]) -> Self {
        let mut set = Self(1 << Topic::Match as u8);
        for t in topics {
            set.0 |= 1 << *t as u8;
        }
        set
    }

    /// Membership test.
    pub fn contains(self, topic: Topic) -> bool {
        self.0 & (1 << topic as u8) != 0
    }
}

/// Who a score belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ScoreTarget {
    /// One connection.
    Connection(ConnectionId),
    /// Shared faction score.
    Aggregate,
}

/// Record payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEventData {
    /// Phase changed.
    PhaseChanged {
        /// Previous phase.
        old_phase: MatchPhase,
        /// New phase.
        new_phase: MatchPhase,
    },

    /// Countdown remaining changed.
    CountdownChanged {
        /// Seconds left.
        remaining: Seconds,
        /// `remaining / total`.
        progress: f64,
    },

    /// Countdown reached zero while in `phase`.
    CountdownFinished {
        /// Phase at the time of firing.
        phase: MatchPhase,
    },

    /// A connection attached.
    ConnectionJoined {
        /// Connection.
        connection: ConnectionId,
        /// Display name.
        name: String,
    },

    /// A connection changed its name.
    ConnectionRenamed {
        /// Connection.
        connection: ConnectionId,
        /// New name.
        name: String,
    },

    /// A connection left.
    ConnectionLeft {
        /// Connection.
        connection: ConnectionId,
    },

    /// Layer assignment changed.
    LayerChanged {
        /// Connection.
        connection: ConnectionId,
        /// New layer.
        layer: Layer,
    },

    /// Faction and mask set.
    FactionAssigned {
        /// Connection.
        connection: ConnectionId,
        /// Faction.
        faction: Faction,
        /// Mask.
        mask: MaskId,
    },

    /// Inherited mask bits grew.
    InheritedBitsChanged {
        /// Connection.
        connection: ConnectionId,
        /// Bits after the union.
        bits: MaskBits,
    },

    /// A Survivor was eliminated.
    SurvivorEliminated {
        /// Victim.
        victim: ConnectionId,
        /// Eliminating Chaser, if any.
        by: Option<ConnectionId>,
        /// Token dropped by the victim.
        token: EntityId,
    },

    /// Score changed.
    ScoreChanged {
        /// Owner.
        target: ScoreTarget,
        /// New value.
        score: u32,
    },

    /// A faction completed its first task this match.
    TaskCompleted {
        /// Faction.
        faction: Faction,
    },

    /// Ability used; cooldown committed.
    CooldownCommitted {
        /// Connection.
        connection: ConnectionId,
        /// Ability.
        ability: AbilityId,
        /// Usable again at.
        next_usable: Seconds,
    },

    /// Survivor skills disabled.
    SkillsDisabled {
        /// Affected connection.
        connection: ConnectionId,
        /// Until.
        until: Seconds,
    },

    /// Chaser frozen.
    ChaserFrozen {
        /// Chaser.
        connection: ConnectionId,
        /// Until.
        until: Seconds,
    },

    /// Item spawned.
    ItemSpawned {
        /// Item.
        item: LayerItem,
    },

    /// Mask token dropped.
    TokenSpawned {
        /// Token.
        token: DroppedToken,
    },

    /// Item or token removed from the world.
    EntityRemoved {
        /// Entity.
        id: EntityId,
    },

    /// Carried item changed.
    ItemCarried {
        /// Carrier.
        connection: ConnectionId,
        /// Item now in hand.
        item: Option<EntityId>,
    },

    /// Match over.
    MatchEnded {
        /// Winning side.
        outcome: MatchOutcome,
        /// Final standings, score descending.
        leaderboard: Vec<LeaderboardEntry>,
    },

    /// Everything cleared for a new match.
    MatchReset,
}

impl GameEventData {
    /// Topic this record is published on.
    pub fn topic(&self) -> Topic {
        use GameEventData::*;
        match self {
            PhaseChanged { .. } => Topic::Phase,
            CountdownChanged { .. } | CountdownFinished { .. } => Topic::Countdown,
            ConnectionJoined { .. } | ConnectionRenamed { .. } | ConnectionLeft { .. } => Topic::Roster,
            LayerChanged { .. } => Topic::Layers,
            FactionAssigned { .. } | InheritedBitsChanged { .. } | SurvivorEliminated { .. } => {
                Topic::Factions
            }
            ScoreChanged { .. } | TaskCompleted { .. } => Topic::Scores,
            CooldownCommitted { .. } | SkillsDisabled { .. } | ChaserFrozen { .. } => Topic::Cooldowns,
            ItemSpawned { .. } | TokenSpawned { .. } | EntityRemoved { .. } | ItemCarried { .. } => {
                Topic::World
            }
            MatchEnded { .. } | MatchReset => Topic::Match,
        }
    }
}

/// A change record stamped with the tick and time it was produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Authority tick.
    pub tick: u64,
    /// Authority time.
    pub time: Seconds,
    /// Payload.
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a record.
    pub fn new(tick: u64, time: Seconds, data: GameEventData) -> Self {
        Self { tick, time, data }
    }

    /// Topic of the payload.
    pub fn topic(&self) -> Topic {
        self.data.topic()
    }
}
