//! Connection State
//!
//! Per-connection records and the roster that owns them. The roster iterates
//! in id order (BTreeMap) so every derived list is stable.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::bounds::Position;
use crate::core::clock::Seconds;
use crate::game::cooldown::CooldownGate;
use crate::game::faction::{Faction, MaskBits, MaskId};
use crate::game::leaderboard::LeaderboardEntry;
use crate::game::world::EntityId;

// =============================================================================
// CONNECTION ID
// =============================================================================

/// Opaque connection identifier (UUID bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub [u8; 16]);

impl ConnectionId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Fresh random id.
    pub fn random() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    /// Short hex prefix, for logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0[..4]))
    }
}

// =============================================================================
// CONNECTION
// =============================================================================

/// Longest display name kept, in characters.
pub const MAX_NAME_CHARS: usize = 32;

/// Authoritative record for one attached connection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Identifier.
    pub id: ConnectionId,
    /// Name shown on the leaderboard.
    pub display_name: String,
    /// Side, set once per match.
    pub faction: Faction,
    /// Worn mask, set once per match.
    pub mask: Option<MaskId>,
    /// Item in hand.
    pub carried_item: Option<EntityId>,
    /// Mask bits inherited from picked-up tokens.
    pub inherited_bits: MaskBits,
    /// Not yet eliminated.
    pub alive: bool,
    /// Survivor skills are off until this time.
    pub skill_disabled_until: Seconds,
    /// Chaser movement is frozen until this time.
    pub frozen_until: Seconds,
    /// Ability cooldowns.
    pub cooldowns: CooldownGate,
    /// Personal score.
    pub score: u32,
    /// Last position reported by the movement layer.
    pub position: Position,
}

impl Connection {
    /// New connection with no faction on Main.
    pub fn new(id: ConnectionId, display_name: String) -> Self {
        Self {
            id,
            display_name,
            faction: Faction::NoFaction,
            mask: None,
            carried_item: None,
            inherited_bits: MaskBits::EMPTY,
            alive: true,
            skill_disabled_until: 0.0,
            frozen_until: 0.0,
            cooldowns: CooldownGate::new(),
            score: 0,
            position: Position::ZERO,
        }
    }

    /// Default name for an id.
    pub fn default_name(id: &ConnectionId) -> String {
        format!("Player_{id}")
    }

    /// Is this a Survivor?
    pub fn is_survivor(&self) -> bool {
        self.faction == Faction::Survivor
    }

    /// Is this a Chaser?
    pub fn is_chaser(&self) -> bool {
        self.faction == Faction::Chaser
    }

    /// Are skills disabled at `now`?
    pub fn skill_disabled(&self, now: Seconds) -> bool {
        now < self.skill_disabled_until
    }

    /// Is movement frozen at `now`?
    pub fn is_frozen(&self, now: Seconds) -> bool {
        now < self.frozen_until
    }

    /// Wire form of the mask: -1 when none.
    pub fn mask_index(&self) -> i8 {
        self.mask.map(|m| m.index() as i8).unwrap_or(-1)
    }

    /// Clear everything a match sets; identity and name stay.
    pub fn reset_for_new_match(&mut self) {
        let id = self.id;
        let name = std::mem::take(&mut self.display_name);
        *self = Self::new(id, name);
    }
}

/// Trim and cap a requested display name. `None` if nothing is left.
pub fn normalize_display_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_NAME_CHARS).collect())
}

// =============================================================================
// ROSTER
// =============================================================================

/// All attached connections.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Roster {
    connections: BTreeMap<ConnectionId, Connection>,
}

impl Roster {
    /// Empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a connection. Returns false if the id is already attached.
    pub fn insert(&mut self, connection: Connection) -> bool {
        if self.connections.contains_key(&connection.id) {
            return false;
        }
        self.connections.insert(connection.id, connection);
        true
    }

    /// Remove a connection.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(id)
    }

    /// Look up a connection.
    pub fn get(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, id: &ConnectionId) -> Option<&mut Connection> {
        self.connections.get_mut(id)
    }

    /// Is the id attached?
    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    /// Number of attached connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// No connections?
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Connections in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Mutable iteration in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Connection> {
        self.connections.values_mut()
    }

    /// Ids in order.
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.connections.keys().copied().collect()
    }

    /// Survivors currently in the match (alive or not).
    pub fn survivors_total(&self) -> usize {
        self.iter().filter(|c| c.is_survivor()).count()
    }

    /// Survivors still alive.
    pub fn survivors_alive(&self) -> usize {
        self.iter().filter(|c| c.is_survivor() && c.alive).count()
    }

    /// Leaderboard: score descending, ties in id order.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut ranked: Vec<&Connection> = self.iter().collect();
        // Stable sort keeps id order for ties
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
            .into_iter()
            .map(|c| LeaderboardEntry::new(c.display_name.clone(), c.score))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> ConnectionId {
        ConnectionId::new([n; 16])
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(ConnectionId::random(), ConnectionId::random());
    }

    #[test]
    fn test_display_is_short_hex() {
        assert_eq!(id(0xab).to_string(), "abababab");
        assert_eq!(Connection::default_name(&id(1)), "Player_01010101");
    }

    #[test]
    fn test_new_connection_defaults() {
        let c = Connection::new(id(1), "a".into());
        assert_eq!(c.faction, Faction::NoFaction);
        assert_eq!(c.mask_index(), -1);
        assert!(c.alive);
        assert!(c.carried_item.is_none());
        assert!(c.inherited_bits.is_empty());
    }

    #[test]
    fn test_reset_keeps_identity() {
        let mut c = Connection::new(id(1), "alice".into());
        c.faction = Faction::Chaser;
        c.score = 40;
        c.alive = false;
        c.reset_for_new_match();
        assert_eq!(c, Connection::new(id(1), "alice".into()));
    }

    #[test]
    fn test_timers() {
        let mut c = Connection::new(id(1), "a".into());
        c.skill_disabled_until = 60.0;
        c.frozen_until = 5.0;
        assert!(c.skill_disabled(59.9));
        assert!(!c.skill_disabled(60.0));
        assert!(c.is_frozen(4.0));
        assert!(!c.is_frozen(5.0));
    }

    #[test]
    fn test_roster_insert_unique() {
        let mut roster = Roster::new();
        assert!(roster.insert(Connection::new(id(1), "a".into())));
        assert!(!roster.insert(Connection::new(id(1), "b".into())));
        assert_eq!(roster.get(&id(1)).unwrap().display_name, "a");
    }

    #[test]
    fn test_survivor_counts() {
        let mut roster = Roster::new();
        for i in 0..4 {
            let mut c = Connection::new(id(i), format!("p{i}"));
            c.faction = if i == 3 { Faction::Chaser } else { Faction::Survivor };
            c.alive = i != 0;
            roster.insert(c);
        }
        assert_eq!(roster.survivors_total(), 3);
        assert_eq!(roster.survivors_alive(), 2);
    }

    #[test]
    fn test_leaderboard_order() {
        let mut roster = Roster::new();
        for (i, score) in [(1u8, 10u32), (2, 30), (3, 10)] {
            let mut c = Connection::new(id(i), format!("p{i}"));
            c.score = score;
            roster.insert(c);
        }
        let names: Vec<_> = roster.leaderboard().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["p2", "p1", "p3"]);
    }

    #[test]
    fn test_normalize_display_name() {
        assert_eq!(normalize_display_name("  bob "), Some("bob".to_string()));
        assert_eq!(normalize_display_name("   "), None);
        let long = "x".repeat(100);
        assert_eq!(normalize_display_name(&long).unwrap().len(), MAX_NAME_CHARS);
    }
}
