//! World entities: carried items, dropped mask tokens, submit zones.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::bounds::Position;
use crate::game::faction::{Faction, MaskBits};
use crate::game::layer::Layer;
use crate::game::state::ConnectionId;

/// Identifier of a spawned entity (item or token). Never reused within a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

/// Identifier of a submit zone.
pub type ZoneId = u32;

/// A collectible task item living on one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerItem {
    /// Entity id.
    pub id: EntityId,
    /// Item kind from the spawn profile.
    pub kind: u32,
    /// Layer the item is on. Follows the carrier.
    pub layer: Layer,
    /// World position. Follows the carrier.
    pub position: Position,
    /// Faction allowed to pick it up; `None` means any non-Chaser.
    pub allowed_faction: Option<Faction>,
    /// Current carrier.
    pub carrier: Option<ConnectionId>,
}

/// Mask token left behind by an eliminated Survivor. Lives on Main only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DroppedToken {
    /// Entity id.
    pub id: EntityId,
    /// Mask bits granted to whoever picks it up.
    pub granted_bits: MaskBits,
    /// Spawn position.
    pub position: Position,
}

impl DroppedToken {
    /// Tokens only exist on Main.
    pub const LAYER: Layer = Layer::Main;
}

/// Area where carried items are turned in for score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitZone {
    /// Zone id.
    pub id: ZoneId,
    /// Faction the zone accepts.
    pub faction: Faction,
    /// Layer the zone is on.
    pub layer: Layer,
    /// Center.
    pub position: Position,
    /// Acceptance radius.
    pub radius: f32,
    /// Points per submitted item.
    pub score_per_submit: u32,
}

/// Item placement from the spawn profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpawn {
    /// Item kind.
    pub kind: u32,
    /// Layer to spawn on.
    pub layer: Layer,
    /// Faction filter.
    pub allowed_faction: Option<Faction>,
}

/// Everything spawned into the world for the current match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldEntities {
    next_id: u32,
    items: BTreeMap<EntityId, LayerItem>,
    tokens: BTreeMap<EntityId, DroppedToken>,
    zones: BTreeMap<ZoneId, SubmitZone>,
    completed_tasks: BTreeSet<Faction>,
}

impl WorldEntities {
    /// World with the given submit zones and nothing spawned.
    pub fn new(zones: impl IntoIterator<Item = SubmitZone>) -> Self {
        Self {
            zones: zones.into_iter().map(|z| (z.id, z)).collect(),
            ..Self::default()
        }
    }

    fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Spawn an item.
    pub fn spawn_item(&mut self, spawn: &ItemSpawn, position: Position) -> LayerItem {
        let id = self.allocate();
        let item = LayerItem {
            id,
            kind: spawn.kind,
            layer: spawn.layer,
            position,
            allowed_faction: spawn.allowed_faction,
            carrier: None,
        };
        self.items.insert(id, item.clone());
        item
    }

    /// Spawn a mask token.
    pub fn spawn_token(&mut self, granted_bits: MaskBits, position: Position) -> DroppedToken {
        let id = self.allocate();
        let token = DroppedToken {
            id,
            granted_bits,
            position,
        };
        self.tokens.insert(id, token);
        token
    }

    /// Look up an item.
    pub fn item(&self, id: EntityId) -> Option<&LayerItem> {
        self.items.get(&id)
    }

    /// Mutable item.
    pub fn item_mut(&mut self, id: EntityId) -> Option<&mut LayerItem> {
        self.items.get_mut(&id)
    }

    /// Remove an item.
    pub fn remove_item(&mut self, id: EntityId) -> Option<LayerItem> {
        self.items.remove(&id)
    }

    /// Look up a token.
    pub fn token(&self, id: EntityId) -> Option<&DroppedToken> {
        self.tokens.get(&id)
    }

    /// Remove a token.
    pub fn remove_token(&mut self, id: EntityId) -> Option<DroppedToken> {
        self.tokens.remove(&id)
    }

    /// Look up a zone.
    pub fn zone(&self, id: ZoneId) -> Option<&SubmitZone> {
        self.zones.get(&id)
    }

    /// Layer of any entity.
    pub fn layer_of(&self, id: EntityId) -> Option<Layer> {
        if self.tokens.contains_key(&id) {
            return Some(DroppedToken::LAYER);
        }
        self.items.get(&id).map(|i| i.layer)
    }

    /// All items.
    pub fn items(&self) -> impl Iterator<Item = &LayerItem> {
        self.items.values()
    }

    /// All tokens.
    pub fn tokens(&self) -> impl Iterator<Item = &DroppedToken> {
        self.tokens.values()
    }

    /// All zones.
    pub fn zones(&self) -> impl Iterator<Item = &SubmitZone> {
        self.zones.values()
    }

    /// Record a completed faction task. True the first time.
    pub fn complete_task(&mut self, faction: Faction) -> bool {
        self.completed_tasks.insert(faction)
    }

    /// Has the faction completed a task this match?
    pub fn is_task_complete(&self, faction: Faction) -> bool {
        self.completed_tasks.contains(&faction)
    }

    /// Despawn everything spawned this match. Zones stay.
    pub fn clear(&mut self) {
        self.items.clear();
        self.tokens.clear();
        self.completed_tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(layer: Layer) -> ItemSpawn {
        ItemSpawn {
            kind: 1,
            layer,
            allowed_faction: None,
        }
    }

    #[test]
    fn test_ids_unique_across_kinds() {
        let mut world = WorldEntities::default();
        let item = world.spawn_item(&spawn(Layer::L1), Position::ZERO);
        let token = world.spawn_token(MaskBits::from_raw(1), Position::ZERO);
        assert_ne!(item.id, token.id);
    }

    #[test]
    fn test_layer_of() {
        let mut world = WorldEntities::default();
        let item = world.spawn_item(&spawn(Layer::L3), Position::ZERO);
        let token = world.spawn_token(MaskBits::from_raw(2), Position::ZERO);
        assert_eq!(world.layer_of(item.id), Some(Layer::L3));
        assert_eq!(world.layer_of(token.id), Some(Layer::Main));
        assert_eq!(world.layer_of(EntityId(999)), None);
    }

    #[test]
    fn test_clear_keeps_zones_and_ids_advance() {
        let zone = SubmitZone {
            id: 7,
            faction: Faction::Survivor,
            layer: Layer::Main,
            position: Position::ZERO,
            radius: 2.0,
            score_per_submit: 10,
        };
        let mut world = WorldEntities::new([zone]);
        let first = world.spawn_token(MaskBits::from_raw(1), Position::ZERO);
        assert!(world.complete_task(Faction::Survivor));
        assert!(!world.complete_task(Faction::Survivor));

        world.clear();
        assert!(world.zone(7).is_some());
        assert!(world.token(first.id).is_none());
        assert!(!world.is_task_complete(Faction::Survivor));

        let second = world.spawn_token(MaskBits::from_raw(1), Position::ZERO);
        assert_ne!(first.id, second.id);
    }
}
