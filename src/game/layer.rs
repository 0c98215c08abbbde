//! World Layers
//!
//! The world is split into four disjoint layers. Two entities interact only
//! when they share a layer; [`LayerWorldRegistry::same_layer`] is the one
//! locality predicate every gameplay system uses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::faction::{Faction, MaskBits, MaskId};
use crate::game::state::ConnectionId;

/// One of the four world partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Layer {
    /// Shared layer. Everyone starts here.
    Main = 0,
    /// Home layer of mask 0.
    L1 = 1,
    /// Home layer of mask 1.
    L2 = 2,
    /// Home layer of mask 2.
    L3 = 3,
}

impl Layer {
    /// Number of layers. Fixed.
    pub const COUNT: usize = 4;

    /// Every layer, in index order.
    pub const ALL: [Layer; Self::COUNT] = [Layer::Main, Layer::L1, Layer::L2, Layer::L3];

    /// Wire index.
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Home layer of a mask. Survivor masks map to L1..L3, anything else to Main.
    pub fn for_mask(mask: MaskId) -> Self {
        match mask.index() {
            0 => Layer::L1,
            1 => Layer::L2,
            2 => Layer::L3,
            _ => Layer::Main,
        }
    }
}

/// Small set of layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerSet(u8);

impl LayerSet {
    /// No layers.
    pub const EMPTY: Self = Self(0);
    /// All four layers.
    pub const ALL: Self = Self(0b1111);

    /// Set holding one layer.
    pub fn only(layer: Layer) -> Self {
        Self(1 << layer.index())
    }

    /// Add a layer.
    pub fn insert(&mut self, layer: Layer) {
        self.0 |= 1 << layer.index();
    }

    /// Membership test.
    pub fn contains(self, layer: Layer) -> bool {
        self.0 & (1 << layer.index()) != 0
    }

    /// Number of layers in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Is the set empty?
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Layers in index order.
    pub fn iter(self) -> impl Iterator<Item = Layer> {
        Layer::ALL.into_iter().filter(move |l| self.contains(*l))
    }
}

/// Layers a connection may move to.
///
/// Survivors: Main, the home layer of their own mask, and the home layer of
/// every inherited mask bit. Chasers: all four. Everyone else: Main only.
pub fn allowed_layers(faction: Faction, mask: Option<MaskId>, inherited: MaskBits) -> LayerSet {
    match faction {
        Faction::Chaser => LayerSet::ALL,
        Faction::Survivor => {
            let mut set = LayerSet::only(Layer::Main);
            if let Some(mask) = mask {
                set.insert(Layer::for_mask(mask));
            }
            for mask in inherited.masks() {
                set.insert(Layer::for_mask(mask));
            }
            set
        }
        Faction::NoFaction => LayerSet::only(Layer::Main),
    }
}

/// Connection to layer mapping.
///
/// Single source of truth for "where is this connection". Entries exist for
/// attached connections only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerWorldRegistry {
    assignments: BTreeMap<ConnectionId, Layer>,
}

impl LayerWorldRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a connection on a layer. Returns the previous layer.
    pub fn assign(&mut self, connection: ConnectionId, layer: Layer) -> Option<Layer> {
        self.assignments.insert(connection, layer)
    }

    /// Forget a connection.
    pub fn remove(&mut self, connection: &ConnectionId) -> Option<Layer> {
        self.assignments.remove(connection)
    }

    /// Layer of a connection.
    pub fn layer_of(&self, connection: &ConnectionId) -> Option<Layer> {
        self.assignments.get(connection).copied()
    }

    /// Do both connections share a layer? False if either is unknown.
    pub fn same_layer(&self, a: &ConnectionId, b: &ConnectionId) -> bool {
        match (self.layer_of(a), self.layer_of(b)) {
            (Some(la), Some(lb)) => la == lb,
            _ => false,
        }
    }

    /// Is the connection on `layer`? False if unknown.
    pub fn is_on(&self, connection: &ConnectionId, layer: Layer) -> bool {
        self.layer_of(connection) == Some(layer)
    }

    /// Connections on a layer.
    pub fn connections_on(&self, layer: Layer) -> impl Iterator<Item = ConnectionId> + '_ {
        self.assignments
            .iter()
            .filter(move |(_, l)| **l == layer)
            .map(|(id, _)| *id)
    }

    /// Move everyone back to Main.
    pub fn reset_all(&mut self) {
        for layer in self.assignments.values_mut() {
            *layer = Layer::Main;
        }
    }

    /// Number of tracked connections.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Is the registry empty?
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Iterate assignments.
    pub fn iter(&self) -> impl Iterator<Item = (ConnectionId, Layer)> + '_ {
        self.assignments.iter().map(|(id, l)| (*id, *l))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(n: u8) -> ConnectionId {
        ConnectionId::new([n; 16])
    }

    fn mask(n: u8) -> MaskId {
        MaskId::new(n).unwrap()
    }

    #[test]
    fn test_mask_home_layers() {
        assert_eq!(Layer::for_mask(mask(0)), Layer::L1);
        assert_eq!(Layer::for_mask(mask(1)), Layer::L2);
        assert_eq!(Layer::for_mask(mask(2)), Layer::L3);
        assert_eq!(Layer::for_mask(mask(3)), Layer::Main);
    }

    #[test]
    fn test_survivor_options_without_inheritance() {
        let set = allowed_layers(Faction::Survivor, Some(mask(1)), MaskBits::EMPTY);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Layer::Main, Layer::L2]);
    }

    #[test]
    fn test_survivor_options_grow_with_inheritance() {
        let bits = MaskBits::for_mask(mask(0)).union(MaskBits::for_mask(mask(2)));
        let set = allowed_layers(Faction::Survivor, Some(mask(1)), bits);
        assert_eq!(set, LayerSet::ALL);
    }

    #[test]
    fn test_chaser_gets_all_layers() {
        assert_eq!(allowed_layers(Faction::Chaser, Some(mask(3)), MaskBits::EMPTY), LayerSet::ALL);
    }

    #[test]
    fn test_unassigned_only_main() {
        let set = allowed_layers(Faction::NoFaction, None, MaskBits::EMPTY);
        assert_eq!(set, LayerSet::only(Layer::Main));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_same_layer_unknown_is_false() {
        let mut reg = LayerWorldRegistry::new();
        reg.assign(id(1), Layer::Main);
        assert!(!reg.same_layer(&id(1), &id(2)));
        assert!(!reg.same_layer(&id(2), &id(3)));
    }

    #[test]
    fn test_assign_and_remove() {
        let mut reg = LayerWorldRegistry::new();
        assert_eq!(reg.assign(id(1), Layer::Main), None);
        assert_eq!(reg.assign(id(1), Layer::L2), Some(Layer::Main));
        assert!(reg.is_on(&id(1), Layer::L2));
        assert_eq!(reg.connections_on(Layer::L2).collect::<Vec<_>>(), vec![id(1)]);

        reg.remove(&id(1));
        assert!(reg.is_empty());
        assert_eq!(reg.layer_of(&id(1)), None);
    }

    #[test]
    fn test_reset_all() {
        let mut reg = LayerWorldRegistry::new();
        reg.assign(id(1), Layer::L1);
        reg.assign(id(2), Layer::L3);
        reg.reset_all();
        assert!(reg.iter().all(|(_, l)| l == Layer::Main));
    }

    proptest! {
        #[test]
        fn prop_same_layer_symmetric(
            layers in prop::collection::vec(0u8..4, 1..8),
            a in 0usize..8,
            b in 0usize..8,
        ) {
            let mut reg = LayerWorldRegistry::new();
            for (i, l) in layers.iter().enumerate() {
                reg.assign(id(i as u8), Layer::ALL[*l as usize]);
            }
            let (a, b) = (id(a as u8), id(b as u8));
            prop_assert_eq!(reg.same_layer(&a, &b), reg.same_layer(&b, &a));
        }
    }
}
