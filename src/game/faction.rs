//! Faction Economy
//!
//! Factions, the fixed pool of four masks, and the inherited mask bits that
//! Survivors accumulate by picking up the tokens dropped on elimination.
//! Bits only ever grow within a match; they unlock extra layer options.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::bounds::Bounds;
use crate::core::rng::DeterministicRng;
use crate::game::error::Rejection;
use crate::game::layer::{Layer, LayerWorldRegistry};
use crate::game::state::{ConnectionId, Roster};
use crate::game::world::{DroppedToken, EntityId, WorldEntities};

/// Side a connection plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    /// No mask yet.
    #[default]
    NoFaction,
    /// Runner side.
    Survivor,
    /// Catcher side.
    Chaser,
}

impl Faction {
    /// Wire index: -1, 0, 1.
    pub fn index(self) -> i8 {
        match self {
            Faction::NoFaction => -1,
            Faction::Survivor => 0,
            Faction::Chaser => 1,
        }
    }
}

/// Identity of one of the four masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaskId(u8);

impl MaskId {
    /// Pool size.
    pub const COUNT: usize = 4;
    /// The chaser mask.
    pub const CHASER: MaskId = MaskId(3);

    /// Mask from an index in `0..4`.
    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < Self::COUNT).then_some(Self(index))
    }

    /// Index in `0..4`.
    #[inline]
    pub fn index(self) -> u8 {
        self.0
    }

    /// Faction granted by wearing this mask.
    pub fn faction(self) -> Faction {
        if self == Self::CHASER {
            Faction::Chaser
        } else {
            Faction::Survivor
        }
    }

    /// Layer this mask calls home.
    pub fn home_layer(self) -> Layer {
        Layer::for_mask(self)
    }
}

/// Three-bit set of survivor masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaskBits(u8);

impl MaskBits {
    /// No bits.
    pub const EMPTY: Self = Self(0);
    /// Valid bit range.
    pub const MASK: u8 = 0b111;

    /// From raw bits; anything above bit 2 is dropped.
    pub fn from_raw(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    /// Bit for one survivor mask. The chaser mask has no bit.
    pub fn for_mask(mask: MaskId) -> Self {
        if mask.index() < 3 {
            Self(1 << mask.index())
        } else {
            Self::EMPTY
        }
    }

    /// Raw value.
    #[inline]
    pub fn raw(self) -> u8 {
        self.0
    }

    /// Bitwise union.
    #[inline]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Is the mask's bit set?
    pub fn contains(self, mask: MaskId) -> bool {
        let bit = Self::for_mask(mask);
        !bit.is_empty() && self.0 & bit.0 == bit.0
    }

    /// No bits set?
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Masks whose bit is set.
    pub fn masks(self) -> impl Iterator<Item = MaskId> {
        (0..3u8)
            .filter(move |i| self.0 & (1 << i) != 0)
            .map(MaskId)
    }
}

/// Ownership of one mask slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaskSlot {
    /// Claimable.
    Free,
    /// Worn by a connection.
    Claimed(ConnectionId),
    /// Owner left mid-match; not claimable until the next match.
    Retired,
}

/// First-come pool of four masks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskPool {
    slots: [MaskSlot; MaskId::COUNT],
}

impl Default for MaskPool {
    fn default() -> Self {
        Self {
            slots: [MaskSlot::Free; MaskId::COUNT],
        }
    }
}

impl MaskPool {
    /// Slot state.
    pub fn slot(&self, mask: MaskId) -> MaskSlot {
        self.slots[mask.index() as usize]
    }

    /// Owner of a mask.
    pub fn owner(&self, mask: MaskId) -> Option<ConnectionId> {
        match self.slot(mask) {
            MaskSlot::Claimed(id) => Some(id),
            _ => None,
        }
    }

    /// Number of claimed or retired slots.
    pub fn claimed_count(&self) -> usize {
        self.slots.iter().filter(|s| **s != MaskSlot::Free).count()
    }

    fn claim(&mut self, mask: MaskId, connection: ConnectionId) -> Result<(), Rejection> {
        let slot = &mut self.slots[mask.index() as usize];
        if *slot != MaskSlot::Free {
            return Err(Rejection::MaskTaken(mask.index()));
        }
        *slot = MaskSlot::Claimed(connection);
        Ok(())
    }

    /// Drop a connection's claim, freeing or retiring the slot.
    pub fn release(&mut self, connection: &ConnectionId, retire: bool) -> Option<MaskId> {
        let idx = self
            .slots
            .iter()
            .position(|s| *s == MaskSlot::Claimed(*connection))?;
        self.slots[idx] = if retire { MaskSlot::Retired } else { MaskSlot::Free };
        MaskId::new(idx as u8)
    }

    /// Free every slot.
    pub fn reset(&mut self) {
        self.slots = [MaskSlot::Free; MaskId::COUNT];
    }
}

/// Faction assignment, eliminations, token pickups and the shared faction score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactionEconomy {
    masks: MaskPool,
    faction_score: u32,
}

impl FactionEconomy {
    /// Fresh economy: all masks free, score zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The mask pool.
    pub fn masks(&self) -> &MaskPool {
        &self.masks
    }

    /// Mutable mask pool.
    pub fn masks_mut(&mut self) -> &mut MaskPool {
        &mut self.masks
    }

    /// Give `connection` the faction of `mask`. Once per match.
    ///
    /// Validation and the slot claim happen together, so of two claimants
    /// for the same mask exactly one wins.
    pub fn assign_faction(
        &mut self,
        roster: &mut Roster,
        connection: ConnectionId,
        mask: MaskId,
    ) -> Result<Faction, Rejection> {
        let conn = roster.get_mut(&connection).ok_or(Rejection::UnknownConnection)?;
        if conn.faction != Faction::NoFaction || conn.mask.is_some() {
            return Err(Rejection::AlreadyAssigned);
        }
        self.masks.claim(mask, connection)?;

        let faction = mask.faction();
        conn.faction = faction;
        conn.mask = Some(mask);
        Ok(faction)
    }

    /// Eliminate a living Survivor and drop a token with their mask bits.
    ///
    /// The token carries the victim's own mask bit plus everything they had
    /// inherited, and lands at a random point inside `bounds` on Main.
    pub fn eliminate(
        &mut self,
        roster: &mut Roster,
        world: &mut WorldEntities,
        rng: &mut DeterministicRng,
        bounds: &Bounds,
        connection: ConnectionId,
    ) -> Option<DroppedToken> {
        let conn = roster.get_mut(&connection)?;
        if conn.faction != Faction::Survivor || !conn.alive {
            return None;
        }
        conn.alive = false;

        // A survivor without a valid survivor mask counts as mask 0
        let own = conn
            .mask
            .filter(|m| m.index() < 3)
            .unwrap_or(MaskId(0));
        let granted = MaskBits::for_mask(own).union(conn.inherited_bits);
        let position = rng.position_in(bounds);

        Some(world.spawn_token(granted, position))
    }

    /// Pick up a dropped token.
    ///
    /// Returns the connection's inherited bits after the union.
    pub fn pickup_token(
        &mut self,
        roster: &mut Roster,
        layers: &LayerWorldRegistry,
        world: &mut WorldEntities,
        connection: ConnectionId,
        token: EntityId,
        interact_radius: f32,
    ) -> Result<MaskBits, Rejection> {
        let dropped = *world.token(token).ok_or(Rejection::UnknownTarget(token.0))?;
        let conn = roster.get_mut(&connection).ok_or(Rejection::UnknownConnection)?;

        if conn.faction != Faction::Survivor {
            return Err(Rejection::WrongFaction);
        }
        if !layers.is_on(&connection, DroppedToken::LAYER) {
            return Err(Rejection::DifferentLayer);
        }
        if !conn.position.within(dropped.position, interact_radius) {
            return Err(Rejection::OutOfRange);
        }

        world.remove_token(token);
        let granted = MaskBits::from_raw(dropped.granted_bits.raw());
        conn.inherited_bits = conn.inherited_bits.union(granted);
        debug!(
            connection = %connection,
            granted = granted.raw(),
            bits = conn.inherited_bits.raw(),
            "mask token picked up"
        );
        Ok(conn.inherited_bits)
    }

    /// Shared faction score.
    pub fn faction_score(&self) -> u32 {
        self.faction_score
    }

    /// Add to the shared score. Zero is ignored. Returns the new score.
    pub fn add_faction_score(&mut self, points: u32) -> u32 {
        self.faction_score = self.faction_score.saturating_add(points);
        self.faction_score
    }

    /// Reset the shared score.
    pub fn reset_faction_score(&mut self) {
        self.faction_score = 0;
    }

    /// Forget every claim and the score (new match).
    pub fn reset(&mut self) {
        self.masks.reset();
        self.faction_score = 0;
    }
}

// =============================================================================
// TESTS
// =============================================================================
