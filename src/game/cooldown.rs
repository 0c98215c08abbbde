//! Ability cooldowns.
//!
//! Every ability goes through the same gate: a per-ability "next usable"
//! timestamp. The authority processes requests one at a time, so check and
//! commit happen in one step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::clock::Seconds;

/// Abilities gated by cooldowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityId {
    /// Chaser attack scan around the caster.
    Shockwave,
    /// Switch to another layer.
    LayerMove,
    /// Chaser ultimate: summon all Survivors and disable their skills.
    Ultimate,
}

impl AbilityId {
    /// All abilities.
    pub const ALL: [AbilityId; 3] = [AbilityId::Shockwave, AbilityId::LayerMove, AbilityId::Ultimate];
}

/// Per-connection cooldown state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CooldownGate {
    next_usable: BTreeMap<AbilityId, Seconds>,
}

impl CooldownGate {
    /// Empty gate; every ability is ready.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `ability` at `now` if it is ready, committing `now + duration`.
    ///
    /// Returns false with no side effect while cooling down.
    pub fn try_use(&mut self, ability: AbilityId, now: Seconds, duration: Seconds) -> bool {
        if !self.is_ready(ability, now) {
            return false;
        }
        self.next_usable.insert(ability, now + duration.max(0.0));
        true
    }

    /// Is `ability` usable at `now`?
    pub fn is_ready(&self, ability: AbilityId, now: Seconds) -> bool {
        now >= self.next_usable(ability)
    }

    /// Timestamp at which `ability` becomes usable (0 if never used).
    pub fn next_usable(&self, ability: AbilityId) -> Seconds {
        self.next_usable.get(&ability).copied().unwrap_or(0.0)
    }

    /// Seconds until `ability` is usable, never negative.
    pub fn remaining_seconds(&self, ability: AbilityId, now: Seconds) -> Seconds {
        (self.next_usable(ability) - now).max(0.0)
    }

    /// Overwrite a timestamp. Used when replaying authority records.
    pub fn set_next_usable(&mut self, ability: AbilityId, at: Seconds) {
        self.next_usable.insert(ability, at);
    }

    /// Iterate committed timestamps.
    pub fn iter(&self) -> impl Iterator<Item = (AbilityId, Seconds)> + '_ {
        self.next_usable.iter().map(|(a, t)| (*a, *t))
    }

    /// Forget everything (new match).
    pub fn clear(&mut self) {
        self.next_usable.clear();
    }
}
