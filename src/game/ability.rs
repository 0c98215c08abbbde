//! Abilities
//!
//! Layer moves for both factions plus the two Chaser abilities. Every
//! ability is validated in full before its cooldown is committed, so a
//! refused request never costs a cooldown.

use tracing::debug;

use crate::core::clock::Seconds;
use crate::game::authority::MatchCore;
use crate::game::config::MatchConfig;
use crate::game::cooldown::AbilityId;
use crate::game::error::Rejection;
use crate::game::events::GameEventData;
use crate::game::layer::{allowed_layers, Layer};
use crate::game::state::ConnectionId;

impl MatchCore {
    /// Validate and commit a layer move.
    pub(crate) fn layer_transition(
        &mut self,
        config: &MatchConfig,
        connection: ConnectionId,
        target: Layer,
    ) -> Result<(), Rejection> {
        let now = self.now;
        let conn = self.active_connection(connection)?;
        let (faction, mask, inherited) = (conn.faction, conn.mask, conn.inherited_bits);
        let skills_off = conn.is_survivor() && conn.skill_disabled(now);

        let current = self.layers.layer_of(&connection).ok_or(Rejection::UnknownConnection)?;
        if current == target {
            return Err(Rejection::AlreadyOnLayer(target));
        }
        if !allowed_layers(faction, mask, inherited).contains(target) {
            return Err(Rejection::LayerNotAllowed(target));
        }
        if skills_off {
            return Err(Rejection::SkillDisabled);
        }
        let duration = config
            .cooldowns
            .duration_for(faction, AbilityId::LayerMove)
            .ok_or(Rejection::WrongFaction)?;

        self.commit_cooldown(connection, AbilityId::LayerMove, duration)?;
        self.set_layer(connection, target);
        debug!(connection = %connection, from = ?current, to = ?target, "layer move");
        Ok(())
    }

    /// Validate and commit an untargeted ability.
    pub(crate) fn use_ability(
        &mut self,
        config: &MatchConfig,
        connection: ConnectionId,
        ability: AbilityId,
    ) -> Result<(), Rejection> {
        // Layer moves go through `layer_transition`, which carries the target
        if ability == AbilityId::LayerMove {
            return Err(Rejection::MissingTarget);
        }
        let faction = self.active_connection(connection)?.faction;
        let duration = config
            .cooldowns
            .duration_for(faction, ability)
            .ok_or(Rejection::WrongFaction)?;

        self.commit_cooldown(connection, ability, duration)?;
        match ability {
            AbilityId::Shockwave => {
                self.shockwave(connection, config.shockwave_radius);
            }
            AbilityId::Ultimate => self.ultimate(connection, config.cooldowns.survivor_skill_disable),
            AbilityId::LayerMove => {}
        }
        Ok(())
    }

    fn commit_cooldown(
        &mut self,
        connection: ConnectionId,
        ability: AbilityId,
        duration: Seconds,
    ) -> Result<Seconds, Rejection> {
        let now = self.now;
        let conn = self
            .roster
            .get_mut(&connection)
            .ok_or(Rejection::UnknownConnection)?;
        if !conn.cooldowns.try_use(ability, now, duration) {
            return Err(Rejection::CooldownActive(conn.cooldowns.remaining_seconds(ability, now)));
        }
        let next_usable = conn.cooldowns.next_usable(ability);
        self.push(GameEventData::CooldownCommitted {
            connection,
            ability,
            next_usable,
        });
        Ok(next_usable)
    }

    /// Eliminate every living Survivor near the caster on the caster's layer.
    fn shockwave(&mut self, caster: ConnectionId, radius: f32) -> usize {
        let Some(origin) = self.roster.get(&caster).map(|c| c.position) else {
            return 0;
        };
        let Some(layer) = self.layers.layer_of(&caster) else {
            return 0;
        };
        let victims: Vec<ConnectionId> = self
            .layers
            .connections_on(layer)
            .filter_map(|id| self.roster.get(&id))
            .filter(|c| c.is_survivor() && c.alive)
            .filter(|c| c.position.within(origin, radius))
            .map(|c| c.id)
            .collect();

        for victim in &victims {
            self.eliminate(*victim, Some(caster));
        }
        debug!(caster = %caster, hits = victims.len(), "shockwave");
        victims.len()
    }

    /// Pull every Survivor onto the caster's layer and switch their skills off.
    fn ultimate(&mut self, caster: ConnectionId, disable_for: Seconds) {
        let Some(layer) = self.layers.layer_of(&caster) else {
            return;
        };
        let until = self.now + disable_for;
        let survivors: Vec<ConnectionId> = self
            .roster
            .iter()
            .filter(|c| c.is_survivor())
            .map(|c| c.id)
            .collect();

        for id in survivors {
            if !self.layers.is_on(&id, layer) {
                self.set_layer(id, layer);
            }
            if let Some(conn) = self.roster.get_mut(&id) {
                conn.skill_disabled_until = until;
            }
            self.push(GameEventData::SkillsDisabled { connection: id, until });
        }
        debug!(caster = %caster, layer = ?layer, until, "ultimate");
    }
}
