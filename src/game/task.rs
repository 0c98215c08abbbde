//! Layer tasks: picking things up and turning items in.

use tracing::debug;

use crate::game::authority::MatchCore;
use crate::game::config::MatchConfig;
use crate::game::error::Rejection;
use crate::game::events::{GameEventData, ScoreTarget};
use crate::game::faction::Faction;
use crate::game::state::ConnectionId;
use crate::game::world::{EntityId, ZoneId};

impl MatchCore {
    /// Pick up a mask token or an item, whichever `target` names.
    pub(crate) fn pickup(
        &mut self,
        config: &MatchConfig,
        connection: ConnectionId,
        target: EntityId,
    ) -> Result<(), Rejection> {
        self.active_connection(connection)?;

        if self.world.token(target).is_some() {
            // Tokens do not need free hands
            let bits = self.economy.pickup_token(
                &mut self.roster,
                &self.layers,
                &mut self.world,
                connection,
                target,
                config.interact_radius,
            )?;
            self.push(GameEventData::EntityRemoved { id: target });
            self.push(GameEventData::InheritedBitsChanged { connection, bits });
            return Ok(());
        }

        self.pickup_item(connection, target, config.interact_radius)
    }

    fn pickup_item(&mut self, connection: ConnectionId, target: EntityId, radius: f32) -> Result<(), Rejection> {
        let item = self.world.item(target).ok_or(Rejection::UnknownTarget(target.0))?;
        let conn = self.roster.get(&connection).ok_or(Rejection::UnknownConnection)?;

        if item.carrier.is_some() {
            return Err(Rejection::AlreadyTaken);
        }
        if conn.is_chaser() {
            return Err(Rejection::WrongFaction);
        }
        if item.allowed_faction.is_some_and(|f| f != conn.faction) {
            return Err(Rejection::WrongFaction);
        }
        if conn.carried_item.is_some() {
            return Err(Rejection::HandsFull);
        }
        if !self.layers.is_on(&connection, item.layer) {
            return Err(Rejection::DifferentLayer);
        }
        if !conn.position.within(item.position, radius) {
            return Err(Rejection::OutOfRange);
        }

        if let Some(item) = self.world.item_mut(target) {
            item.carrier = Some(connection);
        }
        if let Some(conn) = self.roster.get_mut(&connection) {
            conn.carried_item = Some(target);
        }
        self.push(GameEventData::ItemCarried {
            connection,
            item: Some(target),
        });
        debug!(connection = %connection, item = target.0, "item picked up");
        Ok(())
    }

    /// Turn the carried item in at a zone.
    pub(crate) fn submit(&mut self, connection: ConnectionId, zone: ZoneId) -> Result<(), Rejection> {
        self.active_connection(connection)?;
        let zone = self.world.zone(zone).cloned().ok_or(Rejection::UnknownZone(zone))?;
        let conn = self.roster.get(&connection).ok_or(Rejection::UnknownConnection)?;

        let item = conn.carried_item.ok_or(Rejection::NothingCarried)?;
        let faction = conn.faction;
        if faction != zone.faction {
            return Err(Rejection::WrongFaction);
        }
        if !self.layers.is_on(&connection, zone.layer) {
            return Err(Rejection::DifferentLayer);
        }
        if !conn.position.within(zone.position, zone.radius) {
            return Err(Rejection::OutOfRange);
        }

        self.world.remove_item(item);
        let score = match self.roster.get_mut(&connection) {
            Some(conn) => {
                conn.carried_item = None;
                conn.score = conn.score.saturating_add(zone.score_per_submit);
                conn.score
            }
            None => return Err(Rejection::UnknownConnection),
        };
        self.push(GameEventData::EntityRemoved { id: item });
        self.push(GameEventData::ItemCarried { connection, item: None });
        self.push(GameEventData::ScoreChanged {
            target: ScoreTarget::Connection(connection),
            score,
        });

        if faction == Faction::Survivor {
            let total = self.economy.add_faction_score(zone.score_per_submit);
            self.push(GameEventData::ScoreChanged {
                target: ScoreTarget::Aggregate,
                score: total,
            });
        }
        if self.world.complete_task(faction) {
            self.push(GameEventData::TaskCompleted { faction });
        }

        debug!(
            connection = %connection,
            zone = zone.id,
            score,
            faction_score = self.economy.faction_score(),
            "item submitted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::bounds::Position;
    use crate::game::authority::fixtures::{config, id, playing};
    use crate::game::authority::{Authority, Intent};
    use crate::game::config::{CooldownConfig, MatchConfig};
    use crate::game::error::Rejection;
    use crate::game::events::{GameEventData, ScoreTarget};
    use crate::game::faction::{Faction, MaskBits};
    use crate::game::layer::Layer;
    use crate::game::world::EntityId;

    const CHASER: u8 = 3;

    fn free_moves() -> MatchConfig {
        MatchConfig {
            cooldowns: CooldownConfig {
                survivor_layer_move: 0.0,
                chaser_layer_move: 0.0,
                ..CooldownConfig::default()
            },
            ..config()
        }
    }

    fn item_on(auth: &Authority, layer: Layer) -> (EntityId, Position) {
        let item = auth.world().items().find(|i| i.layer == layer).unwrap();
        (item.id, item.position)
    }

    fn go_to(auth: &mut Authority, n: u8, p: Position) {
        assert!(auth.request(id(n), &Intent::ReportPosition { x: p.x, y: p.y }));
    }

    #[test]
    fn test_items_spawned_on_playing() {
        let auth = playing(config());
        assert_eq!(auth.world().items().count(), 3);
        for item in auth.world().items() {
            assert!(auth.config().game_bounds.contains(item.position));
            assert!(item.carrier.is_none());
        }
    }

    #[test]
    fn test_pickup_and_submit() {
        let mut auth = playing(free_moves());
        let (item, at) = item_on(&auth, Layer::L1);

        // Wrong layer first
        go_to(&mut auth, 0, at);
        assert_eq!(
            auth.handle_intent(id(0), &Intent::Pickup { target: item }),
            Err(Rejection::DifferentLayer)
        );

        assert!(auth.request_layer_transition(id(0), Layer::L1));
        assert!(auth.request_pickup(id(0), item));
        assert_eq!(auth.connection(&id(0)).unwrap().carried_item, Some(item));

        // The item follows the carrier
        assert!(auth.request_layer_transition(id(0), Layer::Main));
        assert_eq!(auth.world().item(item).unwrap().layer, Layer::Main);

        // Out of the zone
        go_to(&mut auth, 0, Position::new(10.0, 10.0));
        assert_eq!(
            auth.handle_intent(id(0), &Intent::Submit { zone: 0 }),
            Err(Rejection::OutOfRange)
        );

        go_to(&mut auth, 0, Position::new(1.0, 0.0));
        auth.take_events();
        assert!(auth.request_submit(id(0), 0));

        let conn = auth.connection(&id(0)).unwrap();
        assert_eq!(conn.carried_item, None);
        assert_eq!(conn.score, 10);
        assert_eq!(auth.faction_score(), 10);
        assert!(auth.world().item(item).is_none());
        assert!(auth.world().is_task_complete(Faction::Survivor));

        let events = auth.take_events();
        assert!(events.iter().any(|e| matches!(
            e.data,
            GameEventData::ScoreChanged {
                target: ScoreTarget::Aggregate,
                score: 10
            }
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e.data, GameEventData::TaskCompleted { faction: Faction::Survivor })));
    }

    #[test]
    fn test_hands_full() {
        let mut auth = playing(free_moves());
        let (first, at) = item_on(&auth, Layer::L1);
        assert!(auth.request_layer_transition(id(0), Layer::L1));
        go_to(&mut auth, 0, at);
        assert!(auth.request_pickup(id(0), first));

        // Bring a second item next to the carrier
        let (second, _) = item_on(&auth, Layer::L2);
        {
            let it = auth.core.world.item_mut(second).unwrap();
            it.layer = Layer::L1;
            it.position = at;
        }
        assert_eq!(
            auth.handle_intent(id(0), &Intent::Pickup { target: second }),
            Err(Rejection::HandsFull)
        );
    }

    #[test]
    fn test_item_taken_once() {
        let mut auth = playing(free_moves());
        let (item, at) = item_on(&auth, Layer::L1);
        assert!(auth.request_layer_transition(id(0), Layer::L1));
        go_to(&mut auth, 0, at);
        assert!(auth.request_pickup(id(0), item));

        // Survivor 1 inherits L1 and tries to grab the same item
        auth.core.roster.get_mut(&id(1)).unwrap().inherited_bits = MaskBits::from_raw(0b001);
        assert!(auth.request_layer_transition(id(1), Layer::L1));
        go_to(&mut auth, 1, at);
        assert_eq!(
            auth.handle_intent(id(1), &Intent::Pickup { target: item }),
            Err(Rejection::AlreadyTaken)
        );
    }

    #[test]
    fn test_chaser_cannot_carry() {
        let mut auth = playing(free_moves());
        let (item, at) = item_on(&auth, Layer::L2);
        assert!(auth.request_layer_transition(id(CHASER), Layer::L2));
        go_to(&mut auth, CHASER, at);
        assert_eq!(
            auth.handle_intent(id(CHASER), &Intent::Pickup { target: item }),
            Err(Rejection::WrongFaction)
        );
    }

    #[test]
    fn test_out_of_range_pickup() {
        let mut auth = playing(free_moves());
        let (item, at) = item_on(&auth, Layer::L1);
        assert!(auth.request_layer_transition(id(0), Layer::L1));
        let far = Position::new(if at.x > 0.0 { at.x - 5.0 } else { at.x + 5.0 }, at.y);
        go_to(&mut auth, 0, far);
        assert_eq!(
            auth.handle_intent(id(0), &Intent::Pickup { target: item }),
            Err(Rejection::OutOfRange)
        );
    }

    #[test]
    fn test_token_pickup_grants_bits() {
        let mut auth = playing(free_moves());
        assert!(auth.eliminate(id(2)));
        let token = *auth.world().tokens().next().unwrap();
        assert_eq!(token.granted_bits.raw(), 0b100);

        go_to(&mut auth, 0, token.position);
        auth.take_events();
        assert!(auth.request_pickup(id(0), token.id));
        assert_eq!(auth.connection(&id(0)).unwrap().inherited_bits.raw(), 0b100);
        assert!(auth.world().token(token.id).is_none());

        // L3 is open now
        assert!(auth.request_layer_transition(id(0), Layer::L3));

        let events = auth.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e.data, GameEventData::InheritedBitsChanged { .. })));
    }

    #[test]
    fn test_submit_without_item() {
        let mut auth = playing(config());
        assert_eq!(
            auth.handle_intent(id(0), &Intent::Submit { zone: 0 }),
            Err(Rejection::NothingCarried)
        );
        assert_eq!(
            auth.handle_intent(id(0), &Intent::Submit { zone: 42 }),
            Err(Rejection::UnknownZone(42))
        );
    }

    #[test]
    fn test_unknown_target() {
        let mut auth = playing(config());
        assert_eq!(
            auth.handle_intent(id(0), &Intent::Pickup { target: EntityId(999) }),
            Err(Rejection::UnknownTarget(999))
        );
    }
}
