//! Match Authority
//!
//! The single writer of all match state. Requests are applied one at a time
//! and validated against the current state before anything is committed;
//! a rejected request leaves no trace besides a debug log line.
//!
//! Every mutation pushes a [`GameEvent`] that is drained once per tick by
//! [`Authority::tick`](crate::game::tick) and fanned out to mirrors.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::bounds::{Bounds, Position};
use crate::core::clock::{AuthoritativeClock, Seconds};
use crate::core::hash::StateHash;
use crate::core::rng::DeterministicRng;
use crate::game::config::MatchConfig;
use crate::game::cooldown::AbilityId;
use crate::game::countdown::{CountdownEngine, CountdownHandler};
use crate::game::error::Rejection;
use crate::game::events::{GameEvent, GameEventData, ScoreTarget};
use crate::game::faction::{FactionEconomy, MaskId};
use crate::game::layer::{Layer, LayerWorldRegistry};
use crate::game::leaderboard::LeaderboardEntry;
use crate::game::phase::{MatchOutcome, MatchPhase, PhaseStateMachine, PolicyError, TimeoutPolicy};
use crate::game::snapshot::{view_hash, ConnectionView, MatchSnapshot};
use crate::game::state::{normalize_display_name, Connection, ConnectionId, Roster};
use crate::game::victory::VictoryEvaluator;
use crate::game::world::{EntityId, WorldEntities, ZoneId};

// =============================================================================
// INTENTS
// =============================================================================

/// What a connection asks the authority to do.
///
/// Intents carry no sender: the transport binds the connection id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    /// Move to another layer.
    LayerTransition {
        /// Destination.
        target: Layer,
    },
    /// Fire an untargeted ability.
    UseAbility {
        /// Ability.
        ability: AbilityId,
    },
    /// Pick up an item or a mask token.
    Pickup {
        /// Entity.
        target: EntityId,
    },
    /// Turn in the carried item.
    Submit {
        /// Submit zone.
        zone: ZoneId,
    },
    /// Claim a mask (Lobby only).
    ClaimMask {
        /// Mask index, `0..4`.
        mask: u8,
    },
    /// Change display name.
    SetName {
        /// Requested name.
        name: String,
    },
    /// Movement report.
    ReportPosition {
        /// X.
        x: f32,
        /// Y.
        y: f32,
    },
}

// =============================================================================
// MATCH CORE
// =============================================================================

/// Match state shared by every request handler.
///
/// Kept apart from the countdown so the countdown's finish handler can
/// borrow it mutably while the countdown itself is borrowed by `tick`.
#[derive(Debug)]
pub(crate) struct MatchCore {
    pub(crate) phase: PhaseStateMachine,
    pub(crate) roster: Roster,
    pub(crate) layers: LayerWorldRegistry,
    pub(crate) economy: FactionEconomy,
    pub(crate) world: WorldEntities,
    pub(crate) rng: DeterministicRng,
    pub(crate) bounds: Bounds,
    pub(crate) outcome: Option<MatchOutcome>,
    pub(crate) final_leaderboard: Vec<LeaderboardEntry>,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) now: Seconds,
    pub(crate) tick: u64,
}

impl MatchCore {
    fn new(config: &MatchConfig, rng: DeterministicRng) -> Self {
        let phase = PhaseStateMachine::new(config.catcher_wins_on_timeout)
            .with_timeout_policy(default_timeout_policy());
        Self {
            phase,
            roster: Roster::new(),
            layers: LayerWorldRegistry::new(),
            economy: FactionEconomy::new(),
            world: WorldEntities::new(config.submit_zones.iter().cloned()),
            rng,
            bounds: config.lobby_bounds,
            outcome: None,
            final_leaderboard: Vec::new(),
            events: Vec::new(),
            now: 0.0,
            tick: 0,
        }
    }

    pub(crate) fn push(&mut self, data: GameEventData) {
        self.events.push(GameEvent::new(self.tick, self.now, data));
    }

    pub(crate) fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn advance_phase(&mut self, to: MatchPhase) -> bool {
        match self.phase.advance(to, self.now) {
            Some(change) => {
                self.push(GameEventData::PhaseChanged {
                    old_phase: change.from,
                    new_phase: change.to,
                });
                true
            }
            None => false,
        }
    }

    /// Common gate for gameplay actions: Playing, attached, alive.
    ///
    /// The Chaser freeze only blocks movement, see `report_position`.
    pub(crate) fn active_connection(&self, connection: ConnectionId) -> Result<&Connection, Rejection> {
        let phase = self.phase.current();
        if phase != MatchPhase::Playing {
            return Err(Rejection::WrongPhase(phase));
        }
        let conn = self.roster.get(&connection).ok_or(Rejection::UnknownConnection)?;
        if !conn.alive {
            return Err(Rejection::NotAlive);
        }
        Ok(conn)
    }

    /// Lobby -> ReadyCountdown.
    pub(crate) fn begin_ready_countdown(&mut self, countdown: &mut CountdownEngine, config: &MatchConfig) -> bool {
        if !self.advance_phase(MatchPhase::ReadyCountdown) {
            return false;
        }

        if config.drop_unmasked_on_start {
            let unmasked: Vec<ConnectionId> = self
                .roster
                .iter()
                .filter(|c| c.mask.is_none())
                .map(|c| c.id)
                .collect();
            for id in unmasked {
                info!(connection = %id, "dropping connection without a mask");
                self.detach_connection(&id);
            }
        }

        countdown.stop();
        countdown.set_total(config.ready_duration);
        countdown.start();
        self.push(GameEventData::CountdownChanged {
            remaining: countdown.remaining(),
            progress: countdown.progress(),
        });

        let until = self.now + config.chaser_freeze_duration;
        let mut frozen = Vec::new();
        for conn in self.roster.iter_mut().filter(|c| c.is_chaser()) {
            conn.frozen_until = until;
            frozen.push(conn.id);
        }
        for connection in frozen {
            self.push(GameEventData::ChaserFrozen { connection, until });
        }

        info!(
            connections = self.roster.len(),
            duration = config.ready_duration,
            "ready countdown started"
        );
        true
    }

    /// ReadyCountdown -> Playing. Called from the countdown finish handler.
    fn enter_playing(&mut self, countdown: &mut CountdownEngine, config: &MatchConfig) {
        if !self.advance_phase(MatchPhase::Playing) {
            return;
        }

        self.economy.reset_faction_score();
        self.push(GameEventData::ScoreChanged {
            target: ScoreTarget::Aggregate,
            score: 0,
        });

        self.bounds = config.game_bounds;
        for spawn in &config.item_spawns {
            let position = self.rng.position_in(&self.bounds);
            let item = self.world.spawn_item(spawn, position);
            self.push(GameEventData::ItemSpawned { item });
        }

        countdown.set_total(config.match_duration);
        countdown.start();
        self.push(GameEventData::CountdownChanged {
            remaining: countdown.remaining(),
            progress: countdown.progress(),
        });

        info!(
            survivors = self.roster.survivors_total(),
            duration = config.match_duration,
            "match started"
        );
    }

    /// Playing -> terminal. No-op from any other phase.
    pub(crate) fn end_match(&mut self, countdown: &mut CountdownEngine, outcome: MatchOutcome) -> bool {
        if !self.advance_phase(outcome.phase()) {
            return false;
        }
        countdown.stop();
        self.outcome = Some(outcome);
        self.final_leaderboard = self.roster.leaderboard();
        self.push(GameEventData::MatchEnded {
            outcome,
            leaderboard: self.final_leaderboard.clone(),
        });
        info!(
            outcome = ?outcome,
            survivors_alive = self.roster.survivors_alive(),
            faction_score = self.economy.faction_score(),
            "match ended"
        );
        true
    }

    /// Put a connection on a layer. The carried item follows.
    pub(crate) fn set_layer(&mut self, connection: ConnectionId, layer: Layer) {
        self.layers.assign(connection, layer);
        if let Some(item) = self.roster.get(&connection).and_then(|c| c.carried_item) {
            if let Some(item) = self.world.item_mut(item) {
                item.layer = layer;
            }
        }
        self.push(GameEventData::LayerChanged { connection, layer });
    }

    /// Eliminate a living Survivor and drop their token.
    pub(crate) fn eliminate(&mut self, victim: ConnectionId, by: Option<ConnectionId>) -> bool {
        let Some(token) = self.economy.eliminate(
            &mut self.roster,
            &mut self.world,
            &mut self.rng,
            &self.bounds,
            victim,
        ) else {
            return false;
        };
        self.release_carried(victim);
        self.push(GameEventData::SurvivorEliminated {
            victim,
            by,
            token: token.id,
        });
        self.push(GameEventData::TokenSpawned { token });
        info!(
            victim = %victim,
            alive = self.roster.survivors_alive(),
            granted = token.granted_bits.raw(),
            "survivor eliminated"
        );
        true
    }

    /// Drop the carried item where the connection stands.
    pub(crate) fn release_carried(&mut self, connection: ConnectionId) {
        let Some(conn) = self.roster.get_mut(&connection) else {
            return;
        };
        let Some(item_id) = conn.carried_item.take() else {
            return;
        };
        let position = conn.position;
        if let Some(item) = self.world.item_mut(item_id) {
            item.carrier = None;
            item.position = position;
        }
        self.push(GameEventData::ItemCarried {
            connection,
            item: None,
        });
    }

    /// Remove every trace of a connection.
    pub(crate) fn detach_connection(&mut self, connection: &ConnectionId) -> bool {
        if !self.roster.contains(connection) {
            return false;
        }
        self.release_carried(*connection);

        let retire = !matches!(self.phase.current(), MatchPhase::Lobby | MatchPhase::ReadyCountdown);
        let mask = self.economy.masks_mut().release(connection, retire);
        self.layers.remove(connection);
        self.roster.remove(connection);

        self.push(GameEventData::ConnectionLeft {
            connection: *connection,
        });
        info!(
            connection = %connection,
            mask = ?mask.map(|m| m.index()),
            retired = retire && mask.is_some(),
            "connection detached"
        );
        true
    }

    pub(crate) fn view_of(&self, conn: &Connection) -> ConnectionView {
        ConnectionView {
            id: conn.id,
            name: conn.display_name.clone(),
            faction: conn.faction,
            mask: conn.mask,
            layer: self.layers.layer_of(&conn.id).unwrap_or(Layer::Main),
            alive: conn.alive,
            inherited_bits: conn.inherited_bits,
            score: conn.score,
            carried_item: conn.carried_item,
            skill_disabled_until: conn.skill_disabled_until,
            frozen_until: conn.frozen_until,
            cooldowns: conn.cooldowns.clone(),
        }
    }
}

/// Survivors win on timeout iff at least one is still alive.
pub fn default_timeout_policy() -> TimeoutPolicy {
    Box::new(|roster: &Roster| roster.survivors_alive() >= 1)
}

// =============================================================================
// PHASE DRIVER
// =============================================================================

/// Turns countdown notifications into phase transitions.
pub(crate) struct PhaseDriver<'a> {
    pub(crate) core: &'a mut MatchCore,
    pub(crate) config: &'a MatchConfig,
}

impl CountdownHandler for PhaseDriver<'_> {
    fn on_remaining_changed(&mut self, remaining: Seconds, progress: f64) {
        self.core.push(GameEventData::CountdownChanged { remaining, progress });
    }

    fn on_finished(&mut self, countdown: &mut CountdownEngine) {
        let phase = self.core.phase.current();
        self.core.push(GameEventData::CountdownFinished { phase });
        match phase {
            MatchPhase::ReadyCountdown => self.core.enter_playing(countdown, self.config),
            MatchPhase::Playing => {
                let outcome = self.core.phase.resolve_timeout(&self.core.roster);
                debug!(outcome = ?outcome, "match clock ran out");
                self.core.end_match(countdown, outcome);
            }
            _ => {}
        }
    }
}

// =============================================================================
// AUTHORITY
// =============================================================================

/// The match authority.
#[derive(Debug)]
pub struct Authority {
    pub(crate) config: MatchConfig,
    pub(crate) clock: AuthoritativeClock,
    pub(crate) countdown: CountdownEngine,
    pub(crate) victory: VictoryEvaluator,
    pub(crate) core: MatchCore,
    match_id: [u8; 16],
    resets: u64,
}

impl Authority {
    /// Authority for a new match with a random id.
    pub fn new(config: MatchConfig) -> Self {
        Self::with_match_id(config, *uuid::Uuid::new_v4().as_bytes())
    }

    /// Authority with a fixed match id. Same id, same item and token placement.
    pub fn with_match_id(config: MatchConfig, match_id: [u8; 16]) -> Self {
        let rng = DeterministicRng::for_match(&match_id, 0);
        let core = MatchCore::new(&config, rng);
        let victory = VictoryEvaluator::new(config.victory.clone(), 0.0);
        info!(match_id = %hex::encode(&match_id[..4]), "authority created");
        Self {
            config,
            clock: AuthoritativeClock::new(),
            countdown: CountdownEngine::new(),
            victory,
            core,
            match_id,
            resets: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Match id.
    pub fn match_id(&self) -> &[u8; 16] {
        &self.match_id
    }

    /// Configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Authority time.
    pub fn now(&self) -> Seconds {
        self.clock.now()
    }

    /// The clock.
    pub fn clock(&self) -> &AuthoritativeClock {
        &self.clock
    }

    /// Current phase.
    pub fn phase(&self) -> MatchPhase {
        self.core.phase.current()
    }

    /// The shared countdown.
    pub fn countdown(&self) -> &CountdownEngine {
        &self.countdown
    }

    /// All attached connections.
    pub fn roster(&self) -> &Roster {
        &self.core.roster
    }

    /// One connection.
    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.core.roster.get(id)
    }

    /// Layer assignments.
    pub fn layers(&self) -> &LayerWorldRegistry {
        &self.core.layers
    }

    /// Layer of a connection.
    pub fn layer_of(&self, id: &ConnectionId) -> Option<Layer> {
        self.core.layers.layer_of(id)
    }

    /// Locality predicate.
    pub fn same_layer(&self, a: &ConnectionId, b: &ConnectionId) -> bool {
        self.core.layers.same_layer(a, b)
    }

    /// Mask pool and faction score.
    pub fn economy(&self) -> &FactionEconomy {
        &self.core.economy
    }

    /// Shared Survivor score.
    pub fn faction_score(&self) -> u32 {
        self.core.economy.faction_score()
    }

    /// Items, tokens, zones.
    pub fn world(&self) -> &WorldEntities {
        &self.core.world
    }

    /// Current play area.
    pub fn bounds(&self) -> &Bounds {
        &self.core.bounds
    }

    /// Result once the match has ended.
    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.core.outcome
    }

    /// Final standings once the match has ended, live standings before.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        if self.core.outcome.is_some() {
            self.core.final_leaderboard.clone()
        } else {
            self.core.roster.leaderboard()
        }
    }

    /// Victory evaluator.
    pub fn victory(&self) -> &VictoryEvaluator {
        &self.victory
    }

    /// Replicated view of every connection, in id order.
    pub fn connection_views(&self) -> Vec<ConnectionView> {
        self.core.roster.iter().map(|c| self.core.view_of(c)).collect()
    }

    /// Hash of the replicated view.
    pub fn view_hash(&self) -> StateHash {
        view_hash(self.phase(), self.faction_score(), &self.connection_views())
    }

    /// Full snapshot for a late-joining mirror.
    pub fn snapshot(&self) -> MatchSnapshot {
        let connections = self.connection_views();
        let hash = view_hash(self.phase(), self.faction_score(), &connections);
        MatchSnapshot {
            tick: self.clock.tick(),
            server_time: self.clock.now(),
            phase: self.phase(),
            countdown_remaining: self.countdown.remaining(),
            countdown_progress: self.countdown.progress(),
            faction_score: self.faction_score(),
            connections,
            items: self.core.world.items().cloned().collect(),
            tokens: self.core.world.tokens().copied().collect(),
            outcome: self.core.outcome,
            leaderboard: self.core.final_leaderboard.clone(),
            view_hash: hash,
        }
    }

    /// Drain records produced outside a tick.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.core.take_events()
    }

    // -------------------------------------------------------------------------
    // Timeout policy
    // -------------------------------------------------------------------------

    /// Install a timeout policy. Refused while one is installed.
    pub fn register_timeout_policy(&mut self, policy: TimeoutPolicy) -> Result<(), PolicyError> {
        self.core.phase.register_timeout_policy(policy)
    }

    /// Remove the installed timeout policy.
    pub fn clear_timeout_policy(&mut self) -> bool {
        self.core.phase.clear_timeout_policy()
    }

    // -------------------------------------------------------------------------
    // Connection lifecycle
    // -------------------------------------------------------------------------

    /// Attach a connection on Main. False if the id is already attached.
    pub fn attach(&mut self, id: ConnectionId, name: Option<&str>) -> bool {
        let name = name
            .and_then(normalize_display_name)
            .unwrap_or_else(|| Connection::default_name(&id));
        let mut conn = Connection::new(id, name.clone());
        conn.position = self.core.bounds.center();
        if !self.core.roster.insert(conn) {
            debug!(connection = %id, "attach ignored: already attached");
            return false;
        }
        self.core.layers.assign(id, Layer::Main);
        self.core.push(GameEventData::ConnectionJoined { connection: id, name });
        info!(connection = %id, connections = self.core.roster.len(), "connection attached");
        true
    }

    /// Detach a connection and free what it held.
    pub fn detach(&mut self, id: &ConnectionId) -> bool {
        self.core.detach_connection(id)
    }

    // -------------------------------------------------------------------------
    // Requests
    // -------------------------------------------------------------------------

    /// Apply an intent. Rejections are logged at debug level and become `false`.
    pub fn request(&mut self, connection: ConnectionId, intent: &Intent) -> bool {
        match self.handle_intent(connection, intent) {
            Ok(()) => true,
            Err(reason) => {
                debug!(connection = %connection, intent = ?intent, reason = %reason, "request rejected");
                false
            }
        }
    }

    /// Apply an intent, reporting why it was refused.
    pub fn handle_intent(&mut self, connection: ConnectionId, intent: &Intent) -> Result<(), Rejection> {
        match intent {
            Intent::LayerTransition { target } => {
                self.core.layer_transition(&self.config, connection, *target)
            }
            Intent::UseAbility { ability } => self.core.use_ability(&self.config, connection, *ability),
            Intent::Pickup { target } => self.core.pickup(&self.config, connection, *target),
            Intent::Submit { zone } => self.core.submit(connection, *zone),
            Intent::ClaimMask { mask } => self.claim_mask(connection, *mask),
            Intent::SetName { name } => self.set_name(connection, name),
            Intent::ReportPosition { x, y } => self.report_position(connection, Position::new(*x, *y)),
        }
    }

    /// Move to `target` if allowed and off cooldown.
    pub fn request_layer_transition(&mut self, connection: ConnectionId, target: Layer) -> bool {
        self.request(connection, &Intent::LayerTransition { target })
    }

    /// Fire an untargeted ability.
    pub fn request_ability_use(&mut self, connection: ConnectionId, ability: AbilityId) -> bool {
        self.request(connection, &Intent::UseAbility { ability })
    }

    /// Pick up an item or token.
    pub fn request_pickup(&mut self, connection: ConnectionId, target: EntityId) -> bool {
        self.request(connection, &Intent::Pickup { target })
    }

    /// Submit the carried item.
    pub fn request_submit(&mut self, connection: ConnectionId, zone: ZoneId) -> bool {
        self.request(connection, &Intent::Submit { zone })
    }

    /// Claim a mask.
    pub fn request_faction_claim(&mut self, connection: ConnectionId, mask: u8) -> bool {
        self.request(connection, &Intent::ClaimMask { mask })
    }

    fn claim_mask(&mut self, connection: ConnectionId, mask: u8) -> Result<(), Rejection> {
        let phase = self.phase();
        if phase != MatchPhase::Lobby {
            return Err(Rejection::WrongPhase(phase));
        }
        let mask = MaskId::new(mask).ok_or(Rejection::InvalidMask(mask))?;
        let faction = self
            .core
            .economy
            .assign_faction(&mut self.core.roster, connection, mask)?;
        self.core.push(GameEventData::FactionAssigned {
            connection,
            faction,
            mask,
        });
        info!(connection = %connection, mask = mask.index(), faction = ?faction, "mask claimed");

        if self.core.economy.masks().claimed_count() >= self.config.mask_quorum {
            self.core.begin_ready_countdown(&mut self.countdown, &self.config);
        }
        Ok(())
    }

    fn set_name(&mut self, connection: ConnectionId, name: &str) -> Result<(), Rejection> {
        let name = normalize_display_name(name).ok_or(Rejection::InvalidName)?;
        let conn = self
            .core
            .roster
            .get_mut(&connection)
            .ok_or(Rejection::UnknownConnection)?;
        if conn.display_name == name {
            return Ok(());
        }
        conn.display_name = name.clone();
        self.core.push(GameEventData::ConnectionRenamed { connection, name });
        Ok(())
    }

    fn report_position(&mut self, connection: ConnectionId, position: Position) -> Result<(), Rejection> {
        if !position.is_finite() {
            return Err(Rejection::InvalidPosition);
        }
        let now = self.core.now;
        let clamped = self.core.bounds.clamp(position);
        let conn = self
            .core
            .roster
            .get_mut(&connection)
            .ok_or(Rejection::UnknownConnection)?;
        if conn.is_frozen(now) {
            return Err(Rejection::Frozen);
        }
        conn.position = clamped;
        if let Some(item) = conn.carried_item.and_then(|id| self.core.world.item_mut(id)) {
            item.position = clamped;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Authority commands
    // -------------------------------------------------------------------------

    /// Start the ready countdown without waiting for the mask quorum.
    pub fn force_start(&mut self) -> bool {
        if self.phase() != MatchPhase::Lobby {
            return false;
        }
        info!("force start");
        self.core.begin_ready_countdown(&mut self.countdown, &self.config)
    }

    /// End the match. Only from Playing; repeated calls are no-ops.
    pub fn end_match(&mut self, outcome: MatchOutcome) -> bool {
        self.core.end_match(&mut self.countdown, outcome)
    }

    /// Eliminate a Survivor outside of any ability.
    pub fn eliminate(&mut self, victim: ConnectionId) -> bool {
        if self.phase() != MatchPhase::Playing {
            return false;
        }
        self.core.eliminate(victim, None)
    }

    /// Add to the shared score from an external source. Zero is ignored.
    pub fn add_faction_score(&mut self, points: u32) -> u32 {
        if points == 0 {
            return self.faction_score();
        }
        let score = self.core.economy.add_faction_score(points);
        self.core.push(GameEventData::ScoreChanged {
            target: ScoreTarget::Aggregate,
            score,
        });
        score
    }

    /// Back to Lobby with everything a match sets cleared. Connections stay.
    pub fn reset_match(&mut self) {
        self.resets += 1;
        let now = self.clock.now();

        self.countdown = CountdownEngine::new();
        if let Some(change) = self.core.phase.reset(now) {
            self.core.push(GameEventData::PhaseChanged {
                old_phase: change.from,
                new_phase: change.to,
            });
        }

        let core = &mut self.core;
        core.outcome = None;
        core.final_leaderboard.clear();
        core.economy.reset();
        core.world.clear();
        core.layers.reset_all();
        core.bounds = self.config.lobby_bounds;
        core.rng = DeterministicRng::for_match(&self.match_id, self.resets);
        let center = core.bounds.center();
        for conn in core.roster.iter_mut() {
            conn.reset_for_new_match();
            conn.position = center;
        }
        core.push(GameEventData::MatchReset);

        info!(resets = self.resets, connections = core.roster.len(), "match reset");
    }
}

// =============================================================================
// TESTS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::fixtures::{config, id, playing};
    use super::*;
    use crate::game::faction::{Faction, MaskSlot};

    fn authority_with(n: u8) -> Authority {
        let mut auth = Authority::with_match_id(config(), [7; 16]);
        for i in 0..n {
            assert!(auth.attach(id(i), Some(&format!("p{i}"))));
        }
        auth
    }

    fn has_event(events: &[GameEvent], pred: impl Fn(&GameEventData) -> bool) -> bool {
        events.iter().any(|e| pred(&e.data))
    }

    #[test]
    fn test_attach_defaults() {
        let mut auth = Authority::with_match_id(config(), [1; 16]);
        assert!(auth.attach(id(1), None));
        assert!(!auth.attach(id(1), Some("again")));

        let conn = auth.connection(&id(1)).unwrap();
        assert_eq!(conn.display_name, "Player_01010101");
        assert_eq!(conn.faction, Faction::NoFaction);
        assert_eq!(auth.layer_of(&id(1)), Some(Layer::Main));

        let events = auth.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0].data, GameEventData::ConnectionJoined { .. }));
    }

    #[test]
    fn test_quorum_starts_ready_countdown() {
        let mut auth = authority_with(5);
        for i in 0..3 {
            assert!(auth.request_faction_claim(id(i), i));
            assert_eq!(auth.phase(), MatchPhase::Lobby);
        }
        assert!(auth.request_faction_claim(id(3), 3));
        assert_eq!(auth.phase(), MatchPhase::ReadyCountdown);
        assert!(auth.countdown().is_running());
        assert_eq!(auth.countdown().remaining(), 5.0);

        // Unmasked connection was dropped
        assert!(auth.connection(&id(4)).is_none());
        assert!(auth.layer_of(&id(4)).is_none());

        // Chaser frozen for the configured time
        assert_eq!(auth.connection(&id(3)).unwrap().frozen_until, 5.0);
        let events = auth.take_events();
        assert!(has_event(&events, |d| matches!(d, GameEventData::ChaserFrozen { .. })));
    }

    #[test]
    fn test_claim_rejections() {
        let mut auth = authority_with(2);
        assert_eq!(
            auth.handle_intent(id(0), &Intent::ClaimMask { mask: 9 }),
            Err(Rejection::InvalidMask(9))
        );
        assert!(auth.request_faction_claim(id(0), 1));
        assert_eq!(
            auth.handle_intent(id(1), &Intent::ClaimMask { mask: 1 }),
            Err(Rejection::MaskTaken(1))
        );
        assert_eq!(
            auth.handle_intent(id(0), &Intent::ClaimMask { mask: 2 }),
            Err(Rejection::AlreadyAssigned)
        );
        assert_eq!(
            auth.handle_intent(id(9), &Intent::ClaimMask { mask: 2 }),
            Err(Rejection::UnknownConnection)
        );
    }

    #[test]
    fn test_claim_only_in_lobby() {
        let mut auth = authority_with(2);
        assert!(auth.force_start());
        assert_eq!(
            auth.handle_intent(id(0), &Intent::ClaimMask { mask: 0 }),
            Err(Rejection::WrongPhase(MatchPhase::ReadyCountdown))
        );
    }

    #[test]
    fn test_force_start_once() {
        let mut auth = authority_with(1);
        assert!(auth.request_faction_claim(id(0), 0));
        assert!(auth.force_start());
        assert!(!auth.force_start());
        assert_eq!(auth.phase(), MatchPhase::ReadyCountdown);
    }

    #[test]
    fn test_detach_frees_mask_in_lobby() {
        let mut auth = authority_with(2);
        assert!(auth.request_faction_claim(id(0), 2));
        assert!(auth.detach(&id(0)));
        assert!(!auth.detach(&id(0)));
        assert_eq!(auth.economy().masks().slot(MaskId::new(2).unwrap()), MaskSlot::Free);
        assert!(auth.request_faction_claim(id(1), 2));
    }

    #[test]
    fn test_set_name() {
        let mut auth = authority_with(1);
        assert!(auth.request(id(0), &Intent::SetName { name: "  neo  ".into() }));
        assert_eq!(auth.connection(&id(0)).unwrap().display_name, "neo");
        assert_eq!(
            auth.handle_intent(id(0), &Intent::SetName { name: "   ".into() }),
            Err(Rejection::InvalidName)
        );
    }

    #[test]
    fn test_report_position_clamped_to_bounds() {
        let mut auth = authority_with(1);
        assert!(auth.request(id(0), &Intent::ReportPosition { x: 50.0, y: -3.0 }));
        assert_eq!(auth.connection(&id(0)).unwrap().position, Position::new(10.0, -3.0));
        assert_eq!(
            auth.handle_intent(id(0), &Intent::ReportPosition { x: f32::NAN, y: 0.0 }),
            Err(Rejection::InvalidPosition)
        );
    }

    #[test]
    fn test_frozen_chaser_cannot_move() {
        let mut auth = authority_with(1);
        assert!(auth.request_faction_claim(id(0), 3));
        assert!(auth.force_start());
        assert_eq!(
            auth.handle_intent(id(0), &Intent::ReportPosition { x: 1.0, y: 1.0 }),
            Err(Rejection::Frozen)
        );
    }

    #[test]
    fn test_freeze_only_blocks_movement() {
        let mut auth = playing(MatchConfig {
            chaser_freeze_duration: 20.0,
            ..config()
        });
        let chaser = id(3);
        assert!(auth.connection(&chaser).unwrap().is_frozen(auth.now()));
        assert_eq!(
            auth.handle_intent(chaser, &Intent::ReportPosition { x: 1.0, y: 1.0 }),
            Err(Rejection::Frozen)
        );
        assert_eq!(
            auth.handle_intent(chaser, &Intent::LayerTransition { target: Layer::L1 }),
            Ok(())
        );
        assert_eq!(auth.layer_of(&chaser), Some(Layer::L1));
    }

    #[test]
    fn test_detached_connection_rejected_everywhere() {
        let mut auth = playing(config());
        assert!(auth.detach(&id(0)));
        auth.take_events();

        let intents = [
            Intent::LayerTransition { target: Layer::L1 },
            Intent::UseAbility { ability: AbilityId::Shockwave },
            Intent::UseAbility { ability: AbilityId::Ultimate },
            Intent::Pickup { target: EntityId(0) },
            Intent::Submit { zone: 0 },
            Intent::SetName { name: "ghost".into() },
            Intent::ReportPosition { x: 1.0, y: 1.0 },
        ];
        for intent in &intents {
            assert_eq!(
                auth.handle_intent(id(0), intent),
                Err(Rejection::UnknownConnection),
                "{intent:?}"
            );
        }
        assert!(auth.take_events().is_empty());
        assert!(auth.connection(&id(0)).is_none());
    }

    #[test]
    fn test_gameplay_requests_need_playing() {
        let mut auth = authority_with(1);
        assert_eq!(
            auth.handle_intent(id(0), &Intent::LayerTransition { target: Layer::L1 }),
            Err(Rejection::WrongPhase(MatchPhase::Lobby))
        );
        assert!(!auth.request_ability_use(id(0), AbilityId::Shockwave));
        assert!(!auth.request_pickup(id(0), EntityId(0)));
        assert!(!auth.request_submit(id(0), 0));
    }

    #[test]
    fn test_end_match_requires_playing() {
        let mut auth = authority_with(1);
        assert!(!auth.end_match(MatchOutcome::CatcherWin));
        assert_eq!(auth.phase(), MatchPhase::Lobby);
        assert!(auth.outcome().is_none());
    }

    #[test]
    fn test_add_faction_score() {
        let mut auth = authority_with(0);
        assert_eq!(auth.add_faction_score(0), 0);
        assert!(auth.take_events().is_empty());
        assert_eq!(auth.add_faction_score(15), 15);
        let events = auth.take_events();
        assert!(has_event(&events, |d| matches!(
            d,
            GameEventData::ScoreChanged {
                target: ScoreTarget::Aggregate,
                score: 15
            }
        )));
    }

    #[test]
    fn test_default_policy_installed() {
        let mut auth = authority_with(0);
        assert_eq!(
            auth.register_timeout_policy(Box::new(|_: &Roster| true)),
            Err(PolicyError::AlreadyRegistered)
        );
        assert!(auth.clear_timeout_policy());
        assert!(auth.register_timeout_policy(Box::new(|_: &Roster| true)).is_ok());
    }

    #[test]
    fn test_detach_mid_match_retires_mask() {
        let mut auth = playing(config());
        assert!(auth.detach(&id(1)));
        assert_eq!(auth.economy().masks().slot(MaskId::new(1).unwrap()), MaskSlot::Retired);
        assert_eq!(auth.roster().survivors_total(), 2);
        assert!(auth.layer_of(&id(1)).is_none());
    }

    #[test]
    fn test_reset_match() {
        let mut auth = playing(config());
        assert!(auth.eliminate(id(0)));
        auth.add_faction_score(30);
        assert!(auth.end_match(MatchOutcome::CatcherWin));
        auth.take_events();

        auth.reset_match();
        assert_eq!(auth.phase(), MatchPhase::Lobby);
        assert!(auth.outcome().is_none());
        assert_eq!(auth.faction_score(), 0);
        assert_eq!(auth.world().items().count(), 0);
        assert_eq!(auth.world().tokens().count(), 0);
        assert_eq!(*auth.bounds(), auth.config().lobby_bounds);
        for conn in auth.roster().iter() {
            assert_eq!(conn.faction, Faction::NoFaction);
            assert!(conn.alive);
            assert!(conn.inherited_bits.is_empty());
            assert_eq!(auth.layer_of(&conn.id), Some(Layer::Main));
        }
        assert_eq!(auth.economy().masks().claimed_count(), 0);
        assert_eq!(auth.connection(&id(2)).unwrap().display_name, "p2");

        let events = auth.take_events();
        assert!(has_event(&events, |d| matches!(d, GameEventData::MatchReset)));

        // A new match can start
        for i in 0..4 {
            assert!(auth.request_faction_claim(id(i), 3 - i));
        }
        assert_eq!(auth.phase(), MatchPhase::ReadyCountdown);
    }

    #[test]
    fn test_end_match_idempotent() {
        let mut auth = playing(config());
        assert!(auth.end_match(MatchOutcome::CatcherWin));
        assert!(!auth.end_match(MatchOutcome::CatcherWin));
        assert!(!auth.end_match(MatchOutcome::RunnerWin));
        assert_eq!(auth.phase(), MatchPhase::CatcherWin);
        assert!(!auth.countdown().is_running());

        let events = auth.take_events();
        let ended = events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::MatchEnded { .. }))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_intent_json() {
        let intent = Intent::LayerTransition { target: Layer::L2 };
        let json = serde_json::to_string(&intent).unwrap();
        assert_eq!(json, r#"{"intent":"layer_transition","target":"l2"}"#);
        let back: Intent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, intent);
    }

    #[test]
    fn test_snapshot_hash_matches() {
        let mut auth = authority_with(3);
        auth.request_faction_claim(id(1), 3);
        let snap = auth.snapshot();
        assert_eq!(snap.view_hash, auth.view_hash());
        assert_eq!(snap.connections.len(), 3);
        assert_eq!(snap.phase, MatchPhase::Lobby);
    }
}
