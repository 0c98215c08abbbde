//! Authoritative Tick
//!
//! One fixed step of the authority. Order within a tick:
//!
//! 1. Advance the clock
//! 2. Advance the countdown (may move the phase forward)
//! 3. Evaluate victory
//! 4. Drain the change records produced since the last tick
//!
//! Requests are applied between ticks, so the records they produce are
//! drained together with the tick's own.

#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::core::clock::Seconds;
use crate::game::authority::{Authority, PhaseDriver};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::phase::{MatchOutcome, MatchPhase};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Records produced since the previous tick, in order.
    pub events: Vec<GameEvent>,
    /// Phase after the tick.
    pub phase: MatchPhase,
    /// Whether the match ended during this tick.
    pub match_ended: bool,
    /// Winner, once decided.
    pub outcome: Option<MatchOutcome>,
}

impl Authority {
    /// Run one tick of `dt` seconds.
    pub fn tick(&mut self, dt: Seconds) -> TickResult {
        let now = self.clock.advance(dt);
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        let Authority {
            config,
            clock,
            countdown,
            victory,
            core,
            ..
        } = self;
        core.now = now;
        core.tick = clock.tick();

        // 1. Countdown and the phase transitions it drives
        countdown.tick(
            dt,
            &mut PhaseDriver {
                core: &mut *core,
                config: &*config,
            },
        );

        // 2. Victory predicates
        let phase = core.phase.current();
        if let Some(outcome) = victory.evaluate(dt, now, phase, core.economy.faction_score(), &core.roster) {
            core.end_match(countdown, outcome);
        }

        #[cfg(feature = "debug-tracing")]
        trace!(
            tick = core.tick,
            now,
            phase = ?core.phase.current(),
            remaining = countdown.remaining(),
            records = core.events.len(),
            "tick"
        );

        // 3. Drain
        let events = core.take_events();
        let match_ended = events
            .iter()
            .any(|e| matches!(e.data, GameEventData::MatchEnded { .. }));
        TickResult {
            events,
            phase: core.phase.current(),
            match_ended,
            outcome: core.outcome,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
