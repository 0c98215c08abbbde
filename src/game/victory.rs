//! Victory Evaluator
//!
//! Two pure predicates recomputed every tick while Playing, gated by two
//! grace periods: one since authority start and a shorter one since entering
//! Playing.

use tracing::{debug, warn};

use crate::core::clock::Seconds;
use crate::game::config::VictoryConfig;
use crate::game::phase::{MatchOutcome, MatchPhase};
use crate::game::state::Roster;

/// Survivors win once the shared score reaches the threshold.
pub fn score_threshold_reached(score: u32, threshold: u32) -> bool {
    score >= threshold
}

/// Chasers win once every Survivor that took part is eliminated.
pub fn all_survivors_caught(total: usize, alive: usize) -> bool {
    total > 0 && alive == 0
}

/// Per-tick victory check.
#[derive(Debug, Clone)]
pub struct VictoryEvaluator {
    config: VictoryConfig,
    enabled: bool,
    started_at: Seconds,
    playing_time: Seconds,
    since_score_log: Seconds,
}

impl VictoryEvaluator {
    /// Evaluator for an authority started at `started_at`.
    ///
    /// An invalid config disables the evaluator (logged once); the match then
    /// ends only on timeout or by an explicit end.
    pub fn new(config: VictoryConfig, started_at: Seconds) -> Self {
        let enabled = match config.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "victory evaluator disabled");
                false
            }
        };
        Self {
            config,
            enabled,
            started_at,
            playing_time: 0.0,
            since_score_log: 0.0,
        }
    }

    /// Is the evaluator active?
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Time spent in the current Playing phase.
    pub fn playing_time(&self) -> Seconds {
        self.playing_time
    }

    /// Advance timers by `dt` and check both predicates.
    pub fn evaluate(
        &mut self,
        dt: Seconds,
        now: Seconds,
        phase: MatchPhase,
        faction_score: u32,
        roster: &Roster,
    ) -> Option<MatchOutcome> {
        if phase != MatchPhase::Playing {
            self.playing_time = 0.0;
            self.since_score_log = 0.0;
            return None;
        }
        self.playing_time += dt.max(0.0);

        if !self.enabled {
            return None;
        }

        if now - self.started_at < self.config.min_grace {
            return None;
        }

        self.since_score_log += dt.max(0.0);
        if self.config.score_log_interval > 0.0 && self.since_score_log >= self.config.score_log_interval {
            self.since_score_log = 0.0;
            debug!(
                score = faction_score,
                threshold = self.config.win_score_threshold,
                alive = roster.survivors_alive(),
                "survivor score"
            );
        }

        if score_threshold_reached(faction_score, self.config.win_score_threshold) {
            return Some(MatchOutcome::RunnerWin);
        }

        if self.playing_time >= self.config.all_caught_grace
            && all_survivors_caught(roster.survivors_total(), roster.survivors_alive())
        {
            return Some(MatchOutcome::CatcherWin);
        }

        None
    }
}
