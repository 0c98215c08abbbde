//! Match Phase State Machine
//!
//! `Lobby -> ReadyCountdown -> Playing -> {CatcherWin, RunnerWin}`.
//!
//! Phases only move forward. A transition that is not the next legal step is
//! a no-op, which makes repeated triggers (a second quorum, a second end-match)
//! harmless. Only [`PhaseStateMachine::reset`] returns to Lobby, and that
//! starts a new match.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::clock::Seconds;
use crate::game::state::Roster;

/// Match lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Waiting for mask claims.
    #[default]
    Lobby,
    /// Ready countdown running.
    ReadyCountdown,
    /// Match running.
    Playing,
    /// Chasers won.
    CatcherWin,
    /// Survivors won.
    RunnerWin,
}

impl MatchPhase {
    /// Is this an end state?
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchPhase::CatcherWin | MatchPhase::RunnerWin)
    }

    /// Is `next` the legal successor of `self`?
    pub fn can_advance_to(self, next: MatchPhase) -> bool {
        matches!(
            (self, next),
            (MatchPhase::Lobby, MatchPhase::ReadyCountdown)
                | (MatchPhase::ReadyCountdown, MatchPhase::Playing)
                | (MatchPhase::Playing, MatchPhase::CatcherWin)
                | (MatchPhase::Playing, MatchPhase::RunnerWin)
        )
    }
}

/// Which side won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Chasers caught everyone, or time ran out in their favour.
    CatcherWin,
    /// Survivors reached the score, or outlasted the clock.
    RunnerWin,
}

impl MatchOutcome {
    /// Terminal phase for this outcome.
    pub fn phase(self) -> MatchPhase {
        match self {
            MatchOutcome::CatcherWin => MatchPhase::CatcherWin,
            MatchOutcome::RunnerWin => MatchPhase::RunnerWin,
        }
    }

    /// Wire flag: true when the catchers won.
    pub fn catcher_win(self) -> bool {
        self == MatchOutcome::CatcherWin
    }

    /// Outcome from the wire flag.
    pub fn from_catcher_win(catcher_win: bool) -> Self {
        if catcher_win {
            MatchOutcome::CatcherWin
        } else {
            MatchOutcome::RunnerWin
        }
    }
}

/// A committed phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChange {
    /// Phase before.
    pub from: MatchPhase,
    /// Phase after.
    pub to: MatchPhase,
}

/// Decides who wins when the match clock runs out. `true` means Survivors win.
pub type TimeoutPolicy = Box<dyn Fn(&Roster) -> bool + Send>;

/// Timeout policy registration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// A policy is already installed; clear it first.
    #[error("timeout policy already registered")]
    AlreadyRegistered,
}

/// Phase holder with the timeout policy.
pub struct PhaseStateMachine {
    phase: MatchPhase,
    entered_at: Seconds,
    catcher_wins_on_timeout: bool,
    timeout_policy: Option<TimeoutPolicy>,
}

impl fmt::Debug for PhaseStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseStateMachine")
            .field("phase", &self.phase)
            .field("entered_at", &self.entered_at)
            .field("catcher_wins_on_timeout", &self.catcher_wins_on_timeout)
            .field("has_timeout_policy", &self.timeout_policy.is_some())
            .finish()
    }
}

impl PhaseStateMachine {
    /// Lobby with no timeout policy.
    pub fn new(catcher_wins_on_timeout: bool) -> Self {
        Self {
            phase: MatchPhase::Lobby,
            entered_at: 0.0,
            catcher_wins_on_timeout,
            timeout_policy: None,
        }
    }

    /// Builder: install a timeout policy.
    pub fn with_timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.timeout_policy = Some(policy);
        self
    }

    /// Current phase.
    pub fn current(&self) -> MatchPhase {
        self.phase
    }

    /// Time the current phase was entered.
    pub fn entered_at(&self) -> Seconds {
        self.entered_at
    }

    /// Move to `to` if it is the legal next phase. `None` means no-op.
    pub fn advance(&mut self, to: MatchPhase, now: Seconds) -> Option<PhaseChange> {
        if !self.phase.can_advance_to(to) {
            debug!(from = ?self.phase, to = ?to, "phase transition ignored");
            return None;
        }
        let change = PhaseChange { from: self.phase, to };
        self.phase = to;
        self.entered_at = now;
        info!(from = ?change.from, to = ?change.to, at = now, "phase changed");
        Some(change)
    }

    /// Back to Lobby for a new match. The timeout policy stays installed.
    pub fn reset(&mut self, now: Seconds) -> Option<PhaseChange> {
        if self.phase == MatchPhase::Lobby {
            return None;
        }
        let change = PhaseChange {
            from: self.phase,
            to: MatchPhase::Lobby,
        };
        self.phase = MatchPhase::Lobby;
        self.entered_at = now;
        info!(from = ?change.from, "match reset to lobby");
        Some(change)
    }

    /// Install the timeout policy. Refused if one is already installed.
    pub fn register_timeout_policy(&mut self, policy: TimeoutPolicy) -> Result<(), PolicyError> {
        if self.timeout_policy.is_some() {
            return Err(PolicyError::AlreadyRegistered);
        }
        self.timeout_policy = Some(policy);
        Ok(())
    }

    /// Remove the timeout policy. Returns whether one was installed.
    pub fn clear_timeout_policy(&mut self) -> bool {
        self.timeout_policy.take().is_some()
    }

    /// Is a timeout policy installed?
    pub fn has_timeout_policy(&self) -> bool {
        self.timeout_policy.is_some()
    }

    /// Winner when the match clock runs out.
    pub fn resolve_timeout(&self, roster: &Roster) -> MatchOutcome {
        let runners_win = match &self.timeout_policy {
            Some(policy) => policy(roster),
            None => !self.catcher_wins_on_timeout,
        };
        if runners_win {
            MatchOutcome::RunnerWin
        } else {
            MatchOutcome::CatcherWin
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
