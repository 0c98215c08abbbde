//! Game Logic Module
//!
//! Everything the authority owns and mutates. No I/O: the session in
//! [`crate::network`] feeds requests in and carries records out.
//!
//! ## Module Structure
//!
//! - `authority`: The single writer; request surface and admin commands
//! - `tick`: One fixed step (clock, countdown, victory, drain)
//! - `countdown`: Restartable countdown with the single-fire guard
//! - `phase`: Lobby -> ReadyCountdown -> Playing -> end states
//! - `victory`: Score and all-caught predicates with grace periods
//! - `layer`: The four layers and who is on which
//! - `faction`: Masks, factions, inherited bits, the shared score
//! - `ability`: Layer moves, shockwave, ultimate
//! - `task`: Item pickup and submission
//! - `events`: Change records and subscription topics
//! - `snapshot`: Full state for late joiners, view hash
//! - `leaderboard`: Final standings and their text encoding

pub mod ability;
pub mod authority;
pub mod config;
pub mod cooldown;
pub mod countdown;
pub mod error;
pub mod events;
pub mod faction;
pub mod layer;
pub mod leaderboard;
pub mod phase;
pub mod snapshot;
pub mod state;
pub mod task;
pub mod tick;
pub mod victory;
pub mod world;

// Re-export key types
pub use authority::{Authority, Intent};
pub use config::{ConfigError, CooldownConfig, MatchConfig, VictoryConfig};
pub use cooldown::{AbilityId, CooldownGate};
pub use countdown::{CountdownEngine, CountdownHandler, CountdownState};
pub use error::Rejection;
pub use events::{GameEvent, GameEventData, ScoreTarget, Topic, TopicSet};
pub use faction::{Faction, FactionEconomy, MaskBits, MaskId};
pub use layer::{allowed_layers, Layer, LayerSet, LayerWorldRegistry};
pub use leaderboard::LeaderboardEntry;
pub use phase::{MatchOutcome, MatchPhase, PhaseStateMachine, PolicyError, TimeoutPolicy};
pub use snapshot::{ConnectionView, MatchSnapshot};
pub use state::{Connection, ConnectionId, Roster};
pub use tick::TickResult;
pub use victory::VictoryEvaluator;
pub use world::{DroppedToken, EntityId, LayerItem, SubmitZone, WorldEntities, ZoneId};
