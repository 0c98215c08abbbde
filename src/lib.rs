//! # Masquerade Match Server
//!
//! Authoritative game-state core for an asymmetric hide-and-seek match: one
//! Chaser hunts three masked Survivors across four world layers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MASQUERADE SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Primitives                              │
//! │  ├── clock.rs      - Authoritative and mirror clocks         │
//! │  ├── bounds.rs     - Positions and play-area bounds          │
//! │  ├── rng.rs        - Seeded Xorshift128+ PRNG                │
//! │  └── hash.rs       - SHA-256 view hashing                    │
//! │                                                              │
//! │  game/             - Match state (single writer)             │
//! │  ├── authority.rs  - Request surface and admin commands      │
//! │  ├── tick.rs       - Fixed step: clock, countdown, victory   │
//! │  ├── countdown.rs  - Single-fire countdown                   │
//! │  ├── phase.rs      - Match phases and timeout policy         │
//! │  ├── layer.rs      - Layer registry and option sets          │
//! │  ├── faction.rs    - Masks, inherited bits, faction score    │
//! │  ├── victory.rs    - Win predicates with grace periods       │
//! │  ├── ability.rs    - Layer moves, shockwave, ultimate        │
//! │  ├── task.rs       - Item pickup and submission              │
//! │  └── leaderboard.rs- Final standings text encoding           │
//! │                                                              │
//! │  network/          - Scheduling and routing                  │
//! │  ├── session.rs    - Tick loop, request queue, fan-out       │
//! │  ├── protocol.rs   - Wire messages                           │
//! │  └── mirror.rs     - Read-only replica                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Authority Model
//!
//! Only [`game::Authority`] mutates match state. Every mutation emits a change
//! record; the session drains them once per tick and fans them out to
//! mirrors by topic. Mirrors never write back.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use core::clock::{AuthoritativeClock, MirrorClock, Seconds};
pub use core::rng::DeterministicRng;
pub use game::authority::{Authority, Intent};
pub use game::config::MatchConfig;
pub use game::phase::{MatchOutcome, MatchPhase};
pub use game::state::ConnectionId;
pub use network::session::{AuthoritySession, SessionConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default session tick rate (Hz)
pub const DEFAULT_TICK_RATE: u32 = 30;
