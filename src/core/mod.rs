//! Core primitives.
//!
//! Time, space, randomness and hashing. Nothing here knows about factions,
//! layers or phases.

pub mod bounds;
pub mod clock;
pub mod hash;
pub mod rng;

pub use bounds::{Bounds, Position};
pub use clock::{AuthoritativeClock, ClockSnapshot, MirrorClock, Seconds};
pub use hash::{StateHash, StateHasher};
pub use rng::DeterministicRng;
