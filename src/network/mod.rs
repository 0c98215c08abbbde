//! Network Layer
//!
//! Moves requests into the authority and change records out to mirrors.
//! All match logic lives in `game/`; this layer only schedules and routes.

pub mod mirror;
pub mod protocol;
pub mod session;

pub use mirror::MirrorState;
pub use protocol::{ClientMessage, ServerMessage};
pub use session::{
    AdminCommand, AuthorityHandle, AuthoritySession, ConnectionHandle, MirrorFeed, SessionConfig,
    SessionError,
};
