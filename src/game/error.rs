//! Request rejection reasons.
//!
//! A rejection never leaves the authority as an error: the request surface
//! turns it into `false` and logs it at debug level.

use crate::core::clock::Seconds;
use crate::game::layer::Layer;
use crate::game::phase::MatchPhase;

/// Why the authority refused a request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    /// Connection is not (or no longer) attached.
    #[error("unknown connection")]
    UnknownConnection,

    /// Target entity does not exist (despawned or never spawned).
    #[error("unknown target {0}")]
    UnknownTarget(u32),

    /// Submit zone does not exist.
    #[error("unknown zone {0}")]
    UnknownZone(u32),

    /// Request is not legal in the current phase.
    #[error("not allowed during {0:?}")]
    WrongPhase(MatchPhase),

    /// Eliminated connections cannot act.
    #[error("connection is eliminated")]
    NotAlive,

    /// Request needs a different faction.
    #[error("wrong faction")]
    WrongFaction,

    /// Faction and mask are already set for this match.
    #[error("faction already assigned")]
    AlreadyAssigned,

    /// Mask index outside the pool.
    #[error("invalid mask {0}")]
    InvalidMask(u8),

    /// Another connection owns the mask (or it was retired).
    #[error("mask {0} already claimed")]
    MaskTaken(u8),

    /// Ability is cooling down.
    #[error("cooldown active, {0:.2}s remaining")]
    CooldownActive(Seconds),

    /// Target layer is not in the connection's option set.
    #[error("layer {0:?} not allowed")]
    LayerNotAllowed(Layer),

    /// Connection is already on the requested layer.
    #[error("already on layer {0:?}")]
    AlreadyOnLayer(Layer),

    /// Requester and target are on different layers.
    #[error("target is on another layer")]
    DifferentLayer,

    /// Target is outside the interaction radius.
    #[error("target out of range")]
    OutOfRange,

    /// Already carrying an item.
    #[error("hands full")]
    HandsFull,

    /// Nothing to submit.
    #[error("not carrying an item")]
    NothingCarried,

    /// Item already picked up.
    #[error("item already taken")]
    AlreadyTaken,

    /// Survivor skills are disabled by the chaser ultimate.
    #[error("skills disabled")]
    SkillDisabled,

    /// Chaser is frozen by the ready countdown.
    #[error("frozen")]
    Frozen,

    /// Display name empty after trimming.
    #[error("invalid display name")]
    InvalidName,

    /// Ability needs a target that this request cannot carry.
    #[error("ability needs a target")]
    MissingTarget,

    /// Reported position is not a finite point.
    #[error("invalid position")]
    InvalidPosition,
}
