//! Match Clock
//!
//! The authority owns the only writable clock. Mirrors receive periodic
//! snapshots of it and keep a skew-corrected local estimate.

use serde::{Deserialize, Serialize};

/// Seconds on the authority timeline.
pub type Seconds = f64;

/// Single source of truth for elapsed match time.
///
/// Advanced only by the authority tick loop. Reads never block and never fail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthoritativeClock {
    elapsed: Seconds,
    tick: u64,
}

impl AuthoritativeClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current authority time.
    #[inline]
    pub fn now(&self) -> Seconds {
        self.elapsed
    }

    /// Number of ticks applied so far.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance by one tick of `dt` seconds and return the new time.
    ///
    /// Negative or non-finite deltas still count as a tick but leave the
    /// time unchanged, so the clock never runs backwards.
    pub fn advance(&mut self, dt: Seconds) -> Seconds {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        self.tick += 1;
        self.elapsed
    }

    /// Snapshot sent to mirrors.
    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            server_time: self.elapsed,
            tick: self.tick,
        }
    }
}

/// Authority time as observed at a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    /// Authority time in seconds.
    pub server_time: Seconds,
    /// Authority tick.
    pub tick: u64,
}

/// Mirror-side estimate of the authority clock.
///
/// Each snapshot yields an offset sample `server_time - local_now`; samples are
/// smoothed exponentially to absorb jitter. The estimate is never earlier than
/// the last observed authority time.
#[derive(Debug, Clone)]
pub struct MirrorClock {
    offset: Option<f64>,
    smoothing: f64,
    last_server_time: Seconds,
}

impl Default for MirrorClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MirrorClock {
    /// Weight given to each new offset sample.
    pub const DEFAULT_SMOOTHING: f64 = 0.2;

    /// Create an unsynchronized mirror clock.
    pub fn new() -> Self {
        Self::with_smoothing(Self::DEFAULT_SMOOTHING)
    }

    /// Create a mirror clock with a custom smoothing factor in `(0, 1]`.
    pub fn with_smoothing(smoothing: f64) -> Self {
        let smoothing = if smoothing.is_finite() && smoothing > 0.0 {
            smoothing.min(1.0)
        } else {
            Self::DEFAULT_SMOOTHING
        };
        Self {
            offset: None,
            smoothing,
            last_server_time: 0.0,
        }
    }

    /// Has at least one snapshot been observed?
    pub fn is_synced(&self) -> bool {
        self.offset.is_some()
    }

    /// Feed an authority time observed at local time `local_now`.
    pub fn observe(&mut self, server_time: Seconds, local_now: Seconds) {
        if !server_time.is_finite() || !local_now.is_finite() {
            return;
        }
        let sample = server_time - local_now;
        self.offset = Some(match self.offset {
            None => sample,
            Some(current) => current + (sample - current) * self.smoothing,
        });
        self.last_server_time = self.last_server_time.max(server_time);
    }

    /// Current smoothed offset, if synced.
    pub fn offset(&self) -> Option<f64> {
        self.offset
    }

    /// Estimated authority time at local time `local_now`.
    pub fn estimate(&self, local_now: Seconds) -> Seconds {
        match self.offset {
            Some(offset) => (local_now + offset).max(self.last_server_time),
            None => self.last_server_time,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
