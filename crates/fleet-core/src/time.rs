//! Simulation time model.
//!
//! # Design
//!
//! Two clocks advance together:
//!
//! - `Tick` counts discrete loop iterations.  Within a tick every robot is
//!   updated exactly once, so ticks are the unit of ordering.
//! - `SimTime` is the simulated elapsed time, stored as integer milliseconds.
//!   The caller chooses how much time each tick covers (`tick(delta)`), so
//!   ticks need not be evenly spaced.
//!
//! Integer milliseconds keep reservation windows and wait timeouts exact (no
//! floating-point drift) and make `SimTime` `Ord`, so it can key a `BTreeMap`.

use std::fmt;
use std::time::Duration;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Ticks elapsed from `earlier` to `self` (saturating).
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// `true` every `interval` ticks.  An interval of 0 never fires.
    #[inline]
    pub fn is_every(self, interval: u64) -> bool {
        interval > 0 && self.0.is_multiple_of(interval)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimTime ──────────────────────────────────────────────────────────────────

/// Simulated time since the start of the run, in milliseconds.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    #[inline]
    pub fn from_millis(ms: u64) -> Self {
        SimTime(ms)
    }

    /// Convert fractional seconds, rounding to the nearest millisecond.
    /// Negative and non-finite inputs clamp to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if secs.is_finite() && secs > 0.0 {
            SimTime((secs * 1_000.0).round() as u64)
        } else {
            SimTime::ZERO
        }
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    /// Time elapsed from `earlier` to `self`; zero if `earlier` is later.
    #[inline]
    pub fn since(self, earlier: SimTime) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl std::ops::Add<Duration> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: Duration) -> SimTime {
        SimTime(self.0.saturating_add(u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX)))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The fleet's authoritative clock.  Cheap to copy; holds no heap data.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Number of completed `advance` calls.
    pub tick: Tick,
    /// Simulated time reached by the last `advance`.
    pub now: SimTime,
    /// Length of the most recent tick.  Robots use it to predict arrival
    /// times for time-windowed reservations.
    pub last_delta: Duration,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick covering `delta` of simulated time.
    #[inline]
    pub fn advance(&mut self, delta: Duration) {
        self.tick = self.tick + 1;
        self.now = self.now + delta;
        self.last_delta = delta;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.tick, self.now)
    }
}
