//! Tick timing types.
//!
//! The host owns the frame loop and its time bases; the scheduler only ever
//! sees the per-tick delta pair supplied to [`Scheduler::tick`]. Two bases
//! are carried because timed waits may opt out of game-speed scaling (e.g.
//! UI timers that keep running while the game is paused).
//!
//! [`Scheduler::tick`]: crate::Scheduler::tick

use std::cell::Cell;
use std::rc::Rc;

/// The two per-frame deltas exposed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickDelta {
    /// Frame delta scaled by game speed, in seconds.
    pub scaled: f32,
    /// Real-time frame delta, unaffected by game speed, in seconds.
    pub unscaled: f32,
}

impl TickDelta {
    /// Creates a delta pair from explicit scaled and unscaled values.
    pub fn new(scaled: f32, unscaled: f32) -> Self {
        Self { scaled, unscaled }
    }

    /// Creates a delta pair where both bases advance by the same amount.
    ///
    /// Convenient for hosts that do not scale time (and for tests).
    pub fn uniform(dt: f32) -> Self {
        Self {
            scaled: dt,
            unscaled: dt,
        }
    }

    /// Returns the delta for the requested clock.
    #[inline]
    pub fn select(&self, clock: ClockKind) -> f32 {
        match clock {
            ClockKind::Scaled => self.scaled,
            ClockKind::Unscaled => self.unscaled,
        }
    }
}

/// Which time base a timed wait accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClockKind {
    /// Game time, scaled by game speed. The default.
    #[default]
    Scaled,
    /// Wall-clock time, unaffected by game speed.
    Unscaled,
}

impl ClockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ClockKind::Scaled => "scaled",
            ClockKind::Unscaled => "unscaled",
        }
    }
}

/// Shared view of the scheduler's accumulated scaled time.
///
/// The scheduler advances the cell at the start of every tick; clones handed
/// out by [`Scheduler::time`] observe the same value. Predicates capture a
/// clone to express deadlines ("run while `time.now() <= end`"), which is
/// exactly how [`Scheduler::for_seconds`] is built.
///
/// Single-threaded by design: this is an `Rc<Cell<_>>`, matching the
/// scheduler's cooperative threading contract.
///
/// [`Scheduler::time`]: crate::Scheduler::time
/// [`Scheduler::for_seconds`]: crate::Scheduler::for_seconds
#[derive(Debug, Clone, Default)]
pub struct GameTime {
    elapsed: Rc<Cell<f64>>,
}

impl GameTime {
    /// Seconds of scaled time accumulated since the scheduler was created.
    #[inline]
    pub fn now(&self) -> f64 {
        self.elapsed.get()
    }

    /// Advances the shared cell. Called once per tick by the scheduler.
    pub(crate) fn advance(&self, dt: f32) {
        self.elapsed.set(self.elapsed.get() + f64::from(dt));
    }
}
