//! Simulation time model.
//!
//! The host loop counts integer ticks; each tick covers `tick_secs` seconds
//! of simulated time, which is the `dt_s` handed to every agent.  Keeping the
//! tick counter integral avoids drift in "every N ticks" bookkeeping while
//! the per-tick duration may be fractional.

use std::fmt;

use crate::HaulError;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }

    /// `true` when this tick falls on an `interval` boundary.  An interval of
    /// zero never matches.
    #[inline]
    pub fn is_on_interval(self, interval: u64) -> bool {
        interval > 0 && self.0.is_multiple_of(interval)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Maps tick counts to elapsed simulated seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Simulated seconds per tick.
    pub tick_secs: f64,
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_secs: f64) -> Self {
        Self { tick_secs, current_tick: Tick::ZERO }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = self.current_tick.next();
    }

    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.0 as f64 * self.tick_secs
    }

    /// Break elapsed time into (day, hour, minute) since tick 0.
    pub fn elapsed_dhm(&self) -> (u64, u32, u32) {
        let total_secs = self.elapsed_secs().max(0.0) as u64;
        let days = total_secs / 86_400;
        let hours = ((total_secs % 86_400) / 3_600) as u32;
        let minutes = ((total_secs % 3_600) / 60) as u32;
        (days, hours, minutes)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (d, h, m) = self.elapsed_dhm();
        write!(f, "{} (day {} {:02}:{:02})", self.current_tick, d, h, m)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration, typically deserialized by the application.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Simulated seconds per tick (the `dt_s` passed to every agent).
    pub tick_secs: f64,

    /// Total ticks to simulate.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always reproduces the same run.
    pub seed: u64,

    /// Emit a full snapshot of every truck every N ticks.  0 disables
    /// snapshots; change reports are emitted regardless.
    pub report_interval_ticks: u64,
}

impl SimConfig {
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_secs)
    }

    pub fn validate(&self) -> Result<(), HaulError> {
        if !(self.tick_secs.is_finite() && self.tick_secs > 0.0) {
            return Err(HaulError::Config(format!(
                "tick_secs must be positive and finite, got {}",
                self.tick_secs
            )));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_secs: 60.0,
            total_ticks: 24 * 60,
            seed: 0,
            report_interval_ticks: 0,
        }
    }
}
