//! Time management for a streaming session
//!
//! A session walks its phases in real (tokio) time. This module tracks the
//! three quantities the scheduler loops over: the active phase index, the time
//! spent in that phase and the time spent in the whole session. The session
//! ceiling is evaluated in exactly one place, [`SessionClock::ceiling_reached`].
//!
//! All instants come from `tokio::time`, so tests running on a paused runtime
//! see exact, instantly advancing time.

use std::time::Duration;
use tokio::time::Instant;

/// Why a phase's spawn loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseExit {
    /// The phase ran for its configured duration; move to the next one.
    Expired,
    /// The session ceiling was hit; abandon the remaining phases.
    CeilingReached,
}

/// Tracks session and phase elapsed time against the session ceiling.
///
/// # Example
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use flowprobe_core_rs::SessionClock;
/// use std::time::Duration;
///
/// let mut clock = SessionClock::start(Duration::from_secs(180));
/// clock.enter_phase(0);
/// assert_eq!(clock.phase_index(), 0);
/// assert!(!clock.ceiling_reached());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SessionClock {
    session_start: Instant,
    phase_start: Instant,
    phase_index: usize,
    ceiling: Duration,
}

impl SessionClock {
    /// Start the clock now with the given hard ceiling.
    pub fn start(ceiling: Duration) -> Self {
        let now = Instant::now();
        Self {
            session_start: now,
            phase_start: now,
            phase_index: 0,
            ceiling,
        }
    }

    /// Mark entry into phase `index`; phase elapsed time restarts at zero.
    pub fn enter_phase(&mut self, index: usize) {
        self.phase_index = index;
        self.phase_start = Instant::now();
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    pub fn session_elapsed(&self) -> Duration {
        self.session_start.elapsed()
    }

    pub fn phase_elapsed(&self) -> Duration {
        self.phase_start.elapsed()
    }

    /// Instant at which the ceiling is reached.
    pub fn deadline(&self) -> Instant {
        self.session_start + self.ceiling
    }

    /// The single session exit predicate.
    pub fn ceiling_reached(&self) -> bool {
        self.session_elapsed() >= self.ceiling
    }

    /// Check whether the current phase must stop.
    ///
    /// The ceiling takes precedence over phase expiry, so a caller seeing
    /// `Expired` may safely advance to the next phase.
    pub fn check(&self, phase_duration: Duration) -> Option<PhaseExit> {
        if self.ceiling_reached() {
            Some(PhaseExit::CeilingReached)
        } else if self.phase_elapsed() >= phase_duration {
            Some(PhaseExit::Expired)
        } else {
            None
        }
    }

    /// Shorten a pause so that it never runs past the ceiling.
    pub fn clamp_to_ceiling(&self, pause: Duration) -> Duration {
        pause.min(self.ceiling.saturating_sub(self.session_elapsed()))
    }
}
