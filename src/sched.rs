//! Timer and frame-loop primitives
//!
//! Everything in the kiosk runs off two scheduling mechanisms: fixed-delay
//! timers (spawn intervals, watchdog timeouts, movement ticks, polls) and
//! per-frame animation callbacks (the catch game's physics advance). Both
//! are driven by a caller-supplied monotonic clock in milliseconds, so tests
//! can run on virtual time.
//!
//! Handles are scoped: arming and cancelling are paired, and cancelling an
//! already-cleared handle is a no-op. Nothing here free-runs - a timer only
//! fires when its owner polls it.

use crate::consts::MAX_TIMER_CATCHUP;

/// One-shot fixed-delay timer
#[derive(Debug, Clone, Copy, Default)]
pub struct OneShot {
    deadline: Option<f64>,
}

impl OneShot {
    pub const fn idle() -> Self {
        Self { deadline: None }
    }

    /// Arm (or re-arm from scratch) to fire `delay_ms` after `now_ms`
    pub fn arm(&mut self, now_ms: f64, delay_ms: f64) {
        self.deadline = Some(now_ms + delay_ms);
    }

    /// Idempotent cancel - safe on an already-cleared handle
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the deadline has passed, clearing it
    pub fn fire(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Repeating fixed-period timer
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period_ms: f64,
    next: Option<f64>,
}

impl Interval {
    pub const fn new(period_ms: f64) -> Self {
        Self {
            period_ms,
            next: None,
        }
    }

    pub fn start(&mut self, now_ms: f64) {
        self.next = Some(now_ms + self.period_ms);
    }

    /// Idempotent stop
    pub fn stop(&mut self) {
        self.next = None;
    }

    pub fn running(&self) -> bool {
        self.next.is_some()
    }

    /// Number of periods elapsed since the last poll, advancing the schedule.
    /// Capped at `MAX_TIMER_CATCHUP` so a stalled host does not replay a
    /// backlog of ticks; the schedule resets relative to `now_ms` at the cap.
    pub fn fire(&mut self, now_ms: f64) -> u32 {
        let Some(mut next) = self.next else { return 0 };
        let mut fired = 0;
        while now_ms >= next && fired < MAX_TIMER_CATCHUP {
            fired += 1;
            next += self.period_ms;
        }
        if fired == MAX_TIMER_CATCHUP && now_ms >= next {
            next = now_ms + self.period_ms;
        }
        self.next = Some(next);
        fired
    }
}

/// Guard-gated animation frame loop
///
/// Models the request/cancel animation-frame pattern: the owner arms the loop
/// when its continuation guard becomes true, the per-frame handler halts it
/// the moment the guard goes false, and a halted loop schedules nothing
/// further until it is explicitly re-armed. Distinct from [`Interval`]: frames
/// come from the display, not the wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameLoop {
    armed: bool,
}

impl FrameLoop {
    pub const fn idle() -> Self {
        Self { armed: false }
    }

    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Idempotent halt
    pub fn halt(&mut self) {
        self.armed = false;
    }

    pub fn armed(&self) -> bool {
        self.armed
    }
}
