//! # Schedule Module
//!
//! Timing policies for the counter UI, as plain values driven by the caller's
//! clock. Nothing here sleeps or spawns; the kiosk's regeneration driver and
//! UI adapter feed in `Instant`s.
//!
//! ## Debouncer (coalesce-latest)
//! ```text
//! request ─┐  request ─┐  request ─┐
//!          ▼           ▼           ▼
//! ─────────●───────────●───────────●──────────────────[window]──► fire
//!          └ superseded└ superseded                    (exactly once)
//!
//! settle() ─► fires the pending request now (e.g. on stepper release)
//! ```
//!
//! ## HoldRepeater
//! ```text
//! press ──► step          (immediate)
//!   │
//!   ├── 350 ms ──► step   (initial delay)
//!   ├── 420 ms ──► step   (every 70 ms)
//!   ├── 490 ms ──► step
//!   │    ...
//! release ──► stop, caller recomputes once
//! ```

use std::time::{Duration, Instant};

/// Quiet period before a coalesced regeneration fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Delay between pressing a stepper and the first repeat.
pub const DEFAULT_HOLD_DELAY: Duration = Duration::from_millis(350);

/// Interval between repeats while a stepper stays pressed.
pub const DEFAULT_HOLD_INTERVAL: Duration = Duration::from_millis(70);

// =============================================================================
// Debouncer
// =============================================================================

/// Coalesces bursts of requests into one fire after a quiet window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Supersedes any pending request and re-arms the window from `now`.
    pub fn request(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Returns `true` exactly once when the window has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Fires the pending request immediately. Returns `false` if none was pending.
    pub fn settle(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

// =============================================================================
// Hold Repeater
// =============================================================================

/// Which stepper button is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

impl StepDirection {
    /// Quantity delta of one step.
    pub fn delta(&self) -> i64 {
        match self {
            StepDirection::Up => 1,
            StepDirection::Down => -1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Held {
    direction: StepDirection,
    next_at: Instant,
}

/// Press-and-hold auto-repeat for quantity steppers.
#[derive(Debug, Clone)]
pub struct HoldRepeater {
    initial_delay: Duration,
    interval: Duration,
    held: Option<Held>,
}

impl HoldRepeater {
    pub fn new(initial_delay: Duration, interval: Duration) -> Self {
        Self {
            initial_delay,
            interval,
            held: None,
        }
    }

    /// Starts a hold and returns the delta of the immediate first step.
    pub fn press(&mut self, direction: StepDirection, now: Instant) -> i64 {
        self.held = Some(Held {
            direction,
            next_at: now + self.initial_delay,
        });
        direction.delta()
    }

    /// Number of repeat steps due at `now`, catching up on missed intervals.
    pub fn tick(&mut self, now: Instant) -> u32 {
        let interval = self.interval;
        let Some(held) = self.held.as_mut() else {
            return 0;
        };
        if now < held.next_at {
            return 0;
        }

        let missed = if interval.is_zero() {
            0
        } else {
            (now - held.next_at).as_nanos() / interval.as_nanos()
        };
        let steps = u32::try_from(missed + 1).unwrap_or(u32::MAX);

        held.next_at += interval * steps;
        steps
    }

    /// Stops repeating. Returns `true` if a hold was active, in which case the
    /// caller owes one final recompute.
    pub fn release(&mut self) -> bool {
        self.held.take().is_some()
    }

    /// Direction of the active hold.
    pub fn direction(&self) -> Option<StepDirection> {
        self.held.map(|h| h.direction)
    }

    pub fn is_held(&self) -> bool {
        self.held.is_some()
    }
}

impl Default for HoldRepeater {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD_DELAY, DEFAULT_HOLD_INTERVAL)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
