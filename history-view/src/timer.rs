//! Deadline-based timers driven by the host's tick.
//!
//! The view never sleeps. Each timer only records when it should fire; the
//! host asks [`crate::HistoryInner::next_tick_in`] how long it may wait and
//! calls [`crate::HistoryInner::on_tick_at`] once that time has passed.

use std::time::Duration;
use std::time::Instant;

/// A restartable one-shot or periodic timer. Starting it again replaces any
/// pending deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<Instant>,
    period: Option<Duration>,
}

impl Timer {
    pub fn start(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
        self.period = None;
    }

    pub fn start_periodic(&mut self, now: Instant, period: Duration) {
        self.deadline = Some(now + period);
        self.period = Some(period);
    }

    pub fn stop(&mut self) {
        self.deadline = None;
        self.period = None;
    }

    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// Active and not yet due at `now`.
    pub fn is_pending(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consumes a due deadline. One-shot timers stop, periodic timers rearm
    /// one period after `now`.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                match self.period {
                    Some(period) => self.deadline = Some(now + period),
                    None => self.deadline = None,
                }
                true
            }
            _ => false,
        }
    }
}

/// Linear interpolation between two values over a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    from: f64,
    to: f64,
    started: Instant,
    duration: Duration,
}

impl Animation {
    pub fn new(from: f64, to: f64, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
        }
    }

    pub fn value(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let progress = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0);
        self.from + (self.to - self.from) * progress
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) < self.duration
    }

    pub fn finishes_at(&self) -> Instant {
        self.started + self.duration
    }
}

/// Earliest of a set of optional deadlines.
pub(crate) fn earliest(deadlines: impl IntoIterator<Item = Option<Instant>>) -> Option<Instant> {
    deadlines.into_iter().flatten().min()
}
