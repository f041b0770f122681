//! Touch gestures: finger scrolling with momentum and long-press selection.
//!
//! A touch that moves further than the drag distance scrolls the list; one
//! that stays still for the long-press time turns into a mouse-like text
//! selection, and a short tap acts as a left click. After the finger is
//! lifted the list keeps scrolling with the estimated speed, slowing down by
//! a fixed amount per millisecond.

use std::time::Instant;

use crate::config::TouchConfig;
use crate::geometry::Point;
use crate::inner::HistoryInner;
use crate::mouse::Modifiers;
use crate::mouse::MouseButton;
use crate::timer::Timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchScrollState {
    /// The finger drives the scroll directly.
    #[default]
    Manual,
    /// Momentum scrolling after the finger was lifted.
    Auto,
    /// A new touch landed during momentum scrolling and may speed it up.
    Acceleration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Begin,
    Update,
    End,
    Cancel,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TouchState {
    pub(crate) in_progress: bool,
    pub(crate) select: bool,
    pub(crate) scroll: bool,
    pub(crate) state: TouchScrollState,
    waiting_acceleration: bool,
    acceleration_time: Option<Instant>,
    /// Finger position in viewport coordinates.
    pub(crate) position: Point,
    previous: Point,
    start: Point,
    previous_valid: bool,
    /// Pixels per second.
    pub(crate) speed: Point,
    speed_time: Option<Instant>,
    scroll_time: Option<Instant>,
    pub(crate) select_timer: Timer,
    pub(crate) scroll_timer: Timer,
}

impl TouchState {
    /// Folds the latest finger movement into the speed estimate.
    pub(crate) fn update_speed(&mut self, now: Instant, config: &TouchConfig) {
        if self.previous_valid {
            let elapsed = self
                .speed_time
                .map_or(0, |time| elapsed_ms(time, now));
            if elapsed > 0 {
                let diff = self.position - self.previous;
                let per_second = Point::new(diff.x * 1000 / elapsed, diff.y * 1000 / elapsed);
                let threshold = config.finger_accuracy_threshold;
                let filter = |value: i32| if value.abs() > threshold { value } else { 0 };
                let new_speed = Point::new(filter(per_second.x), filter(per_second.y));
                self.speed = match self.state {
                    TouchScrollState::Auto => {
                        let old = self.speed;
                        if same_direction(old, new_speed) {
                            let max = config.max_scroll_accelerated;
                            Point::new(
                                (old.x + new_speed.x / 4).clamp(-max, max),
                                (old.y + new_speed.y / 4).clamp(-max, max),
                            )
                        } else {
                            Point::default()
                        }
                    }
                    _ if self.speed.is_null() => new_speed,
                    _ => {
                        let old = self.speed;
                        let max = config.max_scroll_flick;
                        Point::new(
                            (old.x / 4 + new_speed.x * 3 / 4).clamp(-max, max),
                            (old.y / 4 + new_speed.y * 3 / 4).clamp(-max, max),
                        )
                    }
                };
            }
        } else {
            self.previous_valid = true;
        }
        self.speed_time = Some(now);
        self.previous = self.position;
    }

    pub(crate) fn reset_speed(&mut self) {
        self.speed = Point::default();
        self.previous_valid = false;
    }

    /// Slows both speed components towards zero.
    pub(crate) fn decelerate(&mut self, elapsed_ms: i32, config: &TouchConfig) {
        let amount = elapsed_ms * config.deceleration_per_ms;
        let slow = |value: i32| {
            if value > 0 {
                (value - amount).max(0)
            } else {
                (value + amount).min(0)
            }
        };
        self.speed = Point::new(slow(self.speed.x), slow(self.speed.y));
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        crate::timer::earliest([self.select_timer.deadline(), self.scroll_timer.deadline()])
    }
}

fn same_direction(old: Point, new: Point) -> bool {
    let same = |a: i32, b: i32| (a <= 0 && b <= 0) || (a >= 0 && b >= 0);
    same(old.x, new.x) && same(old.y, new.y)
}

fn elapsed_ms(from: Instant, to: Instant) -> i32 {
    i32::try_from(to.saturating_duration_since(from).as_millis()).unwrap_or(i32::MAX)
}

impl HistoryInner {
    /// Handles a touch event. `position` is in viewport coordinates.
    pub fn touch_event_at(&mut self, phase: TouchPhase, position: Point, now: Instant) {
        let config = self.config.touch;
        if phase == TouchPhase::Cancel {
            if !self.touch.in_progress {
                return;
            }
            self.touch.in_progress = false;
            self.touch.select_timer.stop();
            self.touch.scroll_timer.stop();
            self.touch.scroll = false;
            self.touch.select = false;
            self.touch.state = TouchScrollState::Manual;
            self.touch.reset_speed();
            self.mouse_action_cancel();
            return;
        }
        self.touch.previous = self.touch.position;
        self.touch.position = position;
        match phase {
            TouchPhase::Begin => {
                if self.touch.in_progress {
                    return;
                }
                self.touch.in_progress = true;
                if self.touch.state == TouchScrollState::Auto {
                    self.touch.state = TouchScrollState::Acceleration;
                    self.touch.waiting_acceleration = true;
                    self.touch.acceleration_time = Some(now);
                    self.touch.update_speed(now, &config);
                } else {
                    self.touch.scroll = false;
                    self.touch.select_timer.start(now, config.long_press);
                }
                self.touch.select = false;
                self.touch.start = position;
                self.touch.previous = position;
            }
            TouchPhase::Update => {
                if !self.touch.in_progress {
                    return;
                }
                if self.touch.select {
                    self.mouse_move_at(position, true, now);
                } else if !self.touch.scroll
                    && (position - self.touch.start).manhattan_length()
                        >= self.config.interaction.start_drag_distance
                {
                    self.touch.select_timer.stop();
                    self.touch.scroll = true;
                    self.touch.update_speed(now, &config);
                }
                if self.touch.scroll {
                    match self.touch.state {
                        TouchScrollState::Manual => {
                            let delta = self.touch.position - self.touch.previous;
                            self.host.touch_scroll(delta);
                            self.touch.update_speed(now, &config);
                        }
                        TouchScrollState::Acceleration => {
                            self.touch.update_speed(now, &config);
                            self.touch.acceleration_time = Some(now);
                            if self.touch.speed.is_null() {
                                self.touch.state = TouchScrollState::Manual;
                            }
                        }
                        TouchScrollState::Auto => {}
                    }
                }
            }
            TouchPhase::End => {
                if !self.touch.in_progress {
                    return;
                }
                self.touch.in_progress = false;
                if self.touch.select {
                    self.mouse_release_at(position, MouseButton::Right, now);
                    self.show_context_menu_at(position, true, now);
                    self.touch.scroll = false;
                } else if self.touch.scroll {
                    match self.touch.state {
                        TouchScrollState::Manual => {
                            self.touch.state = TouchScrollState::Auto;
                            self.touch.previous_valid = false;
                            self.touch.scroll_timer.start_periodic(now, config.scroll_tick);
                            self.touch.scroll_time = Some(now);
                        }
                        TouchScrollState::Auto => {
                            self.touch.state = TouchScrollState::Manual;
                            self.touch.scroll = false;
                            self.touch.reset_speed();
                        }
                        TouchScrollState::Acceleration => {
                            self.touch.state = TouchScrollState::Auto;
                            self.touch.waiting_acceleration = false;
                            self.touch.previous_valid = false;
                        }
                    }
                } else {
                    self.mouse_press_at(position, MouseButton::Left, Modifiers::default(), now);
                    self.mouse_release_at(position, MouseButton::Left, now);
                }
                self.touch.select_timer.stop();
                self.touch.select = false;
            }
            TouchPhase::Cancel => {}
        }
    }

    /// Fires the touch timers that are due at `now`.
    pub(crate) fn touch_tick_at(&mut self, now: Instant) {
        if self.touch.select_timer.fire_if_due(now) {
            tracing::debug!("touch long press, selecting");
            self.touch.select = true;
            let position = self.touch.position;
            self.mouse_press_at(position, MouseButton::Left, Modifiers::default(), now);
        }
        if self.touch.scroll_timer.fire_if_due(now) {
            self.touch_scroll_tick(now);
        }
    }

    fn touch_scroll_tick(&mut self, now: Instant) {
        let config = self.config.touch;
        let waited = self
            .touch
            .acceleration_time
            .map(|time| now.saturating_duration_since(time));
        if self.touch.state == TouchScrollState::Acceleration
            && self.touch.waiting_acceleration
            && waited.is_some_and(|waited| waited > config.acceleration_wait)
        {
            tracing::trace!("touch acceleration timed out");
            self.touch.state = TouchScrollState::Manual;
            self.touch.scroll = false;
            self.touch.reset_speed();
            self.touch.scroll_timer.stop();
            return;
        }
        if !matches!(
            self.touch.state,
            TouchScrollState::Auto | TouchScrollState::Acceleration
        ) {
            self.touch.scroll_timer.stop();
            return;
        }
        let elapsed = self
            .touch
            .scroll_time
            .map_or(0, |time| elapsed_ms(time, now));
        let speed = self.touch.speed;
        let delta = Point::new(speed.x * elapsed / 1000, speed.y * elapsed / 1000);
        let scrolled = self.host.touch_scroll(delta);
        if speed.is_null() || !scrolled {
            tracing::trace!("touch momentum finished");
            self.touch.state = TouchScrollState::Manual;
            self.touch.scroll = false;
            self.touch.scroll_timer.stop();
        } else {
            self.touch.scroll_time = Some(now);
        }
        self.touch.decelerate(elapsed, &config);
    }
}
