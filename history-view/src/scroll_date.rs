//! The floating date shown while the list scrolls.

use std::time::Instant;

use crate::config::ScrollDateConfig;
use crate::history::ScrollTopState;
use crate::item::ItemId;
use crate::timer::Animation;
use crate::timer::Timer;

#[derive(Debug, Clone)]
pub struct ScrollDate {
    config: ScrollDateConfig,
    shown: bool,
    last_item: Option<ItemId>,
    last_item_top: i32,
    hide_timer: Timer,
    opacity: Option<Animation>,
}

impl ScrollDate {
    pub fn new(config: ScrollDateConfig) -> Self {
        Self {
            config,
            shown: false,
            last_item: None,
            last_item_top: 0,
            hide_timer: Timer::default(),
            opacity: None,
        }
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn opacity(&self, now: Instant) -> f64 {
        match &self.opacity {
            Some(animation) => animation.value(now),
            None if self.shown => 1.0,
            None => 0.0,
        }
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.opacity
            .as_ref()
            .is_some_and(|animation| animation.is_animating(now))
    }

    /// Reacts to a new scroll position. The date shows when the item at the
    /// top of the viewport moves, except for the first position reported.
    pub fn check_at(&mut self, top: Option<ScrollTopState>, now: Instant) {
        let Some(top) = top else {
            self.last_item = None;
            self.last_item_top = 0;
            self.hide_at(now);
            return;
        };
        if self.last_item == Some(top.item) && self.last_item_top == top.offset {
            return;
        }
        if self.last_item.is_some() && !self.shown {
            self.toggle_at(now);
        }
        self.last_item = Some(top.item);
        self.last_item_top = top.offset;
        self.hide_timer.start(now, self.config.hide_timeout);
    }

    /// Fires the hide timer. The date stays while the user holds it pressed.
    pub fn on_tick_at(&mut self, now: Instant, date_pressed: bool) -> bool {
        if !self.hide_timer.fire_if_due(now) {
            return false;
        }
        if !date_pressed {
            self.hide_at(now);
        }
        true
    }

    /// Rearms the hide timer, bringing a fading date back.
    pub fn keep_for_now_at(&mut self, now: Instant) {
        if !self.shown && self.last_item.is_some() && self.is_animating(now) {
            self.toggle_at(now);
        }
        self.hide_timer.start(now, self.config.hide_timeout);
    }

    pub fn hide_at(&mut self, now: Instant) {
        if self.shown {
            self.toggle_at(now);
        }
    }

    pub fn item_removed(&mut self, id: ItemId) {
        if self.last_item == Some(id) {
            self.last_item = None;
            self.last_item_top = 0;
        }
    }

    /// Earliest moment the indicator needs attention.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        let fade = self
            .opacity
            .as_ref()
            .filter(|animation| animation.is_animating(now))
            .map(|_| now);
        crate::timer::earliest([self.hide_timer.deadline(), fade])
    }

    fn toggle_at(&mut self, now: Instant) {
        let from = self.opacity(now);
        self.shown = !self.shown;
        let to = if self.shown { 1.0 } else { 0.0 };
        tracing::trace!(shown = self.shown, "scroll date toggled");
        self.opacity = Some(Animation::new(from, to, now, self.config.fade));
    }
}
