//! Walks over the views intersecting the visible area.
//!
//! Visitors return `false` to stop the walk. Stopping ends the enumeration of
//! both histories, so a caller looking for the nearest matching view can stop
//! at the first one it finds.

use crate::config::Style;
use crate::history::HistoryKind;
use crate::timeline::Timeline;
use crate::view::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    TopToBottom,
    BottomToTop,
}

impl Timeline {
    /// Visits every view whose `[top, bottom)` intersects the visible area.
    /// The visitor receives the view and its top and bottom in content
    /// coordinates. Returns `false` when the visitor stopped the walk.
    pub fn enumerate_items<F>(&self, direction: Direction, mut visitor: F) -> bool
    where
        F: FnMut(&View, i32, i32) -> bool,
    {
        self.enumerate_range(self.visible_top, self.visible_bottom, direction, &mut visitor)
    }

    pub(crate) fn enumerate_range(
        &self,
        top: i32,
        bottom: i32,
        direction: Direction,
        visitor: &mut dyn FnMut(&View, i32, i32) -> bool,
    ) -> bool {
        let order = match direction {
            Direction::TopToBottom => [HistoryKind::Migrated, HistoryKind::Primary],
            Direction::BottomToTop => [HistoryKind::Primary, HistoryKind::Migrated],
        };
        order
            .into_iter()
            .all(|kind| self.enumerate_history(kind, top, bottom, direction, visitor))
    }

    fn enumerate_history(
        &self,
        kind: HistoryKind,
        top: i32,
        bottom: i32,
        direction: Direction,
        visitor: &mut dyn FnMut(&View, i32, i32) -> bool,
    ) -> bool {
        let (Some(history), Some(history_top)) = (self.get(kind), self.top_of(kind)) else {
            return true;
        };
        // Primary content above the draw top is covered by the migrated one.
        let hidden_above = match kind {
            HistoryKind::Primary => self.history_draw_top().unwrap_or(history_top),
            HistoryKind::Migrated => history_top,
        };
        let range_top = top.max(hidden_above);
        if history.is_empty()
            || bottom <= range_top
            || history_top + history.height() <= range_top
        {
            return true;
        }
        let start_y = match direction {
            Direction::TopToBottom => range_top,
            Direction::BottomToTop => bottom - 1,
        };
        let Some(mut position) = history.locate(start_y - history_top) else {
            return true;
        };
        loop {
            let (Some(view), Some(view_top)) = (history.view_at(position), history.view_top(position))
            else {
                return true;
            };
            let item_top = history_top + view_top;
            let item_bottom = item_top + view.height();
            match direction {
                Direction::TopToBottom if item_top >= bottom => return true,
                Direction::BottomToTop if item_bottom <= range_top => return true,
                _ => {}
            }
            if view.height() > 0
                && item_top < bottom
                && item_bottom > range_top
                && !visitor(view, item_top, item_bottom)
            {
                return false;
            }
            let next = match direction {
                Direction::TopToBottom => history.next_position(position),
                Direction::BottomToTop => history.previous_position(position),
            };
            match next {
                Some(next) => position = next,
                None => return true,
            }
        }
    }

    /// Visits the userpic of every visible run of attached messages, top to
    /// bottom. The visitor receives the bottom view of the run and the top of
    /// its userpic. A userpic sticks to the bottom of the visible area while
    /// its run continues below it, but never rises above the run's top.
    pub fn enumerate_userpics<F>(&self, style: &Style, mut visitor: F) -> bool
    where
        F: FnMut(&View, i32) -> bool,
    {
        let visible_bottom = self.visible_bottom;
        let mut lowest_attached_top: Option<i32> = None;
        self.enumerate_items(Direction::TopToBottom, |view, item_top, item_bottom| {
            if view.item().is_service() {
                return true;
            }
            if lowest_attached_top.is_none() && view.is_attached_to_next() {
                lowest_attached_top = Some(item_top + view.margin_top(style));
            }
            if view.display_from_photo()
                || (view.has_from_photo && item_bottom >= visible_bottom)
            {
                let pack_top =
                    *lowest_attached_top.get_or_insert(item_top + view.margin_top(style));
                let min_bottom_skip = style.history_padding_bottom + style.msg_margin_bottom;
                let userpic_bottom = (item_bottom - view.margin_bottom(style))
                    .min(visible_bottom - min_bottom_skip)
                    .max(pack_top + style.photo_size);
                if !visitor(view, userpic_bottom - style.photo_size) {
                    return false;
                }
            }
            if !view.is_attached_to_next() {
                lowest_attached_top = None;
            }
            true
        })
    }

    /// Visits the date of every visible day, bottom to top. The visitor
    /// receives the view owning the date, its top and the top of the date
    /// badge. The badge of the topmost visible day floats at the top of the
    /// visible area but never goes below the last message of its day.
    pub fn enumerate_dates<F>(&self, style: &Style, mut visitor: F) -> bool
    where
        F: FnMut(&View, i32, i32) -> bool,
    {
        let visible_top = self.visible_top;
        let draw_top = self.history_draw_top();
        let mut lowest_in_one_day_bottom: Option<i32> = None;
        self.enumerate_items(Direction::BottomToTop, |view, item_top, item_bottom| {
            let item = view.item();
            if lowest_in_one_day_bottom.is_none() && view.is_in_one_day_with_previous() {
                lowest_in_one_day_bottom = Some(item_bottom - view.margin_bottom(style));
            }
            if view.display_date() || (!item.is_empty() && item_top <= visible_top) {
                let covered = view.history() == HistoryKind::Primary
                    && draw_top.is_some_and(|draw_top| item_top < draw_top)
                    && item_top > visible_top;
                if !covered {
                    let day_bottom = *lowest_in_one_day_bottom
                        .get_or_insert(item_bottom - view.margin_bottom(style));
                    let date_top = (item_top.max(visible_top) + style.service_margin_top)
                        .min(day_bottom - style.date_badge_height);
                    if !visitor(view, item_top, date_top) {
                        return false;
                    }
                }
            }
            if !view.is_in_one_day_with_previous() {
                lowest_in_one_day_bottom = None;
            }
            true
        })
    }
}
