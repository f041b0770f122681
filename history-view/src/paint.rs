//! Paint pass: visible views, userpics, then the date badges on top.
//!
//! The surface uses content coordinates, the same space as `clip`.

use std::time::Instant;

use chrono::NaiveDate;

use crate::config::Style;
use crate::enumerate::Direction;
use crate::geometry::Point;
use crate::geometry::Rect;
use crate::host::Surface;
use crate::inner::HistoryInner;
use crate::selection::render_selection;
use crate::text::TextEngine;
use crate::text::TextWithEntities;

const DATE_BADGE_FORMAT: &str = "%-d %B %Y";

/// Rectangle of the date badge whose top is `top`, centered in `width`.
pub(crate) fn date_badge_rect(
    style: &Style,
    engine: &dyn TextEngine,
    date: NaiveDate,
    width: i32,
    top: i32,
) -> Rect {
    let label = TextWithEntities::plain(date.format(DATE_BADGE_FORMAT).to_string());
    let badge_width = engine.max_width(&label) + 2 * style.date_badge_padding;
    Rect::new(
        (width - badge_width) / 2,
        top,
        badge_width,
        style.date_badge_height,
    )
}

impl HistoryInner {
    pub fn paint_at(&self, surface: &mut dyn Surface, clip: Rect, now: Instant) {
        if clip.is_empty() {
            return;
        }
        let timeline = &self.timeline;
        let style = &self.config.style;
        let selected = self
            .selection
            .preview(timeline, self.mouse.drag_range.as_ref());

        timeline.enumerate_range(
            clip.top(),
            clip.bottom(),
            Direction::TopToBottom,
            &mut |view, top, _| {
                let selection = render_selection(timeline, &selected, view.id());
                view.draw(surface, Point::new(0, top), clip, selection, now);
                true
            },
        );

        timeline.enumerate_userpics(style, |view, userpic_top| {
            if userpic_top >= clip.bottom() {
                return false;
            }
            if userpic_top + style.photo_size > clip.top() {
                surface.draw_userpic(
                    view.sender(),
                    Rect::new(
                        style.msg_margin_left,
                        userpic_top,
                        style.photo_size,
                        style.photo_size,
                    ),
                );
            }
            true
        });

        let engine = self.engine.as_ref();
        let width = timeline.width();
        let scroll_date_opacity = self.scroll_date.opacity(now);
        timeline.enumerate_dates(style, |view, item_top, date_top| {
            if date_top + style.date_badge_height <= clip.top() {
                return false;
            }
            if date_top < clip.bottom() {
                let in_place = view.display_date()
                    && date_top < item_top + style.service_margin_top + style.date_badge_height;
                let opacity = if in_place { 1.0 } else { scroll_date_opacity };
                if opacity > 0.0 {
                    let day = view.item().day();
                    let rect = date_badge_rect(style, engine, day, width, date_top);
                    surface.draw_date_badge(day, rect, opacity);
                }
            }
            true
        });
    }
}
