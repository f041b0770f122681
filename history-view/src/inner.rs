//! The history list controller.
//!
//! [`HistoryInner`] owns the two histories, the committed selection and every
//! piece of transient interaction state (pointer action, touch gesture,
//! floating date). The hosting widget feeds it input and visible-area
//! changes, asks it to paint, and receives notifications through its
//! [`HistoryHost`].

use std::time::Duration;
use std::time::Instant;

use crate::config::HistoryViewConfig;
use crate::context_menu::ContextTarget;
use crate::geometry::Point;
use crate::geometry::Rect;
use crate::geometry::Size;
use crate::hit_test::Link;
use crate::history::History;
use crate::history::HistoryKind;
use crate::host::HistoryHost;
use crate::item::Item;
use crate::item::ItemId;
use crate::item::MediaContent;
use crate::mouse::MouseAction;
use crate::mouse::MouseButton;
use crate::mouse::MouseState;
use crate::scroll_date::ScrollDate;
use crate::selection::SelectAction;
use crate::selection::Selection;
use crate::selection::SelectionState;
use crate::text::TextEngine;
use crate::text::TextWithEntities;
use crate::timeline::Timeline;
use crate::touch::TouchState;
use crate::view::View;

pub struct HistoryInner {
    pub(crate) config: HistoryViewConfig,
    pub(crate) engine: Box<dyn TextEngine>,
    pub(crate) host: Box<dyn HistoryHost>,
    pub(crate) timeline: Timeline,
    pub(crate) selection: Selection,
    pub(crate) mouse: MouseState,
    pub(crate) touch: TouchState,
    pub(crate) scroll_date: ScrollDate,
    pub(crate) context_target: Option<ContextTarget>,
    size: Size,
    visible_height: i32,
}

impl HistoryInner {
    pub fn new(
        timeline: Timeline,
        config: HistoryViewConfig,
        engine: Box<dyn TextEngine>,
        host: Box<dyn HistoryHost>,
    ) -> Self {
        Self {
            selection: Selection::new(config.max_selected_items),
            scroll_date: ScrollDate::new(config.scroll_date),
            config,
            engine,
            host,
            timeline,
            mouse: MouseState::default(),
            touch: TouchState::default(),
            context_target: None,
            size: Size::default(),
            visible_height: 0,
        }
    }

    pub fn config(&self) -> &HistoryViewConfig {
        &self.config
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn scroll_date(&self) -> &ScrollDate {
        &self.scroll_date
    }

    /// Content size from the last recount.
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn item_top(&self, id: ItemId) -> Option<i32> {
        self.timeline.item_top(id)
    }

    /// Appends a new item to the bottom of a history. Heights are stale until
    /// the next [`HistoryInner::recount_history_geometry`].
    pub fn push_back(&mut self, kind: HistoryKind, item: Item) {
        if let Some(history) = self.timeline.get_mut(kind) {
            history.push_back(item);
        }
    }

    /// Prepends an older slice of items to a history.
    pub fn push_front_slice(&mut self, kind: HistoryKind, items: Vec<Item>) {
        if let Some(history) = self.timeline.get_mut(kind) {
            history.push_front_slice(items);
        }
    }

    /// Must be called whenever the viewport scrolls or resizes. `top` and
    /// `bottom` are content coordinates.
    pub fn visible_area_updated_at(&mut self, top: i32, bottom: i32, now: Instant) {
        self.timeline.set_visible_range(top, bottom);
        self.visible_height = bottom - top;
        let scrolled_to_bottom = bottom >= self.size.height;
        let history_top = self.timeline.history_top();
        let migrated_top = self.timeline.migrated_top();
        let counted = if scrolled_to_bottom {
            None
        } else {
            match (history_top, migrated_top) {
                (Some(history_top), _) if top >= history_top => {
                    Some((HistoryKind::Primary, top - history_top))
                }
                (_, Some(migrated_top)) if top >= migrated_top => {
                    Some((HistoryKind::Migrated, top - migrated_top))
                }
                (Some(history_top), _) => Some((HistoryKind::Primary, top - history_top)),
                (None, Some(migrated_top)) => Some((HistoryKind::Migrated, top - migrated_top)),
                (None, None) => None,
            }
        };
        for kind in [HistoryKind::Primary, HistoryKind::Migrated] {
            let Some(history) = self.timeline.get_mut(kind) else {
                continue;
            };
            match counted {
                Some((counted_kind, offset)) if counted_kind == kind => {
                    history.count_scroll_state(offset);
                }
                _ => history.forget_scroll_state(),
            }
        }

        let top_state = self
            .timeline
            .history()
            .scroll_top_state()
            .or_else(|| self.timeline.migrated().and_then(History::scroll_top_state));
        let was_shown = self.scroll_date.is_shown();
        self.scroll_date.check_at(top_state, now);
        if was_shown != self.scroll_date.is_shown() {
            self.host.repaint();
        }
        if self.mouse_action() != MouseAction::None {
            self.mouse_action_update(now);
        }
    }

    /// Lays both histories out into `width` and reports the new content size
    /// to the host.
    pub fn recount_history_geometry(&mut self, width: i32, visible_height: i32) {
        self.visible_height = visible_height;
        self.size = self.timeline.recount(
            width,
            visible_height,
            &self.config,
            self.engine.as_ref(),
        );
        tracing::debug!(
            width,
            height = self.size.height,
            "history geometry recounted"
        );
        self.host.resize(self.size);
    }

    /// Recomputes the top padding without relaying the items out.
    pub fn update_size(&mut self) {
        let size = self
            .timeline
            .update_size(self.visible_height, &self.config.style);
        if size != self.size {
            self.size = size;
            self.host.resize(size);
        }
    }

    /// Drops every reference to `id` held by the controller. Runs before the
    /// item itself is destroyed.
    pub fn item_removed(&mut self, id: ItemId) {
        if self.selection.remove(id) {
            self.notify_selection_changed();
        }
        self.mouse.item_removed(id);
        self.scroll_date.item_removed(id);
        let stale_menu = self.context_target.as_ref().is_some_and(|target| {
            target.item == Some(id)
                || target.link.as_ref().and_then(Link::item) == Some(id)
        });
        if stale_menu {
            self.context_target = None;
        }
    }

    /// Removes an item from whichever history holds it.
    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let (kind, _) = self.timeline.find(id)?;
        self.item_removed(id);
        let item = self.timeline.get_mut(kind)?.remove(id);
        tracing::debug!(?id, ?kind, "item removed");
        self.host.repaint();
        item
    }

    /// Replaces the attachment of `id`, e.g. after a download finished.
    pub fn refresh_media(&mut self, id: ItemId, content: MediaContent) -> bool {
        let Some((kind, _)) = self.timeline.find(id) else {
            return false;
        };
        let updated = self
            .timeline
            .get_mut(kind)
            .is_some_and(|history| history.update_media(id, content));
        if updated {
            self.repaint_item(id);
        }
        updated
    }

    pub fn get_selected_text(&self) -> TextWithEntities {
        self.selection.selected_text(&self.timeline, None)
    }

    /// Wholly selected items in id order.
    pub fn get_selected_items(&self) -> Vec<ItemId> {
        self.selection.selected_items()
    }

    pub fn get_selection_state(&self) -> SelectionState {
        self.selection.state(&self.timeline)
    }

    pub fn can_copy_selected(&self) -> bool {
        self.selection.can_copy()
    }

    pub fn can_delete_selected(&self) -> bool {
        self.selection.can_delete(&self.timeline)
    }

    pub fn can_forward_selected(&self) -> bool {
        self.selection.can_forward(&self.timeline)
    }

    /// Clears the selection. With `only_text` a selection of whole items is
    /// kept.
    pub fn clear_selected_items(&mut self, only_text: bool) {
        if self.selection.clear(only_text) {
            self.notify_selection_changed();
            self.host.repaint();
        }
    }

    /// Adds one item to the selection as a whole item.
    pub fn select_item(&mut self, id: ItemId) {
        self.selection
            .change_selection(&self.timeline, id, SelectAction::Select);
        self.notify_selection_changed();
        self.repaint_item(id);
    }

    pub fn copy_selected_text(&mut self) {
        let text = self.get_selected_text();
        if !text.is_empty() {
            self.host.set_clipboard(text);
        }
    }

    pub fn keep_scroll_date_for_now_at(&mut self, now: Instant) {
        self.scroll_date.keep_for_now_at(now);
    }

    /// How long the host may wait before calling
    /// [`HistoryInner::on_tick_at`]. `None` when no timer is armed.
    pub fn next_tick_in(&self, now: Instant) -> Option<Duration> {
        crate::timer::earliest([
            self.mouse.triple_click.deadline(),
            self.touch.next_deadline(),
            self.scroll_date.next_deadline(now),
        ])
        .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Fires every timer due at `now`.
    pub fn on_tick_at(&mut self, now: Instant) {
        self.touch_tick_at(now);
        if self.mouse.triple_click.fire_if_due(now) {
            tracing::trace!("triple click window closed");
        }
        let fading = self.scroll_date.is_animating(now);
        let fired = self
            .scroll_date
            .on_tick_at(now, self.mouse.date_link_pressed());
        if fired || fading {
            self.host.repaint();
        }
    }

    /// Maps a viewport position into content coordinates.
    pub(crate) fn content_point(&self, position: Point) -> Point {
        Point::new(position.x, position.y + self.timeline.visible_top)
    }

    /// Like [`HistoryInner::content_point`], clamped to the visible area.
    pub(crate) fn clamped_content_point(&self, position: Point) -> Point {
        let point = self.content_point(position);
        Point::new(
            point.x.clamp(0, self.timeline.width().max(0)),
            point
                .y
                .clamp(self.timeline.visible_top, self.timeline.visible_bottom),
        )
    }

    pub(crate) fn repaint_item(&mut self, id: ItemId) {
        let Some(top) = self.timeline.item_top(id) else {
            return;
        };
        let Some(height) = self.timeline.view(id).map(View::height) else {
            return;
        };
        let rect = Rect::new(0, top, self.timeline.width(), height);
        self.host.repaint_item(id, rect);
    }

    pub(crate) fn notify_selection_changed(&mut self) {
        let state = self.selection.state(&self.timeline);
        tracing::trace!(count = state.count, text = state.text_selected, "selection changed");
        self.host.selection_changed(state);
    }

    pub(crate) fn change_selection_as_group(&mut self, id: ItemId, action: SelectAction) {
        self.selection
            .change_selection_as_group(&self.timeline, id, action);
        self.notify_selection_changed();
        for member in self.timeline.group_members(id).to_vec() {
            self.repaint_item(member);
        }
        self.repaint_item(self.timeline.group_leader(id));
        self.repaint_item(id);
    }

    /// Runs a clicked link. Inline playback toggles locally, everything else
    /// goes to the host.
    pub(crate) fn activate_link(&mut self, link: &Link, button: MouseButton, now: Instant) {
        if let Link::PlayInline(id) = link
            && button == MouseButton::Left
            && self.toggle_inline_playback(*id, now)
        {
            self.repaint_item(*id);
            return;
        }
        tracing::debug!(?link, ?button, "activating link");
        self.host.activate_link(link, button);
    }

    fn toggle_inline_playback(&mut self, id: ItemId, now: Instant) -> bool {
        let Some((kind, _)) = self.timeline.find(id) else {
            return false;
        };
        let Some(media) = self
            .timeline
            .get_mut(kind)
            .and_then(|history| history.view_mut(id))
            .and_then(View::media_mut)
        else {
            return false;
        };
        if media.is_playing_inline() {
            media.stop_inline();
            true
        } else {
            media.play_inline(now)
        }
    }
}
