//! Pointer handling: hover, clicks, text and item selection, drag-out.
//!
//! Pointer positions arrive in viewport coordinates and are mapped to content
//! coordinates with the current visible top, so a scroll during a selection
//! drag keeps extending the selection under the pointer.

use std::time::Instant;

use crate::geometry::Point;
use crate::geometry::Rect;
use crate::hit_test::CursorState;
use crate::hit_test::Link;
use crate::hit_test::StateRequest;
use crate::hit_test::TextState;
use crate::host::CursorShape;
use crate::host::DragPayload;
use crate::host::ForwardPayload;
use crate::inner::HistoryInner;
use crate::item::ItemId;
use crate::paint::date_badge_rect;
use crate::selection::DragEndpoint;
use crate::selection::DragRange;
use crate::selection::SelectAction;
use crate::text::TextSelectType;
use crate::text::TextSelection;
use crate::text::TextWithEntities;
use crate::timer::Timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseAction {
    #[default]
    None,
    PrepareDrag,
    Dragging,
    PrepareSelect,
    Selecting,
}

/// A link under the pointer together with the view that reported it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ActiveLink {
    pub(crate) link: Link,
    pub(crate) host: ItemId,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MouseState {
    pub(crate) action: MouseAction,
    /// Last pointer position in viewport coordinates.
    pub(crate) position: Point,
    pub(crate) action_item: Option<ItemId>,
    /// Press position relative to the action item's view.
    drag_start: Point,
    text_symbol: u16,
    select_type: TextSelectType,
    cursor_state: CursorState,
    toggle_on_release: bool,
    pub(crate) drag_range: Option<DragRange>,
    /// View under the pointer row, even outside its bubble.
    pub(crate) moused: Option<ItemId>,
    /// View whose bubble contains the pointer.
    pub(crate) hovered: Option<ItemId>,
    pub(crate) pressed: Option<ItemId>,
    pub(crate) active_link: Option<ActiveLink>,
    pub(crate) pressed_link: Option<ActiveLink>,
    cursor: CursorShape,
    pub(crate) triple_click: Timer,
    triple_click_point: Point,
}

impl MouseState {
    /// Forgets every reference to `id`.
    pub(crate) fn item_removed(&mut self, id: ItemId) {
        if self.action_item == Some(id) {
            self.action = MouseAction::None;
            self.action_item = None;
            self.drag_range = None;
        }
        if self
            .drag_range
            .is_some_and(|range| range.top.item == id || range.bottom.item == id)
        {
            self.drag_range = None;
        }
        for item in [&mut self.moused, &mut self.hovered, &mut self.pressed] {
            if *item == Some(id) {
                *item = None;
            }
        }
        for link in [&mut self.active_link, &mut self.pressed_link] {
            let stale = link
                .as_ref()
                .is_some_and(|active| active.host == id || active.link.item() == Some(id));
            if stale {
                *link = None;
            }
        }
    }

    pub(crate) fn date_link_pressed(&self) -> bool {
        self.pressed_link
            .as_ref()
            .is_some_and(|pressed| matches!(pressed.link, Link::JumpToDate(_)))
    }
}

impl HistoryInner {
    pub fn mouse_action(&self) -> MouseAction {
        self.mouse.action
    }

    pub fn mouse_press_at(
        &mut self,
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
        now: Instant,
    ) {
        self.mouse_action_start(position, button, modifiers, now);
    }

    /// Pointer moved. `buttons_pressed` is false when no button is held, which
    /// finishes any action whose release was missed.
    pub fn mouse_move_at(&mut self, position: Point, buttons_pressed: bool, now: Instant) {
        if !buttons_pressed && self.mouse.action != MouseAction::None {
            self.mouse_release_at(position, MouseButton::Left, now);
        }
        if position != self.mouse.position
            && (!buttons_pressed || self.mouse.date_link_pressed())
        {
            self.scroll_date.keep_for_now_at(now);
        }
        self.mouse.position = position;
        self.mouse_action_update(now);
    }

    pub fn mouse_release_at(&mut self, position: Point, button: MouseButton, now: Instant) {
        self.mouse_action_finish(position, button, now);
        if self.mouse.triple_click.is_pending(now) {
            self.mouse
                .triple_click
                .start(now, self.config.interaction.double_click_interval);
        }
    }

    /// A second press within the double-click interval: selects the word
    /// under the pointer and opens the triple-click window.
    pub fn mouse_double_click_at(
        &mut self,
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
        now: Instant,
    ) {
        self.mouse_action_start(position, button, modifiers, now);
        let Some(id) = self.mouse.moused else {
            return;
        };
        let text_mode = !self.selection.in_items_mode()
            && matches!(
                self.mouse.action,
                MouseAction::None | MouseAction::Selecting
            );
        if !text_mode || self.mouse.select_type != TextSelectType::Letters {
            return;
        }
        let Some(state) = self.item_text_state(id, self.mouse.drag_start, StateRequest::with_symbol())
        else {
            return;
        };
        if state.cursor != CursorState::InText {
            return;
        }
        self.mouse.text_symbol = state.symbol;
        self.mouse.select_type = TextSelectType::Words;
        if self.mouse.action == MouseAction::None {
            self.mouse.action = MouseAction::Selecting;
            self.mouse.action_item = Some(id);
            self.selection.clear(false);
        }
        self.mouse_move_at(position, true, now);
        self.mouse.triple_click_point = position;
        self.mouse
            .triple_click
            .start(now, self.config.interaction.double_click_interval);
    }

    /// The pointer left the list.
    pub fn mouse_leave(&mut self) {
        if let Some(hovered) = self.mouse.hovered.take() {
            self.repaint_item(hovered);
        }
        self.mouse.active_link = None;
        if self.mouse.cursor != CursorShape::Default {
            self.mouse.cursor = CursorShape::Default;
            self.host.set_cursor(CursorShape::Default);
        }
    }

    /// Drops the action in progress. The committed selection is kept.
    pub fn mouse_action_cancel(&mut self) {
        self.mouse.action_item = None;
        self.mouse.action = MouseAction::None;
        self.mouse.drag_start = Point::default();
        self.mouse.drag_range = None;
        self.mouse.toggle_on_release = false;
        self.host.no_selecting_scroll();
    }

    fn mouse_action_start(
        &mut self,
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
        now: Instant,
    ) {
        self.mouse.position = position;
        self.mouse_action_update(now);
        if button != MouseButton::Left {
            return;
        }
        self.mouse.pressed_link = self.mouse.active_link.clone();
        if self.mouse.pressed != self.mouse.hovered {
            if let Some(pressed) = self.mouse.pressed {
                self.repaint_item(pressed);
            }
            self.mouse.pressed = self.mouse.hovered;
            if let Some(pressed) = self.mouse.pressed {
                self.repaint_item(pressed);
            }
        }

        let point = self.content_point(position);
        let moused = self.mouse.moused;
        self.mouse.action = MouseAction::None;
        self.mouse.action_item = moused;
        self.mouse.toggle_on_release = false;
        self.mouse.drag_start = moused
            .and_then(|id| self.timeline.item_top(id))
            .map_or(Point::default(), |top| point - Point::new(0, top));

        if self.mouse.pressed_link.is_some() {
            self.mouse.action = MouseAction::PrepareDrag;
        } else if self.selection.in_items_mode() {
            let on_selected = moused.is_some_and(|id| self.selection.is_selected(id));
            self.mouse.action = if on_selected && self.mouse.hovered.is_some() {
                MouseAction::PrepareDrag
            } else {
                MouseAction::PrepareSelect
            };
        }
        if self.mouse.action == MouseAction::None
            && let Some(id) = moused
        {
            self.start_text_action(id, position, modifiers, now);
        }

        if self.mouse.action_item.is_none() {
            self.mouse.action = MouseAction::None;
        } else if self.mouse.action == MouseAction::None {
            self.mouse.action_item = None;
        }
        tracing::trace!(action = ?self.mouse.action, item = ?self.mouse.action_item, "mouse action started");
    }

    fn start_text_action(&mut self, id: ItemId, position: Point, modifiers: Modifiers, now: Instant) {
        if modifiers.ctrl {
            self.mouse.action = MouseAction::PrepareSelect;
            self.mouse.toggle_on_release = true;
            return;
        }
        let request = StateRequest::with_symbol();
        let mut drag_state = TextState::default();
        let in_triple_click = self.mouse.triple_click.is_pending(now)
            && (position - self.mouse.triple_click_point).manhattan_length()
                < self.config.interaction.start_drag_distance;
        if in_triple_click {
            drag_state = self
                .item_text_state(id, self.mouse.drag_start, request)
                .unwrap_or_default();
            if drag_state.cursor == CursorState::InText {
                self.selection.clear(false);
                self.mouse.text_symbol = drag_state.symbol;
                self.mouse.action = MouseAction::Selecting;
                self.mouse.select_type = TextSelectType::Paragraphs;
                self.mouse_action_update(now);
                self.mouse
                    .triple_click
                    .start(now, self.config.interaction.double_click_interval);
            }
        } else if self.mouse.pressed.is_some() {
            drag_state = self
                .item_text_state(id, self.mouse.drag_start, request)
                .unwrap_or_default();
        }
        if self.mouse.select_type == TextSelectType::Paragraphs {
            return;
        }
        if self.mouse.pressed.is_none() {
            self.mouse.action = MouseAction::PrepareSelect;
            return;
        }
        self.mouse.text_symbol = drag_state.symbol;
        let upon_selected = drag_state.cursor == CursorState::InText
            && self.is_upon_text_selection(id, drag_state.symbol);
        let sticker = self
            .timeline
            .view(id)
            .and_then(|view| view.display_media())
            .is_some_and(|media| media.drag_item());
        if upon_selected || sticker || self.mouse.cursor_state == CursorState::InDate {
            self.mouse.action = MouseAction::PrepareDrag;
            return;
        }
        if drag_state.after_symbol {
            self.mouse.text_symbol = self.mouse.text_symbol.saturating_add(1);
        }
        if self.selection.clear(false) {
            self.notify_selection_changed();
        }
        self.mouse.action = MouseAction::Selecting;
        self.repaint_item(id);
    }

    pub(crate) fn mouse_action_update(&mut self, now: Instant) {
        let point = self.clamped_content_point(self.mouse.position);
        let located = self.timeline.locate(point.y);
        let mut local = Point::default();
        if let Some(located) = located {
            self.mouse.moused = Some(located.item);
            local = point - Point::new(0, located.top);
            let inside = self
                .timeline
                .view(located.item)
                .is_some_and(|view| view.has_point(local));
            let hovered = inside.then_some(located.item);
            if hovered != self.mouse.hovered {
                for id in [self.mouse.hovered, hovered].into_iter().flatten() {
                    self.repaint_item(id);
                }
                self.mouse.hovered = hovered;
            }
        } else {
            self.mouse.moused = None;
        }

        self.check_drag_start(point, now);

        let item = located.map(|located| located.item);
        let mut selecting_text = item.is_some()
            && item == self.mouse.action_item
            && self.mouse.hovered == item
            && !self.selection.in_items_mode();
        let mut state = TextState::default();
        let mut link_host = None;
        if let Some(id) = item {
            if let Some((date_state, host)) = self.date_badge_state(point, now) {
                state = date_state;
                link_host = Some(host);
            }
            if state.link.is_none() {
                let request = if self.mouse.action == MouseAction::Selecting {
                    StateRequest::with_symbol()
                } else {
                    selecting_text = false;
                    StateRequest::default()
                };
                state = self.item_text_state(id, local, request).unwrap_or_default();
                link_host = Some(id);
                if state.link.is_none()
                    && let Some((userpic_state, host)) = self.userpic_state(id, point, local)
                {
                    state = userpic_state;
                    link_host = Some(host);
                }
            }
        }

        let active = state
            .link
            .clone()
            .zip(link_host)
            .map(|(link, host)| ActiveLink { link, host });
        let link_changed = active != self.mouse.active_link;
        self.mouse.active_link = active;

        let mut cursor = CursorShape::Default;
        if self.mouse.action == MouseAction::None {
            self.mouse.cursor_state = state.cursor;
            if state.link.is_some() {
                cursor = CursorShape::Pointer;
            } else if state.cursor == CursorState::InText && !self.selection.in_items_mode() {
                cursor = CursorShape::Text;
            }
        } else if let Some(id) = item {
            if self.mouse.action == MouseAction::Selecting {
                if selecting_text {
                    self.update_text_selection(&state);
                } else {
                    self.update_drag_range(id, local, &state);
                }
            }
            if self.mouse.pressed_link.is_some() {
                cursor = CursorShape::Pointer;
            } else if self.mouse.action == MouseAction::Selecting
                && !self.selection.in_items_mode()
                && self.mouse.drag_range.is_none()
            {
                cursor = CursorShape::Text;
            }
        }

        if self.mouse.action == MouseAction::Selecting {
            self.host.check_selecting_scroll();
        } else {
            if self.mouse.drag_range.take().is_some() {
                self.host.repaint();
            }
            self.host.no_selecting_scroll();
        }
        if self.mouse.action == MouseAction::None && (link_changed || cursor != self.mouse.cursor) {
            self.mouse.cursor = cursor;
            self.host.set_cursor(cursor);
        }
    }

    /// Promotes a prepared action once the pointer moved far enough.
    fn check_drag_start(&mut self, point: Point, now: Instant) {
        if !matches!(
            self.mouse.action,
            MouseAction::PrepareDrag | MouseAction::PrepareSelect
        ) {
            return;
        }
        let Some(top) = self.mouse.action_item.and_then(|id| self.timeline.item_top(id)) else {
            return;
        };
        let start = self.mouse.drag_start + Point::new(0, top);
        if (point - start).manhattan_length() < self.config.interaction.start_drag_distance {
            return;
        }
        match self.mouse.action {
            MouseAction::PrepareDrag => {
                self.mouse.action = MouseAction::Dragging;
                self.perform_drag(now);
            }
            _ => {
                self.mouse.action = MouseAction::Selecting;
                self.mouse.toggle_on_release = false;
            }
        }
        tracing::trace!(action = ?self.mouse.action, "mouse drag started");
    }

    fn update_text_selection(&mut self, state: &TextState) {
        let Some(id) = self.mouse.action_item else {
            return;
        };
        let mut second = state.symbol;
        if state.after_symbol && self.mouse.select_type == TextSelectType::Letters {
            second = second.saturating_add(1);
        }
        let anchor = self.mouse.text_symbol;
        let mut selection = TextSelection::new(second.min(anchor), second.max(anchor));
        if self.mouse.select_type != TextSelectType::Letters
            && let Some(view) = self.timeline.view(id)
        {
            selection = view.adjust_selection(selection, self.mouse.select_type);
        }
        let current = self.selection.get(id);
        if current != Some(selection) && !(current.is_none() && selection.is_empty()) {
            self.selection.set_text_selection(id, selection);
            self.repaint_item(id);
        }
        self.mouse.drag_range = None;
    }

    /// Recomputes the items covered by a selection drag from the pressed item
    /// to `id`. Boundary items the pointer only touches in their margins are
    /// left out of the range.
    fn update_drag_range(&mut self, id: ItemId, local: Point, state: &TextState) {
        let Some(anchor) = self.mouse.action_item else {
            return;
        };
        let (Some(anchor_view), Some(view)) = (self.timeline.view(anchor), self.timeline.view(id))
        else {
            return;
        };
        let style = &self.config.style;
        let drag_distance = self.config.interaction.start_drag_distance;
        let start = self.mouse.drag_start;
        let down = self.timeline.order_key(anchor) < self.timeline.order_key(id)
            || (anchor == id && start.y < local.y);

        let mut from = Some(anchor);
        let mut from_symbol = self.mouse.text_symbol;
        if !anchor_view.has_point(start) {
            let skip_from = if down {
                start.y >= anchor_view.height() - anchor_view.margin_bottom(style)
                    || (anchor == id
                        && (local.y < start.y + drag_distance
                            || local.y < anchor_view.margin_top(style)))
            } else {
                start.y < anchor_view.margin_top(style)
                    || (anchor == id
                        && (local.y >= start.y - drag_distance
                            || local.y >= anchor_view.height() - anchor_view.margin_bottom(style)))
            };
            if skip_from {
                from = if anchor == id {
                    None
                } else {
                    self.timeline.neighbour(anchor, down)
                };
                from_symbol = if down { 0 } else { TextSelection::FULL.to };
            }
        }
        let mut to = Some(id);
        let mut to_symbol = state.caret();
        if anchor != id {
            let skip_to = if down {
                local.y < view.margin_top(style)
            } else {
                local.y >= view.height() - view.margin_bottom(style)
            };
            if skip_to {
                to = if from == to {
                    None
                } else {
                    self.timeline.neighbour(id, !down)
                };
                to_symbol = if down { TextSelection::FULL.to } else { 0 };
            }
        }
        let (Some(from), Some(to)) = (from, to) else {
            self.set_drag_range(None);
            return;
        };
        let (upper, lower) = if down { (from, to) } else { (to, from) };
        if self.timeline.order_key(upper) > self.timeline.order_key(lower) {
            // The excluded boundaries crossed; nothing is covered.
            self.set_drag_range(None);
            return;
        }

        let mut first_affected = Some(from);
        while let Some(candidate) = first_affected {
            let selectable = self
                .timeline
                .view(candidate)
                .is_some_and(|view| candidate.is_server() && !view.item().is_service());
            if selectable {
                break;
            }
            first_affected = if candidate == to {
                None
            } else {
                self.timeline.neighbour(candidate, down)
            };
        }
        let selecting = first_affected.is_none_or(|first| !self.selection.is_selected(first));

        let from_end = DragEndpoint {
            item: from,
            symbol: from_symbol,
        };
        let to_end = DragEndpoint {
            item: to,
            symbol: to_symbol,
        };
        let (top, bottom) = if down {
            (from_end, to_end)
        } else {
            (to_end, from_end)
        };
        self.set_drag_range(Some(DragRange {
            top,
            bottom,
            selecting,
        }));
    }

    fn set_drag_range(&mut self, range: Option<DragRange>) {
        if self.mouse.drag_range != range {
            self.mouse.drag_range = range;
            self.host.repaint();
        }
    }

    fn mouse_action_finish(&mut self, position: Point, button: MouseButton, now: Instant) {
        self.mouse.position = position;
        self.mouse_action_update(now);

        let pressed_link = self.mouse.pressed_link.take();
        let mut activated =
            pressed_link.filter(|pressed| self.mouse.active_link.as_ref() == Some(pressed));
        if self.mouse.action == MouseAction::Dragging {
            activated = None;
        } else if self.mouse.action == MouseAction::PrepareDrag
            && self.selection.in_items_mode()
            && button != MouseButton::Right
            && let Some(active) = &activated
        {
            let toggles = self
                .timeline
                .view(active.host)
                .and_then(|view| view.display_media())
                .is_some_and(|media| media.toggle_selection_by_handler_click(&active.link));
            if toggles {
                activated = None;
            }
        }
        if let Some(pressed) = self.mouse.pressed.take() {
            self.repaint_item(pressed);
        }

        if let Some(active) = activated {
            self.mouse_action_cancel();
            self.activate_link(&active.link, button, now);
            return;
        }

        let item = self.mouse.action_item;
        match (self.mouse.action, item) {
            (MouseAction::PrepareSelect, Some(id))
                if self.selection.in_items_mode() || self.mouse.toggle_on_release =>
            {
                self.change_selection_as_group(id, SelectAction::Invert);
            }
            (MouseAction::PrepareDrag, Some(id)) if button != MouseButton::Right => {
                if self.selection.is_selected(id) && self.mouse.hovered.is_some() {
                    self.change_selection_as_group(id, SelectAction::Deselect);
                } else if self.selection.in_items_mode() && self.selection.get(id).is_none() {
                    self.change_selection_as_group(id, SelectAction::Select);
                } else if self.selection.has_text_selection() {
                    self.selection.clear(true);
                    self.notify_selection_changed();
                }
            }
            (MouseAction::Selecting, _) => {
                if let Some(range) = self.mouse.drag_range.take() {
                    self.selection.apply_drag(&self.timeline, &range);
                    self.notify_selection_changed();
                } else if let Some((_, selection)) = self.selection.text_selection()
                    && selection.is_empty()
                {
                    self.selection.clear(false);
                    self.notify_selection_changed();
                } else if self.selection.text_selection().is_some() {
                    self.notify_selection_changed();
                }
            }
            _ => {}
        }
        self.mouse.action = MouseAction::None;
        self.mouse.action_item = None;
        self.mouse.select_type = TextSelectType::Letters;
        self.mouse.toggle_on_release = false;
        self.host.no_selecting_scroll();
    }

    /// Starts dragging content out of the list: the selected text when the
    /// press was upon it, the pressed link's text, or the pressed message
    /// itself for stickers, dates and draggable media.
    fn perform_drag(&mut self, _now: Instant) {
        if self.mouse.action != MouseAction::Dragging {
            return;
        }
        let mut upon_selected = false;
        if let Some(id) = self.mouse.action_item {
            if self.selection.in_items_mode() {
                upon_selected = self.selection.is_selected(id);
            } else if let Some(state) =
                self.item_text_state(id, self.mouse.drag_start, StateRequest::with_symbol())
            {
                upon_selected = state.cursor == CursorState::InText
                    && self.is_upon_text_selection(id, state.symbol);
            }
        }
        let pressed_link = self.mouse.pressed_link.clone();
        let text = if upon_selected {
            self.selection.selected_text(&self.timeline, None)
        } else {
            pressed_link
                .as_ref()
                .and_then(|pressed| pressed.link.drag_text())
                .map(TextWithEntities::plain)
                .unwrap_or_default()
        };
        if !text.is_empty() {
            self.mouse.drag_range = None;
            self.host.no_selecting_scroll();
            let state = self.selection.state(&self.timeline);
            let forward = (upon_selected
                && state.count > 0
                && state.count == state.can_forward_count)
                .then_some(ForwardPayload::Selected);
            tracing::debug!(upon_selected, "dragging text out");
            self.host.start_drag(DragPayload {
                text: Some(text),
                forward,
                files: Vec::new(),
            });
            return;
        }

        let mut forward = None;
        let mut files = Vec::new();
        if let Some(pressed) = self.mouse.pressed
            && let Some(view) = self.timeline.view(pressed)
        {
            let media = view.display_media();
            if self.mouse.cursor_state == CursorState::InDate
                || media.is_some_and(|media| media.drag_item())
            {
                forward = Some(ForwardPayload::Pressed(pressed));
                files.extend(
                    media
                        .and_then(|media| media.document())
                        .and_then(|document| document.local_path.clone()),
                );
            }
        }
        if forward.is_none()
            && let Some(pressed) = &pressed_link
            && let Some(media) = self
                .timeline
                .view(pressed.host)
                .and_then(|view| view.display_media())
            && media.drag_item_by_handler(&pressed.link)
        {
            forward = Some(ForwardPayload::PressedLink(pressed.host));
            let document = pressed
                .link
                .item()
                .and_then(|item| self.timeline.view(item))
                .and_then(|view| view.media())
                .and_then(|media| media.document())
                .or_else(|| media.document());
            files.extend(document.and_then(|document| document.local_path.clone()));
        }
        if let Some(forward) = forward {
            tracing::debug!(?forward, "dragging messages out");
            self.host.start_drag(DragPayload {
                text: None,
                forward: Some(forward),
                files,
            });
        }
    }

    /// Whether `symbol` of `id` lies inside the current text selection.
    pub(crate) fn is_upon_text_selection(&self, id: ItemId, symbol: u16) -> bool {
        match self.selection.text_selection() {
            Some((selected, range)) => selected == id && symbol >= range.from && symbol < range.to,
            None => false,
        }
    }

    /// Hit-tests `local`, relative to the view of `id`.
    pub(crate) fn item_text_state(
        &self,
        id: ItemId,
        local: Point,
        request: StateRequest,
    ) -> Option<TextState> {
        let view = self.timeline.view(id)?;
        Some(view.text_state(local, request, self.engine.as_ref()))
    }

    /// The floating date badge under `point`, if it is visible enough to be
    /// clicked.
    fn date_badge_state(&self, point: Point, now: Instant) -> Option<(TextState, ItemId)> {
        let style = &self.config.style;
        let engine = self.engine.as_ref();
        let width = self.timeline.width();
        let scroll_date_opacity = self.scroll_date.opacity(now);
        let mut found = None;
        self.timeline.enumerate_dates(style, |view, item_top, date_top| {
            if date_top + style.date_badge_height <= point.y {
                return false;
            }
            if date_top <= point.y {
                let in_place = view.display_date()
                    && date_top < item_top + style.service_margin_top + style.date_badge_height;
                let opacity = if in_place { 1.0 } else { scroll_date_opacity };
                let badge = date_badge_rect(style, engine, view.item().day(), width, date_top);
                if opacity > 0.0 && point.x >= badge.left() && point.x < badge.right() {
                    found = Some((
                        TextState::with_link(None, Link::JumpToDate(view.item().day())),
                        view.id(),
                    ));
                }
                return false;
            }
            true
        });
        found
    }

    /// The userpic under `point` when the pointer is in the userpic column.
    fn userpic_state(&self, id: ItemId, point: Point, local: Point) -> Option<(TextState, ItemId)> {
        let style = &self.config.style;
        let view = self.timeline.view(id)?;
        let column = Rect::new(style.msg_margin_left, 0, style.photo_size, i32::MAX);
        if !view.has_from_photo || local.x < column.left() || local.x >= column.right() {
            return None;
        }
        let mut found = None;
        self.timeline.enumerate_userpics(style, |view, userpic_top| {
            if userpic_top > point.y {
                return false;
            }
            if point.y < userpic_top + style.photo_size {
                found = Some((
                    TextState::with_link(None, Link::OpenPeer(view.sender())),
                    view.id(),
                ));
                return false;
            }
            true
        });
        found
    }
}
