//! Selected items and text ranges.
//!
//! The selection maps item ids to a [`TextSelection`]. A whole selected item
//! maps to [`TextSelection::FULL`]; a text selection maps to the symbol range
//! inside the item's flattened text. Album members are selected and
//! deselected together whenever one of them is selected as a whole item.
//!
//! A drag in progress is kept apart from the committed selection as a
//! [`DragRange`] and merged into a copy of it for painting and copying, so the
//! committed set only changes when the drag ends.

use std::collections::BTreeMap;

use crate::history::HistoryKind;
use crate::history::ItemPosition;
use crate::item::ItemId;
use crate::text::TextSelection;
use crate::text::TextWithEntities;
use crate::timeline::Timeline;

pub type SelectedItems = BTreeMap<ItemId, TextSelection>;

const COPY_HEADER_FORMAT: &str = "%d.%m.%y %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAction {
    Select,
    Deselect,
    Invert,
}

/// Counters reported to the host after every selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionState {
    pub count: usize,
    pub can_delete_count: usize,
    pub can_forward_count: usize,
    pub text_selected: bool,
}

/// One end of a drag across several items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragEndpoint {
    pub item: ItemId,
    /// Caret position inside the item's flattened text.
    pub symbol: u16,
}

/// Items touched by a drag, ordered top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragRange {
    pub top: DragEndpoint,
    pub bottom: DragEndpoint,
    /// `false` when the drag started on a selected item and removes items
    /// from the selection instead.
    pub selecting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    items: SelectedItems,
    max_items: usize,
}

impl Selection {
    pub fn new(max_items: usize) -> Self {
        Self {
            items: SelectedItems::new(),
            max_items,
        }
    }

    pub fn items(&self) -> &SelectedItems {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<TextSelection> {
        self.items.get(&id).copied()
    }

    pub fn is_selected(&self, id: ItemId) -> bool {
        is_full(&self.items, id)
    }

    /// Whole items are selected and clicks toggle them.
    pub fn in_items_mode(&self) -> bool {
        !self.items.is_empty() && self.items.values().all(|selection| selection.is_full())
    }

    pub fn has_text_selection(&self) -> bool {
        self.items.values().any(|selection| !selection.is_full())
    }

    /// The only entry when it is a text range inside one item.
    pub fn text_selection(&self) -> Option<(ItemId, TextSelection)> {
        match self.items.iter().next() {
            Some((id, selection)) if self.items.len() == 1 && !selection.is_full() => {
                Some((*id, *selection))
            }
            _ => None,
        }
    }

    /// Replaces everything with a text range inside one item.
    pub fn set_text_selection(&mut self, id: ItemId, selection: TextSelection) {
        self.items.clear();
        if !selection.is_empty() {
            self.items.insert(id, selection);
        }
    }

    /// Clears the selection. With `only_text`, a selection of whole items is
    /// kept. Returns whether anything was removed.
    pub fn clear(&mut self, only_text: bool) -> bool {
        if self.items.is_empty() || (only_text && self.in_items_mode()) {
            return false;
        }
        self.items.clear();
        true
    }

    pub fn remove(&mut self, id: ItemId) -> bool {
        self.items.remove(&id).is_some()
    }

    /// Ids of whole selected items, in id order.
    pub fn selected_items(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|(_, selection)| selection.is_full())
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn state(&self, timeline: &Timeline) -> SelectionState {
        let mut state = SelectionState {
            text_selected: self.text_selection().is_some(),
            ..SelectionState::default()
        };
        for (id, selection) in &self.items {
            if !selection.is_full() {
                continue;
            }
            state.count += 1;
            let Some(view) = timeline.view(*id) else {
                continue;
            };
            let flags = view.item().flags;
            if flags.can_delete {
                state.can_delete_count += 1;
            }
            if flags.can_forward && id.is_server() {
                state.can_forward_count += 1;
            }
        }
        state
    }

    pub fn can_copy(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn can_delete(&self, timeline: &Timeline) -> bool {
        let state = self.state(timeline);
        state.count > 0 && state.count == state.can_delete_count
    }

    pub fn can_forward(&self, timeline: &Timeline) -> bool {
        let state = self.state(timeline);
        state.count > 0 && state.count == state.can_forward_count
    }

    pub fn is_selected_as_group(&self, timeline: &Timeline, id: ItemId) -> bool {
        Rules::new(timeline, self.max_items).is_selected_as_group(&self.items, id)
    }

    pub fn change_selection(&mut self, timeline: &Timeline, id: ItemId, action: SelectAction) {
        Rules::new(timeline, self.max_items).change_selection(&mut self.items, id, action);
    }

    pub fn change_selection_as_group(
        &mut self,
        timeline: &Timeline,
        id: ItemId,
        action: SelectAction,
    ) {
        Rules::new(timeline, self.max_items).change_selection_as_group(&mut self.items, id, action);
    }

    /// Commits a finished drag.
    pub fn apply_drag(&mut self, timeline: &Timeline, range: &DragRange) {
        Rules::new(timeline, self.max_items).apply_drag_selection(&mut self.items, range);
    }

    /// The committed selection with `drag` merged in, as it should be shown.
    pub fn preview(&self, timeline: &Timeline, drag: Option<&DragRange>) -> SelectedItems {
        let mut items = self.items.clone();
        if let Some(range) = drag {
            Rules::new(timeline, self.max_items).apply_drag_selection(&mut items, range);
        }
        items
    }

    /// Text to copy: the selected range when a single item has one,
    /// otherwise every selected item with an author and time header, in
    /// display order, separated by blank lines.
    pub fn selected_text(&self, timeline: &Timeline, drag: Option<&DragRange>) -> TextWithEntities {
        let items = self.preview(timeline, drag);
        selected_text(timeline, &items)
    }
}

/// Selection shown by the view of `id` given the previewed selection.
/// An album leader reports one bit per fully selected member, or a full
/// selection when every member is selected.
pub fn render_selection(timeline: &Timeline, items: &SelectedItems, id: ItemId) -> TextSelection {
    let Some(view) = timeline.view(id) else {
        return TextSelection::default();
    };
    let own = items.get(&id).copied().unwrap_or_default();
    let album = view.album_items();
    if album.is_empty() {
        return own;
    }
    let mut result = TextSelection::default();
    let mut all_selected = true;
    for (index, member) in album.iter().enumerate() {
        if is_full(items, *member) {
            result = result.with_group_item(index);
        } else {
            all_selected = false;
        }
    }
    if all_selected {
        return TextSelection::FULL;
    }
    if !own.is_full() && !own.is_empty() {
        return own;
    }
    result
}

pub(crate) fn selected_text(timeline: &Timeline, items: &SelectedItems) -> TextWithEntities {
    if items.is_empty() {
        return TextWithEntities::default();
    }
    if items.len() == 1
        && let Some((id, selection)) = items.iter().next()
        && !selection.is_full()
    {
        return timeline
            .view(*id)
            .map(|view| view.selected_text(*selection))
            .unwrap_or_default();
    }
    let mut pieces: Vec<((HistoryKind, ItemPosition), TextWithEntities)> = Vec::new();
    let mut shown_groups: Vec<ItemId> = Vec::new();
    for (id, selection) in items {
        let members = timeline.group_members(*id);
        let (source, selection) = if !members.is_empty()
            && selection.is_full()
            && members.iter().all(|member| is_full(items, *member))
        {
            let leader = timeline.group_leader(*id);
            if shown_groups.contains(&leader) {
                continue;
            }
            shown_groups.push(leader);
            (leader, TextSelection::FULL)
        } else {
            (*id, *selection)
        };
        let (Some(view), Some(key)) = (timeline.view(source), timeline.order_key(source)) else {
            continue;
        };
        let body = view.selected_text(selection);
        if body.is_empty() && !selection.is_full() {
            continue;
        }
        let item = view.item();
        let mut piece = TextWithEntities::plain(format!(
            "{}, [{}]\n",
            item.author,
            item.date.format(COPY_HEADER_FORMAT)
        ));
        piece.append(body);
        pieces.push((key, piece));
    }
    pieces.sort_by_key(|(key, _)| *key);
    let mut result = TextWithEntities::default();
    for (index, (_, piece)) in pieces.into_iter().enumerate() {
        if index > 0 {
            result.append_str("\n\n");
        }
        result.append(piece);
    }
    result
}

fn is_full(items: &SelectedItems, id: ItemId) -> bool {
    items.get(&id).is_some_and(|selection| selection.is_full())
}

/// Group-aware selection edits over any selection map, so the same rules
/// apply to the committed selection and to a drag preview.
struct Rules<'a> {
    timeline: &'a Timeline,
    max_items: usize,
}

impl<'a> Rules<'a> {
    fn new(timeline: &'a Timeline, max_items: usize) -> Self {
        Self {
            timeline,
            max_items,
        }
    }

    fn is_selected_as_group(&self, items: &SelectedItems, id: ItemId) -> bool {
        let members = self.timeline.group_members(id);
        if members.is_empty() {
            return is_full(items, id);
        }
        members.iter().all(|member| is_full(items, *member))
    }

    /// Whether `id` may be selected as a whole item; counts it into `total`
    /// when it is not selected yet.
    fn good_for_selection(&self, items: &SelectedItems, id: ItemId, total: &mut usize) -> bool {
        let Some(view) = self.timeline.view(id) else {
            return false;
        };
        if view.item().is_service() || !id.is_server() {
            return false;
        }
        if !items.contains_key(&id) {
            *total += 1;
        }
        true
    }

    fn add_to_selection(items: &mut SelectedItems, id: ItemId) {
        if !items.contains_key(&id)
            && items.len() == 1
            && items.values().all(|selection| !selection.is_full())
        {
            items.clear();
        }
        items.insert(id, TextSelection::FULL);
    }

    fn change_selection(&self, items: &mut SelectedItems, id: ItemId, action: SelectAction) {
        let action = match action {
            SelectAction::Invert if is_full(items, id) => SelectAction::Deselect,
            SelectAction::Invert => SelectAction::Select,
            action => action,
        };
        let mut total = items.len();
        match action {
            SelectAction::Select => {
                if self.good_for_selection(items, id, &mut total) && total <= self.max_items {
                    Self::add_to_selection(items, id);
                }
            }
            _ => {
                items.remove(&id);
            }
        }
    }

    fn change_selection_as_group(
        &self,
        items: &mut SelectedItems,
        id: ItemId,
        action: SelectAction,
    ) {
        let members = self.timeline.group_members(id);
        if members.is_empty() {
            return self.change_selection(items, id, action);
        }
        let action = match action {
            SelectAction::Invert if self.is_selected_as_group(items, id) => SelectAction::Deselect,
            SelectAction::Invert => SelectAction::Select,
            action => action,
        };
        let mut total = items.len();
        let can_select = members
            .iter()
            .all(|member| self.good_for_selection(items, *member, &mut total))
            && total <= self.max_items;
        if action == SelectAction::Select && can_select {
            for member in members {
                Self::add_to_selection(items, *member);
            }
        } else {
            for member in members {
                items.remove(member);
            }
        }
    }

    /// Ids from `top` to `bottom` inclusive, in display order. Steps only
    /// over the positions between the two ends, crossing from the migrated
    /// history into the primary one.
    fn items_between(&self, top: ItemId, bottom: ItemId) -> Vec<ItemId> {
        let (Some(start), Some(end)) = (self.timeline.find(top), self.timeline.find(bottom))
        else {
            return Vec::new();
        };
        if start > end {
            return Vec::new();
        }
        let mut result = Vec::new();
        let (mut kind, mut position) = start;
        loop {
            let Some(history) = self.timeline.get(kind) else {
                break;
            };
            if let Some(view) = history.view_at(position) {
                result.push(view.id());
            }
            if (kind, position) == end {
                break;
            }
            match history.next_position(position) {
                Some(next) => position = next,
                None if kind == HistoryKind::Migrated => {
                    kind = HistoryKind::Primary;
                    position = ItemPosition { block: 0, item: 0 };
                }
                None => break,
            }
        }
        result
    }

    /// Adds every item of the range. Inner items are selected whole; the two
    /// boundary items keep the part of their text inside the range unless it
    /// covers all of it.
    fn add_selection_range(&self, items: &mut SelectedItems, range: &DragRange) {
        let ids = self.items_between(range.top.item, range.bottom.item);
        let last = ids.len().saturating_sub(1);
        for (index, id) in ids.into_iter().enumerate() {
            if items.len() >= self.max_items {
                tracing::debug!(max = self.max_items, "selection limit reached");
                break;
            }
            let Some(view) = self.timeline.view(id) else {
                continue;
            };
            let mut total = items.len();
            if !self.good_for_selection(items, id, &mut total) {
                items.remove(&id);
                continue;
            }
            let members = self.timeline.group_members(id);
            if !members.is_empty() {
                let mut total = items.len();
                let fits = members
                    .iter()
                    .all(|member| self.good_for_selection(items, *member, &mut total))
                    && total <= self.max_items;
                if fits {
                    for member in members {
                        items.insert(*member, TextSelection::FULL);
                    }
                } else {
                    tracing::debug!(max = self.max_items, "album does not fit the selection");
                }
                continue;
            }
            let length = view.full_selection_length();
            let selection = if index == 0 && index == last {
                TextSelection::new(
                    range.top.symbol.min(range.bottom.symbol),
                    range.top.symbol.max(range.bottom.symbol),
                )
            } else if index == 0 {
                TextSelection::new(range.top.symbol.min(length), length)
            } else if index == last {
                TextSelection::new(0, range.bottom.symbol.min(length))
            } else {
                TextSelection::FULL
            };
            let covers_all = length == 0 || (selection.from == 0 && selection.to >= length);
            if selection.is_full() || covers_all {
                items.insert(id, TextSelection::FULL);
            } else if !selection.is_empty() {
                items.insert(id, selection);
            }
        }
    }

    /// Merges `range` into `items`: adds it when selecting, removes every
    /// item inside it otherwise. A previous text selection is dropped.
    fn apply_drag_selection(&self, items: &mut SelectedItems, range: &DragRange) {
        if self.timeline.item_top(range.top.item).is_none()
            || self.timeline.item_top(range.bottom.item).is_none()
        {
            return;
        }
        if items.values().any(|selection| !selection.is_full()) {
            items.clear();
        }
        if range.selecting {
            self.add_selection_range(items, range);
            return;
        }
        let inside = self.items_between(range.top.item, range.bottom.item);
        let to_remove: Vec<ItemId> = items
            .keys()
            .copied()
            .filter(|id| !self.timeline.contains(*id) || inside.contains(id))
            .collect();
        for id in to_remove {
            self.change_selection_as_group(items, id, SelectAction::Deselect);
        }
    }
}
