//! The primary history and the optional migrated history stacked into one
//! scrollable column.
//!
//! Content coordinates start at the top of the column. The migrated history
//! sits at the top after `padding_top`; the primary history follows it,
//! overlapping it by `skip_height` when the two boundary items belong to the
//! same day.

use crate::config::HistoryViewConfig;
use crate::config::Style;
use crate::geometry::Size;
use crate::history::History;
use crate::history::HistoryKind;
use crate::history::ItemPosition;
use crate::item::ItemId;
use crate::text::TextEngine;
use crate::view::View;

/// A view found by a content coordinate lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub history: HistoryKind,
    pub position: ItemPosition,
    pub item: ItemId,
    /// Top of the view in content coordinates.
    pub top: i32,
}

#[derive(Debug)]
pub struct Timeline {
    pub(crate) history: History,
    pub(crate) migrated: Option<History>,
    padding_top: i32,
    skip_height: i32,
    pub(crate) visible_top: i32,
    pub(crate) visible_bottom: i32,
    width: i32,
}

impl Timeline {
    pub fn new(history: History, migrated: Option<History>) -> Self {
        Self {
            history,
            migrated,
            padding_top: 0,
            skip_height: 0,
            visible_top: 0,
            visible_bottom: 0,
            width: 0,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn migrated(&self) -> Option<&History> {
        self.migrated.as_ref()
    }

    pub fn get(&self, kind: HistoryKind) -> Option<&History> {
        match kind {
            HistoryKind::Primary => Some(&self.history),
            HistoryKind::Migrated => self.migrated.as_ref(),
        }
    }

    pub(crate) fn get_mut(&mut self, kind: HistoryKind) -> Option<&mut History> {
        match kind {
            HistoryKind::Primary => Some(&mut self.history),
            HistoryKind::Migrated => self.migrated.as_mut(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn padding_top(&self) -> i32 {
        self.padding_top
    }

    pub fn skip_height(&self) -> i32 {
        self.skip_height
    }

    pub fn visible_range(&self) -> (i32, i32) {
        (self.visible_top, self.visible_bottom)
    }

    pub(crate) fn set_visible_range(&mut self, top: i32, bottom: i32) {
        self.visible_top = top;
        self.visible_bottom = bottom.max(top);
    }

    pub fn migrated_top(&self) -> Option<i32> {
        self.migrated
            .as_ref()
            .filter(|migrated| !migrated.is_empty())
            .map(|_| self.padding_top)
    }

    pub fn history_top(&self) -> Option<i32> {
        if self.history.is_empty() {
            return None;
        }
        Some(match (self.migrated_top(), &self.migrated) {
            (Some(top), Some(migrated)) => top + migrated.height() - self.skip_height,
            _ => self.padding_top,
        })
    }

    /// First content coordinate where primary history content is visible.
    pub fn history_draw_top(&self) -> Option<i32> {
        self.history_top().map(|top| top + self.skip_height)
    }

    pub fn top_of(&self, kind: HistoryKind) -> Option<i32> {
        match kind {
            HistoryKind::Primary => self.history_top(),
            HistoryKind::Migrated => self.migrated_top(),
        }
    }

    /// Height of both histories without paddings.
    pub fn history_height(&self) -> i32 {
        let migrated = self
            .migrated
            .as_ref()
            .filter(|migrated| !migrated.is_empty())
            .map_or(0, History::height);
        let primary = if self.history.is_empty() {
            0
        } else {
            self.history.height() - self.skip_height
        };
        migrated + primary
    }

    pub fn find(&self, id: ItemId) -> Option<(HistoryKind, ItemPosition)> {
        if let Some(position) = self.history.position(id) {
            return Some((HistoryKind::Primary, position));
        }
        self.migrated
            .as_ref()
            .and_then(|migrated| migrated.position(id))
            .map(|position| (HistoryKind::Migrated, position))
    }

    pub fn view(&self, id: ItemId) -> Option<&View> {
        self.history
            .view(id)
            .or_else(|| self.migrated.as_ref().and_then(|migrated| migrated.view(id)))
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.find(id).is_some()
    }

    /// Top of the item in content coordinates, `None` when it is not shown.
    pub fn item_top(&self, id: ItemId) -> Option<i32> {
        let (kind, position) = self.find(id)?;
        let history = self.get(kind)?;
        Some(self.top_of(kind)? + history.view_top(position)?)
    }

    pub fn group_members(&self, id: ItemId) -> &[ItemId] {
        match self.find(id) {
            Some((kind, _)) => self
                .get(kind)
                .map(|history| history.group_members(id))
                .unwrap_or_default(),
            None => &[],
        }
    }

    pub fn group_leader(&self, id: ItemId) -> ItemId {
        self.find(id)
            .and_then(|(kind, _)| self.get(kind))
            .map_or(id, |history| history.group_leader(id))
    }

    /// Last view whose top is at or above `y`, clamped to the ends of the
    /// column. `None` when both histories are empty.
    pub fn locate(&self, y: i32) -> Option<Located> {
        let kind = match (self.history_draw_top(), self.migrated_top()) {
            (Some(draw_top), Some(_)) if y < draw_top => HistoryKind::Migrated,
            (Some(_), _) => HistoryKind::Primary,
            (None, Some(_)) => HistoryKind::Migrated,
            (None, None) => return None,
        };
        let history = self.get(kind)?;
        let top = self.top_of(kind)?;
        let position = history.locate(y - top)?;
        let view = history.view_at(position)?;
        Some(Located {
            history: kind,
            position,
            item: view.id(),
            top: top + history.view_top(position)?,
        })
    }

    /// The view whose vertical extent contains `y`, if any.
    pub fn view_at_y(&self, y: i32) -> Option<(Located, &View)> {
        let located = self.locate(y)?;
        let view = self.get(located.history)?.view_at(located.position)?;
        (located.top <= y && y < located.top + view.height()).then_some((located, view))
    }

    /// The closest shown item after (`down`) or before `id` in display
    /// order, crossing between the two histories.
    pub(crate) fn neighbour(&self, id: ItemId, down: bool) -> Option<ItemId> {
        let (kind, mut position) = self.find(id)?;
        loop {
            let history = self.get(kind)?;
            let next = if down {
                history.next_position(position)
            } else {
                history.previous_position(position)
            };
            match next {
                Some(next) => {
                    position = next;
                    let view = history.view_at(position)?;
                    if view.height() > 0 {
                        return Some(view.id());
                    }
                }
                None => {
                    let other = match (kind, down) {
                        (HistoryKind::Migrated, true) => HistoryKind::Primary,
                        (HistoryKind::Primary, false) => HistoryKind::Migrated,
                        _ => return None,
                    };
                    let other_history = self.get(other)?;
                    let view = if down {
                        other_history.first_shown()
                    } else {
                        other_history.last_shown()
                    }?;
                    return Some(view.id());
                }
            }
        }
    }

    /// Display order key: migrated items first, then by position.
    pub fn order_key(&self, id: ItemId) -> Option<(HistoryKind, ItemPosition)> {
        self.find(id)
    }

    /// Lays both histories out into `width` and recomputes the skip height
    /// and top padding. Returns the full content size.
    pub fn recount(
        &mut self,
        width: i32,
        visible_height: i32,
        config: &HistoryViewConfig,
        engine: &dyn TextEngine,
    ) -> Size {
        self.width = width;
        if let Some(migrated) = self.migrated.as_mut() {
            migrated.resize(width, config, engine);
        }
        self.history.resize(width, config, engine);
        self.skip_height = self.count_skip_height();
        self.update_size(visible_height, &config.style)
    }

    fn count_skip_height(&self) -> i32 {
        let Some(migrated) = self.migrated.as_ref() else {
            return 0;
        };
        if !migrated.loaded_at_bottom() || !self.history.loaded_at_top() {
            return 0;
        }
        let (Some(last), Some(first)) = (migrated.last_shown(), self.history.first_shown()) else {
            return 0;
        };
        if last.item().day() != first.item().day() {
            return 0;
        }
        if last.item().flags.group_migrate && first.item().flags.group_migrate {
            first.height()
        } else {
            first.date_height()
        }
    }

    /// Sticks short content to the bottom of the viewport.
    pub fn update_size(&mut self, visible_height: i32, style: &Style) -> Size {
        let content = self.history_height();
        self.padding_top = (visible_height - content - style.history_padding_bottom).max(0);
        Size::new(
            self.width,
            self.padding_top + content + style.history_padding_bottom,
        )
    }
}
