//! Item storage for one conversation.
//!
//! Items live in blocks of bounded size so that geometry lookups and
//! structural edits only touch a small slice of the list. Each item is owned
//! by exactly one [`View`]; everything else refers to it by [`ItemId`].

use std::cell::Cell;
use std::collections::HashMap;

use chrono::TimeDelta;
use itertools::Itertools;

use crate::config::HistoryViewConfig;
use crate::cursor::LocateCursor;
use crate::item::GroupId;
use crate::item::Item;
use crate::item::ItemId;
use crate::item::MediaContent;
use crate::media::Media;
use crate::text::TextEngine;
use crate::view::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HistoryKind {
    /// The older history shown above the primary one.
    Migrated,
    Primary,
}

/// Position of a view: block index and index inside the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemPosition {
    pub block: usize,
    pub item: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub(crate) y: i32,
    pub(crate) height: i32,
    pub(crate) views: Vec<View>,
}

impl Block {
    fn new(views: Vec<View>) -> Self {
        Self {
            y: 0,
            height: 0,
            views,
        }
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }
}

/// Item remembered at the top of the viewport together with how far the
/// viewport top is below that item's top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollTopState {
    pub item: ItemId,
    pub offset: i32,
}

#[derive(Debug)]
pub struct History {
    kind: HistoryKind,
    pub(crate) blocks: Vec<Block>,
    height: i32,
    width: i32,
    block_size: usize,
    show_userpics: bool,
    index: HashMap<ItemId, ItemPosition>,
    groups: HashMap<GroupId, Vec<ItemId>>,
    pub(crate) cursor: Cell<LocateCursor>,
    /// Bumped on every structural change or relayout; a cursor from an older
    /// epoch is ignored.
    pub(crate) epoch: u64,
    scroll_top: Option<ScrollTopState>,
    loaded_at_top: bool,
    loaded_at_bottom: bool,
}

impl History {
    pub fn new(kind: HistoryKind, block_size: usize) -> Self {
        Self {
            kind,
            blocks: Vec::new(),
            height: 0,
            width: 0,
            block_size: block_size.max(1),
            show_userpics: false,
            index: HashMap::new(),
            groups: HashMap::new(),
            cursor: Cell::new(LocateCursor::default()),
            epoch: 0,
            scroll_top: None,
            loaded_at_top: false,
            loaded_at_bottom: false,
        }
    }

    /// Shows sender userpics next to incoming messages, as group chats do.
    pub fn with_userpics(mut self, show: bool) -> Self {
        self.show_userpics = show;
        self
    }

    pub fn kind(&self) -> HistoryKind {
        self.kind
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn loaded_at_top(&self) -> bool {
        self.loaded_at_top
    }

    pub fn loaded_at_bottom(&self) -> bool {
        self.loaded_at_bottom
    }

    pub fn set_loaded_at_top(&mut self, loaded: bool) {
        self.loaded_at_top = loaded;
    }

    pub fn set_loaded_at_bottom(&mut self, loaded: bool) {
        self.loaded_at_bottom = loaded;
    }

    /// Views in display order.
    pub fn views(&self) -> impl DoubleEndedIterator<Item = &View> {
        self.blocks.iter().flat_map(|block| block.views.iter())
    }

    pub fn position(&self, id: ItemId) -> Option<ItemPosition> {
        self.index.get(&id).copied()
    }

    pub fn view(&self, id: ItemId) -> Option<&View> {
        self.position(id).and_then(|position| self.view_at(position))
    }

    pub(crate) fn view_mut(&mut self, id: ItemId) -> Option<&mut View> {
        let position = self.position(id)?;
        self.blocks
            .get_mut(position.block)?
            .views
            .get_mut(position.item)
    }

    pub fn view_at(&self, position: ItemPosition) -> Option<&View> {
        self.blocks.get(position.block)?.views.get(position.item)
    }

    /// Top of the view relative to the history top.
    pub fn view_top(&self, position: ItemPosition) -> Option<i32> {
        let block = self.blocks.get(position.block)?;
        block.views.get(position.item).map(|view| block.y + view.y)
    }

    pub fn item_top(&self, id: ItemId) -> Option<i32> {
        self.position(id).and_then(|position| self.view_top(position))
    }

    /// First view that occupies vertical space.
    pub fn first_shown(&self) -> Option<&View> {
        self.views().find(|view| !view.hidden_by_group)
    }

    pub fn last_shown(&self) -> Option<&View> {
        self.views().rev().find(|view| !view.hidden_by_group)
    }

    /// Members of the album containing `id`, in order, or empty when `id`
    /// is not part of a shown album.
    pub fn group_members(&self, id: ItemId) -> &[ItemId] {
        self.view(id)
            .and_then(|view| view.item().group)
            .and_then(|group| self.groups.get(&group))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The view displaying the album containing `id`, or `id` itself.
    pub fn group_leader(&self, id: ItemId) -> ItemId {
        self.group_members(id).last().copied().unwrap_or(id)
    }

    pub fn push_back(&mut self, item: Item) {
        let id = item.id;
        let view = View::new(item, self.kind);
        match self.blocks.last_mut() {
            Some(block) if block.views.len() < self.block_size => block.views.push(view),
            _ => self.blocks.push(Block::new(vec![view])),
        }
        // Appending never shifts existing positions.
        let block = self.blocks.len().saturating_sub(1);
        let item = self
            .blocks
            .last()
            .map_or(0, |last| last.views.len().saturating_sub(1));
        self.index.insert(id, ItemPosition { block, item });
        self.epoch += 1;
    }

    /// Prepends an older slice of items, oldest first.
    pub fn push_front_slice(&mut self, items: Vec<Item>) {
        if items.is_empty() {
            return;
        }
        let kind = self.kind;
        let blocks: Vec<Block> = items
            .into_iter()
            .chunks(self.block_size)
            .into_iter()
            .map(|chunk| Block::new(chunk.map(|item| View::new(item, kind)).collect()))
            .collect();
        tracing::debug!(
            history = ?self.kind,
            blocks = blocks.len(),
            "prepending history slice"
        );
        self.blocks.splice(0..0, blocks);
        self.structure_changed();
    }

    /// Destroys the view of `id` and returns its item. Layout is stale until
    /// the next [`History::resize`].
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        let position = self.position(id)?;
        let album = self.detach_album(id);
        let block = self.blocks.get_mut(position.block)?;
        if position.item >= block.views.len() {
            return None;
        }
        let view = block.views.remove(position.item);
        if block.views.is_empty() {
            self.blocks.remove(position.block);
        }
        if self.scroll_top.is_some_and(|state| state.item == id) {
            self.scroll_top = None;
        }
        self.structure_changed();
        if let Some((leader, album)) = album
            && let Some(view) = self.view_mut(leader)
        {
            *view.album_mut() = Some(album);
        }
        Some(view.into_item())
    }

    /// When `id` leads an album that keeps at least two parts without it,
    /// takes the album off its view minus the last part. Returns the album
    /// together with the member that leads it next.
    fn detach_album(&mut self, id: ItemId) -> Option<(ItemId, Media)> {
        let members = self.group_members(id);
        if members.len() < 3 || members.last() != Some(&id) {
            return None;
        }
        let leader = members[members.len() - 2];
        let mut album = self.view_mut(id)?.album_mut().take()?;
        if album.take_last_from_group()?.parent() != id {
            return None;
        }
        album.reparent(leader);
        Some((leader, album))
    }

    /// Replaces the item record of an existing view, keeping its position.
    pub fn update_item(&mut self, item: Item) -> bool {
        let id = item.id;
        let Some(view) = self.view_mut(id) else {
            return false;
        };
        view.set_item(item);
        self.epoch += 1;
        true
    }

    pub fn update_media(&mut self, id: ItemId, media: MediaContent) -> bool {
        let Some(mut item) = self.view(id).map(|view| view.item().clone()) else {
            return false;
        };
        item.media = Some(media);
        self.update_item(item)
    }

    fn structure_changed(&mut self) {
        self.index.clear();
        for (block_index, block) in self.blocks.iter().enumerate() {
            for (item_index, view) in block.views.iter().enumerate() {
                self.index.insert(
                    view.id(),
                    ItemPosition {
                        block: block_index,
                        item: item_index,
                    },
                );
            }
        }
        self.epoch += 1;
    }

    /// Recomputes groups, date separators and attachment flags, lays every
    /// view out into `width` and returns the history height.
    pub fn resize(
        &mut self,
        width: i32,
        config: &HistoryViewConfig,
        engine: &dyn TextEngine,
    ) -> i32 {
        self.width = width;
        self.regroup(config.grouping.max_album_items);
        self.recount_flags(config.grouping.attach_to_previous_secs);
        let mut y = 0;
        for block in &mut self.blocks {
            block.y = y;
            let mut block_height = 0;
            for view in &mut block.views {
                view.y = block_height;
                block_height += view.resize_get_height(width, &config.style, engine);
            }
            block.height = block_height;
            y += block_height;
        }
        self.height = y;
        self.epoch += 1;
        self.cursor.set(LocateCursor::default());
        tracing::trace!(history = ?self.kind, height = y, "history resized");
        y
    }

    fn regroup(&mut self, max_album_items: usize) {
        let runs: Vec<(GroupId, Vec<ItemId>)> = self
            .views()
            .filter_map(|view| view.item().group.map(|group| (group, view.id())))
            .chunk_by(|(group, _)| *group)
            .into_iter()
            .map(|(group, members)| (group, members.map(|(_, id)| id).collect()))
            .collect();

        for view in self.blocks.iter_mut().flat_map(|block| block.views.iter_mut()) {
            view.hidden_by_group = false;
        }
        let mut groups = HashMap::new();
        let mut leaders = Vec::new();
        for (group, members) in runs {
            let Some(&leader) = members.last() else {
                continue;
            };
            let medias: Vec<Media> = members
                .iter()
                .filter_map(|id| self.view(*id).and_then(View::media).cloned())
                .collect();
            let valid = medias.len() == members.len()
                && (2..=max_album_items).contains(&members.len())
                && medias.iter().all(Media::can_be_grouped);
            if !valid {
                continue;
            }
            let Some(view) = self.view_mut(leader) else {
                continue;
            };
            let album = view
                .album_mut()
                .get_or_insert_with(|| Media::grouped(leader, max_album_items));
            if !album.apply_group(medias) {
                continue;
            }
            leaders.push(leader);
            for id in &members[..members.len() - 1] {
                if let Some(member) = self.view_mut(*id) {
                    member.hidden_by_group = true;
                    *member.album_mut() = None;
                }
            }
            groups.insert(group, members);
        }
        for view in self.blocks.iter_mut().flat_map(|block| block.views.iter_mut()) {
            if view.album_mut().is_some() && !leaders.contains(&view.id()) {
                tracing::debug!(item = view.id().0, "album dissolved");
                *view.album_mut() = None;
            }
        }
        self.groups = groups;
    }

    fn recount_flags(&mut self, attach_to_previous_secs: i64) {
        let window = TimeDelta::seconds(attach_to_previous_secs);
        let show_userpics = self.show_userpics;
        let mut previous: Option<(usize, usize)> = None;
        for block_index in 0..self.blocks.len() {
            for item_index in 0..self.blocks[block_index].views.len() {
                if self.blocks[block_index].views[item_index].hidden_by_group {
                    let view = &mut self.blocks[block_index].views[item_index];
                    view.display_date = false;
                    view.attach_to_previous = false;
                    view.attach_to_next = false;
                    continue;
                }
                let prev_item = previous
                    .map(|(block, item)| self.blocks[block].views[item].item().clone());
                let view = &mut self.blocks[block_index].views[item_index];
                let item = view.item();
                let display_date = prev_item
                    .as_ref()
                    .is_none_or(|prev| prev.day() != item.day());
                let attach = !display_date
                    && prev_item.as_ref().is_some_and(|prev| {
                        prev.sender == item.sender
                            && !prev.is_service()
                            && !item.is_service()
                            && (item.date - prev.date).abs() < window
                    });
                view.has_from_photo = show_userpics && !item.is_service() && !item.flags.outgoing;
                view.display_date = display_date;
                view.attach_to_previous = attach;
                view.attach_to_next = false;
                if let Some((block, index)) = previous {
                    self.blocks[block].views[index].attach_to_next = attach;
                }
                previous = Some((block_index, item_index));
            }
        }
    }

    pub fn scroll_top_state(&self) -> Option<ScrollTopState> {
        self.scroll_top
    }

    /// Remembers the item at `top`, relative to this history's top.
    pub fn count_scroll_state(&mut self, top: i32) {
        self.scroll_top = self.locate(top).and_then(|position| {
            let view = self.view_at(position)?;
            let view_top = self.view_top(position)?;
            Some(ScrollTopState {
                item: view.id(),
                offset: top - view_top,
            })
        });
    }

    pub fn forget_scroll_state(&mut self) {
        self.scroll_top = None;
    }
}
