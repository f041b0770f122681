//! Geometry index: vertical coordinate to view position.
//!
//! Lookups remember where the previous one landed. Scrolling moves the
//! queried coordinate by small deltas, so the next answer is usually within a
//! few views of the last one and is found by stepping. Larger jumps and
//! lookups after a relayout fall back to a binary search over blocks and then
//! over the views of the found block.

use crate::history::History;
use crate::history::ItemPosition;
use crate::view::View;

const MAX_CURSOR_STEPS: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LocateCursor {
    position: Option<ItemPosition>,
    epoch: u64,
}

impl History {
    /// Position of the last view whose top is at or above `y`, relative to
    /// this history's top. Coordinates above the first view resolve to the
    /// first view and coordinates below the last view to the last one.
    pub fn locate(&self, y: i32) -> Option<ItemPosition> {
        if self.blocks.is_empty() {
            return None;
        }
        let cached = self.cursor.get();
        let found = cached
            .position
            .filter(|_| cached.epoch == self.epoch)
            .and_then(|start| self.walk_from(start, y))
            .unwrap_or_else(|| self.search(y));
        self.cursor.set(LocateCursor {
            position: Some(found),
            epoch: self.epoch,
        });
        Some(found)
    }

    pub fn locate_view(&self, y: i32) -> Option<&View> {
        self.locate(y).and_then(|position| self.view_at(position))
    }

    fn walk_from(&self, start: ItemPosition, y: i32) -> Option<ItemPosition> {
        let mut current = start;
        let top = self.view_top(current)?;
        if top <= y {
            for _ in 0..MAX_CURSOR_STEPS {
                match self.next_position(current) {
                    Some(next) if self.view_top(next)? <= y => current = next,
                    _ => return Some(current),
                }
            }
            match self.next_position(current) {
                Some(next) if self.view_top(next)? <= y => None,
                _ => Some(current),
            }
        } else {
            for _ in 0..MAX_CURSOR_STEPS {
                match self.previous_position(current) {
                    Some(previous) => {
                        current = previous;
                        if self.view_top(current)? <= y {
                            return Some(current);
                        }
                    }
                    None => return Some(current),
                }
            }
            None
        }
    }

    fn search(&self, y: i32) -> ItemPosition {
        let block = self
            .blocks
            .partition_point(|block| block.y <= y)
            .saturating_sub(1);
        let item = self.blocks.get(block).map_or(0, |found| {
            found
                .views
                .partition_point(|view| found.y + view.y <= y)
                .saturating_sub(1)
        });
        ItemPosition { block, item }
    }

    pub(crate) fn next_position(&self, position: ItemPosition) -> Option<ItemPosition> {
        let block = self.blocks.get(position.block)?;
        if position.item + 1 < block.views.len() {
            return Some(ItemPosition {
                block: position.block,
                item: position.item + 1,
            });
        }
        (position.block + 1 < self.blocks.len()).then_some(ItemPosition {
            block: position.block + 1,
            item: 0,
        })
    }

    pub(crate) fn previous_position(&self, position: ItemPosition) -> Option<ItemPosition> {
        if position.item > 0 {
            return Some(ItemPosition {
                block: position.block,
                item: position.item - 1,
            });
        }
        let block = position.block.checked_sub(1)?;
        let views = self.blocks.get(block)?.views.len();
        Some(ItemPosition {
            block,
            item: views.checked_sub(1)?,
        })
    }
}
