use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Instant;

use itertools::Itertools;

use crate::config::Style;
use crate::geometry::Point;
use crate::geometry::Rect;
use crate::geometry::RectParts;
use crate::geometry::Size;
use crate::hit_test::Link;
use crate::hit_test::StateRequest;
use crate::hit_test::TextState;
use crate::host::FrameHandle;
use crate::host::Surface;
use crate::item::ItemId;
use crate::media::Media;
use crate::text::TextSelection;
use crate::text::TextWithEntities;

/// Album of photos and videos laid out in balanced rows.
///
/// Each part keeps the last frame it was rasterized into together with the
/// fingerprint of everything that frame depends on, so an unchanged part is
/// blitted instead of being painted again.
#[derive(Debug, Clone)]
pub struct Grouped {
    parts: Vec<GroupPart>,
    max_items: usize,
    size: Size,
}

#[derive(Debug, Clone)]
pub struct GroupPart {
    item: ItemId,
    content: Media,
    geometry: Rect,
    sides: RectParts,
    cache: RefCell<Option<CachedFrame>>,
}

#[derive(Debug, Clone, Copy)]
struct CachedFrame {
    key: u64,
    frame: FrameHandle,
}

impl PartialEq for Grouped {
    fn eq(&self, other: &Self) -> bool {
        self.parts.len() == other.parts.len()
            && self
                .parts
                .iter()
                .zip(&other.parts)
                .all(|(a, b)| a.item == b.item && a.content == b.content)
    }
}

impl GroupPart {
    fn new(content: Media) -> Self {
        Self {
            item: content.parent(),
            content,
            geometry: Rect::default(),
            sides: RectParts::NONE,
            cache: RefCell::new(None),
        }
    }

    pub fn item(&self) -> ItemId {
        self.item
    }

    pub fn content(&self) -> &Media {
        &self.content
    }

    /// Position inside the album.
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn sides(&self) -> RectParts {
        self.sides
    }
}

impl Grouped {
    pub(crate) fn new(max_items: usize) -> Self {
        Self {
            parts: Vec::new(),
            max_items,
            size: Size::default(),
        }
    }

    pub fn parts(&self) -> &[GroupPart] {
        &self.parts
    }

    pub fn items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.parts.iter().map(|part| part.item)
    }

    pub fn part_index(&self, item: ItemId) -> Option<usize> {
        self.parts.iter().position(|part| part.item == item)
    }

    pub(crate) fn contains_link(&self, link: &Link) -> bool {
        link.item()
            .is_some_and(|item| self.part_index(item).is_some())
    }

    pub(crate) fn apply(&mut self, medias: Vec<Media>) -> bool {
        if medias.len() < 2 || medias.len() > self.max_items {
            tracing::warn!(
                parts = medias.len(),
                max = self.max_items,
                "album size out of range"
            );
            return false;
        }
        if let Some(media) = medias.iter().find(|media| !media.can_be_grouped()) {
            tracing::warn!(
                item = media.parent().0,
                media = %media.media_type(),
                "media cannot be part of an album"
            );
            return false;
        }
        let same_items = self.parts.len() == medias.len()
            && self
                .parts
                .iter()
                .zip(&medias)
                .all(|(part, media)| part.item == media.parent());
        if same_items {
            for (part, media) in self.parts.iter_mut().zip(medias) {
                part.content = media;
            }
            return true;
        }
        let mut caches: HashMap<ItemId, RefCell<Option<CachedFrame>>> = self
            .parts
            .drain(..)
            .map(|part| (part.item, part.cache))
            .collect();
        self.parts = medias
            .into_iter()
            .map(|media| {
                let mut part = GroupPart::new(media);
                if let Some(cache) = caches.remove(&part.item) {
                    part.cache = cache;
                }
                part
            })
            .collect();
        true
    }

    pub(crate) fn take_last(&mut self) -> Option<Media> {
        self.parts.pop().map(|part| part.content)
    }

    /// Lays the parts out into rows no wider than `width` and returns the
    /// album size.
    pub(crate) fn resize(&mut self, width: i32, style: &Style) -> Size {
        let count = self.parts.len();
        if count == 0 {
            self.size = Size::default();
            return self.size;
        }
        let row_max = style.album_row_max_items.max(1);
        let rows = count.div_ceil(row_max);
        let base = count / rows;
        let extra = count % rows;
        let spacing = style.album_spacing;
        let mut top = 0;
        let mut start = 0;
        for row in 0..rows {
            let len = base + usize::from(row < extra);
            let end = start + len;
            let gaps = i32::try_from(len - 1).unwrap_or(0) * spacing;
            let available = (width - gaps).max(i32::try_from(len).unwrap_or(1));
            let aspects: Vec<f64> = self.parts[start..end]
                .iter()
                .map(|part| {
                    let natural = part.content.size_for_grouping();
                    f64::from(natural.width) / f64::from(natural.height)
                })
                .collect();
            let total_aspect: f64 = aspects.iter().sum();
            let min_height = (style.media_min_size / 2).max(1);
            let row_height = ((f64::from(available) / total_aspect).round() as i32)
                .clamp(min_height, style.media_max_height.max(min_height));

            let mut sides = RectParts::NONE;
            if row == 0 {
                sides = sides.union(RectParts::TOP);
            }
            if row + 1 == rows {
                sides = sides.union(RectParts::BOTTOM);
            }
            let mut left = 0;
            let mut used = 0;
            for (index, aspect) in aspects.iter().enumerate() {
                let last = index + 1 == len;
                let part_width = if last {
                    available - used
                } else {
                    ((aspect * f64::from(available) / total_aspect).round() as i32).max(1)
                };
                let mut part_sides = sides;
                if index == 0 {
                    part_sides = part_sides.union(RectParts::LEFT);
                }
                if last {
                    part_sides = part_sides.union(RectParts::RIGHT);
                }
                let part = &mut self.parts[start + index];
                part.geometry = Rect::new(left, top, part_width.max(1), row_height);
                part.sides = part_sides;
                used += part_width;
                left += part_width + spacing;
            }
            top += row_height + spacing;
            start = end;
        }
        let height = top - spacing;
        self.size = Size::new(width, height);
        self.size
    }

    pub(crate) fn draw(
        &self,
        surface: &mut dyn Surface,
        target: Rect,
        clip: Rect,
        selection: TextSelection,
        now: Instant,
    ) {
        for (index, part) in self.parts.iter().enumerate() {
            let rect = part.geometry.translated(target.x, target.y);
            if !rect.intersects(clip) {
                continue;
            }
            let selected = selection.is_full() || selection.has_group_item(index);
            let key = part
                .content
                .grouped_fingerprint(rect.size(), selected, part.sides);
            let cached = *part.cache.borrow();
            let cached = cached
                .filter(|cached| cached.key == key)
                .map(|cached| cached.frame);
            let frame = match cached {
                Some(frame) => frame,
                None => {
                    let part_selection = if selected {
                        TextSelection::FULL
                    } else {
                        TextSelection::default()
                    };
                    let local = Rect::from_size(rect.size());
                    let frame = surface.rasterize(rect.size(), &mut |target| {
                        part.content
                            .draw_grouped(target, local, part_selection, part.sides, now);
                    });
                    *part.cache.borrow_mut() = Some(CachedFrame { key, frame });
                    frame
                }
            };
            surface.blit(frame, rect);
        }
    }

    /// `point` is relative to the album's top-left corner.
    pub(crate) fn text_state(&self, point: Point, request: StateRequest) -> TextState {
        self.parts
            .iter()
            .find(|part| part.geometry.contains(point))
            .map(|part| {
                let mut state = part
                    .content
                    .get_state_grouped(part.geometry, point, request);
                state.item = Some(part.item);
                state
            })
            .unwrap_or_default()
    }

    pub(crate) fn selected_text(&self, selection: TextSelection) -> TextWithEntities {
        if !selection.is_full() && !selection.is_sub_group() {
            return TextWithEntities::default();
        }
        let labels = self
            .parts
            .iter()
            .enumerate()
            .filter(|(index, _)| selection.is_full() || selection.has_group_item(*index))
            .map(|(_, part)| part.content.attachment_label())
            .join("\n");
        TextWithEntities::plain(labels)
    }
}
