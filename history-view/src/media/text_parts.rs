use crate::geometry::Point;
use crate::geometry::Rect;
use crate::hit_test::StateRequest;
use crate::host::Surface;
use crate::text::TextEngine;
use crate::text::TextHit;
use crate::text::TextSelectType;
use crate::text::TextSelection;
use crate::text::TextWithEntities;

/// Independently laid out text pieces stacked vertically that present one
/// linear offset space: the second piece starts where the first one ends.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct TextParts {
    parts: Vec<TextPart>,
    width: i32,
}

#[derive(Debug, Clone, PartialEq)]
struct TextPart {
    text: TextWithEntities,
    top: i32,
    height: i32,
}

impl TextParts {
    pub(crate) fn new(texts: impl IntoIterator<Item = TextWithEntities>) -> Self {
        Self {
            parts: texts
                .into_iter()
                .map(|text| TextPart {
                    text,
                    top: 0,
                    height: 0,
                })
                .collect(),
            width: 0,
        }
    }

    pub(crate) fn len(&self) -> u16 {
        self.parts
            .iter()
            .fold(0u16, |sum, part| sum.saturating_add(part.text.len_symbols()))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.parts.iter().all(|part| part.text.is_empty())
    }

    pub(crate) fn layout(&mut self, width: i32, engine: &dyn TextEngine) -> i32 {
        self.width = width;
        let mut top = 0;
        for part in &mut self.parts {
            part.top = top;
            part.height = if part.text.is_empty() {
                0
            } else {
                engine.count_height(&part.text, width)
            };
            top += part.height;
        }
        top
    }

    pub(crate) fn height(&self) -> i32 {
        self.parts.last().map_or(0, |part| part.top + part.height)
    }

    pub(crate) fn hit_test(
        &self,
        point: Point,
        request: StateRequest,
        engine: &dyn TextEngine,
    ) -> TextHit {
        if point.y < 0 {
            return TextHit::default();
        }
        let mut offset = 0u16;
        for part in &self.parts {
            if part.height > 0 && point.y < part.top + part.height {
                let mut hit = engine.hit_test(
                    &part.text,
                    self.width,
                    Point::new(point.x, point.y - part.top),
                    request,
                );
                hit.symbol = hit.symbol.saturating_add(offset);
                return hit;
            }
            offset = offset.saturating_add(part.text.len_symbols());
        }
        TextHit {
            symbol: offset,
            ..Default::default()
        }
    }

    pub(crate) fn selected_text(&self, selection: TextSelection) -> TextWithEntities {
        let mut result = TextWithEntities::default();
        let mut offset = 0u16;
        for part in &self.parts {
            let local = if selection.is_full() {
                TextSelection::FULL
            } else {
                selection.unshifted(offset)
            };
            offset = offset.saturating_add(part.text.len_symbols());
            let piece = part.text.slice(local);
            if piece.is_empty() {
                continue;
            }
            if !result.is_empty() {
                result.append_str("\n");
            }
            result.append(piece);
        }
        result
    }

    /// Expands each end of the range inside the part it falls into.
    pub(crate) fn adjust_selection(
        &self,
        selection: TextSelection,
        kind: TextSelectType,
    ) -> TextSelection {
        if selection.is_full() || selection.is_sub_group() {
            return selection;
        }
        let mut from = selection.from;
        let mut to = selection.to;
        let mut offset = 0u16;
        for part in &self.parts {
            let len = part.text.len_symbols();
            let end = offset.saturating_add(len);
            let local = selection.unshifted(offset);
            if selection.from >= offset && selection.from < end {
                from = part.text.adjust_selection(local, kind).from.saturating_add(offset);
            }
            let last = if selection.to > selection.from {
                selection.to - 1
            } else {
                selection.to
            };
            if last >= offset && last < end {
                to = part
                    .text
                    .adjust_selection(local, kind)
                    .to
                    .min(len)
                    .saturating_add(offset);
            }
            offset = end;
        }
        TextSelection::new(from, to.max(from))
    }

    pub(crate) fn draw(&self, surface: &mut dyn Surface, origin: Point, selection: TextSelection) {
        let mut offset = 0u16;
        for part in &self.parts {
            let local = if selection.is_full() {
                TextSelection::FULL
            } else {
                selection.unshifted(offset)
            };
            offset = offset.saturating_add(part.text.len_symbols());
            if part.height == 0 {
                continue;
            }
            let rect = Rect::new(origin.x, origin.y + part.top, self.width, part.height);
            surface.draw_text(&part.text, rect, local);
        }
    }
}
