//! On-screen representation of one item.
//!
//! A view lays out its item inside a given width and answers every
//! point-based question about it. All rectangles stored here are relative to
//! the view's own top-left corner; `y` is the view's offset inside its block.
//!
//! The item's flattened text is the body text followed by the symbols of a
//! text-carrying media laid out under it (web page, location, game,
//! invoice). Media drawn above the body contributes no symbols.

use std::time::Instant;

use crate::config::Style;
use crate::geometry::Point;
use crate::geometry::Rect;
use crate::geometry::Size;
use crate::hit_test::CursorState;
use crate::hit_test::Link;
use crate::hit_test::StateRequest;
use crate::hit_test::TextState;
use crate::history::HistoryKind;
use crate::host::Fill;
use crate::host::Surface;
use crate::item::Item;
use crate::item::ItemId;
use crate::item::SenderId;
use crate::media::Media;
use crate::text::TextEngine;
use crate::text::TextSelectType;
use crate::text::TextSelection;
use crate::text::TextWithEntities;

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    item: Item,
    history: HistoryKind,
    media: Option<Media>,
    /// Album shown by this view when it is the leader of a group.
    album: Option<Media>,
    pub(crate) y: i32,
    height: i32,
    width: i32,
    pub(crate) display_date: bool,
    pub(crate) attach_to_previous: bool,
    pub(crate) attach_to_next: bool,
    pub(crate) hidden_by_group: bool,
    pub(crate) has_from_photo: bool,
    date_height: i32,
    bubble: Rect,
    media_rect: Rect,
    text_rect: Rect,
    info_rect: Rect,
}

impl View {
    pub fn new(item: Item, history: HistoryKind) -> Self {
        let media = item
            .media
            .as_ref()
            .map(|content| Media::from_content(item.id, content));
        Self {
            item,
            history,
            media,
            album: None,
            y: 0,
            height: 0,
            width: 0,
            display_date: false,
            attach_to_previous: false,
            attach_to_next: false,
            hidden_by_group: false,
            has_from_photo: false,
            date_height: 0,
            bubble: Rect::default(),
            media_rect: Rect::default(),
            text_rect: Rect::default(),
            info_rect: Rect::default(),
        }
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn id(&self) -> ItemId {
        self.item.id
    }

    pub fn sender(&self) -> SenderId {
        self.item.sender
    }

    pub fn history(&self) -> HistoryKind {
        self.history
    }

    /// Offset of the view inside its block.
    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn display_date(&self) -> bool {
        self.display_date
    }

    pub fn is_attached_to_previous(&self) -> bool {
        self.attach_to_previous
    }

    pub fn is_attached_to_next(&self) -> bool {
        self.attach_to_next
    }

    /// Shares the day of the previous shown view, so no date is drawn above.
    pub fn is_in_one_day_with_previous(&self) -> bool {
        !self.item.is_empty() && !self.display_date
    }

    pub fn is_hidden_by_group(&self) -> bool {
        self.hidden_by_group
    }

    /// A userpic is drawn next to the bottom view of each run of attached
    /// messages.
    pub fn display_from_photo(&self) -> bool {
        self.has_from_photo && !self.attach_to_next
    }

    /// The media this view displays: the album for a group leader, its own
    /// attachment otherwise.
    pub fn display_media(&self) -> Option<&Media> {
        self.album.as_ref().or(self.media.as_ref())
    }

    pub(crate) fn display_media_mut(&mut self) -> Option<&mut Media> {
        match self.album {
            Some(ref mut album) => Some(album),
            None => self.media.as_mut(),
        }
    }

    pub fn media(&self) -> Option<&Media> {
        self.media.as_ref()
    }

    pub(crate) fn media_mut(&mut self) -> Option<&mut Media> {
        self.media.as_mut()
    }

    pub(crate) fn album_mut(&mut self) -> &mut Option<Media> {
        &mut self.album
    }

    /// Items of the album this view shows, empty when it shows none.
    pub fn album_items(&self) -> Vec<ItemId> {
        self.album
            .as_ref()
            .map(Media::grouped_items)
            .unwrap_or_default()
    }

    pub(crate) fn set_item(&mut self, item: Item) {
        self.media = item
            .media
            .as_ref()
            .map(|content| Media::from_content(item.id, content));
        self.item = item;
    }

    pub(crate) fn into_item(self) -> Item {
        self.item
    }

    pub fn margin_top(&self, style: &Style) -> i32 {
        if self.item.is_service() {
            style.service_margin_top
        } else if self.attach_to_previous {
            style.msg_margin_top_attached
        } else {
            style.msg_margin_top
        }
    }

    pub fn margin_bottom(&self, style: &Style) -> i32 {
        if self.item.is_service() {
            style.service_margin_bottom
        } else {
            style.msg_margin_bottom
        }
    }

    /// Height of the date separator drawn at the top of this view.
    pub fn date_height(&self) -> i32 {
        self.date_height
    }

    pub fn bubble_rect(&self) -> Rect {
        self.bubble
    }

    pub fn text_rect(&self) -> Rect {
        self.text_rect
    }

    pub fn media_rect(&self) -> Rect {
        self.media_rect
    }

    pub fn has_point(&self, point: Point) -> bool {
        self.bubble.contains(point) || self.media_rect.contains(point)
    }

    fn media_below_text(&self) -> bool {
        self.display_media()
            .is_some_and(Media::attaches_below_text)
    }

    fn media_above_length(&self) -> u16 {
        match self.display_media() {
            Some(media) if !media.attaches_below_text() => media.full_selection_length(),
            _ => 0,
        }
    }

    fn body_length(&self) -> u16 {
        self.media_above_length()
            .saturating_add(self.item.text.len_symbols())
    }

    pub fn full_selection_length(&self) -> u16 {
        let below = match self.display_media() {
            Some(media) if media.attaches_below_text() => media.full_selection_length(),
            _ => 0,
        };
        self.body_length().saturating_add(below)
    }

    pub fn has_text_for_copy(&self) -> bool {
        !self.item.text.is_empty()
            || self
                .display_media()
                .is_some_and(Media::has_text_for_copy)
    }

    /// Lays the view out into `width` and returns its height.
    pub fn resize_get_height(&mut self, width: i32, style: &Style, engine: &dyn TextEngine) -> i32 {
        self.width = width;
        self.bubble = Rect::default();
        self.media_rect = Rect::default();
        self.text_rect = Rect::default();
        self.info_rect = Rect::default();
        if self.hidden_by_group {
            self.date_height = 0;
            self.height = 0;
            return 0;
        }
        self.date_height = if self.display_date {
            style.displayed_date_height()
        } else {
            0
        };
        self.height = if self.item.is_service() {
            self.layout_service(width, style, engine)
        } else {
            self.layout_message(width, style, engine)
        };
        self.height
    }

    fn layout_service(&mut self, width: i32, style: &Style, engine: &dyn TextEngine) -> i32 {
        let available = (width
            - 2 * style.msg_margin_left
            - 2 * style.service_padding_horizontal)
            .max(1);
        let text_width = engine.max_width(&self.item.text).clamp(1, available);
        let text_height = engine.count_height(&self.item.text, text_width);
        let bubble_width = text_width + 2 * style.service_padding_horizontal;
        let bubble_height = text_height + 2 * style.service_padding_vertical;
        let top = self.date_height + style.service_margin_top;
        self.bubble = Rect::new((width - bubble_width) / 2, top, bubble_width, bubble_height);
        self.text_rect = Rect::new(
            self.bubble.x + style.service_padding_horizontal,
            top + style.service_padding_vertical,
            text_width,
            text_height,
        );
        top + bubble_height + style.service_margin_bottom
    }

    fn layout_message(&mut self, width: i32, style: &Style, engine: &dyn TextEngine) -> i32 {
        let mut left = style.msg_margin_left;
        if self.has_from_photo {
            left += style.photo_size + style.photo_skip;
        }
        let available = (width - left - style.msg_margin_right)
            .min(style.msg_max_width)
            .max(1);
        let padding = style.msg_padding_horizontal;
        let has_text = !self.item.text.is_empty();
        let text_natural = if has_text {
            engine
                .max_width(&self.item.text)
                .max(style.msg_info_width)
                + 2 * padding
        } else {
            0
        };
        let below = self.media_below_text();
        let media_natural = match self.display_media() {
            Some(media) if !below => media.max_width(style),
            Some(_) => available,
            None => 0,
        };
        let bubble_width = text_natural.max(media_natural).clamp(1, available);
        let inner_width = (bubble_width - 2 * padding).max(1);

        let top = self.date_height + self.margin_top(style);
        let x = if self.item.flags.outgoing {
            width - style.msg_margin_right - bubble_width
        } else {
            left
        };
        let mut cursor = 0;
        if !below && let Some(media) = self.display_media_mut() {
            let media_height = media.resize_get_height(bubble_width, style, engine);
            let media_width = media.size().width;
            self.media_rect = Rect::new(x, top, media_width, media_height);
            cursor += media_height;
        }
        if has_text {
            cursor += style.msg_padding_top;
            let text_height = engine.count_height(&self.item.text, inner_width);
            self.text_rect = Rect::new(x + padding, top + cursor, inner_width, text_height);
            cursor += text_height;
        }
        if below && let Some(media) = self.display_media_mut() {
            if !has_text {
                cursor += style.msg_padding_top;
            }
            let media_height = media.resize_get_height(inner_width, style, engine);
            self.media_rect = Rect::new(x + padding, top + cursor, inner_width, media_height);
            cursor += media_height;
        }
        if has_text || below || self.display_media().is_none() {
            self.info_rect = Rect::new(
                x + bubble_width - padding - style.msg_info_width,
                top + cursor,
                style.msg_info_width,
                style.msg_info_height,
            );
            cursor += style.msg_info_height + style.msg_padding_bottom;
        } else {
            self.info_rect = Rect::new(
                self.media_rect.right() - padding - style.msg_info_width,
                self.media_rect.bottom() - style.msg_padding_bottom - style.msg_info_height,
                style.msg_info_width,
                style.msg_info_height,
            );
        }
        let bubble_width = bubble_width.max(self.media_rect.width);
        self.bubble = Rect::new(x, top, bubble_width, cursor);
        top + cursor + self.margin_bottom(style)
    }

    /// Hit-tests `point`, relative to the view's top-left corner.
    pub fn text_state(
        &self,
        point: Point,
        request: StateRequest,
        engine: &dyn TextEngine,
    ) -> TextState {
        let mut state = TextState {
            item: Some(self.id()),
            ..Default::default()
        };
        if self.height == 0 {
            return state;
        }
        if self.display_date && point.y < self.date_height {
            state.link = Some(Link::JumpToDate(self.item.day()));
            return state;
        }
        if let Some(media) = self.display_media()
            && self.media_rect.contains(point)
        {
            let origin = self.media_rect.origin();
            let mut media_state = media.text_state(point - origin, request, engine);
            if media.attaches_below_text() {
                media_state.symbol = media_state.symbol.saturating_add(self.body_length());
            }
            media_state.item = media_state.item.or(Some(self.id()));
            return media_state;
        }
        let text = self.text_rect;
        if !text.is_empty() && point.y >= text.top() && point.y < text.bottom() {
            let hit = engine.hit_test(
                &self.item.text,
                text.width,
                point - text.origin(),
                request,
            );
            state.symbol = hit.symbol.saturating_add(self.media_above_length());
            state.after_symbol = hit.after_symbol;
            state.upon_symbol = hit.upon_symbol && text.contains(point);
            if state.upon_symbol {
                state.cursor = CursorState::InText;
                state.link = hit.link;
            }
            return state;
        }
        if self.info_rect.contains(point) {
            state.cursor = CursorState::InDate;
        }
        let content_top = if text.is_empty() {
            self.bubble.top()
        } else {
            text.top()
        };
        state.symbol = if point.y < content_top {
            0
        } else {
            self.full_selection_length()
        };
        state
    }

    /// Flattened text covered by `selection`.
    pub fn selected_text(&self, selection: TextSelection) -> TextWithEntities {
        let media = self.display_media();
        if selection.is_full() {
            let body = self.item.text.clone();
            let media_text = media
                .map(|media| media.selected_text(TextSelection::FULL))
                .unwrap_or_default();
            return join_paragraphs(body, media_text);
        }
        if selection.is_sub_group() {
            return media
                .map(|media| media.selected_text(selection))
                .unwrap_or_default();
        }
        let Some(media) = media else {
            return self.item.text.slice(selection);
        };
        if media.attaches_below_text() {
            let body = self.item.text.slice(selection);
            let below = media.selected_text(selection.unshifted(self.item.text.len_symbols()));
            join_paragraphs(body, below)
        } else {
            let above = media.selected_text(selection);
            let body = self.item.text.slice(media.skip_selection(selection));
            join_paragraphs(above, body)
        }
    }

    /// Expands `selection` to word or paragraph bounds across the pieces of
    /// the flattened text.
    pub fn adjust_selection(&self, selection: TextSelection, kind: TextSelectType) -> TextSelection {
        if selection.is_full() || selection.is_sub_group() {
            return selection;
        }
        let text = &self.item.text;
        let Some(media) = self.display_media() else {
            return text.adjust_selection(selection, kind);
        };
        if !media.attaches_below_text() {
            let inner = text.adjust_selection(media.skip_selection(selection), kind);
            return media.unskip_selection(inner);
        }
        let body_length = text.len_symbols();
        if selection.to <= body_length {
            return text.adjust_selection(selection, kind);
        }
        let media_result = media
            .adjust_selection(selection.unshifted(body_length), kind)
            .shifted(body_length);
        if selection.from >= body_length {
            return media_result;
        }
        let body_result = text.adjust_selection(selection, kind);
        TextSelection::new(body_result.from, media_result.to)
    }

    /// Draws the view at `origin` (its top-left corner on the surface). The
    /// date separator is drawn by the paint pass.
    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        origin: Point,
        clip: Rect,
        selection: TextSelection,
        now: Instant,
    ) {
        if self.height == 0 {
            return;
        }
        let full = selection.is_full();
        let offset = |rect: Rect| rect.translated(origin.x, origin.y);
        if self.item.is_service() {
            surface.fill(offset(self.bubble), Fill::Service);
            surface.draw_text(&self.item.text, offset(self.text_rect), selection);
            if full {
                surface.fill(offset(self.bubble), Fill::Selection);
            }
            return;
        }
        let media = self.display_media();
        if media.is_none_or(|media| media.has_bubble() || !self.item.text.is_empty()) {
            surface.fill(
                offset(self.bubble),
                Fill::Bubble {
                    outgoing: self.item.flags.outgoing,
                    selected: full,
                },
            );
        }
        if let Some(media) = media {
            let media_selection = if full || selection.is_sub_group() {
                selection
            } else if media.attaches_below_text() {
                selection.unshifted(self.item.text.len_symbols())
            } else {
                TextSelection::default()
            };
            media.draw(surface, offset(self.media_rect), clip, media_selection, now);
        }
        if !self.text_rect.is_empty() {
            let text_selection = if full {
                TextSelection::FULL
            } else if selection.is_sub_group() {
                TextSelection::default()
            } else {
                match media {
                    Some(media) if !media.attaches_below_text() => media.skip_selection(selection),
                    _ => selection,
                }
            };
            surface.draw_text(&self.item.text, offset(self.text_rect), text_selection);
        }
    }

    /// Size of the laid out view.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

fn join_paragraphs(first: TextWithEntities, second: TextWithEntities) -> TextWithEntities {
    if first.is_empty() {
        return second;
    }
    if second.is_empty() {
        return first;
    }
    let mut result = first;
    result.append_str("\n\n");
    result.append(second);
    result
}
