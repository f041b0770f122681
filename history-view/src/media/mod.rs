//! Attachments shown inside a message.
//!
//! Every attachment is a [`Media`]: the owning item's id plus one payload from
//! the closed [`MediaKind`] enum. All variants answer the same capability set
//! (layout, draw, hit-test, selection) so the view and the controller never
//! branch on the concrete type.
//!
//! Selection offsets: a media that carries text (web page previews,
//! locations, games, invoices) contributes its parts to the owning item's
//! flattened text. [`Media::skip_selection`] and [`Media::unskip_selection`]
//! convert between the item's offset space and the space that follows this
//! media's own symbols.
//!
//! Grouping: only photos and non-round videos can join an album. An album is
//! the [`MediaKind::Grouped`] variant, owned by the view of the last item of
//! the group. Calling a grouping method on a variant that does not take part
//! in albums is a programming error and panics through `unreachable!`; callers
//! check [`Media::can_be_grouped`] first.

mod attachments;
mod grouped;
mod text_parts;

use std::hash::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;
use std::time::Instant;

use strum_macros::Display;
use strum_macros::EnumCount;
use strum_macros::EnumIter;
use strum_macros::IntoStaticStr;

pub use attachments::Call;
pub use attachments::Contact;
pub use attachments::Document;
pub use attachments::Game;
pub use attachments::Invoice;
pub use attachments::Location;
pub use attachments::Photo;
pub use attachments::Sticker;
pub use attachments::Video;
pub use attachments::WebPage;
pub use grouped::GroupPart;
pub use grouped::Grouped;

use crate::config::Style;
use crate::geometry::Point;
use crate::geometry::Rect;
use crate::geometry::RectParts;
use crate::geometry::Size;
use crate::hit_test::CursorState;
use crate::hit_test::Link;
use crate::hit_test::StateRequest;
use crate::hit_test::TextState;
use crate::host::Fill;
use crate::host::Icon;
use crate::host::ImageSource;
use crate::host::Surface;
use crate::item::DocumentData;
use crate::item::DocumentKind;
use crate::item::DownloadStatus;
use crate::item::ItemId;
use crate::item::MediaContent;
use crate::text::TextEngine;
use crate::text::TextHit;
use crate::text::TextSelectType;
use crate::text::TextSelection;
use crate::text::TextWithEntities;
use attachments::attachment_link;
use attachments::format_size;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum MediaType {
    Photo,
    Video,
    Contact,
    Call,
    File,
    Gif,
    Sticker,
    Location,
    WebPage,
    Audio,
    Voice,
    Game,
    Invoice,
    Grouped,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaKind {
    Photo(Photo),
    Video(Video),
    Contact(Contact),
    Call(Call),
    File(Document),
    Gif(Video),
    Sticker(Sticker),
    Location(Location),
    WebPage(WebPage),
    Audio(Document),
    Voice(Document),
    Game(Game),
    Invoice(Invoice),
    Grouped(Grouped),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    parent: ItemId,
    kind: MediaKind,
    size: Size,
    /// Height of the image area of previews, locations and games.
    thumb_height: i32,
    /// Side of the square status icon of file-like attachments.
    icon_size: i32,
}

impl Media {
    pub fn from_content(parent: ItemId, content: &MediaContent) -> Self {
        let kind = match content {
            MediaContent::Photo(data) => MediaKind::Photo(Photo { data: data.clone() }),
            MediaContent::Document(document) => document_kind(document),
            MediaContent::Contact(data) => MediaKind::Contact(Contact { data: data.clone() }),
            MediaContent::Call(data) => MediaKind::Call(Call { data: data.clone() }),
            MediaContent::Location(data) => MediaKind::Location(Location::new(data.clone())),
            MediaContent::WebPage(data) => MediaKind::WebPage(WebPage::new(data.clone())),
            MediaContent::Game(data) => MediaKind::Game(Game::new(data.clone())),
            MediaContent::Invoice(data) => MediaKind::Invoice(Invoice::new(data.clone())),
        };
        Self::with_kind(parent, kind)
    }

    /// An empty album owned by the view of `parent`.
    pub fn grouped(parent: ItemId, max_items: usize) -> Self {
        Self::with_kind(parent, MediaKind::Grouped(Grouped::new(max_items)))
    }

    fn with_kind(parent: ItemId, kind: MediaKind) -> Self {
        Self {
            parent,
            kind,
            size: Size::default(),
            thumb_height: 0,
            icon_size: 0,
        }
    }

    pub fn parent(&self) -> ItemId {
        self.parent
    }

    /// Moves an album to the view of `parent` after its previous leader went
    /// away.
    pub(crate) fn reparent(&mut self, parent: ItemId) {
        self.parent = parent;
    }

    pub fn kind(&self) -> &MediaKind {
        &self.kind
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn media_type(&self) -> MediaType {
        match &self.kind {
            MediaKind::Photo(_) => MediaType::Photo,
            MediaKind::Video(_) => MediaType::Video,
            MediaKind::Contact(_) => MediaType::Contact,
            MediaKind::Call(_) => MediaType::Call,
            MediaKind::File(_) => MediaType::File,
            MediaKind::Gif(_) => MediaType::Gif,
            MediaKind::Sticker(_) => MediaType::Sticker,
            MediaKind::Location(_) => MediaType::Location,
            MediaKind::WebPage(_) => MediaType::WebPage,
            MediaKind::Audio(_) => MediaType::Audio,
            MediaKind::Voice(_) => MediaType::Voice,
            MediaKind::Game(_) => MediaType::Game,
            MediaKind::Invoice(_) => MediaType::Invoice,
            MediaKind::Grouped(_) => MediaType::Grouped,
        }
    }

    /// Stickers and round videos are drawn without a message bubble.
    pub fn has_bubble(&self) -> bool {
        match &self.kind {
            MediaKind::Sticker(_) => false,
            MediaKind::Video(video) => !video.round,
            _ => true,
        }
    }

    /// Text-carrying attachments are laid out under the message text and
    /// continue its offset space; the others sit above the text.
    pub fn attaches_below_text(&self) -> bool {
        matches!(
            self.kind,
            MediaKind::Location(_) | MediaKind::WebPage(_) | MediaKind::Game(_) | MediaKind::Invoice(_)
        )
    }

    pub fn document(&self) -> Option<&DocumentData> {
        match &self.kind {
            MediaKind::Video(video) | MediaKind::Gif(video) => Some(&video.document),
            MediaKind::Sticker(sticker) => Some(&sticker.document),
            MediaKind::File(document) | MediaKind::Audio(document) | MediaKind::Voice(document) => {
                Some(&document.data)
            }
            _ => None,
        }
    }

    pub fn status(&self) -> DownloadStatus {
        match &self.kind {
            MediaKind::Photo(photo) => photo.data.status,
            _ => self
                .document()
                .map_or(DownloadStatus::Ready, |document| document.status),
        }
    }

    pub fn is_ready_for_open(&self) -> bool {
        self.status().is_ready()
    }

    /// Natural width, used to size the bubble of a message without text.
    pub fn max_width(&self, style: &Style) -> i32 {
        match &self.kind {
            MediaKind::Photo(photo) => {
                fit_size(
                    Size::new(photo.data.width, photo.data.height),
                    style.media_max_width,
                    style.media_max_height,
                    style.media_min_size,
                )
                .width
            }
            MediaKind::Video(video) if video.round => style.round_video_size,
            MediaKind::Video(video) | MediaKind::Gif(video) => {
                fit_size(
                    Size::new(video.width, video.height),
                    style.media_max_width,
                    style.media_max_height,
                    style.media_min_size,
                )
                .width
            }
            MediaKind::Sticker(sticker) => {
                fit_size(
                    Size::new(sticker.width, sticker.height),
                    style.sticker_max_size,
                    style.sticker_max_size,
                    0,
                )
                .width
            }
            MediaKind::Grouped(_) => style.media_max_width,
            _ => style.msg_max_width,
        }
    }

    pub fn resize_get_height(
        &mut self,
        width: i32,
        style: &Style,
        engine: &dyn TextEngine,
    ) -> i32 {
        let width = width.max(1);
        let media_width = width.min(style.media_max_width);
        let mut thumb_height = 0;
        let mut icon_size = 0;
        let size = match &mut self.kind {
            MediaKind::Photo(photo) => fit_size(
                Size::new(photo.data.width, photo.data.height),
                media_width,
                style.media_max_height,
                style.media_min_size,
            ),
            MediaKind::Video(video) if video.round => {
                let side = style.round_video_size.min(width);
                Size::new(side, side)
            }
            MediaKind::Video(video) | MediaKind::Gif(video) => fit_size(
                Size::new(video.width, video.height),
                media_width,
                style.media_max_height,
                style.media_min_size,
            ),
            MediaKind::Sticker(sticker) => fit_size(
                Size::new(sticker.width, sticker.height),
                width.min(style.sticker_max_size),
                style.sticker_max_size,
                0,
            ),
            MediaKind::File(_) | MediaKind::Audio(_) | MediaKind::Voice(_) => {
                icon_size = style.file_height;
                Size::new(width, style.file_height)
            }
            MediaKind::Contact(_) => {
                icon_size = style.contact_height;
                Size::new(width, style.contact_height)
            }
            MediaKind::Call(_) => {
                icon_size = style.call_height;
                Size::new(width, style.call_height)
            }
            MediaKind::Location(location) => {
                thumb_height = style.location_map_height;
                Size::new(width, thumb_height + location.parts.layout(width, engine))
            }
            MediaKind::WebPage(page) => {
                if page.data.photo.is_some() {
                    thumb_height = style.web_page_photo_height;
                }
                Size::new(width, page.parts.layout(width, engine) + thumb_height)
            }
            MediaKind::Game(game) => {
                if game.data.photo.is_some() {
                    thumb_height = style.web_page_photo_height;
                }
                Size::new(width, thumb_height + game.parts.layout(width, engine))
            }
            MediaKind::Invoice(invoice) => Size::new(
                width,
                invoice.parts.layout(width, engine) + style.msg_info_height,
            ),
            MediaKind::Grouped(grouped) => grouped.resize(media_width, style),
        };
        self.size = size;
        self.thumb_height = thumb_height;
        self.icon_size = icon_size;
        size.height
    }

    /// Draws into `target`, the media rectangle in surface coordinates.
    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        target: Rect,
        clip: Rect,
        selection: TextSelection,
        now: Instant,
    ) {
        if !target.intersects(clip) {
            return;
        }
        let origin = target.origin();
        match &self.kind {
            MediaKind::Photo(photo) => {
                surface.draw_image(ImageSource::Photo(photo.data.id), target, RectParts::FULL);
                draw_status_icon(surface, target, photo.data.status, None);
            }
            MediaKind::Video(video) | MediaKind::Gif(video) => {
                let image = match video.playing_since {
                    Some(since) => ImageSource::InlineFrame {
                        document: video.document.id,
                        elapsed_ms: u64::try_from(
                            now.saturating_duration_since(since).as_millis(),
                        )
                        .unwrap_or(u64::MAX),
                    },
                    None => ImageSource::DocumentThumb(video.document.id),
                };
                surface.draw_image(image, target, RectParts::FULL);
                if video.playing_since.is_none() {
                    draw_status_icon(surface, target, video.document.status, Some(Icon::Play));
                }
            }
            MediaKind::Sticker(sticker) => {
                surface.draw_image(
                    ImageSource::DocumentThumb(sticker.document.id),
                    target,
                    RectParts::NONE,
                );
            }
            MediaKind::File(document) | MediaKind::Audio(document) | MediaKind::Voice(document) => {
                let ready_icon = match self.kind {
                    MediaKind::Audio(_) => Icon::Audio,
                    MediaKind::Voice(_) => Icon::Voice,
                    _ => Icon::File,
                };
                let icon = match document.data.status {
                    DownloadStatus::Ready => ready_icon,
                    DownloadStatus::Loading { .. } => Icon::Cancel,
                    DownloadStatus::Remote => Icon::Download,
                };
                self.draw_icon_row(surface, target, icon, &self.document_label());
            }
            MediaKind::Contact(contact) => {
                let label = format!("{}\n{}", contact.data.name, contact.data.phone);
                self.draw_icon_row(surface, target, Icon::Contact, &label);
            }
            MediaKind::Call(call) => {
                let icon = Icon::Call {
                    missed: matches!(call.data.outcome, crate::item::CallOutcome::Missed),
                    video: call.data.video,
                };
                self.draw_icon_row(surface, target, icon, &call.label());
            }
            MediaKind::Location(location) => {
                let map = Rect::new(target.x, target.y, target.width, self.thumb_height);
                surface.draw_image(
                    ImageSource::Map {
                        latitude: location.data.latitude,
                        longitude: location.data.longitude,
                    },
                    map,
                    RectParts::FULL,
                );
                location.parts.draw(
                    surface,
                    Point::new(origin.x, origin.y + self.thumb_height),
                    selection,
                );
            }
            MediaKind::WebPage(page) => {
                page.parts.draw(surface, origin, selection);
                if let Some(photo) = &page.data.photo {
                    let rect = Rect::new(
                        target.x,
                        target.bottom() - self.thumb_height,
                        target.width,
                        self.thumb_height,
                    );
                    surface.draw_image(ImageSource::Photo(photo.id), rect, RectParts::FULL);
                }
            }
            MediaKind::Game(game) => {
                if let Some(photo) = &game.data.photo {
                    let rect = Rect::new(target.x, target.y, target.width, self.thumb_height);
                    surface.draw_image(ImageSource::Photo(photo.id), rect, RectParts::FULL);
                }
                game.parts.draw(
                    surface,
                    Point::new(origin.x, origin.y + self.thumb_height),
                    selection,
                );
            }
            MediaKind::Invoice(invoice) => {
                invoice.parts.draw(surface, origin, selection);
                let status_top = origin.y + invoice.parts.height();
                surface.draw_text(
                    &TextWithEntities::plain(invoice.status_label()),
                    Rect::new(
                        target.x,
                        status_top,
                        target.width,
                        target.bottom() - status_top,
                    ),
                    TextSelection::default(),
                );
            }
            MediaKind::Grouped(grouped) => {
                grouped.draw(surface, target, clip, selection, now);
                return;
            }
        }
        if selection.is_full() {
            surface.fill(target, Fill::Selection);
        }
    }

    fn draw_icon_row(&self, surface: &mut dyn Surface, target: Rect, icon: Icon, label: &str) {
        let icon_rect = Rect::new(target.x, target.y, self.icon_size, self.icon_size);
        surface.draw_icon(icon, icon_rect);
        surface.draw_text(
            &TextWithEntities::plain(label),
            Rect::new(
                target.x + self.icon_size,
                target.y,
                (target.width - self.icon_size).max(0),
                self.icon_size,
            ),
            TextSelection::default(),
        );
    }

    fn document_label(&self) -> String {
        let Some(document) = self.document() else {
            return String::new();
        };
        match &document.kind {
            DocumentKind::Audio { performer, title } => format!("{performer} - {title}"),
            DocumentKind::Voice { duration_secs } => {
                format!("{}:{:02}", duration_secs / 60, duration_secs % 60)
            }
            _ => format!("{}\n{}", document.name, format_size(document.size_bytes)),
        }
    }

    /// Hit-tests `point`, relative to the top-left corner of the media.
    ///
    /// Symbols are in this media's own offset space; `item` is only set when
    /// the point falls on an album part.
    pub fn text_state(
        &self,
        point: Point,
        request: StateRequest,
        engine: &dyn TextEngine,
    ) -> TextState {
        let inside = Rect::from_size(self.size).contains(point);
        let mut state = TextState::default();
        match &self.kind {
            MediaKind::Photo(photo) => {
                if inside {
                    state.link = Some(attachment_link(self.parent, photo.data.status));
                }
            }
            MediaKind::Video(video) | MediaKind::Gif(video) => {
                if inside {
                    let inline = video.round || matches!(self.kind, MediaKind::Gif(_));
                    state.link = Some(if inline && video.document.status.is_ready() {
                        Link::PlayInline(self.parent)
                    } else {
                        attachment_link(self.parent, video.document.status)
                    });
                }
            }
            MediaKind::Sticker(_) => {}
            MediaKind::File(document) | MediaKind::Audio(document) | MediaKind::Voice(document) => {
                if inside {
                    state.link = Some(attachment_link(self.parent, document.data.status));
                }
            }
            MediaKind::Contact(contact) => {
                if inside {
                    state.link = contact.data.user.map(Link::OpenPeer);
                }
            }
            MediaKind::Call(_) => {
                if inside {
                    state.link = Some(Link::Call(self.parent));
                }
            }
            MediaKind::Location(location) => {
                if point.y < self.thumb_height {
                    if inside {
                        state.link = Some(location.link());
                    }
                } else {
                    let hit = location.parts.hit_test(
                        Point::new(point.x, point.y - self.thumb_height),
                        request,
                        engine,
                    );
                    apply_text_hit(&mut state, hit);
                    if inside && state.link.is_none() {
                        state.link = Some(location.link());
                    }
                }
            }
            MediaKind::WebPage(page) => {
                let hit = page.parts.hit_test(point, request, engine);
                apply_text_hit(&mut state, hit);
                if inside && state.link.is_none() && !state.upon_symbol {
                    state.link = Some(Link::Url(page.data.url.clone()));
                }
            }
            MediaKind::Game(game) => {
                if point.y >= self.thumb_height {
                    let hit = game.parts.hit_test(
                        Point::new(point.x, point.y - self.thumb_height),
                        request,
                        engine,
                    );
                    apply_text_hit(&mut state, hit);
                }
                if inside && state.link.is_none() && !state.upon_symbol {
                    state.link = Some(Link::OpenGame(self.parent));
                }
            }
            MediaKind::Invoice(invoice) => {
                let hit = invoice.parts.hit_test(point, request, engine);
                apply_text_hit(&mut state, hit);
            }
            MediaKind::Grouped(grouped) => return grouped.text_state(point, request),
        }
        state
    }

    pub fn selected_text(&self, selection: TextSelection) -> TextWithEntities {
        match &self.kind {
            MediaKind::Location(location) => {
                let parts = location.parts.selected_text(selection);
                if !selection.is_full() {
                    return parts;
                }
                let mut result = TextWithEntities::plain("[ Location ]");
                if !parts.is_empty() {
                    result.append_str("\n");
                    result.append(parts);
                }
                if let Some(url) = location.link().drag_text() {
                    result.append_str("\n");
                    result.append_str(&url);
                }
                result
            }
            MediaKind::WebPage(page) => page.parts.selected_text(selection),
            MediaKind::Game(game) => game.parts.selected_text(selection),
            MediaKind::Invoice(invoice) => invoice.parts.selected_text(selection),
            MediaKind::Grouped(grouped) => grouped.selected_text(selection),
            _ if selection.is_full() => TextWithEntities::plain(self.attachment_label()),
            _ => TextWithEntities::default(),
        }
    }

    /// Placeholder copied for attachments without text of their own.
    pub fn attachment_label(&self) -> String {
        match &self.kind {
            MediaKind::Photo(_) => "[ Photo ]".to_string(),
            MediaKind::Video(video) if video.round => "[ Video message ]".to_string(),
            MediaKind::Video(_) => "[ Video ]".to_string(),
            MediaKind::Gif(_) => "[ GIF ]".to_string(),
            MediaKind::Sticker(sticker) if sticker.emoji.is_empty() => "[ Sticker ]".to_string(),
            MediaKind::Sticker(sticker) => format!("[ {} Sticker ]", sticker.emoji),
            MediaKind::File(document) => format!("[ File : {} ]", document.data.name),
            MediaKind::Audio(_) => format!("[ Audio : {} ]", self.document_label()),
            MediaKind::Voice(_) => "[ Voice message ]".to_string(),
            MediaKind::Contact(contact) => {
                format!("[ Contact : {}, {} ]", contact.data.name, contact.data.phone)
            }
            MediaKind::Call(call) => format!("[ {} ]", call.label()),
            MediaKind::Location(_) => "[ Location ]".to_string(),
            MediaKind::WebPage(page) => page.data.url.clone(),
            MediaKind::Game(game) => format!("[ Game : {} ]", game.data.title),
            MediaKind::Invoice(invoice) => format!("[ Invoice : {} ]", invoice.data.title),
            MediaKind::Grouped(_) => "[ Album ]".to_string(),
        }
    }

    pub fn full_selection_length(&self) -> u16 {
        match &self.kind {
            MediaKind::Location(location) => location.parts.len(),
            MediaKind::WebPage(page) => page.parts.len(),
            MediaKind::Game(game) => game.parts.len(),
            MediaKind::Invoice(invoice) => invoice.parts.len(),
            _ => 0,
        }
    }

    pub fn has_text_for_copy(&self) -> bool {
        match &self.kind {
            MediaKind::Location(location) => !location.parts.is_empty(),
            MediaKind::WebPage(page) => !page.parts.is_empty(),
            MediaKind::Game(game) => !game.parts.is_empty(),
            MediaKind::Invoice(invoice) => !invoice.parts.is_empty(),
            _ => false,
        }
    }

    pub fn adjust_selection(&self, selection: TextSelection, kind: TextSelectType) -> TextSelection {
        match &self.kind {
            MediaKind::Location(location) => location.parts.adjust_selection(selection, kind),
            MediaKind::WebPage(page) => page.parts.adjust_selection(selection, kind),
            MediaKind::Game(game) => game.parts.adjust_selection(selection, kind),
            MediaKind::Invoice(invoice) => invoice.parts.adjust_selection(selection, kind),
            _ => selection,
        }
    }

    /// Converts a selection that covers this media's symbols followed by more
    /// text into the space of that following text.
    pub fn skip_selection(&self, selection: TextSelection) -> TextSelection {
        selection.unshifted(self.full_selection_length())
    }

    pub fn unskip_selection(&self, selection: TextSelection) -> TextSelection {
        selection.shifted(self.full_selection_length())
    }

    /// In items-selection mode a click on this link toggles the selection
    /// instead of opening the media.
    pub fn toggle_selection_by_handler_click(&self, link: &Link) -> bool {
        let media_link = matches!(
            link,
            Link::OpenMedia(_) | Link::Download(_) | Link::CancelDownload(_) | Link::PlayInline(_)
        );
        match &self.kind {
            MediaKind::Photo(_) | MediaKind::Video(_) | MediaKind::Gif(_) => {
                media_link && link.item() == Some(self.parent)
            }
            MediaKind::Grouped(grouped) => media_link && grouped.contains_link(link),
            _ => false,
        }
    }

    /// Dragging this media drags the whole message.
    pub fn drag_item(&self) -> bool {
        matches!(self.kind, MediaKind::Sticker(_))
    }

    pub fn drag_item_by_handler(&self, link: &Link) -> bool {
        match &self.kind {
            MediaKind::Photo(_)
            | MediaKind::Video(_)
            | MediaKind::Gif(_)
            | MediaKind::File(_)
            | MediaKind::Audio(_) => *link == Link::OpenMedia(self.parent),
            MediaKind::Grouped(grouped) => {
                matches!(link, Link::OpenMedia(_)) && grouped.contains_link(link)
            }
            _ => false,
        }
    }

    /// Starts inline playback of a GIF or round video. Returns whether
    /// playback started.
    pub fn play_inline(&mut self, now: Instant) -> bool {
        let video = match &mut self.kind {
            MediaKind::Gif(video) => video,
            MediaKind::Video(video) if video.round => video,
            _ => return false,
        };
        if !video.document.status.is_ready() {
            return false;
        }
        video.playing_since = Some(now);
        true
    }

    pub fn stop_inline(&mut self) {
        if let MediaKind::Gif(video) | MediaKind::Video(video) = &mut self.kind {
            video.playing_since = None;
        }
    }

    pub fn is_playing_inline(&self) -> bool {
        match &self.kind {
            MediaKind::Gif(video) | MediaKind::Video(video) => video.playing_since.is_some(),
            _ => false,
        }
    }

    pub fn can_be_grouped(&self) -> bool {
        match &self.kind {
            MediaKind::Photo(_) => true,
            MediaKind::Video(video) => !video.round,
            _ => false,
        }
    }

    /// Natural size used to lay out an album row.
    pub fn size_for_grouping(&self) -> Size {
        match &self.kind {
            MediaKind::Photo(photo) => {
                Size::new(photo.data.width.max(1), photo.data.height.max(1))
            }
            MediaKind::Video(video) if !video.round => {
                Size::new(video.width.max(1), video.height.max(1))
            }
            _ => unreachable!("grouping call on a {} media", self.media_type()),
        }
    }

    /// Draws this media as an album part filling `rect`.
    pub fn draw_grouped(
        &self,
        surface: &mut dyn Surface,
        rect: Rect,
        selection: TextSelection,
        sides: RectParts,
        _now: Instant,
    ) {
        let (image, status, icon) = match &self.kind {
            MediaKind::Photo(photo) => (ImageSource::Photo(photo.data.id), photo.data.status, None),
            MediaKind::Video(video) if !video.round => (
                ImageSource::DocumentThumb(video.document.id),
                video.document.status,
                Some(Icon::Play),
            ),
            _ => unreachable!("grouping call on a {} media", self.media_type()),
        };
        surface.draw_image(image, rect, sides);
        draw_status_icon(surface, rect, status, icon);
        if selection.is_full() {
            surface.fill(rect, Fill::Selection);
        }
    }

    /// Hit-tests an album part occupying `rect` of the album.
    pub fn get_state_grouped(&self, rect: Rect, point: Point, _request: StateRequest) -> TextState {
        let status = match &self.kind {
            MediaKind::Photo(photo) => photo.data.status,
            MediaKind::Video(video) if !video.round => video.document.status,
            _ => unreachable!("grouping call on a {} media", self.media_type()),
        };
        if !rect.contains(point) {
            return TextState::default();
        }
        TextState::with_link(Some(self.parent), attachment_link(self.parent, status))
    }

    /// Replaces the album contents with `medias`. Returns `false` when they
    /// cannot form an album, leaving the album unchanged.
    pub fn apply_group(&mut self, medias: Vec<Media>) -> bool {
        match &mut self.kind {
            MediaKind::Grouped(grouped) => grouped.apply(medias),
            _ => unreachable!("grouping call on a {} media", self.media_type()),
        }
    }

    /// Removes the last album part and returns its content. Used when the
    /// item shown last in an album is removed from its history.
    pub fn take_last_from_group(&mut self) -> Option<Media> {
        match &mut self.kind {
            MediaKind::Grouped(grouped) => grouped.take_last(),
            _ => unreachable!("grouping call on a {} media", self.media_type()),
        }
    }

    /// Items shown by an album, in display order. Empty for other variants.
    pub fn grouped_items(&self) -> Vec<ItemId> {
        match &self.kind {
            MediaKind::Grouped(grouped) => grouped.items().collect(),
            _ => Vec::new(),
        }
    }

    /// Key of everything that changes how this media looks as an album part.
    pub(crate) fn grouped_fingerprint(&self, size: Size, selected: bool, sides: RectParts) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.parent.hash(&mut hasher);
        size.hash(&mut hasher);
        selected.hash(&mut hasher);
        sides.hash(&mut hasher);
        self.status().hash(&mut hasher);
        match &self.kind {
            MediaKind::Photo(photo) => photo.data.id.hash(&mut hasher),
            MediaKind::Video(video) => video.document.id.hash(&mut hasher),
            _ => {}
        }
        hasher.finish()
    }
}

fn document_kind(document: &DocumentData) -> MediaKind {
    let video = |width: i32, height: i32, round: bool| Video {
        document: document.clone(),
        width,
        height,
        round,
        playing_since: None,
    };
    match &document.kind {
        DocumentKind::File => MediaKind::File(Document {
            data: document.clone(),
        }),
        DocumentKind::Video {
            width,
            height,
            round,
        } => MediaKind::Video(video(*width, *height, *round)),
        DocumentKind::Gif { width, height } => MediaKind::Gif(video(*width, *height, false)),
        DocumentKind::Sticker {
            emoji,
            width,
            height,
        } => MediaKind::Sticker(Sticker {
            document: document.clone(),
            emoji: emoji.clone(),
            width: *width,
            height: *height,
        }),
        DocumentKind::Audio { .. } => MediaKind::Audio(Document {
            data: document.clone(),
        }),
        DocumentKind::Voice { .. } => MediaKind::Voice(Document {
            data: document.clone(),
        }),
    }
}

fn apply_text_hit(state: &mut TextState, hit: TextHit) {
    state.symbol = hit.symbol;
    state.after_symbol = hit.after_symbol;
    state.upon_symbol = hit.upon_symbol;
    if hit.upon_symbol {
        state.cursor = CursorState::InText;
    }
    if hit.link.is_some() {
        state.link = hit.link;
    }
}

fn draw_status_icon(
    surface: &mut dyn Surface,
    rect: Rect,
    status: DownloadStatus,
    ready_icon: Option<Icon>,
) {
    let icon = match status {
        DownloadStatus::Ready => ready_icon,
        DownloadStatus::Loading { .. } => Some(Icon::Cancel),
        DownloadStatus::Remote => Some(Icon::Download),
    };
    if let Some(icon) = icon {
        let side = rect.width.min(rect.height).min(48);
        surface.draw_icon(
            icon,
            Rect::new(
                rect.x + (rect.width - side) / 2,
                rect.y + (rect.height - side) / 2,
                side,
                side,
            ),
        );
    }
}

/// Scales `natural` into `max_width` x `max_height` keeping its aspect ratio,
/// never going below `min` on either side.
fn fit_size(natural: Size, max_width: i32, max_height: i32, min: i32) -> Size {
    let min = min.min(max_width);
    if natural.is_empty() {
        return Size::new(min.max(1), min.max(1));
    }
    let mut width = natural.width.min(max_width);
    let mut height = scale(natural.height, width, natural.width);
    if height > max_height {
        height = max_height;
        width = scale(natural.width, height, natural.height).min(max_width);
    }
    Size::new(width.max(min).max(1), height.max(min).max(1))
}

fn scale(value: i32, numerator: i32, denominator: i32) -> i32 {
    let scaled = i64::from(value) * i64::from(numerator) / i64::from(denominator.max(1));
    i32::try_from(scaled).unwrap_or(i32::MAX)
}
