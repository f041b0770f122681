//! Context menu requests.
//!
//! The list decides which actions apply to the point that was clicked; the
//! host presents them and reports the chosen one back through
//! [`HistoryInner::perform_context_action`].

use std::time::Instant;

use strum_macros::Display;
use strum_macros::IntoStaticStr;

use crate::geometry::Point;
use crate::hit_test::CursorState;
use crate::hit_test::Link;
use crate::hit_test::StateRequest;
use crate::inner::HistoryInner;
use crate::item::DocumentKind;
use crate::item::ItemId;
use crate::media::Media;
use crate::media::MediaKind;
use crate::media::MediaType;
use crate::selection::SelectAction;
use crate::selection::SelectionState;
use crate::text::TextSelection;
use crate::text::TextWithEntities;

/// Where the menu was requested relative to the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UponSelection {
    /// Whole items are selected, the pointer is not on one of them.
    OutsideItems,
    /// Text is selected, the pointer is not on it.
    OutsideText,
    NoSelection,
    OverText,
    OverItems,
}

impl UponSelection {
    pub fn is_upon(self) -> bool {
        self > UponSelection::NoSelection
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ContextAction {
    CopySelected,
    CopySelectedItems,
    SaveImage,
    CopyImage,
    CancelDownload,
    OpenGif,
    SaveGif,
    ShowInFolder,
    SaveFile,
    StickerPackInfo,
    ToggleFavedSticker,
    CopyText,
    CopyLink,
    ForwardSelected,
    DeleteSelected,
    ClearSelection,
    Forward,
    Delete,
    Select,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenuRequest {
    /// Viewport position the menu was requested at.
    pub position: Point,
    pub item: Option<ItemId>,
    pub link: Option<Link>,
    pub media_type: Option<MediaType>,
    pub upon_selection: UponSelection,
    pub selection_state: SelectionState,
    pub actions: Vec<ContextAction>,
    pub from_touch: bool,
}

/// What the last shown menu was opened on.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct ContextTarget {
    pub(crate) item: Option<ItemId>,
    pub(crate) link: Option<Link>,
}

/// A link pointing at a photo or a document, with the media it opens.
enum MediaLink<'a> {
    Photo,
    Document(&'a Media),
}

impl HistoryInner {
    /// Builds the menu for `position` (viewport coordinates) and hands it to
    /// the host. Nothing is shown when no action applies.
    pub fn show_context_menu_at(&mut self, position: Point, from_touch: bool, now: Instant) {
        if !from_touch {
            self.mouse.position = position;
            self.mouse_action_update(now);
        }
        let request = self.build_context_menu(position, from_touch);
        self.context_target = Some(ContextTarget {
            item: request.item,
            link: request.link.clone(),
        });
        if request.actions.is_empty() {
            tracing::debug!("no context actions apply");
            return;
        }
        tracing::debug!(item = ?request.item, actions = request.actions.len(), "showing context menu");
        self.host.show_context_menu(request);
    }

    pub(crate) fn build_context_menu(&self, position: Point, from_touch: bool) -> ContextMenuRequest {
        let state = self.selection.state(&self.timeline);
        let upon = self.upon_selection(position, from_touch);
        let active = self.mouse.active_link.as_ref();
        let link = active.map(|active| active.link.clone());
        let mut actions = Vec::new();

        let media_link = link.as_ref().and_then(|link| self.media_link(link));
        let item = match &media_link {
            Some(_) => active.map(|active| active.host),
            None => self.mouse.hovered.or(active.map(|active| active.host)),
        };
        let view = item.and_then(|id| self.timeline.view(id));

        if let Some(media_link) = &media_link {
            if upon.is_upon() {
                actions.push(ContextAction::CopySelected);
            }
            match media_link {
                MediaLink::Photo => {
                    actions.push(ContextAction::SaveImage);
                    actions.push(ContextAction::CopyImage);
                }
                MediaLink::Document(media) => Self::document_actions(media, &mut actions),
            }
        } else if upon.is_upon() {
            actions.push(if upon == UponSelection::OverItems {
                ContextAction::CopySelectedItems
            } else {
                ContextAction::CopySelected
            });
        } else if let Some(view) = view
            && upon == UponSelection::NoSelection
        {
            let media = view.media();
            if let Some(media) = media
                && matches!(media.kind(), MediaKind::Sticker(_))
            {
                actions.push(ContextAction::StickerPackInfo);
                actions.push(ContextAction::ToggleFavedSticker);
                actions.push(ContextAction::SaveImage);
            }
            let text_for_copy =
                !view.item().text.is_empty() || media.is_some_and(Media::has_text_for_copy);
            if !view.item().is_service() && link.is_none() && text_for_copy {
                actions.push(ContextAction::CopyText);
            }
        }
        if media_link.is_none() && link.as_ref().and_then(Link::copy_text).is_some() {
            actions.push(ContextAction::CopyLink);
        }

        if upon == UponSelection::OverItems {
            if state.count > 0 && state.can_forward_count == state.count {
                actions.push(ContextAction::ForwardSelected);
            }
            if state.count > 0 && state.can_delete_count == state.count {
                actions.push(ContextAction::DeleteSelected);
            }
            actions.push(ContextAction::ClearSelection);
        } else if let Some(view) = view {
            let flags = view.item().flags;
            if upon != UponSelection::OutsideItems {
                if flags.can_forward && view.id().is_server() {
                    actions.push(ContextAction::Forward);
                }
                if flags.can_delete {
                    actions.push(ContextAction::Delete);
                }
            }
            if view.id().is_server() && !view.item().is_service() {
                actions.push(ContextAction::Select);
            }
        } else if let Some(moused) = self.mouse.moused.and_then(|id| self.timeline.view(id))
            && moused.id().is_server()
            && !moused.item().is_service()
        {
            actions.push(ContextAction::Select);
        }

        let item = item.or(self.mouse.moused);
        ContextMenuRequest {
            position,
            item,
            link,
            media_type: item
                .and_then(|id| self.timeline.view(id))
                .and_then(|view| view.display_media())
                .map(Media::media_type),
            upon_selection: upon,
            selection_state: state,
            actions,
            from_touch,
        }
    }

    fn upon_selection(&self, position: Point, from_touch: bool) -> UponSelection {
        if self.selection.is_empty() {
            return UponSelection::NoSelection;
        }
        let (upon, has_selected) = if self.selection.in_items_mode() {
            let over = self
                .mouse
                .hovered
                .is_some_and(|id| self.selection.is_selected(id));
            let upon = if over {
                UponSelection::OverItems
            } else {
                UponSelection::OutsideItems
            };
            (upon, UponSelection::OverItems)
        } else {
            let mut upon = UponSelection::OutsideText;
            let has_selected = match self.selection.text_selection() {
                Some((_, range)) if !range.is_empty() => UponSelection::OverText,
                _ => UponSelection::NoSelection,
            };
            if let Some(id) = self.mouse.moused
                && self.mouse.hovered == Some(id)
                && let Some(top) = self.timeline.item_top(id)
            {
                let local = self.content_point(position) - Point::new(0, top);
                let over = self
                    .item_text_state(id, local, StateRequest::with_symbol())
                    .is_some_and(|state| {
                        state.cursor == CursorState::InText
                            && self.is_upon_text_selection(id, state.symbol)
                    });
                if over {
                    upon = UponSelection::OverText;
                }
            }
            (upon, has_selected)
        };
        if from_touch && has_selected != UponSelection::NoSelection && upon < has_selected {
            return has_selected;
        }
        upon
    }

    fn media_link(&self, link: &Link) -> Option<MediaLink<'_>> {
        let id = match link {
            Link::OpenMedia(id) | Link::Download(id) | Link::CancelDownload(id) => *id,
            _ => return None,
        };
        let media = self.timeline.view(id)?.media()?;
        match media.kind() {
            MediaKind::Photo(_) => Some(MediaLink::Photo),
            _ if media.document().is_some() => Some(MediaLink::Document(media)),
            _ => None,
        }
    }

    fn document_actions(media: &Media, actions: &mut Vec<ContextAction>) {
        let Some(document) = media.document() else {
            return;
        };
        if document.status.is_loading() {
            actions.push(ContextAction::CancelDownload);
            return;
        }
        if document.status.is_ready() && matches!(document.kind, DocumentKind::Gif { .. }) {
            actions.push(ContextAction::OpenGif);
            actions.push(ContextAction::SaveGif);
        }
        if document.local_path.is_some() {
            actions.push(ContextAction::ShowInFolder);
        }
        actions.push(ContextAction::SaveFile);
    }

    /// Runs the actions the list can do on its own. Returns `false` for
    /// actions the host has to carry out.
    pub fn perform_context_action(&mut self, action: ContextAction) -> bool {
        let target = self.context_target.clone().unwrap_or_default();
        match action {
            ContextAction::CopySelected | ContextAction::CopySelectedItems => {
                self.copy_selected_text();
                true
            }
            ContextAction::CopyLink => self.copy_context_url(),
            ContextAction::CopyText => match target.item {
                Some(id) => self.copy_context_text(id),
                None => false,
            },
            ContextAction::Select => match target.item {
                Some(id) => {
                    self.change_selection_as_group(id, SelectAction::Select);
                    true
                }
                None => false,
            },
            ContextAction::ClearSelection => {
                self.clear_selected_items(false);
                true
            }
            other => {
                tracing::trace!(action = %other, "context action left to the host");
                false
            }
        }
    }

    /// Copies the text of the link the last menu was opened on.
    pub fn copy_context_url(&mut self) -> bool {
        let text = self
            .context_target
            .as_ref()
            .and_then(|target| target.link.as_ref())
            .and_then(Link::copy_text);
        match text {
            Some(text) => {
                self.host.set_clipboard(TextWithEntities::plain(text));
                true
            }
            None => false,
        }
    }

    fn copy_context_text(&mut self, id: ItemId) -> bool {
        let Some(view) = self.timeline.view(id) else {
            return false;
        };
        let text = view.selected_text(TextSelection::FULL);
        if text.is_empty() {
            return false;
        }
        self.host.set_clipboard(text);
        true
    }
}
