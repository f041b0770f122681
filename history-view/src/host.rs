//! Collaborator traits implemented by the hosting widget.
//!
//! The view calls upward through [`HistoryHost`] and draws through
//! [`Surface`]. Neither trait gives the host access to the view's state, so a
//! host can never mutate selection or geometry from a callback.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::context_menu::ContextMenuRequest;
use crate::geometry::Point;
use crate::geometry::Rect;
use crate::geometry::RectParts;
use crate::geometry::Size;
use crate::hit_test::Link;
use crate::item::ItemId;
use crate::item::SenderId;
use crate::mouse::MouseButton;
use crate::selection::SelectionState;
use crate::text::TextSelection;
use crate::text::TextWithEntities;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Default,
    Pointer,
    Text,
}

/// What a drag started inside the list carries to the drop target.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DragPayload {
    pub text: Option<TextWithEntities>,
    pub forward: Option<ForwardPayload>,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardPayload {
    /// Every selected message.
    Selected,
    /// The pressed message itself.
    Pressed(ItemId),
    /// The message owning the pressed media link.
    PressedLink(ItemId),
}

/// Upward notifications. Every method has a no-op default.
pub trait HistoryHost {
    fn repaint(&mut self) {}

    /// `rect` is in content coordinates.
    fn repaint_item(&mut self, _item: ItemId, _rect: Rect) {}

    fn set_cursor(&mut self, _cursor: CursorShape) {}

    fn activate_link(&mut self, _link: &Link, _button: MouseButton) {}

    fn start_drag(&mut self, _payload: DragPayload) {}

    fn show_context_menu(&mut self, _request: ContextMenuRequest) {}

    fn set_clipboard(&mut self, _text: TextWithEntities) {}

    /// Scrolls the viewport by `delta` pixels. Returns whether anything moved.
    fn touch_scroll(&mut self, _delta: Point) -> bool {
        false
    }

    fn selection_changed(&mut self, _state: SelectionState) {}

    /// A selection drag is active; the host may autoscroll near its edges.
    fn check_selecting_scroll(&mut self) {}

    fn no_selecting_scroll(&mut self) {}

    /// The content height changed.
    fn resize(&mut self, _size: Size) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Selection,
    Bubble { outgoing: bool, selected: bool },
    Service,
    MediaPlaceholder,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageSource {
    Photo(u64),
    DocumentThumb(u64),
    /// Current frame of an inline-playing animation.
    InlineFrame { document: u64, elapsed_ms: u64 },
    Map { latitude: f64, longitude: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Download,
    Cancel,
    Play,
    Pause,
    File,
    Audio,
    Voice,
    Contact,
    Call { missed: bool, video: bool },
}

/// Host-owned offscreen frame produced by [`Surface::rasterize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Drawing target. Rectangles are in the surface's own coordinates.
pub trait Surface {
    fn fill(&mut self, rect: Rect, fill: Fill);

    fn draw_text(&mut self, text: &TextWithEntities, rect: Rect, selection: TextSelection);

    fn draw_image(&mut self, image: ImageSource, rect: Rect, corners: RectParts);

    fn draw_icon(&mut self, icon: Icon, rect: Rect);

    fn draw_userpic(&mut self, sender: SenderId, rect: Rect);

    fn draw_date_badge(&mut self, date: NaiveDate, rect: Rect, opacity: f64);

    /// Paints into a new offscreen frame of `size`.
    fn rasterize(&mut self, size: Size, paint: &mut dyn FnMut(&mut dyn Surface)) -> FrameHandle;

    fn blit(&mut self, frame: FrameHandle, rect: Rect);
}
