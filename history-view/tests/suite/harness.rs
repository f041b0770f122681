//! Shared fixtures: a host and a surface that record every call, plus a flat
//! style where bubbles hug their text.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use std::time::Instant;

use chrono::NaiveDate;
use chrono::NaiveDateTime;
use history_view::ContextMenuRequest;
use history_view::History;
use history_view::HistoryHost;
use history_view::HistoryInner;
use history_view::HistoryKind;
use history_view::HistoryViewConfig;
use history_view::Item;
use history_view::ItemId;
use history_view::MouseButton;
use history_view::SelectionState;
use history_view::Surface;
use history_view::Timeline;
use history_view::config::Style;
use history_view::geometry::Point;
use history_view::geometry::Rect;
use history_view::geometry::RectParts;
use history_view::geometry::Size;
use history_view::hit_test::Link;
use history_view::host::CursorShape;
use history_view::host::DragPayload;
use history_view::host::Fill;
use history_view::host::FrameHandle;
use history_view::host::Icon;
use history_view::host::ImageSource;
use history_view::item::SenderId;
use history_view::text::MonospaceTextEngine;
use history_view::text::TextSelection;
use history_view::text::TextWithEntities;

pub const WIDTH: i32 = 400;

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Cursor(CursorShape),
    Activate(Link, MouseButton),
    Drag(DragPayload),
    ContextMenu(ContextMenuRequest),
    Clipboard(String),
    TouchScroll(Point),
    SelectionChanged(SelectionState),
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub events: Vec<HostEvent>,
    pub repaints: usize,
    pub size: Option<Size>,
}

#[derive(Clone, Default)]
pub struct RecordingHost(pub Rc<RefCell<Recorded>>);

impl RecordingHost {
    pub fn events(&self) -> Vec<HostEvent> {
        self.0.borrow().events.clone()
    }

    pub fn take_events(&self) -> Vec<HostEvent> {
        std::mem::take(&mut self.0.borrow_mut().events)
    }

    pub fn context_menus(&self) -> Vec<ContextMenuRequest> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::ContextMenu(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: HostEvent) {
        self.0.borrow_mut().events.push(event);
    }
}

impl HistoryHost for RecordingHost {
    fn repaint(&mut self) {
        self.0.borrow_mut().repaints += 1;
    }

    fn repaint_item(&mut self, _item: ItemId, _rect: Rect) {
        self.0.borrow_mut().repaints += 1;
    }

    fn set_cursor(&mut self, cursor: CursorShape) {
        self.push(HostEvent::Cursor(cursor));
    }

    fn activate_link(&mut self, link: &Link, button: MouseButton) {
        self.push(HostEvent::Activate(link.clone(), button));
    }

    fn start_drag(&mut self, payload: DragPayload) {
        self.push(HostEvent::Drag(payload));
    }

    fn show_context_menu(&mut self, request: ContextMenuRequest) {
        self.push(HostEvent::ContextMenu(request));
    }

    fn set_clipboard(&mut self, text: TextWithEntities) {
        self.push(HostEvent::Clipboard(text.text));
    }

    fn touch_scroll(&mut self, delta: Point) -> bool {
        self.push(HostEvent::TouchScroll(delta));
        true
    }

    fn selection_changed(&mut self, state: SelectionState) {
        self.push(HostEvent::SelectionChanged(state));
    }

    fn resize(&mut self, size: Size) {
        self.0.borrow_mut().size = Some(size);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Drawn {
    Text {
        text: String,
        rect: Rect,
        selection: TextSelection,
    },
    Date {
        date: NaiveDate,
        rect: Rect,
        opacity: f64,
    },
    Userpic {
        sender: SenderId,
        rect: Rect,
    },
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub drawn: Vec<Drawn>,
    frames: u64,
}

impl RecordingSurface {
    pub fn texts(&self) -> Vec<(String, Rect, TextSelection)> {
        self.drawn
            .iter()
            .filter_map(|drawn| match drawn {
                Drawn::Text {
                    text,
                    rect,
                    selection,
                } => Some((text.clone(), *rect, *selection)),
                _ => None,
            })
            .collect()
    }

    pub fn userpics(&self) -> Vec<(SenderId, Rect)> {
        self.drawn
            .iter()
            .filter_map(|drawn| match drawn {
                Drawn::Userpic { sender, rect } => Some((*sender, *rect)),
                _ => None,
            })
            .collect()
    }

    pub fn dates(&self) -> Vec<(NaiveDate, Rect, f64)> {
        self.drawn
            .iter()
            .filter_map(|drawn| match drawn {
                Drawn::Date {
                    date,
                    rect,
                    opacity,
                } => Some((*date, *rect, *opacity)),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn fill(&mut self, _rect: Rect, _fill: Fill) {}

    fn draw_text(&mut self, text: &TextWithEntities, rect: Rect, selection: TextSelection) {
        self.drawn.push(Drawn::Text {
            text: text.text.clone(),
            rect,
            selection,
        });
    }

    fn draw_image(&mut self, _image: ImageSource, _rect: Rect, _corners: RectParts) {}

    fn draw_icon(&mut self, _icon: Icon, _rect: Rect) {}

    fn draw_userpic(&mut self, sender: SenderId, rect: Rect) {
        self.drawn.push(Drawn::Userpic { sender, rect });
    }

    fn draw_date_badge(&mut self, date: NaiveDate, rect: Rect, opacity: f64) {
        self.drawn.push(Drawn::Date {
            date,
            rect,
            opacity,
        });
    }

    fn rasterize(&mut self, _size: Size, paint: &mut dyn FnMut(&mut dyn Surface)) -> FrameHandle {
        paint(self);
        self.frames += 1;
        FrameHandle(self.frames)
    }

    fn blit(&mut self, _frame: FrameHandle, _rect: Rect) {}
}

/// Bubbles without margins, paddings or a time badge, and no date
/// separators, so every view is exactly as tall as its text.
pub fn flat_config() -> HistoryViewConfig {
    let mut config = HistoryViewConfig::new();
    config.style = Style {
        history_padding_bottom: 0,
        msg_margin_left: 0,
        msg_margin_right: 0,
        msg_margin_top: 0,
        msg_margin_top_attached: 0,
        msg_margin_bottom: 0,
        msg_padding_horizontal: 0,
        msg_padding_top: 0,
        msg_padding_bottom: 0,
        msg_info_width: 0,
        msg_info_height: 0,
        service_margin_top: 0,
        service_margin_bottom: 0,
        date_badge_height: 0,
        ..Style::default()
    };
    config
}

pub fn at(minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 3)
        .and_then(|date| date.and_hms_opt(12, minute, 0))
        .unwrap_or_default()
}

pub fn text_item(id: i64, text: &str) -> Item {
    let minute = u32::try_from(id.rem_euclid(60)).unwrap_or_default();
    Item::new(ItemId(id), at(minute), SenderId(1))
        .with_author("Ann")
        .with_text(text)
}

/// Ten pixel wide characters on twenty pixel lines.
pub fn engine() -> MonospaceTextEngine {
    MonospaceTextEngine::new(10, 20)
}

pub struct Fixture {
    pub inner: HistoryInner,
    pub host: RecordingHost,
    pub now: Instant,
}

impl Fixture {
    pub fn new(items: Vec<Item>, viewport: i32) -> Self {
        Self::with_config(items, viewport, flat_config())
    }

    /// Lays `items` out into one primary history and shows the top
    /// `viewport` pixels of the content.
    pub fn with_config(items: Vec<Item>, viewport: i32, config: HistoryViewConfig) -> Self {
        let mut history = History::new(HistoryKind::Primary, config.grouping.block_size);
        for item in items {
            history.push_back(item);
        }
        Self::from_history(history, viewport, config)
    }

    pub fn from_history(mut history: History, viewport: i32, config: HistoryViewConfig) -> Self {
        history.set_loaded_at_top(true);
        history.set_loaded_at_bottom(true);
        let host = RecordingHost::default();
        let mut inner = HistoryInner::new(
            Timeline::new(history, None),
            config,
            Box::new(engine()),
            Box::new(host.clone()),
        );
        let now = Instant::now();
        inner.recount_history_geometry(WIDTH, viewport);
        inner.visible_area_updated_at(0, viewport, now);
        Self { inner, host, now }
    }

    /// Moves the clock forward.
    pub fn advance(&mut self, millis: u64) -> Instant {
        self.now += Duration::from_millis(millis);
        self.now
    }
}

pub fn point(x: i32, y: i32) -> Point {
    Point::new(x, y)
}
