//! Core of a virtualized chat history list.
//!
//! A [`HistoryInner`] lays out one conversation (optionally preceded by the
//! history it was migrated from), answers geometry queries in logarithmic
//! time, walks only the visible views when painting, and turns pointer and
//! touch input into hover, link activation, text and item selection, drag-out
//! and context menu requests. Rendering, text shaping and every side effect
//! go through the [`HistoryHost`], [`Surface`] and [`TextEngine`] traits.

// Hosts own stdout/stderr; the library only logs through `tracing`.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod context_menu;
mod cursor;
pub mod enumerate;
pub mod geometry;
pub mod history;
pub mod host;
mod inner;
pub mod item;
pub mod media;
pub mod mouse;
mod paint;
pub mod scroll_date;
pub mod selection;
pub mod text;
pub mod timeline;
pub mod timer;
pub mod touch;
pub mod view;

pub use config::HistoryViewConfig;
pub use context_menu::ContextAction;
pub use context_menu::ContextMenuRequest;
pub use enumerate::Direction;
pub use history::History;
pub use history::HistoryKind;
pub use host::HistoryHost;
pub use host::Surface;
pub use inner::HistoryInner;
pub use item::Item;
pub use item::ItemId;
pub use mouse::Modifiers;
pub use mouse::MouseButton;
pub use selection::SelectionState;
pub use text::TextEngine;
pub use text::TextSelection;
pub use timeline::Timeline;
pub use touch::TouchPhase;
