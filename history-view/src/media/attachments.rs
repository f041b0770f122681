//! Payloads of the individual attachment variants.

use std::time::Instant;

use crate::hit_test::Link;
use crate::item::CallData;
use crate::item::CallOutcome;
use crate::item::ContactData;
use crate::item::DocumentData;
use crate::item::DownloadStatus;
use crate::item::GameData;
use crate::item::InvoiceData;
use crate::item::ItemId;
use crate::item::LocationData;
use crate::item::PhotoData;
use crate::item::WebPageData;
use crate::media::text_parts::TextParts;
use crate::text::TextWithEntities;

#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub(crate) data: PhotoData,
}

/// Video and GIF payload. Round videos and GIFs play inline inside the list.
#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub(crate) document: DocumentData,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) round: bool,
    pub(crate) playing_since: Option<Instant>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sticker {
    pub(crate) document: DocumentData,
    pub(crate) emoji: String,
    pub(crate) width: i32,
    pub(crate) height: i32,
}

/// Files, audio tracks and voice messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub(crate) data: DocumentData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub(crate) data: ContactData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub(crate) data: CallData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub(crate) data: LocationData,
    pub(crate) parts: TextParts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebPage {
    pub(crate) data: WebPageData,
    pub(crate) parts: TextParts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub(crate) data: GameData,
    pub(crate) parts: TextParts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub(crate) data: InvoiceData,
    pub(crate) parts: TextParts,
}

impl Location {
    pub(crate) fn new(data: LocationData) -> Self {
        let parts = TextParts::new([
            TextWithEntities::plain(data.title.clone()),
            TextWithEntities::plain(data.description.clone()),
        ]);
        Self { data, parts }
    }

    pub(crate) fn link(&self) -> Link {
        Link::OpenLocation {
            latitude: self.data.latitude,
            longitude: self.data.longitude,
        }
    }
}

impl WebPage {
    pub(crate) fn new(data: WebPageData) -> Self {
        let parts = TextParts::new([
            TextWithEntities::plain(data.site_name.clone()),
            TextWithEntities::plain(data.title.clone()),
            data.description.clone(),
        ]);
        Self { data, parts }
    }
}

impl Game {
    pub(crate) fn new(data: GameData) -> Self {
        let parts = TextParts::new([
            TextWithEntities::plain(data.title.clone()),
            TextWithEntities::plain(data.description.clone()),
        ]);
        Self { data, parts }
    }
}

impl Invoice {
    pub(crate) fn new(data: InvoiceData) -> Self {
        let parts = TextParts::new([
            TextWithEntities::plain(data.title.clone()),
            TextWithEntities::plain(data.description.clone()),
        ]);
        Self { data, parts }
    }

    pub(crate) fn status_label(&self) -> String {
        if self.data.receipt {
            format!("{} receipt", self.data.amount)
        } else {
            format!("{} invoice", self.data.amount)
        }
    }
}

impl Call {
    pub(crate) fn label(&self) -> String {
        let kind = if self.data.video { "Video call" } else { "Call" };
        match self.data.outcome {
            CallOutcome::Answered { duration_secs } => {
                format!("{kind} ({}:{:02})", duration_secs / 60, duration_secs % 60)
            }
            CallOutcome::Missed => format!("Missed {}", kind.to_lowercase()),
            CallOutcome::Declined => format!("Declined {}", kind.to_lowercase()),
            CallOutcome::Busy => format!("{kind} (busy)"),
        }
    }
}

/// Link of a downloadable attachment: open when present locally, otherwise
/// start or cancel the download.
pub(crate) fn attachment_link(parent: ItemId, status: DownloadStatus) -> Link {
    match status {
        DownloadStatus::Ready => Link::OpenMedia(parent),
        DownloadStatus::Loading { .. } => Link::CancelDownload(parent),
        DownloadStatus::Remote => Link::Download(parent),
    }
}

pub(crate) fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
