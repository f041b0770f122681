//! Message records as handed to the view by the data layer.
//!
//! Items are immutable here. The only mutation the view performs is replacing
//! the media payload when the data layer reports a download status change.

use std::path::PathBuf;

use chrono::NaiveDate;
use chrono::NaiveDateTime;

use crate::text::TextWithEntities;

/// Stable message identity. Non-positive ids belong to local messages that
/// are not yet confirmed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub i64);

impl ItemId {
    pub fn is_server(self) -> bool {
        self.0 > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SenderId(pub i64);

/// Album identity shared by every message sent as one media group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    pub service: bool,
    pub outgoing: bool,
    pub can_delete: bool,
    pub can_forward: bool,
    /// Marks the service message that links a migrated group with the
    /// supergroup that replaced it.
    pub group_migrate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub date: NaiveDateTime,
    pub sender: SenderId,
    pub author: String,
    pub text: TextWithEntities,
    pub media: Option<MediaContent>,
    pub group: Option<GroupId>,
    pub flags: ItemFlags,
}

impl Item {
    pub fn new(id: ItemId, date: NaiveDateTime, sender: SenderId) -> Self {
        Self {
            id,
            date,
            sender,
            author: String::new(),
            text: TextWithEntities::default(),
            media: None,
            group: None,
            flags: ItemFlags {
                can_delete: true,
                can_forward: true,
                ..Default::default()
            },
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = TextWithEntities::plain(text);
        self
    }

    pub fn with_rich_text(mut self, text: TextWithEntities) -> Self {
        self.text = text;
        self
    }

    pub fn with_media(mut self, media: MediaContent) -> Self {
        self.media = Some(media);
        self
    }

    pub fn with_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_flags(mut self, flags: ItemFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn service(mut self) -> Self {
        self.flags.service = true;
        self.flags.can_forward = false;
        self
    }

    pub fn outgoing(mut self) -> Self {
        self.flags.outgoing = true;
        self
    }

    pub fn is_service(&self) -> bool {
        self.flags.service
    }

    /// A placeholder for a message whose content is not available.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.media.is_none() && !self.flags.service
    }

    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DownloadStatus {
    #[default]
    Remote,
    Loading {
        received: u64,
    },
    Ready,
}

impl DownloadStatus {
    pub fn is_ready(self) -> bool {
        self == DownloadStatus::Ready
    }

    pub fn is_loading(self) -> bool {
        matches!(self, DownloadStatus::Loading { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaContent {
    Photo(PhotoData),
    Document(DocumentData),
    Contact(ContactData),
    Call(CallData),
    Location(LocationData),
    WebPage(WebPageData),
    Game(GameData),
    Invoice(InvoiceData),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhotoData {
    pub id: u64,
    pub width: i32,
    pub height: i32,
    pub status: DownloadStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentKind {
    File,
    Video { width: i32, height: i32, round: bool },
    Gif { width: i32, height: i32 },
    Sticker { emoji: String, width: i32, height: i32 },
    Audio { performer: String, title: String },
    Voice { duration_secs: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentData {
    pub id: u64,
    pub name: String,
    pub size_bytes: u64,
    pub kind: DocumentKind,
    pub status: DownloadStatus,
    pub local_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactData {
    pub user: Option<SenderId>,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Answered { duration_secs: u32 },
    Missed,
    Declined,
    Busy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallData {
    pub outcome: CallOutcome,
    pub video: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationData {
    pub latitude: f64,
    pub longitude: f64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebPageData {
    pub url: String,
    pub site_name: String,
    pub title: String,
    pub description: TextWithEntities,
    pub photo: Option<PhotoData>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameData {
    pub short_name: String,
    pub title: String,
    pub description: String,
    pub photo: Option<PhotoData>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceData {
    pub title: String,
    pub description: String,
    pub amount: String,
    pub receipt: bool,
}
