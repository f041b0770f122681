//! Text pieces, selection ranges and the text layout collaborator.
//!
//! Offsets are counted in `char`s and stored as `u16`. `0xFFFF` is reserved:
//! `TextSelection::FULL` uses it in both ends to mean "the whole item", and an
//! album selection keeps `from == 0xFFFF` while `to` carries one bit per
//! selected album part.

use unicode_segmentation::UnicodeSegmentation;

use crate::geometry::Point;
use crate::hit_test::Link;
use crate::hit_test::StateRequest;

/// Largest addressable text offset.
pub const MAX_TEXT_SYMBOLS: u16 = 0xFFFE;

const SELECTION_SENTINEL: u16 = 0xFFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextSelection {
    pub from: u16,
    pub to: u16,
}

impl TextSelection {
    pub const FULL: TextSelection = TextSelection {
        from: SELECTION_SENTINEL,
        to: SELECTION_SENTINEL,
    };

    pub const fn new(from: u16, to: u16) -> Self {
        Self { from, to }
    }

    pub fn is_full(self) -> bool {
        self == Self::FULL
    }

    pub fn is_empty(self) -> bool {
        self.from == self.to
    }

    /// Selection of some parts of an album, one bit per part index.
    pub fn is_sub_group(self) -> bool {
        self.from == SELECTION_SENTINEL && self.to != SELECTION_SENTINEL
    }

    pub fn has_group_item(self, index: usize) -> bool {
        self.is_sub_group() && index < 16 && self.to & (1 << index) != 0
    }

    pub fn with_group_item(self, index: usize) -> TextSelection {
        let bit = 1u16 << index;
        let to = if self.is_sub_group() {
            self.to | bit
        } else {
            bit
        };
        TextSelection::new(SELECTION_SENTINEL, to)
    }

    /// Moves a range that starts after a piece of `by` symbols into the space
    /// that includes that piece.
    pub fn shifted(self, by: u16) -> TextSelection {
        if self.from == SELECTION_SENTINEL {
            return self;
        }
        TextSelection::new(
            self.from.saturating_add(by).min(MAX_TEXT_SYMBOLS),
            self.to.saturating_add(by).min(MAX_TEXT_SYMBOLS),
        )
    }

    /// Inverse of [`TextSelection::shifted`]: drops a leading piece of `by`
    /// symbols, clamping positions inside it to zero.
    pub fn unshifted(self, by: u16) -> TextSelection {
        if self.from == SELECTION_SENTINEL {
            return self;
        }
        TextSelection::new(self.from.saturating_sub(by), self.to.saturating_sub(by))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextSelectType {
    #[default]
    Letters,
    Words,
    Paragraphs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Url,
    CustomUrl(String),
    Email,
    Mention,
    Hashtag,
    BotCommand,
    Bold,
    Italic,
    Code,
    Pre,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInText {
    pub kind: EntityKind,
    pub offset: u16,
    pub length: u16,
}

impl EntityInText {
    pub fn new(kind: EntityKind, offset: u16, length: u16) -> Self {
        Self {
            kind,
            offset,
            length,
        }
    }

    fn end(&self) -> u16 {
        self.offset.saturating_add(self.length)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextWithEntities {
    pub text: String,
    pub entities: Vec<EntityInText>,
}

impl TextWithEntities {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            entities: Vec::new(),
        }
    }

    pub fn with_entity(mut self, entity: EntityInText) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn len_symbols(&self) -> u16 {
        let count = self.text.chars().count();
        u16::try_from(count)
            .unwrap_or(MAX_TEXT_SYMBOLS)
            .min(MAX_TEXT_SYMBOLS)
    }

    pub fn append(&mut self, other: TextWithEntities) {
        let offset = self.len_symbols();
        self.text.push_str(&other.text);
        self.entities
            .extend(other.entities.into_iter().map(|entity| EntityInText {
                offset: entity.offset.saturating_add(offset),
                ..entity
            }));
    }

    pub fn append_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// The selected part of this text with the entities clipped to it.
    pub fn slice(&self, selection: TextSelection) -> TextWithEntities {
        if selection.is_full() {
            return self.clone();
        }
        if selection.is_sub_group() {
            return TextWithEntities::default();
        }
        let len = self.len_symbols();
        let from = selection.from.min(len);
        let to = selection.to.min(len);
        if from >= to {
            return TextWithEntities::default();
        }
        let text = self
            .text
            .chars()
            .skip(usize::from(from))
            .take(usize::from(to - from))
            .collect();
        let entities = self
            .entities
            .iter()
            .filter(|entity| entity.offset < to && entity.end() > from)
            .map(|entity| {
                let start = entity.offset.max(from);
                let end = entity.end().min(to);
                EntityInText::new(entity.kind.clone(), start - from, end - start)
            })
            .collect();
        TextWithEntities { text, entities }
    }

    /// Expands a range to whole words or paragraphs.
    pub fn adjust_selection(
        &self,
        selection: TextSelection,
        kind: TextSelectType,
    ) -> TextSelection {
        if kind == TextSelectType::Letters || selection.from == SELECTION_SENTINEL {
            return selection;
        }
        let len = self.len_symbols();
        let from = selection.from.min(len);
        let to = selection.to.min(len).max(from);
        match kind {
            TextSelectType::Letters => selection,
            TextSelectType::Words => {
                let bounds = self.word_bounds();
                let containing = |symbol: u16| {
                    bounds
                        .iter()
                        .copied()
                        .find(|&(start, end)| start <= symbol && symbol < end)
                };
                let new_from = containing(from).map_or(from, |(start, _)| start);
                let last = if to > from { to - 1 } else { from };
                let new_to = containing(last).map_or(to, |(_, end)| end.max(to));
                TextSelection::new(new_from, new_to)
            }
            TextSelectType::Paragraphs => {
                let chars: Vec<char> = self.text.chars().take(usize::from(len)).collect();
                let new_from = chars[..usize::from(from)]
                    .iter()
                    .rposition(|&ch| ch == '\n')
                    .map_or(0, |index| index + 1);
                let last = usize::from(if to > from { to - 1 } else { from });
                let new_to = chars
                    .iter()
                    .enumerate()
                    .skip(last)
                    .find(|(_, ch)| **ch == '\n')
                    .map_or(chars.len(), |(index, _)| index);
                TextSelection::new(clamp_symbol(new_from), clamp_symbol(new_to.max(usize::from(to))))
            }
        }
    }

    /// Link carried by an entity covering `symbol`, if any.
    pub fn link_at(&self, symbol: u16) -> Option<Link> {
        let entity = self
            .entities
            .iter()
            .find(|entity| entity.offset <= symbol && symbol < entity.end())?;
        let covered = || {
            self.slice(TextSelection::new(entity.offset, entity.end()))
                .text
        };
        match &entity.kind {
            EntityKind::Url => Some(Link::Url(covered())),
            EntityKind::CustomUrl(url) => Some(Link::Url(url.clone())),
            EntityKind::Email => Some(Link::Url(format!("mailto:{}", covered()))),
            EntityKind::Mention => Some(Link::Mention(covered())),
            EntityKind::Hashtag => Some(Link::Hashtag(covered())),
            EntityKind::BotCommand
            | EntityKind::Bold
            | EntityKind::Italic
            | EntityKind::Code
            | EntityKind::Pre => None,
        }
    }

    fn word_bounds(&self) -> Vec<(u16, u16)> {
        let mut bounds = Vec::new();
        let mut start = 0u16;
        for word in self.text.split_word_bounds() {
            let length = clamp_symbol(word.chars().count());
            let end = start.saturating_add(length).min(MAX_TEXT_SYMBOLS);
            bounds.push((start, end));
            if end == MAX_TEXT_SYMBOLS {
                break;
            }
            start = end;
        }
        bounds
    }
}

fn clamp_symbol(value: usize) -> u16 {
    u16::try_from(value)
        .unwrap_or(MAX_TEXT_SYMBOLS)
        .min(MAX_TEXT_SYMBOLS)
}

/// Result of hit-testing laid out text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextHit {
    pub symbol: u16,
    pub after_symbol: bool,
    pub upon_symbol: bool,
    pub link: Option<Link>,
}

/// Text shaping and layout, provided by the host toolkit.
///
/// Points handed to [`TextEngine::hit_test`] are relative to the top-left
/// corner of the laid out text. Points above the text must resolve to symbol
/// `0` and points below it to the text length.
pub trait TextEngine {
    fn count_height(&self, text: &TextWithEntities, width: i32) -> i32;

    fn max_width(&self, text: &TextWithEntities) -> i32;

    fn hit_test(
        &self,
        text: &TextWithEntities,
        width: i32,
        point: Point,
        request: StateRequest,
    ) -> TextHit;
}

/// Fixed-pitch layout: every symbol is `char_width` wide and lines wrap at the
/// last symbol that fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonospaceTextEngine {
    pub char_width: i32,
    pub line_height: i32,
}

impl MonospaceTextEngine {
    pub fn new(char_width: i32, line_height: i32) -> Self {
        Self {
            char_width: char_width.max(1),
            line_height: line_height.max(1),
        }
    }

    fn rows(self, text: &TextWithEntities, width: i32) -> Vec<(u16, u16)> {
        if text.is_empty() {
            return Vec::new();
        }
        let per_row = usize::try_from((width / self.char_width).max(1)).unwrap_or(1);
        let mut rows = Vec::new();
        let mut offset = 0usize;
        for line in text.text.split('\n') {
            let length = line.chars().count();
            if length == 0 {
                rows.push((clamp_symbol(offset), clamp_symbol(offset)));
            }
            let mut start = 0;
            while start < length {
                let end = (start + per_row).min(length);
                rows.push((clamp_symbol(offset + start), clamp_symbol(offset + end)));
                start = end;
            }
            offset += length + 1;
        }
        rows
    }
}

impl Default for MonospaceTextEngine {
    fn default() -> Self {
        Self::new(8, 20)
    }
}

impl TextEngine for MonospaceTextEngine {
    fn count_height(&self, text: &TextWithEntities, width: i32) -> i32 {
        let rows = i32::try_from(self.rows(text, width).len()).unwrap_or(i32::MAX);
        rows.saturating_mul(self.line_height)
    }

    fn max_width(&self, text: &TextWithEntities) -> i32 {
        let longest = text
            .text
            .split('\n')
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        i32::try_from(longest)
            .unwrap_or(i32::MAX)
            .saturating_mul(self.char_width)
    }

    fn hit_test(
        &self,
        text: &TextWithEntities,
        width: i32,
        point: Point,
        request: StateRequest,
    ) -> TextHit {
        let rows = self.rows(text, width);
        let Some(&(_, last_end)) = rows.last() else {
            return TextHit::default();
        };
        if point.y < 0 {
            return TextHit::default();
        }
        let row = usize::try_from(point.y / self.line_height).unwrap_or(usize::MAX);
        let Some(&(start, end)) = rows.get(row) else {
            return TextHit {
                symbol: last_end.max(text.len_symbols()),
                ..Default::default()
            };
        };
        let column = point.x.max(0) / self.char_width;
        let column = u16::try_from(column).unwrap_or(u16::MAX);
        if column >= end - start {
            return TextHit {
                symbol: end,
                ..Default::default()
            };
        }
        let symbol = start + column;
        let upon_symbol = point.x >= 0;
        let after_symbol = upon_symbol && point.x % self.char_width >= self.char_width / 2;
        let link = if upon_symbol && request.lookup_link {
            text.link_at(symbol)
        } else {
            None
        };
        TextHit {
            symbol,
            after_symbol,
            upon_symbol,
            link,
        }
    }
}
