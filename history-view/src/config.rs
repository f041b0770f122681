//! Tunable thresholds, timings and layout metrics.
//!
//! `history_view.toml` is read into the `*Toml` structs, whose fields are all
//! optional, and then resolved into [`HistoryViewConfig`] with the defaults
//! below applied.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_START_DRAG_DISTANCE: i32 = 10;
pub const DEFAULT_DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(400);
pub const DEFAULT_TOUCH_LONG_PRESS: Duration = Duration::from_millis(500);
pub const DEFAULT_TOUCH_SCROLL_TICK: Duration = Duration::from_millis(15);
pub const DEFAULT_TOUCH_ACCELERATION_WAIT: Duration = Duration::from_millis(40);
pub const DEFAULT_FINGER_ACCURACY_THRESHOLD: i32 = 3;
pub const DEFAULT_MAX_SCROLL_ACCELERATED: i32 = 4000;
pub const DEFAULT_MAX_SCROLL_FLICK: i32 = 2500;
pub const DEFAULT_DECELERATION_PER_MS: i32 = 1;
pub const DEFAULT_SCROLL_DATE_HIDE_TIMEOUT: Duration = Duration::from_millis(1000);
pub const DEFAULT_SCROLL_DATE_FADE: Duration = Duration::from_millis(200);
pub const DEFAULT_MAX_SELECTED_ITEMS: usize = 100;
pub const DEFAULT_ATTACH_TO_PREVIOUS_SECS: i64 = 900;
pub const DEFAULT_MAX_ALBUM_ITEMS: usize = 10;
pub const DEFAULT_BLOCK_SIZE: usize = 50;

/// Album selections store one bit per part in a `u16` whose all-ones value is
/// reserved.
const ALBUM_ITEMS_LIMIT: usize = 15;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse history view config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Root of `history_view.toml`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct HistoryViewConfigToml {
    pub interaction: Option<InteractionToml>,
    pub touch: Option<TouchToml>,
    pub scroll_date: Option<ScrollDateToml>,
    pub selection: Option<SelectionToml>,
    pub grouping: Option<GroupingToml>,
    pub style: Option<Style>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct InteractionToml {
    /// Pointer travel in pixels that turns a press into a drag.
    pub start_drag_distance: Option<i32>,
    /// Window in which a third click after a double click selects a paragraph.
    pub double_click_interval_ms: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct TouchToml {
    pub long_press_ms: Option<u64>,
    pub scroll_tick_ms: Option<u64>,
    pub acceleration_wait_ms: Option<u64>,
    /// Speeds below this many pixels per second on an axis are treated as finger jitter.
    pub finger_accuracy_threshold: Option<i32>,
    pub max_scroll_accelerated: Option<i32>,
    pub max_scroll_flick: Option<i32>,
    /// Pixels per second shed from the momentum speed every millisecond.
    pub deceleration_per_ms: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ScrollDateToml {
    pub hide_timeout_ms: Option<u64>,
    pub fade_ms: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct SelectionToml {
    pub max_selected_items: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GroupingToml {
    /// Consecutive messages of one sender closer than this attach to each other.
    pub attach_to_previous_secs: Option<i64>,
    pub max_album_items: Option<usize>,
    pub block_size: Option<usize>,
}

/// Effective interaction settings after defaults are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionConfig {
    pub start_drag_distance: i32,
    pub double_click_interval: Duration,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            start_drag_distance: DEFAULT_START_DRAG_DISTANCE,
            double_click_interval: DEFAULT_DOUBLE_CLICK_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchConfig {
    pub long_press: Duration,
    pub scroll_tick: Duration,
    pub acceleration_wait: Duration,
    pub finger_accuracy_threshold: i32,
    pub max_scroll_accelerated: i32,
    pub max_scroll_flick: i32,
    pub deceleration_per_ms: i32,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            long_press: DEFAULT_TOUCH_LONG_PRESS,
            scroll_tick: DEFAULT_TOUCH_SCROLL_TICK,
            acceleration_wait: DEFAULT_TOUCH_ACCELERATION_WAIT,
            finger_accuracy_threshold: DEFAULT_FINGER_ACCURACY_THRESHOLD,
            max_scroll_accelerated: DEFAULT_MAX_SCROLL_ACCELERATED,
            max_scroll_flick: DEFAULT_MAX_SCROLL_FLICK,
            deceleration_per_ms: DEFAULT_DECELERATION_PER_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollDateConfig {
    pub hide_timeout: Duration,
    pub fade: Duration,
}

impl Default for ScrollDateConfig {
    fn default() -> Self {
        Self {
            hide_timeout: DEFAULT_SCROLL_DATE_HIDE_TIMEOUT,
            fade: DEFAULT_SCROLL_DATE_FADE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingConfig {
    pub attach_to_previous_secs: i64,
    pub max_album_items: usize,
    pub block_size: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            attach_to_previous_secs: DEFAULT_ATTACH_TO_PREVIOUS_SECS,
            max_album_items: DEFAULT_MAX_ALBUM_ITEMS,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

/// Layout metrics in pixels.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Style {
    pub history_padding_bottom: i32,
    pub msg_margin_left: i32,
    pub msg_margin_right: i32,
    pub msg_margin_top: i32,
    pub msg_margin_top_attached: i32,
    pub msg_margin_bottom: i32,
    pub msg_padding_horizontal: i32,
    pub msg_padding_top: i32,
    pub msg_padding_bottom: i32,
    pub msg_max_width: i32,
    pub msg_info_width: i32,
    pub msg_info_height: i32,
    pub photo_size: i32,
    pub photo_skip: i32,
    pub service_margin_top: i32,
    pub service_margin_bottom: i32,
    pub service_padding_horizontal: i32,
    pub service_padding_vertical: i32,
    pub date_badge_height: i32,
    pub date_badge_padding: i32,
    pub media_min_size: i32,
    pub media_max_width: i32,
    pub media_max_height: i32,
    pub round_video_size: i32,
    pub sticker_max_size: i32,
    pub file_height: i32,
    pub contact_height: i32,
    pub call_height: i32,
    pub location_map_height: i32,
    pub web_page_photo_height: i32,
    pub album_spacing: i32,
    pub album_row_max_items: usize,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            history_padding_bottom: 8,
            msg_margin_left: 13,
            msg_margin_right: 13,
            msg_margin_top: 6,
            msg_margin_top_attached: 0,
            msg_margin_bottom: 6,
            msg_padding_horizontal: 13,
            msg_padding_top: 7,
            msg_padding_bottom: 8,
            msg_max_width: 430,
            msg_info_width: 48,
            msg_info_height: 16,
            photo_size: 33,
            photo_skip: 8,
            service_margin_top: 5,
            service_margin_bottom: 5,
            service_padding_horizontal: 8,
            service_padding_vertical: 3,
            date_badge_height: 22,
            date_badge_padding: 8,
            media_min_size: 100,
            media_max_width: 430,
            media_max_height: 430,
            round_video_size: 240,
            sticker_max_size: 256,
            file_height: 54,
            contact_height: 54,
            call_height: 42,
            location_map_height: 200,
            web_page_photo_height: 160,
            album_spacing: 2,
            album_row_max_items: 3,
        }
    }
}

impl Style {
    /// Height a date separator adds above the first message of a day.
    pub fn displayed_date_height(&self) -> i32 {
        self.service_margin_top + self.date_badge_height + self.service_margin_bottom
    }
}

/// Effective settings for one history view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryViewConfig {
    pub interaction: InteractionConfig,
    pub touch: TouchConfig,
    pub scroll_date: ScrollDateConfig,
    pub max_selected_items: usize,
    pub grouping: GroupingConfig,
    pub style: Style,
}

impl HistoryViewConfig {
    pub fn new() -> Self {
        Self::from_toml(HistoryViewConfigToml::default())
    }

    pub fn from_toml(toml: HistoryViewConfigToml) -> Self {
        let interaction = toml.interaction.unwrap_or_default();
        let touch = toml.touch.unwrap_or_default();
        let scroll_date = toml.scroll_date.unwrap_or_default();
        let selection = toml.selection.unwrap_or_default();
        let grouping = toml.grouping.unwrap_or_default();
        Self {
            interaction: InteractionConfig {
                start_drag_distance: interaction
                    .start_drag_distance
                    .unwrap_or(DEFAULT_START_DRAG_DISTANCE),
                double_click_interval: millis_or(
                    interaction.double_click_interval_ms,
                    DEFAULT_DOUBLE_CLICK_INTERVAL,
                ),
            },
            touch: TouchConfig {
                long_press: millis_or(touch.long_press_ms, DEFAULT_TOUCH_LONG_PRESS),
                scroll_tick: millis_or(touch.scroll_tick_ms, DEFAULT_TOUCH_SCROLL_TICK),
                acceleration_wait: millis_or(
                    touch.acceleration_wait_ms,
                    DEFAULT_TOUCH_ACCELERATION_WAIT,
                ),
                finger_accuracy_threshold: touch
                    .finger_accuracy_threshold
                    .unwrap_or(DEFAULT_FINGER_ACCURACY_THRESHOLD),
                max_scroll_accelerated: touch
                    .max_scroll_accelerated
                    .unwrap_or(DEFAULT_MAX_SCROLL_ACCELERATED),
                max_scroll_flick: touch.max_scroll_flick.unwrap_or(DEFAULT_MAX_SCROLL_FLICK),
                deceleration_per_ms: touch
                    .deceleration_per_ms
                    .unwrap_or(DEFAULT_DECELERATION_PER_MS),
            },
            scroll_date: ScrollDateConfig {
                hide_timeout: millis_or(
                    scroll_date.hide_timeout_ms,
                    DEFAULT_SCROLL_DATE_HIDE_TIMEOUT,
                ),
                fade: millis_or(scroll_date.fade_ms, DEFAULT_SCROLL_DATE_FADE),
            },
            max_selected_items: selection
                .max_selected_items
                .unwrap_or(DEFAULT_MAX_SELECTED_ITEMS),
            grouping: GroupingConfig {
                attach_to_previous_secs: grouping
                    .attach_to_previous_secs
                    .unwrap_or(DEFAULT_ATTACH_TO_PREVIOUS_SECS),
                max_album_items: grouping.max_album_items.unwrap_or(DEFAULT_MAX_ALBUM_ITEMS),
                block_size: grouping.block_size.unwrap_or(DEFAULT_BLOCK_SIZE),
            },
            style: toml.style.unwrap_or_default(),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let toml: HistoryViewConfigToml = toml::from_str(contents)?;
        let config = Self::from_toml(toml);
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded history view config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let zero_durations = [
            ("touch.scroll_tick_ms", self.touch.scroll_tick),
            ("touch.long_press_ms", self.touch.long_press),
            ("scroll_date.hide_timeout_ms", self.scroll_date.hide_timeout),
        ];
        for (field, duration) in zero_durations {
            if duration.is_zero() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        if self.interaction.start_drag_distance < 0 {
            return Err(ConfigError::Invalid {
                field: "interaction.start_drag_distance",
                reason: format!(
                    "must not be negative, got {}",
                    self.interaction.start_drag_distance
                ),
            });
        }
        if self.max_selected_items == 0 {
            return Err(ConfigError::Invalid {
                field: "selection.max_selected_items",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(2..=ALBUM_ITEMS_LIMIT).contains(&self.grouping.max_album_items) {
            return Err(ConfigError::Invalid {
                field: "grouping.max_album_items",
                reason: format!(
                    "must be between 2 and {ALBUM_ITEMS_LIMIT}, got {}",
                    self.grouping.max_album_items
                ),
            });
        }
        if self.grouping.block_size == 0 {
            return Err(ConfigError::Invalid {
                field: "grouping.block_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.style.album_row_max_items == 0 {
            return Err(ConfigError::Invalid {
                field: "style.album_row_max_items",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn millis_or(value: Option<u64>, default: Duration) -> Duration {
    value.map_or(default, Duration::from_millis)
}
