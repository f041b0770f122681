use std::time::Instant;

use chrono::NaiveDate;
use history_view::Direction;
use history_view::History;
use history_view::HistoryInner;
use history_view::HistoryKind;
use history_view::Item;
use history_view::ItemId;
use history_view::Timeline;
use history_view::host::HistoryHost;
use history_view::item::SenderId;
use pretty_assertions::assert_eq;

use crate::suite::harness::engine;
use crate::suite::harness::flat_config;
use crate::suite::harness::text_item;

struct NoHost;

impl HistoryHost for NoHost {}

fn yesterday_item(id: i64, text: &str) -> Item {
    let date = NaiveDate::from_ymd_opt(2024, 6, 2)
        .and_then(|date| date.and_hms_opt(9, 0, 0))
        .unwrap_or_default();
    Item::new(ItemId(id), date, SenderId(1)).with_text(text)
}

/// Migrated items 1 and 2 above primary items 3 and 4, twenty pixels each.
fn merged() -> HistoryInner {
    let config = flat_config();
    let mut migrated = History::new(HistoryKind::Migrated, config.grouping.block_size);
    migrated.push_back(yesterday_item(1, "old"));
    migrated.push_back(yesterday_item(2, "older"));
    migrated.set_loaded_at_bottom(true);
    let mut history = History::new(HistoryKind::Primary, config.grouping.block_size);
    history.push_back(text_item(3, "one"));
    history.push_back(text_item(4, "two"));
    history.set_loaded_at_top(true);
    history.set_loaded_at_bottom(true);

    let mut inner = HistoryInner::new(
        Timeline::new(history, Some(migrated)),
        config,
        Box::new(engine()),
        Box::new(NoHost),
    );
    inner.recount_history_geometry(400, 80);
    inner.visible_area_updated_at(0, 80, Instant::now());
    inner
}

fn visit(inner: &HistoryInner, direction: Direction, limit: usize) -> Vec<(i64, i32, i32)> {
    let mut visited = Vec::new();
    inner
        .timeline()
        .enumerate_items(direction, |view, top, bottom| {
            visited.push((view.id().0, top, bottom));
            visited.len() < limit
        });
    visited
}

#[test]
fn walks_both_histories_in_display_order() {
    let inner = merged();
    assert_eq!(inner.timeline().migrated_top(), Some(0));
    assert_eq!(inner.timeline().history_top(), Some(40));
    assert_eq!(
        visit(&inner, Direction::TopToBottom, usize::MAX),
        vec![(1, 0, 20), (2, 20, 40), (3, 40, 60), (4, 60, 80)]
    );
    assert_eq!(
        visit(&inner, Direction::BottomToTop, usize::MAX),
        vec![(4, 60, 80), (3, 40, 60), (2, 20, 40), (1, 0, 20)]
    );
}

#[test]
fn stopping_ends_the_walk_across_histories() {
    let inner = merged();
    assert_eq!(
        visit(&inner, Direction::TopToBottom, 1),
        vec![(1, 0, 20)]
    );
    assert_eq!(
        visit(&inner, Direction::BottomToTop, 3),
        vec![(4, 60, 80), (3, 40, 60), (2, 20, 40)]
    );
}

#[test]
fn visible_range_limits_the_walk() {
    let mut inner = merged();
    inner.visible_area_updated_at(25, 55, Instant::now());
    assert_eq!(
        visit(&inner, Direction::TopToBottom, usize::MAX),
        vec![(2, 20, 40), (3, 40, 60)]
    );
}

#[test]
fn dates_are_reported_once_per_day() {
    let inner = merged();
    let style = inner.config().style;
    let mut days = Vec::new();
    inner.timeline().enumerate_dates(&style, |view, _, _| {
        days.push(view.item().day());
        true
    });
    let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap_or_default();
    let yesterday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap_or_default();
    assert_eq!(days, vec![today, yesterday]);
}
