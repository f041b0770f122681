use chrono::NaiveDate;
use history_view::History;
use history_view::HistoryKind;
use history_view::ItemId;
use history_view::TextSelection;
use history_view::geometry::Rect;
use history_view::geometry::Size;
use history_view::host::Surface;
use history_view::item::SenderId;
use pretty_assertions::assert_eq;

use crate::suite::harness::Fixture;
use crate::suite::harness::RecordingSurface;
use crate::suite::harness::WIDTH;
use crate::suite::harness::flat_config;
use crate::suite::harness::text_item;

/// Two items of one day under a 20px date separator: item 1 at 0..60, item
/// 2 at 60..120.
fn dated_items() -> Fixture {
    let mut config = flat_config();
    config.style.date_badge_height = 20;
    Fixture::with_config(
        vec![
            text_item(1, "one two\nthree"),
            text_item(2, "four\nfive\nsix"),
        ],
        100,
        config,
    )
}

#[test]
fn paints_views_then_the_date_badge() {
    let mut fixture = dated_items();
    assert_eq!(fixture.inner.item_top(ItemId(2)), Some(60));
    fixture.inner.select_item(ItemId(2));

    let mut surface = RecordingSurface::default();
    let now = fixture.advance(1);
    fixture
        .inner
        .paint_at(&mut surface, Rect::new(0, 0, WIDTH, 120), now);

    assert_eq!(
        surface.texts(),
        vec![
            (
                "one two\nthree".to_string(),
                Rect::new(0, 20, 70, 40),
                TextSelection::default()
            ),
            (
                "four\nfive\nsix".to_string(),
                Rect::new(0, 60, 40, 60),
                TextSelection::FULL
            ),
        ]
    );
    let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap_or_default();
    // "3 June 2024" plus the badge padding on both sides.
    assert_eq!(surface.dates(), vec![(day, Rect::new(137, 0, 126, 20), 1.0)]);
}

#[test]
fn clip_limits_the_painted_views() {
    let mut fixture = dated_items();
    let mut surface = RecordingSurface::default();
    let now = fixture.advance(1);
    fixture
        .inner
        .paint_at(&mut surface, Rect::new(0, 70, WIDTH, 30), now);

    let texts: Vec<String> = surface.texts().into_iter().map(|(text, ..)| text).collect();
    assert_eq!(texts, vec!["four\nfive\nsix".to_string()]);
}

#[test]
fn empty_clip_paints_nothing() {
    let mut fixture = dated_items();
    let mut surface = RecordingSurface::default();
    let now = fixture.advance(1);
    fixture
        .inner
        .paint_at(&mut surface, Rect::new(0, 0, 0, 0), now);
    assert!(surface.drawn.is_empty());
}

#[test]
fn rasterized_frames_record_into_the_same_surface() {
    let fixture = dated_items();
    let mut surface = RecordingSurface::default();
    let now = fixture.now;
    let frame = surface.rasterize(Size::new(WIDTH, 60), &mut |target| {
        fixture
            .inner
            .paint_at(target, Rect::new(0, 0, WIDTH, 60), now);
    });
    assert_eq!(frame.0, 1);
    assert_eq!(surface.texts().len(), 1);
}

#[test]
fn one_userpic_per_run_of_incoming_messages() {
    let config = flat_config();
    let mut history =
        History::new(HistoryKind::Primary, config.grouping.block_size).with_userpics(true);
    history.push_back(text_item(1, "one"));
    history.push_back(text_item(2, "two"));
    let mut fixture = Fixture::from_history(history, 100, config);
    let photo_size = fixture.inner.config().style.photo_size;

    let mut surface = RecordingSurface::default();
    let now = fixture.advance(1);
    fixture
        .inner
        .paint_at(&mut surface, Rect::new(0, 0, WIDTH, 100), now);

    let userpics = surface.userpics();
    assert_eq!(userpics.len(), 1);
    assert_eq!(userpics[0].0, SenderId(1));
    assert_eq!(userpics[0].1.size(), Size::new(photo_size, photo_size));
}
