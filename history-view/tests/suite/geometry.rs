use history_view::HistoryKind;
use history_view::Item;
use history_view::ItemId;
use history_view::Timeline;
use pretty_assertions::assert_eq;

use crate::suite::harness::Fixture;
use crate::suite::harness::flat_config;
use crate::suite::harness::text_item;

/// The view containing `y`, found by walking every view.
fn linear_locate(timeline: &Timeline, y: i32) -> Option<ItemId> {
    timeline.history().views().find_map(|view| {
        let top = timeline.item_top(view.id())?;
        (view.height() > 0 && top <= y && y < top + view.height()).then_some(view.id())
    })
}

fn uneven_items() -> Vec<Item> {
    (1..=7)
        .map(|id| {
            let lines = usize::try_from(id % 3 + 1).unwrap_or(1);
            text_item(id, &vec!["line"; lines].join("\n"))
        })
        .collect()
}

#[test]
fn locate_matches_a_linear_scan_across_blocks() {
    let mut config = flat_config();
    config.grouping.block_size = 2;
    let mut fixture = Fixture::with_config(uneven_items(), 10, config);
    assert_eq!(fixture.inner.timeline().history().blocks().len(), 4);

    fixture.inner.remove_item(ItemId(3));
    fixture.inner.recount_history_geometry(400, 10);

    let timeline = fixture.inner.timeline();
    let height = timeline.history_height();
    assert!(height > 0);
    for y in 0..height {
        let located = timeline.locate(y).map(|located| located.item);
        assert_eq!(located, linear_locate(timeline, y), "y = {y}");
    }
}

#[test]
fn locate_clamps_while_view_at_y_is_strict() {
    let fixture = Fixture::new(uneven_items(), 10);
    let timeline = fixture.inner.timeline();
    let height = timeline.history_height();

    assert_eq!(timeline.locate(-5).map(|located| located.item), Some(ItemId(1)));
    assert_eq!(
        timeline.locate(height + 100).map(|located| located.item),
        Some(ItemId(7))
    );
    assert!(timeline.view_at_y(-5).is_none());
    assert!(timeline.view_at_y(height).is_none());
    assert_eq!(
        timeline.view_at_y(0).map(|(located, _)| located.item),
        Some(ItemId(1))
    );
}

#[test]
fn appended_items_get_laid_out_on_recount() {
    let mut fixture = Fixture::new(uneven_items(), 10);
    let before = fixture.inner.size().height;

    fixture
        .inner
        .push_back(HistoryKind::Primary, text_item(8, "tail"));
    fixture.inner.recount_history_geometry(400, 10);

    assert_eq!(fixture.inner.size().height, before + 20);
    assert_eq!(fixture.inner.item_top(ItemId(8)), Some(before));
    let resized = fixture.host.0.borrow().size;
    assert_eq!(resized, Some(fixture.inner.size()));
}

#[test]
fn short_content_sticks_to_the_bottom() {
    let fixture = Fixture::new(vec![text_item(1, "one")], 100);
    assert_eq!(fixture.inner.timeline().padding_top(), 80);
    assert_eq!(fixture.inner.item_top(ItemId(1)), Some(80));
    assert_eq!(fixture.inner.size().height, 100);
}
