use history_view::ItemId;
use history_view::Modifiers;
use history_view::MouseButton;
use history_view::item::DownloadStatus;
use history_view::item::ItemFlags;
use history_view::item::MediaContent;
use history_view::item::PhotoData;
use pretty_assertions::assert_eq;

use crate::suite::harness::Fixture;
use crate::suite::harness::HostEvent;
use crate::suite::harness::flat_config;
use crate::suite::harness::point;
use crate::suite::harness::text_item;

fn three_items() -> Fixture {
    Fixture::new(
        vec![
            text_item(1, "one"),
            text_item(2, "two"),
            text_item(3, "three"),
        ],
        60,
    )
}

#[test]
fn clearing_only_text_keeps_whole_items() {
    let mut fixture = three_items();
    fixture.inner.select_item(ItemId(1));
    fixture.inner.select_item(ItemId(3));

    assert!(fixture.host.0.borrow().repaints > 0);

    fixture.inner.clear_selected_items(true);
    assert_eq!(
        fixture.inner.get_selected_items(),
        vec![ItemId(1), ItemId(3)]
    );

    fixture.inner.clear_selected_items(false);
    assert!(fixture.inner.get_selected_items().is_empty());
    let last_state = fixture
        .host
        .events()
        .into_iter()
        .filter_map(|event| match event {
            HostEvent::SelectionChanged(state) => Some(state),
            _ => None,
        })
        .next_back();
    assert_eq!(last_state.map(|state| state.count), Some(0));
}

#[test]
fn selection_limit_is_enforced() {
    let mut config = flat_config();
    config.max_selected_items = 2;
    let mut fixture = Fixture::with_config(
        vec![
            text_item(1, "one"),
            text_item(2, "two"),
            text_item(3, "three"),
        ],
        60,
        config,
    );
    for id in 1..=3 {
        fixture.inner.select_item(ItemId(id));
    }
    assert_eq!(
        fixture.inner.get_selected_items(),
        vec![ItemId(1), ItemId(2)]
    );
}

#[test]
fn permissions_follow_every_selected_item() {
    let undeletable = text_item(2, "two").with_flags(ItemFlags {
        can_delete: false,
        can_forward: true,
        ..ItemFlags::default()
    });
    let unforwardable = text_item(3, "three").with_flags(ItemFlags {
        can_delete: true,
        can_forward: false,
        ..ItemFlags::default()
    });
    let mut fixture = Fixture::new(
        vec![
            text_item(1, "one"),
            undeletable,
            unforwardable,
            text_item(-4, "draft"),
        ],
        80,
    );
    fixture.inner.select_item(ItemId(1));
    assert!(fixture.inner.can_delete_selected());
    assert!(fixture.inner.can_forward_selected());
    assert!(fixture.inner.can_copy_selected());

    fixture.inner.select_item(ItemId(2));
    assert!(!fixture.inner.can_delete_selected());
    assert!(fixture.inner.can_forward_selected());

    fixture.inner.select_item(ItemId(3));
    // Local messages never join the selection.
    fixture.inner.select_item(ItemId(-4));
    let state = fixture.inner.get_selection_state();
    assert_eq!(state.count, 3);
    assert_eq!(state.can_delete_count, 2);
    assert_eq!(state.can_forward_count, 2);
    assert!(!fixture.inner.can_forward_selected());
}

#[test]
fn copy_puts_the_selected_text_on_the_clipboard() {
    let mut fixture = three_items();
    let now = fixture.advance(1);
    let top = fixture.inner.item_top(ItemId(3)).unwrap_or_default();
    fixture.inner.mouse_press_at(
        point(0, top + 10),
        MouseButton::Left,
        Modifiers::default(),
        now,
    );
    fixture.inner.mouse_move_at(point(25, top + 10), true, now);
    fixture
        .inner
        .mouse_release_at(point(25, top + 10), MouseButton::Left, now);
    assert!(fixture.inner.can_copy_selected());

    fixture.inner.copy_selected_text();
    assert!(
        fixture
            .host
            .events()
            .contains(&HostEvent::Clipboard("thr".to_string()))
    );
}

#[test]
fn removed_items_leave_the_selection() {
    let mut fixture = three_items();
    fixture.inner.select_item(ItemId(1));
    fixture.inner.select_item(ItemId(2));

    assert!(fixture.inner.remove_item(ItemId(2)).is_some());
    assert_eq!(fixture.inner.get_selected_items(), vec![ItemId(1)]);
    assert!(fixture.inner.remove_item(ItemId(2)).is_none());
}

#[test]
fn refreshed_media_replaces_the_attachment() {
    let photo = |status| {
        MediaContent::Photo(PhotoData {
            id: 9,
            width: 100,
            height: 100,
            status,
        })
    };
    let item = text_item(1, "").with_media(photo(DownloadStatus::Remote));
    let mut fixture = Fixture::new(vec![item], 200);

    assert!(
        fixture
            .inner
            .refresh_media(ItemId(1), photo(DownloadStatus::Ready))
    );
    let ready = fixture
        .inner
        .timeline()
        .view(ItemId(1))
        .and_then(|view| view.media())
        .map(|media| media.status());
    assert_eq!(ready, Some(DownloadStatus::Ready));
    assert!(
        !fixture
            .inner
            .refresh_media(ItemId(5), photo(DownloadStatus::Ready))
    );
}
