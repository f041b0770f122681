use history_view::ContextAction;
use history_view::ItemId;
use history_view::Modifiers;
use history_view::MouseButton;
use history_view::context_menu::UponSelection;
use history_view::geometry::Point;
use history_view::hit_test::Link;
use history_view::item::DownloadStatus;
use history_view::item::GroupId;
use history_view::item::Item;
use history_view::item::MediaContent;
use history_view::item::PhotoData;
use history_view::item::SenderId;
use history_view::media::Media;
use history_view::media::MediaKind;
use history_view::media::MediaType;
use history_view::text::EntityInText;
use history_view::text::EntityKind;
use history_view::text::TextWithEntities;
use pretty_assertions::assert_eq;

use crate::suite::harness::Fixture;
use crate::suite::harness::HostEvent;
use crate::suite::harness::at;
use crate::suite::harness::point;
use crate::suite::harness::text_item;

fn two_items() -> Fixture {
    Fixture::new(
        vec![
            text_item(1, "one two\nthree"),
            text_item(2, "four\nfive\nsix"),
        ],
        100,
    )
}

fn right_click(fixture: &mut Fixture, position: Point) {
    let now = fixture.advance(1);
    fixture.inner.show_context_menu_at(position, false, now);
}

fn last_actions(fixture: &Fixture) -> Vec<ContextAction> {
    fixture
        .host
        .context_menus()
        .last()
        .map(|menu| menu.actions.clone())
        .unwrap_or_default()
}

fn clipboard(fixture: &Fixture) -> Vec<String> {
    fixture
        .host
        .events()
        .into_iter()
        .filter_map(|event| match event {
            HostEvent::Clipboard(text) => Some(text),
            _ => None,
        })
        .collect()
}

#[test]
fn plain_message_offers_copy_text() {
    let mut fixture = two_items();
    right_click(&mut fixture, point(15, 10));

    let menus = fixture.host.context_menus();
    assert_eq!(menus.len(), 1);
    assert_eq!(menus[0].item, Some(ItemId(1)));
    assert_eq!(menus[0].upon_selection, UponSelection::NoSelection);
    assert_eq!(menus[0].media_type, None);
    assert!(!menus[0].from_touch);
    assert_eq!(
        menus[0].actions,
        vec![
            ContextAction::CopyText,
            ContextAction::Forward,
            ContextAction::Delete,
            ContextAction::Select,
        ]
    );

    assert!(fixture.inner.perform_context_action(ContextAction::CopyText));
    assert_eq!(clipboard(&fixture), vec!["one two\nthree".to_string()]);
}

#[test]
fn link_offers_copy_link() {
    let text = TextWithEntities::plain("see https://x.io")
        .with_entity(EntityInText::new(EntityKind::Url, 4, 12));
    let mut fixture = Fixture::new(vec![text_item(1, "").with_rich_text(text)], 100);
    let top = fixture.inner.item_top(ItemId(1)).unwrap_or_default();

    right_click(&mut fixture, point(55, top + 10));
    let menus = fixture.host.context_menus();
    assert_eq!(menus.len(), 1);
    assert_eq!(menus[0].link, Some(Link::Url("https://x.io".to_string())));
    assert_eq!(
        menus[0].actions,
        vec![
            ContextAction::CopyLink,
            ContextAction::Forward,
            ContextAction::Delete,
            ContextAction::Select,
        ]
    );

    assert!(fixture.inner.perform_context_action(ContextAction::CopyLink));
    assert_eq!(clipboard(&fixture), vec!["https://x.io".to_string()]);
}

#[test]
fn local_message_cannot_be_forwarded_or_selected() {
    let mut fixture = Fixture::new(vec![text_item(-1, "draft")], 100);
    let top = fixture.inner.item_top(ItemId(-1)).unwrap_or_default();

    right_click(&mut fixture, point(15, top + 10));
    assert_eq!(
        last_actions(&fixture),
        vec![ContextAction::CopyText, ContextAction::Delete]
    );
}

#[test]
fn menu_over_selected_items_acts_on_the_selection() {
    let mut fixture = two_items();
    fixture.inner.select_item(ItemId(1));
    fixture.inner.select_item(ItemId(2));

    right_click(&mut fixture, point(15, 45));
    let menus = fixture.host.context_menus();
    assert_eq!(menus[0].upon_selection, UponSelection::OverItems);
    assert_eq!(menus[0].selection_state.count, 2);
    assert_eq!(
        menus[0].actions,
        vec![
            ContextAction::CopySelectedItems,
            ContextAction::ForwardSelected,
            ContextAction::DeleteSelected,
            ContextAction::ClearSelection,
        ]
    );

    assert!(fixture.inner.perform_context_action(ContextAction::ClearSelection));
    assert!(fixture.inner.selection().is_empty());
    assert!(!fixture.inner.perform_context_action(ContextAction::ForwardSelected));
}

#[test]
fn menu_beside_the_selection_only_offers_select() {
    let mut fixture = two_items();
    fixture.inner.select_item(ItemId(1));

    right_click(&mut fixture, point(15, 45));
    let menus = fixture.host.context_menus();
    assert_eq!(menus[0].upon_selection, UponSelection::OutsideItems);
    assert_eq!(menus[0].actions, vec![ContextAction::Select]);

    assert!(fixture.inner.perform_context_action(ContextAction::Select));
    assert_eq!(
        fixture.inner.get_selected_items(),
        vec![ItemId(1), ItemId(2)]
    );
}

#[test]
fn menu_over_selected_text_copies_it() {
    let mut fixture = two_items();
    let now = fixture.advance(1);
    fixture
        .inner
        .mouse_press_at(point(15, 10), MouseButton::Left, Modifiers::default(), now);
    fixture.inner.mouse_move_at(point(55, 10), true, now);
    fixture
        .inner
        .mouse_release_at(point(55, 10), MouseButton::Left, now);

    right_click(&mut fixture, point(35, 10));
    let menus = fixture.host.context_menus();
    assert_eq!(menus[0].upon_selection, UponSelection::OverText);
    assert_eq!(menus[0].actions[0], ContextAction::CopySelected);

    assert!(fixture.inner.perform_context_action(ContextAction::CopySelected));
    assert_eq!(clipboard(&fixture), vec!["e tw".to_string()]);
}

fn album_photo(id: i64) -> Item {
    let minute = u32::try_from(id).unwrap_or_default();
    Item::new(ItemId(id), at(minute), SenderId(1))
        .with_author("Ann")
        .with_media(MediaContent::Photo(PhotoData {
            id: u64::try_from(id).unwrap_or_default(),
            width: 100,
            height: 100,
            status: DownloadStatus::Ready,
        }))
        .with_group(GroupId(7))
}

/// Viewport position inside the first photo of the album led by item 6.
fn first_album_photo(fixture: &Fixture) -> Point {
    let timeline = fixture.inner.timeline();
    let top = timeline.item_top(ItemId(6)).unwrap_or_default();
    let Some(view) = timeline.view(ItemId(6)) else {
        panic!("album leader is missing");
    };
    let media = view.media_rect();
    let part = match view.display_media().map(Media::kind) {
        Some(MediaKind::Grouped(album)) => album.parts()[0].geometry(),
        other => panic!("expected an album, got {other:?}"),
    };
    point(media.x + part.x + 5, top + media.y + part.y + 5)
}

#[test]
fn album_photo_menu_selects_the_whole_group() {
    let mut fixture = Fixture::new(
        vec![album_photo(4), album_photo(5), album_photo(6)],
        400,
    );
    assert_eq!(
        fixture.inner.timeline().group_members(ItemId(4)),
        &[ItemId(4), ItemId(5), ItemId(6)]
    );
    let position = first_album_photo(&fixture);

    right_click(&mut fixture, position);
    let menus = fixture.host.context_menus();
    assert_eq!(menus.len(), 1);
    assert_eq!(menus[0].link, Some(Link::OpenMedia(ItemId(4))));
    assert_eq!(menus[0].item, Some(ItemId(6)));
    assert_eq!(menus[0].media_type, Some(MediaType::Grouped));
    assert_eq!(
        menus[0].actions,
        vec![
            ContextAction::SaveImage,
            ContextAction::CopyImage,
            ContextAction::Forward,
            ContextAction::Delete,
            ContextAction::Select,
        ]
    );

    assert!(fixture.inner.perform_context_action(ContextAction::Select));
    assert_eq!(
        fixture.inner.get_selected_items(),
        vec![ItemId(4), ItemId(5), ItemId(6)]
    );

    // In items mode a click on the photo toggles the album instead of
    // opening it.
    let now = fixture.advance(10);
    fixture
        .inner
        .mouse_press_at(position, MouseButton::Left, Modifiers::default(), now);
    fixture
        .inner
        .mouse_release_at(position, MouseButton::Left, now);
    assert!(fixture.inner.selection().is_empty());
    assert!(
        !fixture
            .host
            .events()
            .iter()
            .any(|event| matches!(event, HostEvent::Activate(..)))
    );
}

#[test]
fn removed_item_invalidates_the_menu_target() {
    let text = TextWithEntities::plain("see https://x.io")
        .with_entity(EntityInText::new(EntityKind::Url, 4, 12));
    let mut fixture = Fixture::new(
        vec![text_item(1, "").with_rich_text(text), text_item(2, "tail")],
        100,
    );
    let top = fixture.inner.item_top(ItemId(1)).unwrap_or_default();
    right_click(&mut fixture, point(55, top + 10));

    fixture.inner.remove_item(ItemId(1));
    assert!(!fixture.inner.copy_context_url());
    assert!(clipboard(&fixture).is_empty());
}
