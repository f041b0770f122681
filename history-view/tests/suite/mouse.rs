use std::collections::BTreeMap;

use history_view::ItemId;
use history_view::Modifiers;
use history_view::MouseButton;
use history_view::TextSelection;
use history_view::hit_test::Link;
use history_view::host::CursorShape;
use history_view::mouse::MouseAction;
use history_view::text::EntityInText;
use history_view::text::EntityKind;
use history_view::text::TextWithEntities;
use pretty_assertions::assert_eq;

use crate::suite::harness::Fixture;
use crate::suite::harness::HostEvent;
use crate::suite::harness::point;
use crate::suite::harness::text_item;

/// Item 1 covers y 0..40 ("one two" / "three"), item 2 covers 40..100
/// ("four" / "five" / "six").
fn two_items() -> Fixture {
    Fixture::new(
        vec![
            text_item(1, "one two\nthree"),
            text_item(2, "four\nfive\nsix"),
        ],
        100,
    )
}

fn click(fixture: &mut Fixture, x: i32, y: i32, modifiers: Modifiers) {
    let now = fixture.advance(1);
    fixture
        .inner
        .mouse_press_at(point(x, y), MouseButton::Left, modifiers, now);
    fixture
        .inner
        .mouse_release_at(point(x, y), MouseButton::Left, now);
}

fn drag(fixture: &mut Fixture, from: (i32, i32), to: (i32, i32)) {
    let now = fixture.advance(1);
    fixture.inner.mouse_press_at(
        point(from.0, from.1),
        MouseButton::Left,
        Modifiers::default(),
        now,
    );
    let now = fixture.advance(50);
    fixture.inner.mouse_move_at(point(to.0, to.1), true, now);
    fixture
        .inner
        .mouse_release_at(point(to.0, to.1), MouseButton::Left, now);
}

fn selected(fixture: &Fixture) -> BTreeMap<ItemId, TextSelection> {
    fixture.inner.selection().items().clone()
}

#[test]
fn dragging_up_across_items_keeps_partial_boundaries() {
    let mut fixture = two_items();
    drag(&mut fixture, (15, 45), (15, 10));

    assert_eq!(
        selected(&fixture),
        BTreeMap::from([
            (ItemId(1), TextSelection::new(2, 13)),
            (ItemId(2), TextSelection::new(0, 2)),
        ])
    );
    assert_eq!(fixture.inner.mouse_action(), MouseAction::None);
    assert_eq!(fixture.inner.get_selected_items(), Vec::<ItemId>::new());
}

#[test]
fn dragging_down_covers_the_same_range() {
    let mut fixture = two_items();
    drag(&mut fixture, (15, 10), (15, 45));

    assert_eq!(
        selected(&fixture),
        BTreeMap::from([
            (ItemId(1), TextSelection::new(2, 13)),
            (ItemId(2), TextSelection::new(0, 2)),
        ])
    );
    let changes = fixture
        .host
        .events()
        .into_iter()
        .filter(|event| matches!(event, HostEvent::SelectionChanged(_)))
        .count();
    assert_eq!(changes, 1);
}

#[test]
fn drag_inside_one_item_selects_letters() {
    let mut fixture = two_items();
    drag(&mut fixture, (15, 10), (55, 10));

    assert_eq!(
        selected(&fixture),
        BTreeMap::from([(ItemId(1), TextSelection::new(2, 6))])
    );
    assert_eq!(fixture.inner.get_selected_text().text, "e tw");
}

#[test]
fn double_click_selects_word_and_triple_click_the_paragraph() {
    let mut fixture = two_items();
    let now = fixture.advance(1);
    let position = point(45, 10);
    fixture
        .inner
        .mouse_press_at(position, MouseButton::Left, Modifiers::default(), now);
    fixture
        .inner
        .mouse_release_at(position, MouseButton::Left, now);
    assert!(fixture.inner.selection().is_empty());

    let now = fixture.advance(100);
    fixture
        .inner
        .mouse_double_click_at(position, MouseButton::Left, Modifiers::default(), now);
    fixture
        .inner
        .mouse_release_at(position, MouseButton::Left, now);
    assert_eq!(fixture.inner.get_selected_text().text, "two");

    let now = fixture.advance(100);
    fixture
        .inner
        .mouse_press_at(position, MouseButton::Left, Modifiers::default(), now);
    fixture
        .inner
        .mouse_release_at(position, MouseButton::Left, now);
    assert_eq!(
        selected(&fixture),
        BTreeMap::from([(ItemId(1), TextSelection::new(0, 7))])
    );
}

#[test]
fn press_after_the_triple_click_window_starts_over() {
    let mut fixture = two_items();
    let position = point(45, 10);
    let now = fixture.advance(1);
    fixture
        .inner
        .mouse_double_click_at(position, MouseButton::Left, Modifiers::default(), now);
    fixture
        .inner
        .mouse_release_at(position, MouseButton::Left, now);
    assert_eq!(fixture.inner.get_selected_text().text, "two");

    let interval = fixture.inner.config().interaction.double_click_interval;
    let later = fixture.now + interval * 2;
    fixture.inner.on_tick_at(later);
    fixture.now = later;
    click(&mut fixture, 15, 30, Modifiers::default());
    assert!(fixture.inner.selection().is_empty());
}

#[test]
fn ctrl_click_enters_items_mode_and_plain_clicks_toggle() {
    let mut fixture = two_items();
    click(
        &mut fixture,
        15,
        10,
        Modifiers {
            ctrl: true,
            ..Modifiers::default()
        },
    );
    assert_eq!(fixture.inner.get_selected_items(), vec![ItemId(1)]);
    assert!(fixture.inner.selection().in_items_mode());

    click(&mut fixture, 15, 45, Modifiers::default());
    assert_eq!(
        fixture.inner.get_selected_items(),
        vec![ItemId(1), ItemId(2)]
    );

    click(&mut fixture, 15, 10, Modifiers::default());
    assert_eq!(fixture.inner.get_selected_items(), vec![ItemId(2)]);
    assert_eq!(fixture.inner.get_selection_state().count, 1);
}

#[test]
fn dragging_selected_text_starts_a_text_drag() {
    let mut fixture = two_items();
    drag(&mut fixture, (15, 10), (55, 10));
    fixture.host.take_events();

    let now = fixture.advance(10);
    fixture
        .inner
        .mouse_press_at(point(25, 10), MouseButton::Left, Modifiers::default(), now);
    assert_eq!(fixture.inner.mouse_action(), MouseAction::PrepareDrag);
    let now = fixture.advance(10);
    fixture.inner.mouse_move_at(point(25, 25), true, now);
    assert_eq!(fixture.inner.mouse_action(), MouseAction::Dragging);

    let drags: Vec<_> = fixture
        .host
        .events()
        .into_iter()
        .filter_map(|event| match event {
            HostEvent::Drag(payload) => Some(payload),
            _ => None,
        })
        .collect();
    assert_eq!(drags.len(), 1);
    assert_eq!(
        drags[0].text.as_ref().map(|text| text.text.as_str()),
        Some("e tw")
    );
    assert_eq!(drags[0].forward, None);

    fixture
        .inner
        .mouse_release_at(point(25, 25), MouseButton::Left, now);
    assert_eq!(
        selected(&fixture),
        BTreeMap::from([(ItemId(1), TextSelection::new(2, 6))])
    );
}

#[test]
fn click_on_selected_text_without_moving_clears_it() {
    let mut fixture = two_items();
    drag(&mut fixture, (15, 10), (55, 10));
    assert!(!fixture.inner.selection().is_empty());

    click(&mut fixture, 25, 10, Modifiers::default());
    assert!(fixture.inner.selection().is_empty());
}

#[test]
fn clicking_a_url_activates_it() {
    let text = TextWithEntities::plain("see https://x.io")
        .with_entity(EntityInText::new(EntityKind::Url, 4, 12));
    let item = text_item(1, "").with_rich_text(text);
    let mut fixture = Fixture::new(vec![item], 100);
    let top = fixture.inner.item_top(ItemId(1)).unwrap_or_default();

    let now = fixture.advance(1);
    fixture.inner.mouse_move_at(point(55, top + 10), false, now);
    assert_eq!(
        fixture.host.take_events(),
        vec![HostEvent::Cursor(CursorShape::Pointer)]
    );

    click(&mut fixture, 55, top + 10, Modifiers::default());
    let activations: Vec<_> = fixture
        .host
        .events()
        .into_iter()
        .filter(|event| matches!(event, HostEvent::Activate(..)))
        .collect();
    assert_eq!(
        activations,
        vec![HostEvent::Activate(
            Link::Url("https://x.io".to_string()),
            MouseButton::Left
        )]
    );
    assert!(fixture.inner.selection().is_empty());
}

#[test]
fn hovering_text_shows_the_text_cursor_and_leaving_resets_it() {
    let mut fixture = two_items();
    let now = fixture.advance(1);
    fixture.inner.mouse_move_at(point(15, 10), false, now);
    fixture.inner.mouse_leave();
    assert_eq!(
        fixture.host.events(),
        vec![
            HostEvent::Cursor(CursorShape::Text),
            HostEvent::Cursor(CursorShape::Default),
        ]
    );
}

#[test]
fn removing_the_pressed_item_cancels_the_action() {
    let mut fixture = two_items();
    let now = fixture.advance(1);
    fixture
        .inner
        .mouse_press_at(point(15, 10), MouseButton::Left, Modifiers::default(), now);
    assert_eq!(fixture.inner.mouse_action(), MouseAction::Selecting);

    fixture.inner.remove_item(ItemId(1));
    assert_eq!(fixture.inner.mouse_action(), MouseAction::None);
    assert!(!fixture.inner.timeline().contains(ItemId(1)));
}
