use std::time::Duration;
use std::time::Instant;

use history_view::ItemId;
use history_view::TextSelection;
use history_view::TouchPhase;
use history_view::context_menu::ContextAction;
use history_view::context_menu::UponSelection;
use pretty_assertions::assert_eq;

use crate::suite::harness::Fixture;
use crate::suite::harness::HostEvent;
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

fn scrolls(fixture: &Fixture) -> Vec<(i32, i32)> {
    fixture
        .host
        .events()
        .into_iter()
        .filter_map(|event| match event {
            HostEvent::TouchScroll(delta) => Some((delta.x, delta.y)),
            _ => None,
        })
        .collect()
}

#[test]
fn flick_keeps_scrolling_after_the_finger_lifts() {
    let mut fixture = two_items();
    let start = fixture.now;
    let ms = |value: u64| start + Duration::from_millis(value);

    fixture
        .inner
        .touch_event_at(TouchPhase::Begin, point(100, 300), ms(0));
    fixture
        .inner
        .touch_event_at(TouchPhase::Update, point(100, 250), ms(10));
    fixture
        .inner
        .touch_event_at(TouchPhase::Update, point(100, 200), ms(20));
    assert_eq!(scrolls(&fixture), vec![(0, 0), (0, -50)]);

    fixture
        .inner
        .touch_event_at(TouchPhase::End, point(100, 200), ms(20));
    assert_eq!(
        fixture.inner.next_tick_in(ms(20)),
        Some(fixture.inner.config().touch.scroll_tick)
    );

    fixture.inner.on_tick_at(ms(35));
    assert_eq!(scrolls(&fixture), vec![(0, 0), (0, -50), (0, -75)]);
    assert!(fixture.inner.selection().is_empty());
}

#[test]
fn short_tap_acts_as_a_click() {
    let mut fixture = two_items();
    let start = fixture.now;
    fixture
        .inner
        .touch_event_at(TouchPhase::Begin, point(15, 10), start);
    fixture.inner.touch_event_at(
        TouchPhase::End,
        point(15, 10),
        start + Duration::from_millis(80),
    );

    assert!(scrolls(&fixture).is_empty());
    assert!(fixture.host.context_menus().is_empty());
    assert_eq!(fixture.inner.next_tick_in(start), None);
}

#[test]
fn long_press_selects_text_and_opens_the_menu() {
    let mut fixture = two_items();
    let start = fixture.now;
    let long_press = fixture.inner.config().touch.long_press;

    fixture
        .inner
        .touch_event_at(TouchPhase::Begin, point(15, 10), start);
    assert_eq!(fixture.inner.next_tick_in(start), Some(long_press));

    fixture.inner.on_tick_at(start + long_press);
    let moved = start + long_press + Duration::from_millis(10);
    fixture
        .inner
        .touch_event_at(TouchPhase::Update, point(55, 10), moved);
    assert_eq!(
        fixture.inner.selection().get(ItemId(1)),
        Some(TextSelection::new(2, 6))
    );

    fixture
        .inner
        .touch_event_at(TouchPhase::End, point(55, 10), moved);
    let menus = fixture.host.context_menus();
    assert_eq!(menus.len(), 1);
    assert!(menus[0].from_touch);
    assert_eq!(menus[0].upon_selection, UponSelection::OverText);
    assert_eq!(
        menus[0].actions,
        vec![
            ContextAction::CopySelected,
            ContextAction::Forward,
            ContextAction::Delete,
            ContextAction::Select,
        ]
    );
    assert_eq!(fixture.inner.get_selected_text().text, "e tw");
}

#[test]
fn cancel_drops_the_pending_long_press() {
    let mut fixture = two_items();
    let start = fixture.now;
    fixture
        .inner
        .touch_event_at(TouchPhase::Begin, point(15, 10), start);
    fixture
        .inner
        .touch_event_at(TouchPhase::Cancel, point(15, 10), start);

    assert_eq!(fixture.inner.next_tick_in(start), None);
    fixture.inner.on_tick_at(start + Duration::from_secs(1));
    assert!(fixture.inner.selection().is_empty());
}

/// Flicks upwards and lifts the finger at 20ms, leaving momentum running.
fn flick(fixture: &mut Fixture) -> Instant {
    let start = fixture.now;
    let ms = |value: u64| start + Duration::from_millis(value);
    fixture
        .inner
        .touch_event_at(TouchPhase::Begin, point(100, 300), ms(0));
    fixture
        .inner
        .touch_event_at(TouchPhase::Update, point(100, 250), ms(10));
    fixture
        .inner
        .touch_event_at(TouchPhase::Update, point(100, 200), ms(20));
    fixture
        .inner
        .touch_event_at(TouchPhase::End, point(100, 200), ms(20));
    start
}

#[test]
fn cancel_during_momentum_stops_the_scroll_timer() {
    let mut fixture = two_items();
    let start = flick(&mut fixture);
    let ms = |value: u64| start + Duration::from_millis(value);

    fixture
        .inner
        .touch_event_at(TouchPhase::Begin, point(100, 200), ms(25));
    fixture
        .inner
        .touch_event_at(TouchPhase::Cancel, point(100, 200), ms(26));
    assert_eq!(fixture.inner.next_tick_in(ms(26)), None);

    let scrolled = scrolls(&fixture).len();
    for tick in 1..=10 {
        fixture.inner.on_tick_at(ms(26 + tick * 15));
    }
    assert_eq!(scrolls(&fixture).len(), scrolled);
    assert_eq!(fixture.inner.next_tick_in(ms(200)), None);
}

#[test]
fn acceleration_timeout_stops_the_scroll_timer() {
    let mut fixture = two_items();
    let start = flick(&mut fixture);
    let ms = |value: u64| start + Duration::from_millis(value);
    let wait = fixture.inner.config().touch.acceleration_wait;

    // A second finger lands during momentum and then stays still.
    fixture
        .inner
        .touch_event_at(TouchPhase::Begin, point(100, 200), ms(25));
    let timed_out = ms(25) + wait + Duration::from_millis(5);
    fixture.inner.on_tick_at(timed_out);

    assert_eq!(fixture.inner.next_tick_in(timed_out), None);
}
