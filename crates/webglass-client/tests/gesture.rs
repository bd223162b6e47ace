#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::{Duration, Instant};

use webglass_client::input::{Gesture, GestureConfig, GestureRecognizer, Phase, Point};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn recognizer() -> GestureRecognizer {
    GestureRecognizer::new(GestureConfig {
        drag_threshold: 5.0,
        click_dwell: ms(150),
        hover_throttle: ms(200),
    })
}

#[test]
fn quick_release_clicks_at_press_point() {
    let t0 = Instant::now();
    let mut g = recognizer();

    g.pointer_down(Point::new(10.0, 10.0), t0);
    assert_eq!(g.phase(), Phase::Pressed);
    assert_eq!(
        g.pointer_up(Point::new(12.0, 11.0), t0 + ms(40)),
        Some(Gesture::Click(Point::new(10.0, 10.0)))
    );
    assert_eq!(g.phase(), Phase::Idle);

    // dwell timer was cancelled by the release
    assert_eq!(g.next_deadline(), None);
    assert_eq!(g.on_tick(t0 + ms(500)), None);
}

#[test]
fn dwell_fires_click_while_held_still() {
    let t0 = Instant::now();
    let mut g = recognizer();

    g.pointer_down(Point::new(3.0, 4.0), t0);
    assert_eq!(g.next_deadline(), Some(t0 + ms(150)));
    assert_eq!(g.on_tick(t0 + ms(149)), None);
    assert_eq!(
        g.on_tick(t0 + ms(150)),
        Some(Gesture::Click(Point::new(3.0, 4.0)))
    );

    // the press is resolved: a later release emits nothing
    assert_eq!(g.phase(), Phase::Idle);
    assert_eq!(g.pointer_up(Point::new(3.0, 4.0), t0 + ms(300)), None);
}

#[test]
fn movement_past_threshold_becomes_drag_and_never_clicks() {
    let t0 = Instant::now();
    let mut g = recognizer();

    g.pointer_down(Point::new(0.0, 0.0), t0);
    g.pointer_move(Point::new(3.0, 0.0), t0 + ms(20));
    assert_eq!(g.phase(), Phase::Pressed);
    g.pointer_move(Point::new(6.0, 0.0), t0 + ms(40));
    assert_eq!(g.phase(), Phase::Dragging);

    // the dwell timer cannot fire a click for this press any more
    assert_eq!(g.on_tick(t0 + ms(1000)), None);
    assert_eq!(
        g.pointer_up(Point::new(50.0, 20.0), t0 + ms(1200)),
        Some(Gesture::Drag {
            start: Point::new(0.0, 0.0),
            end: Point::new(50.0, 20.0),
        })
    );
    assert_eq!(g.phase(), Phase::Idle);
}

#[test]
fn movement_exactly_at_threshold_is_still_a_press() {
    let t0 = Instant::now();
    let mut g = recognizer();

    g.pointer_down(Point::new(0.0, 0.0), t0);
    g.pointer_move(Point::new(3.0, 4.0), t0 + ms(10));
    assert_eq!(g.phase(), Phase::Pressed);
    assert_eq!(
        g.pointer_up(Point::new(3.0, 4.0), t0 + ms(20)),
        Some(Gesture::Click(Point::new(0.0, 0.0)))
    );
}

#[test]
fn leave_aborts_without_emitting() {
    let t0 = Instant::now();
    let mut g = recognizer();

    g.pointer_down(Point::new(1.0, 1.0), t0);
    g.pointer_leave();
    assert_eq!(g.phase(), Phase::Idle);
    assert_eq!(g.on_tick(t0 + ms(500)), None);
    assert_eq!(g.pointer_up(Point::new(1.0, 1.0), t0 + ms(600)), None);
}

#[test]
fn new_press_supersedes_previous_dwell_timer() {
    let t0 = Instant::now();
    let mut g = recognizer();

    g.pointer_down(Point::new(1.0, 1.0), t0);
    g.pointer_down(Point::new(9.0, 9.0), t0 + ms(100));

    // the first press's deadline (t0+150) is gone
    assert_eq!(g.on_tick(t0 + ms(150)), None);
    assert_eq!(
        g.on_tick(t0 + ms(250)),
        Some(Gesture::Click(Point::new(9.0, 9.0)))
    );
}

#[test]
fn hover_is_throttled_to_one_per_window() {
    let t0 = Instant::now();
    let mut g = recognizer();

    let mut sent = 0;
    for i in 0..20u64 {
        if g.pointer_move(Point::new(i as f64, 0.0), t0 + ms(i * 10)).is_some() {
            sent += 1;
        }
    }
    // moves span 0..=190ms: one window
    assert_eq!(sent, 1);

    assert_eq!(g.pointer_move(Point::new(0.0, 0.0), t0 + ms(200)), None);
    assert_eq!(
        g.pointer_move(Point::new(7.0, 7.0), t0 + ms(201)),
        Some(Gesture::Hover(Point::new(7.0, 7.0)))
    );
}
