//! Full gesture sessions driven through the arbiter: disambiguation between
//! long-press, swipe-to-reply, and scrolling, plus the session invariants
//! that hold for arbitrary touch traces.

use proptest::prelude::*;

use gather_core::{
    GestureArbiter, GestureCommand, SubjectId, SurfaceKind, TimerToken, TouchPoint,
};

fn subject(id: &str) -> SubjectId {
    SubjectId::new(id).unwrap()
}

fn point(x: f64, y: f64) -> TouchPoint {
    TouchPoint::new(x, y).unwrap()
}

fn started_timer(commands: &[GestureCommand]) -> TimerToken {
    commands
        .iter()
        .find_map(|c| match c {
            GestureCommand::StartTimer { token, delay_ms } => {
                assert_eq!(*delay_ms, 500);
                Some(*token)
            }
            _ => None,
        })
        .expect("session start should arm the hold timer")
}

#[test]
fn press_and_hold_resolves_as_long_press() {
    let mut arbiter = GestureArbiter::new(SurfaceKind::Touch);
    let msg = subject("msg-1");

    let started = arbiter.touch_start(msg.clone(), point(180.0, 420.0), false);
    let token = started_timer(&started);

    // Finger drifts a few pixels leftward, well inside the slop.
    assert!(arbiter.touch_move(&msg, point(177.0, 423.0)).is_empty());

    let fired = arbiter.timer_fired(token);
    assert_eq!(
        fired,
        vec![
            GestureCommand::LongPress {
                subject: msg.clone()
            },
            GestureCommand::HapticPulse { duration_ms: 50 },
        ]
    );

    let ended = arbiter.touch_end(&msg);
    assert!(ended.iter().all(|c| !c.is_terminal()));
}

#[test]
fn drag_and_release_resolves_as_swipe_reply() {
    let mut arbiter = GestureArbiter::new(SurfaceKind::Touch);
    let msg = subject("msg-2");

    let started = arbiter.touch_start(msg.clone(), point(60.0, 500.0), false);
    let token = started_timer(&started);

    // The drag crosses the slop: the hold timer is cancelled on the way.
    let moved = arbiter.touch_move(&msg, point(100.0, 502.0));
    assert!(moved.contains(&GestureCommand::CancelTimer { token }));
    assert!(moved.contains(&GestureCommand::OffsetChanged {
        subject: msg.clone(),
        px: 40.0
    }));

    arbiter.touch_move(&msg, point(145.0, 503.0));
    assert_eq!(arbiter.offset_for(&msg), Some(85.0));

    let ended = arbiter.touch_end(&msg);
    assert_eq!(
        ended,
        vec![
            GestureCommand::SwipeReply {
                subject: msg.clone()
            },
            GestureCommand::HapticPulse { duration_ms: 50 },
            GestureCommand::OffsetCleared { subject: msg },
        ]
    );
}

#[test]
fn vertical_scroll_resolves_as_neither_gesture() {
    let mut arbiter = GestureArbiter::new(SurfaceKind::Touch);
    let msg = subject("msg-3");

    let started = arbiter.touch_start(msg.clone(), point(100.0, 400.0), false);
    let token = started_timer(&started);

    // Mostly-vertical flick: past both the slop and the vertical cancel.
    let moved = arbiter.touch_move(&msg, point(104.0, 460.0));
    assert!(moved.contains(&GestureCommand::CancelTimer { token }));

    let ended = arbiter.touch_end(&msg);
    assert!(ended.iter().all(|c| !c.is_terminal()));
    assert!(arbiter.timer_fired(token).is_empty());
}

#[test]
fn long_press_menu_blocks_swipe_on_next_touch() {
    let mut arbiter = GestureArbiter::new(SurfaceKind::Touch);
    let msg = subject("msg-4");

    // Menu is showing; the user drags the same message far rightward.
    arbiter.touch_start(msg.clone(), point(60.0, 500.0), true);
    arbiter.touch_move(&msg, point(200.0, 500.0));
    assert_eq!(arbiter.offset_for(&msg), None);

    let ended = arbiter.touch_end(&msg);
    assert!(ended.iter().all(|c| !c.is_terminal()));
}

#[test]
fn fired_long_press_blocks_swipe_in_same_session() {
    let mut arbiter = GestureArbiter::new(SurfaceKind::Touch);
    let msg = subject("msg-5");

    let started = arbiter.touch_start(msg.clone(), point(60.0, 500.0), false);
    let token = started_timer(&started);

    arbiter.timer_fired(token);

    // Post-fire drag past the commit threshold still cannot reply.
    arbiter.touch_move(&msg, point(200.0, 500.0));
    let ended = arbiter.touch_end(&msg);
    assert!(!ended
        .iter()
        .any(|c| matches!(c, GestureCommand::SwipeReply { .. })));
}

#[test]
fn sessions_on_different_subjects_are_independent() {
    let mut arbiter = GestureArbiter::new(SurfaceKind::Touch);
    let first = subject("msg-a");
    let second = subject("msg-b");

    arbiter.touch_start(first.clone(), point(60.0, 100.0), false);
    arbiter.touch_move(&first, point(145.0, 100.0));
    let first_end = arbiter.touch_end(&first);
    assert!(first_end.contains(&GestureCommand::SwipeReply {
        subject: first.clone()
    }));

    // The next session starts clean; nothing from the first leaks in.
    let started = arbiter.touch_start(second.clone(), point(60.0, 200.0), false);
    assert!(!started
        .iter()
        .any(|c| matches!(c, GestureCommand::OffsetCleared { .. })));
    assert_eq!(arbiter.offset_for(&first), None);
    assert_eq!(arbiter.offset_for(&second), None);
}

#[test]
fn pointer_only_surface_emits_no_commands() {
    let mut arbiter = GestureArbiter::new(SurfaceKind::PointerOnly);
    let msg = subject("msg-6");

    assert!(arbiter
        .touch_start(msg.clone(), point(60.0, 500.0), false)
        .is_empty());
    assert!(arbiter.touch_move(&msg, point(200.0, 500.0)).is_empty());
    assert!(arbiter.touch_end(&msg).is_empty());
    assert!(arbiter.timer_fired(TimerToken(1)).is_empty());
}

/// A single touch-move in a generated trace.
#[derive(Clone, Debug)]
struct Step {
    dx: f64,
    dy: f64,
    timer_after: bool,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    (-200.0f64..200.0, -80.0f64..80.0, any::<bool>()).prop_map(|(dx, dy, timer_after)| Step {
        dx,
        dy,
        timer_after,
    })
}

proptest! {
    /// Published offsets never leave [0, 120], whatever the finger does.
    #[test]
    fn offsets_stay_within_bounds(steps in prop::collection::vec(step_strategy(), 1..30)) {
        let mut arbiter = GestureArbiter::new(SurfaceKind::Touch);
        let msg = subject("msg-prop");

        let origin = point(300.0, 300.0);
        let started = arbiter.touch_start(msg.clone(), origin, false);
        let token = started_timer(&started);

        let mut x = 300.0;
        let mut y = 300.0;
        for step in &steps {
            x += step.dx;
            y += step.dy;
            for command in arbiter.touch_move(&msg, point(x, y)) {
                if let GestureCommand::OffsetChanged { px, .. } = command {
                    prop_assert!((0.0..=120.0).contains(&px));
                }
            }
            if step.timer_after {
                arbiter.timer_fired(token);
            }
        }

        arbiter.touch_end(&msg);
        prop_assert!(arbiter.published_offsets().is_empty());
    }

    /// A session resolves as at most one terminal gesture.
    #[test]
    fn at_most_one_terminal_per_session(steps in prop::collection::vec(step_strategy(), 0..30)) {
        let mut arbiter = GestureArbiter::new(SurfaceKind::Touch);
        let msg = subject("msg-prop");

        let started = arbiter.touch_start(msg.clone(), point(300.0, 300.0), false);
        let token = started_timer(&started);
        let mut terminals = 0usize;

        let mut x = 300.0;
        let mut y = 300.0;
        for step in &steps {
            x += step.dx;
            y += step.dy;
            terminals += arbiter
                .touch_move(&msg, point(x, y))
                .iter()
                .filter(|c| c.is_terminal())
                .count();
            if step.timer_after {
                terminals += arbiter
                    .timer_fired(token)
                    .iter()
                    .filter(|c| c.is_terminal())
                    .count();
            }
        }
        terminals += arbiter
            .touch_end(&msg)
            .iter()
            .filter(|c| c.is_terminal())
            .count();

        prop_assert!(terminals <= 1);
    }
}
