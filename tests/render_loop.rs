//! Loop driver tests through the full application object.

mod common;

use std::f32::consts::TAU;

use glam::Vec2;

use common::{bootstrap, launch, FakeHost};
use orbit_cube::LoopState;

// ============================================================================
// Idle / Running
// ============================================================================

#[test]
fn frames_before_start_do_nothing() {
    let host = FakeHost::new(800, 600);
    let mut app = bootstrap(&host).unwrap();
    app.resize().unwrap();

    host.time.advance(1.0);
    assert!(app.frame().is_none());
    assert!(app.frame().is_none());

    assert_eq!(app.loop_state(), LoopState::Idle);
    assert_eq!(app.cube_rotation(), 0.0);
    assert_eq!(app.draw_calls(), 0);
    assert_eq!(host.frame_requests(), 0);
}

#[test]
fn start_is_one_shot() {
    let host = FakeHost::new(800, 600);
    let mut app = launch(&host);

    assert!(!app.start());
    assert_eq!(host.frame_requests(), 1);
}

#[test]
fn every_tick_draws_once_and_reschedules() {
    let host = FakeHost::new(800, 600);
    let mut app = launch(&host);

    for i in 1..=5u32 {
        host.time.advance(1.0 / 60.0);
        let time = app.frame().unwrap();
        assert_eq!(time.frame_index, u64::from(i - 1));
        assert_eq!(host.draws(), i);
        assert_eq!(host.frame_requests(), i + 1);
    }
    assert_eq!(app.draw_calls(), 5);
    assert_eq!(app.render_loop().frame_count(), 5);
}

// ============================================================================
// Rotation
// ============================================================================

/// The first delta is measured from start, not from bootstrap.
#[test]
fn rotation_follows_clock_from_start() {
    let host = FakeHost::new(800, 600);
    let mut app = bootstrap(&host).unwrap();
    app.resize().unwrap();

    host.time.advance(5.0);
    app.start();
    host.time.advance(0.25);
    app.frame();

    assert!((app.cube_rotation() - 0.25).abs() < 1e-6);
}

#[test]
fn rotation_happens_before_draw() {
    let host = FakeHost::new(800, 600);
    let mut app = launch(&host);

    host.time.advance(0.5);
    app.frame();
    host.time.advance(0.25);
    app.frame();

    let drawn = &app.renderer().drawn_rotations;
    assert_eq!(drawn.len(), 2);
    assert!((drawn[0] - 0.5).abs() < 1e-6);
    assert!((drawn[1] - 0.75).abs() < 1e-6);
}

/// Ten ticks of 16 ms and five ticks of 32 ms end at the same angle.
#[test]
fn rotation_is_frame_rate_independent() {
    let fast_host = FakeHost::new(800, 600);
    let mut fast = launch(&fast_host);
    for _ in 0..10 {
        fast.step(0.016);
    }

    let slow_host = FakeHost::new(800, 600);
    let mut slow = launch(&slow_host);
    for _ in 0..5 {
        slow.step(0.032);
    }

    assert!((fast.cube_rotation() - 0.16).abs() < 1e-5);
    assert!((slow.cube_rotation() - 0.16).abs() < 1e-5);
    assert!((fast.cube_rotation() - slow.cube_rotation()).abs() < 1e-5);
}

#[test]
fn long_running_rotation_stays_normalized() {
    let host = FakeHost::new(800, 600);
    let mut app = launch(&host);

    for _ in 0..10_000 {
        app.step(0.1);
    }
    let angle = app.cube_rotation();
    assert!((0.0..TAU).contains(&angle));
    // 1000 rad mod 2π
    let expected = 1000.0f64.rem_euclid(std::f64::consts::TAU) as f32;
    assert!((angle - expected).abs() < 1e-2);
}

/// A stalled tab produces one large delta, no catch-up frames.
#[test]
fn slow_frame_is_not_split() {
    let host = FakeHost::new(800, 600);
    let mut app = launch(&host);

    host.time.advance(2.0);
    let time = app.frame().unwrap();

    assert_eq!(time.delta, 2.0);
    assert_eq!(host.draws(), 1);
    assert!((app.cube_rotation() - 2.0).abs() < 1e-6);
}

// ============================================================================
// Orbit and errors
// ============================================================================

/// Damped orbit keeps easing in on ticks with no new input.
#[test]
fn orbit_eases_between_ticks() {
    let host = FakeHost::new(800, 600);
    let mut app = launch(&host);

    app.pointer_down(Vec2::new(100.0, 100.0));
    app.pointer_move(Vec2::new(160.0, 100.0));
    app.pointer_up();

    let mut positions = Vec::new();
    for _ in 0..3 {
        host.time.advance(1.0 / 60.0);
        app.frame();
        positions.push(app.camera().position);
    }

    assert!(positions[0].x < 0.0);
    assert!(positions[1].x < positions[0].x);
    assert!(positions[2].x < positions[1].x);
    // distance to the target is preserved
    for p in positions {
        assert!((p.length() - 3.0).abs() < 1e-4);
    }
}

#[test]
fn failed_render_keeps_loop_running() {
    let mut host = FakeHost::new(800, 600);
    host.fail_renders = true;
    let mut app = launch(&host);

    for _ in 0..3 {
        host.time.advance(0.1);
        assert!(app.frame().is_some());
    }
    assert_eq!(host.draws(), 3);
    assert_eq!(host.frame_requests(), 4);
    assert!((app.cube_rotation() - 0.3).abs() < 1e-5);
}
