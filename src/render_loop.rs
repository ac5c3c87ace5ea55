//! Render loop driver
//!
//! A two-state machine: `Idle` until [`RenderLoop::start`], then `Running`
//! forever. Every tick measures the delta, runs the frame body, and asks the
//! host scheduler for the next frame. There is no stop.

use crate::clock::{Clock, TimeSource};

/// Host hook that arranges for the next tick to run
/// (`requestAnimationFrame`, `Window::request_redraw`)
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// Timing handed to the frame body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick, or since start for the first one
    pub delta: f32,
    /// Seconds since start
    pub elapsed: f64,
    /// Zero-based tick counter
    pub frame_index: u64,
}

pub struct RenderLoop<S: FrameScheduler, T: TimeSource> {
    state: LoopState,
    scheduler: S,
    clock: Clock<T>,
    frames: u64,
}

impl<S: FrameScheduler, T: TimeSource> RenderLoop<S, T> {
    pub fn new(scheduler: S, time: T) -> Self {
        Self {
            state: LoopState::Idle,
            scheduler,
            clock: Clock::new(time),
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Number of ticks that ran a frame body
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Idle to Running. Resets the clock and schedules the first frame.
    /// Returns false, doing nothing, if the loop is already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = LoopState::Running;
        self.clock.start();
        self.scheduler.request_frame();
        true
    }

    /// Run one frame: measure, call `body`, reschedule
    ///
    /// Ignored while Idle; no time is consumed and `body` is not called.
    pub fn tick<F: FnOnce(FrameTime)>(&mut self, body: F) -> Option<FrameTime> {
        if !self.is_running() {
            return None;
        }
        let delta = self.clock.delta();
        let time = FrameTime {
            delta,
            elapsed: self.clock.elapsed(),
            frame_index: self.frames,
        };
        self.frames += 1;
        body(time);
        self.scheduler.request_frame();
        Some(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct CountingScheduler {
        requests: u32,
    }

    impl FrameScheduler for CountingScheduler {
        fn request_frame(&mut self) {
            self.requests += 1;
        }
    }

    #[derive(Clone, Default)]
    struct ManualTime(Rc<Cell<f64>>);

    impl TimeSource for ManualTime {
        fn now(&self) -> f64 {
            self.0.get()
        }
    }

    fn driver() -> (RenderLoop<CountingScheduler, ManualTime>, ManualTime) {
        let time = ManualTime::default();
        (RenderLoop::new(CountingScheduler::default(), time.clone()), time)
    }

    #[test]
    fn idle_tick_is_a_no_op() {
        let (mut render_loop, time) = driver();
        time.0.set(1.0);

        let mut called = false;
        assert!(render_loop.tick(|_| called = true).is_none());
        assert!(!called);
        assert_eq!(render_loop.state(), LoopState::Idle);
        assert_eq!(render_loop.scheduler().requests, 0);
        assert_eq!(render_loop.frame_count(), 0);
    }

    #[test]
    fn start_transitions_once() {
        let (mut render_loop, _) = driver();
        assert!(render_loop.start());
        assert!(!render_loop.start());
        assert_eq!(render_loop.state(), LoopState::Running);
        assert_eq!(render_loop.scheduler().requests, 1);
    }

    #[test]
    fn tick_measures_from_start_and_reschedules() {
        let (mut render_loop, time) = driver();
        time.0.set(100.0);
        render_loop.start();

        time.0.set(100.25);
        let mut seen = None;
        let frame = render_loop.tick(|t| seen = Some(t));

        assert_eq!(frame, seen);
        let frame = frame.unwrap();
        assert_eq!(frame.delta, 0.25);
        assert_eq!(frame.frame_index, 0);
        assert_eq!(render_loop.scheduler().requests, 2);

        time.0.set(100.5);
        let frame = render_loop.tick(|_| {}).unwrap();
        assert_eq!(frame.frame_index, 1);
        assert_eq!(frame.elapsed, 0.5);
        assert_eq!(render_loop.frame_count(), 2);
    }

    #[test]
    fn slow_frame_yields_large_delta() {
        let (mut render_loop, time) = driver();
        render_loop.start();
        time.0.set(2.0);
        assert_eq!(render_loop.tick(|_| {}).map(|t| t.delta), Some(2.0));
    }
}
