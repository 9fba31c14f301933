//! Frame scheduling: an explicit, stoppable animation loop.
//!
//! The host owns the "next frame" primitive (a redraw request, a vsync
//! callback, a headless `for` loop) and calls [`AnimationLoop::frame`] once
//! per frame with its current timestamp. The loop stops only through its
//! [`StopHandle`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::context::GraphicsContext;
use crate::renderer::Renderer;

/// Lifecycle of an animation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No frame drawn yet.
    Uninitialized,
    /// Drawing a frame every time the host asks.
    Running,
    /// Stop requested; no further frames are drawn.
    Stopped,
}

/// Cloneable cancellation token for an [`AnimationLoop`].
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Monotonic time source in milliseconds.
pub trait Clock {
    fn now_ms(&mut self) -> f64;
}

/// Milliseconds since the clock was created.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&mut self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Deterministic clock that advances a fixed step per reading.
#[derive(Debug, Clone)]
pub struct SteppedClock {
    now_ms: f64,
    step_ms: f64,
}

impl SteppedClock {
    pub fn new(start_ms: f64, step_ms: f64) -> Self {
        Self {
            now_ms: start_ms,
            step_ms,
        }
    }
}

impl Clock for SteppedClock {
    fn now_ms(&mut self) -> f64 {
        let now = self.now_ms;
        self.now_ms += self.step_ms;
        now
    }
}

/// Drives one renderer frame by frame until stopped.
pub struct AnimationLoop<R> {
    renderer: R,
    state: LoopState,
    stop: StopHandle,
    frames: u64,
    last_ms: f64,
}

impl<R> AnimationLoop<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            state: LoopState::Uninitialized,
            stop: StopHandle::new(),
            frames: 0,
            last_ms: 0.0,
        }
    }

    pub fn state(&self) -> LoopState {
        if self.stop.is_stopped() {
            LoopState::Stopped
        } else {
            self.state
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Time of the last drawn frame, in seconds.
    pub fn elapsed_secs(&self) -> f32 {
        (self.last_ms * 0.001) as f32
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Draw one frame at the host timestamp `timestamp_ms` unless stopped.
    ///
    /// Timestamps earlier than the previous frame are clamped to it. Returns
    /// the state after the call; the host schedules another frame only while
    /// it is [`LoopState::Running`].
    pub fn frame<C>(&mut self, ctx: &mut C, timestamp_ms: f64) -> LoopState
    where
        C: GraphicsContext,
        R: Renderer<C>,
    {
        if self.stop.is_stopped() {
            if self.state != LoopState::Stopped {
                tracing::info!("animation loop stopped after {} frames", self.frames);
                self.state = LoopState::Stopped;
            }
            return LoopState::Stopped;
        }

        if self.state == LoopState::Uninitialized {
            tracing::info!("animation loop started");
            self.state = LoopState::Running;
        }

        self.last_ms = timestamp_ms.max(self.last_ms);
        self.renderer.render(ctx, self.elapsed_secs());
        self.frames += 1;
        LoopState::Running
    }

    /// Drive frames from `clock` until stopped or `max_frames` more frames
    /// have been drawn. Returns the number of frames drawn by this call.
    pub fn run<C, K>(&mut self, ctx: &mut C, clock: &mut K, max_frames: Option<u64>) -> u64
    where
        C: GraphicsContext,
        R: Renderer<C>,
        K: Clock,
    {
        let start = self.frames;
        loop {
            if let Some(max) = max_frames {
                if self.frames - start >= max {
                    break;
                }
            }
            if self.frame(ctx, clock.now_ms()) == LoopState::Stopped {
                break;
            }
        }
        self.frames - start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::recording::RecordingContext;
    use crate::scene::SceneRenderer;
    use std::cell::Cell;

    /// Stops its own loop after a fixed number of frames.
    struct StopAfter {
        remaining: Cell<u32>,
        handle: StopHandle,
    }

    impl Renderer<RecordingContext> for StopAfter {
        fn render(&self, _ctx: &mut RecordingContext, _time: f32) {
            let left = self.remaining.get() - 1;
            self.remaining.set(left);
            if left == 0 {
                self.handle.stop();
            }
        }
    }

    fn scene_loop(ctx: &mut RecordingContext) -> AnimationLoop<SceneRenderer<RecordingContext>> {
        AnimationLoop::new(SceneRenderer::setup(ctx, &SceneConfig::default()).unwrap())
    }

    #[test]
    fn starts_uninitialized_then_runs() {
        let mut ctx = RecordingContext::new(800, 600);
        let mut animation = scene_loop(&mut ctx);
        assert_eq!(animation.state(), LoopState::Uninitialized);
        assert_eq!(animation.frame(&mut ctx, 16.0), LoopState::Running);
        assert_eq!(animation.state(), LoopState::Running);
        assert_eq!(animation.frames(), 1);
    }

    #[test]
    fn stopped_loop_draws_nothing() {
        let mut ctx = RecordingContext::new(800, 600);
        let mut animation = scene_loop(&mut ctx);
        animation.frame(&mut ctx, 0.0);
        animation.stop_handle().stop();

        assert_eq!(animation.frame(&mut ctx, 16.0), LoopState::Stopped);
        assert_eq!(animation.frame(&mut ctx, 32.0), LoopState::Stopped);
        assert_eq!(ctx.frames().len(), 1);
        assert_eq!(animation.state(), LoopState::Stopped);
    }

    #[test]
    fn timestamps_become_seconds() {
        let mut ctx = RecordingContext::new(800, 600);
        let mut animation = scene_loop(&mut ctx);
        animation.frame(&mut ctx, 1500.0);
        assert_eq!(animation.elapsed_secs(), 1.5);

        let expected = animation.renderer().transforms(800.0 / 600.0, 1.5);
        let drawn: Vec<_> = ctx.frames()[0].draws.iter().map(|d| d.transform).collect();
        assert_eq!(drawn, expected);
    }

    #[test]
    fn time_never_runs_backwards() {
        let mut ctx = RecordingContext::new(800, 600);
        let mut animation = scene_loop(&mut ctx);
        animation.frame(&mut ctx, 2000.0);
        animation.frame(&mut ctx, 1000.0);
        assert_eq!(animation.elapsed_secs(), 2.0);
        let frames = ctx.frames();
        assert_eq!(frames[0], frames[1]);
    }

    #[test]
    fn run_honors_frame_limit() {
        let mut ctx = RecordingContext::new(800, 600);
        let mut animation = scene_loop(&mut ctx);
        let mut clock = SteppedClock::new(0.0, 16.0);
        assert_eq!(animation.run(&mut ctx, &mut clock, Some(5)), 5);
        assert_eq!(ctx.frames().len(), 5);
        assert!((animation.elapsed_secs() - 0.064).abs() < 1e-6);
    }

    #[test]
    fn run_ends_when_stopped() {
        let mut ctx = RecordingContext::new(800, 600);
        let handle = StopHandle::new();
        let renderer = StopAfter {
            remaining: Cell::new(4),
            handle: handle.clone(),
        };
        let mut animation = AnimationLoop::new(renderer);
        animation.stop = handle;

        let mut clock = SteppedClock::new(0.0, 16.0);
        assert_eq!(animation.run(&mut ctx, &mut clock, None), 4);
        assert_eq!(animation.state(), LoopState::Stopped);
    }

    #[test]
    fn stepped_clock_advances() {
        let mut clock = SteppedClock::new(100.0, 10.0);
        assert_eq!(clock.now_ms(), 100.0);
        assert_eq!(clock.now_ms(), 110.0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let mut clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
