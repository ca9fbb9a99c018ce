use std::cell::Cell;

use crate::config::ViewerConfig;
use crate::controller::{CameraController, InputState};
use crate::model::{AnimationState, CameraState};
use crate::view::uniforms::{ParameterSink, UniformSync};

/// Millisecond time source for frame-rate measurement.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Browser `performance.now()`.
#[cfg(target_arch = "wasm32")]
pub struct PerformanceClock {
    performance: web_sys::Performance,
}

#[cfg(target_arch = "wasm32")]
impl PerformanceClock {
    pub fn new(window: &web_sys::Window) -> Option<Self> {
        window.performance().map(|performance| Self { performance })
    }
}

#[cfg(target_arch = "wasm32")]
impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        self.performance.now()
    }
}

/// Monotonic wall clock, zeroed at construction.
#[cfg(not(target_arch = "wasm32"))]
pub struct SystemClock {
    start: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl SystemClock {
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock for tests and deterministic replay.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self { now: Cell::new(start_ms) }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

/// Frames per second over fixed windows of ticks.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: u32,
    frames: u32,
    window_start_ms: f64,
    fps: Option<u32>,
}

impl FpsCounter {
    pub fn new(window: u32, now_ms: f64) -> Self {
        Self {
            window: window.max(1),
            frames: 0,
            window_start_ms: now_ms,
            fps: None,
        }
    }

    pub fn reset(&mut self, now_ms: f64) {
        self.frames = 0;
        self.window_start_ms = now_ms;
    }

    /// Count one frame; returns the new rate when a window closes.
    pub fn tick(&mut self, now_ms: f64) -> Option<u32> {
        self.frames += 1;
        if self.frames < self.window {
            return None;
        }
        let elapsed = now_ms - self.window_start_ms;
        let measured = if elapsed > 0.0 {
            let fps = (self.window as f64 * 1000.0 / elapsed).round() as u32;
            self.fps = Some(fps);
            Some(fps)
        } else {
            None
        };
        self.reset(now_ms);
        measured
    }

    /// Last completed measurement
    pub fn fps(&self) -> Option<u32> {
        self.fps
    }
}

/// Values shown on screen after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReadout {
    pub frame: u64,
    pub fps: Option<u32>,
    pub power: f32,
}

/// Draw target for one tick: parameter writes followed by exactly one draw.
pub trait FramePipeline: ParameterSink {
    fn draw(&mut self, readout: &FrameReadout);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Waiting on shader sources and one-time GPU setup
    Loading,
    Running,
}

/// Fixed-order per-refresh update: counters, frame rate, camera, animation,
/// uniform sync, draw.
pub struct FrameScheduler<C: Clock> {
    clock: C,
    phase: LoopPhase,
    fps: FpsCounter,
    animation: AnimationState,
    camera: CameraState,
    camera_controller: CameraController,
    uniform_sync: UniformSync,
}

impl<C: Clock> FrameScheduler<C> {
    pub fn new(clock: C, config: &ViewerConfig, uniform_sync: UniformSync) -> Self {
        let now = clock.now_ms();
        Self {
            clock,
            phase: LoopPhase::Loading,
            fps: FpsCounter::new(config.fps_window, now),
            animation: AnimationState::new(),
            camera: CameraState::new(config.start_position, config.start_theta, config.start_phi),
            camera_controller: CameraController::new(config.look_sensitivity),
            uniform_sync,
        }
    }

    /// Setup is complete; the measurement window starts now.
    pub fn begin_running(&mut self) {
        if self.phase == LoopPhase::Running {
            return;
        }
        self.fps.reset(self.clock.now_ms());
        self.phase = LoopPhase::Running;
        tracing::info!("frame loop running");
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    /// Run one tick against a snapshot of the input. Ignored while loading.
    pub fn tick<P: FramePipeline>(&mut self, input: &InputState, pipeline: &mut P) -> Option<FrameReadout> {
        if self.phase != LoopPhase::Running {
            tracing::trace!("tick ignored while loading");
            return None;
        }

        let frame = self.animation.advance();
        if let Some(fps) = self.fps.tick(self.clock.now_ms()) {
            tracing::debug!(fps, frame, "frame rate");
        }

        self.camera_controller.update(&mut self.camera, input);
        let power = self.animation.power();
        self.uniform_sync.push(pipeline, &self.camera, power);

        let readout = FrameReadout { frame, fps: self.fps.fps(), power };
        pipeline.draw(&readout);
        Some(readout)
    }
}
