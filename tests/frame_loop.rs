use approx::assert_relative_eq;

use bulbview::controller::{FramePipeline, FrameReadout, FrameScheduler, InputEvent, InputState, KeyBindings, ManualClock};
use bulbview::ui;
use bulbview::view::{ParameterSink, ParameterSlot, UniformBlock, UniformLayout, UniformSync};
use bulbview::ViewerConfig;

/// Writes into a real uniform block and keeps every readout it was asked to draw.
#[derive(Default)]
struct RecordingPipeline {
    block: UniformBlock,
    readouts: Vec<FrameReadout>,
}

impl ParameterSink for RecordingPipeline {
    fn write_scalar(&mut self, slot: ParameterSlot, value: f32) {
        self.block.write_scalar(slot, value);
    }

    fn write_vec2(&mut self, slot: ParameterSlot, value: [f32; 2]) {
        self.block.write_vec2(slot, value);
    }

    fn write_vec3(&mut self, slot: ParameterSlot, value: [f32; 3]) {
        self.block.write_vec3(slot, value);
    }
}

impl FramePipeline for RecordingPipeline {
    fn draw(&mut self, readout: &FrameReadout) {
        self.readouts.push(*readout);
    }
}

fn running_scheduler(clock: &ManualClock) -> FrameScheduler<&ManualClock> {
    let mut sched = FrameScheduler::new(
        clock,
        &ViewerConfig::default(),
        UniformSync::resolve(&UniformLayout::FRACTAL),
    );
    sched.begin_running();
    sched
}

#[test]
fn first_tick_draws_start_view() {
    let clock = ManualClock::new(0.0);
    let mut sched = running_scheduler(&clock);
    let mut pipeline = RecordingPipeline::default();

    let readout = sched.tick(&InputState::new(), &mut pipeline).unwrap();

    assert_eq!(readout.frame, 1);
    assert_eq!(ui::power_label(&readout), "Power: 6.00");
    assert_eq!(ui::fps_label(&readout), "FPS: -");

    let params = pipeline.block.params();
    assert_eq!(params.eye, [0.0, 0.0, -50.0]);
    assert_relative_eq!(params.look_dir[0], 0.0, epsilon = 1e-6);
    assert_relative_eq!(params.look_dir[1], 0.0, epsilon = 1e-6);
    assert_relative_eq!(params.look_dir[2], 1.0, epsilon = 1e-6);
    assert_eq!(pipeline.readouts.len(), 1);
}

#[test]
fn holding_forward_moves_along_look_direction() {
    let clock = ManualClock::new(0.0);
    let mut sched = running_scheduler(&clock);
    let mut pipeline = RecordingPipeline::default();
    let bindings = KeyBindings::default();

    let mut input = InputState::new();
    input.process_event(&InputEvent::KeyDown("w".into()), &bindings);

    for _ in 0..30 {
        clock.advance(16.0);
        sched.tick(&input, &mut pipeline);
    }

    let pos = sched.camera().position;
    assert_relative_eq!(pos.x, 0.0, epsilon = 1e-4);
    assert_relative_eq!(pos.y, 0.0, epsilon = 1e-4);
    assert_relative_eq!(pos.z, -50.0 + 0.1 * 30.0, epsilon = 1e-3);
    assert_relative_eq!(pipeline.block.params().eye[2], pos.z as f32);

    // Released: position holds
    input.process_event(&InputEvent::KeyUp("w".into()), &bindings);
    sched.tick(&input, &mut pipeline);
    assert_relative_eq!(sched.camera().position.z, pos.z);
}

#[test]
fn opposing_keys_cancel() {
    let clock = ManualClock::new(0.0);
    let mut sched = running_scheduler(&clock);
    let mut pipeline = RecordingPipeline::default();
    let bindings = KeyBindings::default();

    let mut input = InputState::new();
    input.process_event(&InputEvent::KeyDown("a".into()), &bindings);
    input.process_event(&InputEvent::KeyDown("d".into()), &bindings);
    for _ in 0..10 {
        sched.tick(&input, &mut pipeline);
    }

    assert_eq!(sched.camera().position.to_array(), [0.0, 0.0, -50.0]);
}

#[test]
fn hundred_ticks_over_two_seconds_reads_fifty() {
    let clock = ManualClock::new(0.0);
    let mut sched = running_scheduler(&clock);
    let mut pipeline = RecordingPipeline::default();

    for _ in 0..100 {
        clock.advance(20.0);
        sched.tick(&InputState::new(), &mut pipeline);
    }

    let last = pipeline.readouts.last().copied().unwrap();
    assert_eq!(last.fps, Some(50));
    assert_eq!(ui::fps_label(&last), "FPS: 50");
    // Not refreshed before the window closes
    assert_eq!(pipeline.readouts[98].fps, None);
}

#[test]
fn look_disabled_ignores_pointer_offset() {
    let clock = ManualClock::new(0.0);
    let mut sched = running_scheduler(&clock);
    let mut pipeline = RecordingPipeline::default();
    let bindings = KeyBindings::default();

    let mut input = InputState::new();
    input.process_event(&InputEvent::PointerMove { offset: glam::Vec2::new(300.0, -200.0) }, &bindings);
    let (theta, phi) = (sched.camera().theta, sched.camera().phi);
    for _ in 0..20 {
        sched.tick(&input, &mut pipeline);
    }
    assert_eq!(sched.camera().theta, theta);
    assert_eq!(sched.camera().phi, phi);

    // Pressing enables look; the held offset keeps turning the camera every tick
    input.process_event(&InputEvent::PointerDown, &bindings);
    sched.tick(&input, &mut pipeline);
    let after_one = sched.camera().phi;
    sched.tick(&input, &mut pipeline);
    assert_relative_eq!(after_one - phi, 300.0 / 50_000.0, epsilon = 1e-6);
    assert_relative_eq!(sched.camera().phi - after_one, 300.0 / 50_000.0, epsilon = 1e-6);
}

#[test]
fn focus_loss_stops_movement() {
    let clock = ManualClock::new(0.0);
    let mut sched = running_scheduler(&clock);
    let mut pipeline = RecordingPipeline::default();
    let bindings = KeyBindings::default();

    let mut input = InputState::new();
    input.process_event(&InputEvent::KeyDown(" ".into()), &bindings);
    sched.tick(&input, &mut pipeline);
    let y = sched.camera().position.y;
    assert_relative_eq!(y, 0.1, epsilon = 1e-6);

    input.process_event(&InputEvent::FocusLost, &bindings);
    sched.tick(&input, &mut pipeline);
    assert_eq!(sched.camera().position.y, y);
}

#[test]
fn power_follows_frame_count() {
    let clock = ManualClock::new(0.0);
    let mut sched = running_scheduler(&clock);
    let mut pipeline = RecordingPipeline::default();

    for _ in 0..3142 {
        sched.tick(&InputState::new(), &mut pipeline);
    }

    // sin(3142 / 2000) is within a hair of 1
    let readout = pipeline.readouts.last().copied().unwrap();
    assert_eq!(ui::power_label(&readout), "Power: 10.00");
    assert_eq!(pipeline.block.params().power, readout.power);
}

#[test]
fn uppercase_letters_are_not_bound() {
    let clock = ManualClock::new(0.0);
    let mut sched = running_scheduler(&clock);
    let mut pipeline = RecordingPipeline::default();
    let bindings = KeyBindings::default();

    let mut input = InputState::new();
    for key in ["W", "A", "S", "D"] {
        input.process_event(&InputEvent::KeyDown(key.into()), &bindings);
    }
    for _ in 0..10 {
        sched.tick(&input, &mut pipeline);
    }

    assert_eq!(sched.camera().position.to_array(), [0.0, 0.0, -50.0]);
}
