// CONTROLLER: input, camera update and the frame loop
pub mod input;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{Control, InputEvent, InputState, KeyBindings};
pub use camera_controller::CameraController;
pub use frame_loop::{Clock, FpsCounter, FramePipeline, FrameReadout, FrameScheduler, LoopPhase, ManualClock};
