// MODEL: camera and animation state
pub mod camera;
pub mod animation;

pub use camera::CameraState;
pub use animation::{AnimationState, power_at};
