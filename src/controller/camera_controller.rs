use crate::controller::InputState;
use crate::model::CameraState;

/// Applies one tick of input to the camera.
pub struct CameraController {
    /// Radians per pixel of pointer offset, per tick
    pub look_sensitivity: f64,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(1.0 / 50_000.0)
    }
}

impl CameraController {
    pub fn new(look_sensitivity: f64) -> Self {
        Self { look_sensitivity }
    }

    /// Turn by the held pointer offset while look is enabled.
    ///
    /// The offset is a position, not a delta, so a pointer resting off-centre
    /// keeps turning the camera at a constant rate.
    pub fn apply_look(&self, camera: &mut CameraState, input: &InputState) {
        if !input.look_enabled {
            return;
        }
        camera.theta += f64::from(input.mouse_offset.y) * self.look_sensitivity;
        camera.phi += f64::from(input.mouse_offset.x) * self.look_sensitivity;
    }

    /// Move along the look and strafe directions, then vertically.
    pub fn apply_movement(&self, camera: &mut CameraState, input: &InputState) {
        let look = camera.look_direction();
        let strafe = camera.strafe_direction();
        camera.position += input.forward_axis() * look + input.strafe_axis() * strafe;
        camera.position.y += input.vertical_axis();
    }

    pub fn update(&self, camera: &mut CameraState, input: &InputState) {
        self.apply_look(camera, input);
        self.apply_movement(camera, input);
    }
}
