use glam::DVec3;

/// Free-fly eye in world space, oriented by polar (`theta`) and azimuthal
/// (`phi`) angles.
///
/// Angles are never clamped or wrapped; the spherical parametrization keeps
/// both derived directions unit length for any value. Host state is `f64` so
/// small per-tick steps still register after long flights or many turns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: DVec3,
    pub theta: f64,
    pub phi: f64,
}

impl CameraState {
    pub fn new(position: DVec3, theta: f64, phi: f64) -> Self {
        Self { position, theta, phi }
    }

    /// Forward direction: `(sin θ cos φ, cos θ, sin θ sin φ)`.
    pub fn look_direction(&self) -> DVec3 {
        let (sin_t, cos_t) = self.theta.sin_cos();
        let (sin_p, cos_p) = self.phi.sin_cos();
        DVec3::new(sin_t * cos_p, cos_t, sin_t * sin_p)
    }

    /// Horizontal strafe direction: `(sin φ, 0, -cos φ)`.
    pub fn strafe_direction(&self) -> DVec3 {
        let (sin_p, cos_p) = self.phi.sin_cos();
        DVec3::new(sin_p, 0.0, -cos_p)
    }
}
