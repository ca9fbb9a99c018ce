//! Mandelbulb power animation, driven purely by the frame count.

/// Frames per radian of the power oscillation.
pub const FRAMES_PER_RADIAN: f64 = 2000.0;
pub const POWER_AMPLITUDE: f64 = 4.0;
pub const POWER_OFFSET: f64 = 6.0;

/// Frames in one full power cycle (`2000 * 2π`).
pub const PERIOD_FRAMES: f64 = FRAMES_PER_RADIAN * std::f64::consts::TAU;

/// `sin(frames / 2000) * 4 + 6`, always within `[2, 10]`.
pub fn power_at(frames: f64) -> f64 {
    (frames / FRAMES_PER_RADIAN).sin() * POWER_AMPLITUDE + POWER_OFFSET
}

/// Monotonic frame counter; the power is derived, never stored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnimationState {
    frame: u64,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn advance(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    pub fn power(&self) -> f32 {
        power_at(self.frame as f64) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn power_starts_at_offset() {
        assert_eq!(AnimationState::new().power(), 6.0);
    }

    #[test]
    fn power_stays_in_range() {
        let mut frame = 0u64;
        while frame < 200_000 {
            let p = power_at(frame as f64);
            assert!((2.0..=10.0).contains(&p), "power {p} at frame {frame}");
            frame += 37;
        }
        // Exact peaks
        assert_abs_diff_eq!(power_at(PERIOD_FRAMES / 4.0), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(power_at(3.0 * PERIOD_FRAMES / 4.0), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn power_is_periodic() {
        assert_abs_diff_eq!(PERIOD_FRAMES, 4000.0 * std::f64::consts::PI, epsilon = 1e-9);
        for t in [0.0, 1.0, 517.0, 3141.5, 9999.0, 123_456.0] {
            assert_abs_diff_eq!(power_at(t), power_at(t + PERIOD_FRAMES), epsilon = 1e-9);
            assert_abs_diff_eq!(power_at(t), power_at(t + 3.0 * PERIOD_FRAMES), epsilon = 1e-8);
        }
    }

    #[test]
    fn advance_is_monotonic() {
        let mut anim = AnimationState::new();
        assert_eq!(anim.advance(), 1);
        assert_eq!(anim.advance(), 2);
        assert_eq!(anim.frame(), 2);
        assert_abs_diff_eq!(anim.power(), power_at(2.0) as f32);
    }
}
