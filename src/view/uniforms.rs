use std::mem::offset_of;

use crate::config::ViewerConfig;
use crate::model::CameraState;

/// CPU mirror of the fragment program's `FractalParams` uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FractalParams {
    pub eye: [f32; 3],
    pub power: f32,
    pub look_dir: [f32; 3],
    pub min_dist: f32,
    pub resolution: [f32; 2],
    pub max_dist: f32,
    pub _pad: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Scalar,
    Vec2,
    Vec3,
}

impl ParamKind {
    pub const fn size(self) -> usize {
        match self {
            ParamKind::Scalar => 4,
            ParamKind::Vec2 => 8,
            ParamKind::Vec3 => 12,
        }
    }
}

/// Handle to one named member of the uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSlot {
    offset: usize,
    kind: ParamKind,
}

impl ParameterSlot {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }
}

/// Name table for a uniform block.
pub struct UniformLayout {
    entries: &'static [(&'static str, ParamKind, usize)],
}

impl UniformLayout {
    pub const FRACTAL: UniformLayout = UniformLayout {
        entries: &[
            ("eye", ParamKind::Vec3, offset_of!(FractalParams, eye)),
            ("power", ParamKind::Scalar, offset_of!(FractalParams, power)),
            ("look_dir", ParamKind::Vec3, offset_of!(FractalParams, look_dir)),
            ("min_dist", ParamKind::Scalar, offset_of!(FractalParams, min_dist)),
            ("resolution", ParamKind::Vec2, offset_of!(FractalParams, resolution)),
            ("max_dist", ParamKind::Scalar, offset_of!(FractalParams, max_dist)),
        ],
    };

    /// Look up a parameter by name. Unknown names resolve to `None`.
    pub fn resolve(&self, name: &str) -> Option<ParameterSlot> {
        let slot = self
            .entries
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|&(_, kind, offset)| ParameterSlot { offset, kind });
        if slot.is_none() {
            tracing::warn!(name, "uniform not found; writes to it will be ignored");
        }
        slot
    }
}

/// Typed writes into pipeline parameters.
pub trait ParameterSink {
    fn write_scalar(&mut self, slot: ParameterSlot, value: f32);
    fn write_vec2(&mut self, slot: ParameterSlot, value: [f32; 2]);
    fn write_vec3(&mut self, slot: ParameterSlot, value: [f32; 3]);
}

/// Uniform block contents plus a dirty flag; uploaded once per frame.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    params: FractalParams,
    dirty: bool,
}

impl Default for UniformBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformBlock {
    pub fn new() -> Self {
        Self {
            params: bytemuck::Zeroable::zeroed(),
            dirty: true,
        }
    }

    pub fn params(&self) -> &FractalParams {
        &self.params
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn write_bytes(&mut self, slot: ParameterSlot, bytes: &[u8]) {
        debug_assert_eq!(bytes.len(), slot.kind.size(), "write does not match slot kind");
        let dst = bytemuck::bytes_of_mut(&mut self.params);
        let end = slot.offset + bytes.len();
        if end > dst.len() {
            return;
        }
        dst[slot.offset..end].copy_from_slice(bytes);
        self.dirty = true;
    }

    /// Copy the block into `buffer` if anything changed since the last upload.
    pub fn upload(&mut self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        if self.dirty {
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(&self.params));
            self.dirty = false;
        }
    }
}

impl ParameterSink for UniformBlock {
    fn write_scalar(&mut self, slot: ParameterSlot, value: f32) {
        self.write_bytes(slot, bytemuck::bytes_of(&value));
    }

    fn write_vec2(&mut self, slot: ParameterSlot, value: [f32; 2]) {
        self.write_bytes(slot, bytemuck::bytes_of(&value));
    }

    fn write_vec3(&mut self, slot: ParameterSlot, value: [f32; 3]) {
        self.write_bytes(slot, bytemuck::bytes_of(&value));
    }
}

/// Per-frame writes of camera and animation state.
///
/// Slots are resolved once; a slot that failed to resolve is skipped silently.
/// Host values are `f64` and narrowed to `f32` only here.
#[derive(Debug, Clone, Copy)]
pub struct UniformSync {
    eye: Option<ParameterSlot>,
    look_dir: Option<ParameterSlot>,
    power: Option<ParameterSlot>,
    resolution: Option<ParameterSlot>,
}

impl UniformSync {
    pub fn resolve(layout: &UniformLayout) -> Self {
        Self {
            eye: layout.resolve("eye"),
            look_dir: layout.resolve("look_dir"),
            power: layout.resolve("power"),
            resolution: layout.resolve("resolution"),
        }
    }

    pub fn push<S: ParameterSink + ?Sized>(&self, sink: &mut S, camera: &CameraState, power: f32) {
        if let Some(slot) = self.eye {
            sink.write_vec3(slot, camera.position.as_vec3().to_array());
        }
        if let Some(slot) = self.look_dir {
            sink.write_vec3(slot, camera.look_direction().as_vec3().to_array());
        }
        if let Some(slot) = self.power {
            sink.write_scalar(slot, power);
        }
    }

    /// Surface size, written at startup and again after a resize.
    pub fn write_resolution<S: ParameterSink + ?Sized>(&self, sink: &mut S, width: u32, height: u32) {
        if let Some(slot) = self.resolution {
            sink.write_vec2(slot, [width as f32, height as f32]);
        }
    }
}

/// Startup-only parameters: march bounds and surface resolution.
pub fn write_startup_params<S: ParameterSink + ?Sized>(
    sink: &mut S,
    layout: &UniformLayout,
    sync: &UniformSync,
    config: &ViewerConfig,
    width: u32,
    height: u32,
) {
    if let Some(slot) = layout.resolve("min_dist") {
        sink.write_scalar(slot, config.min_dist);
    }
    if let Some(slot) = layout.resolve("max_dist") {
        sink.write_scalar(slot, config.max_dist);
    }
    sync.write_resolution(sink, width, height);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn block_matches_wgsl_layout() {
        // vec3 members align to 16 bytes in WGSL uniform space
        assert_eq!(std::mem::size_of::<FractalParams>(), 48);
        let layout = &UniformLayout::FRACTAL;
        let offset = |name| layout.resolve(name).map(|s| s.offset());
        assert_eq!(offset("eye"), Some(0));
        assert_eq!(offset("power"), Some(12));
        assert_eq!(offset("look_dir"), Some(16));
        assert_eq!(offset("min_dist"), Some(28));
        assert_eq!(offset("resolution"), Some(32));
        assert_eq!(offset("max_dist"), Some(40));
        assert_eq!(layout.resolve("resolution").map(|s| s.kind()), Some(ParamKind::Vec2));
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        assert_eq!(UniformLayout::FRACTAL.resolve("iTime"), None);
        assert_eq!(UniformLayout::FRACTAL.resolve("Eye"), None);
    }

    #[test]
    fn sync_writes_camera_and_power() {
        let camera = CameraState::new(DVec3::new(1.0, 2.0, 3.0), FRAC_PI_2, FRAC_PI_2);
        let mut block = UniformBlock::new();
        UniformSync::resolve(&UniformLayout::FRACTAL).push(&mut block, &camera, 7.25);

        let params = block.params();
        assert_eq!(params.eye, [1.0, 2.0, 3.0]);
        assert_eq!(params.look_dir, camera.look_direction().as_vec3().to_array());
        assert_eq!(params.power, 7.25);
        // Startup-only members untouched
        assert_eq!(params.max_dist, 0.0);
        assert_eq!(params.resolution, [0.0, 0.0]);
    }

    #[test]
    fn unresolved_slots_are_skipped() {
        static PARTIAL: UniformLayout = UniformLayout {
            entries: &[("power", ParamKind::Scalar, offset_of!(FractalParams, power))],
        };
        let camera = CameraState::new(DVec3::splat(9.0), 0.4, 1.1);
        let mut block = UniformBlock::new();
        let sync = UniformSync::resolve(&PARTIAL);
        sync.push(&mut block, &camera, 3.5);
        sync.write_resolution(&mut block, 640, 480);
        assert_eq!(block.params().power, 3.5);
        assert_eq!(block.params().eye, [0.0; 3]);
        assert_eq!(block.params().look_dir, [0.0; 3]);
        assert_eq!(block.params().resolution, [0.0; 2]);
    }

    #[test]
    fn startup_params_fill_bounds_and_resolution() {
        let mut block = UniformBlock::new();
        let layout = &UniformLayout::FRACTAL;
        let sync = UniformSync::resolve(layout);
        write_startup_params(&mut block, layout, &sync, &ViewerConfig::default(), 800, 600);
        let params = block.params();
        assert_eq!(params.min_dist, 0.0);
        assert_eq!(params.max_dist, 2000.0);
        assert_eq!(params.resolution, [800.0, 600.0]);
        assert!(block.is_dirty());
    }

    #[test]
    fn resize_reuses_resolved_resolution_slot() {
        let sync = UniformSync::resolve(&UniformLayout::FRACTAL);
        let mut block = UniformBlock::new();
        for (w, h) in [(800, 600), (1024, 768), (1, 1)] {
            sync.write_resolution(&mut block, w, h);
            assert_eq!(block.params().resolution, [w as f32, h as f32]);
        }
        // Per-frame sync leaves it alone
        let camera = CameraState::new(DVec3::ZERO, FRAC_PI_2, FRAC_PI_2);
        sync.push(&mut block, &camera, 6.0);
        assert_eq!(block.params().resolution, [1.0, 1.0]);
    }

    #[test]
    fn narrowing_keeps_far_eye_positions() {
        let far = DVec3::new(0.0, 0.0, 3.0e6);
        let camera = CameraState::new(far, FRAC_PI_2, FRAC_PI_2);
        let mut block = UniformBlock::new();
        UniformSync::resolve(&UniformLayout::FRACTAL).push(&mut block, &camera, 6.0);
        assert_eq!(block.params().eye, [0.0, 0.0, 3.0e6]);
    }
}
