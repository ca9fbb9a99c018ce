use wgpu::*;

use crate::controller::{FramePipeline, FrameReadout};
use crate::logging::SHADER_TARGET;
use crate::ui;
use crate::utils::{create_quad_mesh, MeshBuffer, Vertex};
use crate::view::shader::ShaderSources;
use crate::view::uniforms::{FractalParams, ParameterSink, ParameterSlot, UniformBlock};
use crate::view::GpuContext;

pub struct UniformResources {
    pub buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

pub struct PipelineResources {
    pub pipeline: wgpu::RenderPipeline,
    /// False when compilation or linking reported errors
    pub valid: bool,
}

pub fn create_uniform_resources(device: &wgpu::Device) -> UniformResources {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("fractal_params"),
        size: std::mem::size_of::<FractalParams>() as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("fractal_params_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("fractal_params_bind_group"),
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
    });

    UniformResources { buffer, bind_group_layout, bind_group }
}

/// Compile both programs and link the quad pipeline.
///
/// Diagnostics go to the `shader` log target only; a failed pipeline is still
/// returned, flagged invalid, so startup carries on.
pub async fn create_fractal_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    bind_group_layout: &wgpu::BindGroupLayout,
    sources: &ShaderSources,
) -> PipelineResources {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let vertex_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("vertex_shader"),
        source: wgpu::ShaderSource::Wgsl(sources.vertex.as_str().into()),
    });
    let fragment_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fragment_shader"),
        source: wgpu::ShaderSource::Wgsl(sources.fragment.as_str().into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("fractal_pipeline_layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("fractal_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vertex_shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::LAYOUT],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment_shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    });

    let valid = match device.pop_error_scope().await {
        Some(err) => {
            tracing::error!(target: SHADER_TARGET, "pipeline build failed:\n{err}");
            false
        }
        None => {
            tracing::info!(target: SHADER_TARGET, "vertex shader: OK, fragment shader: OK, program: OK");
            true
        }
    };

    PipelineResources { pipeline, valid }
}

///////////////////////////////////////////////////////////////////////////////

/// Everything needed to draw one frame of the fractal plus the readouts
pub struct RenderState {
    pub width: u32,
    pub height: u32,

    pub pipeline: RenderPipeline,
    pub pipeline_valid: bool,
    pub quad: MeshBuffer,
    pub uniform_buffer: Buffer,
    pub uniform_bind_group: BindGroup,

    // UI
    pub egui_ctx: egui::Context,
    pub egui_renderer: egui_wgpu::Renderer,
    pub egui_dpr: f32,
}

impl RenderState {
    pub async fn new(gpu: &GpuContext, sources: &ShaderSources) -> Self {
        let device = gpu.device.as_ref();
        let uniforms = create_uniform_resources(device);
        let pipes = create_fractal_pipeline(device, gpu.format, &uniforms.bind_group_layout, sources).await;
        let quad = create_quad_mesh().upload(device);
        let egui_renderer = egui_wgpu::Renderer::new(device, gpu.format, egui_wgpu::RendererOptions::default());

        Self {
            width: gpu.config.width,
            height: gpu.config.height,
            pipeline: pipes.pipeline,
            pipeline_valid: pipes.valid,
            quad,
            uniform_buffer: uniforms.buffer,
            uniform_bind_group: uniforms.bind_group,
            egui_ctx: egui::Context::default(),
            egui_renderer,
            egui_dpr: 1.0,
        }
    }

    /// Clear, draw the quad once, then the readout overlay.
    pub fn draw_frame(
        &mut self,
        gpu: &GpuContext,
        raw_input: egui::RawInput,
        readout: &FrameReadout,
    ) -> Result<egui::PlatformOutput, SurfaceError> {
        let device = gpu.device.as_ref();
        let queue = gpu.queue.as_ref();

        let mut full_output = ui::build_ui(&self.egui_ctx, raw_input, readout);
        let primitives = self
            .egui_ctx
            .tessellate(std::mem::take(&mut full_output.shapes), self.egui_dpr);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.width, self.height],
            pixels_per_point: self.egui_dpr,
        };

        let frame = gpu.surface.get_current_texture()?;
        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("fractal_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::BLACK),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if self.pipeline_valid {
                rp.set_pipeline(&self.pipeline);
                rp.set_bind_group(0, &self.uniform_bind_group, &[]);
                rp.set_vertex_buffer(0, self.quad.vertex_buffer.slice(..));
                rp.draw(0..self.quad.vertex_count, 0..1);
            }
        }

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(device, queue, &mut encoder, &primitives, &screen_descriptor);

        {
            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Load,
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &primitives, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(full_output.platform_output)
    }
}

/// One tick's view of the GPU: parameter writes land in the uniform block,
/// `draw` uploads it and renders.
pub struct GpuFrame<'a> {
    pub gpu: &'a GpuContext,
    pub render: &'a mut RenderState,
    pub uniforms: &'a mut UniformBlock,
    pub raw_input: Option<egui::RawInput>,
    pub platform_output: Option<egui::PlatformOutput>,
}

impl<'a> GpuFrame<'a> {
    pub fn new(
        gpu: &'a GpuContext,
        render: &'a mut RenderState,
        uniforms: &'a mut UniformBlock,
        raw_input: egui::RawInput,
    ) -> Self {
        Self { gpu, render, uniforms, raw_input: Some(raw_input), platform_output: None }
    }
}

impl ParameterSink for GpuFrame<'_> {
    fn write_scalar(&mut self, slot: ParameterSlot, value: f32) {
        self.uniforms.write_scalar(slot, value);
    }

    fn write_vec2(&mut self, slot: ParameterSlot, value: [f32; 2]) {
        self.uniforms.write_vec2(slot, value);
    }

    fn write_vec3(&mut self, slot: ParameterSlot, value: [f32; 3]) {
        self.uniforms.write_vec3(slot, value);
    }
}

impl FramePipeline for GpuFrame<'_> {
    fn draw(&mut self, readout: &FrameReadout) {
        self.uniforms.upload(self.gpu.queue.as_ref(), &self.render.uniform_buffer);
        let raw_input = self.raw_input.take().unwrap_or_default();
        match self.render.draw_frame(self.gpu, raw_input, readout) {
            Ok(output) => self.platform_output = Some(output),
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                tracing::debug!("surface lost, reconfiguring");
                self.gpu.reconfigure();
            }
            Err(e) => tracing::warn!("frame skipped: {e:?}"),
        }
    }
}
