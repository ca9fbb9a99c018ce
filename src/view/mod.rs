// VIEW: GPU setup, shader loading, uniforms and drawing
pub mod gpu_init;
pub mod render;
pub mod shader;
pub mod uniforms;

pub use gpu_init::GpuContext;
pub use render::{GpuFrame, PipelineResources, RenderState, UniformResources};
pub use shader::ShaderSources;
pub use uniforms::{ParamKind, ParameterSink, ParameterSlot, UniformBlock, UniformLayout, UniformSync};
