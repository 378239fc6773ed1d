pub mod buffers;
pub mod context;
pub mod pipelines;
pub mod uniforms;

pub(crate) use buffers::{DrawUniformBuffer, InstanceBuffer};
pub(crate) use context::GpuContext;
pub(crate) use pipelines::{GpuShader, PipelineCache, PipelineKey};
pub(crate) use uniforms::DrawUniforms;
