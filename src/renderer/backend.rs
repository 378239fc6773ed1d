use std::ops::Range;

use bitflags::bitflags;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::asset::Handle;
use crate::error::BackendError;
use crate::renderer::shader::ShaderDesc;
use crate::renderer::texture::TextureImage;
use crate::renderer::Vertex;

/// Marker for vertex/index buffer pairs owned by a backend.
pub enum MeshBuffers {}
/// Marker for compiled shader programs owned by a backend.
pub enum ShaderProgram {}
/// Marker for sampled textures owned by a backend.
pub enum TextureResource {}

pub type MeshBufferId = Handle<MeshBuffers>;
pub type ShaderId = Handle<ShaderProgram>;
pub type TextureId = Handle<TextureResource>;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthCompare {
    Less,
    LessEqual,
}

impl DepthCompare {
    pub fn to_wgpu(self) -> wgpu::CompareFunction {
        match self {
            DepthCompare::Less => wgpu::CompareFunction::Less,
            DepthCompare::LessEqual => wgpu::CompareFunction::LessEqual,
        }
    }
}

/// Global rasterizer setting applied to every draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderingMode {
    /// Depth-tested filled polygons.
    #[default]
    Default,
    /// Wireframe.
    DebugLine,
    /// Filled polygons.
    DebugFill,
}

impl RenderingMode {
    pub fn polygon_mode(self) -> wgpu::PolygonMode {
        match self {
            RenderingMode::DebugLine => wgpu::PolygonMode::Line,
            RenderingMode::Default | RenderingMode::DebugFill => wgpu::PolygonMode::Fill,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

/// The GPU binding layer the renderer drives.
///
/// Calls arrive in submission order for one frame and end with
/// [`finish_frame`](GpuBackend::finish_frame). Implementations decide how
/// and when the work reaches the device.
pub trait GpuBackend {
    fn clear(&mut self, flags: ClearFlags);
    fn set_rendering_mode(&mut self, mode: RenderingMode);
    fn set_depth_compare(&mut self, compare: DepthCompare);

    fn create_mesh_buffers(&mut self, vertices: &[Vertex], indices: &[u32]) -> MeshBufferId;
    /// Declares the per-vertex attributes (locations 0..=2) for `mesh`.
    fn configure_vertex_attributes(&mut self, mesh: MeshBufferId);
    /// Declares the per-instance matrix attributes (locations 3..=10) for
    /// `mesh`, sourced from the currently bound instance buffer.
    fn configure_instance_attributes(&mut self, mesh: MeshBufferId);
    fn release_mesh_buffers(&mut self, mesh: MeshBufferId);

    fn bind_instance_buffer(&mut self);
    /// Reallocates the instance buffer with room for `size` bytes.
    fn respecify_instance_buffer(&mut self, size: u64);
    /// Writes `data` at the start of the instance buffer.
    fn write_instance_buffer(&mut self, data: &[u8]);

    fn create_shader(&mut self, desc: &ShaderDesc) -> ShaderId;
    fn create_texture(&mut self, image: &TextureImage, label: &str) -> TextureId;
    fn release_texture(&mut self, texture: TextureId);

    fn use_shader(&mut self, shader: ShaderId);
    fn bind_texture(&mut self, slot: u32, texture: TextureId);
    /// Sets a named uniform on the active shader. Unknown names are logged
    /// and ignored.
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn draw_instanced(&mut self, mesh: MeshBufferId, index_count: u32, instances: Range<u32>);

    fn finish_frame(&mut self) -> Result<(), BackendError>;
}
