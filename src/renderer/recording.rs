// renderer/recording.rs
use std::ops::Range;

use crate::asset::Handle;
use crate::error::BackendError;
use crate::renderer::backend::{
    ClearFlags, DepthCompare, GpuBackend, MeshBufferId, RenderingMode, ShaderId, TextureId,
    UniformValue,
};
use crate::renderer::shader::ShaderDesc;
use crate::renderer::texture::TextureImage;
use crate::renderer::Vertex;

/// One call made against a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    Clear(ClearFlags),
    SetRenderingMode(RenderingMode),
    SetDepthCompare(DepthCompare),
    CreateMeshBuffers {
        mesh: MeshBufferId,
        vertices: usize,
        indices: usize,
    },
    ConfigureVertexAttributes(MeshBufferId),
    ConfigureInstanceAttributes(MeshBufferId),
    ReleaseMeshBuffers(MeshBufferId),
    BindInstanceBuffer,
    RespecifyInstanceBuffer(u64),
    WriteInstanceBuffer(usize),
    CreateShader(ShaderId),
    CreateTexture(TextureId),
    ReleaseTexture(TextureId),
    UseShader(ShaderId),
    BindTexture {
        slot: u32,
        texture: TextureId,
    },
    SetUniform {
        name: String,
        value: UniformValue,
    },
    Draw {
        mesh: MeshBufferId,
        index_count: u32,
        instances: Range<u32>,
    },
    FinishFrame,
}

/// A headless [`GpuBackend`] that records every call.
///
/// Used to exercise the renderer without a device; the last uploaded
/// instance bytes are kept so matrix contents can be inspected.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<GpuCommand>,
    next_mesh: usize,
    next_shader: usize,
    next_texture: usize,
    instance_data: Vec<u8>,
    instance_buffer_size: u64,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Returns and forgets everything recorded so far.
    pub fn take_commands(&mut self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.commands)
    }

    /// `(mesh, instances)` for every draw, in submission order.
    pub fn draws(&self) -> Vec<(MeshBufferId, Range<u32>)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                GpuCommand::Draw {
                    mesh, instances, ..
                } => Some((*mesh, instances.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&GpuCommand) -> bool) -> usize {
        self.commands.iter().filter(|command| predicate(command)).count()
    }

    pub fn instance_buffer_size(&self) -> u64 {
        self.instance_buffer_size
    }

    pub fn instance_data(&self) -> &[u8] {
        &self.instance_data
    }

    /// Column-major matrices from the last instance upload.
    pub fn instance_matrices(&self) -> Vec<glam::Mat4> {
        let floats: Vec<f32> = bytemuck::pod_collect_to_vec(&self.instance_data);
        floats
            .chunks_exact(16)
            .map(glam::Mat4::from_cols_slice)
            .collect()
    }
}

impl GpuBackend for RecordingBackend {
    fn clear(&mut self, flags: ClearFlags) {
        self.commands.push(GpuCommand::Clear(flags));
    }

    fn set_rendering_mode(&mut self, mode: RenderingMode) {
        self.commands.push(GpuCommand::SetRenderingMode(mode));
    }

    fn set_depth_compare(&mut self, compare: DepthCompare) {
        self.commands.push(GpuCommand::SetDepthCompare(compare));
    }

    fn create_mesh_buffers(&mut self, vertices: &[Vertex], indices: &[u32]) -> MeshBufferId {
        let mesh = Handle::new(self.next_mesh);
        self.next_mesh += 1;
        self.commands.push(GpuCommand::CreateMeshBuffers {
            mesh,
            vertices: vertices.len(),
            indices: indices.len(),
        });
        mesh
    }

    fn configure_vertex_attributes(&mut self, mesh: MeshBufferId) {
        self.commands.push(GpuCommand::ConfigureVertexAttributes(mesh));
    }

    fn configure_instance_attributes(&mut self, mesh: MeshBufferId) {
        self.commands.push(GpuCommand::ConfigureInstanceAttributes(mesh));
    }

    fn release_mesh_buffers(&mut self, mesh: MeshBufferId) {
        self.commands.push(GpuCommand::ReleaseMeshBuffers(mesh));
    }

    fn bind_instance_buffer(&mut self) {
        self.commands.push(GpuCommand::BindInstanceBuffer);
    }

    fn respecify_instance_buffer(&mut self, size: u64) {
        self.instance_buffer_size = size;
        self.commands.push(GpuCommand::RespecifyInstanceBuffer(size));
    }

    fn write_instance_buffer(&mut self, data: &[u8]) {
        self.instance_data = data.to_vec();
        self.commands.push(GpuCommand::WriteInstanceBuffer(data.len()));
    }

    fn create_shader(&mut self, _desc: &ShaderDesc) -> ShaderId {
        let shader = Handle::new(self.next_shader);
        self.next_shader += 1;
        self.commands.push(GpuCommand::CreateShader(shader));
        shader
    }

    fn create_texture(&mut self, _image: &TextureImage, _label: &str) -> TextureId {
        let texture = Handle::new(self.next_texture);
        self.next_texture += 1;
        self.commands.push(GpuCommand::CreateTexture(texture));
        texture
    }

    fn release_texture(&mut self, texture: TextureId) {
        self.commands.push(GpuCommand::ReleaseTexture(texture));
    }

    fn use_shader(&mut self, shader: ShaderId) {
        self.commands.push(GpuCommand::UseShader(shader));
    }

    fn bind_texture(&mut self, slot: u32, texture: TextureId) {
        self.commands.push(GpuCommand::BindTexture { slot, texture });
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.commands.push(GpuCommand::SetUniform {
            name: name.to_owned(),
            value,
        });
    }

    fn draw_instanced(&mut self, mesh: MeshBufferId, index_count: u32, instances: Range<u32>) {
        self.commands.push(GpuCommand::Draw {
            mesh,
            index_count,
            instances,
        });
    }

    fn finish_frame(&mut self) -> Result<(), BackendError> {
        self.commands.push(GpuCommand::FinishFrame);
        Ok(())
    }
}
