pub mod arena;
pub mod backend;
pub mod batch;
pub mod depth;
pub mod gpu;
pub mod instance;
mod internal;
pub mod material;
pub mod mesh;
pub mod pipeline_builder;
pub mod primitives;
pub mod recording;
#[allow(clippy::module_inception)]
pub mod renderer;
pub mod shader;
pub mod texture;
pub mod vertex;

pub use arena::MatrixArena;
pub use backend::{ClearFlags, DepthCompare, GpuBackend, RenderingMode, UniformValue};
pub use batch::{Batch, BatchSet};
pub use depth::Depth;
pub use gpu::WgpuBackend;
pub use instance::InstanceRaw;
pub use material::{DrawContext, LightingParams, Material, MaterialKind};
pub use mesh::{content_hash, Mesh, MeshGpuState};
pub use primitives::{cube_mesh, sphere_mesh};
pub use recording::{GpuCommand, RecordingBackend};
pub use renderer::{FrameStats, Renderer};
pub use shader::ShaderDesc;
pub use texture::{Texture, TextureImage, TextureKind};
pub use vertex::Vertex;
