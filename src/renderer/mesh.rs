use std::ops::Range;
use std::rc::Rc;

use crate::renderer::backend::{GpuBackend, MeshBufferId};
use crate::renderer::material::{DrawContext, Material};
use crate::renderer::texture::Texture;
use crate::renderer::Vertex;

const HASH_MIX: u64 = 0x9e37_79b9;

#[inline]
fn mix(hash: &mut u64, value: u64) {
    *hash ^= value
        .wrapping_add(HASH_MIX)
        .wrapping_add(*hash << 6)
        .wrapping_add(*hash >> 2);
}

#[inline]
fn float_bits(value: f32) -> u64 {
    // -0.0 and 0.0 describe the same position.
    if value == 0.0 {
        0
    } else {
        u64::from(value.to_bits())
    }
}

/// Digest of a mesh's shape: vertex positions and indices only.
///
/// Normals, uvs and textures do not participate, so two meshes that differ
/// only in those share a hash and end up in the same batch. Collisions between
/// different shapes are possible and would merge their batches.
pub fn content_hash(vertices: &[Vertex], indices: &[u32]) -> u64 {
    let mut hash = vertices.len() as u64;
    for vertex in vertices {
        for component in vertex.pos {
            mix(&mut hash, float_bits(component));
        }
    }
    for &index in indices {
        mix(&mut hash, u64::from(index));
    }
    hash
}

/// Where a mesh is in its GPU setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshGpuState {
    Unrealized,
    /// Vertex/index buffers exist and per-vertex attributes are declared.
    BuffersCreated(MeshBufferId),
    /// Instance attributes are declared too; instanced draws may proceed.
    InstanceLayoutConfigured(MeshBufferId),
}

impl MeshGpuState {
    pub fn buffers(self) -> Option<MeshBufferId> {
        match self {
            MeshGpuState::Unrealized => None,
            MeshGpuState::BuffersCreated(id) | MeshGpuState::InstanceLayoutConfigured(id) => {
                Some(id)
            }
        }
    }
}

pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    textures: Vec<Texture>,
    content_hash: Option<u64>,
    material: Option<Rc<Material>>,
    gpu: MeshGpuState,
}

impl Mesh {
    /// Builds a mesh and computes its content hash.
    pub fn hashed(vertices: Vec<Vertex>, indices: Vec<u32>, textures: Vec<Texture>) -> Self {
        let hash = content_hash(&vertices, &indices);
        Self {
            content_hash: Some(hash),
            ..Self::unhashed(vertices, indices, textures)
        }
    }

    /// Builds a mesh without a content hash, for meshes that are never used
    /// as a batch key.
    pub fn unhashed(vertices: Vec<Vertex>, indices: Vec<u32>, textures: Vec<Texture>) -> Self {
        Self {
            vertices,
            indices,
            textures,
            content_hash: None,
            material: None,
            gpu: MeshGpuState::Unrealized,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    pub fn content_hash(&self) -> Option<u64> {
        self.content_hash
    }

    pub fn material(&self) -> Option<&Rc<Material>> {
        self.material.as_ref()
    }

    pub fn set_material(&mut self, material: Rc<Material>) {
        self.material = Some(material);
    }

    pub fn gpu_state(&self) -> MeshGpuState {
        self.gpu
    }

    /// Creates GPU buffers and declares per-vertex attributes. Runs once.
    pub fn first_pass(&mut self, backend: &mut dyn GpuBackend) {
        if self.gpu != MeshGpuState::Unrealized {
            return;
        }

        let id = backend.create_mesh_buffers(&self.vertices, &self.indices);
        backend.configure_vertex_attributes(id);
        log::debug!(
            "Realized mesh {:?}: {} vertices, {} indices",
            id,
            self.vertices.len(),
            self.indices.len()
        );
        self.gpu = MeshGpuState::BuffersCreated(id);
    }

    /// Declares instance attributes against the bound instance buffer.
    /// Requires [`first_pass`](Self::first_pass); runs once.
    pub fn second_pass(&mut self, backend: &mut dyn GpuBackend) {
        match self.gpu {
            MeshGpuState::BuffersCreated(id) => {
                backend.configure_instance_attributes(id);
                self.gpu = MeshGpuState::InstanceLayoutConfigured(id);
            }
            MeshGpuState::Unrealized => {
                log::warn!("Instance layout requested before mesh buffers exist; skipping");
            }
            MeshGpuState::InstanceLayoutConfigured(_) => {}
        }
    }

    /// Activates the material and issues one instanced draw. Returns the
    /// number of draws issued.
    pub fn render(
        &self,
        backend: &mut dyn GpuBackend,
        ctx: &DrawContext,
        instances: Range<u32>,
    ) -> usize {
        let Some(id) = self.gpu.buffers() else {
            log::warn!("Skipping draw of a mesh that has no GPU buffers");
            return 0;
        };

        if let Some(material) = &self.material {
            material.activate(backend, ctx);
        }
        backend.draw_instanced(id, self.indices.len() as u32, instances);
        1
    }

    /// Frees the GPU buffers; the next first pass recreates them.
    pub fn release(&mut self, backend: &mut dyn GpuBackend) {
        if let Some(id) = self.gpu.buffers() {
            backend.release_mesh_buffers(id);
        }
        self.gpu = MeshGpuState::Unrealized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::vertex::v;

    fn triangle(normal: [f32; 3], uv: [f32; 2]) -> Vec<Vertex> {
        vec![
            v([0.0, 0.0, 0.0], normal, uv),
            v([1.0, 0.0, 0.0], normal, uv),
            v([0.0, 1.0, 0.0], normal, uv),
        ]
    }

    #[test]
    fn hash_ignores_normals_and_uvs() {
        let a = content_hash(&triangle([0.0, 0.0, 1.0], [0.0, 0.0]), &[0, 1, 2]);
        let b = content_hash(&triangle([1.0, 0.0, 0.0], [0.5, 0.25]), &[0, 1, 2]);
        assert_eq!(a, b);
    }

    #[test]
    fn hash_depends_on_index_order() {
        let verts = triangle([0.0, 0.0, 1.0], [0.0, 0.0]);
        assert_ne!(content_hash(&verts, &[0, 1, 2]), content_hash(&verts, &[0, 2, 1]));
    }

    #[test]
    fn signed_zero_hashes_like_zero() {
        let mut negative = triangle([0.0, 0.0, 1.0], [0.0, 0.0]);
        negative[0].pos = [-0.0, -0.0, -0.0];
        let positive = triangle([0.0, 0.0, 1.0], [0.0, 0.0]);
        assert_eq!(content_hash(&negative, &[0, 1, 2]), content_hash(&positive, &[0, 1, 2]));
    }

    #[test]
    fn empty_mesh_hash_is_the_seed() {
        assert_eq!(content_hash(&[], &[]), 0);
    }

    #[test]
    fn unhashed_mesh_has_no_key() {
        let mesh = Mesh::unhashed(triangle([0.0, 0.0, 1.0], [0.0, 0.0]), vec![0, 1, 2], vec![]);
        assert_eq!(mesh.content_hash(), None);
        assert_eq!(mesh.gpu_state(), MeshGpuState::Unrealized);
    }
}
