use crate::renderer::primitives::{cube_mesh, sphere_mesh};
use crate::renderer::{Mesh, Vertex};

/// Static geometry with exactly one mesh. Shapes always carry a content hash.
pub struct Shape {
    mesh: Mesh,
}

impl Shape {
    pub fn from_geometry(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            mesh: Mesh::hashed(vertices, indices, Vec::new()),
        }
    }

    /// Unit cube centred on the origin.
    pub fn cube() -> Self {
        let (vertices, indices) = cube_mesh();
        Self::from_geometry(vertices, indices)
    }

    pub fn sphere(radius: f32, stacks: u32, slices: u32) -> Self {
        let (vertices, indices) = sphere_mesh(radius, stacks, slices);
        Self::from_geometry(vertices, indices)
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut Mesh {
        &mut self.mesh
    }

    pub fn hash(&self) -> u64 {
        self.mesh.content_hash().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_primitives_share_a_hash() {
        assert_eq!(Shape::cube().hash(), Shape::cube().hash());
        assert_eq!(Shape::sphere(1.0, 16, 16).hash(), Shape::sphere(1.0, 16, 16).hash());
    }

    #[test]
    fn different_primitives_do_not() {
        assert_ne!(Shape::cube().hash(), Shape::sphere(1.0, 16, 16).hash());
        assert_ne!(Shape::sphere(1.0, 16, 16).hash(), Shape::sphere(2.0, 16, 16).hash());
    }
}
