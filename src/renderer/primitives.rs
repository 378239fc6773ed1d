use super::vertex::{v, Vertex};
use std::f32::consts::PI;

pub fn sphere_mesh(radius: f32, stacks: u32, slices: u32) -> (Vec<Vertex>, Vec<u32>) {
    let stacks = stacks.max(1);
    let slices = slices.max(3);
    let mut vertices = Vec::with_capacity(((stacks + 1) * (slices + 1)) as usize);
    let mut indices = Vec::with_capacity((stacks * slices * 6) as usize);

    for stack in 0..=stacks {
        let phi = PI * stack as f32 / stacks as f32;

        for slice in 0..=slices {
            let theta = 2.0 * PI * slice as f32 / slices as f32;
            let dir = [phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin()];
            let pos = [radius * dir[0], radius * dir[1], radius * dir[2]];
            let uv = [slice as f32 / slices as f32, stack as f32 / stacks as f32];

            vertices.push(v(pos, dir, uv));
        }
    }

    for stack in 0..stacks {
        for slice in 0..slices {
            let first = stack * (slices + 1) + slice;
            let second = first + slices + 1;

            indices.extend_from_slice(&[first, second, first + 1]);
            indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    (vertices, indices)
}

pub fn cube_mesh() -> (Vec<Vertex>, Vec<u32>) {
    let verts = vec![
        // -Z
        v([-0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 0.0]),
        v([0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 0.0]),
        v([-0.5, 0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 1.0]),
        v([0.5, 0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 1.0]),
        // +Z
        v([-0.5, -0.5, 0.5], [0.0, 0.0, 1.0], [0.0, 0.0]),
        v([0.5, -0.5, 0.5], [0.0, 0.0, 1.0], [1.0, 0.0]),
        v([-0.5, 0.5, 0.5], [0.0, 0.0, 1.0], [0.0, 1.0]),
        v([0.5, 0.5, 0.5], [0.0, 0.0, 1.0], [1.0, 1.0]),
        // -X
        v([-0.5, -0.5, -0.5], [-1.0, 0.0, 0.0], [0.0, 0.0]),
        v([-0.5, -0.5, 0.5], [-1.0, 0.0, 0.0], [1.0, 0.0]),
        v([-0.5, 0.5, -0.5], [-1.0, 0.0, 0.0], [0.0, 1.0]),
        v([-0.5, 0.5, 0.5], [-1.0, 0.0, 0.0], [1.0, 1.0]),
        // +X
        v([0.5, -0.5, -0.5], [1.0, 0.0, 0.0], [0.0, 0.0]),
        v([0.5, -0.5, 0.5], [1.0, 0.0, 0.0], [1.0, 0.0]),
        v([0.5, 0.5, -0.5], [1.0, 0.0, 0.0], [0.0, 1.0]),
        v([0.5, 0.5, 0.5], [1.0, 0.0, 0.0], [1.0, 1.0]),
        // +Y
        v([-0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [0.0, 1.0]),
        v([0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [1.0, 1.0]),
        v([-0.5, 0.5, 0.5], [0.0, 1.0, 0.0], [0.0, 0.0]),
        v([0.5, 0.5, 0.5], [0.0, 1.0, 0.0], [1.0, 0.0]),
        // -Y
        v([-0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [0.0, 1.0]),
        v([0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [1.0, 1.0]),
        v([-0.5, -0.5, 0.5], [0.0, -1.0, 0.0], [0.0, 0.0]),
        v([0.5, -0.5, 0.5], [0.0, -1.0, 0.0], [1.0, 0.0]),
    ];

    let indices = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 3, base, base + 2, base + 3]
        })
        .collect();

    (verts, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_four_vertices_per_face() {
        let (verts, indices) = cube_mesh();
        assert_eq!(verts.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < verts.len()));
        assert_eq!(&indices[..6], &[0, 1, 3, 0, 2, 3]);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let (verts, indices) = sphere_mesh(2.0, 8, 12);
        assert_eq!(verts.len(), 9 * 13);
        assert_eq!(indices.len(), 8 * 12 * 6);
        for vert in &verts {
            assert!((vert.position().length() - 2.0).abs() < 1e-4);
        }
    }
}
