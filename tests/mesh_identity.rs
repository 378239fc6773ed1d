//! Which meshes count as the same shape for batching.
use wgpu_instancing::renderer::{content_hash, cube_mesh, sphere_mesh, Vertex};
use wgpu_instancing::scene::{Entity, Model, SceneObject, Shape};

fn positions(vertices: &[Vertex]) -> Vec<[f32; 3]> {
    vertices.iter().map(|v| v.pos).collect()
}

#[test]
fn primitives_are_stable_across_constructions() {
    assert_eq!(Shape::cube().hash(), Shape::cube().hash());
    assert_eq!(
        Shape::sphere(1.0, 12, 12).hash(),
        Shape::sphere(1.0, 12, 12).hash()
    );
}

#[test]
fn different_shapes_hash_apart() {
    let hashes = [
        Shape::cube().hash(),
        Shape::sphere(1.0, 12, 12).hash(),
        Shape::sphere(1.5, 12, 12).hash(),
        Shape::sphere(1.0, 12, 13).hash(),
    ];
    for (i, a) in hashes.iter().enumerate() {
        for b in &hashes[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn reordered_indices_change_the_hash() {
    let (vertices, mut indices) = cube_mesh();
    let original = content_hash(&vertices, &indices);
    indices.swap(0, 1);
    assert_ne!(content_hash(&vertices, &indices), original);
}

#[test]
fn only_positions_and_indices_matter() {
    let (mut vertices, indices) = sphere_mesh(1.0, 8, 8);
    let before = positions(&vertices);
    let original = content_hash(&vertices, &indices);

    for vertex in &mut vertices {
        vertex.normal = [0.0, 1.0, 0.0];
        vertex.uv = [0.5, 0.5];
    }
    assert_eq!(positions(&vertices), before);
    assert_eq!(content_hash(&vertices, &indices), original);
}

#[test]
fn entities_batch_with_the_shape_they_wrap() {
    let plain: SceneObject = Shape::cube().into();
    let wrapped: SceneObject = Entity::new(Shape::cube()).into();
    assert_eq!(plain.hash(), wrapped.hash());
}

#[test]
fn models_are_identified_by_their_first_mesh() {
    let a = Model::from_meshes(vec![cube_mesh(), sphere_mesh(0.5, 6, 6)]).unwrap();
    let b = Model::from_meshes(vec![cube_mesh(), sphere_mesh(2.0, 6, 6)]).unwrap();
    let other = Model::from_meshes(vec![sphere_mesh(0.5, 6, 6), cube_mesh()]).unwrap();

    assert_eq!(a.hash(), b.hash());
    assert_eq!(a.hash(), Shape::cube().hash());
    assert_ne!(a.hash(), other.hash());
}

#[test]
fn empty_models_are_rejected() {
    assert!(Model::from_meshes(Vec::new()).is_err());
}
