//! Frame-level behaviour of the instanced renderer, observed through the
//! recording backend.
use std::rc::Rc;

use glam::{Mat4, Vec3};
use wgpu_instancing::renderer::backend::ShaderId;
use wgpu_instancing::renderer::{
    cube_mesh, sphere_mesh, DepthCompare, GpuBackend, GpuCommand, Material, RecordingBackend,
    Renderer, RenderingMode, ShaderDesc,
};
use wgpu_instancing::scene::{
    Camera, CameraMovement, Entity, FlyCamera, Lifecycle, Model, Scene, SceneObject, Shape,
    Transform,
};

fn renderer() -> Renderer<RecordingBackend> {
    Renderer::new(RecordingBackend::new(), RenderingMode::Default)
}

fn scene() -> Scene {
    Scene::new(FlyCamera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Y))
}

fn cube_at(x: f32) -> SceneObject {
    SceneObject::new(Shape::cube()).with_transform(Transform::from_position(Vec3::new(x, 0.0, 0.0)))
}

fn instance_counts(backend: &RecordingBackend) -> Vec<u32> {
    backend
        .draws()
        .into_iter()
        .map(|(_, range)| range.end - range.start)
        .collect()
}

fn position(commands: &[GpuCommand], wanted: &GpuCommand) -> usize {
    commands
        .iter()
        .position(|c| c == wanted)
        .unwrap_or_else(|| panic!("{:?} was never issued", wanted))
}

#[test]
fn four_cubes_and_a_sphere_take_two_draws() {
    let mut renderer = renderer();
    let mut scene = scene();
    for i in 0..4 {
        scene.add_object(cube_at(i as f32 * 2.0));
    }
    scene.add_object(Shape::sphere(1.0, 16, 16));

    scene.process(0.016);
    let stats = renderer.render(&mut scene).unwrap();

    assert_eq!(stats.batches, 2);
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(stats.instances, 5);
    assert!(!stats.skybox_drawn);

    let mut counts = instance_counts(renderer.backend());
    counts.sort_unstable();
    assert_eq!(counts, vec![1, 4]);

    assert!(renderer.arena().capacity() >= 5);
    assert!(renderer.backend().instance_buffer_size() >= 10 * 64);
    assert_eq!(renderer.backend().instance_matrices().len(), 10);
}

#[test]
fn instance_ranges_tile_the_uploaded_prefix() {
    let mut renderer = renderer();
    let mut scene = scene();
    scene.add_object(Shape::sphere(1.0, 8, 8));
    scene.add_object(cube_at(0.0));
    scene.add_object(Shape::sphere(2.0, 8, 8));
    scene.add_object(cube_at(3.0));
    scene.add_object(Shape::sphere(1.0, 8, 8));

    scene.process(0.0);
    renderer.render(&mut scene).unwrap();

    let mut next = 0;
    for (_, range) in renderer.backend().draws() {
        assert_eq!(range.start, next);
        next = range.end;
    }
    assert_eq!(next, 5);
}

#[test]
fn skybox_is_drawn_last_and_alone() {
    let mut renderer = renderer();
    let mut scene = scene();
    scene.add_object(Entity::skybox(Shape::cube()));
    for i in 0..3 {
        scene.add_object(cube_at(i as f32));
    }

    scene.process(0.016);
    let stats = renderer.render(&mut scene).unwrap();

    assert_eq!(stats.draw_calls, 2);
    assert!(stats.skybox_drawn);

    let draws = renderer.backend().draws();
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[0].1, 0..3);
    assert_eq!(draws[1].1, 0..1);
    assert_ne!(draws[0].0, draws[1].0);

    // The skybox never occupies an arena slot.
    assert_eq!(renderer.backend().instance_matrices().len(), 6);
}

#[test]
fn skybox_draw_uses_less_equal_then_restores_less() {
    let mut renderer = renderer();
    let mut scene = scene();
    scene.add_object(cube_at(0.0));
    scene.add_object(Entity::skybox(Shape::cube()));

    scene.process(0.0);
    renderer.render(&mut scene).unwrap();

    let commands = renderer.backend().commands();
    let (skybox_mesh, _) = renderer.backend().draws()[1].clone();
    let skybox_draw = commands
        .iter()
        .position(|c| matches!(c, GpuCommand::Draw { mesh, .. } if *mesh == skybox_mesh))
        .unwrap();
    let less_equal = position(commands, &GpuCommand::SetDepthCompare(DepthCompare::LessEqual));
    let less = position(commands, &GpuCommand::SetDepthCompare(DepthCompare::Less));
    let finish = position(commands, &GpuCommand::FinishFrame);

    assert!(less_equal < skybox_draw);
    assert!(skybox_draw < less);
    assert!(less < finish);
}

#[test]
fn skybox_skips_the_instance_layout() {
    let mut renderer = renderer();
    let mut scene = scene();
    scene.add_object(Entity::skybox(Shape::cube()));

    scene.process(0.0);
    renderer.render(&mut scene).unwrap();

    let backend = renderer.backend();
    assert_eq!(
        backend.count(|c| matches!(c, GpuCommand::ConfigureVertexAttributes(_))),
        1
    );
    assert_eq!(
        backend.count(|c| matches!(c, GpuCommand::ConfigureInstanceAttributes(_))),
        0
    );
}

#[test]
fn only_the_last_skybox_is_drawn() {
    let mut renderer = renderer();
    let mut scene = scene();
    scene.add_object(Entity::skybox(Shape::cube()));
    scene.add_object(Entity::skybox(Shape::sphere(1.0, 8, 8)));

    scene.process(0.0);
    let stats = renderer.render(&mut scene).unwrap();

    assert_eq!(stats.draw_calls, 1);
    let draws = renderer.backend().draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(scene.objects()[0].lifecycle(), Lifecycle::New);
    assert_eq!(scene.objects()[1].lifecycle(), Lifecycle::Initialized);
}

#[test]
fn gpu_init_runs_once_per_object() {
    let mut renderer = renderer();
    let mut scene = scene();
    for i in 0..3 {
        scene.add_object(cube_at(i as f32));
    }
    scene.add_object(Shape::sphere(1.0, 8, 8));

    for _ in 0..4 {
        scene.process(0.016);
        renderer.render(&mut scene).unwrap();
        assert!(scene.objects().iter().all(|o| !o.is_new()));
    }

    let backend = renderer.backend();
    assert_eq!(
        backend.count(|c| matches!(c, GpuCommand::CreateMeshBuffers { .. })),
        4
    );
    assert_eq!(
        backend.count(|c| matches!(c, GpuCommand::ConfigureInstanceAttributes(_))),
        4
    );
    assert_eq!(backend.count(|c| *c == GpuCommand::BindInstanceBuffer), 4);
    assert_eq!(backend.count(|c| *c == GpuCommand::FinishFrame), 4);
}

#[test]
fn instance_buffer_is_bound_between_the_passes() {
    let mut renderer = renderer();
    let mut scene = scene();
    scene.add_object(cube_at(0.0));

    scene.process(0.0);
    renderer.render(&mut scene).unwrap();

    let commands = renderer.backend().commands();
    let vertex = commands
        .iter()
        .position(|c| matches!(c, GpuCommand::ConfigureVertexAttributes(_)))
        .unwrap();
    let bind = position(commands, &GpuCommand::BindInstanceBuffer);
    let instance = commands
        .iter()
        .position(|c| matches!(c, GpuCommand::ConfigureInstanceAttributes(_)))
        .unwrap();
    assert!(vertex < bind && bind < instance);
}

#[test]
fn late_objects_are_initialized_on_their_first_frame() {
    let mut renderer = renderer();
    let mut scene = scene();
    scene.add_object(cube_at(0.0));
    renderer.render(&mut scene).unwrap();

    scene.add_object(cube_at(1.0));
    assert!(scene.objects()[1].is_new());
    renderer.render(&mut scene).unwrap();

    assert!(!scene.objects()[1].is_new());
    assert_eq!(
        renderer
            .backend()
            .count(|c| matches!(c, GpuCommand::CreateMeshBuffers { .. })),
        2
    );
    assert_eq!(renderer.backend().draws().last().unwrap().1, 0..2);
}

#[test]
fn arena_grows_only_when_the_scene_outgrows_it() {
    let mut renderer = renderer();
    let mut scene = scene();
    scene.add_object(cube_at(0.0));
    renderer.render(&mut scene).unwrap();
    assert_eq!(renderer.arena().capacity(), 2);

    scene.add_object(cube_at(1.0));
    renderer.render(&mut scene).unwrap();
    assert_eq!(renderer.arena().capacity(), 2);

    scene.add_object(cube_at(2.0));
    renderer.render(&mut scene).unwrap();
    assert_eq!(renderer.arena().capacity(), 6);

    let respecs: Vec<u64> = renderer
        .backend()
        .commands()
        .iter()
        .filter_map(|c| match c {
            GpuCommand::RespecifyInstanceBuffer(size) => Some(*size),
            _ => None,
        })
        .collect();
    assert_eq!(respecs, vec![2 * 2 * 64, 6 * 2 * 64]);
}

#[test]
fn matrices_use_the_view_refreshed_by_process() {
    let mut renderer = renderer();
    let mut scene = scene();
    let object = SceneObject::new(Shape::cube())
        .with_transform(Transform::new(Vec3::new(1.0, 2.0, -3.0), Vec3::new(0.0, 45.0, 0.0), Vec3::ONE));
    scene.add_object(object);

    let stale_view = scene.camera().view_matrix();
    scene
        .camera_mut()
        .process_movement_input(CameraMovement::Forward, 0.1);
    assert_eq!(scene.camera().view_matrix(), stale_view);

    scene.process(0.016);
    renderer.render(&mut scene).unwrap();

    let camera = scene.camera();
    assert_ne!(camera.view_matrix(), stale_view);
    let model = Mat4::from_translation(Vec3::new(1.0, 2.0, -3.0))
        * Mat4::from_rotation_y(45f32.to_radians());
    let expected_mvp = camera.projection_matrix() * camera.view_matrix() * model;
    let stale_mvp = camera.projection_matrix() * stale_view * model;

    let matrices = renderer.backend().instance_matrices();
    assert!(matrices[0].abs_diff_eq(expected_mvp, 1e-4));
    assert!(!matrices[0].abs_diff_eq(stale_mvp, 1e-4));
    assert!(matrices[1].abs_diff_eq(model, 1e-5));
}

#[test]
fn a_batch_draws_with_its_first_members_material() {
    let mut backend = RecordingBackend::new();
    let first: ShaderId = backend.create_shader(&ShaderDesc::unlit());
    let second: ShaderId = backend.create_shader(&ShaderDesc::unlit());
    let mut renderer = Renderer::new(backend, RenderingMode::Default);

    let mut scene = scene();
    scene.add_object(cube_at(0.0).with_material(Rc::new(Material::unlit(first, Vec3::X))));
    scene.add_object(cube_at(1.0).with_material(Rc::new(Material::unlit(second, Vec3::Y))));

    scene.process(0.0);
    renderer.render(&mut scene).unwrap();

    let backend = renderer.backend();
    assert_eq!(backend.count(|c| *c == GpuCommand::UseShader(first)), 1);
    assert_eq!(backend.count(|c| *c == GpuCommand::UseShader(second)), 0);
    assert_eq!(backend.draws().len(), 1);
}

#[test]
fn configure_mode_reaches_the_backend() {
    let mut renderer = renderer();
    renderer.configure_mode(RenderingMode::DebugLine);
    renderer.configure_mode(RenderingMode::DebugFill);

    assert_eq!(renderer.mode(), RenderingMode::DebugFill);
    let modes: Vec<_> = renderer
        .backend()
        .commands()
        .iter()
        .filter_map(|c| match c {
            GpuCommand::SetRenderingMode(mode) => Some(*mode),
            _ => None,
        })
        .collect();
    assert_eq!(
        modes,
        vec![
            RenderingMode::Default,
            RenderingMode::DebugLine,
            RenderingMode::DebugFill
        ]
    );
}

#[test]
fn models_sharing_a_first_mesh_draw_as_one_batch() {
    let mut renderer = renderer();
    let mut scene = scene();
    scene.add_object(Model::from_meshes(vec![cube_mesh(), sphere_mesh(1.0, 8, 8)]).unwrap());
    scene.add_object(
        Model::from_meshes(vec![
            cube_mesh(),
            sphere_mesh(0.5, 6, 6),
            sphere_mesh(2.0, 4, 4),
        ])
        .unwrap(),
    );
    scene.add_object(Entity::new(
        Model::from_meshes(vec![cube_mesh(), sphere_mesh(1.0, 8, 8)]).unwrap(),
    ));

    scene.process(0.0);
    let stats = renderer.render(&mut scene).unwrap();

    assert_eq!(stats.batches, 1);
    assert_eq!(stats.instances, 3);
    assert_eq!(stats.draw_calls, 2);

    let backend = renderer.backend();
    let representative: Vec<_> = scene.objects()[0]
        .kind()
        .meshes()
        .iter()
        .filter_map(|mesh| mesh.gpu_state().buffers())
        .collect();
    let draws = backend.draws();
    assert_eq!(
        draws,
        representative
            .into_iter()
            .map(|mesh| (mesh, 0..3))
            .collect::<Vec<_>>()
    );

    assert_eq!(
        backend.count(|c| matches!(c, GpuCommand::CreateMeshBuffers { .. })),
        7
    );
    assert_eq!(
        backend.count(|c| matches!(c, GpuCommand::ConfigureInstanceAttributes(_))),
        7
    );
}

#[test]
fn released_models_are_realized_again_without_resetting_lifecycle() {
    let mut renderer = renderer();
    let mut scene = scene();
    let id = scene.add_object(
        Model::from_meshes(vec![cube_mesh(), sphere_mesh(1.0, 8, 8)]).unwrap(),
    );
    scene.process(0.0);
    renderer.render(&mut scene).unwrap();

    let mut model = scene.remove_object(id).unwrap();
    renderer.release(&mut model);
    assert_eq!(model.lifecycle(), Lifecycle::Initialized);

    scene.add_object(model);
    scene.process(0.0);
    let stats = renderer.render(&mut scene).unwrap();

    assert_eq!(stats.draw_calls, 2);
    let backend = renderer.backend();
    assert_eq!(
        backend.count(|c| matches!(c, GpuCommand::ConfigureInstanceAttributes(_))),
        4
    );
    assert_eq!(scene.objects()[0].lifecycle(), Lifecycle::Initialized);
}
