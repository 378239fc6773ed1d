use std::rc::Rc;

use glam::Vec3;
use log::{info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use wgpu_instancing::app::AppContext;
use wgpu_instancing::renderer::backend::{ShaderId, TextureId};
use wgpu_instancing::renderer::{GpuBackend, Material, ShaderDesc, TextureImage};
use wgpu_instancing::scene::model::DIFFUSE_TEXTURE;
use wgpu_instancing::scene::{
    Component, Entity, FlyCamera, Model, Scene, SceneObject, Shape, Transform,
};

const CUBE_COUNT: usize = 15;
const SKYBOX_FACES: [&str; 6] = [
    "skybox_right",
    "skybox_left",
    "skybox_top",
    "skybox_bottom",
    "skybox_front",
    "skybox_back",
];

/// Rotates its object at a constant rate.
struct Spin {
    degrees_per_second: Vec3,
}

impl Component for Spin {
    fn on_tick(&mut self, transform: &mut Transform, dt: f32) {
        transform.rotate(self.degrees_per_second * dt);
    }
}

/// A row of spinning cubes sharing one batch, a lit sphere, and the skybox
/// and glTF model from the asset manifest when it names them.
pub fn build(backend: &mut dyn GpuBackend, ctx: &AppContext, aspect: f32) -> Scene {
    let camera_settings = ctx.settings.camera;
    let mut camera = FlyCamera::new(Vec3::new(-12.0, 2.0, 14.0), Vec3::Y);
    camera.set_perspective(
        camera_settings.fov_degrees,
        aspect,
        camera_settings.near,
        camera_settings.far,
    );
    let mut scene = Scene::new(camera);

    let unlit = backend.create_shader(&ShaderDesc::unlit());
    let lighting = backend.create_shader(&ShaderDesc::lighting());
    let white = backend.create_texture(&TextureImage::from_rgba8(1, 1, vec![255; 4]), "White");

    let cube_material = Rc::new(Material::unlit(unlit, Vec3::new(0.9, 0.45, 0.2)));
    let mut rng = SmallRng::seed_from_u64(7);
    for i in 0..CUBE_COUNT {
        let spin = Spin {
            degrees_per_second: Vec3::new(
                rng.gen_range(-45.0..45.0),
                rng.gen_range(15.0..90.0),
                0.0,
            ),
        };
        let cube = Entity::new(Shape::cube()).with_component(spin);
        scene.add_object(
            SceneObject::new(cube)
                .with_name(format!("cube {i}"))
                .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, i as f32 * 2.0)))
                .with_material(Rc::clone(&cube_material)),
        );
    }

    let sphere_material =
        Rc::new(Material::lighting(lighting).with_texture(DIFFUSE_TEXTURE, white));
    scene.add_object(
        SceneObject::new(Shape::sphere(1.5, 32, 32))
            .with_name("sphere")
            .with_transform(Transform::from_position(Vec3::new(6.0, 0.0, 14.0)))
            .with_material(sphere_material),
    );

    if let Some(skybox) = load_skybox(backend, ctx) {
        scene.add_object(skybox);
    }
    if let Some(model) = load_model(backend, ctx, lighting, white) {
        scene.add_object(model);
    }

    info!("Demo scene: {} objects", scene.len());
    scene
}

fn load_skybox(backend: &mut dyn GpuBackend, ctx: &AppContext) -> Option<SceneObject> {
    if !SKYBOX_FACES.iter().all(|key| ctx.assets.contains(key)) {
        info!("No skybox faces in the asset manifest; skipping skybox");
        return None;
    }
    let faces: Vec<_> = SKYBOX_FACES
        .iter()
        .filter_map(|key| ctx.assets.get(key))
        .collect();

    let image = match TextureImage::cube_from_paths(&faces) {
        Ok(image) => image,
        Err(err) => {
            warn!("Skipping skybox: {}", err);
            return None;
        }
    };

    let shader = backend.create_shader(&ShaderDesc::skybox());
    let texture = backend.create_texture(&image, "Skybox");
    let material = Rc::new(Material::skybox(shader).with_texture("skybox", texture));

    Some(
        SceneObject::new(Entity::skybox(Shape::cube()))
            .with_name("skybox")
            .with_material(material),
    )
}

fn load_model(
    backend: &mut dyn GpuBackend,
    ctx: &AppContext,
    lighting: ShaderId,
    fallback: TextureId,
) -> Option<SceneObject> {
    if !ctx.assets.contains("model") {
        return None;
    }
    let path = ctx.assets.get("model")?;
    let model = match Model::load(path, backend) {
        Ok(model) => model,
        Err(err) => {
            warn!("Skipping model {:?}: {}", path, err);
            return None;
        }
    };

    let diffuse = model
        .meshes()
        .first()
        .and_then(|mesh| mesh.textures().iter().find(|t| t.name == DIFFUSE_TEXTURE))
        .map_or(fallback, |texture| texture.id);
    let material = Rc::new(Material::lighting(lighting).with_texture(DIFFUSE_TEXTURE, diffuse));

    Some(
        SceneObject::new(model)
            .with_name("model")
            .with_transform(Transform::new(
                Vec3::new(6.0, -2.0, 4.0),
                Vec3::ZERO,
                Vec3::ONE,
            ))
            .with_material(material),
    )
}
