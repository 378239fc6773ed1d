// renderer/material.rs
use std::collections::BTreeMap;

use glam::{Mat3, Mat4, Vec3};

use crate::renderer::backend::{GpuBackend, ShaderId, TextureId, UniformValue};
use crate::scene::Camera;

/// Camera state shared by every draw of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawContext {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub camera_front: Vec3,
}

impl DrawContext {
    pub fn from_camera(camera: &dyn Camera) -> Self {
        Self {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            camera_position: camera.position(),
            camera_front: camera.front(),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    fn at(position: Vec3) -> Self {
        Self {
            position,
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::ONE,
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

/// Camera-attached spotlight; position and direction follow the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    pub inner_cutoff_degrees: f32,
    pub outer_cutoff_degrees: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingParams {
    pub shininess: f32,
    pub directional: DirectionalLight,
    pub point_lights: [PointLight; 4],
    pub spot: SpotLight,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            shininess: 32.0,
            directional: DirectionalLight {
                direction: Vec3::new(-0.2, -1.0, -0.3),
                ambient: Vec3::splat(0.01),
                diffuse: Vec3::splat(0.1),
                specular: Vec3::splat(0.5),
            },
            point_lights: [
                PointLight::at(Vec3::new(0.7, 0.2, 2.0)),
                PointLight::at(Vec3::new(2.3, -3.3, -4.0)),
                PointLight::at(Vec3::new(-4.0, 2.0, -12.0)),
                PointLight::at(Vec3::new(0.0, 0.0, -3.0)),
            ],
            spot: SpotLight {
                ambient: Vec3::ZERO,
                diffuse: Vec3::ONE,
                specular: Vec3::ONE,
                constant: 1.0,
                linear: 0.09,
                quadratic: 0.032,
                inner_cutoff_degrees: 12.5,
                outer_cutoff_degrees: 15.0,
            },
        }
    }
}

/// Which uniforms a material pushes on activation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialKind {
    Unlit { color: Vec3 },
    Lighting(LightingParams),
    /// Projection plus the view matrix with its translation removed.
    Skybox,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct MaterialTexture {
    id: TextureId,
    slot: u32,
}

/// A shader program, named textures and the uniforms that go with them.
///
/// Texture slots follow insertion order; replacing a name keeps its slot.
#[derive(Debug, Clone)]
pub struct Material {
    shader: ShaderId,
    kind: MaterialKind,
    textures: BTreeMap<String, MaterialTexture>,
}

impl Material {
    pub fn new(shader: ShaderId, kind: MaterialKind) -> Self {
        Self {
            shader,
            kind,
            textures: BTreeMap::new(),
        }
    }

    pub fn unlit(shader: ShaderId, color: Vec3) -> Self {
        Self::new(shader, MaterialKind::Unlit { color })
    }

    pub fn lighting(shader: ShaderId) -> Self {
        Self::new(shader, MaterialKind::Lighting(LightingParams::default()))
    }

    pub fn skybox(shader: ShaderId) -> Self {
        Self::new(shader, MaterialKind::Skybox)
    }

    pub fn shader(&self) -> ShaderId {
        self.shader
    }

    pub fn kind(&self) -> &MaterialKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut MaterialKind {
        &mut self.kind
    }

    pub fn set_texture(&mut self, name: impl Into<String>, texture: TextureId) {
        let next_slot = self.textures.len() as u32;
        self.textures
            .entry(name.into())
            .and_modify(|entry| entry.id = texture)
            .or_insert(MaterialTexture {
                id: texture,
                slot: next_slot,
            });
    }

    pub fn with_texture(mut self, name: impl Into<String>, texture: TextureId) -> Self {
        self.set_texture(name, texture);
        self
    }

    pub fn texture(&self, name: &str) -> Option<TextureId> {
        let found = self.textures.get(name).map(|entry| entry.id);
        if found.is_none() {
            log::error!("Material has no texture named '{}'", name);
        }
        found
    }

    pub fn texture_slot(&self, name: &str) -> Option<u32> {
        self.textures.get(name).map(|entry| entry.slot)
    }

    /// Binds the program, textures by slot, then this material's uniforms.
    pub fn activate(&self, backend: &mut dyn GpuBackend, ctx: &DrawContext) {
        backend.use_shader(self.shader);

        let mut bindings: Vec<_> = self.textures.values().copied().collect();
        bindings.sort_by_key(|entry| entry.slot);
        for entry in bindings {
            backend.bind_texture(entry.slot, entry.id);
        }

        self.apply_uniforms(backend, ctx);
    }

    fn apply_uniforms(&self, backend: &mut dyn GpuBackend, ctx: &DrawContext) {
        match &self.kind {
            MaterialKind::Unlit { color } => {
                backend.set_uniform("color", UniformValue::Vec3(*color));
            }
            MaterialKind::Lighting(params) => apply_lighting(backend, ctx, params),
            MaterialKind::Skybox => {
                backend.set_uniform("projection", UniformValue::Mat4(ctx.projection));
                let rotation_only = Mat4::from_mat3(Mat3::from_mat4(ctx.view));
                backend.set_uniform("view", UniformValue::Mat4(rotation_only));
            }
        }
    }
}

fn apply_lighting(backend: &mut dyn GpuBackend, ctx: &DrawContext, params: &LightingParams) {
    fn vec3(backend: &mut dyn GpuBackend, name: &str, value: Vec3) {
        backend.set_uniform(name, UniformValue::Vec3(value));
    }
    fn float(backend: &mut dyn GpuBackend, name: &str, value: f32) {
        backend.set_uniform(name, UniformValue::Float(value));
    }

    vec3(backend, "viewPos", ctx.camera_position);
    float(backend, "material.shininess", params.shininess);

    let sun = &params.directional;
    vec3(backend, "dirLight.direction", sun.direction);
    vec3(backend, "dirLight.ambient", sun.ambient);
    vec3(backend, "dirLight.diffuse", sun.diffuse);
    vec3(backend, "dirLight.specular", sun.specular);

    for (i, light) in params.point_lights.iter().enumerate() {
        let field = |name: &str| format!("pointLights[{i}].{name}");
        vec3(backend, &field("position"), light.position);
        vec3(backend, &field("ambient"), light.ambient);
        vec3(backend, &field("diffuse"), light.diffuse);
        vec3(backend, &field("specular"), light.specular);
        float(backend, &field("constant"), light.constant);
        float(backend, &field("linear"), light.linear);
        float(backend, &field("quadratic"), light.quadratic);
    }

    let spot = &params.spot;
    vec3(backend, "spotLight.position", ctx.camera_position);
    vec3(backend, "spotLight.direction", ctx.camera_front);
    vec3(backend, "spotLight.ambient", spot.ambient);
    vec3(backend, "spotLight.diffuse", spot.diffuse);
    vec3(backend, "spotLight.specular", spot.specular);
    float(backend, "spotLight.constant", spot.constant);
    float(backend, "spotLight.linear", spot.linear);
    float(backend, "spotLight.quadratic", spot.quadratic);
    float(backend, "spotLight.cutOff", spot.inner_cutoff_degrees.to_radians().cos());
    float(backend, "spotLight.outerCutOff", spot.outer_cutoff_degrees.to_radians().cos());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Handle;

    #[test]
    fn texture_slots_follow_insertion_order() {
        let material = Material::lighting(Handle::new(0))
            .with_texture("normal", Handle::new(3))
            .with_texture("albedo", Handle::new(4))
            .with_texture("normal", Handle::new(5));

        assert_eq!(material.texture_slot("normal"), Some(0));
        assert_eq!(material.texture_slot("albedo"), Some(1));
        assert_eq!(material.texture("normal"), Some(Handle::new(5)));
        assert_eq!(material.texture("missing"), None);
    }

    #[test]
    fn view_projection_composes_projection_first() {
        let ctx = DrawContext {
            view: Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)),
            projection: Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)),
            camera_position: Vec3::ZERO,
            camera_front: Vec3::NEG_Z,
        };
        let p = ctx.view_projection().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(2.0, 0.0, -5.0), 1e-6));
    }
}
