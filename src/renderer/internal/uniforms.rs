use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::renderer::backend::UniformValue;

pub(crate) const POINT_LIGHT_COUNT: usize = 4;

fn xyz(target: &mut [f32; 4], value: Vec3) {
    target[..3].copy_from_slice(&value.to_array());
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct DirLightRaw {
    direction: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
}

impl DirLightRaw {
    fn set(&mut self, field: &str, value: UniformValue) -> bool {
        let UniformValue::Vec3(v) = value else {
            return false;
        };
        let target = match field {
            "direction" => &mut self.direction,
            "ambient" => &mut self.ambient,
            "diffuse" => &mut self.diffuse,
            "specular" => &mut self.specular,
            _ => return false,
        };
        xyz(target, v);
        true
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct PointLightRaw {
    position: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
    /// constant, linear, quadratic
    attenuation: [f32; 4],
}

impl PointLightRaw {
    fn set(&mut self, field: &str, value: UniformValue) -> bool {
        match value {
            UniformValue::Vec3(v) => {
                let target = match field {
                    "position" => &mut self.position,
                    "ambient" => &mut self.ambient,
                    "diffuse" => &mut self.diffuse,
                    "specular" => &mut self.specular,
                    _ => return false,
                };
                xyz(target, v);
                true
            }
            UniformValue::Float(f) => set_attenuation(&mut self.attenuation, field, f),
            UniformValue::Mat4(_) => false,
        }
    }
}

fn set_attenuation(target: &mut [f32; 4], field: &str, value: f32) -> bool {
    let slot = match field {
        "constant" => 0,
        "linear" => 1,
        "quadratic" => 2,
        _ => return false,
    };
    target[slot] = value;
    true
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct SpotLightRaw {
    position: [f32; 4],
    direction: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
    attenuation: [f32; 4],
    /// cos(inner), cos(outer)
    cutoff: [f32; 4],
}

impl SpotLightRaw {
    fn set(&mut self, field: &str, value: UniformValue) -> bool {
        match value {
            UniformValue::Vec3(v) => {
                let target = match field {
                    "position" => &mut self.position,
                    "direction" => &mut self.direction,
                    "ambient" => &mut self.ambient,
                    "diffuse" => &mut self.diffuse,
                    "specular" => &mut self.specular,
                    _ => return false,
                };
                xyz(target, v);
                true
            }
            UniformValue::Float(f) => match field {
                "cutOff" => {
                    self.cutoff[0] = f;
                    true
                }
                "outerCutOff" => {
                    self.cutoff[1] = f;
                    true
                }
                _ => set_attenuation(&mut self.attenuation, field, f),
            },
            UniformValue::Mat4(_) => false,
        }
    }
}

/// Everything a built-in shader reads at group 0, one copy per draw.
///
/// Field names set through [`DrawUniforms::set`] follow the GLSL-style
/// uniform names materials push (`dirLight.diffuse`, `pointLights[2].linear`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct DrawUniforms {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    /// xyz camera position, w shininess
    view_pos: [f32; 4],
    color: [f32; 4],
    dir_light: DirLightRaw,
    point_lights: [PointLightRaw; POINT_LIGHT_COUNT],
    spot_light: SpotLightRaw,
}

impl Default for DrawUniforms {
    fn default() -> Self {
        let identity = glam::Mat4::IDENTITY.to_cols_array_2d();
        Self {
            view: identity,
            projection: identity,
            color: [1.0; 4],
            ..Self::zeroed()
        }
    }
}

impl DrawUniforms {
    pub(crate) const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Stores a named value. Returns `false` for unknown names or a value
    /// of the wrong type.
    pub(crate) fn set(&mut self, name: &str, value: UniformValue) -> bool {
        match (name, value) {
            ("view", UniformValue::Mat4(m)) => self.view = m.to_cols_array_2d(),
            ("projection", UniformValue::Mat4(m)) => self.projection = m.to_cols_array_2d(),
            ("viewPos", UniformValue::Vec3(v)) => xyz(&mut self.view_pos, v),
            ("material.shininess", UniformValue::Float(f)) => self.view_pos[3] = f,
            ("color", UniformValue::Vec3(v)) => {
                xyz(&mut self.color, v);
                self.color[3] = 1.0;
            }
            _ => return self.set_light(name, value),
        }
        true
    }

    fn set_light(&mut self, name: &str, value: UniformValue) -> bool {
        if let Some(field) = name.strip_prefix("dirLight.") {
            return self.dir_light.set(field, value);
        }
        if let Some(field) = name.strip_prefix("spotLight.") {
            return self.spot_light.set(field, value);
        }
        if let Some(rest) = name.strip_prefix("pointLights[") {
            let Some((index, field)) = rest.split_once("].") else {
                return false;
            };
            let Ok(index) = index.parse::<usize>() else {
                return false;
            };
            return match self.point_lights.get_mut(index) {
                Some(light) => light.set(field, value),
                None => false,
            };
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn layout_is_a_whole_number_of_vec4s() {
        assert_eq!(DrawUniforms::SIZE % 16, 0);
        assert_eq!(DrawUniforms::SIZE, 656);
    }

    #[test]
    fn material_names_map_to_fields() {
        let mut u = DrawUniforms::default();
        assert!(u.set("viewPos", UniformValue::Vec3(Vec3::new(1.0, 2.0, 3.0))));
        assert!(u.set("material.shininess", UniformValue::Float(32.0)));
        assert!(u.set("pointLights[3].quadratic", UniformValue::Float(0.032)));
        assert!(u.set("spotLight.outerCutOff", UniformValue::Float(0.9)));
        assert!(u.set("dirLight.diffuse", UniformValue::Vec3(Vec3::splat(0.4))));

        assert_eq!(u.view_pos, [1.0, 2.0, 3.0, 32.0]);
        assert_eq!(u.point_lights[3].attenuation[2], 0.032);
        assert_eq!(u.spot_light.cutoff[1], 0.9);
        assert_eq!(u.dir_light.diffuse[..3], [0.4; 3]);
    }

    #[test]
    fn unknown_or_mistyped_names_are_rejected() {
        let mut u = DrawUniforms::default();
        let before = u;
        assert!(!u.set("fog", UniformValue::Float(1.0)));
        assert!(!u.set("pointLights[4].linear", UniformValue::Float(1.0)));
        assert!(!u.set("pointLights[x].linear", UniformValue::Float(1.0)));
        assert!(!u.set("view", UniformValue::Vec3(Vec3::ONE)));
        assert!(!u.set("spotLight.cutOff", UniformValue::Mat4(Mat4::IDENTITY)));
        assert_eq!(u, before);
    }
}
