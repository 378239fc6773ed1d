use std::borrow::Cow;

use crate::renderer::texture::TextureKind;

/// Everything a backend needs to build pipelines for one WGSL program.
///
/// Programs read the draw uniform block at group 0 and, when
/// `texture` is set, one texture/sampler pair of that kind at group 1.
#[derive(Debug, Clone)]
pub struct ShaderDesc {
    pub label: String,
    pub source: Cow<'static, str>,
    pub texture: Option<TextureKind>,
    /// Reads the per-instance matrices at locations 3..=10.
    pub instanced: bool,
}

impl ShaderDesc {
    pub fn new(label: impl Into<String>, source: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
            texture: None,
            instanced: true,
        }
    }

    pub fn with_texture(mut self, kind: TextureKind) -> Self {
        self.texture = Some(kind);
        self
    }

    pub fn non_instanced(mut self) -> Self {
        self.instanced = false;
        self
    }

    /// Flat shading, no textures.
    pub fn unlit() -> Self {
        Self::new("Unlit", include_str!("../shader/unlit.wgsl"))
    }

    /// Directional, point and spot lights over a diffuse texture.
    pub fn lighting() -> Self {
        Self::new("Lighting", include_str!("../shader/lighting.wgsl"))
            .with_texture(TextureKind::D2)
    }

    pub fn skybox() -> Self {
        Self::new("Skybox", include_str!("../shader/skybox.wgsl"))
            .with_texture(TextureKind::Cube)
            .non_instanced()
    }
}
