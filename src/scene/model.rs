// scene/model.rs
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{ModelError, TextureError};
use crate::renderer::backend::GpuBackend;
use crate::renderer::texture::{Texture, TextureImage};
use crate::renderer::{Material, Mesh, Vertex};

pub const DIFFUSE_TEXTURE: &str = "texture_diffuse";
pub const SPECULAR_TEXTURE: &str = "texture_specular";

/// One or more meshes imported together.
///
/// Only the first mesh is hashed; it stands for the whole model when
/// batching. Textures are loaded once per source and shared between meshes.
pub struct Model {
    meshes: Vec<Mesh>,
    loaded_textures: HashMap<String, Texture>,
    source: Option<PathBuf>,
}

impl Model {
    /// Builds a model from in-memory geometry.
    pub fn from_meshes(parts: Vec<(Vec<Vertex>, Vec<u32>)>) -> Result<Self, ModelError> {
        let meshes = parts
            .into_iter()
            .enumerate()
            .map(|(i, (vertices, indices))| {
                if i == 0 {
                    Mesh::hashed(vertices, indices, Vec::new())
                } else {
                    Mesh::unhashed(vertices, indices, Vec::new())
                }
            })
            .collect();
        Self::with_meshes(meshes, HashMap::new(), None)
    }

    fn with_meshes(
        meshes: Vec<Mesh>,
        loaded_textures: HashMap<String, Texture>,
        source: Option<PathBuf>,
    ) -> Result<Self, ModelError> {
        if meshes.is_empty() {
            return Err(ModelError::Empty);
        }
        Ok(Self {
            meshes,
            loaded_textures,
            source,
        })
    }

    /// Imports every primitive of a glTF file as one mesh and uploads the
    /// textures its materials reference.
    pub fn load(path: impl AsRef<Path>, backend: &mut dyn GpuBackend) -> Result<Self, ModelError> {
        let path = path.as_ref();
        log::info!("Loading model: {:?}", path);

        let (document, buffers, images) =
            gltf::import(path).map_err(|source| ModelError::Import {
                path: path.to_path_buf(),
                source,
            })?;

        let mut loaded_textures = HashMap::new();
        let mut meshes = Vec::new();

        for gltf_mesh in document.meshes() {
            for primitive in gltf_mesh.primitives() {
                let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

                let Some(positions) = reader.read_positions() else {
                    log::warn!(
                        "Primitive {} of mesh {:?} has no positions; skipping",
                        primitive.index(),
                        gltf_mesh.name()
                    );
                    continue;
                };
                let positions: Vec<[f32; 3]> = positions.collect();

                let normals = reader
                    .read_normals()
                    .map(|n| n.collect::<Vec<_>>())
                    .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; positions.len()]);

                let uvs = reader
                    .read_tex_coords(0)
                    .map(|uv| uv.into_f32().collect::<Vec<_>>())
                    .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);

                let indices = reader
                    .read_indices()
                    .map(|i| i.into_u32().collect::<Vec<_>>())
                    .unwrap_or_else(|| (0..positions.len() as u32).collect());

                let vertices = positions
                    .iter()
                    .zip(normals.iter())
                    .zip(uvs.iter())
                    .map(|((pos, normal), uv)| Vertex {
                        pos: *pos,
                        normal: *normal,
                        uv: *uv,
                    })
                    .collect::<Vec<_>>();

                let pbr = primitive.material().pbr_metallic_roughness();
                let mut textures = Vec::new();
                let sources = [
                    (DIFFUSE_TEXTURE, pbr.base_color_texture()),
                    (SPECULAR_TEXTURE, pbr.metallic_roughness_texture()),
                ];
                for (name, info) in sources {
                    let Some(info) = info else { continue };
                    let image = info.texture().source();
                    let key = image_key(&image);

                    let texture = match loaded_textures.get(&key) {
                        Some(texture) => Texture::clone(texture),
                        None => {
                            let pixels = texture_from_gltf(&images[image.index()], &key)?;
                            let texture = Texture {
                                name: name.to_owned(),
                                id: backend.create_texture(&pixels, &key),
                                slot: 0,
                                path: PathBuf::from(&key),
                            };
                            loaded_textures.insert(key, texture.clone());
                            texture
                        }
                    };
                    textures.push(Texture {
                        name: name.to_owned(),
                        slot: textures.len() as u32,
                        ..texture
                    });
                }

                meshes.push(if meshes.is_empty() {
                    Mesh::hashed(vertices, indices, textures)
                } else {
                    Mesh::unhashed(vertices, indices, textures)
                });
            }
        }

        log::info!(
            "Loaded {} meshes and {} textures from {:?}",
            meshes.len(),
            loaded_textures.len(),
            path
        );
        Self::with_meshes(meshes, loaded_textures, Some(path.to_path_buf()))
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut [Mesh] {
        &mut self.meshes
    }

    pub fn hash(&self) -> u64 {
        self.meshes
            .first()
            .and_then(Mesh::content_hash)
            .unwrap_or_default()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn loaded_textures(&self) -> impl Iterator<Item = &Texture> {
        self.loaded_textures.values()
    }

    /// Applies `material` to every mesh.
    pub fn set_material(&mut self, material: Rc<Material>) {
        for mesh in &mut self.meshes {
            mesh.set_material(Rc::clone(&material));
        }
    }

    /// Frees the mesh buffers. Textures stay loaded, so the model can be
    /// drawn again.
    pub(crate) fn release(&mut self, backend: &mut dyn GpuBackend) {
        for mesh in &mut self.meshes {
            mesh.release(backend);
        }
    }

    pub(crate) fn release_textures(&mut self, backend: &mut dyn GpuBackend) {
        for (_, texture) in self.loaded_textures.drain() {
            backend.release_texture(texture.id);
        }
    }
}

fn image_key(image: &gltf::Image) -> String {
    match image.source() {
        gltf::image::Source::Uri { uri, .. } => uri.to_owned(),
        gltf::image::Source::View { view, .. } => format!("#buffer-view-{}", view.index()),
    }
}

fn texture_from_gltf(data: &gltf::image::Data, source: &str) -> Result<TextureImage, TextureError> {
    use gltf::image::Format;

    let pixels = match data.format {
        Format::R8G8B8A8 => data.pixels.clone(),
        Format::R8G8B8 => data
            .pixels
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect(),
        Format::R8G8 => data
            .pixels
            .chunks_exact(2)
            .flat_map(|rg| [rg[0], rg[1], 0, 255])
            .collect(),
        Format::R8 => data.pixels.iter().flat_map(|&r| [r, r, r, 255]).collect(),
        other => {
            return Err(TextureError::UnsupportedFormat(
                format!("{other:?}"),
                source.to_owned(),
            ))
        }
    };

    Ok(TextureImage::from_rgba8(data.width, data.height, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::primitives::{cube_mesh, sphere_mesh};

    #[test]
    fn only_the_first_mesh_is_hashed() {
        let model = Model::from_meshes(vec![cube_mesh(), sphere_mesh(1.0, 8, 8)]).unwrap();
        assert!(model.meshes()[0].content_hash().is_some());
        assert!(model.meshes()[1].content_hash().is_none());
        assert_eq!(Some(model.hash()), model.meshes()[0].content_hash());
    }

    #[test]
    fn empty_model_is_rejected() {
        assert!(matches!(Model::from_meshes(Vec::new()), Err(ModelError::Empty)));
    }

    #[test]
    fn release_keeps_textures_until_they_are_released() {
        use crate::renderer::recording::{GpuCommand, RecordingBackend};

        let mut backend = RecordingBackend::new();
        let texture = Texture {
            name: DIFFUSE_TEXTURE.to_owned(),
            id: backend.create_texture(&TextureImage::from_rgba8(1, 1, vec![255; 4]), "white.png"),
            slot: 0,
            path: PathBuf::from("white.png"),
        };
        let (vertices, indices) = cube_mesh();
        let mesh = Mesh::hashed(vertices, indices, vec![texture.clone()]);
        let mut model = Model::with_meshes(
            vec![mesh],
            HashMap::from([("white.png".to_owned(), texture)]),
            None,
        )
        .unwrap();
        model.meshes_mut()[0].first_pass(&mut backend);

        model.release(&mut backend);
        assert_eq!(backend.count(|c| matches!(c, GpuCommand::ReleaseMeshBuffers(_))), 1);
        assert_eq!(backend.count(|c| matches!(c, GpuCommand::ReleaseTexture(_))), 0);
        assert_eq!(model.loaded_textures().count(), 1);

        model.release_textures(&mut backend);
        assert_eq!(backend.count(|c| matches!(c, GpuCommand::ReleaseTexture(_))), 1);
        assert_eq!(model.loaded_textures().count(), 0);
    }

    #[test]
    fn rgb_pixels_gain_an_opaque_alpha() {
        let data = gltf::image::Data {
            pixels: vec![10, 20, 30, 40, 50, 60],
            format: gltf::image::Format::R8G8B8,
            width: 2,
            height: 1,
        };
        let image = texture_from_gltf(&data, "test.png").unwrap();
        assert_eq!(image.pixels, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }
}
