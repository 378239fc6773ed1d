// renderer/texture.rs
use std::path::{Path, PathBuf};

use crate::error::TextureError;
use crate::renderer::backend::TextureId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    D2,
    Cube,
}

/// Decoded RGBA8 pixels ready for upload. Cube maps store their six faces
/// back to back in +X, -X, +Y, -Y, +Z, -Z order.
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub kind: TextureKind,
    pub width: u32,
    pub height: u32,
    pub srgb: bool,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            kind: TextureKind::D2,
            width,
            height,
            srgb: true,
            pixels,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        log::info!("Loading texture: {:?}", path);

        let rgba = image::open(path)
            .map_err(|source| TextureError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self::from_rgba8(width, height, rgba.into_raw()))
    }

    /// Loads six equally sized faces into one cube map.
    pub fn cube_from_paths<P: AsRef<Path>>(faces: &[P]) -> Result<Self, TextureError> {
        if faces.len() != 6 {
            return Err(TextureError::FaceCount(faces.len()));
        }

        let mut images = Vec::with_capacity(faces.len());
        for face in faces {
            let face: &Path = face.as_ref();
            images.push((face, Self::from_path(face)?));
        }

        let (width, height) = (images[0].1.width, images[0].1.height);
        for (face, image) in &images[1..] {
            if (image.width, image.height) != (width, height) {
                return Err(TextureError::FaceSize {
                    path: face.to_path_buf(),
                    expected: (width, height),
                    found: (image.width, image.height),
                });
            }
        }

        Ok(Self {
            kind: TextureKind::Cube,
            width,
            height,
            srgb: true,
            pixels: images
                .into_iter()
                .flat_map(|(_, image)| image.pixels)
                .collect(),
        })
    }

    pub fn layer_count(&self) -> u32 {
        match self.kind {
            TextureKind::D2 => 1,
            TextureKind::Cube => 6,
        }
    }

    pub fn bytes_per_row(&self) -> u32 {
        4 * self.width
    }
}

/// A texture attached to a mesh: its role name, GPU id, bind slot and the
/// source it was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub name: String,
    pub id: TextureId,
    pub slot: u32,
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_map_requires_six_faces() {
        let err = TextureImage::cube_from_paths(&["a.png", "b.png"]).unwrap_err();
        assert!(matches!(err, TextureError::FaceCount(2)));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = TextureImage::from_path("no/such/texture.png").unwrap_err();
        match err {
            TextureError::Decode { path, .. } => {
                assert_eq!(path, PathBuf::from("no/such/texture.png"))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rows_are_tightly_packed() {
        let image = TextureImage::from_rgba8(3, 2, vec![0; 24]);
        assert_eq!(image.bytes_per_row(), 12);
        assert_eq!(image.layer_count(), 1);
    }
}
