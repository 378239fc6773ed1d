use std::path::PathBuf;

use thiserror::Error;

use crate::scene::{ObjectId, SceneId};

/// Failures while decoding images into GPU-ready pixel data.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cube map needs 6 faces, got {0}")]
    FaceCount(usize),

    #[error("cube map face {path:?} is {found:?}, expected {expected:?}")]
    FaceSize {
        path: PathBuf,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("unsupported pixel format {0} in {1}")]
    UnsupportedFormat(String, String),
}

/// Errors raised by a GPU backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter: {0}")]
    Adapter(String),

    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("object {object:?} is not owned by scene {scene:?}")]
    ForeignObject {
        object: Option<ObjectId>,
        scene: SceneId,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to import {path:?}: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("model contains no meshes")]
    Empty,

    #[error(transparent)]
    Texture(#[from] TextureError),
}
