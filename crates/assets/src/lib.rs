//! CPU-side model loading: OBJ geometry, MTL materials, diffuse textures.
//!
//! The renderer uploads what this crate produces; nothing here touches the GPU.
//!
//! # Invariants
//! - Every mesh batch is triangulated with one index per vertex.
//! - Texture coordinates use a top-left origin.
//! - A loaded model is never mutated afterwards.

mod loader;
mod mesh;
mod texture;

pub use loader::load_model;
pub use mesh::{MaterialData, MeshData, ModelData, Vertex, smooth_normals};
pub use texture::TextureData;

use std::path::PathBuf;

/// Errors from asset loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to load model {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("model {path} contains no triangles")]
    NoGeometry { path: PathBuf },
    #[error("failed to decode texture {path}: {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
