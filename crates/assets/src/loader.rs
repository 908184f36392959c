use crate::AssetError;
use crate::mesh::{MaterialData, MeshData, ModelData, Vertex, smooth_normals};
use crate::texture::TextureData;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

type TextureCache = HashMap<PathBuf, Option<Arc<TextureData>>>;

/// Load an OBJ file and everything it references.
///
/// A missing or malformed OBJ is an error. A missing material library or
/// texture only degrades the affected batches to a default look.
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelData, AssetError> {
    let path = path.as_ref();
    let started = Instant::now();

    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };
    let (models, materials) = tobj::load_obj(path, &options).map_err(|source| AssetError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let materials = match materials {
        Ok(materials) => materials,
        Err(e) => {
            tracing::warn!("no materials for {}: {e}", path.display());
            Vec::new()
        }
    };

    let base_dir = path.parent().unwrap_or(Path::new(""));
    let mut textures = TextureCache::new();
    let materials: Vec<MaterialData> = materials
        .iter()
        .map(|m| convert_material(m, base_dir, &mut textures))
        .collect();

    let meshes: Vec<MeshData> = models
        .into_iter()
        .filter(|m| !m.mesh.indices.is_empty())
        .map(|m| convert_mesh(m, &materials))
        .collect();
    if meshes.is_empty() {
        return Err(AssetError::NoGeometry {
            path: path.to_path_buf(),
        });
    }

    let model = ModelData {
        path: path.to_path_buf(),
        meshes,
    };
    tracing::info!(
        meshes = model.meshes.len(),
        vertices = model.vertex_count(),
        triangles = model.triangle_count(),
        "loaded {} in {:.3}s",
        path.display(),
        started.elapsed().as_secs_f64()
    );
    Ok(model)
}

fn convert_material(
    material: &tobj::Material,
    base_dir: &Path,
    textures: &mut TextureCache,
) -> MaterialData {
    let diffuse_texture = material
        .diffuse_texture
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .and_then(|name| {
            let texture_path = base_dir.join(name.trim());
            textures
                .entry(texture_path.clone())
                .or_insert_with(|| match TextureData::load(&texture_path) {
                    Ok(texture) => Some(Arc::new(texture)),
                    Err(e) => {
                        tracing::warn!("{e}; material '{}' drawn untextured", material.name);
                        None
                    }
                })
                .clone()
        });

    MaterialData {
        name: material.name.clone(),
        diffuse: material
            .diffuse
            .unwrap_or_else(|| MaterialData::default().diffuse),
        diffuse_texture,
    }
}

fn convert_mesh(model: tobj::Model, materials: &[MaterialData]) -> MeshData {
    let mesh = model.mesh;
    let positions: Vec<[f32; 3]> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();

    let normals: Vec<[f32; 3]> = if mesh.normals.len() == mesh.positions.len() {
        mesh.normals
            .chunks_exact(3)
            .map(|n| [n[0], n[1], n[2]])
            .collect()
    } else {
        smooth_normals(&positions, &mesh.indices)
    };

    let vertices = positions
        .iter()
        .zip(&normals)
        .enumerate()
        .map(|(i, (&position, &normal))| Vertex {
            position,
            normal,
            // OBJ puts v = 0 at the bottom of the image.
            tex_coords: mesh
                .texcoords
                .get(2 * i..2 * i + 2)
                .map(|uv| [uv[0], 1.0 - uv[1]])
                .unwrap_or([0.0, 0.0]),
        })
        .collect();

    let material = mesh
        .material_id
        .and_then(|id| materials.get(id))
        .cloned()
        .unwrap_or_default();

    MeshData {
        name: model.name,
        vertices,
        indices: mesh.indices,
        material,
    }
}
