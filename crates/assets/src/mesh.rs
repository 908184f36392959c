use crate::texture::TextureData;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::path::PathBuf;
use std::sync::Arc;

/// Interleaved vertex layout shared with the vertex shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

/// Surface description for one mesh batch.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub diffuse: [f32; 3],
    /// Shared between batches that use the same map.
    pub diffuse_texture: Option<Arc<TextureData>>,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: "default".into(),
            diffuse: [0.8, 0.8, 0.8],
            diffuse_texture: None,
        }
    }
}

impl MaterialData {
    /// Color multiplied into the sampled texel. Textured materials draw the map
    /// as-is; untextured ones show their diffuse color over a white texel.
    pub fn tint(&self) -> [f32; 4] {
        match self.diffuse_texture {
            Some(_) => [1.0, 1.0, 1.0, 1.0],
            None => [self.diffuse[0], self.diffuse[1], self.diffuse[2], 1.0],
        }
    }
}

/// One drawable batch: geometry plus its material.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material: MaterialData,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Every batch parsed from one model file, in file order.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub path: PathBuf,
    pub meshes: Vec<MeshData>,
}

impl ModelData {
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }
}

/// Area-weighted smooth normals for an indexed triangle list.
///
/// Vertices that belong to no non-degenerate triangle get +Y.
pub fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (pa, pb, pc) = (
            Vec3::from(positions[a]),
            Vec3::from(positions[b]),
            Vec3::from(positions[c]),
        );
        // Unnormalized: the cross product length is twice the triangle area.
        let face = (pb - pa).cross(pc - pa);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }
    accum
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn flat_quad_normals_point_up() {
        let positions = [
            [0.0, 0.0, 0.0],
            [0.0, 0.0, -1.0],
            [1.0, 0.0, -1.0],
            [1.0, 0.0, 0.0],
        ];
        // Counter-clockwise seen from +Y.
        let indices = [0, 3, 2, 2, 1, 0];
        let normals = smooth_normals(&positions, &indices);
        for n in normals {
            assert_eq!(n, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn shared_vertex_averages_faces() {
        // Two triangles meeting at a right-angle edge along Z.
        let positions = [
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let indices = [0, 1, 2, 0, 3, 1];
        let normals = smooth_normals(&positions, &indices);
        let shared = Vec3::from(normals[0]);
        assert!((shared - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-6);
        assert_eq!(normals[2], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn unreferenced_vertex_defaults_to_up() {
        let normals = smooth_normals(&[[5.0, 5.0, 5.0]], &[]);
        assert_eq!(normals, vec![[0.0, 1.0, 0.0]]);
    }

    #[test]
    fn tint_depends_on_texture() {
        let plain = MaterialData {
            diffuse: [0.2, 0.4, 0.6],
            ..MaterialData::default()
        };
        assert_eq!(plain.tint(), [0.2, 0.4, 0.6, 1.0]);

        let textured = MaterialData {
            diffuse_texture: Some(Arc::new(TextureData::white())),
            ..plain
        };
        assert_eq!(textured.tint(), [1.0; 4]);
    }
}
