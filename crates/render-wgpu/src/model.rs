use crate::gpu::{WgpuBackend, upload_texture};
use objview_assets::{MaterialData, ModelData, TextureData};
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// One mesh batch resident on the GPU.
pub struct GpuMesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
    pub(crate) material_bind_group: wgpu::BindGroup,
}

/// A model uploaded to the GPU. Cloning shares the underlying buffers.
#[derive(Clone)]
pub struct GpuModel {
    meshes: Vec<Arc<GpuMesh>>,
}

/// Whether a `width` x `height` texture can be created on a device whose 2D
/// textures are capped at `max_dimension` texels per side.
pub(crate) fn texture_fits(width: u32, height: u32, max_dimension: u32) -> bool {
    width > 0 && height > 0 && width <= max_dimension && height <= max_dimension
}

/// Untextured tint for a material whose map could not be uploaded.
fn untextured_tint(material: &MaterialData) -> [f32; 4] {
    let [r, g, b] = material.diffuse;
    [r, g, b, 1.0]
}

impl GpuModel {
    /// Upload every batch of `data`. Batches that share a texture share one
    /// GPU copy of it. A texture larger than the device allows is replaced by
    /// white and the batch is drawn in its diffuse color.
    pub fn upload(backend: &WgpuBackend, data: &ModelData) -> Self {
        let max_dimension = backend.device.limits().max_texture_dimension_2d;
        let mut textures: HashMap<*const TextureData, Option<Arc<wgpu::TextureView>>> =
            HashMap::new();
        let name = data.path.display().to_string();

        let meshes = data
            .meshes
            .iter()
            .map(|mesh| {
                let material = &mesh.material;
                let uploaded = material.diffuse_texture.as_ref().and_then(|texture| {
                    textures
                        .entry(Arc::as_ptr(texture))
                        .or_insert_with(|| {
                            if texture_fits(texture.width, texture.height, max_dimension) {
                                Some(Arc::new(upload_texture(
                                    &backend.device,
                                    &backend.queue,
                                    texture,
                                    &material.name,
                                )))
                            } else {
                                tracing::warn!(
                                    "texture of material '{}' in {name} is {}x{}, over the \
                                     {max_dimension} px device limit; drawn untextured",
                                    material.name,
                                    texture.width,
                                    texture.height,
                                );
                                None
                            }
                        })
                        .clone()
                });
                let (view, tint) = match uploaded {
                    Some(view) => (view, material.tint()),
                    None if material.diffuse_texture.is_some() => {
                        (backend.white_texture.clone(), untextured_tint(material))
                    }
                    None => (backend.white_texture.clone(), material.tint()),
                };

                let vertex_buffer =
                    backend
                        .device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some(&name),
                            contents: bytemuck::cast_slice(&mesh.vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                        });
                let index_buffer =
                    backend
                        .device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some(&name),
                            contents: bytemuck::cast_slice(&mesh.indices),
                            usage: wgpu::BufferUsages::INDEX,
                        });

                Arc::new(GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                    material_bind_group: material_bind_group(backend, &material.name, tint, &view),
                })
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            model = %name,
            meshes = meshes.len(),
            textures = textures.values().flatten().count(),
            "uploaded model"
        );
        Self { meshes }
    }

    pub fn meshes(&self) -> &[Arc<GpuMesh>] {
        &self.meshes
    }
}

fn material_bind_group(
    backend: &WgpuBackend,
    label: &str,
    tint: [f32; 4],
    view: &wgpu::TextureView,
) -> wgpu::BindGroup {
    let tint = backend
        .device
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(&tint),
            usage: wgpu::BufferUsages::UNIFORM,
        });
    backend
        .device
        .create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &backend.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&backend.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: tint.as_entire_binding(),
                },
            ],
        })
}
