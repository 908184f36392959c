use crate::gpu::{DEPTH_FORMAT, GpuError, MAX_UNIFORM_BLOCK, WgpuBackend};
use objview_assets::Vertex;
use objview_render::{PolygonMode, ShaderProgram, UniformBlock, UniformLayout};
use std::path::Path;
use std::sync::Arc;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
    2 => Float32x2,
];

pub(crate) fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

/// A vertex + fragment shader pair compiled from WGSL files.
///
/// Holds one pipeline per supported polygon mode and the uniform values that
/// the next draw will snapshot.
pub struct WgpuProgram {
    fill: Arc<wgpu::RenderPipeline>,
    line: Option<Arc<wgpu::RenderPipeline>>,
    uniforms: UniformBlock,
}

impl WgpuProgram {
    /// Compile both stages and link them against the backend's bind group
    /// layouts. The vertex stage must export `vs_main`, the fragment stage
    /// `fs_main`.
    pub fn compile(
        backend: &WgpuBackend,
        vertex_path: &Path,
        fragment_path: &Path,
        layout: UniformLayout,
    ) -> Result<Self, GpuError> {
        if layout.size() > MAX_UNIFORM_BLOCK {
            return Err(GpuError::UniformBlockTooLarge {
                size: layout.size(),
            });
        }

        let device = &backend.device;
        let vertex = compile_stage(device, vertex_path)?;
        let fragment = compile_stage(device, fragment_path)?;

        let label = format!(
            "{}+{}",
            file_label(vertex_path),
            file_label(fragment_path)
        );
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&label),
            bind_group_layouts: &[&backend.transform_layout, &backend.material_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let build = |mode: wgpu::PolygonMode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[vertex_layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: backend.surface_format(),
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    polygon_mode: mode,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        };
        let fill = build(wgpu::PolygonMode::Fill);
        let line = backend
            .line_mode_supported
            .then(|| build(wgpu::PolygonMode::Line));

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(GpuError::ProgramLink {
                vertex: vertex_path.to_path_buf(),
                fragment: fragment_path.to_path_buf(),
                message: err.to_string(),
            });
        }

        tracing::debug!(program = %label, "linked shader program");
        Ok(Self {
            fill: Arc::new(fill),
            line: line.map(Arc::new),
            uniforms: UniformBlock::new(layout),
        })
    }

    /// Pipeline for `mode`, or `None` when the adapter cannot rasterize it.
    pub(crate) fn pipeline(&self, mode: PolygonMode) -> Option<&Arc<wgpu::RenderPipeline>> {
        match mode {
            PolygonMode::Fill => Some(&self.fill),
            PolygonMode::Line => self.line.as_ref(),
        }
    }

    pub(crate) fn fill_pipeline(&self) -> &Arc<wgpu::RenderPipeline> {
        &self.fill
    }
}

impl ShaderProgram for WgpuProgram {
    fn uniforms(&self) -> &UniformBlock {
        &self.uniforms
    }

    fn uniforms_mut(&mut self) -> &mut UniformBlock {
        &mut self.uniforms
    }
}

fn compile_stage(device: &wgpu::Device, path: &Path) -> Result<wgpu::ShaderModule, GpuError> {
    let source = std::fs::read_to_string(path).map_err(|source| GpuError::ShaderIo {
        path: path.to_path_buf(),
        source,
    })?;

    let label = file_label(path);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(GpuError::ShaderCompile {
            path: path.to_path_buf(),
            message: err.to_string(),
        });
    }
    Ok(module)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_matches_vertex_struct() {
        let layout = vertex_layout();
        assert_eq!(layout.array_stride, 32);
        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, [0, 12, 24]);
        let locations: Vec<u32> = layout.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, [0, 1, 2]);
    }

    #[test]
    fn labels_use_file_names() {
        assert_eq!(
            file_label(Path::new("shaders/model_loading.vert.wgsl")),
            "model_loading.vert.wgsl"
        );
        assert_eq!(file_label(Path::new("..")), "..");
    }

    #[test]
    fn default_layout_fits_a_slot() {
        assert_eq!(UniformLayout::model_loading().size(), MAX_UNIFORM_BLOCK);
    }
}
