use crate::model::{GpuMesh, GpuModel};
use crate::program::WgpuProgram;
use objview_assets::TextureData;
use objview_render::{PolygonMode, RenderBackend, ShaderProgram, align_to};
use std::num::NonZeroU64;
use std::path::PathBuf;
use std::sync::Arc;
use wgpu::util::DeviceExt;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Largest uniform block a program may declare. Every draw gets a slot this big.
pub const MAX_UNIFORM_BLOCK: usize = 256;

/// Errors raised while setting up or driving the GPU.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible graphics adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("failed to read shader {path}: {source}")]
    ShaderIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("shader {path} failed to compile: {message}")]
    ShaderCompile { path: PathBuf, message: String },
    #[error("failed to link {vertex} with {fragment}: {message}")]
    ProgramLink {
        vertex: PathBuf,
        fragment: PathBuf,
        message: String,
    },
    #[error("uniform block of {size} bytes exceeds the {max} byte slot", max = MAX_UNIFORM_BLOCK)]
    UniformBlockTooLarge { size: usize },
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// CPU copy of this frame's per-draw uniform slots.
///
/// Each draw appends one slot at a multiple of `stride`, so the GPU buffer can
/// be bound once with a dynamic offset per draw.
#[derive(Debug)]
pub(crate) struct SlotStaging {
    stride: usize,
    bytes: Vec<u8>,
}

impl SlotStaging {
    pub(crate) fn new(min_offset_alignment: u32) -> Self {
        Self {
            stride: align_to(MAX_UNIFORM_BLOCK, min_offset_alignment as usize),
            bytes: Vec::new(),
        }
    }

    pub(crate) fn stride(&self) -> usize {
        self.stride
    }

    /// Append a block and return its dynamic offset.
    pub(crate) fn push(&mut self, block: &[u8]) -> u32 {
        debug_assert!(block.len() <= MAX_UNIFORM_BLOCK);
        let offset = self.bytes.len();
        self.bytes.extend_from_slice(block);
        self.bytes.resize(offset + self.stride, 0);
        offset as u32
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len() / self.stride
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn clear(&mut self) {
        self.bytes.clear();
    }
}

/// Slots needed to hold `used` draws, grown in powers of two.
pub(crate) fn slot_capacity(current: usize, used: usize) -> usize {
    if used <= current {
        current
    } else {
        used.next_power_of_two()
    }
}

pub(crate) fn clear_color(color: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: color[0] as f64,
        g: color[1] as f64,
        b: color[2] as f64,
        a: color[3] as f64,
    }
}

struct TransformSlots {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
    staging: SlotStaging,
}

struct PendingDraw {
    pipeline: Arc<wgpu::RenderPipeline>,
    mesh: Arc<GpuMesh>,
    uniform_offset: u32,
}

/// wgpu implementation of [`RenderBackend`].
///
/// Draws are recorded during the frame and encoded into a single render pass
/// on [`RenderBackend::present`].
pub struct WgpuBackend {
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    pub(crate) transform_layout: wgpu::BindGroupLayout,
    pub(crate) material_layout: wgpu::BindGroupLayout,
    pub(crate) sampler: wgpu::Sampler,
    pub(crate) white_texture: Arc<wgpu::TextureView>,
    pub(crate) line_mode_supported: bool,
    transforms: TransformSlots,
    polygon_mode: PolygonMode,
    warned_line_mode: bool,
    clear_color: wgpu::Color,
    draws: Vec<PendingDraw>,
}

impl WgpuBackend {
    /// Open a device for `target` and configure its surface at `width` x `height`.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(target)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(GpuError::NoAdapter)?;

        let line_mode_supported = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if line_mode_supported {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            wgpu::Features::empty()
        };

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("objview_device"),
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let info = adapter.get_info();
        tracing::info!(
            adapter = %info.name,
            backend = info.backend.to_str(),
            line_mode = line_mode_supported,
            "GPU initialized"
        );

        let transform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("transform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("diffuse_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white_texture = Arc::new(upload_texture(&device, &queue, &TextureData::white(), "white"));
        let staging = SlotStaging::new(device.limits().min_uniform_buffer_offset_alignment);
        let transforms = create_transform_slots(&device, &transform_layout, staging, 16);
        let depth_view = create_depth_texture(&device, config.width, config.height);

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_view,
            transform_layout,
            material_layout,
            sampler,
            white_texture,
            line_mode_supported,
            transforms,
            polygon_mode: PolygonMode::Fill,
            warned_line_mode: false,
            clear_color: clear_color([0.0, 0.0, 0.0, 1.0]),
            draws: Vec::new(),
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn pipeline_for(&mut self, program: &WgpuProgram) -> Arc<wgpu::RenderPipeline> {
        if let Some(pipeline) = program.pipeline(self.polygon_mode) {
            return pipeline.clone();
        }
        if !self.warned_line_mode {
            self.warned_line_mode = true;
            tracing::warn!("wireframe rendering is not supported by this adapter, drawing filled");
        }
        program.fill_pipeline().clone()
    }

    fn upload_transforms(&mut self) {
        let used = self.transforms.staging.len();
        let capacity = slot_capacity(self.transforms.capacity, used);
        if capacity != self.transforms.capacity {
            tracing::debug!(slots = capacity, "growing uniform slot buffer");
            let staging = std::mem::replace(
                &mut self.transforms.staging,
                SlotStaging::new(self.device.limits().min_uniform_buffer_offset_alignment),
            );
            self.transforms =
                create_transform_slots(&self.device, &self.transform_layout, staging, capacity);
        }
        if used > 0 {
            self.queue
                .write_buffer(&self.transforms.buffer, 0, self.transforms.staging.bytes());
        }
    }

    fn discard_frame(&mut self) {
        self.draws.clear();
        self.transforms.staging.clear();
    }
}

impl RenderBackend for WgpuBackend {
    type Program = WgpuProgram;
    type Model = GpuModel;
    type Error = GpuError;

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_texture(&self.device, self.config.width, self.config.height);
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.polygon_mode = mode;
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.clear_color = clear_color(color);
        self.discard_frame();
    }

    // Pipelines are bound per draw when the pass is encoded.
    fn use_program(&mut self, _program: &WgpuProgram) {}

    fn draw(&mut self, model: &GpuModel, program: &WgpuProgram) {
        let pipeline = self.pipeline_for(program);
        let uniform_offset = self.transforms.staging.push(program.uniforms().as_bytes());
        for mesh in model.meshes() {
            self.draws.push(PendingDraw {
                pipeline: pipeline.clone(),
                mesh: mesh.clone(),
                uniform_offset,
            });
        }
    }

    fn present(&mut self) -> Result<(), GpuError> {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                self.discard_frame();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::debug!("surface timed out, skipping frame");
                self.discard_frame();
                return Ok(());
            }
            Err(e) => {
                self.discard_frame();
                return Err(e.into());
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.upload_transforms();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("model_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for draw in &self.draws {
                pass.set_pipeline(&draw.pipeline);
                pass.set_bind_group(0, &self.transforms.bind_group, &[draw.uniform_offset]);
                pass.set_bind_group(1, &draw.mesh.material_bind_group, &[]);
                pass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(draw.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..draw.mesh.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        self.discard_frame();
        Ok(())
    }
}

fn create_transform_slots(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    staging: SlotStaging,
    capacity: usize,
) -> TransformSlots {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("transform_slots"),
        size: (capacity * staging.stride()) as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("transform_bind_group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(MAX_UNIFORM_BLOCK as u64),
            }),
        }],
    });
    TransformSlots {
        buffer,
        bind_group,
        capacity,
        staging,
    }
}

pub(crate) fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    data: &TextureData,
    label: &str,
) -> wgpu::TextureView {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: data.width,
                height: data.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &data.rgba,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_padded_to_stride() {
        let mut staging = SlotStaging::new(256);
        assert_eq!(staging.stride(), 256);

        assert_eq!(staging.push(&[1; 192]), 0);
        assert_eq!(staging.push(&[2; 64]), 256);
        assert_eq!(staging.len(), 2);
        assert_eq!(staging.bytes().len(), 512);
        assert_eq!(staging.bytes()[191], 1);
        assert_eq!(staging.bytes()[192], 0);
        assert_eq!(staging.bytes()[256], 2);

        staging.clear();
        assert_eq!(staging.len(), 0);
        assert_eq!(staging.push(&[3; 16]), 0);
    }

    #[test]
    fn stride_honors_large_alignment() {
        assert_eq!(SlotStaging::new(64).stride(), MAX_UNIFORM_BLOCK);
        assert_eq!(SlotStaging::new(512).stride(), 512);
    }

    #[test]
    fn capacity_grows_in_powers_of_two() {
        assert_eq!(slot_capacity(16, 6), 16);
        assert_eq!(slot_capacity(16, 16), 16);
        assert_eq!(slot_capacity(16, 17), 32);
        assert_eq!(slot_capacity(32, 100), 128);
    }

    #[test]
    fn clear_color_widens_channels() {
        let c = clear_color([0.25, 0.5, 0.75, 1.0]);
        assert_eq!((c.r, c.g, c.b, c.a), (0.25, 0.5, 0.75, 1.0));
    }
}
