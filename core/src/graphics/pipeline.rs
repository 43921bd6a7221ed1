//! Geometry pipeline and sampler caches
//!
//! One pipeline per blend mode (blend state is baked into wgpu pipelines) and
//! one sampler per resolved (u, v) address mode pair, both created lazily.

use bytemuck::{Pod, Zeroable};
use hashbrown::HashMap;

use super::render_state::{BlendMode, SamplerKey};
use super::vertex::{FColor, Vertex};

/// Geometry shader source
pub const GEOMETRY_SHADER: &str = include_str!("shaders/geometry.wgsl");

/// Per-draw uniform block, mirrors `DrawUniforms` in geometry.wgsl
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub viewport: [f32; 2],
    pub border_axes: [u32; 2],
    pub border_color: [f32; 4],
}

impl DrawUniforms {
    pub fn new(width: u32, height: u32, sampler: SamplerKey, border_color: FColor) -> Self {
        Self {
            viewport: [width.max(1) as f32, height.max(1) as f32],
            border_axes: [sampler.u.is_border() as u32, sampler.v.is_border() as u32],
            border_color: border_color.to_array(),
        }
    }
}

/// Create the bind group layout: uniforms, texture, sampler (group 0)
pub(crate) fn create_draw_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Geometry Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Lazily-built pipelines and samplers for one surface format
pub struct PipelineCache {
    surface_format: wgpu::TextureFormat,
    shader_module: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<BlendMode, wgpu::RenderPipeline>,
    samplers: HashMap<SamplerKey, wgpu::Sampler>,
}

impl PipelineCache {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Geometry Shader"),
            source: wgpu::ShaderSource::Wgsl(GEOMETRY_SHADER.into()),
        });

        let bind_group_layout = create_draw_bind_group_layout(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Geometry Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        Self {
            surface_format,
            shader_module,
            bind_group_layout,
            pipeline_layout,
            pipelines: HashMap::new(),
            samplers: HashMap::new(),
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Make sure the pipeline for `blend_mode` exists.
    pub fn prepare_pipeline(&mut self, device: &wgpu::Device, blend_mode: BlendMode) {
        if self.pipelines.contains_key(&blend_mode) {
            return;
        }
        let pipeline = create_pipeline(
            device,
            self.surface_format,
            &self.shader_module,
            &self.pipeline_layout,
            blend_mode,
        );
        tracing::debug!("Created geometry pipeline for {:?}", blend_mode);
        self.pipelines.insert(blend_mode, pipeline);
    }

    /// Make sure the sampler for `key` exists.
    pub fn prepare_sampler(&mut self, device: &wgpu::Device, key: SamplerKey) {
        self.samplers.entry(key).or_insert_with(|| {
            tracing::debug!("Created sampler u={:?} v={:?}", key.u, key.v);
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("Geometry Sampler"),
                address_mode_u: key.u.to_wgpu(),
                address_mode_v: key.v.to_wgpu(),
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::FilterMode::Nearest,
                ..Default::default()
            })
        });
    }

    pub fn pipeline(&self, blend_mode: BlendMode) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&blend_mode)
    }

    pub fn sampler(&self, key: SamplerKey) -> Option<&wgpu::Sampler> {
        self.samplers.get(&key)
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    shader_module: &wgpu::ShaderModule,
    pipeline_layout: &wgpu::PipelineLayout,
    blend_mode: BlendMode,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("Geometry Pipeline {:?}", blend_mode)),
        layout: Some(pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader_module,
            entry_point: Some("vs"),
            buffers: &[Vertex::buffer_layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader_module,
            entry_point: Some("fs"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: blend_mode.to_wgpu(),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}
