//! Windowed renderer over wgpu
//!
//! Records draws into a `CommandBuffer` and replays them at present, one
//! render pass per clear, one bind group (uniforms, texture, sampler) per draw.

use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::command_buffer::{Command, CommandBuffer, GeometryDraw};
use super::gpu::GpuContext;
use super::pipeline::{DrawUniforms, PipelineCache};
use super::render_state::{AddressMode, BlendMode, BorderColor, RenderState};
use super::renderer::{RenderError, Renderer};
use super::texture_manager::{TextureHandle, TextureManager};
use super::vertex::{FColor, Rect, Vertex};
use crate::assets::ImageData;

/// Renderer for one window's surface
pub struct WgpuRenderer {
    gpu: Arc<GpuContext>,
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    pipelines: PipelineCache,
    textures: TextureManager,
    commands: CommandBuffer,
    state: RenderState,
}

impl WgpuRenderer {
    /// Configure `surface` for `window` and build the renderer's caches.
    pub fn new(
        gpu: Arc<GpuContext>,
        window: Arc<Window>,
        surface: wgpu::Surface<'static>,
        vsync: bool,
    ) -> Result<Self> {
        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&gpu.adapter);

        // Blend in the same space the vertex/clear colors are given in
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("Surface is not supported by the adapter")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &config);

        let pipelines = PipelineCache::new(&gpu.device, surface_format);
        let textures = TextureManager::new(&gpu.device, &gpu.queue)
            .context("Failed to create fallback texture")?;

        tracing::debug!(
            "Renderer created: {}x{}, format: {:?}, present mode: {:?}",
            config.width,
            config.height,
            surface_format,
            config.present_mode
        );

        Ok(Self {
            gpu,
            window,
            surface,
            config,
            pipelines,
            textures,
            commands: CommandBuffer::new(),
            state: RenderState::default(),
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn create_draw_bind_group(&self, draw: &GeometryDraw) -> Result<wgpu::BindGroup, RenderError> {
        let device = &self.gpu.device;

        let uniforms = DrawUniforms::new(
            self.config.width,
            self.config.height,
            draw.sampler,
            draw.border_color,
        );
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Draw Uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let view = self.textures.view(draw.texture)?;
        let sampler = self.pipelines.sampler(draw.sampler).ok_or_else(|| {
            RenderError::Surface(format!("no sampler prepared for {:?}", draw.sampler))
        })?;

        Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Bind Group"),
            layout: self.pipelines.bind_group_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }))
    }

    fn submit_frame(&mut self) -> Result<(), RenderError> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                self.surface.configure(&self.gpu.device, &self.config);
                tracing::debug!("Surface reconfigured, skipping frame");
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("Surface acquire timed out, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(RenderError::Surface(e.to_string())),
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let device = &self.gpu.device;

        for command in self.commands.commands() {
            if let Command::Geometry(draw) = command {
                self.pipelines.prepare_pipeline(device, draw.blend_mode);
                self.pipelines.prepare_sampler(device, draw.sampler);
            }
        }

        let vertex_buffer = (!self.commands.vertices().is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Geometry Vertices"),
                contents: bytemuck::cast_slice(self.commands.vertices()),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });
        let index_buffer = (!self.commands.indices().is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Geometry Indices"),
                contents: bytemuck::cast_slice(self.commands.indices()),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        let passes = self.commands.passes();
        let mut bind_groups = Vec::with_capacity(passes.len());
        for pass in &passes {
            let groups = pass
                .draws
                .iter()
                .map(|draw| self.create_draw_bind_group(draw))
                .collect::<Result<Vec<_>, _>>()?;
            bind_groups.push(groups);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Geometry Encoder"),
        });

        for (pass, groups) in passes.iter().zip(&bind_groups) {
            let load = match pass.clear {
                Some(color) => wgpu::LoadOp::Clear(color.to_wgpu()),
                None => wgpu::LoadOp::Load,
            };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Geometry Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let (Some(vertices), Some(indices)) = (&vertex_buffer, &index_buffer) {
                render_pass.set_vertex_buffer(0, vertices.slice(..));
                render_pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
            }

            for (draw, group) in pass.draws.iter().zip(groups) {
                let Some(pipeline) = self.pipelines.pipeline(draw.blend_mode) else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, group, &[]);
                render_pass.draw_indexed(draw.indices.clone(), draw.vertices.start as i32, 0..1);
            }
        }

        self.gpu.queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        frame.present();

        Ok(())
    }
}

impl Renderer for WgpuRenderer {
    type Texture = TextureHandle;

    fn viewport(&self) -> Rect {
        Rect::new(0, 0, self.config.width as i32, self.config.height as i32)
    }

    fn set_draw_color(&mut self, color: FColor) {
        self.state.draw_color = color;
    }

    fn clear(&mut self) {
        self.commands.clear(self.state.draw_color);
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend_mode = mode;
    }

    fn set_texture_address_mode(&mut self, u: AddressMode, v: AddressMode) {
        self.state.address_u = u;
        self.state.address_v = v;
    }

    fn set_texture_border_color(&mut self, color: BorderColor) {
        self.state.border_color = color;
    }

    fn render_geometry(
        &mut self,
        texture: Option<&TextureHandle>,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<(), RenderError> {
        if let Some(handle) = texture
            && !self.textures.contains(handle)
        {
            return Err(RenderError::UnknownTexture(handle.id()));
        }

        let sampler = self.state.sampler_key(vertices);
        self.commands.push_geometry(
            texture.map(TextureHandle::id),
            self.state.blend_mode,
            sampler,
            self.state.border_color.to_color(),
            vertices,
            indices,
        )
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let result = self.submit_frame();
        self.commands.reset();
        result
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.gpu.device, &self.config);
        tracing::debug!("Resized surface to {}x{}", width, height);
    }

    fn create_texture(&mut self, image: &ImageData) -> Result<TextureHandle, RenderError> {
        self.textures
            .load_texture(&self.gpu.device, &self.gpu.queue, image)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.textures.destroy(texture);
    }
}
