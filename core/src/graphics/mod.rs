//! Immediate-mode 2D geometry renderer
//!
//! The [`Renderer`] trait is what test programs draw through; [`WgpuRenderer`]
//! implements it for one window on a shared [`GpuContext`].

mod command_buffer;
mod gpu;
mod pipeline;
mod render_state;
mod renderer;
mod texture_manager;
mod vertex;
mod wgpu_renderer;

pub use command_buffer::{Command, CommandBuffer, GeometryDraw, Pass, validate_geometry};
pub use gpu::{GpuContext, RendererBackend, create_instance};
pub use pipeline::{DrawUniforms, GEOMETRY_SHADER, PipelineCache};
pub use render_state::{
    AddressMode, BlendMode, BorderColor, RenderState, ResolvedAddressMode, SamplerKey,
};
pub use renderer::{RenderError, Renderer};
pub use texture_manager::{TextureHandle, TextureManager};
pub use vertex::{FColor, FPoint, Rect, Vertex};
pub use wgpu_renderer::WgpuRenderer;
