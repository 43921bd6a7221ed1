//! Renderer trait
//!
//! The immediate-mode 2D API test programs draw through. State setters affect
//! every following `render_geometry` call until `present` submits the frame.
//! `WgpuRenderer` is the windowed implementation; tests supply recording fakes.

use thiserror::Error;

use super::render_state::{AddressMode, BlendMode, BorderColor};
use super::vertex::{FColor, Rect, Vertex};
use crate::assets::ImageData;

/// Errors reported by renderer operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("unknown texture handle {0}")]
    UnknownTexture(u32),
    #[error("texture creation failed: {0}")]
    Texture(String),
    #[error("surface error: {0}")]
    Surface(String),
}

/// Immediate-mode renderer bound to one window
pub trait Renderer {
    /// Texture handle type owned by callers
    type Texture;

    /// Pixel rectangle currently drawn into.
    fn viewport(&self) -> Rect;

    /// Color used by `clear`.
    fn set_draw_color(&mut self, color: FColor);

    /// Clear the whole target with the draw color.
    fn clear(&mut self);

    fn set_blend_mode(&mut self, mode: BlendMode);

    fn set_texture_address_mode(&mut self, u: AddressMode, v: AddressMode);

    fn set_texture_border_color(&mut self, color: BorderColor);

    /// Draw an indexed triangle list, textured when `texture` is given.
    fn render_geometry(
        &mut self,
        texture: Option<&Self::Texture>,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<(), RenderError>;

    /// Submit everything recorded since the last present.
    fn present(&mut self) -> Result<(), RenderError>;

    /// Handle window resize
    fn resize(&mut self, width: u32, height: u32);

    /// Upload decoded RGBA8 pixels as a texture.
    fn create_texture(&mut self, image: &ImageData) -> Result<Self::Texture, RenderError>;

    /// Release a texture created by this renderer.
    fn destroy_texture(&mut self, texture: Self::Texture);
}
