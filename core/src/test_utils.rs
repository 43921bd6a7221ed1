//! Shared test utilities for unit tests

use crate::assets::ImageData;
use crate::graphics::{
    AddressMode, BlendMode, BorderColor, FColor, Rect, RenderError, Renderer, Vertex,
};

/// Test renderer that records state and counts draws
#[derive(Debug)]
pub struct TestRenderer {
    pub size: (u32, u32),
    pub draw_color: FColor,
    pub blend_mode: BlendMode,
    pub address_modes: (AddressMode, AddressMode),
    pub border_color: BorderColor,
    pub clears: u32,
    pub draws: u32,
    pub presents: u32,
    pub live_textures: u32,
}

impl Default for TestRenderer {
    fn default() -> Self {
        Self {
            size: (640, 480),
            draw_color: FColor::default(),
            blend_mode: BlendMode::default(),
            address_modes: (AddressMode::default(), AddressMode::default()),
            border_color: BorderColor::default(),
            clears: 0,
            draws: 0,
            presents: 0,
            live_textures: 0,
        }
    }
}

impl Renderer for TestRenderer {
    type Texture = u32;

    fn viewport(&self) -> Rect {
        Rect::new(0, 0, self.size.0 as i32, self.size.1 as i32)
    }

    fn set_draw_color(&mut self, color: FColor) {
        self.draw_color = color;
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    fn set_texture_address_mode(&mut self, u: AddressMode, v: AddressMode) {
        self.address_modes = (u, v);
    }

    fn set_texture_border_color(&mut self, color: BorderColor) {
        self.border_color = color;
    }

    fn render_geometry(
        &mut self,
        _texture: Option<&u32>,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<(), RenderError> {
        crate::graphics::validate_geometry(vertices.len(), indices)?;
        self.draws += 1;
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.presents += 1;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn create_texture(&mut self, _image: &ImageData) -> Result<u32, RenderError> {
        self.live_textures += 1;
        Ok(self.live_textures)
    }

    fn destroy_texture(&mut self, _texture: u32) {
        self.live_textures = self.live_textures.saturating_sub(1);
    }
}
