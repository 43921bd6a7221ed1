//! Texture management for the wgpu renderer.
//!
//! Owns uploaded textures by handle, plus a 1x1 white fallback used for
//! untextured geometry.

use hashbrown::HashMap;
use wgpu::util::DeviceExt;

use super::renderer::RenderError;
use crate::assets::ImageData;

/// Handle to a texture owned by a [`TextureManager`]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u32);

impl TextureHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Internal texture data
pub(crate) struct TextureEntry {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

pub struct TextureManager {
    textures: HashMap<u32, TextureEntry>,
    next_texture_id: u32,
    fallback_white: u32,
}

impl TextureManager {
    /// Create a new TextureManager with the white fallback texture.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Self, RenderError> {
        let mut manager = Self {
            textures: HashMap::new(),
            next_texture_id: 1, // 0 is reserved
            fallback_white: 0,
        };

        let white = ImageData {
            width: 1,
            height: 1,
            pixels: vec![255, 255, 255, 255],
        };
        manager.fallback_white = manager.upload(device, queue, &white, "Fallback White")?;

        Ok(manager)
    }

    /// Upload RGBA8 pixels and return a handle.
    pub fn load_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &ImageData,
    ) -> Result<TextureHandle, RenderError> {
        self.upload(device, queue, image, "Test Texture")
            .map(TextureHandle)
    }

    fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &ImageData,
        label: &str,
    ) -> Result<u32, RenderError> {
        let expected_size = image.width as usize * image.height as usize * 4;
        if image.width == 0 || image.height == 0 || image.pixels.len() != expected_size {
            return Err(RenderError::Texture(format!(
                "pixel data size mismatch: expected {} bytes for {}x{}, got {}",
                expected_size,
                image.width,
                image.height,
                image.pixels.len()
            )));
        }

        let max = device.limits().max_texture_dimension_2d;
        if image.width > max || image.height > max {
            return Err(RenderError::Texture(format!(
                "{}x{} exceeds the device limit of {}",
                image.width, image.height, max
            )));
        }

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.pixels,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let id = self.next_texture_id;
        self.next_texture_id += 1;
        self.textures.insert(
            id,
            TextureEntry {
                texture,
                view,
                width: image.width,
                height: image.height,
            },
        );

        tracing::debug!(
            "Loaded texture {}: {}x{}",
            id,
            image.width,
            image.height
        );

        Ok(id)
    }

    /// Texture view for a handle id, or the white fallback for `None`.
    pub fn view(&self, id: Option<u32>) -> Result<&wgpu::TextureView, RenderError> {
        let id = id.unwrap_or(self.fallback_white);
        self.textures
            .get(&id)
            .map(|t| &t.view)
            .ok_or(RenderError::UnknownTexture(id))
    }

    pub fn contains(&self, handle: &TextureHandle) -> bool {
        self.textures.contains_key(&handle.0)
    }

    /// Release a texture's GPU memory.
    pub fn destroy(&mut self, handle: TextureHandle) {
        if let Some(entry) = self.textures.remove(&handle.0) {
            entry.texture.destroy();
            tracing::debug!(
                "Destroyed texture {}: {}x{}",
                handle.0,
                entry.width,
                entry.height
            );
        }
    }
}
