//! Shared wgpu device for all test windows
//!
//! One instance, adapter, device and queue serve every window; each window
//! gets its own surface (see `WgpuRenderer`).

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;

/// Rendering backend requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RendererBackend {
    /// Let wgpu pick from every available backend
    #[default]
    Auto,
    Vulkan,
    Metal,
    Dx12,
    Gl,
}

impl RendererBackend {
    pub fn to_wgpu(self) -> wgpu::Backends {
        match self {
            RendererBackend::Auto => wgpu::Backends::all(),
            RendererBackend::Vulkan => wgpu::Backends::VULKAN,
            RendererBackend::Metal => wgpu::Backends::METAL,
            RendererBackend::Dx12 => wgpu::Backends::DX12,
            RendererBackend::Gl => wgpu::Backends::GL,
        }
    }
}

/// Device and queue shared by all renderers
pub struct GpuContext {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_info: wgpu::AdapterInfo,
}

/// Create the wgpu instance for a backend selection.
pub fn create_instance(backend: RendererBackend) -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: backend.to_wgpu(),
        ..Default::default()
    })
}

impl GpuContext {
    /// Request an adapter able to present to `surface`, then a device.
    pub fn new(instance: &wgpu::Instance, surface: &wgpu::Surface<'static>) -> Result<Arc<Self>> {
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        }))
        .context("Failed to find suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Rendertest Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
            memory_hints: wgpu::MemoryHints::Performance,
            experimental_features: Default::default(),
            trace: wgpu::Trace::Off,
        }))
        .context("Failed to create GPU device")?;

        let adapter_info = adapter.get_info();
        tracing::debug!(
            "GPU adapter: {} ({:?}, {:?})",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.device_type
        );

        Ok(Arc::new(Self {
            adapter,
            device,
            queue,
            adapter_info,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_selection() {
        assert_eq!(RendererBackend::Vulkan.to_wgpu(), wgpu::Backends::VULKAN);
        assert_eq!(RendererBackend::Auto.to_wgpu(), wgpu::Backends::all());
        assert_eq!(
            RendererBackend::from_str("dx12", true),
            Ok(RendererBackend::Dx12)
        );
    }
}
