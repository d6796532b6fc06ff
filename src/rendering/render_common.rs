use std::sync::RwLock;

use wgpu::SurfaceConfiguration;
use winit::dpi::PhysicalSize;

/// Surface state shared by every pass.
pub struct RenderCommon {
    output_surface_config: RwLock<SurfaceConfiguration>,
    surface_format: wgpu::TextureFormat,
}

impl RenderCommon {
    pub fn new(
        device: &wgpu::Device,
        adapter: &wgpu::Adapter,
        surface: &wgpu::Surface,
        size: PhysicalSize<u32>,
    ) -> anyhow::Result<Self> {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Surface is not supported by the adapter"))?;

        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let output_surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(device, &output_surface_config);
        log::info!("Configured surface as {surface_format:?}, {}x{}", size.width, size.height);

        Ok(Self {
            output_surface_config: RwLock::new(output_surface_config),
            surface_format,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Applies a new window size. Zero sized windows are ignored.
    pub fn resize(
        &self,
        device: &wgpu::Device,
        surface: &wgpu::Surface,
        size: PhysicalSize<u32>,
    ) -> bool {
        if size.width == 0 || size.height == 0 {
            return false;
        }

        let Ok(mut config) = self.output_surface_config.write() else {
            log::error!("Surface config lock was poisoned");
            return false;
        };

        config.width = size.width;
        config.height = size.height;
        surface.configure(device, &config);
        true
    }
}
