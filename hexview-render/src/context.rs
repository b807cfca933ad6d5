//! GPU context — owns `wgpu::Device`, `Queue`, and optional `Surface`.
//!
//! Two construction paths:
//!
//! 1. **Headless** (`GpuContext::new_headless`) — no window, no surface.
//!    Frames go to an offscreen texture.  Used for tests and benchmarks.
//!
//! 2. **Windowed** (`GpuContext::new_with_surface`) — takes anything that
//!    converts into a `wgpu::SurfaceTarget`.  Used by `hexview-desktop`.

use thiserror::Error;
use wgpu::{
    Adapter, CompositeAlphaMode, Device, DeviceDescriptor, Instance, InstanceDescriptor, Queue,
    RequestAdapterOptions, Surface, SurfaceConfiguration, TextureFormat, TextureUsages,
};

#[derive(Error, Debug)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,
    #[error("Failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Texture format of headless render targets.
pub const OFFSCREEN_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// Core GPU state shared by all rendering subsystems.
pub struct GpuContext {
    pub device: Device,
    pub queue: Queue,
    pub adapter: Adapter,
    /// Present only when rendering to a window.
    pub surface: Option<Surface<'static>>,
    pub surface_config: Option<SurfaceConfiguration>,
    pub surface_format: TextureFormat,
}

impl GpuContext {
    /// Create a headless context (no window, no surface).
    pub async fn new_headless() -> Result<Self, GpuError> {
        let instance = Instance::new(&InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("hexview-headless"),
                    ..Default::default()
                },
                None,
            )
            .await?;

        Ok(Self {
            device,
            queue,
            adapter,
            surface: None,
            surface_config: None,
            surface_format: OFFSCREEN_FORMAT,
        })
    }

    /// Create a context presenting to `target`, sized `width × height`
    /// device pixels.
    ///
    /// A non-sRGB surface format is preferred so theme colours reach the
    /// screen without a second gamma curve.
    pub async fn new_with_surface<W>(target: W, width: u32, height: u32) -> Result<Self, GpuError>
    where
        W: Into<wgpu::SurfaceTarget<'static>>,
    {
        let instance = Instance::new(&InstanceDescriptor::default());

        let surface = instance
            .create_surface(target)
            .map_err(|e| GpuError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("hexview-windowed"),
                    ..Default::default()
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| GpuError::Surface("surface reports no supported formats".into()))?;

        let max = device.limits().max_texture_dimension_2d;
        let (width, height) = clamp_extent(width, height, max);
        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo, // VSync
            desired_maximum_frame_latency: 2,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        log::info!(
            "surface configured: {}x{} {:?} on {}",
            config.width,
            config.height,
            format,
            adapter.get_info().name
        );

        Ok(Self {
            device,
            queue,
            adapter,
            surface: Some(surface),
            surface_config: Some(config),
            surface_format: format,
        })
    }

    /// Resize the surface, clamped to the device's texture limit.  No-op if
    /// headless or if either side is zero.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let (width, height) = self.clamp_extent(width, height);
        if let Some(config) = &mut self.surface_config {
            config.width = width;
            config.height = height;
            if let Some(surface) = &self.surface {
                surface.configure(&self.device, config);
            }
        }
    }

    /// Re-apply the current configuration after the surface was lost or
    /// became outdated.
    pub fn reconfigure(&self) {
        if let (Some(surface), Some(config)) = (&self.surface, &self.surface_config) {
            surface.configure(&self.device, config);
        }
    }

    /// Current surface dimensions, or `(0, 0)` if headless.
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_config
            .as_ref()
            .map(|c| (c.width, c.height))
            .unwrap_or((0, 0))
    }

    pub fn is_headless(&self) -> bool {
        self.surface.is_none()
    }

    /// Largest texture side the device accepts.
    pub fn max_extent(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Size of a render target for a `width × height` viewport.  Larger
    /// viewports are cropped to the device limit; layout keeps the full size.
    pub fn clamp_extent(&self, width: u32, height: u32) -> (u32, u32) {
        let max = self.max_extent();
        let clamped = clamp_extent(width, height, max);
        if clamped != (width, height) {
            log::warn!("render target {width}x{height} exceeds device limit {max}, cropping");
        }
        clamped
    }
}

/// Clamp both sides into `[1, max]`.
pub fn clamp_extent(width: u32, height: u32, max: u32) -> (u32, u32) {
    let max = max.max(1);
    (width.clamp(1, max), height.clamp(1, max))
}

// ===================================================================
// Tests
// ===================================================================
