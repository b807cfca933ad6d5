//! High-level renderer that ties the GPU context, the grid pipeline and
//! the view state together into a single prepare/render pair per frame.

use thiserror::Error;
use wgpu::{
    Color, CommandEncoderDescriptor, Extent3d, LoadOp, Operations, RenderPassColorAttachment,
    RenderPassDescriptor, StoreOp, Texture, TextureDescriptor, TextureDimension, TextureUsages,
    TextureView, TextureViewDescriptor,
};

use hexview_core::Rgba;
use hexview_layout::ViewState;
use hexview_text::GlyphAtlas;

use crate::context::{GpuContext, OFFSCREEN_FORMAT};
use crate::pipeline::GridPipeline;
use crate::stream::InstanceStream;
use crate::vertex::ViewportUniform;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("No surface configured (headless mode)")]
    NoSurface,
}

/// Frame statistics returned after each render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Number of quad instances drawn.
    pub instance_count: u32,
    /// Number of draw calls.
    pub draw_calls: u32,
}

/// Owned render target for headless frames.
struct OffscreenTarget {
    texture: Texture,
    view: TextureView,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    fn new(gpu: &GpuContext, width: u32, height: u32) -> Self {
        let texture = gpu.device.create_texture(&TextureDescriptor {
            label: Some("hexview_offscreen"),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }
}

/// Grid renderer: one pipeline, one instance stream, one draw call.
///
/// # Usage
///
/// ```ignore
/// let mut renderer = GridRenderer::new(&gpu, &atlas);
/// renderer.prepare(&gpu, &view, &atlas);
/// let stats = renderer.render_to_surface(&gpu)?;
/// ```
pub struct GridRenderer {
    pipeline: GridPipeline,
    stream: InstanceStream,
    clear_color: Color,
    offscreen: Option<OffscreenTarget>,
}

impl GridRenderer {
    /// Create a renderer targeting the context's surface format.
    pub fn new(gpu: &GpuContext, atlas: &GlyphAtlas) -> Self {
        let pipeline = GridPipeline::new(&gpu.device, &gpu.queue, gpu.surface_format, atlas);
        Self {
            pipeline,
            stream: InstanceStream::new(),
            clear_color: Color::BLACK,
            offscreen: None,
        }
    }

    /// Replace the atlas texture after a font change.
    pub fn rebuild_atlas(&mut self, gpu: &GpuContext, atlas: &GlyphAtlas) {
        self.pipeline.upload_atlas(&gpu.device, &gpu.queue, atlas);
        log::debug!("atlas texture rebuilt: {}x{}", atlas.width, atlas.height);
    }

    pub fn set_clear_color(&mut self, rgba: Rgba) {
        self.clear_color = Color {
            r: f64::from(rgba[0]),
            g: f64::from(rgba[1]),
            b: f64::from(rgba[2]),
            a: f64::from(rgba[3]),
        };
    }

    /// Build and upload this frame's instances and viewport uniform.
    ///
    /// Returns the number of instances uploaded.
    pub fn prepare(&mut self, gpu: &GpuContext, view: &ViewState, atlas: &GlyphAtlas) -> u32 {
        self.set_clear_color(view.config().theme.background);

        // Pixels map 1:1 onto the render target, which may be cropped.
        let viewport = view.viewport();
        let (width, height) = gpu.clamp_extent(viewport.width, viewport.height);
        self.pipeline
            .upload_viewport(&gpu.queue, &ViewportUniform::new(width, height));

        let instances = self.stream.build(view, atlas);
        self.pipeline.upload_instances(&gpu.device, &gpu.queue, instances)
    }

    /// Render to the window surface.  Returns frame statistics.
    pub fn render_to_surface(&self, gpu: &GpuContext) -> Result<FrameStats, RenderError> {
        let surface = gpu.surface.as_ref().ok_or(RenderError::NoSurface)?;
        let output = surface.get_current_texture()?;
        let view = output.texture.create_view(&TextureViewDescriptor::default());

        let stats = self.encode(gpu, &view, "hexview_frame");
        output.present();
        Ok(stats)
    }

    /// Render to a caller-owned texture view.
    pub fn render_to_texture(&self, gpu: &GpuContext, target_view: &TextureView) -> FrameStats {
        self.encode(gpu, target_view, "hexview_offscreen")
    }

    /// Render into the renderer's own offscreen texture, (re)allocating it
    /// when the size changed.  The texture never exceeds the device limit.
    pub fn render_offscreen(&mut self, gpu: &GpuContext, width: u32, height: u32) -> FrameStats {
        let (width, height) = gpu.clamp_extent(width, height);
        let stale = self
            .offscreen
            .as_ref()
            .map_or(true, |t| t.width != width || t.height != height);
        if stale {
            log::debug!("offscreen target allocated: {width}x{height}");
            self.offscreen = Some(OffscreenTarget::new(gpu, width, height));
        }
        match &self.offscreen {
            Some(target) => self.encode(gpu, &target.view, "hexview_offscreen"),
            None => FrameStats::default(),
        }
    }

    /// Copy the offscreen texture back to the CPU as tightly packed RGBA8
    /// rows.  `None` before the first offscreen frame or if mapping fails.
    pub fn read_offscreen(&self, gpu: &GpuContext) -> Option<Vec<u8>> {
        let target = self.offscreen.as_ref()?;
        let unpadded = target.width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("hexview_readback"),
            size: u64::from(padded) * u64::from(target.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = gpu.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("hexview_readback_encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(target.height),
                },
            },
            Extent3d {
                width: target.width,
                height: target.height,
                depth_or_array_layers: 1,
            },
        );
        gpu.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = crossbeam_channel::bounded(1);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = gpu.device.poll(wgpu::Maintain::Wait);
        if let Err(e) = rx.recv().ok()? {
            log::warn!("offscreen readback failed: {e}");
            return None;
        }

        let mapped = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded * target.height) as usize);
        for row in mapped.chunks_exact(padded as usize) {
            pixels.extend_from_slice(&row[..unpadded as usize]);
        }
        drop(mapped);
        buffer.unmap();
        Some(pixels)
    }

    /// Size of the owned offscreen target, if one exists.
    pub fn offscreen_size(&self) -> Option<(u32, u32)> {
        self.offscreen.as_ref().map(|t| (t.width, t.height))
    }

    pub fn instance_count(&self) -> u32 {
        self.pipeline.instance_count()
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    fn encode(&self, gpu: &GpuContext, target: &TextureView, label: &str) -> FrameStats {
        let mut encoder = gpu.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some(label),
        });

        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some(label),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.pipeline.draw(&mut pass);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));

        let count = self.pipeline.instance_count();
        FrameStats {
            instance_count: count,
            draw_calls: u32::from(count > 0),
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
