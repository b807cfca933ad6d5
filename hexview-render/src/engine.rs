//! The engine — applies host messages to the view and draws frames.
//!
//! ```text
//!   Uninitialized ──Init ok──▸ Ready ──OutOfMemory──▸ Failed
//!         │                                            ▲
//!         └──────────────Init error────────────────────┘
//! ```
//!
//! View updates (config, data, scroll, selection) apply in every state, so
//! a host can stream data before the device exists.  Frames are only drawn
//! once `Ready`; before that [`Engine::frame`] reports
//! [`FrameOutcome::Pending`].

use thiserror::Error;

use hexview_core::{ConfigChanges, ConfigPatch, EngineConfig, Outbound, Viewport};
use hexview_layout::ViewState;
use hexview_text::{GlyphAtlas, TextEngine};

use crate::context::{GpuContext, GpuError};
use crate::protocol::{Inbound, InitRequest};
use crate::renderer::{FrameStats, GridRenderer, RenderError};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] GpuError),
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),
    #[error("Engine is not initialized")]
    NotInitialized,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EngineState {
    #[default]
    Uninitialized,
    Ready,
    /// A fatal error was reported; no further frames are drawn.
    Failed,
}

/// Result of one [`Engine::frame`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// GPU resources do not exist yet.
    Pending,
    /// Nothing changed since the last frame.
    Idle,
    /// The surface was unavailable; the frame is retried on the next tick.
    Skipped,
    Drawn(FrameStats),
}

/// Device-side resources, present once `Init` succeeded.
struct GpuResources {
    context: GpuContext,
    renderer: GridRenderer,
}

pub struct Engine {
    view: ViewState,
    text: TextEngine,
    atlas: GlyphAtlas,
    gpu: Option<GpuResources>,
    state: EngineState,
    /// The CPU atlas changed and the texture has not been re-uploaded.
    atlas_stale: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine with the default config and system fonts.
    pub fn new() -> Self {
        Self::with_text_engine(TextEngine::new())
    }

    pub fn with_text_engine(mut text: TextEngine) -> Self {
        let config = EngineConfig::default();
        let metrics = text.measure_cell(config.font_px);
        let atlas = text.build_atlas(&metrics);
        Self {
            view: ViewState::new(config, Viewport::default(), metrics),
            text,
            atlas,
            gpu: None,
            state: EngineState::Uninitialized,
            atlas_stale: false,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready
    }

    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    // ── Messages ────────────────────────────────────────────────────

    /// Apply one host message.  Returns the reply, if the message has one.
    pub fn handle(&mut self, msg: Inbound) -> Option<Outbound> {
        log::trace!("inbound {}", msg.kind());
        match msg {
            Inbound::Init(req) => self.init(req),
            Inbound::Resize(ev) => {
                self.view.resize(&ev);
                let vp = *self.view.viewport();
                if let Some(gpu) = &mut self.gpu {
                    gpu.context.resize(vp.width, vp.height);
                }
                None
            }
            Inbound::Wheel(ev) => {
                self.view.wheel(&ev);
                None
            }
            Inbound::Pointer(ev) => {
                self.view.pointer(&ev);
                None
            }
            Inbound::Key(ev) => {
                self.view.key(&ev);
                None
            }
            Inbound::Config(patch) => {
                self.apply_config(&patch);
                None
            }
            Inbound::Data(bytes) => {
                self.replace_data(bytes);
                None
            }
            Inbound::Copy(format) => self.view.export(format).map(|text| Outbound::Copy { text }),
        }
    }

    /// Replace the buffer and everything derived from it.
    pub fn replace_data(&mut self, bytes: Vec<u8>) {
        self.view.replace_data(bytes);
    }

    /// Merge a config patch; a font size change re-measures the cell and
    /// rebuilds the atlas.
    pub fn apply_config(&mut self, patch: &ConfigPatch) -> ConfigChanges {
        let changes = self.view.apply_config(patch);
        if changes.font {
            self.refresh_font();
        }
        changes
    }

    fn refresh_font(&mut self) {
        let font_px = self.view.config().font_px;
        let metrics = self.text.measure_cell(font_px);
        self.atlas = self.text.build_atlas(&metrics);
        self.atlas_stale = true;
        self.view.set_font_metrics(metrics);
        self.view.mark_dirty();
        log::debug!(
            "font changed to {font_px}px: cell {}x{}",
            metrics.cell_width,
            metrics.cell_height
        );
    }

    fn init(&mut self, req: InitRequest) -> Option<Outbound> {
        if self.state != EngineState::Uninitialized {
            log::warn!("init rejected: engine is {:?}", self.state);
            return None;
        }

        self.apply_config(&req.config);
        self.view
            .set_viewport(Viewport::new(req.width, req.height, req.device_pixel_ratio));
        let vp = *self.view.viewport();

        let context = match req.surface {
            Some(target) => pollster::block_on(GpuContext::new_with_surface(target, vp.width, vp.height)),
            None => pollster::block_on(GpuContext::new_headless()),
        };
        let context = match context {
            Ok(context) => context,
            Err(e) => {
                log::error!("GPU initialization failed: {e}");
                self.state = EngineState::Failed;
                return Some(Outbound::Error {
                    message: EngineError::from(e).to_string(),
                });
            }
        };

        let renderer = GridRenderer::new(&context, &self.atlas);
        log::info!(
            "engine ready: {}x{} ({}), {:?}",
            vp.width,
            vp.height,
            if context.is_headless() { "headless" } else { "windowed" },
            context.surface_format
        );
        self.gpu = Some(GpuResources { context, renderer });
        self.atlas_stale = false;
        self.state = EngineState::Ready;
        self.view.mark_dirty();
        Some(Outbound::Ready)
    }

    // ── Frames ──────────────────────────────────────────────────────

    /// Draw a frame if anything changed.
    ///
    /// Surface loss reconfigures and retries on the next call; running out
    /// of memory is fatal and moves the engine to `Failed`.
    pub fn frame(&mut self) -> Result<FrameOutcome, EngineError> {
        match self.state {
            EngineState::Uninitialized => return Ok(FrameOutcome::Pending),
            EngineState::Failed => return Ok(FrameOutcome::Idle),
            EngineState::Ready => {}
        }
        let Some(gpu) = self.gpu.as_mut() else {
            return Err(EngineError::NotInitialized);
        };
        if !self.view.take_dirty() {
            return Ok(FrameOutcome::Idle);
        }

        if self.atlas_stale {
            gpu.renderer.rebuild_atlas(&gpu.context, &self.atlas);
            self.atlas_stale = false;
        }
        gpu.renderer.prepare(&gpu.context, &self.view, &self.atlas);

        if gpu.context.is_headless() {
            let vp = self.view.viewport();
            let stats = gpu.renderer.render_offscreen(&gpu.context, vp.width, vp.height);
            return Ok(FrameOutcome::Drawn(stats));
        }

        match gpu.renderer.render_to_surface(&gpu.context) {
            Ok(stats) => Ok(FrameOutcome::Drawn(stats)),
            Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("surface lost or outdated, reconfiguring");
                gpu.context.reconfigure();
                self.view.mark_dirty();
                Ok(FrameOutcome::Skipped)
            }
            Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                log::error!("GPU out of memory, engine stopped");
                self.state = EngineState::Failed;
                Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory).into())
            }
            Err(e) => {
                log::warn!("frame skipped: {e}");
                self.view.mark_dirty();
                Ok(FrameOutcome::Skipped)
            }
        }
    }

    /// RGBA8 pixels of the last headless frame.
    pub fn read_pixels(&self) -> Option<Vec<u8>> {
        let gpu = self.gpu.as_ref()?;
        gpu.renderer.read_offscreen(&gpu.context)
    }
}

// ===================================================================
// Tests
// ===================================================================
