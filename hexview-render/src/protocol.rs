//! Messages the host sends to the engine.
//!
//! Outbound messages live in `hexview_core::Outbound` so hosts can depend
//! on them without pulling in `wgpu`.

use std::fmt;

use hexview_core::{ConfigPatch, CopyFormat, KeyEvent, PointerEvent, ResizeEvent, WheelEvent};

/// First message of a session: where to draw and the initial config.
pub struct InitRequest {
    /// Window to present to.  `None` renders headless into an offscreen
    /// texture the size of the viewport.
    pub surface: Option<wgpu::SurfaceTarget<'static>>,
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
    pub config: ConfigPatch,
}

impl InitRequest {
    pub fn headless(width: f64, height: f64) -> Self {
        Self {
            surface: None,
            width,
            height,
            device_pixel_ratio: 1.0,
            config: ConfigPatch::default(),
        }
    }

    pub fn with_config(mut self, config: ConfigPatch) -> Self {
        self.config = config;
        self
    }
}

impl fmt::Debug for InitRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitRequest")
            .field("surface", &self.surface.is_some())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("device_pixel_ratio", &self.device_pixel_ratio)
            .field("config", &self.config)
            .finish()
    }
}

/// Host → engine message.
#[derive(Debug)]
pub enum Inbound {
    Init(InitRequest),
    Resize(ResizeEvent),
    Wheel(WheelEvent),
    Pointer(PointerEvent),
    /// Reserved; no key bindings are defined.
    Key(KeyEvent),
    /// Partial config, merged over the current one.
    Config(ConfigPatch),
    /// Replaces the whole buffer.
    Data(Vec<u8>),
    /// Export the current selection.
    Copy(CopyFormat),
}

impl Inbound {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Inbound::Init(_) => "init",
            Inbound::Resize(_) => "resize",
            Inbound::Wheel(_) => "wheel",
            Inbound::Pointer(_) => "pointer",
            Inbound::Key(_) => "key",
            Inbound::Config(_) => "config",
            Inbound::Data(_) => "data",
            Inbound::Copy(_) => "copy",
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
