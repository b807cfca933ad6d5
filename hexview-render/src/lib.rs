//! # hexview-render
//!
//! GPU backend and render loop for the hex grid, built on `wgpu`.
//!
//! ## Architecture
//!
//! ```text
//!  host ──Inbound──▸ RenderWorker thread ──Outbound──▸ host
//!                         │
//!                         ▼
//!                      Engine
//!                 ┌───────┴────────┐
//!            ViewState          TextEngine
//!          (hexview-layout)   (hexview-text)
//!                 │                 │ GlyphAtlas
//!                 ▼                 ▼
//!  InstanceStream.build()  ──▸  GridRenderer.prepare()   ◀─── uploads
//!                                   │
//!                                   ▼
//!                           GridRenderer.render_*()      ◀─── one draw call
//! ```
//!
//! ## Crate modules
//!
//! - [`context`] — GPU device/queue/surface initialisation
//! - [`vertex`] — quad vertex, grid instance and viewport uniform types
//! - [`pipeline`] — the instanced textured-quad pipeline
//! - [`stream`] — per-frame instance generation
//! - [`renderer`] — frame orchestration and offscreen targets
//! - [`protocol`] — inbound messages
//! - [`engine`] — message handling and frame scheduling
//! - [`worker`] — the dedicated render thread

pub mod context;
pub mod engine;
pub mod pipeline;
pub mod protocol;
pub mod renderer;
pub mod stream;
pub mod vertex;
pub mod worker;

// Re-exports for convenience
pub use context::{GpuContext, GpuError};
pub use engine::{Engine, EngineError, EngineState, FrameOutcome};
pub use protocol::{Inbound, InitRequest};
pub use renderer::{FrameStats, GridRenderer, RenderError};
pub use stream::InstanceStream;
pub use vertex::{GridInstance, QuadVertex, ViewportUniform};
pub use worker::RenderWorker;
