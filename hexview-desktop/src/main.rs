//! hexview desktop — native hex viewer window powered by wgpu.
//!
//! Uses `winit` 0.30 for windowing and input.  All rendering happens on the
//! `hexview-render` worker thread; this thread only translates window
//! events into engine messages and prints copied selections.
//!
//! ```text
//!  winit events ──▸ InputState ──Inbound──▸ RenderWorker ──▸ surface
//!       ▲                                        │
//!       └──────── EventLoopProxy ◂──Outbound─────┘
//! ```

mod input;
mod options;

use std::sync::Arc;

use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition},
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowAttributes, WindowId},
};

use hexview_core::{Outbound, ResizeEvent};
use hexview_render::{Inbound, InitRequest, RenderWorker};
use input::InputState;
use options::{Options, CONFIG_ENV};

/// Winit 0.30 application handler.
struct App {
    worker: RenderWorker,
    window: Option<Arc<Window>>,
    input: InputState,
    options: Options,
    title: String,
}

impl App {
    fn new(worker: RenderWorker, options: Options) -> Self {
        let title = match &options.file {
            Some(path) => format!("hexview — {}", path.display()),
            None => "hexview".to_string(),
        };
        Self {
            worker,
            window: None,
            input: InputState::default(),
            options,
            title,
        }
    }

    fn send(&self, msg: Inbound) {
        if !self.worker.send(msg) {
            warn!("render thread is gone; message dropped");
        }
    }
}

impl ApplicationHandler<Outbound> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized.
        }

        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(1024, 720))
            .with_min_inner_size(LogicalSize::new(320, 200));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let config = self.options.take_config();
        self.send(Inbound::Init(InitRequest {
            surface: Some(wgpu::SurfaceTarget::from(window.clone())),
            width: f64::from(size.width),
            height: f64::from(size.height),
            device_pixel_ratio: window.scale_factor(),
            config,
        }));

        match self.options.read_data() {
            Ok(bytes) => {
                info!("loaded {} bytes", bytes.len());
                self.send(Inbound::Data(bytes));
            }
            Err(e) => error!("{e}"),
        }

        self.window = Some(window);
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: Outbound) {
        match event {
            Outbound::Ready => info!("renderer ready"),
            Outbound::Error { message } => {
                error!("renderer failed: {message}");
                event_loop.exit();
            }
            Outbound::Copy { text } => println!("{text}"),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        match event {
            // ── Close ───────────────────────────────────────────
            WindowEvent::CloseRequested => {
                info!("window closed");
                event_loop.exit();
            }

            // ── Resize / DPI ────────────────────────────────────
            WindowEvent::Resized(new_size) => {
                self.send(Inbound::Resize(ResizeEvent {
                    width: f64::from(new_size.width),
                    height: f64::from(new_size.height),
                    device_pixel_ratio: window.scale_factor(),
                }));
            }

            // ── Keyboard ────────────────────────────────────────
            WindowEvent::ModifiersChanged(modifiers) => {
                self.input.set_modifiers(modifiers.state());
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(format) = self.input.copy_request(event.state, event.physical_key) {
                    self.send(Inbound::Copy(format));
                }
                let key = self.input.key(event.state, &event.logical_key, event.physical_key);
                self.send(Inbound::Key(key));
            }

            // ── Pointer ─────────────────────────────────────────
            WindowEvent::CursorMoved {
                position: PhysicalPosition { x, y },
                ..
            } => {
                let ev = self.input.cursor_moved(x, y);
                self.send(Inbound::Pointer(ev));
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(ev) = self.input.mouse_input(state, button) {
                    self.send(Inbound::Pointer(ev));
                }
                if state == ElementState::Pressed {
                    window.focus_window();
                }
            }

            // ── Wheel ───────────────────────────────────────────
            WindowEvent::MouseWheel { delta, .. } => {
                self.send(Inbound::Wheel(self.input.wheel(delta)));
            }

            _ => {}
        }
    }
}

/// Forward engine replies into the event loop.
fn spawn_forwarder(worker: &RenderWorker, proxy: EventLoopProxy<Outbound>) -> std::io::Result<()> {
    let replies = worker.outbound().clone();
    std::thread::Builder::new()
        .name("hexview-replies".to_string())
        .spawn(move || {
            for msg in replies.iter() {
                if proxy.send_event(msg).is_err() {
                    break;
                }
            }
        })?;
    Ok(())
}

fn main() {
    env_logger::init();

    let config_path = std::env::var_os(CONFIG_ENV).map(Into::into);
    let options = match Options::load(std::env::args().skip(1), config_path) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("hexview: {e}");
            eprintln!("usage: hexview-desktop [--light] [FILE]");
            std::process::exit(2);
        }
    };

    info!("Starting hexview...");

    let event_loop = EventLoop::<Outbound>::with_user_event()
        .build()
        .expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    let worker = RenderWorker::spawn().expect("Failed to spawn render thread");
    spawn_forwarder(&worker, event_loop.create_proxy()).expect("Failed to spawn reply thread");

    let mut app = App::new(worker, options);
    event_loop.run_app(&mut app).expect("Event loop error");
}
