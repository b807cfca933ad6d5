//! Render worker: a dedicated thread that owns the [`Engine`].
//!
//! The host talks to it only through channels.  The loop waits on either
//! an inbound message or a 16 ms tick; every wake-up after a message or
//! tick tries a frame, which is a no-op unless the view is dirty.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{select, tick, unbounded, Receiver, Sender};
use hexview_core::Outbound;

use crate::engine::{Engine, FrameOutcome};
use crate::protocol::Inbound;

/// Fixed-interval frame fallback (~60 FPS).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Handle to the render thread.
pub struct RenderWorker {
    /// Handle to the render thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    inbound: Option<Sender<Inbound>>,
    outbound: Receiver<Outbound>,
}

impl RenderWorker {
    /// Spawn the render thread with a fresh [`Engine`].
    pub fn spawn() -> io::Result<Self> {
        Self::spawn_with(Engine::new)
    }

    /// Spawn the render thread, building the engine on it with `make`.
    pub fn spawn_with<F>(make: F) -> io::Result<Self>
    where
        F: FnOnce() -> Engine + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let (in_tx, in_rx) = unbounded();
        let (out_tx, out_rx) = unbounded();

        let handle = thread::Builder::new()
            .name("hexview-render".to_string())
            .spawn(move || {
                let mut engine = make();
                Self::run_loop(&mut engine, &in_rx, &out_tx, &shutdown_clone);
                log::info!("render thread stopped");
            })?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
            inbound: Some(in_tx),
            outbound: out_rx,
        })
    }

    /// Queue a message for the engine.  Returns `false` once the render
    /// thread has exited.
    pub fn send(&self, msg: Inbound) -> bool {
        match &self.inbound {
            Some(tx) => tx.send(msg).is_ok(),
            None => false,
        }
    }

    /// Replies from the engine (`Ready`, `Error`, `Copy`).
    pub fn outbound(&self) -> &Receiver<Outbound> {
        &self.outbound
    }

    /// Signal the render thread to shut down.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Shut down and wait for the render thread to finish.
    pub fn join(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.shutdown();
        // Closing the channel wakes a loop blocked in `select!`.
        self.inbound.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("render thread panicked");
            }
        }
    }

    /// Main render loop.
    fn run_loop(
        engine: &mut Engine,
        inbound: &Receiver<Inbound>,
        outbound: &Sender<Outbound>,
        shutdown: &AtomicBool,
    ) {
        let ticker = tick(FRAME_INTERVAL);

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            select! {
                recv(inbound) -> msg => match msg {
                    Ok(msg) => {
                        if let Some(reply) = engine.handle(msg) {
                            let _ = outbound.send(reply);
                        }
                        // Drain whatever else queued up before drawing.
                        for msg in inbound.try_iter() {
                            if let Some(reply) = engine.handle(msg) {
                                let _ = outbound.send(reply);
                            }
                        }
                    }
                    Err(_) => break,
                },
                recv(ticker) -> _ => {}
            }

            match engine.frame() {
                Ok(FrameOutcome::Drawn(stats)) => {
                    log::trace!("frame: {} instances", stats.instance_count);
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("render failed: {e}");
                    let _ = outbound.send(Outbound::Error {
                        message: e.to_string(),
                    });
                }
            }
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::InitRequest;
    use hexview_core::{CopyFormat, PointerEvent, PointerPhase, ResizeEvent};
    use hexview_text::TextEngine;

    const WAIT: Duration = Duration::from_secs(10);

    #[test]
    fn test_spawn_and_join() {
        let worker = RenderWorker::spawn().unwrap();
        assert!(worker.send(Inbound::Data(vec![1, 2, 3])));
        worker.join();
    }

    #[test]
    fn test_copy_round_trip_through_thread() {
        // Same font stack as the worker's engine, so the same cell size.
        let cell = TextEngine::new().measure_cell(14);
        let x = 10.0 * cell.cell_width_f64() + 1.0;
        let y = 1.0;

        let worker = RenderWorker::spawn().unwrap();
        worker.send(Inbound::Resize(ResizeEvent {
            width: 800.0,
            height: 600.0,
            device_pixel_ratio: 1.0,
        }));
        worker.send(Inbound::Data(b"ABCD".to_vec()));
        worker.send(Inbound::Pointer(PointerEvent::new(PointerPhase::Down, x, y)));
        worker.send(Inbound::Pointer(PointerEvent::new(PointerPhase::Up, x, y)));
        worker.send(Inbound::Copy(CopyFormat::Hex));

        assert_eq!(
            worker.outbound().recv_timeout(WAIT).unwrap(),
            Outbound::Copy { text: "41".into() }
        );
        worker.join();
    }

    #[test]
    fn test_copy_without_selection_sends_nothing() {
        let worker = RenderWorker::spawn().unwrap();
        worker.send(Inbound::Data(b"ABCD".to_vec()));
        worker.send(Inbound::Copy(CopyFormat::Hex));
        assert!(worker
            .outbound()
            .recv_timeout(Duration::from_millis(200))
            .is_err());
    }

    #[test]
    fn test_init_replies_ready_or_error() {
        let worker = RenderWorker::spawn().unwrap();
        worker.send(Inbound::Init(InitRequest::headless(320.0, 240.0)));
        match worker.outbound().recv_timeout(WAIT) {
            Ok(Outbound::Ready) | Ok(Outbound::Error { .. }) => {}
            other => panic!("unexpected reply: {other:?}"),
        }
        // A second init is rejected without a reply.
        worker.send(Inbound::Init(InitRequest::headless(320.0, 240.0)));
        assert!(worker
            .outbound()
            .recv_timeout(Duration::from_millis(200))
            .is_err());
    }

    #[test]
    fn test_drop_stops_thread() {
        let worker = RenderWorker::spawn().unwrap();
        drop(worker);
    }
}
