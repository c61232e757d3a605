//! Periodic stream-heart task.
//!
//! Hearting the stream repeatedly is a user toggle, not fire-and-forget:
//! every started task carries a handle, and the task stops when the
//! handle is stopped or dropped. There is no way to start one without
//! holding its cancellation.

use crate::engine::ChatEngine;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::debug;

/// Handle to a running auto-heart task.
///
/// The task hearts the stream once per interval until the handle is
/// stopped or dropped.
#[derive(Debug)]
pub struct AutoHeart {
    stop: Sender<()>,
    worker: Option<JoinHandle<()>>,
}

impl AutoHeart {
    /// Spawn the periodic task.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the worker thread cannot be
    /// spawned.
    pub fn start(
        engine: Arc<dyn ChatEngine>,
        interval: Duration,
    ) -> Result<AutoHeart, std::io::Error> {
        let (stop, stop_rx) = mpsc::channel::<()>();
        let worker = std::thread::Builder::new()
            .name("autoheart".to_string())
            .spawn(move || {
                debug!(?interval, "auto-heart started");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => engine.heart_stream(),
                        // Explicit stop, or the handle was dropped.
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("auto-heart stopped");
            })?;
        Ok(AutoHeart {
            stop,
            worker: Some(worker),
        })
    }

    /// Stop the task and wait for the worker to exit.
    ///
    /// Equivalent to dropping the handle.
    pub fn stop(self) {}
}

impl Drop for AutoHeart {
    fn drop(&mut self) {
        let _ = self.stop.send(());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
