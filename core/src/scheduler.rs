//! Periodic sweep scheduling.
//!
//! One dedicated thread owns an engine and runs sweeps back-to-back on the
//! configured interval; a new sweep can never start while the previous one
//! is still running because there is only the one thread. The loop waits on
//! `recv_timeout`, so a stop request is honored without waiting out the
//! interval.

use crate::engine::DeskEngine;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;

pub struct SweepScheduler {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl SweepScheduler {
    /// Take ownership of an engine and start sweeping. The engine should
    /// hold its own store connection; request-side engines keep theirs.
    pub fn start(engine: DeskEngine) -> Self {
        let interval = engine.config().sweep_interval();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = std::thread::spawn(move || {
            log::info!(
                "sweep scheduler started (every {}s)",
                interval.as_secs()
            );
            loop {
                match stop_rx.recv_timeout(interval) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }
                if let Err(e) = engine.run_sweep() {
                    log::warn!("sweep failed: {e}");
                }
            }
            log::info!("sweep scheduler stopped");
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signal the loop and wait for the in-flight sweep (if any) to finish.
    pub fn stop(mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
