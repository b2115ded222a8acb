//! Background dataset loader.
//!
//! Runs [`DataManager`] loads in a tokio task and reports each outcome as a
//! [`LoadEvent`] over an `mpsc` channel, so the TUI event loop never blocks
//! on I/O and holds no shared mutable state.

use ev_data::analysis::AnalysisResult;
use tokio::sync::mpsc;

use crate::data_manager::{load_shared, SharedDataManager};

// ── Public types ──────────────────────────────────────────────────────────────

/// Outcome of one load attempt.
#[derive(Debug, Clone)]
pub enum LoadEvent {
    /// Fresh (or fallback-cached) analysis result.
    Loaded(AnalysisResult),
    /// Every attempt failed and no cached data exists.
    Failed(String),
}

// ── DataLoader ────────────────────────────────────────────────────────────────

/// Background loader.
///
/// Call [`DataLoader::start`] to spin up the load loop in a dedicated tokio
/// task.  It loads once immediately and again on every
/// [`LoaderHandle::reload`] request.
pub struct DataLoader {
    manager: SharedDataManager,
}

impl DataLoader {
    pub fn new(manager: SharedDataManager) -> Self {
        Self { manager }
    }

    /// Start the load loop.
    ///
    /// Returns the event receiver and a [`LoaderHandle`] used to request
    /// reloads or abort the task.
    pub fn start(self) -> (mpsc::Receiver<LoadEvent>, LoaderHandle) {
        let (tx, rx) = mpsc::channel(16);
        let (reload_tx, reload_rx) = mpsc::channel(4);

        let handle = tokio::spawn(async move {
            self.load_loop(tx, reload_rx).await;
        });

        (rx, LoaderHandle { handle, reload_tx })
    }

    // ── Private implementation ────────────────────────────────────────────

    /// Exits when either the event receiver or the handle is dropped.
    async fn load_loop(self, tx: mpsc::Sender<LoadEvent>, mut reload_rx: mpsc::Receiver<()>) {
        self.load_and_send(&tx, false).await;

        while reload_rx.recv().await.is_some() {
            if tx.is_closed() {
                tracing::debug!("loader channel closed; exiting loop");
                break;
            }
            self.load_and_send(&tx, true).await;
        }
    }

    async fn load_and_send(&self, tx: &mpsc::Sender<LoadEvent>, force: bool) {
        let event = match load_shared(&self.manager, force).await {
            Ok(result) => {
                tracing::info!(
                    records = result.metadata.records_processed,
                    source = %result.metadata.source,
                    "dataset loaded"
                );
                LoadEvent::Loaded(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "dataset load failed");
                LoadEvent::Failed(e.to_string())
            }
        };

        if let Err(e) = tx.send(event).await {
            tracing::warn!(error = %e, "failed to send load event; receiver dropped");
        }
    }
}

// ── LoaderHandle ──────────────────────────────────────────────────────────────

/// A handle to the background loader task.
pub struct LoaderHandle {
    handle: tokio::task::JoinHandle<()>,
    reload_tx: mpsc::Sender<()>,
}

impl LoaderHandle {
    /// Request a forced reload.  Returns `false` when a reload is already
    /// queued or the loader has stopped.
    pub fn reload(&self) -> bool {
        self.reload_tx.try_send(()).is_ok()
    }

    /// Immediately abort the loader task.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
