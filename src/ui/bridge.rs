// UiBridge - Coordinates between the tokio runtime and the Slint event loop
//
// Two event loops run in this application: Slint's single-threaded GUI loop
// on the main thread, and tokio's pool for the startup timer and export
// jobs. The bridge marshals between them:
// - UI mutations from background tasks are queued through a bounded channel
//   and applied on the Slint thread via upgrade_in_event_loop
// - Slint callbacks spawn async work on the tokio handle without blocking
//   input handling

use crate::metrics::Metrics;
use slint::{ComponentHandle, Weak};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Capacity of the UI update queue. Export progress traffic is light, so a
/// small bound is plenty; a full queue drops updates instead of growing.
const UI_QUEUE_CAPACITY: usize = 32;

type UiUpdate<T> = Box<dyn FnOnce(&T) + Send>;

/// Cloneable handle for marshaling work between tokio and the Slint loop.
///
/// Created by [`UiBridge::new`]; hand clones to every callback and task that
/// needs to touch the UI or spawn async work.
pub struct UiBridgeHandle<T: ComponentHandle> {
    ui_weak: Weak<T>,
    tokio_handle: tokio::runtime::Handle,
    update_tx: mpsc::Sender<UiUpdate<T>>,
    metrics: Arc<Metrics>,
}

// Manual Clone implementation to avoid requiring T: Clone
impl<T: ComponentHandle> Clone for UiBridgeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            ui_weak: self.ui_weak.clone(),
            tokio_handle: self.tokio_handle.clone(),
            update_tx: self.update_tx.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<T: ComponentHandle + 'static> UiBridgeHandle<T> {
    /// Queue a UI mutation from any thread.
    ///
    /// The closure runs on the Slint event loop thread on its next
    /// iteration. When the queue is full the update is dropped (and counted)
    /// rather than applying backpressure to the sender.
    pub fn update_ui<F>(&self, update: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        match self.update_tx.try_send(Box::new(update)) {
            Ok(_) => self.metrics.record_ui_update(),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.record_ui_update_dropped();
                tracing::warn!("UI update queue full - dropping update");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("UI update queue closed - handler thread has stopped");
            }
        }
    }

    /// Spawn async work on the tokio runtime from a Slint callback.
    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tokio_handle.spawn(async move {
            future_factory().await;
        });
    }

    /// Weak reference to the UI component, for direct event-loop-side use.
    pub fn ui_weak(&self) -> &Weak<T> {
        &self.ui_weak
    }
}

/// Owner of the marshaling machinery; keep it alive for the session.
pub struct UiBridge<T: ComponentHandle> {
    handle: UiBridgeHandle<T>,
}

impl<T: ComponentHandle + 'static> UiBridge<T> {
    /// Create the bridge and start its handler thread.
    ///
    /// The handler thread drains the update queue and forwards each closure
    /// to the Slint loop with `upgrade_in_event_loop`; it terminates when the
    /// queue closes or the event loop is gone.
    pub fn new(ui: &T, tokio_handle: tokio::runtime::Handle, metrics: Arc<Metrics>) -> Self {
        let ui_weak = ui.as_weak();
        let (update_tx, mut update_rx) = mpsc::channel::<UiUpdate<T>>(UI_QUEUE_CAPACITY);

        let ui_weak_for_thread = ui_weak.clone();
        std::thread::spawn(move || {
            tracing::debug!("UiBridge handler thread started");

            while let Some(update_fn) = update_rx.blocking_recv() {
                let result = ui_weak_for_thread.upgrade_in_event_loop(move |ui| {
                    update_fn(&ui);
                });

                if let Err(e) = result {
                    // The event loop has stopped; nothing left to update
                    tracing::warn!("Failed to queue UI update to event loop: {:?}", e);
                    break;
                }
            }

            tracing::debug!("UiBridge handler thread terminated");
        });

        Self {
            handle: UiBridgeHandle {
                ui_weak,
                tokio_handle,
                update_tx,
                metrics,
            },
        }
    }

    /// Get a cloneable handle for callbacks and background tasks.
    pub fn handle(&self) -> UiBridgeHandle<T> {
        self.handle.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // A real Slint component needs a display, so these tests cover the
    // tokio-facing half; the full bridge is exercised by running the app.

    #[test]
    fn test_spawned_work_runs() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = counter.clone();
        rt.spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        rt.shutdown_timeout(Duration::from_secs(1));
    }

    #[test]
    fn test_tokio_handle_crosses_threads() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let handle = rt.handle().clone();

        std::thread::spawn(move || {
            let _handle = handle;
        })
        .join()
        .unwrap();
    }
}
