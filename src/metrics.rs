// Performance metrics module
//
// Lightweight counters for monitoring the session: export activity, the
// lazy-engine contract, and UI update traffic.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Session performance metrics
///
/// Uses atomic operations for thread-safe tracking without locks. Counters
/// are bumped throughout the session and summarized on shutdown. The
/// `engine_acquisitions` counter doubles as the observable proof of the
/// export capability's load-once contract: it must read 1 no matter how many
/// exports ran.
#[derive(Debug)]
pub struct Metrics {
    /// Exports that produced a document
    exports_completed: AtomicUsize,

    /// Exports that ended in a (recoverable) error
    exports_failed: AtomicUsize,

    /// Times the PDF engine was acquired (expected: 0 or 1 per session)
    engine_acquisitions: AtomicUsize,

    /// Total export pipeline wall time in milliseconds
    total_export_time_ms: AtomicU64,

    /// Overlays opened (either kind)
    overlay_opens: AtomicU64,

    /// Escape presses that were dispatched to an attached handler
    escape_dispatches: AtomicU64,

    /// UI updates marshaled to the event loop
    ui_updates: AtomicU64,

    /// UI updates dropped because the bridge channel was full
    ui_updates_dropped: AtomicU64,

    /// Session start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            exports_completed: AtomicUsize::new(0),
            exports_failed: AtomicUsize::new(0),
            engine_acquisitions: AtomicUsize::new(0),
            total_export_time_ms: AtomicU64::new(0),
            overlay_opens: AtomicU64::new(0),
            escape_dispatches: AtomicU64::new(0),
            ui_updates: AtomicU64::new(0),
            ui_updates_dropped: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a successful export and its pipeline wall time
    pub fn record_export_completed(&self, duration: Duration) {
        self.exports_completed.fetch_add(1, Ordering::Relaxed);
        self.total_export_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_export_failed(&self) {
        self.exports_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_engine_acquisition(&self) {
        self.engine_acquisitions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_overlay_open(&self) {
        self.overlay_opens.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_escape_dispatch(&self) {
        self.escape_dispatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ui_update(&self) {
        self.ui_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ui_update_dropped(&self) {
        self.ui_updates_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn exports_completed(&self) -> usize {
        self.exports_completed.load(Ordering::Relaxed)
    }

    pub fn exports_failed(&self) -> usize {
        self.exports_failed.load(Ordering::Relaxed)
    }

    pub fn engine_acquisitions(&self) -> usize {
        self.engine_acquisitions.load(Ordering::Relaxed)
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average export pipeline time in milliseconds
    pub fn avg_export_time_ms(&self) -> f64 {
        let total = self.total_export_time_ms.load(Ordering::Relaxed);
        let count = self.exports_completed.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log a metrics summary (called on shutdown)
    pub fn log_summary(&self) {
        tracing::info!("=== Session Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Exports: {} completed, {} failed (engine acquisitions: {})",
            self.exports_completed.load(Ordering::Relaxed),
            self.exports_failed.load(Ordering::Relaxed),
            self.engine_acquisitions.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Export time: {:.2}s total (avg: {:.2}ms per export)",
            self.total_export_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_export_time_ms()
        );
        tracing::info!(
            "Overlays opened: {}, escape dispatches: {}",
            self.overlay_opens.load(Ordering::Relaxed),
            self.escape_dispatches.load(Ordering::Relaxed)
        );
        tracing::info!(
            "UI updates: {} ({} dropped)",
            self.ui_updates.load(Ordering::Relaxed),
            self.ui_updates_dropped.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
