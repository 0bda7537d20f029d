//! cvfolio - Desktop résumé/portfolio viewer with one-click PDF export
//!
//! Main entry point for the GUI application.
//!
//! # Overview
//!
//! This binary crate provides the Slint GUI frontend for cvfolio. It
//! initializes:
//! - Logging infrastructure (file rotation + console output)
//! - Tokio async runtime (startup timer + export jobs)
//! - View-state management ([`StateManager`])
//! - Configuration loading ([`ConfigManager`])
//! - GUI controller ([`GuiController`] - bridges the Slint UI with the
//!   state machinery and the export service)
//!
//! The application uses a hybrid threading model:
//! - **Main thread**: runs the Slint event loop (blocking, synchronous)
//! - **Tokio workers**: handle the one-shot splash timer and export jobs
//!   (the CPU-bound conversion runs on the blocking pool)
//! - **State listener**: background std::thread for reactive UI updates
//!
//! # Execution Flow
//!
//! 1. Initialize logging → logs/cvfolio.<date>
//! 2. Create tokio runtime with 2 worker threads
//! 3. Create StateManager (Arc<RwLock<ViewState>>)
//! 4. Load configuration from `cvfolio Data/`
//!    - `Resume.yaml` → overrides the embedded résumé record
//!    - `Settings.yaml` → initial theme, export options
//! 5. Create GuiController (wires the Slint UI to state and runtime) and
//!    start the splash timer
//! 6. Run the Slint event loop (blocks until the window is closed)
//! 7. Log the session metrics summary and shut the runtime down
//!
//! # Configuration Files
//!
//! Expected (all optional) in the `cvfolio Data/` directory:
//! - `Resume.yaml`: résumé record override (embedded default otherwise)
//! - `Settings.yaml`: user preferences

use anyhow::Result;
use cvfolio::metrics::Metrics;
use cvfolio::services::ExportSettings;
use cvfolio::ui::GuiController;
use cvfolio::{APP_NAME, ConfigManager, StateManager, VERSION};
use std::sync::Arc;

/// Main entry point for the cvfolio GUI application
///
/// # Errors
///
/// This function can fail if:
/// - Logging initialization fails (disk space, permissions)
/// - Tokio runtime creation fails (system resources)
/// - The résumé override or settings file is malformed YAML
/// - Slint UI initialization fails (graphics drivers, display)
/// - The GUI encounters a fatal error during execution
fn main() -> Result<()> {
    // Setup logging with both file and console output; the guard keeps the
    // non-blocking writer flushing until exit
    let _log_guard = cvfolio::logging::init("logs", "cvfolio", false, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    // Create tokio runtime for the splash timer and export jobs
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("cvfolio-worker")
        .build()?;

    tracing::info!("Tokio runtime initialized with {} worker threads", 2);

    let metrics = Arc::new(Metrics::new());

    // Create state manager for the page session
    let state_manager = Arc::new(StateManager::new());
    tracing::info!("State manager initialized");

    // Load configuration and the résumé record
    let config_manager = ConfigManager::new("cvfolio Data")?;
    let record = Arc::new(config_manager.load_resume()?);
    let settings = config_manager.load_settings()?;

    tracing::info!(
        "Loaded résumé record for {} - {} skill groups, {} jobs, {} certifications, {} projects",
        record.personal_info.name,
        record.skills.len(),
        record.work_experience.len(),
        record.certifications.len(),
        record.projects.len()
    );

    // Apply settings (initial theme) to the session state
    state_manager.load_from_settings(&settings.folio_settings);

    // Create GUI controller; this also spawns the one-shot splash timer
    let gui_controller = GuiController::new(
        state_manager.clone(),
        record,
        ExportSettings::from(&settings.folio_settings),
        runtime.handle().clone(),
        metrics.clone(),
    )?;

    tracing::info!("GUI controller initialized, launching window");

    // Run the GUI (blocks until the window is closed)
    // The tokio runtime stays alive in the background for export jobs
    let result = gui_controller.run();

    // Clean up after the window closes
    tracing::info!("GUI closed, shutting down");

    if state_manager.read(|s| s.exporting) {
        // No cancellation exists once an export started; the job is simply
        // abandoned with the runtime
        tracing::warn!("Window closed during an export - the job is abandoned");
    }

    metrics.log_summary();

    // Shutdown the tokio runtime gracefully
    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    tracing::info!("Application shutdown complete");

    result.map_err(|e| {
        tracing::error!("GUI error: {}", e);
        anyhow::anyhow!("GUI error: {}", e)
    })
}
