// cvfolio - Desktop résumé/portfolio viewer with one-click PDF export
//
// This is the library crate containing the view-state machinery, the export
// pipeline and the data models. The binary crate (main.rs) provides the GUI
// entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::Metrics;
pub use models::{OverlayKind, ResumeRecord, Theme, UserSettings, ViewState};
pub use services::{ExportError, ExportService, ExportSettings, Snapshot};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
