//! Data models for the cvfolio application.
//!
//! This module contains the core data structures used throughout the app:
//! - [`ResumeRecord`]: the static résumé aggregate the page is rendered from
//!   (single definition; variant content lives in optional fields)
//! - [`ViewState`]: transient per-session UI state (splash flag, theme,
//!   overlay slot, export flag) and the [`STARTUP_DELAY`] constant
//! - [`UserSettings`]: user preferences loaded from `cvfolio Data/Settings.yaml`
//!
//! # Architecture Note
//!
//! - The résumé record and settings derive `Serialize`/`Deserialize` for YAML
//!   persistence through [`ConfigManager`](crate::config::ConfigManager).
//! - `ViewState` is wrapped in `Arc<RwLock<>>` by
//!   [`StateManager`](crate::state::StateManager); mutations go through the
//!   manager so every transition emits a change event.

pub mod resume;
pub mod settings;
pub mod view_state;

pub use resume::{
    CertificationEntry, EducationEntry, PersonalInfo, ProjectEntry, ResumeRecord, SkillCategory,
    WorkExperienceEntry,
};
pub use settings::{FolioSettings, UserSettings};
pub use view_state::{OverlayImage, OverlayKind, STARTUP_DELAY, Theme, ViewState};
