use std::time::Duration;

/// Duration of the one-shot startup splash timer.
///
/// The delay is cosmetic: there is no real data load behind it (the résumé
/// record is embedded at compile time), so the page simply shows its splash
/// for this long before revealing the content. The timer is spawned once per
/// session by [`crate::ui::GuiController`] via
/// [`StateManager::run_startup_timer`](crate::state::StateManager::run_startup_timer);
/// there is no user-facing cancellation, and a session that ends early just
/// drops the sleeping task.
pub const STARTUP_DELAY: Duration = Duration::from_millis(1000);

/// Color scheme of the page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The opposite scheme. Applying this twice yields the original value.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// What a full-size image overlay is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayKind {
    ProjectScreenshot,
    CertificateImage,
}

/// The image overlay slot: a thumbnail the user activated, shown full-size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayImage {
    pub kind: OverlayKind,
    pub url: String,
}

/// Transient per-session UI state.
///
/// This is everything about the page that is NOT derived from the résumé
/// record: the startup splash flag, the color scheme, the single image
/// overlay slot, and whether an export job is in flight.
///
/// # Thread Safety
///
/// `ViewState` is wrapped in `Arc<RwLock<ViewState>>` by
/// [`crate::state::StateManager`]. Never mutate it directly - go through the
/// manager so transitions emit [`StateChange`](crate::state::StateChange)
/// events for the UI.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    /// True from session start until the startup timer fires.
    pub loading: bool,

    /// Current color scheme.
    pub theme: Theme,

    /// The open overlay, if any. At most one at a time; opening a second
    /// replaces the first.
    pub overlay: Option<OverlayImage>,

    /// True while an export job is running.
    pub exporting: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            loading: true,
            theme: Theme::Light,
            overlay: None,
            exporting: false,
        }
    }
}

impl ViewState {
    /// Whether an overlay is currently shown.
    pub fn is_overlay_open(&self) -> bool {
        self.overlay.is_some()
    }

    /// Whether the page content is visible and exportable.
    pub fn is_ready(&self) -> bool {
        !self.loading
    }
}
