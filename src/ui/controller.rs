// GUI Controller - Bridges the Slint UI with the view-state machinery
//
// This module contains the GuiController which coordinates between:
// - Slint UI (ResumeWindow)
// - StateManager (view state + change events)
// - ExportService (PDF export pipeline)
// - UiBridge (async/GUI coordination)
// - KeyRouter (Escape handling scoped to the overlay)
//
// It handles:
// - Feeding the résumé view models into the window once at startup
// - Wiring UI callbacks to state transitions and async work
// - Subscribing to state changes and pushing them back into the UI
// - The export workflow: snapshot → save dialog → background conversion

use crate::metrics::Metrics;
use crate::models::{OverlayKind, ResumeRecord, STARTUP_DELAY, Theme};
use crate::services::export::{ExportError, ExportService, ExportSettings, Snapshot};
use crate::state::{StateChange, StateManager};
use crate::ui::bridge::{UiBridge, UiBridgeHandle};
use crate::ui::keys::{EscapeGuard, KeyRouter};
use crate::ui::viewmodel::{self, PageVm};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use slint::{ComponentHandle, Model, ModelRc, VecModel};
use std::sync::Arc;

// Include the generated Slint code
slint::include_modules!();

/// GUI Controller that wires up the Slint UI with state and services
///
/// This is the main coordinator for the GUI layer. It:
/// - Creates the window and populates it from the résumé record (once -
///   the record never changes after startup)
/// - Sets up Slint callbacks for every user-triggerable action
/// - Subscribes to StateManager events and updates the UI accordingly
/// - Spawns the one-shot startup splash timer
/// - Orchestrates the export workflow, including the native save dialog
///
/// # Example
/// ```ignore
/// let state_manager = Arc::new(StateManager::new());
/// let metrics = Arc::new(Metrics::new());
/// let record = Arc::new(config_manager.load_resume()?);
/// let runtime = tokio::runtime::Runtime::new()?;
///
/// let controller = GuiController::new(
///     state_manager,
///     record,
///     ExportSettings::default(),
///     runtime.handle().clone(),
///     metrics,
/// )?;
/// controller.run()?;  // Blocks until the window is closed
/// ```
pub struct GuiController {
    /// The Slint UI window
    ui: ResumeWindow,

    /// Event loop bridge; kept alive for the session
    _bridge: UiBridge<ResumeWindow>,

    /// Shared state manager
    _state_manager: Arc<StateManager>,
}

impl GuiController {
    /// Create a new GUI controller
    ///
    /// # Arguments
    /// * `state_manager` - Shared view-state manager
    /// * `record` - The résumé record to render
    /// * `export_settings` - Fixed export configuration
    /// * `tokio_handle` - Handle to the tokio runtime for background work
    /// * `metrics` - Session metrics sink
    pub fn new(
        state_manager: Arc<StateManager>,
        record: Arc<ResumeRecord>,
        export_settings: ExportSettings,
        tokio_handle: tokio::runtime::Handle,
        metrics: Arc<Metrics>,
    ) -> Result<Self> {
        let ui = ResumeWindow::new().context("Failed to create Slint UI")?;

        let bridge = UiBridge::new(&ui, tokio_handle, metrics.clone());
        let export_service = Arc::new(ExportService::new(metrics.clone()));
        let key_router = Arc::new(KeyRouter::new());

        // The record is static: project it into the window once
        let page = viewmodel::project_page(&record);
        Self::populate_resume(&ui, &page);

        Self::sync_ui_with_state(&ui, &state_manager);

        Self::setup_callbacks(
            &ui,
            &bridge.handle(),
            &state_manager,
            &export_service,
            export_settings,
            &key_router,
            &metrics,
        );

        Self::setup_state_subscription(&bridge.handle(), &state_manager, &key_router, &metrics);

        // One-shot splash timer; the page content appears when it fires
        let state_for_timer = Arc::clone(&state_manager);
        bridge.handle().spawn_async(move || async move {
            state_for_timer.run_startup_timer(STARTUP_DELAY).await;
        });

        tracing::info!("GUI controller initialized");

        Ok(Self {
            ui,
            _bridge: bridge,
            _state_manager: state_manager,
        })
    }

    /// Run the GUI (blocks until the window is closed)
    pub fn run(self) -> Result<(), slint::PlatformError> {
        tracing::info!("Starting GUI event loop");
        self.ui.run()
    }

    /// Project the page view models into the window's row models.
    fn populate_resume(ui: &ResumeWindow, page: &PageVm) {
        ui.set_person_name(page.header.name.clone().into());
        ui.set_person_title(page.header.title.clone().into());
        ui.set_person_tagline(page.header.tagline.clone().into());
        ui.set_summary(page.summary.clone().into());

        let contacts: Vec<ContactRow> = page
            .header
            .contacts
            .iter()
            .map(|c| ContactRow {
                icon: c.icon.clone().into(),
                text: c.text.clone().into(),
                url: c.url.clone().unwrap_or_default().into(),
            })
            .collect();
        ui.set_contacts(ModelRc::new(VecModel::from(contacts)));

        let skills: Vec<SkillRow> = page
            .skills
            .iter()
            .map(|s| SkillRow {
                category: s.category.clone().into(),
                items: bullet_lines(&s.items).into(),
            })
            .collect();
        ui.set_skills(ModelRc::new(VecModel::from(skills)));

        let experience: Vec<ExperienceRow> = page
            .experience
            .iter()
            .map(|e| ExperienceRow {
                position: e.position.clone().into(),
                company_line: joined_meta(&[&e.company, &e.period]).into(),
                bullets: bullet_lines(&e.responsibilities).into(),
            })
            .collect();
        ui.set_experience(ModelRc::new(VecModel::from(experience)));

        let education: Vec<EducationRow> = page
            .education
            .iter()
            .map(|e| EducationRow {
                degree: e.degree.clone().into(),
                institution: e.institution.clone().into(),
                period: e.period.clone().into(),
                thumbnail: load_image(e.thumbnail.as_deref()),
                thumbnail_url: e.thumbnail.clone().unwrap_or_default().into(),
                has_thumbnail: e.thumbnail.is_some(),
            })
            .collect();
        ui.set_education(ModelRc::new(VecModel::from(education)));

        let certifications: Vec<CertificationRow> = page
            .certifications
            .iter()
            .map(|c| CertificationRow {
                name: c.name.clone().into(),
                meta: c.meta_line.clone().into(),
                credential: c.credential_id.clone().unwrap_or_default().into(),
                thumbnail: load_image(c.thumbnail.as_deref()),
                thumbnail_url: c.thumbnail.clone().unwrap_or_default().into(),
                has_thumbnail: c.thumbnail.is_some(),
            })
            .collect();
        ui.set_certifications(ModelRc::new(VecModel::from(certifications)));

        let projects: Vec<ProjectRow> = page
            .projects
            .iter()
            .map(|p| ProjectRow {
                title: p.title.clone().into(),
                technologies: p.technologies.clone().into(),
                description: p.description.clone().into(),
                role: p.role.clone().unwrap_or_default().into(),
                impact: p.impact.clone().unwrap_or_default().into(),
                links: p
                    .links
                    .iter()
                    .map(|l| format!("{}: {}", l.label, l.url))
                    .collect::<Vec<_>>()
                    .join("   ·   ")
                    .into(),
                thumbnail: load_image(p.thumbnail.as_deref()),
                thumbnail_url: p.thumbnail.clone().unwrap_or_default().into(),
                has_thumbnail: p.thumbnail.is_some(),
            })
            .collect();
        ui.set_projects(ModelRc::new(VecModel::from(projects)));

        tracing::debug!(
            "Résumé projected into UI: {} skills, {} jobs, {} certifications, {} projects",
            ui.get_skills().row_count(),
            ui.get_experience().row_count(),
            ui.get_certifications().row_count(),
            ui.get_projects().row_count()
        );
    }

    /// Synchronize the view-state flags into the window
    ///
    /// Called once at startup; later changes arrive through the subscription.
    fn sync_ui_with_state(ui: &ResumeWindow, state_manager: &StateManager) {
        let state = state_manager.snapshot();

        ui.set_loading(state.loading);
        ui.set_dark_theme(state.theme == Theme::Dark);
        ui.set_exporting(state.exporting);
        ui.set_overlay_open(state.overlay.is_some());
        ui.set_notice_text("".into());

        tracing::debug!("UI synchronized with initial state");
    }

    /// Set up Slint UI callbacks
    ///
    /// This connects UI events (button clicks, thumbnail activations, raw
    /// keys) to state transitions and async work.
    fn setup_callbacks(
        ui: &ResumeWindow,
        bridge: &UiBridgeHandle<ResumeWindow>,
        state_manager: &Arc<StateManager>,
        export_service: &Arc<ExportService>,
        export_settings: ExportSettings,
        key_router: &Arc<KeyRouter>,
        metrics: &Arc<Metrics>,
    ) {
        let state = state_manager.clone();

        // Theme toggle
        ui.on_toggle_theme(move || {
            tracing::debug!("Theme toggle clicked");
            state.toggle_theme();
        });

        let state = state_manager.clone();

        // Thumbnail activation opens the overlay
        ui.on_thumbnail_activated(move |kind, url| {
            if url.is_empty() {
                tracing::debug!("Ignoring thumbnail activation with empty url");
                return;
            }

            let kind = match kind.as_str() {
                "certificate" => OverlayKind::CertificateImage,
                _ => OverlayKind::ProjectScreenshot,
            };

            tracing::debug!("Thumbnail activated: {:?} {}", kind, url);
            state.open_overlay(kind, url.as_str());
        });

        let state = state_manager.clone();

        // Overlay close button / backdrop click
        ui.on_overlay_dismissed(move || {
            tracing::debug!("Overlay dismissed");
            state.close_overlay();
        });

        let ui_weak = ui.as_weak();

        // Notice bar dismissed
        ui.on_notice_dismissed(move || {
            if let Some(ui) = ui_weak.upgrade() {
                ui.set_notice_text("".into());
            }
        });

        let router = key_router.clone();
        let metrics_for_keys = metrics.clone();

        // Raw key events; the router only reacts while a handler is attached
        ui.on_global_key(move |key_text| {
            if router.dispatch(key_text.as_str()) {
                metrics_for_keys.record_escape_dispatch();
            }
        });

        let state = state_manager.clone();
        let service = export_service.clone();
        let bridge_handle = bridge.clone();
        let metrics_for_export = metrics.clone();
        let ui_weak = ui.as_weak();

        // Export workflow
        ui.on_export_requested(move || {
            tracing::info!("Export requested");

            if state.read(|s| s.exporting) {
                tracing::debug!("Export already in flight - ignoring");
                return;
            }

            // Not ready: the splash is still covering the page, so there is
            // no rendered content to capture. Distinguishable error, no
            // download attempt.
            if !state.read(|s| s.is_ready()) {
                tracing::warn!("Export requested before the page finished loading");
                state.fail_export(ExportError::NotReady.to_string());
                return;
            }

            let Some(ui) = ui_weak.upgrade() else {
                return;
            };

            // Capture the rendered page; this callback runs on the event
            // loop thread, which is the only place a snapshot can be taken
            let snapshot = match ui.window().take_snapshot() {
                Ok(buffer) => {
                    match Snapshot::from_rgba8(
                        buffer.width(),
                        buffer.height(),
                        buffer.as_bytes().to_vec(),
                    ) {
                        Ok(snapshot) => snapshot,
                        Err(e) => {
                            tracing::error!("Snapshot conversion failed: {}", e);
                            state.fail_export(e.to_string());
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Window snapshot failed: {}", e);
                    state.fail_export(ExportError::NotReady.to_string());
                    return;
                }
            };

            // Ask where to save; cancelling is a quiet no-op
            let Some(dest) = Self::show_save_dialog(&export_settings.file_name) else {
                tracing::debug!("Save dialog cancelled");
                return;
            };

            state.begin_export();

            let state_for_task = state.clone();
            let service_for_task = service.clone();
            let settings_for_task = export_settings.clone();
            let metrics_for_task = metrics_for_export.clone();

            // The conversion runs in the background; completion or failure
            // comes back as a state change, so input handling never freezes
            bridge_handle.spawn_async(move || async move {
                match service_for_task
                    .export(snapshot, &settings_for_task, &dest)
                    .await
                {
                    Ok(outcome) => {
                        state_for_task.complete_export(outcome.pages, outcome.path.as_str());
                    }
                    Err(e) => {
                        tracing::error!("Export failed: {}", e);
                        metrics_for_task.record_export_failed();
                        state_for_task.fail_export(e.to_string());
                    }
                }
            });
        });

        tracing::debug!("UI callbacks configured");
    }

    /// Subscribe to state changes and update the UI accordingly
    ///
    /// This spawns a background thread that listens for state change events
    /// and updates the Slint UI via the UiBridge. The thread also owns the
    /// escape-key guard: attached exactly on OverlayOpened, dropped exactly
    /// on OverlayClosed, so the global key listener lives no longer than the
    /// overlay it serves.
    fn setup_state_subscription(
        bridge: &UiBridgeHandle<ResumeWindow>,
        state_manager: &Arc<StateManager>,
        key_router: &Arc<KeyRouter>,
        metrics: &Arc<Metrics>,
    ) {
        let bridge_handle = bridge.clone();
        let state_for_escape = state_manager.clone();
        let router = key_router.clone();
        let metrics = metrics.clone();
        let mut rx = state_manager.subscribe();

        std::thread::spawn(move || {
            tracing::debug!("State subscription thread started");

            // Scope of the attached Escape handler; None while no overlay
            let mut escape_guard: Option<EscapeGuard> = None;

            loop {
                match rx.blocking_recv() {
                    Ok(change) => {
                        tracing::trace!("State change received: {:?}", change);

                        match change {
                            StateChange::LoadingFinished => {
                                bridge_handle.update_ui(|ui| {
                                    ui.set_loading(false);
                                });
                            }

                            StateChange::ThemeChanged { theme } => {
                                let dark = theme == Theme::Dark;
                                bridge_handle.update_ui(move |ui| {
                                    ui.set_dark_theme(dark);
                                });
                            }

                            StateChange::OverlayOpened { kind, url } => {
                                metrics.record_overlay_open();

                                // Attach (or re-arm, on replace) the Escape
                                // handler for exactly as long as the overlay
                                // is open
                                let state_clone = state_for_escape.clone();
                                escape_guard = Some(router.attach_escape(move || {
                                    state_clone.close_overlay();
                                }));

                                tracing::debug!("Overlay opened: {:?} {}", kind, url);
                                bridge_handle.update_ui(move |ui| {
                                    // A url that fails to decode shows as an
                                    // empty frame; that is a rendering
                                    // concern, not a controller failure
                                    ui.set_overlay_image(load_image(Some(url.as_str())));
                                    ui.set_overlay_caption(url.into());
                                    ui.set_overlay_open(true);
                                });
                            }

                            StateChange::OverlayClosed => {
                                // Dropping the guard detaches the handler
                                escape_guard = None;

                                bridge_handle.update_ui(|ui| {
                                    ui.set_overlay_open(false);
                                    ui.set_overlay_caption("".into());
                                });
                            }

                            StateChange::ExportStarted => {
                                bridge_handle.update_ui(|ui| {
                                    ui.set_exporting(true);
                                    ui.set_notice_text("".into());
                                });
                            }

                            StateChange::ExportFinished { pages, path } => {
                                let notice = format!(
                                    "Saved {} ({} page{})",
                                    path,
                                    pages,
                                    if pages == 1 { "" } else { "s" }
                                );
                                bridge_handle.update_ui(move |ui| {
                                    ui.set_exporting(false);
                                    ui.set_notice_is_error(false);
                                    ui.set_notice_text(notice.into());
                                });
                            }

                            StateChange::ExportFailed { message } => {
                                bridge_handle.update_ui(move |ui| {
                                    ui.set_exporting(false);
                                    ui.set_notice_is_error(true);
                                    ui.set_notice_text(message.into());
                                });
                            }
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        tracing::info!(
                            "State broadcast channel closed - shutting down subscription thread"
                        );
                        break;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "State subscription lagged - {} events were skipped",
                            skipped
                        );
                        // Continue receiving - this is a recoverable error
                    }
                }
            }

            drop(escape_guard);
            tracing::debug!("State subscription thread terminated gracefully");
        });
    }

    /// Show the native save dialog for the exported document
    ///
    /// # Returns
    /// The chosen path, or None if the user cancelled
    fn show_save_dialog(default_file_name: &str) -> Option<Utf8PathBuf> {
        use rfd::FileDialog;

        FileDialog::new()
            .set_title("Export résumé as PDF")
            .set_file_name(default_file_name)
            .add_filter("PDF document", &["pdf"])
            .save_file()
            .and_then(|path| {
                Utf8PathBuf::try_from(path)
                    .map_err(|e| {
                        tracing::error!("Failed to convert path to UTF-8: {}", e);
                        e
                    })
                    .ok()
            })
    }
}

/// Join non-empty parts with a dot separator ("Acme  ·  2020-2021").
fn joined_meta(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("  ·  ")
}

/// Render a list as bulleted lines for a multi-line Text element.
fn bullet_lines(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("•  {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Load an image for display; a missing or undecodable file yields the
/// default (empty) image, which renders as an empty frame.
fn load_image(path: Option<&str>) -> slint::Image {
    match path {
        Some(path) => slint::Image::load_from_path(std::path::Path::new(path)).unwrap_or_else(
            |_| {
                tracing::warn!("Could not load image: {}", path);
                slint::Image::default()
            },
        ),
        None => slint::Image::default(),
    }
}
