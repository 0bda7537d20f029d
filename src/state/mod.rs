// State management module
//
// This module provides the StateManager which wraps ViewState with thread-safe
// access using Arc<RwLock<T>> and emits change events for GUI updates.

use crate::models::{OverlayImage, OverlayKind, Theme, ViewState};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;

/// Change events emitted when the view state is modified
///
/// These events notify interested parties (primarily the GUI controller)
/// about state transitions without requiring them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The startup splash timer fired; the page content is now visible
    LoadingFinished,

    /// The color scheme was toggled
    ThemeChanged {
        theme: Theme,
    },

    /// An image overlay was opened (or replaced an already-open one)
    OverlayOpened {
        kind: OverlayKind,
        url: String,
    },

    /// The image overlay was dismissed
    OverlayClosed,

    /// An export job started
    ExportStarted,

    /// An export job wrote a document successfully
    ExportFinished {
        pages: usize,
        path: String,
    },

    /// An export job failed; `message` is user-presentable
    ExportFailed {
        message: String,
    },
}

/// Thread-safe view-state manager with event emission
///
/// This is the central state component of the page session. It:
/// - Provides thread-safe access to [`ViewState`] via `Arc<RwLock<T>>`
/// - Detects transitions by diffing old/new state and emits [`StateChange`]s
/// - Offers convenience methods for every user-triggerable transition
/// - Supports subscribing to changes via a tokio broadcast channel
///
/// There is exactly one mutator per session (the session's own event
/// handlers), so transitions are atomic with respect to each other.
///
/// # Related Types
///
/// - [`crate::models::ViewState`]: the underlying state structure
/// - [`StateChange`]: event types emitted on transitions
/// - [`crate::ui::GuiController`]: primary consumer of state events
pub struct StateManager {
    /// The view state protected by RwLock for thread-safe access
    state: Arc<RwLock<ViewState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state (splash showing,
    /// light theme, no overlay)
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(64);
        Self {
            state: Arc::new(RwLock::new(ViewState::default())),
            state_tx,
        }
    }

    /// Get a read-only snapshot of the current state
    pub fn snapshot(&self) -> ViewState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let ready = state_manager.read(|state| state.is_ready());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ViewState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// Captures the old state, applies the update function, diffs old vs.
    /// new, and broadcasts one event per detected transition.
    ///
    /// # Returns
    /// The events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut ViewState),
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = self.detect_changes(&old_state, &state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    ///
    /// Returns a receiver notified of all future changes. Multiple
    /// subscribers can listen simultaneously.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Diff two states and generate the corresponding events
    fn detect_changes(&self, old: &ViewState, new: &ViewState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        // The splash only ever transitions true -> false
        if old.loading && !new.loading {
            changes.push(StateChange::LoadingFinished);
        }

        if old.theme != new.theme {
            changes.push(StateChange::ThemeChanged { theme: new.theme });
        }

        // Overlay transitions: open, close, or replace (replace re-emits
        // OverlayOpened so the escape listener is re-armed, never doubled)
        match (&old.overlay, &new.overlay) {
            (None, Some(overlay)) => changes.push(StateChange::OverlayOpened {
                kind: overlay.kind,
                url: overlay.url.clone(),
            }),
            (Some(_), None) => changes.push(StateChange::OverlayClosed),
            (Some(old_overlay), Some(new_overlay)) if old_overlay != new_overlay => {
                changes.push(StateChange::OverlayOpened {
                    kind: new_overlay.kind,
                    url: new_overlay.url.clone(),
                });
            }
            _ => {}
        }

        if !old.exporting && new.exporting {
            changes.push(StateChange::ExportStarted);
        }
        // exporting -> false is reported through complete_export/fail_export,
        // which carry the outcome payload

        changes
    }

    // Convenience methods for the user-triggerable transitions

    /// Mark the startup splash as finished
    pub fn finish_loading(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.loading = false;
        })
    }

    /// Sleep for the startup delay, then clear the splash flag
    ///
    /// Spawned once per session by the GUI controller. Flipping the flag twice
    /// is harmless, so an early `finish_loading` (e.g. from a test) does not
    /// conflict with the timer.
    pub async fn run_startup_timer(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
        tracing::debug!("Startup timer fired after {:?}", delay);
        self.finish_loading();
    }

    /// Flip the color scheme. Flipping twice restores the original value.
    pub fn toggle_theme(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.theme = state.theme.toggled();
        })
    }

    /// Show a full-size image overlay
    ///
    /// Any non-empty url is accepted; whether the resource actually decodes
    /// is a rendering concern, not a controller failure. Opening while an
    /// overlay is already shown replaces it.
    pub fn open_overlay(&self, kind: OverlayKind, url: impl Into<String>) -> Vec<StateChange> {
        let url = url.into();
        self.update(|state| {
            state.overlay = Some(OverlayImage { kind, url });
        })
    }

    /// Dismiss the overlay. Safe to call when none is open (no-op, no event).
    pub fn close_overlay(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.overlay = None;
        })
    }

    /// Mark an export job as started
    pub fn begin_export(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.exporting = true;
        })
    }

    /// Record a successful export and clear the in-flight flag
    pub fn complete_export(&self, pages: usize, path: impl Into<String>) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            state.exporting = false;
        });

        let event = StateChange::ExportFinished {
            pages,
            path: path.into(),
        };
        let _ = self.state_tx.send(event.clone());
        changes.push(event);

        changes
    }

    /// Record a failed export and clear the in-flight flag
    ///
    /// Export failures are always recoverable: the session keeps running and
    /// the user may simply retry.
    pub fn fail_export(&self, message: impl Into<String>) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            state.exporting = false;
        });

        let event = StateChange::ExportFailed {
            message: message.into(),
        };
        let _ = self.state_tx.send(event.clone());
        changes.push(event);

        changes
    }

    /// Apply user settings to the initial state
    ///
    /// Only the starting theme comes from settings; the in-session toggle is
    /// never written back.
    pub fn load_from_settings(&self, settings: &crate::models::FolioSettings) -> Vec<StateChange> {
        self.update(|state| {
            state.theme = if settings.dark_mode {
                Theme::Dark
            } else {
                Theme::Light
            };

            tracing::info!(
                "Applied user settings: dark_mode={}, debug_mode={}",
                settings.dark_mode,
                settings.debug_mode
            );
        })
    }

    /// Get an Arc reference to the state for use in worker tasks
    pub fn state_arc(&self) -> Arc<RwLock<ViewState>> {
        Arc::clone(&self.state)
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across threads
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
