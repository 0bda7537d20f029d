// UI module - GUI logic and event loop bridge
//
// This module contains:
// - UiBridge: coordinates between the tokio runtime and the Slint event loop
// - GuiController: wires the window to state, services and key routing
// - KeyRouter: Escape handling scoped to the overlay's open state
// - viewmodel: the pure record-to-page projection

pub mod bridge;
pub mod controller;
pub mod keys;
pub mod viewmodel;

pub use bridge::{UiBridge, UiBridgeHandle};
pub use controller::GuiController;
pub use keys::{ESCAPE, EscapeGuard, KeyRouter};
