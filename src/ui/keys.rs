// Key routing scoped to transient UI state.
//
// The page listens for Escape only while an image overlay is open. The
// contract is attach-on-need / detach-on-release: the controller attaches a
// handler exactly on the overlay-opened transition and the handler is
// guaranteed to be released when the open state goes away, regardless of
// which close trigger fired (close button, backdrop click, Escape itself).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Key text Slint delivers for the Escape key.
pub const ESCAPE: &str = "\u{1b}";

type EscapeHandler = Arc<dyn Fn() + Send + Sync + 'static>;

struct EscapeSlot {
    handler: EscapeHandler,
    token: u64,
}

/// Routes raw key events to the handler that is currently in scope.
///
/// Holds at most one Escape handler. [`attach_escape`](Self::attach_escape)
/// replaces any previous handler and returns an [`EscapeGuard`]; dropping the
/// guard detaches the handler it installed (and only that one - a stale guard
/// from a replaced attach is inert). While nothing is attached,
/// [`dispatch`](Self::dispatch) is a no-op.
pub struct KeyRouter {
    escape: Mutex<Option<EscapeSlot>>,
    next_token: AtomicU64,
}

impl KeyRouter {
    pub fn new() -> Self {
        Self {
            escape: Mutex::new(None),
            next_token: AtomicU64::new(1),
        }
    }

    /// Install the Escape handler, replacing any previous one.
    ///
    /// The returned guard detaches the handler on drop.
    pub fn attach_escape(
        self: &Arc<Self>,
        handler: impl Fn() + Send + Sync + 'static,
    ) -> EscapeGuard {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        *self.escape.lock().unwrap() = Some(EscapeSlot {
            handler: Arc::new(handler),
            token,
        });

        tracing::debug!("Escape handler attached (token {})", token);
        EscapeGuard {
            router: Arc::clone(self),
            token,
        }
    }

    /// Whether an Escape handler is currently in scope.
    pub fn is_escape_attached(&self) -> bool {
        self.escape.lock().unwrap().is_some()
    }

    /// Deliver a raw key event.
    ///
    /// Returns true when the event was consumed by an attached handler.
    /// The handler runs with the slot lock released, so it is free to close
    /// the overlay and thereby detach itself.
    pub fn dispatch(&self, key_text: &str) -> bool {
        if key_text != ESCAPE {
            return false;
        }

        let attached = self
            .escape
            .lock()
            .unwrap()
            .as_ref()
            .map(|slot| (slot.handler.clone(), slot.token));

        match attached {
            Some((handler, token)) => {
                tracing::debug!("Dispatching Escape to handler (token {})", token);
                handler();
                true
            }
            None => false,
        }
    }

    fn detach_escape(&self, token: u64) {
        let mut slot = self.escape.lock().unwrap();
        if slot.as_ref().is_some_and(|s| s.token == token) {
            *slot = None;
            tracing::debug!("Escape handler detached (token {})", token);
        }
    }
}

impl Default for KeyRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII scope of an attached Escape handler; dropping it detaches the
/// handler this guard installed.
pub struct EscapeGuard {
    router: Arc<KeyRouter>,
    token: u64,
}

impl Drop for EscapeGuard {
    fn drop(&mut self) {
        self.router.detach_escape(self.token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_dispatch_without_handler_is_noop() {
        let router = Arc::new(KeyRouter::new());
        assert!(!router.dispatch(ESCAPE));
        assert!(!router.is_escape_attached());
    }

    #[test]
    fn test_dispatch_reaches_attached_handler() {
        let router = Arc::new(KeyRouter::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let hits_clone = hits.clone();
        let _guard = router.attach_escape(move || {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(router.dispatch(ESCAPE));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_non_escape_keys_are_ignored() {
        let router = Arc::new(KeyRouter::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let hits_clone = hits.clone();
        let _guard = router.attach_escape(move || {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!router.dispatch("a"));
        assert!(!router.dispatch("\n"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_guard_drop_detaches() {
        let router = Arc::new(KeyRouter::new());

        {
            let _guard = router.attach_escape(|| {});
            assert!(router.is_escape_attached());
        }

        assert!(!router.is_escape_attached());
        assert!(!router.dispatch(ESCAPE));
    }

    #[test]
    fn test_reattach_replaces_handler() {
        let router = Arc::new(KeyRouter::new());
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let first_clone = first.clone();
        let _guard_a = router.attach_escape(move || {
            first_clone.fetch_add(1, Ordering::SeqCst);
        });

        let second_clone = second.clone();
        let _guard_b = router.attach_escape(move || {
            second_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(router.dispatch(ESCAPE));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stale_guard_does_not_detach_replacement() {
        let router = Arc::new(KeyRouter::new());

        let guard_a = router.attach_escape(|| {});
        let _guard_b = router.attach_escape(|| {});

        // Dropping the superseded guard must leave the current handler alone
        drop(guard_a);
        assert!(router.is_escape_attached());
    }

    #[test]
    fn test_handler_may_detach_itself() {
        // Mirrors the real flow: Escape closes the overlay, which drops the
        // guard from inside the handler's call chain.
        let router = Arc::new(KeyRouter::new());
        let guard_cell: Arc<Mutex<Option<EscapeGuard>>> = Arc::new(Mutex::new(None));

        let cell_clone = guard_cell.clone();
        let guard = router.attach_escape(move || {
            *cell_clone.lock().unwrap() = None;
        });
        *guard_cell.lock().unwrap() = Some(guard);

        assert!(router.dispatch(ESCAPE));
        assert!(!router.is_escape_attached());
        assert!(!router.dispatch(ESCAPE));
    }

    #[test]
    fn test_repeated_open_close_cycles_leave_no_handler() {
        let router = Arc::new(KeyRouter::new());

        for _ in 0..10 {
            let guard = router.attach_escape(|| {});
            assert!(router.is_escape_attached());
            drop(guard);
        }

        assert!(!router.is_escape_attached());
    }
}
