//! Per-thread marker for code running on behalf of a dispatch.
//!
//! [`crate::layer::WebhookLayer`] drops every event emitted on a marked
//! thread, so delivering a notification (and the HTTP stack underneath it)
//! can never trigger another delivery. Custom [`crate::transport::WebhookTransport`]
//! implementations that hand work to their own threads should mark those
//! threads as well.

use std::cell::Cell;

thread_local! {
    static DISPATCHING: Cell<bool> = Cell::new(false);
}

/// Whether the current thread is working on a dispatch.
pub fn is_dispatching() -> bool {
    DISPATCHING.with(Cell::get)
}

/// Marks the current thread until dropped, restoring the previous state.
#[must_use = "the thread is only marked while the guard is alive"]
pub struct DispatchGuard {
    previous: bool,
}

impl DispatchGuard {
    pub fn enter() -> Self {
        DispatchGuard {
            previous: DISPATCHING.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|flag| flag.set(self.previous));
    }
}

/// Marks the current thread for the rest of its life, e.g. from a runtime's
/// `on_thread_start` hook.
pub fn mark_thread() {
    DISPATCHING.with(|flag| flag.set(true));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_restores_previous_state() {
        assert!(!is_dispatching());
        {
            let _outer = DispatchGuard::enter();
            {
                let _inner = DispatchGuard::enter();
                assert!(is_dispatching());
            }
            assert!(is_dispatching());
        }
        assert!(!is_dispatching());
    }

    #[test]
    fn marked_threads_stay_marked() {
        let marked = std::thread::spawn(|| {
            mark_thread();
            is_dispatching()
        })
        .join()
        .unwrap();
        assert!(marked);
        assert!(!is_dispatching());
    }
}
