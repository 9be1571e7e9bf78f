// src/notify.rs

//! Exactly-once exit broadcast.
//!
//! Any number of listeners may subscribe to a handle's termination. The
//! broadcast fires synchronously on whichever execution context first
//! observes the Running→Exited transition (a poll tick, an explicit
//! `check()`, `stop()`, or `block()`), and fires at most once per handle
//! lifetime. The transition itself is serialized by the handle's lifecycle
//! lock; the atomic guard here additionally protects against repeated
//! delivery attempts from later `check()` calls.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Payload delivered to exit listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitEvent {
    /// The handle's display label (may be empty, not required unique).
    pub id: String,
    /// Exit code; `-1` for processes killed by a signal.
    pub exit_code: i32,
}

/// Listener callback type.
pub type ExitListener = Box<dyn Fn(&ExitEvent) + Send + Sync>;

#[derive(Default)]
pub struct ExitNotifier {
    fired: AtomicBool,
    listeners: Mutex<Vec<ExitListener>>,
}

impl ExitNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Listeners registered after the event has fired
    /// are never invoked.
    pub fn subscribe(&self, listener: impl Fn(&ExitEvent) + Send + Sync + 'static) {
        self.listeners.lock().unwrap().push(Box::new(listener));
    }

    /// Deliver the event to all listeners, exactly once.
    ///
    /// Returns `true` if this call performed the broadcast, `false` if it
    /// had already fired.
    pub fn notify(&self, event: &ExitEvent) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        let listeners = self.listeners.lock().unwrap();
        for listener in listeners.iter() {
            listener(event);
        }
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ExitNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExitNotifier")
            .field("fired", &self.has_fired())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn fires_exactly_once() {
        let notifier = ExitNotifier::new();
        let count = Arc::new(AtomicUsize::new(0));
        {
            let count = count.clone();
            notifier.subscribe(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        let event = ExitEvent {
            id: "t".to_string(),
            exit_code: 0,
        };
        assert!(notifier.notify(&event));
        for _ in 0..10 {
            assert!(!notifier.notify(&event));
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(notifier.has_fired());
    }

    #[test]
    fn delivers_payload_to_every_listener() {
        let notifier = ExitNotifier::new();
        let seen_a = Arc::new(Mutex::new(None));
        let seen_b = Arc::new(Mutex::new(None));
        {
            let seen = seen_a.clone();
            notifier.subscribe(move |e| *seen.lock().unwrap() = Some(e.clone()));
        }
        {
            let seen = seen_b.clone();
            notifier.subscribe(move |e| *seen.lock().unwrap() = Some(e.clone()));
        }

        let event = ExitEvent {
            id: "pinger".to_string(),
            exit_code: 3,
        };
        notifier.notify(&event);

        assert_eq!(seen_a.lock().unwrap().as_ref(), Some(&event));
        assert_eq!(seen_b.lock().unwrap().as_ref(), Some(&event));
    }

    #[test]
    fn late_subscription_is_never_invoked() {
        let notifier = ExitNotifier::new();
        notifier.notify(&ExitEvent {
            id: String::new(),
            exit_code: 0,
        });

        let count = Arc::new(AtomicUsize::new(0));
        {
            let count = count.clone();
            notifier.subscribe(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        notifier.notify(&ExitEvent {
            id: String::new(),
            exit_code: 0,
        });
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
