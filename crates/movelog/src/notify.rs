#![forbid(unsafe_code)]

//! Cursor change notification.
//!
//! Each [`MoveLog`](crate::MoveLog) owns one [`ChangeNotifier`]. Listeners
//! are plain `Fn()` callbacks held by `Rc`; registration and removal are set
//! operations keyed on pointer identity, so adding the same `Rc` twice is a
//! no-op.
//!
//! # Failure Modes
//!
//! - **Re-entrant mutation**: a listener must not mutate the log that is
//!   notifying it. Listeners run synchronously while the log is mid-call;
//!   reaching back into it (for example through a `RefCell`) panics or
//!   observes a half-finished operation. Read the log after the call returns.

use std::fmt;
use std::rc::Rc;

/// A callback invoked after the cursor of a log changes.
pub type Listener = Rc<dyn Fn()>;

/// Registry of cursor-change listeners, notified in registration order.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Vec<Listener>,
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

impl ChangeNotifier {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`. Returns `false` if it was already registered.
    pub fn add(&mut self, listener: Listener) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Unregister `listener`. Returns `false` if it was not registered.
    pub fn remove(&mut self, listener: &Listener) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Rc::ptr_eq(l, listener));
        self.listeners.len() != before
    }

    /// Whether `listener` is registered.
    #[must_use]
    pub fn contains(&self, listener: &Listener) -> bool {
        self.listeners.iter().any(|l| Rc::ptr_eq(l, listener))
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Invoke every listener once.
    pub fn fire(&self) {
        for listener in &self.listeners {
            listener();
        }
    }
}
