#![forbid(unsafe_code)]

//! Observable value wrapper with change notification and version tracking.
//!
//! Pane widgets (the wrap toggle, the font scale) expose their current
//! value through an [`Observable`] so the owning pane can react to user
//! changes without the widget knowing about the pane.
//!
//! # Invariants
//!
//! 1. `version` increments by exactly 1 on each value-changing mutation.
//! 2. `set(v)` where `v == current` is a no-op.
//! 3. Observers are notified in registration order.
//! 4. Dropped [`ObserverGuard`]s are never called again; their entries are
//!    pruned lazily on the next notification.
//! 5. No borrow is held while observers run, so an observer may read or
//!    even set the value again.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type ObserverRc<T> = Rc<dyn Fn(&T)>;
type ObserverWeak<T> = Weak<dyn Fn(&T)>;

struct ObservableInner<T> {
    value: T,
    version: u64,
    observers: Vec<ObserverWeak<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning an `Observable` creates a new handle to the **same** value.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create a new observable at version 0 with no observers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                observers: Vec::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value, notifying observers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Mutate the value in place, notifying observers if it changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let old = inner.value.clone();
            f(&mut inner.value);
            if inner.value == old {
                false
            } else {
                inner.version += 1;
                true
            }
        };
        if changed {
            self.notify();
        }
    }

    /// Register `observer`; it runs with the new value after each change.
    ///
    /// Dropping the returned guard unsubscribes.
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> ObserverGuard {
        let strong: ObserverRc<T> = Rc::new(observer);
        self.inner
            .borrow_mut()
            .observers
            .push(Rc::downgrade(&strong));
        ObserverGuard {
            _guard: Box::new(strong),
        }
    }

    /// Number of value-changing mutations so far.
    #[cfg(test)]
    #[must_use]
    fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registered observers, including dropped ones not yet pruned.
    #[cfg(test)]
    #[must_use]
    fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    fn notify(&self) {
        let (observers, value) = {
            let mut inner = self.inner.borrow_mut();
            inner.observers.retain(|w| w.strong_count() > 0);
            let live: Vec<ObserverWeak<T>> = inner.observers.clone();
            (live, inner.value.clone())
        };
        for weak in observers {
            if let Some(observer) = weak.upgrade() {
                observer(&value);
            }
        }
    }
}

/// RAII guard for an observer callback.
///
/// Holds the only strong reference to the callback; dropping it makes the
/// observable's `Weak` entry dead.
pub struct ObserverGuard {
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for ObserverGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverGuard").finish_non_exhaustive()
    }
}
