//! Change markers and the observer protocol.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::runtime;

/// Something that reacts when a tracked signal emits.
pub(crate) trait Observer {
    fn notify(self: Rc<Self>);
}

/// A change marker.
///
/// Reading code calls [`track`](Signal::track) so the enclosing watcher or
/// derived cell depends on it; writing code calls [`emit`](Signal::emit).
/// Observers are held weakly, so a dropped watcher simply stops receiving.
#[derive(Clone, Default)]
pub struct Signal {
    inner: Rc<SignalInner>,
}

#[derive(Default)]
struct SignalInner {
    observers: RefCell<Vec<Weak<dyn Observer>>>,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register this signal as a dependency of the running watcher or
    /// derived cell, if any.
    pub fn track(&self) {
        runtime::track(self);
    }

    /// Notify every live observer, in subscription order.
    pub fn emit(&self) {
        let observers: Vec<Rc<dyn Observer>> = {
            let mut observers = self.inner.observers.borrow_mut();
            observers.retain(|o| o.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        for observer in observers {
            observer.notify();
        }
    }

    pub fn ptr_eq(&self, other: &Signal) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.inner
            .observers
            .borrow()
            .iter()
            .filter(|o| o.strong_count() > 0)
            .count()
    }

    /// Subscribe `observer`. An observer already present keeps its position.
    pub(crate) fn subscribe(&self, observer: &Weak<dyn Observer>) {
        let mut observers = self.inner.observers.borrow_mut();
        if !observers.iter().any(|o| o.ptr_eq(observer)) {
            observers.push(observer.clone());
        }
    }

    pub(crate) fn unsubscribe(&self, observer: &Weak<dyn Observer>) {
        self.inner
            .observers
            .borrow_mut()
            .retain(|o| !o.ptr_eq(observer));
    }
}

impl std::fmt::Debug for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Move `observer`'s subscriptions from `old` to `new`, leaving signals
/// present in both untouched.
pub(crate) fn resubscribe(observer: &Weak<dyn Observer>, old: &[Signal], new: &[Signal]) {
    for signal in old {
        if !new.iter().any(|s| s.ptr_eq(signal)) {
            signal.unsubscribe(observer);
        }
    }
    for signal in new {
        signal.subscribe(observer);
    }
}
